//! Field validators shared by the API handlers and the client-side forms.

use chrono::NaiveTime;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 3;
pub const MAX_NAME_LEN: usize = 100;

/// Light-weight shape check: one `@`, a non-empty local part, a dot inside
/// the domain, no whitespace. Deliverability is not our problem.
pub fn valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = s.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

/// Student numbers are 8 to 15 digits.
pub fn valid_nim(s: &str) -> bool {
    (8..=15).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn valid_password(s: &str) -> bool {
    s.chars().count() >= MIN_PASSWORD_LEN
}

pub fn valid_name(s: &str) -> bool {
    (MIN_NAME_LEN..=MAX_NAME_LEN).contains(&s.trim().chars().count())
}

/// Accepts only zero-padded 24-hour `HH:MM`; the weekly view relies on
/// lexicographic order of these strings matching chronological order.
pub fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    if s.len() != 5 || s.as_bytes()[2] != b':' {
        return None;
    }
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(valid_email("budi@student.ac.id"));
        assert!(valid_email("a.b@c.co"));
        assert!(!valid_email("budi"));
        assert!(!valid_email("budi@"));
        assert!(!valid_email("@x.com"));
        assert!(!valid_email("budi@host"));
        assert!(!valid_email("budi@.com"));
        assert!(!valid_email("bu di@x.com"));
        assert!(!valid_email("a@b@c.com"));
    }

    #[test]
    fn nim_bounds() {
        assert!(valid_nim("12345678"));
        assert!(valid_nim("123456789012345"));
        assert!(!valid_nim("1234567"));
        assert!(!valid_nim("1234567890123456"));
        assert!(!valid_nim("12345abc"));
        assert!(!valid_nim(""));
    }

    #[test]
    fn password_length() {
        assert!(valid_password("secret"));
        assert!(!valid_password("short"));
    }

    #[test]
    fn name_length() {
        assert!(valid_name("Ana"));
        assert!(valid_name(&"x".repeat(100)));
        assert!(!valid_name("Al"));
        assert!(!valid_name(&"x".repeat(101)));
        assert!(!valid_name("  a  "));
    }

    #[test]
    fn hhmm_strict() {
        assert!(parse_hhmm("00:00").is_some());
        assert!(parse_hhmm("23:59").is_some());
        assert!(parse_hhmm("09:05").is_some());
        assert!(parse_hhmm("24:00").is_none());
        assert!(parse_hhmm("12:60").is_none());
        assert!(parse_hhmm("9:05").is_none());
        assert!(parse_hhmm("09:5").is_none());
        assert!(parse_hhmm("0905").is_none());
        assert!(parse_hhmm("").is_none());
    }
}
