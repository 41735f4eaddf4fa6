use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub const LOGIN_MAX_ATTEMPTS: u32 = 5;
pub const LOGIN_WINDOW: Duration = Duration::from_secs(15 * 60);

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window attempt counter keyed by client IP. Every call counts as an
/// attempt, including rejected ones, so hammering does not extend access.
pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    windows: Mutex<HashMap<IpAddr, Window>>,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn for_login() -> Self {
        Self::new(LOGIN_MAX_ATTEMPTS, LOGIN_WINDOW)
    }

    /// Records an attempt from `ip` and reports whether it is still within
    /// the allowance for the current window.
    pub fn check(&self, ip: IpAddr) -> bool {
        let now = Instant::now();
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if windows.len() > 1024 {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(ip).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }
        entry.count += 1;
        entry.count <= self.max_attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(last: u8) -> IpAddr {
        IpAddr::from([127, 0, 0, last])
    }

    #[test]
    fn allows_up_to_the_limit() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        for _ in 0..5 {
            assert!(limiter.check(ip(1)));
        }
        assert!(!limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));
    }

    #[test]
    fn addresses_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));
        assert!(limiter.check(ip(2)));
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::new(1, Duration::from_millis(20));
        assert!(limiter.check(ip(1)));
        assert!(!limiter.check(ip(1)));
        std::thread::sleep(Duration::from_millis(30));
        assert!(limiter.check(ip(1)));
    }
}
