use std::io;
use std::path::{Path, PathBuf};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;

use crate::models::Attachment;

pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;
pub const PHOTO_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// Attachment ids are labels, not keys: wall-clock millis plus a random
/// suffix, with no uniqueness guarantee.
pub fn new_attachment_id() -> String {
    format!("{}-{:08x}", Utc::now().timestamp_millis(), rand::random::<u32>())
}

pub fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("txt") => "text/plain",
        Some("doc") => "application/msword",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => "application/octet-stream",
    }
}

/// A file picked from disk, not yet read or encoded.
#[derive(Debug, Clone)]
pub struct FileAttachment {
    pub path: PathBuf,
    pub name: String,
    pub content_type: String,
}

impl FileAttachment {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();
        let content_type = mime_for_path(&path).to_string();
        Self {
            path,
            name,
            content_type,
        }
    }
}

/// Input to an attachment save: either a freshly picked file or an already
/// stored attachment carried over unchanged from an edit form.
#[derive(Debug, Clone)]
pub enum AttachmentDraft {
    File(FileAttachment),
    Stored(Attachment),
}

pub async fn encode_data_url(path: &Path, content_type: &str) -> io::Result<String> {
    let bytes = tokio::fs::read(path).await?;
    Ok(format!("data:{};base64,{}", content_type, STANDARD.encode(&bytes)))
}

/// Reads and encodes every picked file, one at a time so the stored list
/// keeps the order the files were chosen in.
pub async fn encode_attachments(drafts: Vec<AttachmentDraft>) -> io::Result<Vec<Attachment>> {
    let mut out = Vec::with_capacity(drafts.len());
    for draft in drafts {
        match draft {
            AttachmentDraft::Stored(mut attachment) => {
                attachment.is_stored = true;
                out.push(attachment);
            }
            AttachmentDraft::File(file) => {
                let bytes = tokio::fs::read(&file.path).await?;
                let data = format!(
                    "data:{};base64,{}",
                    file.content_type,
                    STANDARD.encode(&bytes)
                );
                out.push(Attachment {
                    id: new_attachment_id(),
                    name: file.name,
                    size: bytes.len() as u64,
                    content_type: file.content_type,
                    data,
                    is_stored: true,
                });
            }
        }
    }
    Ok(out)
}
