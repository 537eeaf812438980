//! Project file attachments.
//!
//! # Responsibility
//! - Define the embedded attachment record owned by a project.
//! - Build attachments from raw bytes at the boundary, enforcing the size cap.
//!
//! # Invariants
//! - Attachments larger than [`MAX_ATTACHMENT_BYTES`] are never built.
//! - `Data` holds a base64 data URL; the engine never inspects it.

use super::generate_id;
use super::timestamp;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Per-file size cap, in bytes.
pub const MAX_ATTACHMENT_BYTES: u64 = 500 * 1024;

/// Attachment embedded in a project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProjectFile {
    #[serde(rename = "FileID")]
    pub file_id: String,
    pub file_name: String,
    /// MIME type.
    pub file_type: String,
    /// Size of the decoded payload in bytes.
    pub file_size: u64,
    #[serde(with = "timestamp::required")]
    pub upload_date: DateTime<Utc>,
    /// `data:<mime>;base64,<payload>`.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentError {
    TooLarge { size: u64, limit: u64 },
    InvalidPayload(String),
}

impl Display for AttachmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooLarge { size, limit } => write!(
                f,
                "File too large ({size} bytes). Max size is {}KB for app storage.",
                limit / 1024
            ),
            Self::InvalidPayload(message) => write!(f, "invalid attachment payload: {message}"),
        }
    }
}

impl Error for AttachmentError {}

impl ProjectFile {
    /// Builds an attachment from raw file bytes.
    ///
    /// # Errors
    /// - `TooLarge` when `bytes` exceeds [`MAX_ATTACHMENT_BYTES`].
    pub fn from_bytes(
        file_name: impl Into<String>,
        file_type: impl Into<String>,
        bytes: &[u8],
        uploaded_at: DateTime<Utc>,
    ) -> Result<Self, AttachmentError> {
        let size = bytes.len() as u64;
        if size > MAX_ATTACHMENT_BYTES {
            return Err(AttachmentError::TooLarge {
                size,
                limit: MAX_ATTACHMENT_BYTES,
            });
        }

        let file_type = file_type.into();
        let data = format!("data:{file_type};base64,{}", STANDARD.encode(bytes));
        Ok(Self {
            file_id: generate_id(),
            file_name: file_name.into(),
            file_type,
            file_size: size,
            upload_date: uploaded_at,
            data,
        })
    }

    /// Decodes the stored payload back into bytes.
    ///
    /// Accepts a data URL or bare base64.
    pub fn decode(&self) -> Result<Vec<u8>, AttachmentError> {
        let encoded = match self.data.split_once(";base64,") {
            Some((prefix, payload)) if prefix.starts_with("data:") => payload,
            _ => self.data.as_str(),
        };
        STANDARD
            .decode(encoded.trim())
            .map_err(|err| AttachmentError::InvalidPayload(err.to_string()))
    }
}
