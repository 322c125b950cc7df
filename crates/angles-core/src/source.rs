//! Source material submitted for analysis.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{AnglesError, Result};

/// Video container types accepted alongside any `image/*` type.
const ACCEPTED_VIDEO_TYPES: &[&str] = &["video/mp4", "video/webm"];

/// Infers the MIME type from a filename extension using the `mime_guess` library.
fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Returns true for MIME types the upload form accepts.
pub fn is_supported_media_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || ACCEPTED_VIDEO_TYPES.contains(&mime_type)
}

/// An optional image or clip sent inline with the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub mime_type: String,
    #[serde(skip)]
    pub data: Vec<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

impl MediaAttachment {
    /// Wraps raw bytes, rejecting unsupported MIME types.
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let mime_type = mime_type.into();
        if !is_supported_media_type(&mime_type) {
            return Err(AnglesError::invalid_input(format!(
                "unsupported media type '{mime_type}' (expected image/*, video/mp4 or video/webm)"
            )));
        }
        if data.is_empty() {
            return Err(AnglesError::invalid_input("media file is empty"));
        }
        Ok(Self {
            mime_type,
            data,
            file_name: None,
        })
    }

    /// Reads a media file from disk, inferring its MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime_type = infer_mime_type(path);
        let data = fs::read(path).await.map_err(|e| {
            AnglesError::io(format!("failed to read media '{}': {}", path.display(), e))
        })?;

        tracing::debug!(
            "[Source] Loaded media {} ({} bytes, {})",
            path.display(),
            data.len(),
            mime_type
        );

        let mut attachment = Self::new(mime_type, data)?;
        attachment.file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Ok(attachment)
    }
}

/// Transcript plus optional media, kept by the session so refinement calls can reuse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInput {
    pub transcript: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
    /// Link to the original video, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
}

impl SourceInput {
    /// Creates input from a transcript. Whitespace-only transcripts are rejected.
    pub fn new(transcript: impl Into<String>) -> Result<Self> {
        let transcript = transcript.into();
        if transcript.trim().is_empty() {
            return Err(AnglesError::invalid_input("transcript must not be empty"));
        }
        Ok(Self {
            transcript,
            media: None,
            reference_url: None,
        })
    }

    pub fn with_media(mut self, media: MediaAttachment) -> Self {
        self.media = Some(media);
        self
    }

    /// Sets the reference URL; blank strings are ignored.
    pub fn with_reference_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let trimmed = url.trim();
        self.reference_url = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_transcript_rejected() {
        assert!(SourceInput::new("").is_err());
        assert!(SourceInput::new("   \n\t").is_err());
        assert!(SourceInput::new("How I built a scraper in Python").is_ok());
    }

    #[test]
    fn test_supported_media_types() {
        assert!(is_supported_media_type("image/png"));
        assert!(is_supported_media_type("video/mp4"));
        assert!(is_supported_media_type("video/webm"));
        assert!(!is_supported_media_type("video/quicktime"));
        assert!(!is_supported_media_type("application/pdf"));
    }

    #[test]
    fn test_reference_url_blank_ignored() {
        let input = SourceInput::new("text").unwrap().with_reference_url("  ");
        assert_eq!(input.reference_url, None);

        let input = SourceInput::new("text")
            .unwrap()
            .with_reference_url(" https://youtube.com/watch?v=abc ");
        assert_eq!(
            input.reference_url.as_deref(),
            Some("https://youtube.com/watch?v=abc")
        );
    }

    #[tokio::test]
    async fn test_media_from_path_infers_mime() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let media = MediaAttachment::from_path(file.path()).await.unwrap();
        assert_eq!(media.mime_type, "image/png");
        assert_eq!(media.data.len(), 4);
        assert!(media.file_name.unwrap().ends_with(".png"));
    }

    #[tokio::test]
    async fn test_media_from_path_rejects_unsupported() {
        let mut file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        file.write_all(b"%PDF").unwrap();

        let err = MediaAttachment::from_path(file.path()).await.unwrap_err();
        assert!(matches!(err, AnglesError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_media_from_missing_path() {
        let err = MediaAttachment::from_path("/definitely/not/here.png")
            .await
            .unwrap_err();
        assert!(matches!(err, AnglesError::Io { .. }));
    }
}
