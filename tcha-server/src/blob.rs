//! Blob payloads, size validation, content codec and derived URLs

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tcha_common::db::BlobRecord;
use tcha_common::{Error, Result};

/// File as received from a client; the content type is trusted as given
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl BlobUpload {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_image(&self) -> bool {
        is_image(&self.content_type)
    }
}

/// Reference returned by an upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRef {
    #[serde(flatten)]
    pub record: BlobRecord,
    pub urls: BlobUrls,
}

impl BlobRef {
    pub fn id(&self) -> &str {
        &self.record.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobUrls {
    pub preview: String,
    pub view: String,
    pub download: String,
}

/// Builds the preview/view/download links of a blob
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    base_url: String,
    preview_size: u32,
}

impl UrlBuilder {
    pub fn new(base_url: impl Into<String>, preview_size: u32) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            preview_size,
        }
    }

    pub fn for_blob(&self, id: &str) -> BlobUrls {
        let root = format!("{}/api/files/{}", self.base_url, id);
        BlobUrls {
            preview: format!(
                "{}/preview?width={}&height={}",
                root, self.preview_size, self.preview_size
            ),
            view: format!("{}/view", root),
            download: format!("{}/download", root),
        }
    }
}

/// Reject empty payloads and payloads above `limit` (exactly `limit` is accepted)
pub fn validate_size(len: usize, limit: u64) -> Result<()> {
    if len == 0 {
        return Err(Error::InvalidInput("File is empty".to_string()));
    }
    let size = len as u64;
    if size > limit {
        return Err(Error::PayloadTooLarge { size, limit });
    }
    Ok(())
}

pub fn is_image(content_type: &str) -> bool {
    content_type.trim().to_ascii_lowercase().starts_with("image/")
}

pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

pub fn decode(encoded: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(encoded)
        .map_err(|e| Error::Internal(format!("Corrupt blob content: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_boundary() {
        assert!(validate_size(1024, 1024).is_ok());
        match validate_size(1025, 1024) {
            Err(Error::PayloadTooLarge { size, limit }) => {
                assert_eq!(size, 1025);
                assert_eq!(limit, 1024);
            }
            other => panic!("expected PayloadTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_payload_rejected() {
        assert!(matches!(validate_size(0, 1024), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_urls_default_preview_size() {
        let urls = UrlBuilder::new("http://localhost:5000/", 400).for_blob("abc");
        assert_eq!(
            urls.preview,
            "http://localhost:5000/api/files/abc/preview?width=400&height=400"
        );
        assert_eq!(urls.view, "http://localhost:5000/api/files/abc/view");
        assert_eq!(urls.download, "http://localhost:5000/api/files/abc/download");
    }

    #[test]
    fn test_relative_urls_without_base() {
        let urls = UrlBuilder::new("", 200).for_blob("f1");
        assert_eq!(urls.view, "/api/files/f1/view");
    }

    #[test]
    fn test_image_content_types() {
        assert!(is_image("image/png"));
        assert!(is_image("Image/JPEG"));
        assert!(!is_image("audio/mpeg"));
        assert!(!is_image(""));
    }

    #[test]
    fn test_codec_rejects_garbage() {
        assert_eq!(decode(&encode(b"\x00\xffRIFF")).unwrap(), b"\x00\xffRIFF");
        assert!(decode("not base64!!").is_err());
    }
}
