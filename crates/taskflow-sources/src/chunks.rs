//! Source documents returned by the chunk lookup.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

static STORAGE_ORIGIN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^/]+").unwrap());
static NAME_EXTENSION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.[\w\d]+$").unwrap());

/// Parse type for documents parsed by the layout engine; these also have a
/// layered PDF rendition.
pub const LAYERED_PARSE_TYPE: &str = "uns";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileChunk {
    #[serde(default)]
    pub id: Value,
    #[serde(default, rename = "fileName")]
    pub file_name: String,
    #[serde(default, rename = "fileUrl", skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, rename = "originUrl", skip_serializing_if = "Option::is_none")]
    pub origin_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_type: Option<String>,
    #[serde(default)]
    pub score: Value,
    /// Whether the user may see this document.
    #[serde(default = "default_right")]
    pub right: bool,
}

fn default_right() -> bool {
    true
}

/// A download for the host's file-download primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDownload {
    pub url: String,
    pub file_name: String,
}

impl FileChunk {
    /// Identity used for selection; ids arrive as strings or numbers.
    pub fn key(&self) -> String {
        match &self.id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        }
    }

    /// Masked chunks show a placeholder instead of the file name.
    pub fn is_masked(&self) -> bool {
        !self.right
    }

    fn file_url(&self) -> Option<&str> {
        self.file_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn has_preview(&self) -> bool {
        self.file_url().is_some()
    }

    /// The layered PDF rendition, offered for layout-parsed documents.
    pub fn layered_pdf_download(&self, base_url: &str) -> Option<FileDownload> {
        if self.is_masked() || self.parse_type.as_deref() != Some(LAYERED_PARSE_TYPE) {
            return None;
        }
        let url = self.file_url()?;
        Some(FileDownload {
            url: rewrite_storage_url(url, base_url),
            file_name: NAME_EXTENSION
                .replace(&self.file_name, ".pdf")
                .into_owned(),
        })
    }

    pub fn original_download(&self, base_url: &str) -> Option<FileDownload> {
        if self.is_masked() {
            return None;
        }
        let url = self.origin_url.as_deref().filter(|url| !url.is_empty())?;
        Some(FileDownload {
            url: rewrite_storage_url(url, base_url),
            file_name: self.file_name.clone(),
        })
    }
}

/// Replace the scheme and host of an object-storage URL with `base_url`.
pub fn rewrite_storage_url(url: &str, base_url: &str) -> String {
    STORAGE_ORIGIN
        .replace(url, regex::NoExpand(base_url))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chunk(value: Value) -> FileChunk {
        serde_json::from_value(value).expect("decode chunk")
    }

    #[test]
    fn decodes_backend_field_names() {
        let chunk = chunk(json!({
            "id": 12,
            "fileName": "manual.docx",
            "fileUrl": "http://minio:9000/bucket/manual.pdf",
            "originUrl": "http://minio:9000/bucket/manual.docx",
            "parse_type": "uns",
            "score": 0.82,
            "right": true,
        }));
        assert_eq!(chunk.key(), "12");
        assert!(chunk.has_preview());
        assert!(!chunk.is_masked());
    }

    #[test]
    fn layered_pdf_replaces_extension_and_origin() {
        let chunk = chunk(json!({
            "id": "a",
            "fileName": "manual.docx",
            "fileUrl": "http://minio:9000/bucket/manual.pdf",
            "parse_type": "uns",
        }));
        assert_eq!(
            chunk.layered_pdf_download("https://app.example"),
            Some(FileDownload {
                url: "https://app.example/bucket/manual.pdf".to_string(),
                file_name: "manual.pdf".to_string(),
            })
        );
        assert_eq!(chunk.original_download("https://app.example"), None);
    }

    #[test]
    fn other_parse_types_have_no_layered_pdf() {
        let chunk = chunk(json!({
            "id": "a",
            "fileName": "notes.txt",
            "fileUrl": "http://minio/notes.txt",
            "originUrl": "http://minio/notes.txt",
            "parse_type": "local",
        }));
        assert_eq!(chunk.layered_pdf_download(""), None);
        assert_eq!(
            chunk.original_download("").map(|d| d.url),
            Some("/notes.txt".to_string())
        );
    }

    #[test]
    fn masked_chunks_offer_no_downloads() {
        let chunk = chunk(json!({
            "id": "a",
            "fileName": "secret.pdf",
            "fileUrl": "http://minio/secret.pdf",
            "originUrl": "http://minio/secret.pdf",
            "parse_type": "uns",
            "right": false,
        }));
        assert!(chunk.is_masked());
        assert_eq!(chunk.layered_pdf_download(""), None);
        assert_eq!(chunk.original_download(""), None);
    }

    #[test]
    fn base_url_is_inserted_literally() {
        assert_eq!(
            rewrite_storage_url("https://s3/x/$1.pdf", "https://h/$0"),
            "https://h/$0/x/$1.pdf"
        );
    }
}
