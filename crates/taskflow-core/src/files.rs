//! Result files attached to a finished execution and the actions they offer.

use serde::{Deserialize, Serialize};

use crate::wire;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultFile {
    #[serde(default, deserialize_with = "wire::lenient_key")]
    pub file_id: String,
    #[serde(default, deserialize_with = "wire::lenient_key")]
    pub file_name: String,
    #[serde(default, deserialize_with = "wire::lenient_key")]
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_md5: Option<String>,
}

/// What clicking a result file card does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FileOpenAction {
    /// Open the standalone html viewer in a new window.
    OpenHtmlViewer { url: String },
    /// Show the file in the preview drawer.
    Preview { file_id: String },
}

/// Everything a download primitive needs to save a result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub url: String,
    pub file_name: String,
    /// Spreadsheet tools misread UTF-8 csv without a byte-order mark.
    pub prepend_utf8_bom: bool,
}

impl ResultFile {
    /// Lower-cased extension taken from the file name.
    pub fn extension(&self) -> String {
        file_extension(&self.file_name)
    }

    pub fn is_markdown(&self) -> bool {
        self.extension() == "md"
    }

    pub fn open_action(&self, base_url: &str) -> FileOpenAction {
        if self.extension() == "html" {
            return FileOpenAction::OpenHtmlViewer {
                url: format!(
                    "{base_url}/html?url={}",
                    urlencoding::encode(&self.file_url)
                ),
            };
        }
        FileOpenAction::Preview {
            file_id: self.file_id.clone(),
        }
    }

    pub fn download_request(&self, base_url: &str) -> DownloadRequest {
        DownloadRequest {
            url: format!("{base_url}{}", self.file_url),
            file_name: self.file_name.clone(),
            prepend_utf8_bom: self.file_url.ends_with(".csv"),
        }
    }
}

/// Last dot-separated segment of `name`, lower-cased. A name without a dot
/// yields the whole name.
pub fn file_extension(name: &str) -> String {
    name.rsplit('.').next().unwrap_or_default().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, url: &str) -> ResultFile {
        ResultFile {
            file_id: "f1".to_string(),
            file_name: name.to_string(),
            file_url: url.to_string(),
            file_md5: None,
        }
    }

    #[test]
    fn html_files_open_in_viewer_with_encoded_url() {
        let action = file("report.HTML", "/bucket/a b.html").open_action("https://host");
        assert_eq!(
            action,
            FileOpenAction::OpenHtmlViewer {
                url: "https://host/html?url=%2Fbucket%2Fa%20b.html".to_string()
            }
        );
    }

    #[test]
    fn other_files_preview_by_id() {
        let action = file("notes.md", "/bucket/notes.md").open_action("");
        assert_eq!(
            action,
            FileOpenAction::Preview {
                file_id: "f1".to_string()
            }
        );
    }

    #[test]
    fn csv_downloads_request_a_bom() {
        let request = file("data.csv", "/bucket/data.csv").download_request("https://host");
        assert_eq!(request.url, "https://host/bucket/data.csv");
        assert!(request.prepend_utf8_bom);
        assert!(!file("a.md", "/a.md").download_request("").prepend_utf8_bom);
    }

    #[test]
    fn extension_handles_missing_dot() {
        assert_eq!(file_extension("Makefile"), "makefile");
        assert_eq!(file_extension("archive.tar.GZ"), "gz");
    }
}
