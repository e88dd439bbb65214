//! Maps reconciled history entries to tool display descriptors.
//!
//! Tool names are classified once into a [`ToolKind`]; label, icon and
//! interaction all derive from the kind. Invoking an interaction never
//! navigates: it yields a [`HostIntent`] for the host to act on.

use serde::{Deserialize, Serialize};

use crate::event::{CallEvent, FileInfo};
use crate::history::HistoryEntry;
use crate::intent::HostIntent;
use crate::localize::Localizer;
use crate::resources::{parse_knowledge_output, parse_web_output};

/// Minimum length of a trailing `_segment` treated as a generated hash.
const HASH_SUFFIX_MIN_LEN: usize = 8;

/// Remove a generated hash suffix such as `_a1b2c3d4` from a tool name.
///
/// The last underscore segment is stripped when it is at least eight
/// characters of lowercase ASCII letters and digits and not purely numeric.
pub fn strip_hash_suffix(name: &str) -> &str {
    let Some((base, suffix)) = name.rsplit_once('_') else {
        return name;
    };
    let is_hash = suffix.len() >= HASH_SUFFIX_MIN_LEN
        && suffix
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
        && !suffix.bytes().all(|b| b.is_ascii_digit());
    if is_hash { base } else { name }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileWriteOp {
    AddText,
    ReplaceLines,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum ToolKind {
    WebSearch,
    KnowledgeSearch,
    ListFiles,
    FileDetails,
    SearchFiles,
    FileRead,
    FileWrite(FileWriteOp),
    WebPageMarkdown,
    Generic(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolIcon {
    Search,
    BookOpen,
    FileText,
    Wrench,
}

impl ToolKind {
    /// Classify a display name (hash suffix already stripped).
    pub fn classify(name: &str) -> Self {
        match name {
            "web_search" => Self::WebSearch,
            "search_knowledge_base" => Self::KnowledgeSearch,
            "list_files" => Self::ListFiles,
            "get_file_details" => Self::FileDetails,
            "search_files" => Self::SearchFiles,
            "read_text_file" => Self::FileRead,
            "add_text_to_file" => Self::FileWrite(FileWriteOp::AddText),
            "replace_file_lines" => Self::FileWrite(FileWriteOp::ReplaceLines),
            "web_content_to_markdown_llm" => Self::WebPageMarkdown,
            other => Self::Generic(other.to_string()),
        }
    }

    pub fn icon(&self) -> ToolIcon {
        match self {
            Self::WebSearch => ToolIcon::Search,
            Self::KnowledgeSearch => ToolIcon::BookOpen,
            Self::ListFiles
            | Self::FileDetails
            | Self::SearchFiles
            | Self::FileRead
            | Self::FileWrite(_) => ToolIcon::FileText,
            Self::WebPageMarkdown | Self::Generic(_) => ToolIcon::Wrench,
        }
    }

    fn label_key(&self) -> Option<&'static str> {
        Some(match self {
            Self::WebSearch => "com_sop_web_search",
            Self::KnowledgeSearch => "com_sop_search_knowledge_base",
            Self::ListFiles => "com_sop_list_files",
            Self::FileDetails => "com_sop_get_file_details",
            Self::SearchFiles => "com_sop_search_files",
            Self::FileRead => "com_sop_read_text_file",
            Self::FileWrite(FileWriteOp::AddText) => "com_sop_add_text_to_file",
            Self::FileWrite(FileWriteOp::ReplaceLines) => "com_sop_replace_file_lines",
            Self::WebPageMarkdown | Self::Generic(_) => return None,
        })
    }

    pub fn label(&self, display_name: &str, localizer: &dyn Localizer) -> String {
        match self.label_key() {
            Some(key) => localizer.t(key, &[]),
            None => localizer.t("com_sop_using_tool", &[("0", display_name)]),
        }
    }
}

/// A clickable action attached to a tool chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "interaction", rename_all = "snake_case")]
pub enum Interaction {
    WebResults {
        query: String,
        output: Option<String>,
    },
    KnowledgeResults {
        query: String,
        output: Option<String>,
    },
    DirectFile {
        file: FileInfo,
    },
    ExternalUrl {
        url: String,
    },
}

impl Interaction {
    /// Text shown as the chip's link.
    pub fn payload(&self) -> &str {
        match self {
            Self::WebResults { query, .. } | Self::KnowledgeResults { query, .. } => query,
            Self::DirectFile { file } => &file.file_name,
            Self::ExternalUrl { url } => url,
        }
    }

    /// Resolve the interaction into a host intent. Search panels open only
    /// when there is output to show.
    pub fn invoke(&self) -> Option<HostIntent> {
        match self {
            Self::WebResults { query, output } => {
                let output = output.as_deref().filter(|o| !o.is_empty())?;
                Some(HostIntent::OpenWebResults {
                    query: query.clone(),
                    data: parse_web_output(output),
                })
            }
            Self::KnowledgeResults { query, output } => {
                let output = output.as_deref().filter(|o| !o.is_empty())?;
                Some(match parse_knowledge_output(output) {
                    Ok(data) => HostIntent::OpenKnowledgeResults {
                        query: query.clone(),
                        data,
                    },
                    Err(err) => {
                        tracing::warn!(error = %err, "knowledge output not recognized");
                        HostIntent::Notify(err.to_notification())
                    }
                })
            }
            Self::DirectFile { file } => Some(HostIntent::OpenDirectFile { file: file.clone() }),
            Self::ExternalUrl { url } => Some(HostIntent::OpenExternalUrl { url: url.clone() }),
        }
    }
}

/// How one history entry renders as a tool chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayDescriptor {
    pub tool: ToolKind,
    pub label: String,
    pub icon: ToolIcon,
    /// Plain, non-clickable parameter text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<Interaction>,
}

/// Describe a history entry, or `None` for non-tool steps.
pub fn present(entry: &HistoryEntry, localizer: &dyn Localizer) -> Option<DisplayDescriptor> {
    present_event(&entry.event, localizer)
}

pub fn present_event(event: &CallEvent, localizer: &dyn Localizer) -> Option<DisplayDescriptor> {
    if !event.is_tool_call() {
        return None;
    }
    let display_name = strip_hash_suffix(&event.name);
    let tool = ToolKind::classify(display_name);
    let (detail, interaction) = if event.params().is_some() {
        describe_params(&tool, event)
    } else {
        (None, None)
    };
    Some(DisplayDescriptor {
        label: tool.label(display_name, localizer),
        icon: tool.icon(),
        tool,
        detail,
        interaction,
    })
}

fn describe_params(tool: &ToolKind, event: &CallEvent) -> (Option<String>, Option<Interaction>) {
    let query = || event.param_str("query").unwrap_or_default().to_string();
    match tool {
        ToolKind::WebSearch => (
            None,
            Some(Interaction::WebResults {
                query: query(),
                output: event.output.clone(),
            }),
        ),
        ToolKind::KnowledgeSearch => (
            None,
            Some(Interaction::KnowledgeResults {
                query: query(),
                output: event.output.clone(),
            }),
        ),
        ToolKind::ListFiles => (event.param_str("directory_path").map(str::to_string), None),
        ToolKind::FileDetails => (
            event
                .param_str("file_path")
                .and_then(|path| path.rsplit('/').next())
                .map(str::to_string),
            None,
        ),
        ToolKind::SearchFiles => (event.param_str("pattern").map(str::to_string), None),
        ToolKind::FileRead | ToolKind::FileWrite(_) => (
            None,
            event
                .file_info()
                .map(|file| Interaction::DirectFile { file }),
        ),
        ToolKind::WebPageMarkdown => (
            None,
            event
                .param_str("url")
                .map(|url| Interaction::ExternalUrl {
                    url: url.to_string(),
                }),
        ),
        ToolKind::Generic(_) => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::localize::Catalog;
    use proptest::prelude::*;
    use serde_json::json;

    fn tool_event(value: serde_json::Value) -> CallEvent {
        let mut base = json!({
            "call_id": "c1",
            "status": "end",
            "call_reason": "because",
            "step_type": "tool_call",
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), value.as_object()) {
            for (key, val) in extra {
                base.insert(key.clone(), val.clone());
            }
        }
        serde_json::from_value(base).expect("decode event")
    }

    #[test]
    fn strips_generated_hash_suffix() {
        assert_eq!(strip_hash_suffix("search_files_a1b2c3d4"), "search_files");
        assert_eq!(strip_hash_suffix("search_files_123"), "search_files_123");
        assert_eq!(strip_hash_suffix("search_files_12345678"), "search_files_12345678");
        assert_eq!(strip_hash_suffix("search_files_A1B2C3D4"), "search_files_A1B2C3D4");
        assert_eq!(strip_hash_suffix("calculator"), "calculator");
    }

    #[test]
    fn non_tool_steps_are_suppressed() {
        let mut event = tool_event(json!({"name": "web_search"}));
        event.step_type = "think".to_string();
        assert!(present_event(&event, &Catalog::English).is_none());
    }

    #[test]
    fn web_search_interaction_opens_parsed_results() {
        let event = tool_event(json!({
            "name": "web_search_9f8e7d6c",
            "params": {"query": "rust"},
            "output": r#"[{"title":"Rust","snippet":"lang","url":"https://rust-lang.org"}]"#,
        }));
        let descriptor = present_event(&event, &Catalog::English).expect("tool");
        assert_eq!(descriptor.tool, ToolKind::WebSearch);
        assert_eq!(descriptor.icon, ToolIcon::Search);
        assert_eq!(descriptor.label, "Web search");
        let interaction = descriptor.interaction.expect("interaction");
        assert_eq!(interaction.payload(), "rust");
        match interaction.invoke() {
            Some(HostIntent::OpenWebResults { query, data }) => {
                assert_eq!(query, "rust");
                assert_eq!(data[0].host.as_deref(), Some("rust-lang.org"));
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[test]
    fn knowledge_parse_failure_becomes_notification() {
        let event = tool_event(json!({
            "name": "search_knowledge_base",
            "params": {"query": "policy"},
            "output": "backend timeout",
        }));
        let descriptor = present_event(&event, &Catalog::English).expect("tool");
        let intent = descriptor.interaction.and_then(|i| i.invoke());
        match intent {
            Some(HostIntent::Notify(note)) => {
                assert_eq!(note.kind, ErrorKind::ParseFailure);
                assert_eq!(note.message, "backend timeout");
            }
            other => panic!("unexpected intent: {other:?}"),
        }
    }

    #[test]
    fn empty_output_opens_nothing() {
        let interaction = Interaction::KnowledgeResults {
            query: "q".to_string(),
            output: Some(String::new()),
        };
        assert_eq!(interaction.invoke(), None);
    }

    #[test]
    fn file_tools_open_direct_file_only_with_metadata() {
        let with_file = tool_event(json!({
            "name": "read_text_file",
            "params": {"path": "a.md"},
            "extra_info": {"file_info": {"file_name": "a.md", "file_url": "/a.md"}},
        }));
        let descriptor = present_event(&with_file, &Catalog::English).expect("tool");
        assert_eq!(descriptor.icon, ToolIcon::FileText);
        assert_eq!(
            descriptor.interaction.and_then(|i| i.invoke()),
            Some(HostIntent::OpenDirectFile {
                file: FileInfo {
                    file_name: "a.md".to_string(),
                    file_md5: None,
                    file_url: Some("/a.md".to_string()),
                }
            })
        );

        let without = tool_event(json!({"name": "add_text_to_file", "params": {"path": "a.md"}}));
        let descriptor = present_event(&without, &Catalog::English).expect("tool");
        assert_eq!(descriptor.tool, ToolKind::FileWrite(FileWriteOp::AddText));
        assert!(descriptor.interaction.is_none());
    }

    #[test]
    fn plain_detail_for_listing_tools() {
        let details = tool_event(json!({
            "name": "get_file_details",
            "params": {"file_path": "/data/reports/q3.xlsx"},
        }));
        let descriptor = present_event(&details, &Catalog::English).expect("tool");
        assert_eq!(descriptor.detail.as_deref(), Some("q3.xlsx"));

        let listing = tool_event(json!({"name": "list_files", "params": {"directory_path": "/data"}}));
        let descriptor = present_event(&listing, &Catalog::English).expect("tool");
        assert_eq!(descriptor.detail.as_deref(), Some("/data"));
    }

    #[test]
    fn unknown_tool_uses_generic_label_and_wrench() {
        let event = tool_event(json!({"name": "calculator_deadbeef", "params": {"expr": "1+1"}}));
        let descriptor = present_event(&event, &Catalog::English).expect("tool");
        assert_eq!(descriptor.tool, ToolKind::Generic("calculator".to_string()));
        assert_eq!(descriptor.label, "Using tool calculator");
        assert_eq!(descriptor.icon, ToolIcon::Wrench);
        assert!(descriptor.interaction.is_none());
    }

    #[test]
    fn markdown_fetch_links_out() {
        let event = tool_event(json!({
            "name": "web_content_to_markdown_llm",
            "params": {"url": "https://example.com/a"},
        }));
        let descriptor = present_event(&event, &Catalog::English).expect("tool");
        assert_eq!(descriptor.label, "Using tool web_content_to_markdown_llm");
        assert_eq!(
            descriptor.interaction,
            Some(Interaction::ExternalUrl {
                url: "https://example.com/a".to_string()
            })
        );
    }

    #[test]
    fn missing_params_offer_no_interaction() {
        let event = tool_event(json!({"name": "web_search", "output": "[]"}));
        let descriptor = present_event(&event, &Catalog::English).expect("tool");
        assert!(descriptor.interaction.is_none());
        assert!(descriptor.detail.is_none());
    }

    proptest! {
        #[test]
        fn hash_suffix_is_stripped(base in "[a-z]{1,12}(_[a-z]{1,6})?", hash in "[a-z0-9]{7,15}[a-z]") {
            let name = format!("{base}_{hash}");
            prop_assert_eq!(strip_hash_suffix(&name), base.as_str());
        }

        #[test]
        fn numeric_or_short_suffix_is_kept(
            base in "[a-z]{1,12}",
            suffix in prop_oneof!["[0-9]{1,20}", "[a-z0-9]{1,7}"],
        ) {
            let name = format!("{base}_{suffix}");
            prop_assert_eq!(strip_hash_suffix(&name), name.as_str());
        }
    }
}
