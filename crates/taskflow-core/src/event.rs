//! Tool-call lifecycle events as they appear in a task's raw history.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::wire;

/// `step_type` value carried by events that represent a tool invocation.
pub const TOOL_CALL_STEP: &str = "tool_call";

/// Lifecycle phase of a call event. The wire field is named `status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallPhase {
    Start,
    End,
    /// Any phase this engine does not know about, including a missing one;
    /// ignored by reconciliation.
    #[default]
    #[serde(other)]
    Other,
}

/// One `start` or `end` record for a call, keyed by `call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallEvent {
    #[serde(default, deserialize_with = "wire::lenient_key")]
    pub call_id: String,
    #[serde(rename = "status", default, deserialize_with = "wire::nullable")]
    pub phase: CallPhase,
    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub call_reason: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_key")]
    pub name: String,
    #[serde(default, deserialize_with = "wire::lenient_key")]
    pub step_type: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub extra_info: Value,
    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub output: Option<String>,
}

impl CallEvent {
    /// The reason text, if present and non-empty.
    pub fn reason(&self) -> Option<&str> {
        self.call_reason.as_deref().filter(|reason| !reason.is_empty())
    }

    pub fn has_reason(&self) -> bool {
        self.reason().is_some()
    }

    /// Whether this event is a tool invocation rather than an internal step.
    pub fn is_tool_call(&self) -> bool {
        self.step_type == TOOL_CALL_STEP
    }

    /// The `params` payload, or `None` when the backend sent nothing useful.
    pub fn params(&self) -> Option<&Value> {
        match &self.params {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::Bool(false) => None,
            params => Some(params),
        }
    }

    /// A string parameter by key.
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params()?.get(key)?.as_str()
    }

    /// Output text, if present and non-empty.
    pub fn output_text(&self) -> Option<&str> {
        self.output.as_deref().filter(|output| !output.is_empty())
    }

    /// File metadata attached by the backend to file-touching tools.
    pub fn file_info(&self) -> Option<FileInfo> {
        let info = self.extra_info.get("file_info")?;
        if info.is_null() {
            return None;
        }
        serde_json::from_value(info.clone()).ok()
    }
}

/// Descriptor of a file produced or touched by a tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    #[serde(default, deserialize_with = "wire::lenient_key")]
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_md5: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}
