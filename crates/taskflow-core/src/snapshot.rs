//! Wire model of the execution snapshot pushed by the backend planner.
//!
//! Decoding is tolerant: a task entry that does not match [`TaskSnapshot`] is
//! kept as [`TaskEntry::Malformed`] so one bad node cannot sink the whole
//! snapshot. The tree builder reports and skips those entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::CallEvent;
use crate::files::ResultFile;
use crate::wire;

/// `event_type` marking a task that renders an input box.
pub const USER_INPUT_EVENT: &str = "user_input";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawStatus {
    NotStarted,
    InProgress,
    Success,
    Failed,
    Terminated,
    #[serde(alias = "waiting_for_user_input")]
    UserInput,
    UserInputCompleted,
}

impl RawStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Terminated => "terminated",
            Self::UserInput => "user_input",
            Self::UserInputCompleted => "user_input_completed",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    #[serde(default, deserialize_with = "wire::lenient_key")]
    pub target: String,
    #[serde(default, deserialize_with = "wire::lenient_key")]
    pub display_target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub answer: Option<String>,
}

/// One task node exactly as the backend sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    #[serde(deserialize_with = "wire::lenient_id")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::nullable")]
    pub task_data: TaskData,
    pub status: RawStatus,
    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub event_type: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub call_reason: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_list")]
    pub history: Vec<CallEvent>,
    #[serde(default, deserialize_with = "wire::nullable")]
    pub children: Vec<TaskEntry>,
    #[serde(default, deserialize_with = "wire::nullable")]
    pub result: TaskResult,
}

/// A task entry that either decoded cleanly or was kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskEntry {
    Task(Box<TaskSnapshot>),
    Malformed(Value),
}

impl TaskEntry {
    pub fn task(&self) -> Option<&TaskSnapshot> {
        match self {
            Self::Task(task) => Some(task),
            Self::Malformed(_) => None,
        }
    }

    /// Explain why a malformed entry failed to decode.
    pub fn malformed_reason(&self) -> Option<String> {
        let Self::Malformed(raw) = self else {
            return None;
        };
        let reason = match serde_json::from_value::<TaskSnapshot>(raw.clone()) {
            Err(err) => err.to_string(),
            Ok(_) => "unrecognized task entry".to_string(),
        };
        let id = match raw.get("id") {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };
        Some(match id {
            Some(id) => format!("task {id}: {reason}"),
            None => reason,
        })
    }
}

impl From<TaskSnapshot> for TaskEntry {
    fn from(task: TaskSnapshot) -> Self {
        Self::Task(Box::new(task))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputResult {
    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub answer: Option<String>,
    #[serde(default, deserialize_with = "wire::nullable")]
    pub final_files: Vec<ResultFile>,
    #[serde(default, deserialize_with = "wire::nullable")]
    pub all_from_session_files: Vec<ResultFile>,
}

/// The whole execution session at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sop: Option<String>,
    #[serde(default, deserialize_with = "wire::nullable")]
    pub tasks: Vec<TaskEntry>,
    #[serde(default, deserialize_with = "wire::nullable")]
    pub output_result: OutputResult,
    #[serde(default, alias = "queueCount", deserialize_with = "wire::nullable")]
    pub queue_count: u32,
    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub task_error: Option<String>,
    #[serde(default, deserialize_with = "wire::lenient_text")]
    pub execute_feedback: Option<String>,
}

impl ExecutionSnapshot {
    /// Decode a snapshot from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Accept either a full snapshot object or a bare array of tasks.
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        if value.is_array() {
            let tasks = serde_json::from_value(value)?;
            return Ok(Self {
                tasks,
                ..Self::default()
            });
        }
        serde_json::from_value(value)
    }
}
