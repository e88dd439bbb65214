//! Requests the engine hands back to its host. The engine never navigates,
//! focuses or submits anything itself.

use serde::{Deserialize, Serialize};

use crate::error::Notification;
use crate::event::FileInfo;
use crate::resources::ResourceRecord;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum HostIntent {
    OpenDirectFile {
        file: FileInfo,
    },
    OpenKnowledgeResults {
        query: String,
        data: Vec<ResourceRecord>,
    },
    OpenWebResults {
        query: String,
        data: Vec<ResourceRecord>,
    },
    OpenExternalUrl {
        url: String,
    },
    SubmitUserInput {
        task_id: String,
        user_input: String,
    },
    /// Focus the input element and smoothly scroll it into view.
    FocusAndScroll {
        element_id: String,
    },
    Notify(Notification),
}

impl HostIntent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenDirectFile { .. } => "open_direct_file",
            Self::OpenKnowledgeResults { .. } => "open_knowledge_results",
            Self::OpenWebResults { .. } => "open_web_results",
            Self::OpenExternalUrl { .. } => "open_external_url",
            Self::SubmitUserInput { .. } => "submit_user_input",
            Self::FocusAndScroll { .. } => "focus_and_scroll",
            Self::Notify(_) => "notify",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn intents_serialize_with_tag() {
        let intent = HostIntent::SubmitUserInput {
            task_id: "t1".to_string(),
            user_input: "yes".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&intent).expect("encode"),
            json!({"intent": "submit_user_input", "task_id": "t1", "user_input": "yes"})
        );
        assert_eq!(intent.name(), "submit_user_input");
    }

    #[test]
    fn notify_flattens_notification() {
        let intent = HostIntent::Notify(Notification {
            kind: ErrorKind::ParseFailure,
            message: "raw".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&intent).expect("encode"),
            json!({"intent": "notify", "kind": "parse_failure", "message": "raw"})
        );
    }
}
