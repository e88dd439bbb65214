//! The two-level task forest and its display status.
//!
//! The tree is rebuilt from scratch on every snapshot. Only top-level tasks
//! and their direct sub-tasks are modelled; anything nested deeper is dropped
//! with a [`TaskflowError::NestingTooDeep`] diagnostic.

use serde::{Deserialize, Serialize};

use crate::error::TaskflowError;
use crate::history::{HistoryEntry, reconcile};
use crate::snapshot::{RawStatus, TaskEntry, TaskSnapshot, USER_INPUT_EVENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskLevel {
    Top,
    Sub,
}

/// One rendered plan node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    pub id: String,
    pub level: TaskLevel,
    pub target: String,
    pub display_target: String,
    pub status: RawStatus,
    pub event_type: Option<String>,
    pub call_reason: Option<String>,
    pub history: Vec<HistoryEntry>,
    pub children: Vec<TaskNode>,
    pub answer: Option<String>,
}

impl TaskNode {
    pub fn is_top_level(&self) -> bool {
        self.level == TaskLevel::Top
    }

    pub fn awaits_input(&self) -> bool {
        self.status == RawStatus::UserInput
    }

    /// The input box is driven by `event_type`, not by status. Its element
    /// id is the task id.
    pub fn shows_input_box(&self) -> bool {
        self.event_type.as_deref() == Some(USER_INPUT_EVENT)
    }

    /// Summary shown under a finished top-level task.
    pub fn summary(&self) -> Option<&str> {
        if !self.is_top_level() || self.status == RawStatus::Failed {
            return None;
        }
        self.answer.as_deref().filter(|answer| !answer.is_empty())
    }

    pub fn is_collapsible(&self) -> bool {
        match self.level {
            TaskLevel::Top => !self.history.is_empty() || !self.children.is_empty(),
            TaskLevel::Sub => !self.history.is_empty(),
        }
    }

    pub fn display_status(&self) -> DisplayStatus {
        resolve_display_status(self)
    }

    /// Depth-first walk over this node and its children.
    pub fn walk(&self) -> impl Iterator<Item = &TaskNode> {
        std::iter::once(self).chain(self.children.iter())
    }
}

/// Status as rendered next to a task heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DisplayStatus {
    /// The task, or one of its sub-tasks when `via_child`, waits for input.
    AwaitingInput { via_child: bool },
    Failed,
    Terminated,
    Succeeded,
    InProgress,
    InputCompleted,
    NotStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusIcon {
    Paused,
    Check,
    Spinner,
}

impl DisplayStatus {
    pub fn icon(self) -> StatusIcon {
        match self {
            Self::AwaitingInput { .. } | Self::Failed | Self::Terminated => StatusIcon::Paused,
            Self::Succeeded => StatusIcon::Check,
            Self::InProgress | Self::InputCompleted | Self::NotStarted => StatusIcon::Spinner,
        }
    }
}

impl StatusIcon {
    /// Single-character glyph for text renderings.
    pub fn glyph(self) -> char {
        match self {
            Self::Paused => '⏸',
            Self::Check => '✓',
            Self::Spinner => '◌',
        }
    }
}

/// A child waiting for input overrides the node's own status.
pub fn resolve_display_status(node: &TaskNode) -> DisplayStatus {
    if node.children.iter().any(TaskNode::awaits_input) {
        return DisplayStatus::AwaitingInput { via_child: true };
    }
    match node.status {
        RawStatus::UserInput => DisplayStatus::AwaitingInput { via_child: false },
        RawStatus::Failed => DisplayStatus::Failed,
        RawStatus::Terminated => DisplayStatus::Terminated,
        RawStatus::Success => DisplayStatus::Succeeded,
        RawStatus::InProgress => DisplayStatus::InProgress,
        RawStatus::UserInputCompleted => DisplayStatus::InputCompleted,
        RawStatus::NotStarted => DisplayStatus::NotStarted,
    }
}

/// Result of a tree build: the nodes plus anything that was skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskTree {
    pub nodes: Vec<TaskNode>,
    pub diagnostics: Vec<TaskflowError>,
}

impl TaskTree {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node, top-level tasks each followed by their sub-tasks.
    pub fn iter(&self) -> impl Iterator<Item = &TaskNode> {
        self.nodes.iter().flat_map(TaskNode::walk)
    }

    pub fn find(&self, id: &str) -> Option<&TaskNode> {
        self.iter().find(|node| node.id == id)
    }
}

/// Build the task forest from snapshot roots.
pub fn build_tree(roots: &[TaskEntry]) -> TaskTree {
    let mut diagnostics = Vec::new();
    let nodes = roots
        .iter()
        .filter_map(|entry| build_entry(entry, TaskLevel::Top, &mut diagnostics))
        .collect();
    TaskTree { nodes, diagnostics }
}

fn build_entry(
    entry: &TaskEntry,
    level: TaskLevel,
    diagnostics: &mut Vec<TaskflowError>,
) -> Option<TaskNode> {
    let task = match entry {
        TaskEntry::Task(task) => task,
        TaskEntry::Malformed(_) => {
            let reason = entry.malformed_reason().unwrap_or_default();
            tracing::warn!(%reason, "skipping malformed task");
            diagnostics.push(TaskflowError::MalformedSnapshot { reason });
            return None;
        }
    };
    if task.status == RawStatus::NotStarted {
        return None;
    }
    let children = match level {
        TaskLevel::Top => task
            .children
            .iter()
            .filter_map(|child| build_entry(child, TaskLevel::Sub, diagnostics))
            .collect(),
        TaskLevel::Sub => {
            if !task.children.is_empty() {
                tracing::warn!(
                    task_id = %task.id,
                    dropped = task.children.len(),
                    "dropping tasks nested below sub-task"
                );
                diagnostics.push(TaskflowError::NestingTooDeep {
                    task_id: task.id.clone(),
                    dropped: task.children.len(),
                });
            }
            Vec::new()
        }
    };
    Some(node_from(task, level, children))
}

fn node_from(task: &TaskSnapshot, level: TaskLevel, children: Vec<TaskNode>) -> TaskNode {
    TaskNode {
        id: task.id.clone(),
        level,
        target: task.task_data.target.clone(),
        display_target: task.task_data.display_target.clone(),
        status: task.status,
        event_type: task.event_type.clone(),
        call_reason: task.call_reason.clone(),
        history: reconcile(&task.history),
        children,
        answer: task.result.answer.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(value: serde_json::Value) -> Vec<TaskEntry> {
        serde_json::from_value(value).expect("decode tasks")
    }

    #[test]
    fn not_started_tasks_are_absent() {
        let tree = build_tree(&entries(json!([
            {"id": 1, "status": "not_started"},
            {"id": 2, "status": "in_progress",
             "children": [{"id": "2.1", "status": "not_started"}]},
        ])));
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].id, "2");
        assert!(tree.nodes[0].children.is_empty());
        assert!(tree.diagnostics.is_empty());
    }

    #[test]
    fn child_waiting_for_input_overrides_parent_status() {
        let tree = build_tree(&entries(json!([
            {"id": 1, "status": "success",
             "children": [{"id": "1.1", "status": "user_input"}]},
        ])));
        let status = tree.nodes[0].display_status();
        assert_eq!(status, DisplayStatus::AwaitingInput { via_child: true });
        assert_eq!(status.icon(), StatusIcon::Paused);
    }

    #[test]
    fn icons_follow_raw_status() {
        let cases = [
            ("failed", StatusIcon::Paused),
            ("terminated", StatusIcon::Paused),
            ("user_input", StatusIcon::Paused),
            ("success", StatusIcon::Check),
            ("in_progress", StatusIcon::Spinner),
            ("user_input_completed", StatusIcon::Spinner),
        ];
        for (status, icon) in cases {
            let tree = build_tree(&entries(json!([{"id": 1, "status": status}])));
            assert_eq!(tree.nodes[0].display_status().icon(), icon, "{status}");
        }
    }

    #[test]
    fn malformed_entries_are_skipped_with_diagnostic() {
        let tree = build_tree(&entries(json!([
            {"status": "success"},
            {"id": 2, "status": "success"},
        ])));
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.diagnostics.len(), 1);
        assert!(matches!(
            tree.diagnostics[0],
            TaskflowError::MalformedSnapshot { .. }
        ));
    }

    #[test]
    fn malformed_diagnostic_names_the_task() {
        let tree = build_tree(&entries(json!([
            {"id": 7, "status": "success", "task_data": "oops"},
        ])));
        assert!(tree.nodes.is_empty());
        match &tree.diagnostics[..] {
            [TaskflowError::MalformedSnapshot { reason }] => {
                assert!(reason.starts_with("task 7: "), "{reason}");
            }
            other => panic!("unexpected diagnostics: {other:?}"),
        }
    }

    #[test]
    fn third_level_is_dropped_and_reported() {
        let tree = build_tree(&entries(json!([
            {"id": 1, "status": "in_progress", "children": [
                {"id": "1.1", "status": "in_progress", "children": [
                    {"id": "1.1.1", "status": "user_input"}
                ]}
            ]},
        ])));
        let child = &tree.nodes[0].children[0];
        assert_eq!(child.level, TaskLevel::Sub);
        assert!(child.children.is_empty());
        assert_eq!(
            tree.diagnostics,
            vec![TaskflowError::NestingTooDeep {
                task_id: "1.1".to_string(),
                dropped: 1
            }]
        );
        assert!(tree.find("1.1.1").is_none());
    }

    #[test]
    fn history_is_reconciled_per_node() {
        let tree = build_tree(&entries(json!([
            {"id": 1, "status": "in_progress", "history": [
                {"call_id": "a", "status": "start", "call_reason": "begin"},
                {"call_id": "a", "status": "end", "call_reason": "done"},
                {"call_id": "b", "status": "start", "call_reason": "running"},
            ]},
        ])));
        let reasons: Vec<&str> = tree.nodes[0].history.iter().map(|h| h.reason()).collect();
        assert_eq!(reasons, vec!["done", "running"]);
    }

    #[test]
    fn summary_only_for_top_level_non_failed_tasks() {
        let tree = build_tree(&entries(json!([
            {"id": 1, "status": "success", "result": {"answer": "all good"},
             "children": [{"id": "1.1", "status": "success", "result": {"answer": "sub"}}]},
            {"id": 2, "status": "failed", "result": {"answer": "partial"}},
            {"id": 3, "status": "success", "result": {"answer": ""}},
        ])));
        assert_eq!(tree.nodes[0].summary(), Some("all good"));
        assert_eq!(tree.nodes[0].children[0].summary(), None);
        assert_eq!(tree.nodes[1].summary(), None);
        assert_eq!(tree.nodes[2].summary(), None);
    }

    #[test]
    fn collapsible_rules_differ_by_level() {
        let tree = build_tree(&entries(json!([
            {"id": 1, "status": "in_progress",
             "children": [{"id": "1.1", "status": "in_progress"}]},
            {"id": 2, "status": "in_progress"},
        ])));
        assert!(tree.nodes[0].is_collapsible());
        assert!(!tree.nodes[0].children[0].is_collapsible());
        assert!(!tree.nodes[1].is_collapsible());
    }

    #[test]
    fn input_box_follows_event_type() {
        let tree = build_tree(&entries(json!([
            {"id": 1, "status": "in_progress", "event_type": "user_input"},
            {"id": 2, "status": "user_input"},
        ])));
        assert!(tree.nodes[0].shows_input_box());
        assert!(!tree.nodes[1].shows_input_box());
    }

    #[test]
    fn iteration_visits_parents_before_children() {
        let tree = build_tree(&entries(json!([
            {"id": 1, "status": "in_progress",
             "children": [{"id": "1.1", "status": "in_progress"}, {"id": "1.2", "status": "success"}]},
            {"id": 2, "status": "success"},
        ])));
        let ids: Vec<&str> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "1.1", "1.2", "2"]);
    }
}
