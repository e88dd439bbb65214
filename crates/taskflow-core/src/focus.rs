//! FIFO queue of tasks waiting for user input.
//!
//! The head of the queue owns keyboard focus. Tasks are appended in discovery
//! order (top-level tasks first, then the sub-tasks of the first branch that
//! has a waiting sub-task) and leave the queue when they stop waiting or when
//! the user submits input for them.

use std::collections::HashSet;

use indexmap::IndexSet;

use crate::error::TaskflowError;
use crate::intent::HostIntent;
use crate::tree::{TaskNode, TaskTree};

/// Compute the queue after a tree rebuild.
///
/// Ids from `previous` that still wait for input keep their position; newly
/// waiting tasks are appended.
pub fn next_focus_queue(previous: &IndexSet<String>, tree: &TaskTree) -> IndexSet<String> {
    let mut queue: IndexSet<String> = previous
        .iter()
        .filter(|id| tree.find(id).is_some_and(TaskNode::awaits_input))
        .cloned()
        .collect();
    for id in discover_waiting(tree) {
        queue.insert(id.to_string());
    }
    queue
}

/// Waiting task ids in discovery order. Only one branch may hold waiting
/// sub-tasks at a time; the first such branch wins.
fn discover_waiting(tree: &TaskTree) -> impl Iterator<Item = &str> {
    let top = tree.nodes.iter().filter(|node| node.awaits_input());
    let branch = tree
        .nodes
        .iter()
        .find(|node| node.children.iter().any(TaskNode::awaits_input));
    let subs = branch
        .into_iter()
        .flat_map(|node| node.children.iter())
        .filter(|child| child.awaits_input());
    top.chain(subs).map(|node| node.id.as_str())
}

/// Owns the focus queue across snapshot updates.
#[derive(Debug, Clone, Default)]
pub struct InputFocusCoordinator {
    queue: IndexSet<String>,
    // Submitted ids stay suppressed until the backend moves them out of
    // user_input, otherwise the next snapshot would queue them again.
    submitted: HashSet<String>,
}

impl InputFocusCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the task whose input should hold focus.
    pub fn head(&self) -> Option<&str> {
        self.queue.first().map(String::as_str)
    }

    pub fn queue(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Recompute the queue for a freshly built tree. Returns a focus request
    /// when the head moved to a different task.
    pub fn update(&mut self, tree: &TaskTree) -> Option<HostIntent> {
        let before = self.head().map(str::to_string);
        self.submitted
            .retain(|id| tree.find(id).is_some_and(TaskNode::awaits_input));
        let mut next = next_focus_queue(&self.queue, tree);
        next.retain(|id| !self.submitted.contains(id));
        self.queue = next;
        self.focus_change(before)
    }

    /// Drop a task after its input was submitted.
    pub fn submit(&mut self, task_id: &str) -> Option<HostIntent> {
        let before = self.head().map(str::to_string);
        self.queue.shift_remove(task_id);
        self.submitted.insert(task_id.to_string());
        self.focus_change(before)
    }

    fn focus_change(&self, before: Option<String>) -> Option<HostIntent> {
        let head = self.head()?;
        if before.as_deref() == Some(head) {
            return None;
        }
        tracing::debug!(task_id = head, "input focus moved");
        Some(HostIntent::FocusAndScroll {
            element_id: head.to_string(),
        })
    }
}

/// Validate and package user input for a task.
pub fn compose_user_input(
    task_id: &str,
    text: &str,
    max_chars: usize,
) -> Result<HostIntent, TaskflowError> {
    if text.trim().is_empty() {
        return Err(TaskflowError::InvalidInput {
            reason: "input is empty".to_string(),
        });
    }
    let user_input = match text.char_indices().nth(max_chars) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    };
    Ok(HostIntent::SubmitUserInput {
        task_id: task_id.to_string(),
        user_input,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::TaskEntry;
    use crate::tree::build_tree;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> TaskTree {
        let entries: Vec<TaskEntry> = serde_json::from_value(value).expect("decode tasks");
        build_tree(&entries)
    }

    fn ids(queue: &IndexSet<String>) -> Vec<&str> {
        queue.iter().map(String::as_str).collect()
    }

    #[test]
    fn queue_moves_to_newly_waiting_task() {
        let first = tree(json!([
            {"id": 1, "status": "user_input"},
            {"id": 2, "status": "success"},
        ]));
        let second = tree(json!([
            {"id": 1, "status": "success"},
            {"id": 2, "status": "user_input"},
        ]));
        let queue = next_focus_queue(&IndexSet::new(), &first);
        assert_eq!(ids(&queue), vec!["1"]);
        let queue = next_focus_queue(&queue, &second);
        assert_eq!(ids(&queue), vec!["2"]);
    }

    #[test]
    fn existing_entries_keep_their_position() {
        let first = tree(json!([{"id": "b", "status": "user_input"}]));
        let second = tree(json!([
            {"id": "a", "status": "user_input"},
            {"id": "b", "status": "user_input"},
        ]));
        let queue = next_focus_queue(&IndexSet::new(), &first);
        let queue = next_focus_queue(&queue, &second);
        assert_eq!(ids(&queue), vec!["b", "a"]);
    }

    #[test]
    fn only_first_branch_with_waiting_children_is_discovered() {
        let snapshot = tree(json!([
            {"id": 1, "status": "in_progress", "children": [
                {"id": "1.1", "status": "user_input"},
                {"id": "1.2", "status": "user_input"},
            ]},
            {"id": 2, "status": "user_input", "children": [
                {"id": "2.1", "status": "user_input"},
            ]},
        ]));
        let queue = next_focus_queue(&IndexSet::new(), &snapshot);
        assert_eq!(ids(&queue), vec!["2", "1.1", "1.2"]);
    }

    #[test]
    fn coordinator_emits_focus_only_when_head_changes() {
        let mut focus = InputFocusCoordinator::new();
        let waiting = tree(json!([{"id": 1, "status": "user_input"}]));
        assert_eq!(
            focus.update(&waiting),
            Some(HostIntent::FocusAndScroll {
                element_id: "1".to_string()
            })
        );
        assert_eq!(focus.update(&waiting), None);
        assert_eq!(focus.head(), Some("1"));

        let done = tree(json!([{"id": 1, "status": "success"}]));
        assert_eq!(focus.update(&done), None);
        assert!(focus.is_empty());
    }

    #[test]
    fn submitted_task_is_not_requeued_by_stale_snapshot() {
        let mut focus = InputFocusCoordinator::new();
        let waiting = tree(json!([
            {"id": 1, "status": "user_input"},
            {"id": 2, "status": "user_input"},
        ]));
        focus.update(&waiting);
        assert_eq!(
            focus.submit("1"),
            Some(HostIntent::FocusAndScroll {
                element_id: "2".to_string()
            })
        );
        assert_eq!(focus.update(&waiting), None);
        assert_eq!(focus.queue().collect::<Vec<_>>(), vec!["2"]);

        let resolved = tree(json!([
            {"id": 1, "status": "in_progress"},
            {"id": 2, "status": "user_input"},
        ]));
        focus.update(&resolved);
        let again = tree(json!([
            {"id": 1, "status": "user_input"},
            {"id": 2, "status": "user_input"},
        ]));
        focus.update(&again);
        assert_eq!(focus.queue().collect::<Vec<_>>(), vec!["2", "1"]);
    }

    #[test]
    fn blank_input_is_rejected() {
        let err = compose_user_input("t", "   \n", 10).expect_err("blank");
        assert!(matches!(err, TaskflowError::InvalidInput { .. }));
    }

    #[test]
    fn long_input_is_truncated_on_char_boundary() {
        let intent = compose_user_input("t", "你好世界", 2).expect("valid");
        assert_eq!(
            intent,
            HostIntent::SubmitUserInput {
                task_id: "t".to_string(),
                user_input: "你好".to_string()
            }
        );
    }
}
