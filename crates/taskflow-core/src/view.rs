//! Everything the execution page renders, derived from one snapshot.

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::Notification;
use crate::files::ResultFile;
use crate::localize::Localizer;
use crate::snapshot::ExecutionSnapshot;
use crate::tree::{TaskNode, TaskTree, build_tree};

/// Shown instead of the task list while the session waits in the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueNotice {
    pub queue_count: u32,
    pub wait_minutes: u32,
    pub hours: u32,
    pub minutes: u32,
    pub message: String,
    /// e.g. "Estimated wait: 1 hours 4 minutes".
    pub wait_text: String,
}

impl QueueNotice {
    pub fn new(queue_count: u32, minutes_per_position: u32, localizer: &dyn Localizer) -> Self {
        let wait_minutes = queue_count.saturating_mul(minutes_per_position);
        let hours = wait_minutes / 60;
        let minutes = wait_minutes % 60;
        let minutes_text = format!("{minutes} {}", localizer.t("com_sop_minutes", &[]));
        let duration = if hours > 0 {
            format!("{hours} {} {minutes_text}", localizer.t("com_sop_hours", &[]))
        } else {
            minutes_text
        };
        Self {
            queue_count,
            wait_minutes,
            hours,
            minutes,
            message: localizer.t("com_sop_queue_message", &[]),
            wait_text: format!("{} {duration}", localizer.t("com_sop_estimated_wait", &[])),
        }
    }
}

/// One numbered line of the planned task path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub index: usize,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueNotice>,
    pub plan_path: Vec<PlanStep>,
    pub tasks: Vec<TaskNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Notification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub final_files: Vec<ResultFile>,
    pub all_files: Vec<ResultFile>,
}

impl ExecutionView {
    pub fn derive(
        snapshot: &ExecutionSnapshot,
        config: &AppConfig,
        localizer: &dyn Localizer,
    ) -> Self {
        let tree = if snapshot.queue_count > 0 {
            TaskTree::default()
        } else {
            build_tree(&snapshot.tasks)
        };
        Self::from_tree(snapshot, tree, config, localizer)
    }

    /// Assemble the view around an already built tree.
    pub fn from_tree(
        snapshot: &ExecutionSnapshot,
        tree: TaskTree,
        config: &AppConfig,
        localizer: &dyn Localizer,
    ) -> Self {
        let output = &snapshot.output_result;
        let mut view = Self {
            title: snapshot.title.clone(),
            status: snapshot.status.clone(),
            feedback: snapshot.execute_feedback.clone(),
            task_error: snapshot.task_error.clone(),
            summary: output.answer.clone().filter(|answer| !answer.is_empty()),
            final_files: output.final_files.clone(),
            all_files: output.all_from_session_files.clone(),
            ..Self::default()
        };
        if snapshot.queue_count > 0 {
            view.queue = Some(QueueNotice::new(
                snapshot.queue_count,
                config.queue.minutes_per_position,
                localizer,
            ));
            return view;
        }
        view.plan_path = snapshot
            .tasks
            .iter()
            .filter_map(|entry| entry.task())
            .enumerate()
            .map(|(i, task)| PlanStep {
                index: i + 1,
                target: task.task_data.target.clone(),
            })
            .collect();
        view.diagnostics = tree.diagnostics.iter().map(Notification::from).collect();
        view.tasks = tree.nodes;
        view
    }

    pub fn is_queued(&self) -> bool {
        self.queue.is_some()
    }

    /// Final files followed by every session file, as the preview drawer
    /// pages through them.
    pub fn merged_files(&self) -> Vec<&ResultFile> {
        self.final_files.iter().chain(self.all_files.iter()).collect()
    }

    pub fn show_all_files_entry(&self) -> bool {
        self.all_files.len() > self.final_files.len()
    }

    pub fn feedback_text(&self, localizer: &dyn Localizer) -> String {
        self.feedback
            .clone()
            .filter(|feedback| !feedback.is_empty())
            .unwrap_or_else(|| localizer.t("com_sop_no_feedback", &[]))
    }
}
