//! Drives the engine across snapshot updates for one execution page.

use std::collections::HashSet;

use crate::config::AppConfig;
use crate::error::{Notification, TaskflowError};
use crate::focus::{InputFocusCoordinator, compose_user_input};
use crate::intent::HostIntent;
use crate::localize::{Catalog, Localizer};
use crate::snapshot::ExecutionSnapshot;
use crate::tools::present;
use crate::tree::{TaskTree, build_tree};
use crate::view::ExecutionView;

/// The outcome of applying one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotUpdate {
    pub view: ExecutionView,
    /// Intents to emit, in order.
    pub intents: Vec<HostIntent>,
}

pub struct TaskflowSession<L: Localizer = Catalog> {
    config: AppConfig,
    localizer: L,
    focus: InputFocusCoordinator,
    view: ExecutionView,
    reported: HashSet<Notification>,
}

impl TaskflowSession<Catalog> {
    /// A session using the built-in catalog for `config.language`.
    pub fn new(config: AppConfig) -> Self {
        let localizer = Catalog::for_language(&config.language);
        Self::with_localizer(config, localizer)
    }
}

impl<L: Localizer> TaskflowSession<L> {
    pub fn with_localizer(config: AppConfig, localizer: L) -> Self {
        Self {
            config,
            localizer,
            focus: InputFocusCoordinator::new(),
            view: ExecutionView::default(),
            reported: HashSet::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn localizer(&self) -> &L {
        &self.localizer
    }

    /// The view derived from the latest snapshot.
    pub fn view(&self) -> &ExecutionView {
        &self.view
    }

    pub fn focused_task(&self) -> Option<&str> {
        self.focus.head()
    }

    /// Rebuild all derived state from a new snapshot.
    ///
    /// The previous view stays in place until the new one is complete.
    pub fn apply(&mut self, snapshot: &ExecutionSnapshot) -> SnapshotUpdate {
        let tree = if snapshot.queue_count > 0 {
            TaskTree::default()
        } else {
            build_tree(&snapshot.tasks)
        };
        let mut intents = Vec::new();
        let mut current = HashSet::new();
        for diagnostic in &tree.diagnostics {
            let note = diagnostic.to_notification();
            if !self.reported.contains(&note) {
                intents.push(HostIntent::Notify(note.clone()));
            }
            current.insert(note);
        }
        self.reported = current;
        if let Some(focus) = self.focus.update(&tree) {
            intents.push(focus);
        }
        let view = ExecutionView::from_tree(snapshot, tree, &self.config, &self.localizer);
        tracing::debug!(
            tasks = view.tasks.len(),
            intents = intents.len(),
            queued = view.is_queued(),
            "applied snapshot"
        );
        self.view = view.clone();
        SnapshotUpdate { view, intents }
    }

    /// Validate input for `task_id`, dequeue it, and return the submit
    /// intent followed by any focus change.
    pub fn submit_input(
        &mut self,
        task_id: &str,
        text: &str,
    ) -> Result<Vec<HostIntent>, TaskflowError> {
        let submit = compose_user_input(task_id, text, self.config.input.max_chars)?;
        let mut intents = vec![submit];
        intents.extend(self.focus.submit(task_id));
        Ok(intents)
    }

    /// Resolve the tool chip for `call_id` under `task_id` into an intent.
    pub fn interact(&self, task_id: &str, call_id: &str) -> Option<HostIntent> {
        let node = self
            .view
            .tasks
            .iter()
            .flat_map(|node| node.walk())
            .find(|node| node.id == task_id)?;
        let entry = node.history.iter().find(|entry| entry.call_id() == call_id)?;
        present(entry, &self.localizer)?.interaction?.invoke()
    }
}
