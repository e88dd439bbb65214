//! State engine behind the agent execution view.
//!
//! A backend planner streams a snapshot of its task tree on every update. This
//! crate turns each snapshot into derived view state:
//!
//! - [`history`] merges raw `start`/`end` call events into a display history.
//! - [`tree`] builds the two-level task forest and resolves display status.
//! - [`focus`] keeps the FIFO queue of tasks waiting for user input.
//! - [`tools`] maps history entries to display descriptors and interactions.
//! - [`resources`] parses search tool output into resource records.
//! - [`view`] and [`session`] tie it together for a host.
//!
//! Nothing here performs I/O besides [`config`]; interactions come back to the
//! host as [`HostIntent`] values.

pub mod config;
pub mod error;
pub mod event;
pub mod files;
pub mod focus;
pub mod history;
pub mod intent;
pub mod localize;
pub mod resources;
pub mod session;
pub mod snapshot;
pub mod tools;
pub mod tree;
pub mod view;

mod wire;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use config::AppConfig;
pub use error::{ErrorKind, Notification, TaskflowError};
pub use event::{CallEvent, CallPhase, FileInfo};
pub use files::{DownloadRequest, FileOpenAction, ResultFile};
pub use focus::{InputFocusCoordinator, compose_user_input, next_focus_queue};
pub use history::{EntryState, HistoryEntry, reconcile};
pub use intent::HostIntent;
pub use localize::{Catalog, Localizer};
pub use resources::{ResourceRecord, parse_knowledge_output, parse_web_output};
pub use session::{SnapshotUpdate, TaskflowSession};
pub use snapshot::{ExecutionSnapshot, OutputResult, RawStatus, TaskEntry, TaskSnapshot};
pub use tools::{
    DisplayDescriptor, FileWriteOp, Interaction, ToolIcon, ToolKind, present, present_event,
    strip_hash_suffix,
};
pub use tree::{DisplayStatus, StatusIcon, TaskLevel, TaskNode, TaskTree, build_tree};
pub use view::{ExecutionView, PlanStep, QueueNotice};

pub type Result<T> = anyhow::Result<T>;

/// Directory holding per-workspace settings and logs.
pub fn runtime_dir(workspace: &Path) -> PathBuf {
    workspace.join(".taskflow")
}

/// Shared stop flag for retry loops. Clones observe the same flag; the
/// component that started the work cancels it on teardown.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can guard a new run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token_is_shared_between_clones() {
        let token = CancellationToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
        observer.reset();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn runtime_dir_is_hidden_folder_in_workspace() {
        let dir = runtime_dir(Path::new("/work"));
        assert_eq!(dir, PathBuf::from("/work/.taskflow"));
    }
}
