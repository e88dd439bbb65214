use anyhow::Result;
use std::path::Path;
use taskflow_core::{CallEvent, EntryState, HistoryEntry, reconcile};

use crate::output::{print_json, read_json};

pub(crate) fn run_history(events_path: &Path, json_mode: bool) -> Result<()> {
    let events: Vec<CallEvent> = read_json(events_path)?;
    let history = reconcile(&events);
    if json_mode {
        print_json(&history)?;
    } else {
        for entry in &history {
            println!("{}", describe(entry));
        }
    }
    Ok(())
}

fn describe(entry: &HistoryEntry) -> String {
    let marker = match entry.state {
        EntryState::Completed => "done",
        EntryState::InFlight => "....",
    };
    format!("[{marker}] {} {}", entry.call_id(), entry.reason())
}
