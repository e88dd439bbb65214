//! Call history reconciliation.
//!
//! The raw history of a task is a stream of `start`/`end` events keyed by
//! `call_id`. The display history keeps one entry per call:
//!
//! - an `end` replaces its pending `start` and is shown if it has a reason;
//! - a `start` still pending at the end of the stream is shown, if it has a
//!   reason and no `end` for its call was shown, after every completed entry,
//!   in first-seen order.
//!
//! Completed entries always come first. Events without a reason still take
//! part in matching but are never displayed.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::event::{CallEvent, CallPhase};

/// Whether a history entry is a finished call or one still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryState {
    Completed,
    InFlight,
}

/// A call event selected for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub state: EntryState,
    #[serde(flatten)]
    pub event: CallEvent,
}

impl HistoryEntry {
    pub fn call_id(&self) -> &str {
        &self.event.call_id
    }

    /// Reason text shown above the tool chip. Always non-empty.
    pub fn reason(&self) -> &str {
        self.event.reason().unwrap_or_default()
    }
}

/// Merge raw call events into the display history.
pub fn reconcile(events: &[CallEvent]) -> Vec<HistoryEntry> {
    // insert() on an existing key keeps its first-seen position and takes the
    // newest value, so the last duplicate start wins without reordering.
    let mut pending: IndexMap<&str, &CallEvent> = IndexMap::new();
    let mut shown: HashMap<&str, usize> = HashMap::new();
    let mut completed: Vec<&CallEvent> = Vec::new();

    for event in events {
        let call_id = event.call_id.as_str();
        match event.phase {
            CallPhase::Start => {
                pending.insert(call_id, event);
            }
            CallPhase::End => {
                pending.shift_remove(call_id);
                if !event.has_reason() {
                    continue;
                }
                // A repeated end refreshes the entry in place.
                match shown.get(call_id) {
                    Some(&slot) => completed[slot] = event,
                    None => {
                        shown.insert(call_id, completed.len());
                        completed.push(event);
                    }
                }
            }
            CallPhase::Other => {}
        }
    }

    let in_flight = pending
        .into_values()
        .filter(|start| start.has_reason() && !shown.contains_key(start.call_id.as_str()));

    completed
        .into_iter()
        .map(|event| HistoryEntry {
            state: EntryState::Completed,
            event: event.clone(),
        })
        .chain(in_flight.map(|event| HistoryEntry {
            state: EntryState::InFlight,
            event: event.clone(),
        }))
        .collect()
}
