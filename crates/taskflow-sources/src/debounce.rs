//! Generation-guarded debounce for chunk lookups.
//!
//! Every keyword change bumps the generation and re-arms the window. Once the
//! window elapses a single request is released for the latest generation.
//! Results tagged with an older generation are stale and must be dropped.

use std::time::{Duration, Instant};

/// A lookup released by the debouncer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRequest {
    pub generation: u64,
    pub keywords: String,
}

#[derive(Debug, Clone)]
pub struct ChunkFetchDebouncer {
    window: Duration,
    generation: u64,
    due_at: Option<Instant>,
    pending_keywords: String,
}

impl ChunkFetchDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: 0,
            due_at: None,
            pending_keywords: String::new(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record a keyword change at `now`; supersedes any pending request.
    pub fn schedule(&mut self, keywords: String, now: Instant) -> u64 {
        self.generation += 1;
        self.due_at = Some(now + self.window);
        self.pending_keywords = keywords;
        self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.due_at.is_some()
    }

    /// Release the pending request if its window has elapsed. Yields at most
    /// one request per generation.
    pub fn take_due(&mut self, now: Instant) -> Option<ChunkRequest> {
        let due_at = self.due_at?;
        if now < due_at {
            return None;
        }
        self.due_at = None;
        Some(ChunkRequest {
            generation: self.generation,
            keywords: std::mem::take(&mut self.pending_keywords),
        })
    }

    /// Whether a result for `generation` still reflects the latest keywords.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }
}
