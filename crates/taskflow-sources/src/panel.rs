//! State of the source dialog for one answer.

use std::time::Instant;

use taskflow_core::config::SourcesConfig;

use crate::chunks::FileChunk;
use crate::debounce::{ChunkFetchDebouncer, ChunkRequest};
use crate::keywords::{KeywordSet, Segment, highlight_answer};
use crate::{FetchError, SourceChunksApi};

#[derive(Debug, Clone)]
pub struct SourcePanel {
    chat_id: String,
    message_id: String,
    message: String,
    keywords: KeywordSet,
    debouncer: ChunkFetchDebouncer,
    files: Vec<FileChunk>,
    selected: Option<String>,
    loading: bool,
}

impl SourcePanel {
    pub fn new(chat_id: &str, message_id: &str, message: &str, cfg: &SourcesConfig) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            message_id: message_id.to_string(),
            message: message.to_string(),
            keywords: KeywordSet::default(),
            debouncer: ChunkFetchDebouncer::new(cfg.debounce()),
            files: Vec::new(),
            selected: None,
            loading: true,
        }
    }

    /// True until the split words arrive.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn files(&self) -> &[FileChunk] {
        &self.files
    }

    pub fn selected(&self) -> Option<&FileChunk> {
        let key = self.selected.as_deref()?;
        self.files.iter().find(|file| file.key() == key)
    }

    /// The answer split into highlight segments for the current keywords.
    pub fn highlighted_answer(&self) -> Vec<Segment> {
        highlight_answer(&self.message, self.keywords.as_slice())
    }

    /// Seed keywords from the split-words result and schedule a lookup.
    pub fn init_keywords(&mut self, words: Vec<String>, now: Instant) {
        self.keywords = KeywordSet::from_words(words);
        self.loading = false;
        self.schedule(now);
    }

    pub fn add_keyword(&mut self, word: &str, now: Instant) -> bool {
        let changed = self.keywords.add(word.trim());
        if changed {
            self.schedule(now);
        }
        changed
    }

    pub fn remove_keyword(&mut self, index: usize, now: Instant) -> bool {
        let changed = self.keywords.remove(index);
        if changed {
            self.schedule(now);
        }
        changed
    }

    pub fn select(&mut self, key: &str) -> bool {
        match self.files.iter().find(|file| file.key() == key) {
            Some(file) if !file.is_masked() => {
                self.selected = Some(file.key());
                true
            }
            _ => false,
        }
    }

    fn schedule(&mut self, now: Instant) {
        self.debouncer.schedule(self.keywords.joined(), now);
    }

    /// Release the debounced lookup, if due. Async hosts run the request
    /// themselves and hand the outcome to [`SourcePanel::accept`].
    pub fn take_due(&mut self, now: Instant) -> Option<ChunkRequest> {
        self.debouncer.take_due(now)
    }

    /// Apply a lookup result. Returns false when the result was stale.
    pub fn accept(&mut self, generation: u64, result: Result<Vec<FileChunk>, FetchError>) -> bool {
        if !self.debouncer.is_current(generation) {
            tracing::debug!(generation, "discarding stale chunk result");
            return false;
        }
        self.files = result.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "source chunk lookup failed");
            Vec::new()
        });
        self.selected = self.files.first().map(FileChunk::key);
        true
    }

    /// Run the due lookup synchronously against `api`.
    pub fn poll(&mut self, api: &dyn SourceChunksApi, now: Instant) -> bool {
        let Some(request) = self.take_due(now) else {
            return false;
        };
        let result = api.source_chunks(&self.chat_id, &self.message_id, &request.keywords);
        self.accept(request.generation, result)
    }
}
