//! Bounded, cancellable retry for the split-words request.

use std::time::Duration;

use taskflow_core::config::SourcesConfig;
use taskflow_core::{CancellationToken, TaskflowError};

use crate::{FetchError, SplitWordsApi};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
    /// Total attempts including the first; never less than one.
    pub max_attempts: u32,
    /// The only backend code worth retrying.
    pub recoverable_code: i64,
}

impl RetryPolicy {
    pub fn from_config(cfg: &SourcesConfig) -> Self {
        Self {
            delay: cfg.retry_delay(),
            max_attempts: cfg.split_words_max_attempts.max(1),
            recoverable_code: cfg.recoverable_error_code,
        }
    }

    fn is_recoverable(&self, err: &FetchError) -> bool {
        err.code == Some(self.recoverable_code)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&SourcesConfig::default())
    }
}

/// Fetch the split words for an answer.
///
/// Only the recoverable error code is retried, after `policy.delay`, up to
/// `policy.max_attempts` in total. `cancel` is checked before every attempt
/// and after every sleep. `sleep` is injected so hosts and tests control time.
pub fn load_split_words(
    api: &dyn SplitWordsApi,
    message: &str,
    message_id: &str,
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    sleep: &dyn Fn(Duration),
) -> Result<Vec<String>, TaskflowError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        if cancel.is_cancelled() {
            return Err(TaskflowError::Cancelled);
        }
        let err = match api.split_words(message, message_id) {
            Ok(words) => return Ok(words),
            Err(err) => err,
        };
        if !policy.is_recoverable(&err) {
            tracing::debug!(error = %err, "split words failed");
            return Err(TaskflowError::UnrecoverableFetch {
                message: err.message,
            });
        }
        if attempt >= max_attempts {
            tracing::warn!(attempts = attempt, "split words retries exhausted");
            return Err(TaskflowError::RecoverableFetch {
                code: policy.recoverable_code,
                message: err.message,
            });
        }
        tracing::debug!(attempt, delay_ms = policy.delay.as_millis() as u64, "retrying split words");
        sleep(policy.delay);
        if cancel.is_cancelled() {
            return Err(TaskflowError::Cancelled);
        }
        attempt += 1;
    }
}
