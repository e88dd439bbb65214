use anyhow::Result;
use chrono::Utc;
use serde_json::json;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use taskflow_core::config::ObserveConfig;
use taskflow_core::{HostIntent, Notification, runtime_dir};

/// Journals emitted intents and notifications as JSON lines under
/// `<workspace>/.taskflow/observe.log`.
pub struct Observer {
    log_path: PathBuf,
    enabled: bool,
    verbose: bool,
}

impl Observer {
    pub fn new(workspace: &Path, cfg: &ObserveConfig) -> Result<Self> {
        let dir = runtime_dir(workspace);
        if cfg.enabled {
            fs::create_dir_all(&dir)?;
        }
        Ok(Self {
            log_path: dir.join("observe.log"),
            enabled: cfg.enabled,
            verbose: cfg.verbose,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn record_intent(&self, intent: &HostIntent) -> Result<()> {
        self.verbose_log(&format!("intent {}", intent.name()));
        self.append_record(json!({
            "at": Utc::now().to_rfc3339(),
            "type": "intent",
            "name": intent.name(),
            "payload": intent,
        }))
    }

    pub fn record_notification(&self, note: &Notification) -> Result<()> {
        self.append_record(json!({
            "at": Utc::now().to_rfc3339(),
            "type": "notification",
            "kind": note.kind,
            "message": note.message,
        }))
    }

    /// Enable or disable verbose logging to stderr.
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Log a message to stderr with `[taskflow]` prefix when verbose mode is on.
    pub fn verbose_log(&self, msg: &str) {
        if self.verbose {
            eprintln!("[taskflow] {msg}");
        }
    }

    /// Log a warning to stderr and, when journaling is on, to the log file.
    pub fn warn_log(&self, msg: &str) {
        eprintln!("[taskflow WARN] {msg}");
        let _ = self.append_record(json!({
            "at": Utc::now().to_rfc3339(),
            "type": "warn",
            "message": msg,
        }));
    }

    fn append_record(&self, record: serde_json::Value) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;
        writeln!(f, "{}", serde_json::to_string(&record)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskflow_core::ErrorKind;

    fn lines(path: &Path) -> Vec<serde_json::Value> {
        fs::read_to_string(path)
            .expect("read log")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect()
    }

    #[test]
    fn intents_and_notifications_are_journaled() {
        let workspace = tempfile::tempdir().expect("tempdir");
        let observer = Observer::new(workspace.path(), &ObserveConfig::default()).expect("observer");
        observer
            .record_intent(&HostIntent::FocusAndScroll {
                element_id: "t1".to_string(),
            })
            .expect("intent");
        observer
            .record_notification(&Notification {
                kind: ErrorKind::ParseFailure,
                message: "raw".to_string(),
            })
            .expect("notification");
        observer.warn_log("careful");

        let records = lines(observer.log_path());
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["name"], "focus_and_scroll");
        assert_eq!(records[0]["payload"]["element_id"], "t1");
        assert_eq!(records[1]["kind"], "parse_failure");
        assert_eq!(records[2]["type"], "warn");
    }

    #[test]
    fn disabled_observer_writes_nothing() {
        let workspace = tempfile::tempdir().expect("tempdir");
        let cfg = ObserveConfig {
            enabled: false,
            verbose: false,
        };
        let observer = Observer::new(workspace.path(), &cfg).expect("observer");
        observer
            .record_intent(&HostIntent::OpenExternalUrl {
                url: "https://example.com".to_string(),
            })
            .expect("intent");
        assert!(!observer.log_path().exists());
    }
}
