use anyhow::{Context, Result};
use clap::Subcommand;
use serde_json::json;
use std::path::{Path, PathBuf};
use taskflow_core::{AppConfig, ResourceRecord, parse_knowledge_output, parse_web_output};
use taskflow_observe::Observer;

use crate::output::print_json;

#[derive(Subcommand)]
pub(crate) enum ParseCmd {
    /// Web search output: a JSON array or `{"organic": [...]}`.
    Web { output: PathBuf },
    /// Knowledge search output: a JSON array of chunk strings.
    Knowledge { output: PathBuf },
}

pub(crate) fn run_parse(cwd: &Path, cmd: ParseCmd, json_mode: bool) -> Result<()> {
    let records = match cmd {
        ParseCmd::Web { output } => parse_web_output(&read_output(&output)?),
        ParseCmd::Knowledge { output } => match parse_knowledge_output(&read_output(&output)?) {
            Ok(records) => records,
            Err(err) => {
                let note = err.to_notification();
                let cfg = AppConfig::load(cwd)?;
                Observer::new(cwd, &cfg.observe)?.record_notification(&note)?;
                if json_mode {
                    print_json(&json!({"records": [], "notification": note}))?;
                } else {
                    println!("{}: {}", note.kind.as_str(), note.message);
                }
                return Ok(());
            }
        },
    };

    if json_mode {
        print_json(&json!({"records": records}))?;
    } else {
        for record in &records {
            println!("{}", describe(record));
        }
    }
    Ok(())
}

fn read_output(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn describe(record: &ResourceRecord) -> String {
    let mut line = record.title.clone();
    if let Some(host) = record.host.as_deref().filter(|host| !host.is_empty()) {
        line.push_str(&format!(" ({host})"));
    }
    if let Some(url) = &record.url {
        line.push_str(&format!("\n  {url}"));
    }
    line
}
