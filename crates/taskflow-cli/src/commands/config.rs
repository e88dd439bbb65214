use anyhow::Result;
use clap::Subcommand;
use serde_json::json;
use std::path::Path;
use taskflow_core::AppConfig;

use crate::output::print_json;

#[derive(Subcommand, Clone, Copy)]
pub(crate) enum ConfigCmd {
    /// Print the merged configuration.
    Show,
    /// Write default project settings if no settings layer exists yet.
    Init,
}

pub(crate) fn run_config(cwd: &Path, cmd: ConfigCmd, json_mode: bool) -> Result<()> {
    match cmd {
        ConfigCmd::Show => {
            let cfg = AppConfig::load(cwd)?;
            if json_mode {
                print_json(&cfg)?;
            } else {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            }
        }
        ConfigCmd::Init => {
            let cfg = AppConfig::ensure(cwd)?;
            let path = AppConfig::project_settings_path(cwd);
            if json_mode {
                print_json(&json!({
                    "path": path.display().to_string(),
                    "config": cfg,
                }))?;
            } else {
                println!("settings: {}", path.display());
            }
        }
    }
    Ok(())
}
