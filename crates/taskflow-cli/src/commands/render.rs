use anyhow::{Context, Result, anyhow};
use clap::Args;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use taskflow_core::{
    AppConfig, ExecutionSnapshot, ExecutionView, HostIntent, Localizer, TaskNode, TaskflowSession,
    present,
};
use taskflow_observe::Observer;

use crate::output::{print_json, read_json};

#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Snapshot files, applied in the order given.
    #[arg(required = true)]
    snapshots: Vec<PathBuf>,

    /// Submit user input after the last snapshot, e.g. `--submit 1.2=yes`.
    #[arg(long, value_name = "TASK_ID=TEXT")]
    submit: Vec<String>,
}

pub(crate) fn run_render(cwd: &Path, args: RenderArgs, json_mode: bool, verbose: bool) -> Result<()> {
    let cfg = AppConfig::load(cwd)?;
    let mut observer = Observer::new(cwd, &cfg.observe)?;
    if verbose {
        observer.set_verbose(true);
    }
    let mut session = TaskflowSession::new(cfg);
    let mut intents = Vec::new();

    for path in &args.snapshots {
        let snapshot = ExecutionSnapshot::from_value(read_json(path)?)
            .with_context(|| format!("invalid snapshot in {}", path.display()))?;
        tracing::debug!(path = %path.display(), tasks = snapshot.tasks.len(), "applying snapshot");
        let update = session.apply(&snapshot);
        observer.verbose_log(&format!(
            "{}: {} tasks, {} intents",
            path.display(),
            update.view.tasks.len(),
            update.intents.len()
        ));
        intents.extend(update.intents);
    }

    for submission in &args.submit {
        let (task_id, text) = submission
            .split_once('=')
            .ok_or_else(|| anyhow!("--submit expects TASK_ID=TEXT, got {submission}"))?;
        match session.submit_input(task_id, text) {
            Ok(submitted) => intents.extend(submitted),
            Err(err) => {
                observer.warn_log(&format!("input for {task_id} rejected: {err}"));
                intents.push(HostIntent::Notify(err.to_notification()));
            }
        }
    }

    for intent in &intents {
        observer.record_intent(intent)?;
    }

    if json_mode {
        let mut view = serde_json::to_value(session.view())?;
        if let Some(tasks) = view.get_mut("tasks") {
            attach_chips(tasks, &session.view().tasks, session.localizer())?;
        }
        print_json(&json!({
            "view": view,
            "intents": intents,
            "focused": session.focused_task(),
        }))?;
        return Ok(());
    }

    print!("{}", render_text(session.view(), session.localizer()));
    for intent in &intents {
        println!("-> {}", describe_intent(intent));
    }
    Ok(())
}

fn render_text(view: &ExecutionView, localizer: &dyn Localizer) -> String {
    let mut out = String::new();
    if let Some(title) = &view.title {
        out.push_str(&format!("{title}\n"));
    }
    if let Some(queue) = &view.queue {
        out.push_str(&format!("{}\n{}\n", queue.message, queue.wait_text));
        return out;
    }
    if !view.plan_path.is_empty() {
        out.push_str(&format!("{}\n", localizer.t("com_sop_plan_task_path", &[])));
        for step in &view.plan_path {
            out.push_str(&format!("  {}. {}\n", step.index, step.target));
        }
    }
    for node in &view.tasks {
        render_node(&mut out, node, 0, localizer);
    }
    if let Some(error) = &view.task_error {
        out.push_str(&format!("error: {error}\n"));
    }
    if let Some(summary) = &view.summary {
        out.push_str(&format!("{summary}\n"));
    }
    for file in &view.final_files {
        out.push_str(&format!("[file] {}\n", file.file_name));
    }
    if view.show_all_files_entry() {
        out.push_str(&format!("{}\n", localizer.t("com_sop_view_all_files", &[])));
    }
    out
}

/// Add each history entry's tool chip under `display`, next to the entry.
fn attach_chips(tasks: &mut Value, nodes: &[TaskNode], localizer: &dyn Localizer) -> Result<()> {
    let Some(values) = tasks.as_array_mut() else {
        return Ok(());
    };
    for (value, node) in values.iter_mut().zip(nodes) {
        if let Some(history) = value.get_mut("history").and_then(Value::as_array_mut) {
            for (entry_value, entry) in history.iter_mut().zip(&node.history) {
                if let (Some(object), Some(chip)) =
                    (entry_value.as_object_mut(), present(entry, localizer))
                {
                    object.insert("display".to_string(), serde_json::to_value(chip)?);
                }
            }
        }
        if let Some(children) = value.get_mut("children") {
            attach_chips(children, &node.children, localizer)?;
        }
    }
    Ok(())
}

fn render_node(out: &mut String, node: &TaskNode, depth: usize, localizer: &dyn Localizer) {
    let indent = "  ".repeat(depth);
    // Only top-level headings carry a status icon.
    if depth == 0 {
        let glyph = node.display_status().icon().glyph();
        out.push_str(&format!("{glyph} {}\n", node.display_target));
    } else {
        out.push_str(&format!("{indent}{}\n", node.display_target));
    }
    for entry in &node.history {
        match present(entry, localizer) {
            Some(chip) => out.push_str(&format!("{indent}    {} [{}]\n", entry.reason(), chip.label)),
            None => out.push_str(&format!("{indent}    {}\n", entry.reason())),
        }
    }
    if node.shows_input_box() {
        let prompt = node
            .call_reason
            .clone()
            .unwrap_or_else(|| localizer.t("com_sop_please_input", &[]));
        out.push_str(&format!("{indent}    > {prompt}\n"));
    }
    for child in &node.children {
        render_node(out, child, depth + 1, localizer);
    }
    if let Some(summary) = node.summary() {
        out.push_str(&format!("{indent}    = {summary}\n"));
    }
}

fn describe_intent(intent: &HostIntent) -> String {
    match intent {
        HostIntent::FocusAndScroll { element_id } => format!("focus {element_id}"),
        HostIntent::SubmitUserInput { task_id, user_input } => {
            format!("submit {task_id}: {user_input}")
        }
        HostIntent::Notify(note) => format!("notify {}: {}", note.kind.as_str(), note.message),
        other => other.name().to_string(),
    }
}
