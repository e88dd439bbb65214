//! JSON fixtures shaped like the planner's snapshot stream.

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{Value, json};

/// A `start` event for a tool call.
pub fn start(call_id: &str, name: &str, reason: &str) -> Value {
    json!({
        "call_id": call_id,
        "status": "start",
        "call_reason": reason,
        "name": name,
        "step_type": "tool_call",
        "params": null,
    })
}

/// An `end` event for a tool call.
pub fn end(call_id: &str, name: &str, reason: &str) -> Value {
    json!({
        "call_id": call_id,
        "status": "end",
        "call_reason": reason,
        "name": name,
        "step_type": "tool_call",
        "params": null,
    })
}

/// Set `key` on a JSON object fixture.
pub fn with(mut value: Value, key: &str, field: Value) -> Value {
    if let Some(object) = value.as_object_mut() {
        object.insert(key.to_string(), field);
    }
    value
}

/// A finished web search with flat-array output.
pub fn web_search_end(call_id: &str, query: &str, hits: &[(&str, &str)]) -> Value {
    let output: Vec<Value> = hits
        .iter()
        .map(|(title, url)| json!({"title": title, "snippet": title, "url": url}))
        .collect();
    let event = end(call_id, "web_search", &format!("searching for {query}"));
    let event = with(event, "params", json!({"query": query}));
    with(event, "output", Value::String(Value::Array(output).to_string()))
}

/// Builder for one task node.
#[derive(Debug, Clone)]
pub struct TaskFixture {
    value: Value,
}

pub fn task(id: &str, status: &str) -> TaskFixture {
    TaskFixture {
        value: json!({
            "id": id,
            "task_data": {"target": format!("target {id}"), "display_target": format!("Task {id}")},
            "status": status,
            "history": [],
            "children": [],
            "result": {"answer": null},
        }),
    }
}

impl TaskFixture {
    pub fn history(mut self, events: Vec<Value>) -> Self {
        self.value["history"] = Value::Array(events);
        self
    }

    pub fn children(mut self, children: Vec<TaskFixture>) -> Self {
        self.value["children"] = Value::Array(children.into_iter().map(|c| c.value).collect());
        self
    }

    pub fn awaiting_input(mut self, prompt: &str) -> Self {
        self.value["event_type"] = json!("user_input");
        self.value["call_reason"] = json!(prompt);
        self
    }

    pub fn answer(mut self, answer: &str) -> Self {
        self.value["result"] = json!({"answer": answer});
        self
    }

    pub fn build(self) -> Value {
        self.value
    }
}

/// A full execution snapshot around `tasks`.
pub fn snapshot(tasks: Vec<TaskFixture>) -> Value {
    json!({
        "status": "in_progress",
        "title": "fixture session",
        "tasks": tasks.into_iter().map(TaskFixture::build).collect::<Vec<_>>(),
        "output_result": {"answer": null, "final_files": [], "all_from_session_files": []},
        "queue_count": 0,
    })
}

/// Write `value` as pretty JSON into `dir/name` and return the path.
pub fn write_fixture(dir: &Path, name: &str, value: &Value) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value)?)?;
    Ok(path)
}

/// A scratch workspace directory removed on drop.
pub fn workspace() -> Result<tempfile::TempDir> {
    Ok(tempfile::tempdir()?)
}
