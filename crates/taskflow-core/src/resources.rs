//! Normalizes search tool output into [`ResourceRecord`]s.
//!
//! Knowledge-base output is `{"结果": [chunk, ...]}` where each chunk is either
//! the tagged format (`<file_title>`/`<paragraph_content>`) or the legacy
//! `title\n--------\ncontent` layout. Web output is either a flat array of
//! hits or an MCP-style `{"content": [{"text": "<json>"}]}` envelope with
//! Chinese field names.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TaskflowError;
use crate::files::file_extension;

static FILE_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<file_title>(.*?)</file_title>").unwrap());
static PARAGRAPH_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<paragraph_content>(.*?)</paragraph_content>").unwrap());
// Legacy chunks were double-encoded, so the separators are usually a literal
// backslash-n rather than a newline.
static LEGACY_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(?:\\n|\n)").unwrap());
static LEGACY_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(?:\\n|\n)--------(?:\\n|\n)(.*)$").unwrap());
static URL_HOST: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^https?://([^/]+)").unwrap());
static SENTENCE_END: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?，。,！？；：]").unwrap());

const KNOWLEDGE_RESULTS: &str = "结果";
const WEB_RESULTS: &str = "搜索结果";
const WEB_TITLE: &str = "标题";
const WEB_SUMMARY: &str = "摘要";
const WEB_LINK: &str = "链接";
const WEB_THUMBNAIL: &str = "缩略图";

/// A search hit in the shape shared by the knowledge and web panels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Parse knowledge-base search output. Anything unexpected is a
/// [`TaskflowError::ParseFailure`] carrying the raw text.
pub fn parse_knowledge_output(output: &str) -> Result<Vec<ResourceRecord>, TaskflowError> {
    let failure = || TaskflowError::ParseFailure {
        raw: output.to_string(),
    };
    let value: Value = serde_json::from_str(output).map_err(|_| failure())?;
    let chunks = value
        .get(KNOWLEDGE_RESULTS)
        .and_then(Value::as_array)
        .ok_or_else(failure)?;
    chunks
        .iter()
        .map(|chunk| chunk.as_str().map(knowledge_record).ok_or_else(failure))
        .collect()
}

fn knowledge_record(chunk: &str) -> ResourceRecord {
    let (title_re, content_re) = if chunk.starts_with('{') {
        (&*FILE_TITLE, &*PARAGRAPH_CONTENT)
    } else {
        (&*LEGACY_TITLE, &*LEGACY_CONTENT)
    };
    let title = capture(title_re, chunk).unwrap_or_default();
    let content = capture(content_re, chunk).unwrap_or_default();
    ResourceRecord {
        suffix: Some(file_extension(&title)),
        title,
        content,
        ..ResourceRecord::default()
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse web search output. Never fails: unrecognized output becomes a single
/// record whose title is the first sentence of the text.
pub fn parse_web_output(output: &str) -> Vec<ResourceRecord> {
    match try_parse_web(output) {
        Some(records) => records,
        None => {
            tracing::warn!(len = output.len(), "web search output not recognized, using raw text");
            vec![web_fallback(output)]
        }
    }
}

fn try_parse_web(output: &str) -> Option<Vec<ResourceRecord>> {
    let value: Value = serde_json::from_str(output).ok()?;
    if let Value::Array(hits) = &value {
        return hits.iter().map(flat_hit).collect();
    }
    let text = value.get("content")?.get(0)?.get("text")?.as_str()?;
    let inner: Value = serde_json::from_str(text).ok()?;
    inner
        .get(WEB_RESULTS)?
        .as_array()?
        .iter()
        .map(localized_hit)
        .collect()
}

fn flat_hit(hit: &Value) -> Option<ResourceRecord> {
    let url = hit.get("url")?.as_str()?;
    Some(web_record(
        str_field(hit, "title"),
        str_field(hit, "snippet"),
        url,
        str_field(hit, "thumbnail"),
    ))
}

fn localized_hit(hit: &Value) -> Option<ResourceRecord> {
    let url = hit.get(WEB_LINK)?.as_str()?;
    Some(web_record(
        str_field(hit, WEB_TITLE),
        str_field(hit, WEB_SUMMARY),
        url,
        str_field(hit, WEB_THUMBNAIL),
    ))
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn web_record(title: String, content: String, url: &str, thumbnail: String) -> ResourceRecord {
    ResourceRecord {
        title,
        suffix: None,
        content,
        host: Some(url_host(url)),
        url: Some(url.to_string()),
        thumbnail: Some(thumbnail),
    }
}

/// Host part of an http(s) URL; other strings are returned unchanged.
pub fn url_host(url: &str) -> String {
    capture(&URL_HOST, url).unwrap_or_else(|| url.to_string())
}

fn web_fallback(output: &str) -> ResourceRecord {
    let first = SENTENCE_END.split(output).next().unwrap_or_default();
    ResourceRecord {
        title: format!("{first}..."),
        suffix: None,
        content: output.to_string(),
        host: Some(String::new()),
        url: Some(String::new()),
        thumbnail: Some(String::new()),
    }
}
