//! Display text lookup.
//!
//! Hosts usually bring their own translation layer and implement
//! [`Localizer`] over it. [`Catalog`] is the built-in fallback used by the CLI
//! and tests.

/// Resolves a message key, interpolating `{{name}}` placeholders from `vars`.
pub trait Localizer {
    fn t(&self, key: &str, vars: &[(&str, &str)]) -> String;
}

/// Built-in language tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Catalog {
    #[default]
    English,
    Chinese,
}

// key, en, zh
const MESSAGES: &[(&str, &str, &str)] = &[
    ("com_sop_web_search", "Web search", "联网搜索"),
    ("com_sop_search_knowledge_base", "Search knowledge base", "检索知识库"),
    ("com_sop_list_files", "List files", "查看文件列表"),
    ("com_sop_get_file_details", "Get file details", "查看文件详情"),
    ("com_sop_search_files", "Search files", "搜索文件"),
    ("com_sop_read_text_file", "Read file", "读取文件"),
    ("com_sop_add_text_to_file", "Write to file", "写入文件"),
    ("com_sop_replace_file_lines", "Edit file", "修改文件"),
    ("com_sop_using_tool", "Using tool {{0}}", "使用工具 {{0}}"),
    ("com_sop_hours", "hours", "小时"),
    ("com_sop_minutes", "minutes", "分钟"),
    (
        "com_sop_queue_message",
        "Many tasks are running right now. Yours is queued and will start automatically.",
        "当前任务较多，您的任务正在排队，轮到后将自动开始执行。",
    ),
    ("com_sop_estimated_wait", "Estimated wait:", "预计等待时间："),
    ("com_sop_plan_task_path", "Planned task path", "规划任务路径"),
    ("com_sop_execute_tasks", "Executing tasks", "执行任务"),
    ("com_sop_view_all_files", "View all files", "查看全部文件"),
    ("com_sop_waiting_input", "Waiting for input", "等待输入"),
    ("com_sop_please_input", "Please enter", "请输入"),
    ("com_sop_no_feedback", "No user feedback yet", "暂无用户反馈"),
    ("com_sop_user_feedback", "User feedback", "用户反馈"),
    ("com_source_modal_no_files", "No source documents found", "暂无来源文档"),
    ("com_source_modal_mask_name", "No permission to view this file", "暂无权限查看该文件"),
    (
        "com_source_modal_download_layered_pdf",
        "Download the layered PDF",
        "下载分层PDF",
    ),
    ("com_source_modal_download_original", "Download the original file", "下载原文件"),
    (
        "com_source_modal_file_url_invalid",
        "The file address is invalid",
        "文件地址失效",
    ),
];

impl Catalog {
    /// Pick a table from a language tag such as `en`, `zh`, `zh-Hans`.
    pub fn for_language(tag: &str) -> Self {
        if tag.to_ascii_lowercase().starts_with("zh") {
            Self::Chinese
        } else {
            Self::English
        }
    }

    fn lookup(self, key: &str) -> Option<&'static str> {
        MESSAGES
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, en, zh)| match self {
                Self::English => *en,
                Self::Chinese => *zh,
            })
    }
}

impl Localizer for Catalog {
    fn t(&self, key: &str, vars: &[(&str, &str)]) -> String {
        let Some(template) = self.lookup(key) else {
            return key.to_string();
        };
        interpolate(template, vars)
    }
}

/// Replace `{{name}}` placeholders; unknown placeholders are left as-is.
pub fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{{{name}}}}}"), value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_positional_placeholder() {
        let text = Catalog::English.t("com_sop_using_tool", &[("0", "calculator")]);
        assert_eq!(text, "Using tool calculator");
    }

    #[test]
    fn unknown_key_echoes_key() {
        assert_eq!(Catalog::Chinese.t("com_missing", &[]), "com_missing");
    }

    #[test]
    fn language_tags_select_tables() {
        assert_eq!(Catalog::for_language("zh-Hans"), Catalog::Chinese);
        assert_eq!(Catalog::for_language("en-US"), Catalog::English);
        assert_eq!(Catalog::Chinese.t("com_sop_minutes", &[]), "分钟");
    }

    #[test]
    fn unmatched_placeholders_survive() {
        assert_eq!(interpolate("{{a}} and {{b}}", &[("a", "x")]), "x and {{b}}");
    }
}
