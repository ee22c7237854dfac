// Regex literals below are fixed at compile time; failing to compile one
// is a programming error, not a runtime condition.
#![allow(clippy::expect_used)]

//! Tool-call display helpers
//!
//! Agent tool calls arrive either as XML-ish payloads with attributes
//! (`<create-file file_path="...">`) or as parsed JSON argument
//! objects. Rendering clients show one "primary parameter" per call
//! (a filename, a command, a query) next to a tool icon; this module
//! owns that extraction. Extraction is best-effort: anything
//! unrecognized is `None`, never an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Longest primary parameter shown before truncation.
const MAX_PARAM_LEN: usize = 30;

static URL_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"url=["']([^"']+)["']"#).expect("valid regex"));
static GOAL_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"goal=["']([^"']+)["']"#).expect("valid regex"));
static XML_ATTRS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+\s+([^>]+)>").expect("valid regex"));
static FILE_PATH_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"file_path=["']([^"']+)["']"#).expect("valid regex"));
static COMMAND_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:command|cmd)=["']([^"']+)["']"#).expect("valid regex"));
static QUERY_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"query=["']([^"']+)["']"#).expect("valid regex"));
static SERVICE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"service_name=["']([^"']+)["']"#).expect("valid regex"));
static ROUTE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"route=["']([^"']+)["']"#).expect("valid regex"));
static SITE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"site_name=["']([^"']+)["']"#).expect("valid regex"));

/// Icon shown next to a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolIcon {
    FileEdit,
    FileSearch,
    FilePlus,
    FileText,
    FileX,
    Terminal,
    Search,
    Globe,
    ExternalLink,
    Network,
    CloudUpload,
    Code,
    MessageSquare,
    Wrench,
    Cog,
}

/// Icon for a tool name. Browser tools share one icon via prefix match;
/// unknown tools get the generic wrench.
pub fn icon_for_tool(tool_name: &str) -> ToolIcon {
    if tool_name.is_empty() {
        return ToolIcon::Cog;
    }

    let normalized = tool_name.to_lowercase();
    if normalized.starts_with("browser-") {
        return ToolIcon::Globe;
    }

    match normalized.as_str() {
        "create-file" => ToolIcon::FileEdit,
        "str-replace" => ToolIcon::FileSearch,
        "full-file-rewrite" => ToolIcon::FilePlus,
        "read-file" => ToolIcon::FileText,
        "delete-file" => ToolIcon::FileX,
        "execute-command" => ToolIcon::Terminal,
        "web-search" => ToolIcon::Search,
        "crawl-webpage" => ToolIcon::Globe,
        "call-data-provider" => ToolIcon::ExternalLink,
        "get-data-provider-endpoints" | "execute-data-provider-call" => ToolIcon::Network,
        "deploy-site" => ToolIcon::CloudUpload,
        "execute-code" => ToolIcon::Code,
        "ask" => ToolIcon::MessageSquare,
        _ => {
            tracing::debug!(tool = %tool_name, "No icon mapping for tool; using default");
            ToolIcon::Wrench
        }
    }
}

/// Parse a JSON string, falling back to `fallback` on missing or
/// malformed input.
pub fn safe_json_parse<T: DeserializeOwned>(json: Option<&str>, fallback: T) -> T {
    match json {
        Some(s) if !s.is_empty() => serde_json::from_str(s).unwrap_or(fallback),
        _ => fallback,
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() > MAX_PARAM_LEN {
        let head: String = value.chars().take(MAX_PARAM_LEN - 3).collect();
        format!("{head}...")
    } else {
        value.to_string()
    }
}

/// Last path segment, or the whole path when there is none.
fn basename(path: &str) -> String {
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => path.to_string(),
    }
}

fn capture(regex: &Regex, content: &str) -> Option<String> {
    regex
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the primary parameter from an XML-ish tool payload.
pub fn extract_primary_param(tool_name: &str, content: Option<&str>) -> Option<String> {
    let content = content?;
    if content.is_empty() {
        return None;
    }

    let normalized = tool_name.to_lowercase();

    // Browser tools: a URL beats a goal; goals get truncated.
    if normalized.starts_with("browser-") {
        if let Some(url) = capture(&URL_ATTR, content) {
            return Some(url);
        }
        return capture(&GOAL_ATTR, content).map(|goal| truncate(&goal));
    }

    // XML payloads: read attributes off the opening tag first.
    if content.starts_with('<') && content.contains('>') {
        if let Some(attrs) = capture(&XML_ATTRS, content) {
            if let Some(path) = capture(&FILE_PATH_ATTR, &attrs) {
                return Some(basename(&path));
            }
            if normalized == "execute-command" {
                if let Some(cmd) = capture(&COMMAND_ATTR, &attrs) {
                    return Some(truncate(&cmd));
                }
            }
        }
    }

    match normalized.as_str() {
        "create-file" | "full-file-rewrite" | "read-file" | "delete-file" | "str-replace" => {
            capture(&FILE_PATH_ATTR, content).map(|path| basename(&path))
        }
        "execute-command" => capture(&COMMAND_ATTR, content).map(|cmd| truncate(&cmd)),
        "web-search" => capture(&QUERY_ATTR, content).map(|query| truncate(&query)),
        "call-data-provider" => {
            let service = capture(&SERVICE_ATTR, content)?;
            match capture(&ROUTE_ATTR, content) {
                Some(route) => Some(format!("{service}/{route}")),
                None => Some(service),
            }
        }
        "deploy-site" => capture(&SITE_ATTR, content),
        _ => None,
    }
}

fn str_field<'a>(args: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(|v| v.as_str())
}

/// Extract the primary parameter from a parsed JSON arguments object.
pub fn extract_primary_param_from_json(
    tool_name: &str,
    args: &serde_json::Value,
) -> Option<String> {
    if !args.is_object() {
        return None;
    }

    let normalized = tool_name.to_lowercase();

    if normalized.starts_with("browser-") {
        if let Some(url) = str_field(args, "url") {
            return Some(url.to_string());
        }
        return str_field(args, "goal").map(truncate);
    }

    match normalized.as_str() {
        "create-file" | "full-file-rewrite" | "read-file" | "delete-file" | "str-replace" => {
            str_field(args, "file_path")
                .or_else(|| str_field(args, "target_file"))
                .map(basename)
        }
        "execute-command" => str_field(args, "command")
            .or_else(|| str_field(args, "cmd"))
            .map(truncate),
        "web-search" => str_field(args, "query").map(truncate),
        "call-data-provider" => {
            let service = str_field(args, "service_name")?;
            match str_field(args, "route") {
                Some(route) => Some(format!("{service}/{route}")),
                None => Some(service.to_string()),
            }
        }
        "execute-data-provider-call" => {
            let service = str_field(args, "service_name").or_else(|| str_field(args, "service"))?;
            match str_field(args, "route") {
                Some(route) => Some(format!("{service}/{route}")),
                None => Some(service.to_string()),
            }
        }
        "deploy-site" => str_field(args, "site_name").map(String::from),
        _ => {
            // Fallback for tools without a dedicated mapping.
            str_field(args, "path")
                .map(basename)
                .or_else(|| str_field(args, "name").map(String::from))
                .or_else(|| str_field(args, "id").map(String::from))
        }
    }
}
