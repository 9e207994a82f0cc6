//! Static intent pattern catalog.
//!
//! Entries are ordered; the classifier scores every matching entry and keeps
//! the first of the best. Entries share no state, so each extractor only sees
//! its own captures and the raw text.

use super::types::{IntentKind, SlotMap};
use regex::{Captures, Regex};
use std::sync::OnceLock;

pub type Extractor = fn(&Captures<'_>) -> SlotMap;

pub struct CatalogEntry {
    pub kind: IntentKind,
    pub patterns: Vec<Regex>,
    /// Lower-case cues that boost confidence when present in the input.
    pub keywords: &'static [&'static str],
    pub extract: Extractor,
}

pub fn catalog() -> &'static [CatalogEntry] {
    static CATALOG: OnceLock<Vec<CatalogEntry>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("catalog pattern must compile"))
        .collect()
}

fn build_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            kind: IntentKind::ConfirmRedirect,
            patterns: compile(&[
                r"(?i)^\s*(?:take\s+me\s+there|go\s+there|open\s+it|show\s+it(?:\s+to\s+me)?|let'?s\s+go\s+there)\b",
            ]),
            keywords: &["there", "it", "take me"],
            extract: |_| SlotMap::new(),
        },
        CatalogEntry {
            kind: IntentKind::CreateProject,
            patterns: compile(&[
                r"(?i)\b(?:create|make|start|add|set\s+up|new)\s+(?:a\s+)?(?:new\s+)?project\b(?:\s+(?:called|named|titled))?\s*[:\-]?\s*(?P<rest>.*)$",
            ]),
            keywords: &["project", "create", "new"],
            extract: extract_project,
        },
        CatalogEntry {
            kind: IntentKind::CreateTestCase,
            patterns: compile(&[
                r"(?i)\b(?:create|add|make|write|new)\s+(?:a\s+)?(?:new\s+)?test[\s-]*case\b(?:\s+(?:called|named|titled|for|to))?\s*[:\-]?\s*(?P<rest>.*)$",
            ]),
            keywords: &["test case", "test", "create"],
            extract: extract_test_case,
        },
        CatalogEntry {
            kind: IntentKind::CreateTask,
            patterns: compile(&[
                r"(?i)\b(?:create|add|make|new)\s+(?:a\s+)?(?:new\s+)?task\b(?:\s+(?:called|named|titled|to))?\s*[:\-]?\s*(?P<rest>.*)$",
                r"(?i)^\s*to-?do\b\s*[:\-]?\s*(?P<rest>.*)$",
            ]),
            keywords: &["task", "create", "add"],
            extract: extract_task,
        },
        CatalogEntry {
            kind: IntentKind::CreateNote,
            patterns: compile(&[
                r"(?i)^\s*(?:remember\s+(?:this|that)|(?:take|make|write)\s+(?:a\s+)?note(?:\s+(?:of\s+)?(?:this|that))?|note\s+(?:this|that)|(?:create|add|new)\s+(?:a\s+)?(?:new\s+)?note)\b\s*[:\-,]?\s*(?:that\s+)?(?P<content>.*)$",
            ]),
            keywords: &["note", "remember"],
            extract: |caps| {
                let mut data = SlotMap::new();
                put(&mut data, "content", caps.name("content").map(|m| m.as_str()));
                data
            },
        },
        CatalogEntry {
            kind: IntentKind::ShowList,
            patterns: compile(&[
                r"(?i)^\s*(?:please\s+)?(?:show|list|display|see|view)(?:\s+me)?(?:\s+(?:all|my|the|of))*(?:\s+(?P<listType>projects?|tasks?|test[\s-]*cases?|notes?))?\s*[.!?]?\s*$",
                r"(?i)\bwhat\s+(?P<listType>projects?|tasks?|test[\s-]*cases?|notes?)\s+(?:do\s+(?:i|we)\s+have|are\s+there)\b",
            ]),
            keywords: &["show", "list", "all"],
            extract: |caps| {
                let mut data = SlotMap::new();
                if let Some(list) = caps.name("listType").and_then(|m| normalize_list(m.as_str())) {
                    data.insert("listType".to_string(), list.to_string());
                }
                data
            },
        },
        CatalogEntry {
            kind: IntentKind::Navigate,
            patterns: compile(&[
                r"(?i)^\s*(?:please\s+)?(?:go\s+to|navigate\s+to|take\s+me\s+to|bring\s+me\s+to|switch\s+to|open)\s+(?:the\s+|my\s+)?(?P<destination>.+?)(?:\s+(?:page|screen|view))?\s*[.!]?\s*$",
            ]),
            keywords: &["go to", "navigate", "open", "page"],
            extract: extract_destination,
        },
        CatalogEntry {
            kind: IntentKind::QueryHistory,
            patterns: compile(&[
                r"(?i)\b(?:what\s+(?:did|have)\s+(?:i|we)\s+(?:just\s+)?(?:do|done|create|created|say|said|make|made)|(?:show|read)\s+(?:me\s+)?(?:my\s+|the\s+)?history|recent\s+activity|what\s+was\s+the\s+last\s+thing)\b",
            ]),
            keywords: &["history", "did", "last", "recent"],
            extract: |_| SlotMap::new(),
        },
        CatalogEntry {
            kind: IntentKind::Help,
            patterns: compile(&[
                r"(?i)^\s*(?:help(?:\s+me)?|what\s+can\s+(?:you|i)\s+(?:do|say)|how\s+does\s+this\s+work|what\s+are\s+(?:the|your)\s+commands)\b",
            ]),
            keywords: &["help", "what can", "commands"],
            extract: |_| SlotMap::new(),
        },
        CatalogEntry {
            kind: IntentKind::ResetMemory,
            patterns: compile(&[
                r"(?i)^\s*(?:reset(?:\s+(?:the\s+)?(?:conversation|memory|context))?|start\s+over|forget\s+(?:everything|it|that|all\s+that)|clear\s+(?:the\s+|your\s+)?(?:memory|context|conversation))\b",
            ]),
            keywords: &["reset", "forget", "clear", "start over"],
            extract: |_| SlotMap::new(),
        },
    ]
}

fn project_details() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)^(?P<name>.+?)(?:\s*,?\s+with\s+(?:a\s+|the\s+)?description\s+(?P<description>.+?))?(?:\s*,?\s+(?:and\s+)?(?:with\s+)?(?:the\s+)?(?:project\s+)?code\s+(?P<code>[\w-]+))?\s*$",
        )
        .expect("project detail pattern must compile")
    })
}

fn project_suffix() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)\s+(?:in|for|to|under)\s+(?:the\s+)?project\s+(?P<project>.+?)\s*$")
            .expect("project suffix pattern must compile")
    })
}

fn assignee_clause() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)\s*,?\s+(?:and\s+)?assign(?:ed)?\s+(?:it\s+)?to\s+(?P<assignee>[\w.@-]+)")
            .expect("assignee pattern must compile")
    })
}

fn priority_clause() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)\s*,?\s+(?:with\s+)?(?:(?P<before>high|medium|low|urgent)\s+priority|priority\s+(?P<after>high|medium|low|urgent))",
        )
        .expect("priority pattern must compile")
    })
}

/// Trims whitespace, wrapping quotes and trailing punctuation.
pub fn clean(value: &str) -> String {
    value
        .trim()
        .trim_end_matches(&['.', '!', '?'][..])
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '“' | '”'))
        .trim()
        .to_string()
}

fn put(data: &mut SlotMap, key: &str, value: Option<&str>) {
    if let Some(v) = value.map(clean).filter(|v| !v.is_empty()) {
        data.insert(key.to_string(), v);
    }
}

fn rest<'t>(caps: &Captures<'t>) -> &'t str {
    caps.name("rest").map(|m| m.as_str()).unwrap_or("")
}

fn extract_project(caps: &Captures<'_>) -> SlotMap {
    let mut data = SlotMap::new();
    let rest = clean(rest(caps));
    if rest.is_empty() {
        return data;
    }
    match project_details().captures(&rest) {
        Some(details) => {
            put(&mut data, "name", details.name("name").map(|m| m.as_str()));
            put(&mut data, "description", details.name("description").map(|m| m.as_str()));
            put(&mut data, "projectCode", details.name("code").map(|m| m.as_str()));
        }
        None => put(&mut data, "name", Some(&rest)),
    }
    data
}

/// Pulls a trailing "in project X" clause off `text`.
fn split_project(text: &str, data: &mut SlotMap) -> String {
    match project_suffix().captures(text) {
        Some(caps) => {
            put(data, "projectName", caps.name("project").map(|m| m.as_str()));
            let start = caps.get(0).map(|m| m.start()).unwrap_or(text.len());
            text[..start].to_string()
        }
        None => text.to_string(),
    }
}

fn extract_task(caps: &Captures<'_>) -> SlotMap {
    let mut data = SlotMap::new();
    let mut text = rest(caps).to_string();

    let priority = priority_clause().captures(&text).and_then(|found| {
        let level = found.name("before").or_else(|| found.name("after"))?.as_str().to_lowercase();
        Some((level, found.get(0)?.range()))
    });
    if let Some((level, range)) = priority {
        data.insert("priority".to_string(), level);
        text.replace_range(range, "");
    }

    let assignee = assignee_clause().captures(&text).and_then(|found| {
        Some((clean(found.name("assignee")?.as_str()), found.get(0)?.range()))
    });
    if let Some((who, range)) = assignee {
        data.insert("assignee".to_string(), who);
        text.replace_range(range, "");
    }

    let title = split_project(&text, &mut data);
    put(&mut data, "title", Some(&title));
    data
}

fn extract_test_case(caps: &Captures<'_>) -> SlotMap {
    let mut data = SlotMap::new();
    let title = split_project(rest(caps), &mut data);
    put(&mut data, "title", Some(&title));
    data
}

fn extract_destination(caps: &Captures<'_>) -> SlotMap {
    const PREFIX: &str = "project ";
    let mut data = SlotMap::new();
    let destination = caps.name("destination").map(|m| clean(m.as_str())).unwrap_or_default();
    let has_prefix = destination
        .get(..PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(PREFIX));
    if has_prefix {
        put(&mut data, "projectName", destination.get(PREFIX.len()..));
    }
    put(&mut data, "destination", Some(&destination));
    data
}

/// Canonical list names understood by the host.
pub fn normalize_list(raw: &str) -> Option<&'static str> {
    let lower = raw.to_lowercase();
    let squashed: String = lower.chars().filter(|c| c.is_alphanumeric()).collect();
    match squashed.as_str() {
        "project" | "projects" => Some("projects"),
        "task" | "tasks" => Some("tasks"),
        "testcase" | "testcases" => Some("testCases"),
        "note" | "notes" => Some("notes"),
        _ => None,
    }
}
