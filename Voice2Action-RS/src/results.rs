//! Normalization of a completed job payload.
//!
//! The service is loose about where results live (`analysis` or `results`)
//! and what task fields are called. Everything is resolved here, once, with
//! a fixed precedence per field:
//!
//! | Field       | Precedence |
//! |-------------|------------|
//! | transcript  | `transcript.text`, `transcript` (string), `transcript_text`, `results.transcript` |
//! | summary     | `analysis.summary`, `results.summary`, transcript preview |
//! | tasks       | `analysis.tasks`, `results.tasks`, `extracted_tasks` |
//! | key points  | `analysis.key_points`, `results.key_points` |
//! | decisions   | `analysis.decisions`, `results.decisions` |
//! | documents   | `analysis.doc_url`/`sheet_url`, `results.doc_url`/`sheet_url` |
//!
//! Within a task object: description `description`, `task`; deadline
//! `deadline`, `due_date`; assignee `assignee`, `assigned_to`; priority
//! `priority`. Empty strings count as absent.

use serde::Serialize;
use serde_json::Value;

/// Description used for a task object that has none.
pub const UNTITLED_TASK: &str = "No description";

/// Value the service puts in `sheet_url` when there was nothing to export.
pub const NO_SHEET_SENTINEL: &str = "Нет задач для экспорта";

const NAMESPACES: [&str; 2] = ["analysis", "results"];

/// One action item extracted from the recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskItem {
    pub description: String,
    pub deadline: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<String>,
}

impl TaskItem {
    /// Normalize a bare string or a loosely-typed task object.
    pub fn from_value(value: &Value) -> Self {
        if let Some(s) = value.as_str() {
            return Self {
                description: s.to_string(),
                deadline: None,
                assignee: None,
                priority: None,
            };
        }

        Self {
            description: first_text(value, &["description", "task"])
                .unwrap_or_else(|| UNTITLED_TASK.to_string()),
            deadline: first_text(value, &["deadline", "due_date"]),
            assignee: first_text(value, &["assignee", "assigned_to"]),
            priority: first_text(value, &["priority"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentKind {
    GoogleDoc,
    GoogleSheet,
}

impl DocumentKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::GoogleDoc => "Google Doc",
            Self::GoogleSheet => "Google Sheet",
        }
    }
}

/// A document generated by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLink {
    pub kind: DocumentKind,
    pub url: String,
}

/// Everything a completed job produced, in one shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobResults {
    pub summary: Option<String>,
    pub transcript: Option<String>,
    pub tasks: Vec<TaskItem>,
    pub key_points: Vec<String>,
    pub decisions: Vec<String>,
    pub documents: Vec<DocumentLink>,
}

/// Resolve a job payload into [`JobResults`].
///
/// `preview_chars` bounds the transcript excerpt used when no summary is
/// present.
pub fn normalize(payload: &Value, preview_chars: usize) -> JobResults {
    let transcript = transcript(payload);
    let summary = namespaced(payload, "summary")
        .and_then(non_empty_text)
        .or_else(|| transcript.as_deref().map(|t| preview(t, preview_chars)));

    let tasks = namespaced(payload, "tasks")
        .or_else(|| payload.get("extracted_tasks"))
        .and_then(|v| v.as_array())
        .map(|items| items.iter().map(TaskItem::from_value).collect())
        .unwrap_or_default();

    JobResults {
        summary,
        transcript,
        tasks,
        key_points: text_list(namespaced(payload, "key_points")),
        decisions: text_list(namespaced(payload, "decisions")),
        documents: documents(payload),
    }
}

/// First present, non-null, non-empty value of `field` across the result
/// namespaces.
fn namespaced<'a>(payload: &'a Value, field: &str) -> Option<&'a Value> {
    NAMESPACES
        .iter()
        .filter_map(|ns| payload.get(ns).and_then(|n| n.get(field)))
        .find(|v| is_present(v))
}

fn transcript(payload: &Value) -> Option<String> {
    let candidates = [
        payload.pointer("/transcript/text"),
        payload.get("transcript").filter(|v| v.is_string()),
        payload.get("transcript_text"),
        payload.pointer("/results/transcript"),
    ];
    candidates
        .into_iter()
        .flatten()
        .find_map(non_empty_text)
}

fn preview(text: &str, max_chars: usize) -> String {
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut)
}

fn documents(payload: &Value) -> Vec<DocumentLink> {
    let mut docs = Vec::new();
    if let Some(url) = namespaced(payload, "doc_url").and_then(non_empty_text) {
        docs.push(DocumentLink {
            kind: DocumentKind::GoogleDoc,
            url,
        });
    }
    if let Some(url) = namespaced(payload, "sheet_url")
        .and_then(non_empty_text)
        .filter(|u| u != NO_SHEET_SENTINEL)
    {
        docs.push(DocumentLink {
            kind: DocumentKind::GoogleSheet,
            url,
        });
    }
    docs
}

fn text_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| items.iter().filter_map(non_empty_text).collect())
        .unwrap_or_default()
}

fn first_text(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(k))
        .find_map(non_empty_text)
}

/// Scalars as text; empty strings, null and empty containers are absent.
/// Objects and arrays inside lists are kept as their JSON text.
fn non_empty_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other if is_present(other) => Some(other.to_string()),
        _ => None,
    }
}

fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn analysis_namespace_wins_over_results() {
        let payload = json!({
            "analysis": {"summary": "from analysis"},
            "results": {"summary": "from results", "key_points": ["kp"]}
        });
        let r = normalize(&payload, 500);
        assert_eq!(r.summary.as_deref(), Some("from analysis"));
        assert_eq!(r.key_points, vec!["kp"]);
    }

    #[test]
    fn empty_analysis_summary_falls_through() {
        let payload = json!({
            "analysis": {"summary": ""},
            "results": {"summary": "backup"}
        });
        assert_eq!(normalize(&payload, 500).summary.as_deref(), Some("backup"));
    }

    #[test]
    fn summary_falls_back_to_transcript_preview() {
        let payload = json!({"transcript": {"text": "abcdefghij", "characters": 10}});
        let r = normalize(&payload, 4);
        assert_eq!(r.summary.as_deref(), Some("abcd..."));
        assert_eq!(r.transcript.as_deref(), Some("abcdefghij"));
    }

    #[test]
    fn preview_counts_characters_not_bytes() {
        let payload = json!({"transcript_text": "привет мир"});
        assert_eq!(normalize(&payload, 6).summary.as_deref(), Some("привет..."));
    }

    #[test]
    fn transcript_sources_in_order() {
        let both = json!({"transcript": "inline", "transcript_text": "flat"});
        assert_eq!(normalize(&both, 500).transcript.as_deref(), Some("inline"));
        assert_eq!(
            normalize(&json!({"results": {"transcript": "nested"}}), 500).transcript.as_deref(),
            Some("nested")
        );
    }

    #[test]
    fn nothing_present_gives_empty_results() {
        let r = normalize(&json!({"status": "completed"}), 500);
        assert_eq!(r, JobResults::default());
    }

    #[test]
    fn bare_string_task() {
        let task = TaskItem::from_value(&json!("Send the minutes"));
        assert_eq!(task.description, "Send the minutes");
        assert_eq!(task.deadline, None);
        assert_eq!(task.assignee, None);
        assert_eq!(task.priority, None);
    }

    #[test]
    fn aliased_task_fields_match_canonical() {
        let canonical = TaskItem::from_value(&json!({
            "description": "Ship it",
            "deadline": "Friday",
            "assignee": "Ann",
            "priority": "high"
        }));
        let aliased = TaskItem::from_value(&json!({
            "task": "Ship it",
            "due_date": "Friday",
            "assigned_to": "Ann",
            "priority": "high"
        }));
        assert_eq!(canonical, aliased);
    }

    #[test]
    fn task_without_description_gets_placeholder() {
        let task = TaskItem::from_value(&json!({"priority": 2}));
        assert_eq!(task.description, UNTITLED_TASK);
        assert_eq!(task.priority.as_deref(), Some("2"));
    }

    #[test]
    fn extracted_tasks_used_last() {
        let payload = json!({"extracted_tasks": ["one", {"task": "two"}]});
        let r = normalize(&payload, 500);
        assert_eq!(r.tasks.len(), 2);
        assert_eq!(r.tasks[1].description, "two");
    }

    #[test]
    fn documents_skip_sentinel_sheet() {
        let payload = json!({"analysis": {
            "doc_url": "https://docs.example/d/1",
            "sheet_url": NO_SHEET_SENTINEL
        }});
        let r = normalize(&payload, 500);
        assert_eq!(
            r.documents,
            vec![DocumentLink {
                kind: DocumentKind::GoogleDoc,
                url: "https://docs.example/d/1".into()
            }]
        );
    }

    #[test]
    fn documents_from_results_namespace() {
        let payload = json!({"results": {"sheet_url": "https://sheets.example/s/1"}});
        let r = normalize(&payload, 500);
        assert_eq!(r.documents.len(), 1);
        assert_eq!(r.documents[0].kind, DocumentKind::GoogleSheet);
    }

    #[test]
    fn list_items_drop_empties_and_stringify_objects() {
        let payload = json!({"analysis": {"decisions": ["Go", "", null, {"what": "x"}]}});
        let r = normalize(&payload, 500);
        assert_eq!(r.decisions, vec!["Go".to_string(), r#"{"what":"x"}"#.to_string()]);
    }
}
