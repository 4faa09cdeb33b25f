//! HTML and plain-text rendering of [`JobResults`].
//!
//! Every server-supplied string passes through [`escape_html`] before it is
//! placed in markup, including URLs inside attributes.

use crate::results::{JobResults, TaskItem};

pub const NO_SUMMARY: &str = "Summary unavailable";
pub const NO_TASKS: &str = "No tasks found";
pub const NO_KEY_POINTS: &str = "Key points will appear after analysis.";
pub const NO_DECISIONS: &str = "No decisions were found or announced.";
pub const NO_DOCUMENTS: &str = "Documents are generated automatically";

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// HTML fragments for each results section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedResults {
    pub summary: String,
    pub tasks: String,
    pub key_points: String,
    pub decisions: String,
    pub documents: String,
}

/// Render each section; absent sections get their placeholder.
pub fn render_results(results: &JobResults) -> RenderedResults {
    let summary = match results.summary.as_deref() {
        Some(s) => format!(r#"<p class="summary">{}</p>"#, escape_html(s)),
        None => placeholder(NO_SUMMARY),
    };

    let tasks = if results.tasks.is_empty() {
        placeholder(NO_TASKS)
    } else {
        results.tasks.iter().map(render_task).collect::<Vec<_>>().join("\n")
    };

    let links: Vec<_> = results
        .documents
        .iter()
        .filter(|d| is_web_url(&d.url))
        .collect();
    let documents = if links.is_empty() {
        placeholder(NO_DOCUMENTS)
    } else {
        links
            .iter()
            .map(|d| {
                format!(
                    r#"<a href="{}" target="_blank" rel="noopener" class="btn secondary">{}</a>"#,
                    escape_html(&d.url),
                    d.kind.label()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    RenderedResults {
        summary,
        tasks,
        key_points: render_list(&results.key_points, "insights-list", NO_KEY_POINTS),
        decisions: render_list(&results.decisions, "decisions-list", NO_DECISIONS),
        documents,
    }
}

/// Render one task with its optional decorations.
pub fn render_task(task: &TaskItem) -> String {
    let mut html = format!(
        "<div class=\"task-item\"><strong>{}</strong>",
        escape_html(&task.description)
    );
    let decorations = [
        ("deadline", task.deadline.as_deref()),
        ("assignee", task.assignee.as_deref()),
        ("priority", task.priority.as_deref()),
    ];
    for (class, value) in decorations {
        if let Some(v) = value {
            html.push_str(&format!(
                "<br><small class=\"{}\">{}</small>",
                class,
                escape_html(v)
            ));
        }
    }
    html.push_str("</div>");
    html
}

/// Only `http` and `https` links are rendered.
fn is_web_url(url: &str) -> bool {
    let url = url.trim_start().to_ascii_lowercase();
    url.starts_with("http://") || url.starts_with("https://")
}

fn render_list(items: &[String], class: &str, empty: &str) -> String {
    if items.is_empty() {
        return placeholder(empty);
    }
    let lis: String = items
        .iter()
        .map(|i| format!("<li>{}</li>", escape_html(i)))
        .collect();
    format!(r#"<ul class="{}">{}</ul>"#, class, lis)
}

fn placeholder(text: &str) -> String {
    format!(r#"<p class="placeholder">{}</p>"#, escape_html(text))
}

/// Render a standalone HTML page for a completed job.
pub fn render_page(job_id: &str, results: &JobResults) -> String {
    let r = render_results(results);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Voice2Action results</title>
</head>
<body>
<section id="summary"><h2>Summary</h2>
{summary}
</section>
<section id="tasks"><h2>Tasks</h2>
{tasks}
</section>
<section id="insights"><h2>Key points</h2>
{key_points}
</section>
<section id="decisions"><h2>Decisions</h2>
{decisions}
</section>
<section id="docs"><h2>Documents</h2>
{documents}
</section>
<footer>Job ID: <code id="job-id">{job_id}</code></footer>
</body>
</html>
"#,
        summary = r.summary,
        tasks = r.tasks,
        key_points = r.key_points,
        decisions = r.decisions,
        documents = r.documents,
        job_id = escape_html(job_id),
    )
}

/// Plain-text lines for terminal output.
pub fn text_summary(job_id: &str, results: &JobResults) -> Vec<String> {
    let mut lines = vec![format!("Job: {}", job_id)];

    lines.push("Summary:".to_string());
    lines.push(format!("  {}", results.summary.as_deref().unwrap_or(NO_SUMMARY)));

    lines.push("Tasks:".to_string());
    if results.tasks.is_empty() {
        lines.push(format!("  {}", NO_TASKS));
    }
    for task in &results.tasks {
        let mut line = format!("  - {}", task.description);
        if let Some(d) = &task.deadline {
            line.push_str(&format!(" [due {}]", d));
        }
        if let Some(a) = &task.assignee {
            line.push_str(&format!(" [@{}]", a));
        }
        if let Some(p) = &task.priority {
            line.push_str(&format!(" [{}]", p));
        }
        lines.push(line);
    }

    for (title, items, empty) in [
        ("Key points:", &results.key_points, NO_KEY_POINTS),
        ("Decisions:", &results.decisions, NO_DECISIONS),
    ] {
        lines.push(title.to_string());
        if items.is_empty() {
            lines.push(format!("  {}", empty));
        }
        lines.extend(items.iter().map(|i| format!("  - {}", i)));
    }

    lines.push("Documents:".to_string());
    if results.documents.is_empty() {
        lines.push(format!("  {}", NO_DOCUMENTS));
    }
    lines.extend(
        results
            .documents
            .iter()
            .map(|d| format!("  {}: {}", d.kind.label(), d.url)),
    );

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{normalize, DocumentKind, DocumentLink};
    use serde_json::json;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
        assert_eq!(escape_html("plain текст"), "plain текст");
    }

    #[test]
    fn empty_results_render_placeholders() {
        let r = render_results(&JobResults::default());
        assert!(r.summary.contains(NO_SUMMARY));
        assert!(r.tasks.contains(NO_TASKS));
        assert!(r.key_points.contains(NO_KEY_POINTS));
        assert!(r.decisions.contains(NO_DECISIONS));
        assert!(r.documents.contains(NO_DOCUMENTS));
    }

    #[test]
    fn bare_task_has_no_decorations() {
        let html = render_task(&TaskItem::from_value(&json!("Call <Bob>")));
        assert_eq!(
            html,
            r#"<div class="task-item"><strong>Call &lt;Bob&gt;</strong></div>"#
        );
    }

    #[test]
    fn aliased_deadline_renders_like_canonical() {
        let a = render_task(&TaskItem::from_value(&json!({"description": "x", "deadline": "Mon"})));
        let b = render_task(&TaskItem::from_value(&json!({"description": "x", "due_date": "Mon"})));
        assert_eq!(a, b);
        assert!(a.contains(r#"<small class="deadline">Mon</small>"#));
    }

    #[test]
    fn injected_markup_cannot_escape_its_element() {
        let payload = json!({"analysis": {
            "summary": "</p><img src=x onerror=alert(1)>",
            "key_points": ["a & b"],
            "decisions": ["<b>bold</b>"]
        }});
        let r = render_results(&normalize(&payload, 500));
        assert!(!r.summary.contains("<img"));
        assert!(r.summary.contains("&lt;/p&gt;&lt;img"));
        assert!(r.key_points.contains("<li>a &amp; b</li>"));
        assert!(r.decisions.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }

    #[test]
    fn document_urls_are_attribute_escaped() {
        let results = JobResults {
            documents: vec![DocumentLink {
                kind: DocumentKind::GoogleDoc,
                url: r#"https://x/"onmouseover="evil"#.into(),
            }],
            ..Default::default()
        };
        let r = render_results(&results);
        assert!(r.documents.contains("&quot;onmouseover=&quot;evil"));
        assert!(r.documents.contains(">Google Doc</a>"));
    }

    #[test]
    fn non_web_document_links_are_dropped() {
        let results = JobResults {
            documents: vec![
                DocumentLink {
                    kind: DocumentKind::GoogleDoc,
                    url: "javascript:alert(1)".into(),
                },
                DocumentLink {
                    kind: DocumentKind::GoogleSheet,
                    url: " JavaScript:alert(2)".into(),
                },
            ],
            ..Default::default()
        };
        let r = render_results(&results);
        assert!(!r.documents.to_lowercase().contains("javascript"));
        assert!(r.documents.contains(NO_DOCUMENTS));

        let results = JobResults {
            documents: vec![
                DocumentLink {
                    kind: DocumentKind::GoogleDoc,
                    url: "data:text/html,hi".into(),
                },
                DocumentLink {
                    kind: DocumentKind::GoogleSheet,
                    url: "HTTPS://docs.example/s/1".into(),
                },
            ],
            ..Default::default()
        };
        let r = render_results(&results);
        assert!(!r.documents.contains("data:"));
        assert!(r.documents.contains(r#"href="HTTPS://docs.example/s/1""#));
    }

    #[test]
    fn page_contains_sections_and_escaped_job_id() {
        let page = render_page("<id>", &JobResults::default());
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(r#"<code id="job-id">&lt;id&gt;</code>"#));
        assert!(page.contains(r#"<section id="decisions">"#));
    }

    #[test]
    fn text_summary_lists_everything() {
        let payload = json!({"results": {
            "summary": "Weekly sync",
            "tasks": [{"task": "Book room", "assigned_to": "Ann", "due_date": "Tue"}],
            "key_points": ["Budget approved"],
            "decisions": []
        }});
        let lines = text_summary("abc123", &normalize(&payload, 500));
        assert_eq!(lines[0], "Job: abc123");
        assert!(lines.contains(&"  Weekly sync".to_string()));
        assert!(lines.contains(&"  - Book room [due Tue] [@Ann]".to_string()));
        assert!(lines.contains(&"  - Budget approved".to_string()));
        assert!(lines.contains(&format!("  {}", NO_DECISIONS)));
        assert!(lines.contains(&format!("  {}", NO_DOCUMENTS)));
    }
}
