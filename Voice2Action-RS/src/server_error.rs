//! Normalization of structured API error bodies into one message.
//!
//! The service reports errors under `detail`, `message` or `error`, and the
//! value may be a string, a list of validation entries, or an object.

use serde_json::Value;

/// Shape of an error body, decided once and then rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerErrorBody {
    /// The detail is a plain string.
    Text(String),
    /// The detail is a list; each entry contributes one message.
    List(Vec<Value>),
    /// The detail is an object or a non-string scalar.
    Object(Value),
    /// No known key, but the body itself carries information.
    Unstructured(Value),
    /// No body, non-JSON body, or an empty object.
    Missing,
}

impl ServerErrorBody {
    /// Classify a decoded body. Keys are tried in the order `detail`,
    /// `message`, `error`; `null` counts as absent.
    pub fn parse(body: Option<&Value>) -> Self {
        let body = match body {
            Some(b) if !b.is_null() => b,
            _ => return Self::Missing,
        };

        let detail = ["detail", "message", "error"]
            .iter()
            .find_map(|key| body.get(key).filter(|v| !v.is_null()));

        match detail {
            Some(Value::String(s)) => Self::Text(s.clone()),
            Some(Value::Array(items)) => Self::List(items.clone()),
            Some(other) => Self::Object(other.clone()),
            None => match body {
                Value::Object(map) if map.is_empty() => Self::Missing,
                other => Self::Unstructured(other.clone()),
            },
        }
    }

    /// Render as a single human-readable line. `status` is only used when
    /// there is nothing better to say.
    pub fn into_message(self, status: u16) -> String {
        match self {
            Self::Text(s) if s.is_empty() => format!("HTTP {}", status),
            Self::Text(s) => s,
            Self::List(items) => items
                .iter()
                .map(list_entry_message)
                .collect::<Vec<_>>()
                .join("; "),
            Self::Object(v) | Self::Unstructured(v) => scalar_or_json(&v),
            Self::Missing => format!("HTTP {}", status),
        }
    }
}

/// Decode a raw error body and normalize it.
pub fn normalize_server_error(body: &str, status: u16) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    ServerErrorBody::parse(parsed.as_ref()).into_message(status)
}

fn list_entry_message(item: &Value) -> String {
    ["msg", "message"]
        .iter()
        .find_map(|key| item.get(key).and_then(|v| v.as_str()))
        .map(String::from)
        .unwrap_or_else(|| scalar_or_json(item))
}

fn scalar_or_json(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_detail() {
        let body = json!({"detail": "Job not found"});
        let parsed = ServerErrorBody::parse(Some(&body));
        assert_eq!(parsed, ServerErrorBody::Text("Job not found".into()));
        assert_eq!(parsed.into_message(404), "Job not found");
    }

    #[test]
    fn list_detail_joins_messages() {
        let body = json!({"detail": [
            {"loc": ["body", "audio"], "msg": "field required", "type": "value_error.missing"},
            {"message": "analysis_type invalid"},
            {"code": 7}
        ]});
        let parsed = ServerErrorBody::parse(Some(&body));
        assert!(matches!(parsed, ServerErrorBody::List(ref items) if items.len() == 3));
        assert_eq!(
            parsed.into_message(422),
            r#"field required; analysis_type invalid; {"code":7}"#
        );
    }

    #[test]
    fn object_detail_renders_json() {
        let body = json!({"detail": {"reason": "quota"}});
        let parsed = ServerErrorBody::parse(Some(&body));
        assert_eq!(parsed, ServerErrorBody::Object(json!({"reason": "quota"})));
        assert_eq!(parsed.into_message(500), r#"{"reason":"quota"}"#);
    }

    #[test]
    fn scalar_detail_renders_plain() {
        let body = json!({"error": 42});
        assert_eq!(ServerErrorBody::parse(Some(&body)).into_message(500), "42");
    }

    #[test]
    fn key_precedence_detail_message_error() {
        let body = json!({"error": "third", "message": "second", "detail": "first"});
        assert_eq!(ServerErrorBody::parse(Some(&body)).into_message(400), "first");

        let body = json!({"error": "third", "message": "second", "detail": null});
        assert_eq!(ServerErrorBody::parse(Some(&body)).into_message(400), "second");

        let body = json!({"error": "third"});
        assert_eq!(ServerErrorBody::parse(Some(&body)).into_message(400), "third");
    }

    #[test]
    fn unstructured_body_renders_json() {
        let body = json!({"oops": true});
        let parsed = ServerErrorBody::parse(Some(&body));
        assert_eq!(parsed, ServerErrorBody::Unstructured(json!({"oops": true})));
        assert_eq!(parsed.into_message(500), r#"{"oops":true}"#);
    }

    #[test]
    fn missing_body_falls_back_to_status() {
        assert_eq!(ServerErrorBody::parse(None), ServerErrorBody::Missing);
        assert_eq!(ServerErrorBody::parse(Some(&json!({}))), ServerErrorBody::Missing);
        assert_eq!(ServerErrorBody::Missing.into_message(502), "HTTP 502");
    }

    #[test]
    fn normalize_raw_bodies() {
        assert_eq!(normalize_server_error("", 503), "HTTP 503");
        assert_eq!(normalize_server_error("<html>Bad Gateway</html>", 502), "HTTP 502");
        assert_eq!(normalize_server_error(r#"{"detail":"Nope"}"#, 400), "Nope");
        assert_eq!(normalize_server_error(r#"{"detail":""}"#, 400), "HTTP 400");
    }
}
