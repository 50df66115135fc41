//! Adapters from the backend's response shapes to client types.
//!
//! Each adapter accepts a small closed set of shapes seen across backend
//! revisions and returns a [`ShapeError`] for anything else.

use serde_json::Value;

use crate::docs::types::{DocId, Document, UploadAck};
use crate::error::ShapeError;

pub const SUMMARY_FIELDS: &[&str] = &["summary"];
pub const FLOWCHART_FIELDS: &[&str] = &["mermaid", "mermaid_code", "chart"];
pub const ANSWER_FIELDS: &[&str] = &["answer"];

const UPLOAD_ID_FIELDS: &[&str] = &["document_id", "doc_id", "id"];
const DOCUMENT_NAME_FIELDS: &[&str] = &["filename", "name"];

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A bare string, or an object carrying the text under one of `fields`
/// (first match wins).
pub fn text_payload(value: &Value, fields: &'static [&'static str]) -> Result<String, ShapeError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Object(map) => fields
            .iter()
            .find_map(|f| map.get(*f).and_then(Value::as_str))
            .map(str::to_string)
            .ok_or(ShapeError::Unrecognized {
                expected: fields,
                found: "object",
            }),
        other => Err(ShapeError::Unrecognized {
            expected: fields,
            found: kind_of(other),
        }),
    }
}

/// Identifiers arrive as strings from some backends and integers from others.
fn id_value(value: &Value) -> Option<DocId> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub fn document(value: &Value) -> Result<Document, ShapeError> {
    let map = value.as_object().ok_or(ShapeError::WrongType {
        expected: "document object",
        found: kind_of(value),
    })?;
    let id = map.get("id").and_then(id_value).ok_or(ShapeError::MissingField("id"))?;
    let filename = DOCUMENT_NAME_FIELDS
        .iter()
        .find_map(|f| map.get(*f).and_then(Value::as_str))
        .ok_or(ShapeError::MissingField("filename"))?;
    Ok(Document::new(id, filename))
}

/// Backend order is preserved.
pub fn document_list(value: &Value) -> Result<Vec<Document>, ShapeError> {
    let items = value.as_array().ok_or(ShapeError::WrongType {
        expected: "array of documents",
        found: kind_of(value),
    })?;
    items.iter().map(document).collect()
}

pub fn upload_ack(value: &Value) -> Result<UploadAck, ShapeError> {
    let map = value.as_object().ok_or(ShapeError::WrongType {
        expected: "upload acknowledgement object",
        found: kind_of(value),
    })?;
    let text = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
    Ok(UploadAck {
        id: UPLOAD_ID_FIELDS
            .iter()
            .find_map(|f| map.get(*f).and_then(id_value)),
        filename: text("filename").filter(|f| !f.is_empty()),
        path: text("path"),
        extracted_chars: map
            .get("extracted_text")
            .and_then(Value::as_str)
            .map(|t| t.chars().count()),
    })
}

/// A retrieval passage the backend used to answer a question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSource {
    pub score: Option<f64>,
    pub source: Option<String>,
    pub snippet: String,
}

const SNIPPET_CHARS: usize = 160;

/// Optional `sources` array next to an answer. Entries without text are skipped.
pub fn answer_sources(value: &Value) -> Vec<AnswerSource> {
    let Some(items) = value.get("sources").and_then(Value::as_array) else {
        return vec![];
    };
    items
        .iter()
        .filter_map(|item| {
            let meta = item.get("metadata").unwrap_or(item);
            let text = meta
                .get("text")
                .or_else(|| meta.get("content"))
                .and_then(Value::as_str)?
                .trim();
            if text.is_empty() {
                return None;
            }
            Some(AnswerSource {
                score: item.get("score").and_then(Value::as_f64),
                source: meta.get("source").and_then(Value::as_str).map(str::to_string),
                snippet: text.chars().take(SNIPPET_CHARS).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_summary_object_and_bare_string_are_equivalent() {
        let obj = text_payload(&json!({"summary": "short"}), SUMMARY_FIELDS).unwrap();
        let bare = text_payload(&json!("short"), SUMMARY_FIELDS).unwrap();
        assert_eq!(obj, bare);
    }

    #[test]
    fn test_flowchart_field_variants() {
        for field in FLOWCHART_FIELDS {
            let mut map = serde_json::Map::new();
            map.insert(field.to_string(), json!("graph TD\nA-->B"));
            let value = Value::Object(map);
            assert_eq!(
                text_payload(&value, FLOWCHART_FIELDS).unwrap(),
                "graph TD\nA-->B"
            );
        }
    }

    #[test]
    fn test_unknown_shape_fails_loudly() {
        let err = text_payload(&json!({"error": "Provide file"}), SUMMARY_FIELDS).unwrap_err();
        assert_eq!(
            err,
            ShapeError::Unrecognized {
                expected: SUMMARY_FIELDS,
                found: "object"
            }
        );
        assert!(text_payload(&json!(42), ANSWER_FIELDS).is_err());
        assert!(text_payload(&json!({"summary": null}), SUMMARY_FIELDS).is_err());
    }

    #[test]
    fn test_document_list_keeps_order_and_accepts_name() {
        let docs = document_list(&json!([
            {"id": 7, "filename": "b.pdf"},
            {"id": "3", "name": "a.docx"}
        ]))
        .unwrap();
        assert_eq!(
            docs,
            vec![Document::new("7", "b.pdf"), Document::new("3", "a.docx")]
        );
    }

    #[test]
    fn test_document_list_rejects_entry_without_id() {
        let err = document_list(&json!([{"filename": "x.pdf"}])).unwrap_err();
        assert_eq!(err, ShapeError::MissingField("id"));
        assert!(document_list(&json!({"documents": []})).is_err());
    }

    #[test]
    fn test_upload_ack_id_variants() {
        let a = upload_ack(&json!({"document_id": "42", "filename": "a.pdf"})).unwrap();
        assert_eq!(a.id.as_deref(), Some("42"));
        let b = upload_ack(&json!({"id": 9, "filename": "a.pdf"})).unwrap();
        assert_eq!(b.id.as_deref(), Some("9"));
        let c = upload_ack(&json!({"doc_id": 11, "filename": "a.pdf", "extracted_text": "héllo"})).unwrap();
        assert_eq!(c.id.as_deref(), Some("11"));
        assert_eq!(c.extracted_chars, Some(5));
    }

    #[test]
    fn test_upload_ack_missing_id() {
        let ack = upload_ack(&json!({"filename": "a.pdf", "doc_id": null})).unwrap();
        assert_eq!(ack.id, None);
        assert!(upload_ack(&json!("ok")).is_err());
    }

    #[test]
    fn test_answer_sources() {
        let value = json!({
            "answer": "42",
            "sources": [
                {"score": 0.9, "metadata": {"text": "  The answer is 42. ", "source": "guide.pdf", "chunk_id": 0}},
                {"score": 0.1, "metadata": {"text": ""}}
            ]
        });
        let sources = answer_sources(&value);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].snippet, "The answer is 42.");
        assert_eq!(sources[0].source.as_deref(), Some("guide.pdf"));
        assert_eq!(sources[0].score, Some(0.9));
        assert!(answer_sources(&json!("bare")).is_empty());
    }
}
