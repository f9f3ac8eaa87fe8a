//! JSON codec for changes.
//!
//! Each change is an object tagged by `type`. Decoding needs the manuscript
//! the change applies to: text edits are checked against the current
//! document content, and batch children are checked against the manuscript
//! as the preceding children leave it.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::change::{BatchChange, Change, ChangeKind, RearrangeChange, ScalarChange, TextChange};
use crate::edit::TextEdit;
use crate::error::{ChangeError, SerializationError};
use crate::manuscript::Manuscript;
use crate::path::Path;

/// Serialize a change to its JSON wire form.
pub fn to_json(change: &Change) -> Value {
    match change {
        Change::Scalar(c) => json!({
            "type": ChangeKind::Scalar.as_str(),
            "timestamp": c.timestamp,
            "path": c.path,
            "oldValue": c.old_value,
            "nextValue": c.next_value,
        }),
        Change::Text(c) => json!({
            "type": ChangeKind::Text.as_str(),
            "timestamp": c.timestamp,
            "path": c.path,
            "edit": c.edit,
        }),
        Change::Rearrange(c) => json!({
            "type": ChangeKind::Rearrange.as_str(),
            "timestamp": c.timestamp,
            "path": c.path,
            "oldOrder": c.old_order,
            "newOrder": c.new_order,
        }),
        Change::Batch(c) => json!({
            "type": ChangeKind::Batch.as_str(),
            "timestamp": c.timestamp,
            "changes": c.changes().iter().map(to_json).collect::<Vec<_>>(),
        }),
    }
}

/// Serialize a sequence of changes as a JSON array (the sync request body).
pub fn to_json_array<'a>(changes: impl IntoIterator<Item = &'a Change>) -> Value {
    Value::Array(changes.into_iter().map(to_json).collect())
}

/// Decode one change, validating it against `manuscript`.
pub fn from_json(manuscript: &Manuscript, json: &Value) -> Result<Change, SerializationError> {
    let obj = json.as_object().ok_or(SerializationError::Field {
        change_type: "unknown",
        field: "type",
    })?;
    let tag = obj
        .get("type")
        .and_then(Value::as_str)
        .ok_or(SerializationError::Field {
            change_type: "unknown",
            field: "type",
        })?;
    let kind =
        ChangeKind::from_str(tag).ok_or_else(|| SerializationError::UnknownType(tag.into()))?;
    let timestamp = obj
        .get("timestamp")
        .and_then(Value::as_i64)
        .ok_or(SerializationError::Field {
            change_type: kind.as_str(),
            field: "timestamp",
        })?;

    match kind {
        ChangeKind::Scalar => {
            let path = decode_path(obj, kind)?;
            let old_value = decode_field(obj, kind, "oldValue")?;
            let next_value = decode_field(obj, kind, "nextValue")?;
            Ok(ScalarChange::new(timestamp, path, old_value, next_value).into())
        }
        ChangeKind::Text => {
            let path = decode_path(obj, kind)?;
            let edit: TextEdit = decode_field(obj, kind, "edit")?;
            validate_text_edit(manuscript, &path, &edit)?;
            Ok(TextChange::new(timestamp, path, edit).into())
        }
        ChangeKind::Rearrange => {
            let path = decode_path(obj, kind)?;
            let old_order = decode_field(obj, kind, "oldOrder")?;
            let new_order = decode_field(obj, kind, "newOrder")?;
            RearrangeChange::new(timestamp, path, old_order, new_order)
                .map(Change::from)
                .map_err(SerializationError::Inconsistent)
        }
        ChangeKind::Batch => {
            let items = obj
                .get("changes")
                .and_then(Value::as_array)
                .ok_or(SerializationError::Field {
                    change_type: kind.as_str(),
                    field: "changes",
                })?;
            let changes = decode_sequence(manuscript, items)?;
            Ok(BatchChange::new(timestamp, changes).into())
        }
    }
}

/// Decode a JSON array of changes that apply one after another.
pub fn from_json_array(
    manuscript: &Manuscript,
    json: &Value,
) -> Result<Vec<Change>, SerializationError> {
    let items = json.as_array().ok_or(SerializationError::Field {
        change_type: "array",
        field: "changes",
    })?;
    decode_sequence(manuscript, items)
}

/// Parse and decode a single change from a JSON string.
pub fn from_json_str(manuscript: &Manuscript, s: &str) -> Result<Change, SerializationError> {
    let json: Value = serde_json::from_str(s)?;
    from_json(manuscript, &json)
}

fn decode_sequence(
    manuscript: &Manuscript,
    items: &[Value],
) -> Result<Vec<Change>, SerializationError> {
    let entry = |index: usize, source: SerializationError| SerializationError::Entry {
        index,
        source: Box::new(source),
    };

    let mut scratch = manuscript.clone();
    let mut changes = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let change = from_json(&scratch, item).map_err(|e| entry(index, e))?;
        scratch = change
            .apply(&scratch)
            .map_err(|e| entry(index, SerializationError::Inconsistent(e)))?;
        changes.push(change);
    }
    Ok(changes)
}

fn decode_path(obj: &Map<String, Value>, kind: ChangeKind) -> Result<Path, SerializationError> {
    let raw = obj
        .get("path")
        .and_then(Value::as_str)
        .ok_or(SerializationError::Field {
            change_type: kind.as_str(),
            field: "path",
        })?;
    Ok(Path::parse(raw)?)
}

fn decode_field<T: DeserializeOwned>(
    obj: &Map<String, Value>,
    kind: ChangeKind,
    field: &'static str,
) -> Result<T, SerializationError> {
    let value = obj.get(field).ok_or(SerializationError::Field {
        change_type: kind.as_str(),
        field,
    })?;
    Ok(serde_json::from_value(value.clone())?)
}

fn validate_text_edit(
    manuscript: &Manuscript,
    path: &Path,
    edit: &TextEdit,
) -> Result<(), SerializationError> {
    let invalid = |source: ChangeError| SerializationError::InvalidTextEdit {
        path: path.as_str().into(),
        source,
    };
    let node = manuscript.get(path).map_err(invalid)?;
    let doc = node.as_text().ok_or_else(|| {
        invalid(ChangeError::KindMismatch {
            path: path.as_str().into(),
            expected: "text",
            found: node.kind_name(),
        })
    })?;
    edit.validate(doc).map_err(|source| {
        invalid(ChangeError::Edit {
            path: path.as_str().into(),
            source,
        })
    })
}

#[cfg(test)]
mod tests {
    use manuscript_common::ManualClock;

    use super::*;
    use crate::edit::EditError;
    use crate::manuscript::{Entity, Node};
    use crate::text::TextBuffer;

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn manuscript() -> Manuscript {
        Manuscript::new()
            .with_field("bio", Node::text(""))
            .with_field("country", Node::scalar("UK"))
            .with_field(
                "authors",
                Node::list([Entity::with_id("a"), Entity::with_id("b")]),
            )
    }

    fn insert_at(m: &Manuscript, pos: usize, s: &str, clock: &ManualClock) -> Change {
        let doc = m.get(&path("bio")).unwrap().as_text().unwrap();
        Change::text(
            clock,
            path("bio"),
            TextEdit::builder(doc).insert(pos, s).unwrap().build(),
        )
    }

    #[test]
    fn test_scalar_wire_form() {
        let clock = ManualClock::new(1);
        let change = Change::scalar(
            &clock,
            path("country"),
            Node::scalar("UK"),
            Node::scalar("US"),
        );
        insta::assert_json_snapshot!(change.to_json(), @r#"
        {
          "type": "scalar",
          "timestamp": 1,
          "path": "country",
          "oldValue": {
            "kind": "scalar",
            "value": "UK"
          },
          "nextValue": {
            "kind": "scalar",
            "value": "US"
          }
        }
        "#);
    }

    #[test]
    fn test_rearrange_wire_form() {
        let clock = ManualClock::new(7);
        let change = Change::rearrange(
            &clock,
            path("authors"),
            vec!["a".into(), "b".into()],
            vec!["b".into(), "a".into()],
        )
        .unwrap();
        assert_eq!(
            change.to_json(),
            json!({
                "type": "rearranging",
                "timestamp": 7,
                "path": "authors",
                "oldOrder": ["a", "b"],
                "newOrder": ["b", "a"],
            })
        );
    }

    #[test]
    fn test_every_variant_round_trips() {
        let clock = ManualClock::new(5);
        let m = manuscript();
        let changes = [
            Change::scalar(&clock, path("country"), Node::scalar("UK"), Node::scalar("US")),
            insert_at(&m, 0, "hi", &clock),
            Change::rearrange(
                &clock,
                path("authors"),
                vec!["a".into(), "b".into()],
                vec!["b".into(), "a".into()],
            )
            .unwrap(),
        ];
        for change in changes {
            let decoded = from_json(&m, &change.to_json()).unwrap();
            assert_eq!(decoded, change);
            assert_eq!(decoded.to_json(), change.to_json());
        }
    }

    #[test]
    fn test_batch_children_validate_in_sequence() {
        let clock = ManualClock::new(5);
        let m = manuscript();
        let first = insert_at(&m, 0, "A", &clock);
        let second = insert_at(&first.apply(&m).unwrap(), 1, "B", &clock);
        let batch = Change::batch(&clock, [first, second]);

        let decoded = from_json(&m, &batch.to_json()).unwrap();
        let applied = decoded.apply(&m).unwrap();
        assert_eq!(
            TextBuffer::to_string(applied.get(&path("bio")).unwrap().as_text().unwrap()),
            "AB"
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let err = from_json(&manuscript(), &json!({"type": "move", "timestamp": 1})).unwrap_err();
        assert!(matches!(err, SerializationError::UnknownType(t) if t == "move"));
    }

    #[test]
    fn test_missing_fields_rejected() {
        let m = manuscript();
        assert!(matches!(
            from_json(&m, &json!({"timestamp": 1})),
            Err(SerializationError::Field { field: "type", .. })
        ));
        assert!(matches!(
            from_json(&m, &json!({"type": "scalar", "path": "country"})),
            Err(SerializationError::Field { field: "timestamp", .. })
        ));
        assert!(matches!(
            from_json(&m, &json!({"type": "scalar", "timestamp": 1, "path": "country"})),
            Err(SerializationError::Field { field: "oldValue", .. })
        ));
        assert!(matches!(
            from_json(&m, &json!({"type": "batch", "timestamp": 1})),
            Err(SerializationError::Field { field: "changes", .. })
        ));
    }

    #[test]
    fn test_bad_path_rejected() {
        let json = json!({
            "type": "rearranging", "timestamp": 1, "path": "authors..x",
            "oldOrder": [], "newOrder": [],
        });
        assert!(matches!(
            from_json(&manuscript(), &json),
            Err(SerializationError::Path(_))
        ));
    }

    #[test]
    fn test_text_edit_must_fit_manuscript() {
        let clock = ManualClock::new(1);
        let m = manuscript();
        let source = m.clone().with_field("bio", Node::text("xyz"));
        let doc = source.get(&path("bio")).unwrap().as_text().unwrap();
        let change = Change::text(
            &clock,
            path("bio"),
            TextEdit::builder(doc).delete(0..3).unwrap().build(),
        );
        let err = from_json(&m, &change.to_json()).unwrap_err();
        assert!(matches!(err, SerializationError::InvalidTextEdit { .. }));

        // Same edit aimed at a scalar field.
        let mut json = change.to_json();
        json["path"] = json!("country");
        assert!(matches!(
            from_json(&source, &json),
            Err(SerializationError::InvalidTextEdit {
                source: ChangeError::KindMismatch { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_text_step_at_huge_position_rejected() {
        let m = manuscript().with_field("bio", Node::text("abc"));
        let json = json!({
            "type": "text",
            "timestamp": 1,
            "path": "bio",
            "edit": {"steps": [{"pos": u64::MAX, "deleted": "a", "inserted": ""}]},
        });
        assert!(matches!(
            from_json(&m, &json),
            Err(SerializationError::InvalidTextEdit {
                source: ChangeError::Edit {
                    source: EditError::OutOfBounds { .. },
                    ..
                },
                ..
            })
        ));
    }

    #[test]
    fn test_rearrange_with_mismatched_orders_rejected() {
        let json = json!({
            "type": "rearranging", "timestamp": 1, "path": "authors",
            "oldOrder": ["a"], "newOrder": ["b"],
        });
        assert!(matches!(
            from_json(&manuscript(), &json),
            Err(SerializationError::Inconsistent(ChangeError::OrderMismatch { .. }))
        ));
    }

    #[test]
    fn test_batch_reports_failing_entry() {
        let json = json!({
            "type": "batch",
            "timestamp": 1,
            "changes": [
                {"type": "scalar", "timestamp": 1, "path": "country",
                 "oldValue": {"kind": "scalar", "value": "UK"},
                 "nextValue": {"kind": "scalar", "value": "US"}},
                {"type": "bogus", "timestamp": 1},
            ],
        });
        match from_json(&manuscript(), &json) {
            Err(SerializationError::Entry { index, source }) => {
                assert_eq!(index, 1);
                assert!(matches!(*source, SerializationError::UnknownType(_)));
            }
            other => panic!("expected entry error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json_string() {
        assert!(matches!(
            from_json_str(&manuscript(), "{not json"),
            Err(SerializationError::Json(_))
        ));
    }

    #[test]
    fn test_array_round_trip() {
        let clock = ManualClock::new(3);
        let m = manuscript();
        let first = insert_at(&m, 0, "x", &clock);
        let second = Change::scalar(&clock, path("country"), Node::scalar("UK"), Node::scalar("DE"));
        let body = to_json_array([&first, &second]);
        assert_eq!(body.as_array().map(Vec::len), Some(2));
        let decoded = from_json_array(&m, &body).unwrap();
        assert_eq!(decoded, vec![first, second]);
    }
}
