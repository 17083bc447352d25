// eunoia-core/src/codec.rs
//
// Bidirectional mapping between the wire shape of an entity (arrays and
// nested objects) and its storage shape (JSON serialized into TEXT
// columns). Both directions are total: malformed blob text decodes to the
// field's fallback, and loosely-typed identifier fields are coerced or
// nulled, never rejected.

use serde_json::Value;

use eunoia_common::models::EntityKind;

/// One blob column and the public field it backs.
struct BlobField {
    column: &'static str,
    field: &'static str,
    /// Fallback on missing/unparseable text: `[]` when set, `null` otherwise.
    empty_array: bool,
}

fn blob_fields(kind: EntityKind) -> &'static [BlobField] {
    match kind {
        EntityKind::Post => &[
            BlobField { column: "tags_json", field: "tags", empty_array: true },
            BlobField { column: "liked_by_json", field: "liked_by", empty_array: true },
            BlobField { column: "shared_style_data_json", field: "shared_style_data", empty_array: false },
        ],
        EntityKind::EmotionReport => &[
            BlobField { column: "selected_chats_json", field: "selected_chats", empty_array: true },
            BlobField { column: "analysis_result_json", field: "analysis_result", empty_array: false },
        ],
        EntityKind::TrendAnalysis => &[
            BlobField { column: "selected_reports_json", field: "selected_reports", empty_array: true },
            BlobField { column: "trend_result_json", field: "trend_result", empty_array: false },
        ],
        EntityKind::ChatHistory => &[
            BlobField { column: "messages_json", field: "messages", empty_array: true },
        ],
        _ => &[],
    }
}

/// Wire fields that must be numeric in storage; unconvertible values are
/// stored as null.
fn numeric_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Post => &["shared_style_id"],
        EntityKind::Notification => &["post_id"],
        _ => &[],
    }
}

/// Decode serialized blob text, falling back instead of failing.
pub fn parse_json_safe(text: Option<&str>, empty_array: bool) -> Value {
    let fallback = if empty_array { Value::Array(vec![]) } else { Value::Null };
    match text {
        Some(s) if !s.is_empty() => serde_json::from_str(s).unwrap_or(fallback),
        _ => fallback,
    }
}

/// Storage record -> wire record: blob columns become structured public
/// fields, raw columns are dropped. Non-object values pass through.
pub fn to_wire(kind: EntityKind, record: Value) -> Value {
    let mut map = match record {
        Value::Object(map) => map,
        other => return other,
    };
    for blob in blob_fields(kind) {
        let text = map.remove(blob.column);
        let parsed = parse_json_safe(text.as_ref().and_then(Value::as_str), blob.empty_array);
        map.insert(blob.field.to_string(), parsed);
    }
    Value::Object(map)
}

/// Wire record -> storage record: structured public fields are serialized
/// back into their blob columns; loose identifier fields are normalized to
/// numbers or nulled. Non-object values pass through.
pub fn to_storage(kind: EntityKind, data: Value) -> Value {
    let mut map = match data {
        Value::Object(map) => map,
        other => return other,
    };
    for blob in blob_fields(kind) {
        if let Some(v) = map.remove(blob.field) {
            let expected = if blob.empty_array { v.is_array() } else { v.is_object() };
            if expected {
                // Serialization of an arbitrary JSON value cannot fail.
                map.insert(blob.column.to_string(), Value::String(v.to_string()));
            }
        }
    }
    for field in numeric_fields(kind) {
        if let Some(v) = map.remove(*field) {
            map.insert(field.to_string(), coerce_number(v));
        }
    }
    Value::Object(map)
}

fn coerce_number(v: Value) -> Value {
    match v {
        Value::Number(n) => Value::Number(n),
        Value::String(s) => {
            if let Ok(n) = s.trim().parse::<i64>() {
                Value::Number(n.into())
            } else if let Some(n) = s.trim().parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                Value::Number(n)
            } else {
                Value::Null
            }
        }
        _ => Value::Null,
    }
}

/// Shallow merge of a patch object's keys over a base object.
pub fn merge_objects(base: &mut Value, patch: Value) {
    if let (Value::Object(base_map), Value::Object(patch_map)) = (base, patch) {
        for (k, v) in patch_map {
            base_map.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_blob_fields_round_trip() {
        let wire = json!({
            "title": "今天有点焦虑",
            "content": "感觉作业好多",
            "category": "Treehole",
            "tags": ["学习", "焦虑"],
            "liked_by": ["a@example.com"],
            "shared_style_data": {"name": "暖心陪伴", "avatar": "🤗"},
        });
        let storage = to_storage(EntityKind::Post, wire.clone());
        assert!(storage["tags_json"].is_string());
        assert!(storage.get("tags").is_none());

        let back = to_wire(EntityKind::Post, storage);
        assert_eq!(back["tags"], wire["tags"]);
        assert_eq!(back["liked_by"], wire["liked_by"]);
        assert_eq!(back["shared_style_data"], wire["shared_style_data"]);
    }

    #[test]
    fn to_wire_is_idempotent_through_the_codec() {
        let wire = json!({
            "title": "t",
            "tags": ["a"],
            "liked_by": [],
            "shared_style_data": null,
        });
        let once = to_wire(EntityKind::Post, to_storage(EntityKind::Post, wire.clone()));
        let twice = to_wire(EntityKind::Post, to_storage(EntityKind::Post, once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn malformed_blob_text_decodes_to_fallback() {
        let storage = json!({
            "title": "t",
            "tags_json": "{not json",
            "liked_by_json": "",
            "shared_style_data_json": "also not json",
        });
        let wire = to_wire(EntityKind::Post, storage);
        assert_eq!(wire["tags"], json!([]));
        assert_eq!(wire["liked_by"], json!([]));
        assert_eq!(wire["shared_style_data"], Value::Null);
    }

    #[test]
    fn stringly_typed_ids_are_normalized() {
        let storage = to_storage(EntityKind::Post, json!({"title": "t", "shared_style_id": "12"}));
        assert_eq!(storage["shared_style_id"], json!(12));

        let storage = to_storage(EntityKind::Post, json!({"title": "t", "shared_style_id": "garbage"}));
        assert_eq!(storage["shared_style_id"], Value::Null);

        let storage = to_storage(EntityKind::Notification, json!({"type": "like", "post_id": "7"}));
        assert_eq!(storage["post_id"], json!(7));
    }

    #[test]
    fn entities_without_blob_columns_pass_through() {
        let wire = json!({"post_id": 1, "content": "hello", "author_name": "Demo"});
        assert_eq!(to_storage(EntityKind::Comment, wire.clone()), wire);
        assert_eq!(to_wire(EntityKind::Comment, wire.clone()), wire);
    }
}
