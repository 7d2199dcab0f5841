//! Conversion between plain JSON fields and Firestore's typed `Value`
//! representation.

use serde_json::{json, Map, Value};

use crate::document::{Document, Fields};
use crate::error::StoreError;

/// Encode a JSON value as a Firestore `Value`.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            // Firestore transports 64-bit integers as strings.
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

/// Encode a field map as the `fields` object of a Firestore document.
pub fn encode_fields(fields: &Fields) -> Value {
    let encoded: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(encoded)
}

/// Decode a Firestore `Value` into plain JSON.
///
/// Timestamps become RFC 3339 strings and references become their resource
/// name; geo points and bytes are not used by this application and are
/// rejected.
pub fn decode_value(value: &Value) -> Result<Value, StoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::Decode(format!("expected Firestore value object, got {value}")))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::Decode("empty Firestore value".into()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or(false))),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| StoreError::Decode(format!("invalid integerValue {inner}")))
        }
        "doubleValue" => inner
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| StoreError::Decode(format!("invalid doubleValue {inner}"))),
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|vs| vs.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = match inner.get("fields") {
                Some(f) => decode_fields(f)?,
                None => Fields::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(StoreError::Decode(format!("unsupported Firestore value type {other}"))),
    }
}

/// Decode the `fields` object of a Firestore document.
pub fn decode_fields(fields: &Value) -> Result<Fields, StoreError> {
    let obj = fields
        .as_object()
        .ok_or_else(|| StoreError::Decode("document fields must be an object".into()))?;
    obj.iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

/// Decode a Firestore `Document` resource. The id is the last segment of
/// its `name`.
pub fn decode_document(doc: &Value) -> Result<Document, StoreError> {
    let name = doc
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| StoreError::Decode("document has no name".into()))?;
    let id = name.rsplit('/').next().unwrap_or(name);
    let id = urlencoding::decode(id)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| id.to_string());
    let fields = match doc.get("fields") {
        Some(f) => decode_fields(f)?,
        None => Fields::new(),
    };
    Ok(Document::new(id, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_values_survive_encoding() {
        let original = json!({
            "ownerId": "amy",
            "pinned": true,
            "sets": [{"exercise": "Squat", "weight": 102.5, "reps": 5}],
            "updatedBy": null,
        });
        let Value::Object(fields) = original.clone() else { unreachable!() };
        let encoded = encode_fields(&fields);
        assert_eq!(encoded["sets"]["arrayValue"]["values"][0]["mapValue"]["fields"]["reps"],
            json!({"integerValue": "5"}));
        assert_eq!(Value::Object(decode_fields(&encoded).unwrap()), original);
    }

    #[test]
    fn decodes_document_name_to_id() {
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/records/amy_2024-05-01",
            "fields": {"memo": {"stringValue": "ok"}},
        });
        let decoded = decode_document(&doc).unwrap();
        assert_eq!(decoded.id, "amy_2024-05-01");
        assert_eq!(decoded.fields["memo"], "ok");
    }

    #[test]
    fn rejects_unsupported_types() {
        assert!(decode_value(&json!({"geoPointValue": {"latitude": 1.0}})).is_err());
        assert!(decode_value(&json!("bare")).is_err());
    }
}
