use crate::error::{AdTableError, Result};
use crate::schema::AdObject;
use serde_json::{Map, Value};

/// Parses model output into ads, tolerating the shape drift LLMs produce.
pub fn parse_ads(json: &str) -> Result<Vec<AdObject>> {
    let value: Value = serde_json::from_str(json).map_err(AdTableError::ParseFailed)?;
    ads_from_value(&value)
}

/// Lenient conversion of an already-parsed document.
///
/// Only the top level is strict: it must be an array, and every element an object.
/// Inside an ad, absent or mistyped list fields become empty lists and list
/// elements are coerced to text.
pub fn ads_from_value(value: &Value) -> Result<Vec<AdObject>> {
    let items = match value {
        Value::Array(items) => items,
        other => return Err(AdTableError::NotASequence(json_kind(other))),
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(fields) => Ok(ad_from_fields(fields)),
            _ => Err(AdTableError::NotAnObject {
                ad_number: idx + 1,
            }),
        })
        .collect()
}

fn ad_from_fields(fields: &Map<String, Value>) -> AdObject {
    AdObject {
        ad_type_name: fields.get("ad_type_name").map(coerce_text).unwrap_or_default(),
        headlines: coerce_text_list(fields.get("headlines")),
        long_headlines: coerce_text_list(fields.get("long_headlines")),
        body_texts: coerce_text_list(fields.get("body_texts")),
        descriptions: coerce_text_list(fields.get("descriptions")),
    }
}

fn coerce_text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(coerce_text).collect(),
        _ => Vec::new(),
    }
}

/// Text form of a JSON value as it should appear in a CSV cell.
///
/// Booleans are capitalised (`True`/`False`) so existing sheets built from
/// this data keep their values. Nested arrays and objects stay compact JSON.
pub fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
