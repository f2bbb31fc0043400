//! JSON response conventions: camel-cased object keys, null members omitted.
//!
//! [`sc_derive::api_model`] applies the same rule at the type level; [`ApiJson`]
//! enforces it on the serialized value, so dictionaries and foreign types follow it too.

use super::problem::ProblemDetails;
use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

/// A JSON response body written with the API's conventions.
#[derive(Debug, Clone, Copy, Default)]
#[must_use]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> IntoResponse for ApiJson<T> {
    fn into_response(self) -> Response {
        match to_api_value(&self.0) {
            Ok(value) => Json(value).into_response(),
            Err(err) => {
                error!(error = %err, "Failed to serialize response body");
                ProblemDetails::internal().into_response()
            },
        }
    }
}

/// Serializes `value`, then camel-cases every object key and drops null members.
///
/// # Errors
/// Returns the serializer error if `value` cannot be represented as JSON.
pub fn to_api_value<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value).map(normalize)
}

fn normalize(value: Value) -> Value {
    match value {
        Value::Object(members) => Value::Object(
            members
                .into_iter()
                .filter(|(_, member)| !member.is_null())
                .map(|(key, member)| (camel_case(&key), normalize(member)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

/// Lowercases the leading run of capitals: `Name` → `name`, `ID` → `id`,
/// `URLValue` → `urlValue`. Keys that do not start upper-case are kept as-is.
pub fn camel_case(key: &str) -> String {
    if !key.chars().next().is_some_and(char::is_uppercase) {
        return key.to_owned();
    }

    let mut chars: Vec<char> = key.chars().collect();
    for i in 0..chars.len() {
        if i == 1 && !chars[i].is_uppercase() {
            break;
        }

        let next = chars.get(i + 1).copied();
        if i > 0 && next.is_some_and(|c| !c.is_uppercase()) {
            if next == Some(' ') {
                chars[i] = lowercase(chars[i]);
            }
            break;
        }

        chars[i] = lowercase(chars[i]);
    }

    chars.into_iter().collect()
}

fn lowercase(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn camel_case_follows_the_leading_capitals_rule() {
        assert_eq!(camel_case("Name"), "name");
        assert_eq!(camel_case("ID"), "id");
        assert_eq!(camel_case("URLValue"), "urlValue");
        assert_eq!(camel_case("PointOfContact"), "pointOfContact");
        assert_eq!(camel_case("alreadyCamel"), "alreadyCamel");
        assert_eq!(camel_case("snake_case"), "snake_case");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn nested_nulls_are_removed_and_keys_normalized() {
        let mut labels = BTreeMap::new();
        labels.insert("Region", Some("EU"));
        labels.insert("Owner", None);

        let value = to_api_value(&json!({
            "Vendor": { "Name": "Acme", "Site": null },
            "Labels": labels,
            "Items": [{ "Value": 1, "Note": null }],
        }))
        .expect("serialize");

        assert_eq!(
            value,
            json!({
                "vendor": { "name": "Acme" },
                "labels": { "region": "EU" },
                "items": [{ "value": 1 }],
            })
        );
    }

    #[test]
    fn nulls_inside_arrays_are_kept() {
        let value = to_api_value(&json!({ "values": [1, null, 3] })).expect("serialize");
        assert_eq!(value, json!({ "values": [1, null, 3] }));
    }
}
