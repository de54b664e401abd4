//! Typed view of a worker's attribute blob.
//!
//! The directory stores one JSON object per worker. This tool owns the keys
//! listed in [`OwnedField`] plus `contact_uri` and `routing.skills` /
//! `routing.levels`; everything else stays in `fields` (or, inside a typed
//! [`Routing`], in `extra`) and is written back verbatim.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::types::OwnedField;

pub const CONTACT_URI_KEY: &str = "contact_uri";
pub const ROUTING_KEY: &str = "routing";

/// Task-routing capabilities of a worker.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Routing {
    pub skills: Vec<String>,
    /// Only skills with an explicit level appear here.
    pub levels: BTreeMap<String, i64>,
    /// Any other keys under `routing`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Routing {
    /// Lenient read of a remote `routing` object: non-string skills are
    /// dropped and non-numeric levels are ignored.
    fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };
        let skills = match map.remove("skills") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };
        let levels = match map.remove("levels") {
            Some(Value::Object(entries)) => entries
                .into_iter()
                .filter_map(|(skill, level)| {
                    let level = level
                        .as_i64()
                        .or_else(|| level.as_f64().map(|f| f.trunc() as i64))?;
                    Some((skill, level))
                })
                .collect(),
            _ => BTreeMap::new(),
        };
        Self {
            skills,
            levels,
            extra: map,
        }
    }
}

/// A worker attribute blob.
///
/// Every top-level key, `routing` included, is kept as raw JSON. The typed
/// [`Routing`] view is only materialized when skills are compared or
/// written, so a blob updated without a skill source keeps its routing
/// byte for byte.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerAttributes {
    pub fields: Map<String, Value>,
}

impl WorkerAttributes {
    /// Parse the raw attribute text returned by the directory. An empty
    /// string is treated as an empty object.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_str(raw)?;
        let Value::Object(fields) = value else {
            return Err(CoreError::MalformedAttributes(raw.chars().take(80).collect()));
        };
        Ok(Self { fields })
    }

    pub fn owned(&self, field: OwnedField) -> Option<&Value> {
        self.fields.get(field.key())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Lenient typed view of `routing`, empty when the blob has none.
    pub fn routing_or_default(&self) -> Routing {
        self.fields
            .get(ROUTING_KEY)
            .cloned()
            .map(Routing::from_value)
            .unwrap_or_default()
    }

    /// Replace `routing` with the serialized typed view.
    pub fn set_routing(&mut self, routing: &Routing) {
        // A struct of strings, integers and JSON values always serializes.
        let value = serde_json::to_value(routing).unwrap_or(Value::Null);
        self.fields.insert(ROUTING_KEY.to_string(), value);
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    /// Compact JSON text, the form the directory accepts.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.to_value()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_splits_routing_from_fields() {
        let attrs = WorkerAttributes::parse(
            r#"{"email":"a@b.com","routing":{"skills":["sales"],"levels":{"sales":2}}}"#,
        )
        .expect("parse");
        assert_eq!(attrs.get("email"), Some(&json!("a@b.com")));
        let routing = attrs.routing_or_default();
        assert_eq!(routing.skills, vec!["sales".to_string()]);
        assert_eq!(routing.levels.get("sales"), Some(&2));
    }

    #[test]
    fn parse_empty_text_is_empty_blob() {
        assert_eq!(WorkerAttributes::parse("").expect("parse"), WorkerAttributes::default());
    }

    #[test]
    fn parse_rejects_non_object() {
        let err = WorkerAttributes::parse("[1,2]").unwrap_err();
        assert!(matches!(err, CoreError::MalformedAttributes(_)));
        assert!(matches!(
            WorkerAttributes::parse("{not json").unwrap_err(),
            CoreError::Json(_)
        ));
    }

    #[test]
    fn unknown_keys_survive_a_round_trip() {
        let raw = r#"{"disposition_codes":["a"],"routing":{"skills":[],"levels":{},"queue_hint":"vip"}}"#;
        let attrs = WorkerAttributes::parse(raw).expect("parse");
        let value = attrs.to_value();
        assert_eq!(value["disposition_codes"], json!(["a"]));
        assert_eq!(value["routing"]["queue_hint"], json!("vip"));
        assert_eq!(value["routing"]["skills"], json!([]));
    }

    #[test]
    fn lenient_routing_drops_junk() {
        let attrs = WorkerAttributes::parse(
            r#"{"routing":{"skills":["a",3,null],"levels":{"a":2.0,"b":"high"}}}"#,
        )
        .expect("parse");
        let routing = attrs.routing_or_default();
        assert_eq!(routing.skills, vec!["a".to_string()]);
        assert_eq!(routing.levels.len(), 1);
        assert_eq!(routing.levels.get("a"), Some(&2));
    }

    #[test]
    fn untouched_routing_is_written_back_verbatim() {
        let raw = r#"{"routing":{"levels":{"a":2.5,"b":"high"},"skills":["a",7]}}"#;
        let attrs = WorkerAttributes::parse(raw).expect("parse");
        assert_eq!(attrs.to_json(), raw);
    }

    #[test]
    fn set_routing_keeps_extra_routing_keys() {
        let mut attrs =
            WorkerAttributes::parse(r#"{"routing":{"skills":["a"],"levels":{},"queue_hint":"vip"}}"#)
                .expect("parse");
        let mut routing = attrs.routing_or_default();
        routing.skills = vec!["b".to_string()];
        attrs.set_routing(&routing);
        assert_eq!(
            attrs.to_value()["routing"],
            json!({"skills": ["b"], "levels": {}, "queue_hint": "vip"})
        );
    }

    #[test]
    fn no_routing_key_serializes_without_routing() {
        let attrs = WorkerAttributes::parse(r#"{"email":"x"}"#).expect("parse");
        assert_eq!(attrs.to_json(), r#"{"email":"x"}"#);
    }
}
