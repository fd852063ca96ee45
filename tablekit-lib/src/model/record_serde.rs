//! JSON (de)serialization for Record.
//!
//! ## Read Format (Deserialization)
//!
//! A record is any JSON object. Field values convert as follows:
//! - integers become `Long`, other numbers `Float`
//! - strings stay strings (timestamps are interpreted lazily by filters)
//! - objects become nested `Record`s, so dotted paths can reach into them
//! - arrays whose elements are all objects become `Records`, any other array
//!   is kept as raw `Json`
//!
//! ## Write Format (Serialization)
//!
//! Fields serialize back as a flat JSON object, nested records as nested
//! objects, so a parsed record serializes to an equivalent document.

use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use serde::de::MapAccess;
use serde::de::Visitor;
use serde::ser::SerializeMap;

use super::Record;
use super::Value;

// =============================================================================
// Serialization
// =============================================================================

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Deserialization
// =============================================================================

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(RecordVisitor)
    }
}

struct RecordVisitor;

impl<'de> Visitor<'de> for RecordVisitor {
    type Value = Record;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON object representing a record")
    }

    fn visit_map<M>(self, mut map: M) -> Result<Record, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut record = Record::new();
        while let Some(key) = map.next_key::<String>()? {
            let value: serde_json::Value = map.next_value()?;
            record.fields.insert(key, json_value_to_value(value));
        }
        Ok(record)
    }
}

/// Converts a serde_json::Value to our Value enum.
pub(crate) fn json_value_to_value(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Long(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Json(serde_json::Value::Number(n))
            }
        }
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(arr) => {
            if !arr.is_empty() && arr.iter().all(serde_json::Value::is_object) {
                Value::Records(arr.into_iter().filter_map(json_object_to_record).collect())
            } else {
                Value::Json(serde_json::Value::Array(arr))
            }
        }
        serde_json::Value::Object(obj) => Value::Record(Box::new(object_to_record(obj))),
    }
}

fn json_object_to_record(json: serde_json::Value) -> Option<Record> {
    match json {
        serde_json::Value::Object(obj) => Some(object_to_record(obj)),
        _ => None,
    }
}

pub(crate) fn object_to_record(obj: serde_json::Map<String, serde_json::Value>) -> Record {
    obj.into_iter()
        .map(|(key, value)| (key, json_value_to_value(value)))
        .collect()
}

impl From<serde_json::Map<String, serde_json::Value>> for Record {
    fn from(obj: serde_json::Map<String, serde_json::Value>) -> Self {
        object_to_record(obj)
    }
}
