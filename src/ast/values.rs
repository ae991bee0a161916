//! Typed literal values.
//!
//! A value's variant is fixed by literal syntax at parse time: `500` is an
//! integer, `1965-01-01` a calendar instant, `"500"` a string. Nothing
//! re-types a value after construction.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A literal value carried by a keyword or comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Calendar instant, UTC only. Date-only literals are midnight UTC.
    Time(DateTime<Utc>),
    Float(f64),
    Integer(i64),
    Bool(bool),
    String(String),
}

impl Value {
    /// One-letter serialization tag for the variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Value::Time(_) => "T",
            Value::Float(_) => "F",
            Value::Integer(_) => "I",
            Value::Bool(_) => "B",
            Value::String(_) => "S",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Time(t) => f.write_str(&rfc3339(t)),
            Value::Float(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v:?}"),
        }
    }
}

/// Canonical timestamp rendering: whole seconds, `Z` suffix. The grammar
/// only admits whole-second instants, so this loses nothing.
fn rfc3339(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Each value serializes as a single-key mapping keyed by its one-letter
/// tag: `{"I": 500}`, `{"T": "1965-01-01T00:00:00Z"}`, and so on.
impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Value::Time(t) => map.serialize_entry("T", &rfc3339(t))?,
            Value::Float(v) => map.serialize_entry("F", v)?,
            Value::Integer(v) => map.serialize_entry("I", v)?,
            Value::Bool(v) => map.serialize_entry("B", v)?,
            Value::String(v) => map.serialize_entry("S", v)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-key mapping tagged T, F, I, B, or S")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let tag: String = map
                    .next_key()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let value = match tag.as_str() {
                    "T" => {
                        let raw: String = map.next_value()?;
                        let parsed = DateTime::parse_from_rfc3339(&raw)
                            .map_err(de::Error::custom)?;
                        Value::Time(parsed.with_timezone(&Utc))
                    }
                    "F" => Value::Float(map.next_value()?),
                    "I" => Value::Integer(map.next_value()?),
                    "B" => Value::Bool(map.next_value()?),
                    "S" => Value::String(map.next_value()?),
                    other => {
                        return Err(de::Error::unknown_variant(
                            other,
                            &["T", "F", "I", "B", "S"],
                        ))
                    }
                };
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom("expected a single-key value mapping"));
                }
                Ok(value)
            }
        }

        deserializer.deserialize_map(ValueVisitor)
    }
}
