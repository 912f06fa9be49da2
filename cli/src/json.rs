//! JSON input for `encode`.
//!
//! Plain JSON maps onto objects directly. A JSON object with exactly one of
//! the keys below stands for a value JSON has no literal for:
//!
//! * `{"$binary": "00ff"}`: bytes, hex encoded
//! * `{"$bytearray": "00ff"}`: a bytearray, hex encoded
//! * `{"$date": "2024-01-02T03:04:05.678Z"}`: an RFC 3339 datetime, or
//!   milliseconds since the epoch as a number
//! * `{"$tuple": [...]}`: a tuple

use bson::{DateTime, List, Map, Object};
use serde_json::Value;

use crate::error::{Error, Result};

pub(crate) fn to_object(value: &Value) -> Result<Object> {
    let object = match value {
        Value::Null => Object::Null,
        Value::Bool(b) => Object::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Object::Integer(i.into())
            } else if let Some(u) = n.as_u64() {
                Object::Integer(u.into())
            } else {
                Object::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Object::String(s.clone()),
        Value::Array(items) => Object::List(
            items
                .iter()
                .map(to_object)
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .collect::<List>(),
        ),
        Value::Object(entries) => {
            if let Some(object) = extended(entries)? {
                return Ok(object);
            }
            let map = Map::new();
            for (key, value) in entries {
                map.push(key.as_str(), to_object(value)?);
            }
            Object::Map(map)
        }
    };
    Ok(object)
}

fn extended(entries: &serde_json::Map<String, Value>) -> Result<Option<Object>> {
    let mut iter = entries.iter();
    let (Some((key, value)), None) = (iter.next(), iter.next()) else {
        return Ok(None);
    };
    let object = match (key.as_str(), value) {
        ("$binary", Value::String(hex)) => Object::Bytes(hex::decode(hex)?),
        ("$bytearray", Value::String(hex)) => Object::ByteArray(hex::decode(hex)?),
        ("$date", Value::String(text)) => {
            let dt = chrono::DateTime::parse_from_rfc3339(text)
                .map_err(|e| Error::InvalidInput(format!("$date {text:?}: {e}")))?;
            Object::from(dt.with_timezone(&chrono::Utc))
        }
        ("$date", Value::Number(n)) => match n.as_i64() {
            Some(millis) => Object::DateTime(DateTime::from_millis(millis)),
            None => return Err(Error::InvalidInput(format!("$date {n} is not whole milliseconds"))),
        },
        ("$tuple", Value::Array(items)) => {
            Object::Tuple(items.iter().map(to_object).collect::<Result<_>>()?)
        }
        ("$binary" | "$bytearray" | "$date" | "$tuple", other) => {
            return Err(Error::InvalidInput(format!("unexpected {key} value {other}")));
        }
        _ => return Ok(None),
    };
    Ok(Some(object))
}
