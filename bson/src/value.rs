use std::collections::HashMap;

use chrono::{TimeZone, Utc};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Double(f64),
    Int32(i32),
    Int64(i64),
    String(String),
    Binary(Binary),
    Document(Document),
    Array(Array),
    DateTime(DateTime),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Double(_) => "double",
            Value::Int32(_) => "int32",
            Value::Int64(_) => "int64",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Document(_) => "document",
            Value::Array(_) => "array",
            Value::DateTime(_) => "datetime",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&Binary> {
        match self {
            Value::Binary(b) => Some(b),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<Binary> for Value {
    fn from(v: Binary) -> Self {
        Value::Binary(v)
    }
}

impl From<Document> for Value {
    fn from(v: Document) -> Self {
        Value::Document(v)
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Value::Array(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(Array::list(v))
    }
}

impl From<DateTime> for Value {
    fn from(v: DateTime) -> Self {
        Value::DateTime(v)
    }
}

/// Which caller-side byte container a binary value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BinaryKind {
    #[default]
    Bytes,
    ByteArray,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binary {
    kind: BinaryKind,
    bytes: Vec<u8>,
}

impl Binary {
    pub fn new(bytes: Vec<u8>) -> Self {
        Binary {
            kind: BinaryKind::Bytes,
            bytes,
        }
    }

    pub fn bytearray(bytes: Vec<u8>) -> Self {
        Binary {
            kind: BinaryKind::ByteArray,
            bytes,
        }
    }

    pub fn kind(&self) -> BinaryKind {
        self.kind
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub(crate) fn set_kind(&mut self, kind: BinaryKind) {
        self.kind = kind;
    }
}

impl Serialize for Binary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if serializer.is_human_readable() {
            let hex = self
                .bytes
                .iter()
                .map(|b| format!("{:02x}", b))
                .collect::<String>();
            serializer.serialize_str(&hex)
        } else {
            serializer.serialize_bytes(&self.bytes)
        }
    }
}

/// Which caller-side sequence an array came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    #[default]
    List,
    Tuple,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Array {
    kind: SequenceKind,
    items: Vec<Value>,
}

impl Array {
    pub fn list(items: Vec<Value>) -> Self {
        Array {
            kind: SequenceKind::List,
            items,
        }
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Array {
            kind: SequenceKind::Tuple,
            items,
        }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn set_kind(&mut self, kind: SequenceKind) {
        self.kind = kind;
    }
}

/// Ordered string-keyed mapping. Keys are unique; wire order is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: Vec<(String, Value)>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Inserts `value` under `key`, replacing (in place) and returning any
    /// previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_entries(self) -> Vec<(String, Value)> {
        self.entries
    }

    // caller guarantees unique keys
    pub(crate) fn from_unique(entries: Vec<(String, Value)>) -> Self {
        Document { entries }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<(String, Value)> = Vec::new();
        for (key, value) in iter {
            let (key, value) = (key.into(), value.into());
            match positions.get(&key) {
                Some(&i) => entries[i].1 = value,
                None => {
                    positions.insert(key.clone(), entries.len());
                    entries.push((key, value));
                }
            }
        }
        Document { entries }
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateTime(i64);

impl DateTime {
    pub fn from_millis(millis: i64) -> Self {
        DateTime(millis)
    }

    pub fn timestamp_millis(&self) -> i64 {
        self.0
    }

    /// `None` when the instant is outside the range chrono can represent.
    pub fn to_chrono(&self) -> Option<chrono::DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.0).single()
    }
}

/// Drops sub-millisecond precision, rounding towards negative infinity.
impl From<chrono::DateTime<Utc>> for DateTime {
    fn from(value: chrono::DateTime<Utc>) -> Self {
        DateTime(value.timestamp_millis())
    }
}

impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.to_chrono() {
            Some(dt) if serializer.is_human_readable() => {
                serializer.serialize_str(&dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
            }
            _ => serializer.serialize_i64(self.0),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Double(d) => serializer.serialize_f64(*d),
            Value::Int32(i) => serializer.serialize_i32(*i),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::String(s) => serializer.serialize_str(s),
            Value::Binary(b) => b.serialize(serializer),
            Value::Document(d) => d.serialize(serializer),
            Value::Array(a) => a.serialize(serializer),
            Value::DateTime(dt) => dt.serialize(serializer),
        }
    }
}

impl Serialize for Array {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in &self.items {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

impl Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_document_from_iter_last_value_wins() {
        let document: Document = [("a", 1), ("b", 2), ("a", 3)].into_iter().collect();
        assert_eq!(
            vec![("a", &Value::Int32(3)), ("b", &Value::Int32(2))],
            document.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_document_from_iter_many_keys() {
        let document: Document = (0..100_000).map(|i| (format!("k{i}"), i)).collect();
        assert_eq!(100_000, document.len());
        assert_eq!(Some(&Value::Int32(99_999)), document.get("k99999"));
    }

    #[test]
    fn test_document_insert_replaces_in_place() {
        let mut document = Document::new();
        assert_eq!(None, document.insert("a", 1));
        assert_eq!(None, document.insert("b", 2));
        assert_eq!(Some(Value::Int32(1)), document.insert("a", "x"));
        let keys: Vec<&str> = document.keys().collect();
        assert_eq!(vec!["a", "b"], keys);
        assert_eq!(Some(&Value::from("x")), document.get("a"));
    }

    #[rstest(nanos, expected,
        case(1_500_000, 1),
        case(999_999, 0),
        case(0, 0),
    )]
    fn test_datetime_from_chrono_floors(nanos: u32, expected: i64) {
        let dt = Utc.timestamp_opt(0, nanos).unwrap();
        assert_eq!(expected, DateTime::from(dt).timestamp_millis());
    }

    #[test]
    fn test_datetime_negative_floors() {
        // 1.5ms before the epoch
        let dt = Utc.timestamp_opt(-1, 998_500_000).unwrap();
        assert_eq!(-2, DateTime::from(dt).timestamp_millis());
    }

    #[test]
    fn test_datetime_out_of_chrono_range() {
        assert!(DateTime::from_millis(i64::MAX).to_chrono().is_none());
        assert!(DateTime::from_millis(0).to_chrono().is_some());
    }

    #[test]
    fn test_serialize_json() {
        let document: Document = vec![
            ("b", Value::Binary(Binary::new(vec![0x00, 0xff]))),
            ("d", Value::DateTime(DateTime::from_millis(0))),
            ("a", Value::from(vec![Value::Null, Value::from(true)])),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&document).unwrap();
        assert_eq!(
            r#"{"b":"00ff","d":"1970-01-01T00:00:00.000Z","a":[null,true]}"#,
            json
        );
    }
}
