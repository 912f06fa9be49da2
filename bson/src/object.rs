//! Caller-side object graph handed to `marshal`.
//!
//! Maps, lists and records are shared handles: cloning one clones the handle,
//! not the contents, so the same container can appear at several places in a
//! graph, or inside itself. The encoder tells those cases apart by handle
//! identity.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::FieldError;
use crate::value::{BinaryKind, DateTime, Document, SequenceKind, Value};

#[derive(Debug, Clone)]
pub enum Object {
    Null,
    Boolean(bool),
    Double(f64),
    /// Wider than any wire integer so oversized values can be rejected.
    Integer(i128),
    String(String),
    Bytes(Vec<u8>),
    ByteArray(Vec<u8>),
    DateTime(DateTime),
    Map(Map),
    List(List),
    Tuple(Vec<Object>),
    Record(Record),
    /// A value with no document representation, named by its type.
    Foreign(&'static str),
}

impl Object {
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Null => "null",
            Object::Boolean(_) => "boolean",
            Object::Double(_) => "double",
            Object::Integer(_) => "integer",
            Object::String(_) => "string",
            Object::Bytes(_) => "bytes",
            Object::ByteArray(_) => "bytearray",
            Object::DateTime(_) => "datetime",
            Object::Map(_) => "map",
            Object::List(_) => "list",
            Object::Tuple(_) => "tuple",
            Object::Record(_) => "record",
            Object::Foreign(name) => *name,
        }
    }

    /// Identity of the shared container behind this object, if any.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Object::Map(map) => Some(map.identity()),
            Object::List(list) => Some(list.identity()),
            Object::Record(record) => Some(record.identity()),
            _ => None,
        }
    }
}

impl From<bool> for Object {
    fn from(v: bool) -> Self {
        Object::Boolean(v)
    }
}

impl From<i32> for Object {
    fn from(v: i32) -> Self {
        Object::Integer(v.into())
    }
}

impl From<i64> for Object {
    fn from(v: i64) -> Self {
        Object::Integer(v.into())
    }
}

impl From<u64> for Object {
    fn from(v: u64) -> Self {
        Object::Integer(v.into())
    }
}

impl From<i128> for Object {
    fn from(v: i128) -> Self {
        Object::Integer(v)
    }
}

impl From<f64> for Object {
    fn from(v: f64) -> Self {
        Object::Double(v)
    }
}

impl From<&str> for Object {
    fn from(v: &str) -> Self {
        Object::String(v.to_string())
    }
}

impl From<String> for Object {
    fn from(v: String) -> Self {
        Object::String(v)
    }
}

impl From<Vec<u8>> for Object {
    fn from(v: Vec<u8>) -> Self {
        Object::Bytes(v)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Object {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        Object::DateTime(v.into())
    }
}

impl From<DateTime> for Object {
    fn from(v: DateTime) -> Self {
        Object::DateTime(v)
    }
}

impl From<Map> for Object {
    fn from(v: Map) -> Self {
        Object::Map(v)
    }
}

impl From<List> for Object {
    fn from(v: List) -> Self {
        Object::List(v)
    }
}

impl From<Record> for Object {
    fn from(v: Record) -> Self {
        Object::Record(v)
    }
}

impl From<Value> for Object {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Object::Null,
            Value::Boolean(b) => Object::Boolean(b),
            Value::Double(d) => Object::Double(d),
            Value::Int32(i) => Object::Integer(i.into()),
            Value::Int64(i) => Object::Integer(i.into()),
            Value::String(s) => Object::String(s),
            Value::Binary(binary) => match binary.kind() {
                BinaryKind::Bytes => Object::Bytes(binary.into_bytes()),
                BinaryKind::ByteArray => Object::ByteArray(binary.into_bytes()),
            },
            Value::Document(document) => Object::Map(document.into()),
            Value::Array(array) => {
                let kind = array.kind();
                let items = array.into_items().into_iter().map(Object::from);
                match kind {
                    SequenceKind::List => Object::List(items.collect()),
                    SequenceKind::Tuple => Object::Tuple(items.collect()),
                }
            }
            Value::DateTime(dt) => Object::DateTime(dt),
        }
    }
}

impl From<Document> for Object {
    fn from(document: Document) -> Self {
        Object::Map(document.into())
    }
}

/// Shared, mutable mapping. Keys are objects so that non-string keys can be
/// represented (and rejected by the encoder).
#[derive(Clone, Default)]
pub struct Map(Rc<RefCell<Vec<(Object, Object)>>>);

impl Map {
    pub fn new() -> Self {
        Map::default()
    }

    /// Inserts `value` under `key`, replacing the value of an equal string key.
    pub fn insert(&self, key: impl Into<Object>, value: impl Into<Object>) {
        let key = key.into();
        let value = value.into();
        let mut entries = self.0.borrow_mut();
        let position = match &key {
            Object::String(k) => entries
                .iter()
                .position(|(other, _)| matches!(other, Object::String(o) if o == k)),
            _ => None,
        };
        match position {
            Some(i) => entries[i].1 = value,
            None => entries.push((key, value)),
        }
    }

    /// Appends an entry without looking for an existing key.
    pub fn push(&self, key: impl Into<Object>, value: impl Into<Object>) {
        self.0.borrow_mut().push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn entries(&self) -> Ref<'_, Vec<(Object, Object)>> {
        self.0.borrow()
    }

    /// Whether both handles point at the same map.
    pub fn ptr_eq(&self, other: &Map) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl<K: Into<Object>, V: Into<Object>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Map::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl From<Document> for Map {
    fn from(document: Document) -> Self {
        let map = Map::new();
        for (key, value) in document {
            map.push(Object::String(key), Object::from(value));
        }
        map
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Map({} entries @ {:#x})", self.len(), self.identity())
    }
}

/// Shared, mutable sequence.
#[derive(Clone, Default)]
pub struct List(Rc<RefCell<Vec<Object>>>);

impl List {
    pub fn new() -> Self {
        List::default()
    }

    pub fn push(&self, item: impl Into<Object>) {
        self.0.borrow_mut().push(item.into());
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn items(&self) -> Ref<'_, Vec<Object>> {
        self.0.borrow()
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl<T: Into<Object>> FromIterator<T> for List {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        List(Rc::new(RefCell::new(iter.into_iter().map(Into::into).collect())))
    }
}

impl fmt::Debug for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "List({} items @ {:#x})", self.len(), self.identity())
    }
}

/// Something that can be flattened into named fields.
pub trait Fields {
    /// Field names and values in declaration order. A failed accessor yields
    /// `Err` and the field is left out.
    fn fields(&self) -> Vec<(String, Result<Object, FieldError>)>;

    /// `true` for types with a fixed field list, `false` for objects that
    /// merely expose readable properties. An object of the latter kind with
    /// nothing readable cannot be encoded.
    fn declares_fields(&self) -> bool {
        true
    }
}

/// Shared handle to a [`Fields`] implementor.
#[derive(Clone)]
pub struct Record(Rc<dyn Fields>);

impl Record {
    pub fn new<F: Fields + 'static>(fields: F) -> Self {
        Record(Rc::new(fields))
    }

    pub fn fields(&self) -> Vec<(String, Result<Object, FieldError>)> {
        self.0.fields()
    }

    pub fn declares_fields(&self) -> bool {
        self.0.declares_fields()
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record(@ {:#x})", self.identity())
    }
}
