use std::collections::HashSet;

use wire::{BINARY_SUBTYPE_GENERIC, BINARY_SUBTYPE_USER_DEFINED, ElementType, Writer};

use crate::error::MarshalError;
use crate::metadata::{self, METADATA_KEY, Marker};
use crate::object::{Object, Record};

/// One marshal call: the output writer plus the identities of the
/// containers on the path from the root to the value being encoded.
pub(crate) struct Marshaler {
    keep_types: bool,
    writer: Writer,
    path: Vec<usize>,
}

impl Marshaler {
    pub(crate) fn new(keep_types: bool) -> Self {
        Marshaler {
            keep_types,
            writer: Writer::new(),
            path: Vec::new(),
        }
    }

    pub(crate) fn marshal(mut self, object: &Object) -> Result<Vec<u8>, MarshalError> {
        if !matches!(object, Object::Map(_) | Object::Record(_)) {
            return Err(MarshalError::UnsupportedObject(format!(
                "top-level {} is not a mapping",
                object.type_name()
            )));
        }
        self.writer.begin_document()?;
        self.write_mapping(object)?;
        self.writer.end_document()?;
        Ok(self.writer.into_bytes())
    }

    fn enter(&mut self, identity: Option<usize>) -> Result<(), MarshalError> {
        if let Some(identity) = identity {
            if self.path.contains(&identity) {
                return Err(MarshalError::CycleDetected);
            }
            self.path.push(identity);
        }
        Ok(())
    }

    fn leave(&mut self, identity: Option<usize>) {
        if identity.is_some() {
            self.path.pop();
        }
    }

    /// Writes the elements of a map or record into the open document.
    fn write_mapping(&mut self, object: &Object) -> Result<(), MarshalError> {
        let identity = object.identity();
        self.enter(identity)?;
        match object {
            Object::Map(map) => {
                let entries = map.entries();
                let keyed = map_entries(&entries)?;
                self.write_elements(&keyed)?;
            }
            Object::Record(record) => {
                let fields = record_fields(record)?;
                let keyed: Vec<(&str, &Object)> =
                    fields.iter().map(|(k, v)| (k.as_str(), v)).collect();
                check_keys(&keyed)?;
                self.write_elements(&keyed)?;
            }
            other => {
                return Err(MarshalError::UnsupportedObject(
                    other.type_name().to_string(),
                ));
            }
        }
        self.leave(identity);
        Ok(())
    }

    fn write_sequence(&mut self, items: &[Object]) -> Result<(), MarshalError> {
        let keys: Vec<String> = (0..items.len()).map(|i| i.to_string()).collect();
        let keyed: Vec<(&str, &Object)> = keys.iter().map(String::as_str).zip(items).collect();
        self.write_elements(&keyed)
    }

    fn write_elements(&mut self, entries: &[(&str, &Object)]) -> Result<(), MarshalError> {
        let mut markers = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            markers.push(self.write_value(key, value)?);
        }
        if self.keep_types {
            if let Some(payload) = metadata::encode(&markers) {
                self.writer
                    .write_binary(METADATA_KEY, BINARY_SUBTYPE_USER_DEFINED, &payload)?;
            }
        }
        Ok(())
    }

    /// Writes one element and returns the sidecar marker it needs.
    fn write_value(&mut self, key: &str, value: &Object) -> Result<Marker, MarshalError> {
        match value {
            Object::Null => self.writer.write_null(key)?,
            Object::Boolean(b) => self.writer.write_boolean(key, *b)?,
            Object::Double(d) => self.writer.write_double(key, *d)?,
            Object::Integer(i) => {
                if let Ok(v) = i32::try_from(*i) {
                    self.writer.write_int32(key, v)?;
                } else if let Ok(v) = i64::try_from(*i) {
                    self.writer.write_int64(key, v)?;
                } else {
                    return Err(MarshalError::IntegerTooBig(*i));
                }
            }
            Object::String(s) => self.writer.write_string(key, s)?,
            Object::Bytes(data) => self.writer.write_binary(key, BINARY_SUBTYPE_GENERIC, data)?,
            Object::ByteArray(data) => {
                self.writer.write_binary(key, BINARY_SUBTYPE_GENERIC, data)?;
                return Ok(Marker::ByteArray);
            }
            Object::DateTime(dt) => self.writer.write_datetime(key, dt.timestamp_millis())?,
            Object::Map(_) | Object::Record(_) => {
                self.writer.begin_embedded(key, ElementType::Document)?;
                self.write_mapping(value)?;
                self.writer.end_document()?;
            }
            Object::List(list) => {
                let identity = value.identity();
                self.enter(identity)?;
                self.writer.begin_embedded(key, ElementType::Array)?;
                self.write_sequence(&list.items())?;
                self.writer.end_document()?;
                self.leave(identity);
            }
            Object::Tuple(items) => {
                self.writer.begin_embedded(key, ElementType::Array)?;
                self.write_sequence(items)?;
                self.writer.end_document()?;
                return Ok(Marker::Tuple);
            }
            Object::Foreign(name) => {
                return Err(MarshalError::UnsupportedObject(name.to_string()));
            }
        }
        Ok(Marker::Plain)
    }
}

/// Validated map entries in emission order.
///
/// Keys are checked in passes over the whole map: every key must be a
/// string, then no key may hold a NUL byte, then keys must be unique. Keys
/// are sorted by their bytes unless all of them are decimal digit strings,
/// in which case insertion order is kept.
fn map_entries(entries: &[(Object, Object)]) -> Result<Vec<(&str, &Object)>, MarshalError> {
    let mut keyed = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        match key {
            Object::String(key) => keyed.push((key.as_str(), value)),
            other => return Err(MarshalError::UnsupportedKey(other.type_name().to_string())),
        }
    }
    check_keys(&keyed)?;
    if !keyed.iter().all(|(key, _)| is_index_like(key)) {
        keyed.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    }
    Ok(keyed)
}

fn check_keys(keyed: &[(&str, &Object)]) -> Result<(), MarshalError> {
    if let Some((key, _)) = keyed.iter().find(|(key, _)| key.contains('\0')) {
        return Err(MarshalError::KeyWithZeroByte(key.to_string()));
    }
    let mut seen = HashSet::with_capacity(keyed.len());
    for (key, _) in keyed {
        if !seen.insert(*key) {
            return Err(MarshalError::DuplicateKey(key.to_string()));
        }
    }
    Ok(())
}

fn is_index_like(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Readable fields of a record in declaration order.
fn record_fields(record: &Record) -> Result<Vec<(String, Object)>, MarshalError> {
    let mut readable = Vec::new();
    for (name, field) in record.fields() {
        match field {
            Ok(value) => readable.push((name, value)),
            Err(err) => tracing::trace!(field = %name, error = %err, "leaving out unreadable field"),
        }
    }
    if readable.is_empty() && !record.declares_fields() {
        return Err(MarshalError::UnsupportedObject(
            "object without readable properties".to_string(),
        ));
    }
    Ok(readable)
}
