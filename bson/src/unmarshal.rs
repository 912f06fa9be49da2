use std::cell::Cell;
use std::collections::HashSet;

use wire::{BINARY_SUBTYPE_GENERIC, ElementType, RawDocument, RawValue};

use crate::error::UnmarshalError;
use crate::mapper::Mapper;
use crate::metadata;
use crate::value::{Array, Binary, DateTime, Document, Value};

/// Applies mapper policy to a parsed element tree.
pub(crate) struct Unmarshaler {
    mapper: Mapper,
    // array slots materialized by one call, gaps included, never exceed this
    slot_budget: Cell<usize>,
}

impl Unmarshaler {
    pub(crate) fn new(mapper: Mapper, input_len: usize) -> Self {
        Unmarshaler {
            mapper,
            slot_budget: Cell::new(input_len),
        }
    }

    pub(crate) fn unmarshal(&self, bytes: &[u8]) -> Result<Document, UnmarshalError> {
        let raw = RawDocument::parse(bytes)?;
        self.document(raw)
    }

    fn document(&self, raw: RawDocument) -> Result<Document, UnmarshalError> {
        let entries = self
            .slots(raw)?
            .into_iter()
            .filter_map(|(key, value)| value.map(|value| (key, value)))
            .collect();
        Ok(Document::from_unique(entries))
    }

    fn array(&self, raw: RawDocument) -> Result<Array, UnmarshalError> {
        let slots = self.slots(raw)?;
        let mut indexed = Vec::with_capacity(slots.len());
        for (key, value) in slots {
            match parse_index(&key) {
                Some(index) if index < self.slot_budget.get() => indexed.push((index, value)),
                _ => return Err(UnmarshalError::BadArrayIndex(key)),
            }
        }

        let len = indexed.iter().map(|(index, _)| index + 1).max().unwrap_or(0);
        if self.mapper.python_only() && len != indexed.len() {
            let mut present = vec![false; len];
            for (index, _) in &indexed {
                present[*index] = true;
            }
            let missing = present.iter().position(|p| !p).unwrap_or(len);
            return Err(UnmarshalError::BadArrayIndex(format!(
                "{missing} (missing from array)"
            )));
        }

        // every index is below the remaining budget, so len fits
        self.slot_budget.set(self.slot_budget.get() - len);

        let mut items = vec![Value::Null; len];
        for (index, value) in indexed {
            if let Some(value) = value {
                items[index] = value;
            }
        }
        Ok(Array::list(items))
    }

    /// Regular elements of one document in wire order. Skipped elements keep
    /// their slot with `None`. The sidecar is taken out and, when the mapper
    /// keeps types, applied.
    fn slots(&self, raw: RawDocument) -> Result<Vec<(String, Option<Value>)>, UnmarshalError> {
        let mut seen = HashSet::with_capacity(raw.len());
        let mut sidecar: Option<Vec<u8>> = None;
        let mut slots = Vec::with_capacity(raw.len());

        for element in raw.into_elements() {
            let (key, value) = element.into_parts();
            if let Some(payload) = metadata::sidecar_payload(&key, &value) {
                if sidecar.is_some() {
                    return Err(UnmarshalError::RepeatedKey(key));
                }
                sidecar = Some(payload.to_vec());
                continue;
            }
            if !seen.insert(key.clone()) {
                return Err(UnmarshalError::RepeatedKey(key));
            }
            let value = self.value(&key, value)?;
            slots.push((key, value));
        }

        if self.mapper.keep_types() {
            if let Some(payload) = sidecar {
                let markers = metadata::decode(&payload)?;
                metadata::apply(&mut slots, &markers)?;
            }
        }
        Ok(slots)
    }

    fn value(&self, key: &str, raw: RawValue) -> Result<Option<Value>, UnmarshalError> {
        let value = match raw {
            RawValue::Double(v) => Value::Double(v),
            RawValue::String(v) => Value::String(v),
            RawValue::Document(document) => Value::Document(self.document(document)?),
            RawValue::Array(document) => Value::Array(self.array(document)?),
            RawValue::Binary { subtype, data } => match subtype {
                BINARY_SUBTYPE_GENERIC => Value::Binary(Binary::new(data)),
                // standard and user-defined subtypes
                0x01..=0x09 | 0x80..=0xff if !self.mapper.python_only() => {
                    tracing::trace!(key, subtype, "skipping binary element");
                    return Ok(None);
                }
                other => return Err(UnmarshalError::InvalidBinarySubtype(other)),
            },
            RawValue::Null => Value::Null,
            RawValue::Boolean(b) => Value::Boolean(b),
            RawValue::DateTime(millis) => Value::DateTime(DateTime::from_millis(millis)),
            RawValue::Int32(v) => Value::Int32(v),
            RawValue::Int64(v) => Value::Int64(v),
            RawValue::Extension { element_type, .. } => {
                if self.mapper.python_only() {
                    return Err(UnmarshalError::InvalidElementType(u8::from(element_type)));
                }
                if element_type != ElementType::LegacyNull {
                    tracing::trace!(key, element_type = %element_type, "skipping extension element");
                    return Ok(None);
                }
                Value::Null
            }
        };
        Ok(Some(value))
    }
}

/// Canonical decimal index: digits only, no leading zero except "0".
fn parse_index(key: &str) -> Option<usize> {
    let canonical = !key.is_empty()
        && key.bytes().all(|b| b.is_ascii_digit())
        && (key == "0" || !key.starts_with('0'));
    if canonical { key.parse().ok() } else { None }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::parse_index;

    #[rstest(key, expected,
        case("0", Some(0)),
        case("7", Some(7)),
        case("10", Some(10)),
        case("", None),
        case(" ", None),
        case("00", None),
        case("02", None),
        case("-1", None),
        case("-0", None),
        case("+1", None),
        case("1.0", None),
        case("99999999999999999999999", None),
    )]
    fn test_parse_index(key: &str, expected: Option<usize>) {
        assert_eq!(expected, parse_index(key));
    }
}
