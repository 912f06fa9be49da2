//! The `__metadata__` sidecar.
//!
//! When a mapper keeps types, every document whose elements include a tuple
//! or a bytearray gets one extra binary element (subtype 0x80) after its
//! regular elements. The payload is a colon-separated list of markers, one
//! slot per regular element in emission order, empty for elements that need
//! no correction: `tuple::bytearray` describes three elements.

use std::str::FromStr;

use wire::{BINARY_SUBTYPE_USER_DEFINED, RawValue};

use crate::error::UnmarshalError;
use crate::value::{BinaryKind, SequenceKind, Value};

pub const METADATA_KEY: &str = "__metadata__";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum Marker {
    #[default]
    Plain,
    Tuple,
    ByteArray,
    Dict,
}

impl Marker {
    fn as_str(&self) -> &'static str {
        match self {
            Marker::Plain => "",
            Marker::Tuple => "tuple",
            Marker::ByteArray => "bytearray",
            Marker::Dict => "dict",
        }
    }
}

impl FromStr for Marker {
    type Err = UnmarshalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Marker::Plain),
            "tuple" => Ok(Marker::Tuple),
            "bytearray" => Ok(Marker::ByteArray),
            "dict" => Ok(Marker::Dict),
            other => Err(UnmarshalError::BadMetadata(format!(
                "unknown type marker {other:?}"
            ))),
        }
    }
}

/// Sidecar payload for `markers`, or `None` when no element needs one.
pub(crate) fn encode(markers: &[Marker]) -> Option<Vec<u8>> {
    if markers.iter().all(|m| *m == Marker::Plain) {
        return None;
    }
    let payload = markers
        .iter()
        .map(Marker::as_str)
        .collect::<Vec<_>>()
        .join(":");
    Some(payload.into_bytes())
}

pub(crate) fn decode(payload: &[u8]) -> Result<Vec<Marker>, UnmarshalError> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| UnmarshalError::BadMetadata("payload is not UTF-8".to_string()))?;
    text.split(':').map(str::parse::<Marker>).collect()
}

/// Payload of `value` when the element is a sidecar.
pub(crate) fn sidecar_payload<'a>(key: &str, value: &'a RawValue) -> Option<&'a [u8]> {
    match value {
        RawValue::Binary { subtype, data }
            if key == METADATA_KEY && *subtype == BINARY_SUBTYPE_USER_DEFINED =>
        {
            Some(data)
        }
        _ => None,
    }
}

/// Applies `markers` to the regular elements of one document. Elements that
/// were skipped during decoding occupy a slot but hold `None`.
pub(crate) fn apply(
    slots: &mut [(String, Option<Value>)],
    markers: &[Marker],
) -> Result<(), UnmarshalError> {
    if slots.len() != markers.len() {
        return Err(UnmarshalError::BadMetadata(format!(
            "{} markers for {} elements",
            markers.len(),
            slots.len()
        )));
    }
    for ((key, slot), marker) in slots.iter_mut().zip(markers) {
        match (marker, slot) {
            (Marker::Plain, _) => {}
            (Marker::Tuple, Some(Value::Array(array))) => array.set_kind(SequenceKind::Tuple),
            (Marker::ByteArray, Some(Value::Binary(binary))) => {
                binary.set_kind(BinaryKind::ByteArray)
            }
            (Marker::Dict, Some(Value::Document(_))) => {}
            (marker, slot) => {
                let found = slot.as_ref().map_or("skipped element", Value::type_name);
                return Err(UnmarshalError::BadMetadata(format!(
                    "{} marker on {found} {key:?}",
                    marker.as_str()
                )));
            }
        }
    }
    Ok(())
}
