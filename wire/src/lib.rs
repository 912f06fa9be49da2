//! # wire
//!
//! Byte layer of the document format: element tags, bounds-checked parsing of
//! a byte buffer into a [`RawDocument`] tree, and the [`Writer`] that emits
//! documents.
//!
//! Everything is little-endian. A document is
//! `i32 total_length | element* | 0x00` and an element is
//! `u8 tag | cstring key | payload`. The parser never reads past the span a
//! length prefix declares; it only checks structure and leaves policy
//! decisions (extension tags, binary subtypes, array indices, repeated keys)
//! to the `bson` crate.

use bsonkit::decoder::{DecodableFrom, Decoder};
use bsonkit::encoder::{EncodableTo, Encoder};
use nom::bytes::complete::{take, take_till};
use nom::number::complete::{le_f64, le_i32, le_i64, le_u8};
use nom::{IResult, Parser};

pub mod error;
mod element;
mod writer;

pub use element::ElementType;
pub use error::Error;
pub use writer::Writer;

/// Deepest nesting of embedded documents below the top-level one.
pub const MAX_DEPTH: usize = 256;

/// Length prefix plus terminator.
pub const MIN_DOCUMENT_SIZE: usize = 5;

pub const BINARY_SUBTYPE_GENERIC: u8 = 0x00;
pub const BINARY_SUBTYPE_USER_DEFINED: u8 = 0x80;

type ParseResult<'a, T> = IResult<&'a [u8], T, Error>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDocument {
    elements: Vec<RawElement>,
}

impl RawDocument {
    pub fn new(elements: Vec<RawElement>) -> Self {
        RawDocument { elements }
    }

    pub fn elements(&self) -> &[RawElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<RawElement> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Size of the document on the wire, length prefix and terminator included.
    pub fn encoded_len(&self) -> usize {
        MIN_DOCUMENT_SIZE + self.elements.iter().map(RawElement::encoded_len).sum::<usize>()
    }

    /// Parses exactly one document spanning the whole of `input`.
    pub fn parse(input: &[u8]) -> Result<RawDocument, Error> {
        let (rest, document) = parse_document(input, 0)?;
        if !rest.is_empty() {
            return Err(Error::TooManyData(rest.len()));
        }
        tracing::trace!(bytes = input.len(), elements = document.len(), "parsed document");
        Ok(document)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawElement {
    key: String,
    value: RawValue,
}

impl RawElement {
    pub fn new(key: impl Into<String>, value: RawValue) -> Self {
        RawElement {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &RawValue {
        &self.value
    }

    pub fn element_type(&self) -> ElementType {
        self.value.element_type()
    }

    pub fn into_parts(self) -> (String, RawValue) {
        (self.key, self.value)
    }

    /// Tag, key and payload size.
    pub fn encoded_len(&self) -> usize {
        1 + self.key.len() + 1 + self.value.encoded_len()
    }
}

/// Payload of one element after structural validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Double(f64),
    String(String),
    Document(RawDocument),
    Array(RawDocument),
    Binary { subtype: u8, data: Vec<u8> },
    Null,
    Boolean(bool),
    DateTime(i64),
    Int32(i32),
    Int64(i64),
    /// A recognised tag the document model has no variant for. The payload
    /// bytes are kept verbatim so the element can be written back.
    Extension {
        element_type: ElementType,
        payload: Vec<u8>,
    },
}

impl RawValue {
    pub fn element_type(&self) -> ElementType {
        match self {
            RawValue::Double(_) => ElementType::Double,
            RawValue::String(_) => ElementType::String,
            RawValue::Document(_) => ElementType::Document,
            RawValue::Array(_) => ElementType::Array,
            RawValue::Binary { .. } => ElementType::Binary,
            RawValue::Null => ElementType::Null,
            RawValue::Boolean(_) => ElementType::Boolean,
            RawValue::DateTime(_) => ElementType::DateTime,
            RawValue::Int32(_) => ElementType::Int32,
            RawValue::Int64(_) => ElementType::Int64,
            RawValue::Extension { element_type, .. } => *element_type,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            RawValue::Null => 0,
            RawValue::Boolean(_) => 1,
            RawValue::Int32(_) => 4,
            RawValue::Double(_) | RawValue::DateTime(_) | RawValue::Int64(_) => 8,
            RawValue::String(s) => 4 + s.len() + 1,
            RawValue::Document(document) | RawValue::Array(document) => document.encoded_len(),
            RawValue::Binary { data, .. } => 4 + 1 + data.len(),
            RawValue::Extension { payload, .. } => payload.len(),
        }
    }
}

impl DecodableFrom<Vec<u8>> for RawDocument {}

impl Decoder<Vec<u8>, RawDocument> for Vec<u8> {
    type Error = Error;

    fn decode(&self) -> Result<RawDocument, Self::Error> {
        RawDocument::parse(self)
    }
}

impl DecodableFrom<&[u8]> for RawDocument {}

impl Decoder<&[u8], RawDocument> for &[u8] {
    type Error = Error;

    fn decode(&self) -> Result<RawDocument, Self::Error> {
        RawDocument::parse(self)
    }
}

impl EncodableTo<RawDocument> for Vec<u8> {}

impl Encoder<RawDocument, Vec<u8>> for RawDocument {
    type Error = Error;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        let mut writer = Writer::new();
        writer.write_document(self)?;
        Ok(writer.into_bytes())
    }
}

fn failure<'a, T>(error: Error) -> ParseResult<'a, T> {
    Err(nom::Err::Failure(error))
}

fn read_u8(input: &[u8]) -> ParseResult<'_, u8> {
    le_u8(input)
}

fn read_i32(input: &[u8]) -> ParseResult<'_, i32> {
    le_i32(input)
}

fn read_i64(input: &[u8]) -> ParseResult<'_, i64> {
    le_i64(input)
}

fn read_f64(input: &[u8]) -> ParseResult<'_, f64> {
    le_f64(input)
}

fn read_bytes(input: &[u8], count: usize) -> ParseResult<'_, &[u8]> {
    take(count).parse(input)
}

/// Parses one document from the front of `input`. `input` is everything the
/// enclosing scope still has room for; the declared length must fit in it.
fn parse_document(input: &[u8], depth: usize) -> ParseResult<'_, RawDocument> {
    if depth > MAX_DEPTH {
        return failure(Error::NestingTooDeep(MAX_DEPTH));
    }
    if input.len() < 4 {
        return failure(Error::BrokenData("document length prefix is truncated"));
    }
    let (_, declared) = read_i32(input)?;
    if declared < MIN_DOCUMENT_SIZE as i32 {
        return failure(Error::IncorrectSize(declared));
    }
    let declared = declared as usize;
    if declared > input.len() {
        return failure(Error::NotEnoughData {
            declared,
            available: input.len(),
        });
    }
    let (rest, span) = read_bytes(input, declared)?;
    let Some((&0, mut body)) = span[4..].split_last() else {
        return failure(Error::BrokenData("document is not NUL terminated"));
    };

    let mut elements = Vec::new();
    while !body.is_empty() {
        let (next, element) = parse_element(body, depth)?;
        body = next;
        elements.push(element);
    }
    Ok((rest, RawDocument { elements }))
}

fn parse_element(input: &[u8], depth: usize) -> ParseResult<'_, RawElement> {
    let (input, tag) = read_u8(input)?;
    let element_type = ElementType::from(tag);
    if let ElementType::Invalid(tag) = element_type {
        return failure(Error::InvalidElementType(tag));
    }
    let (input, key) = parse_cstring(input)?;
    let Ok(key) = std::str::from_utf8(key) else {
        return failure(Error::BadKeyData);
    };
    let (input, value) = parse_value(element_type, input, depth)?;
    Ok((input, RawElement::new(key, value)))
}

fn parse_value(element_type: ElementType, input: &[u8], depth: usize) -> ParseResult<'_, RawValue> {
    match element_type {
        ElementType::Double => {
            let (input, v) = read_f64(input)?;
            Ok((input, RawValue::Double(v)))
        }
        ElementType::String => {
            let (input, v) = parse_string(input)?;
            Ok((input, RawValue::String(v)))
        }
        ElementType::Document => {
            let (input, document) = parse_document(input, depth + 1)?;
            Ok((input, RawValue::Document(document)))
        }
        ElementType::Array => {
            let (input, document) = parse_document(input, depth + 1)?;
            Ok((input, RawValue::Array(document)))
        }
        ElementType::Binary => parse_binary(input),
        ElementType::Null => Ok((input, RawValue::Null)),
        ElementType::Boolean => {
            let (input, b) = read_u8(input)?;
            Ok((input, RawValue::Boolean(b != 0)))
        }
        ElementType::DateTime => {
            let (input, millis) = read_i64(input)?;
            Ok((input, RawValue::DateTime(millis)))
        }
        ElementType::Int32 => {
            let (input, v) = read_i32(input)?;
            Ok((input, RawValue::Int32(v)))
        }
        ElementType::Int64 => {
            let (input, v) = read_i64(input)?;
            Ok((input, RawValue::Int64(v)))
        }
        _ => {
            let (rest, ()) = skip_extension(element_type, input, depth)?;
            let payload = input[..input.len() - rest.len()].to_vec();
            Ok((
                rest,
                RawValue::Extension {
                    element_type,
                    payload,
                },
            ))
        }
    }
}

/// Walks over an extension payload, validating it as strictly as the core
/// types.
fn skip_extension(element_type: ElementType, input: &[u8], depth: usize) -> ParseResult<'_, ()> {
    let rest = match element_type {
        ElementType::ObjectId => read_bytes(input, 12)?.0,
        ElementType::LegacyNull | ElementType::MaxKey | ElementType::MinKey => input,
        ElementType::Regex => {
            let (input, pattern) = parse_cstring(input)?;
            let (input, options) = parse_cstring(input)?;
            if std::str::from_utf8(pattern).is_err() || std::str::from_utf8(options).is_err() {
                return failure(Error::BadStringData);
            }
            input
        }
        ElementType::DbPointer => {
            let (input, _) = parse_string(input)?;
            read_bytes(input, 12)?.0
        }
        ElementType::Code | ElementType::Symbol => parse_string(input)?.0,
        // code, then the scope document; no outer length prefix
        ElementType::CodeWithScope => {
            let (input, _) = parse_string(input)?;
            parse_document(input, depth + 1)?.0
        }
        ElementType::Timestamp => read_bytes(input, 8)?.0,
        ElementType::Decimal128 => read_bytes(input, 16)?.0,
        other => return failure(Error::InvalidElementType(u8::from(other))),
    };
    Ok((rest, ()))
}

fn parse_cstring(input: &[u8]) -> ParseResult<'_, &[u8]> {
    let (rest, raw) = take_till(|b: u8| b == 0).parse(input)?;
    match rest.split_first() {
        Some((0, rest)) => Ok((rest, raw)),
        _ => failure(Error::BrokenData("cstring is not NUL terminated")),
    }
}

fn parse_string(input: &[u8]) -> ParseResult<'_, String> {
    if input.len() < 4 {
        return failure(Error::BrokenData("string length is truncated"));
    }
    let (input, size) = read_i32(input)?;
    if size < 1 {
        return failure(Error::StringSize(size));
    }
    if size as usize > input.len() {
        return failure(Error::InconsistentStringSize(size));
    }
    let (input, raw) = read_bytes(input, size as usize)?;
    let Some((&0, text)) = raw.split_last() else {
        return failure(Error::InvalidString);
    };
    match String::from_utf8(text.to_vec()) {
        Ok(text) => Ok((input, text)),
        Err(_) => failure(Error::BadStringData),
    }
}

fn parse_binary(input: &[u8]) -> ParseResult<'_, RawValue> {
    let (input, len) = read_i32(input)?;
    if len < 0 {
        return failure(Error::BrokenData("negative binary length"));
    }
    let (input, subtype) = read_u8(input)?;
    if len as usize > input.len() {
        return failure(Error::BrokenData("binary runs past the enclosing document"));
    }
    let (input, data) = read_bytes(input, len as usize)?;
    Ok((
        input,
        RawValue::Binary {
            subtype,
            data: data.to_vec(),
        },
    ))
}
