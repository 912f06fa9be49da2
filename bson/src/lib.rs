//! # bson
//!
//! Document layer of bsonkit: maps a caller [`Object`] graph to document
//! bytes and document bytes back to a [`Document`].
//!
//! ```
//! use bson::{Document, Map, Object, Value};
//!
//! let map: Map = [("q", Object::from("abc"))].into_iter().collect();
//! let bytes = bson::marshal(&Object::Map(map)).unwrap();
//! assert_eq!(
//!     bytes,
//!     [0x10, 0x00, 0x00, 0x00, 0x02, b'q', 0x00, 0x04, 0x00, 0x00, 0x00, b'a', b'b', b'c', 0x00, 0x00]
//! );
//!
//! let document: Document = bson::unmarshal(&bytes).unwrap();
//! assert_eq!(Some(&Value::from("abc")), document.get("q"));
//! ```
//!
//! ## Encoding
//!
//! The top-level object must be a map or a record. Map keys are sorted by
//! their bytes, so equal content always gives equal bytes; maps whose keys
//! are all decimal digit strings keep their insertion order instead. Record
//! fields keep declaration order. Lists and tuples become arrays. Integers
//! take the int32 slot when they fit and int64 otherwise. A container that
//! contains itself, directly or through other containers, is a cycle error;
//! the same container reached twice without nesting is encoded twice.
//!
//! ## Decoding
//!
//! Every length, string and key is bounds-checked, and any malformed input
//! is an [`UnmarshalError`]. What happens to element types the model has no
//! variant for is up to the [`Mapper`]: by default they are skipped, in
//! strict (`python_only`) mode they are errors.
//!
//! ## Keeping types
//!
//! With `keep_types`, tuples and bytearrays survive a round trip through a
//! `__metadata__` sidecar element; see [`Mapper`].

#![forbid(unsafe_code)]

use bsonkit::decoder::{DecodableFrom, Decoder};
use bsonkit::encoder::{EncodableTo, Encoder};

pub mod error;
mod mapper;
mod marshal;
mod metadata;
mod object;
mod unmarshal;
mod value;

pub use error::{ConfigError, Error, FieldError, MarshalError, UnmarshalError};
pub use mapper::{Mapper, MapperBuilder};
pub use metadata::METADATA_KEY;
pub use object::{Fields, List, Map, Object, Record};
pub use value::{Array, Binary, BinaryKind, DateTime, Document, SequenceKind, Value};

/// Encodes `object` with the default [`Mapper`].
pub fn marshal(object: &Object) -> Result<Vec<u8>, MarshalError> {
    Mapper::default().marshal(object)
}

/// Decodes `bytes` with the default [`Mapper`].
pub fn unmarshal(bytes: &[u8]) -> Result<Document, UnmarshalError> {
    Mapper::default().unmarshal(bytes)
}

impl DecodableFrom<Vec<u8>> for Document {}

impl Decoder<Vec<u8>, Document> for Vec<u8> {
    type Error = UnmarshalError;

    fn decode(&self) -> Result<Document, Self::Error> {
        unmarshal(self)
    }
}

impl DecodableFrom<wire::RawDocument> for Document {}

impl Decoder<wire::RawDocument, Document> for wire::RawDocument {
    type Error = UnmarshalError;

    fn decode(&self) -> Result<Document, Self::Error> {
        let bytes: Vec<u8> = self.encode()?;
        unmarshal(&bytes)
    }
}

impl EncodableTo<Document> for Vec<u8> {}

impl Encoder<Document, Vec<u8>> for Document {
    type Error = MarshalError;

    fn encode(&self) -> Result<Vec<u8>, Self::Error> {
        marshal(&Object::from(self.clone()))
    }
}
