//! # bsonkit
//!
//! Core traits for moving data between the layers of the bsonkit codec.
//!
//! This crate defines the `Decoder` and `Encoder` traits that every layer of
//! the workspace implements, so conversions read the same way everywhere.
//!
//! ## Overview
//!
//! Bytes travel through two representations:
//! ```text
//! Vec<u8> → RawDocument → Document
//! ```
//!
//! `RawDocument` (from the `wire` crate) is the structurally validated
//! element tree, with every tag, key and payload bounds-checked. `Document`
//! (from the `bson` crate) is the caller-facing model, produced after the
//! mapper policy has been applied.
//!
//! ## Type Safety
//!
//! The marker traits `DecodableFrom` and `EncodableTo` pin down which
//! conversions exist, so a missing conversion is a compile error rather
//! than a runtime surprise.
//!
//! ## Example
//!
//! ```ignore
//! use bsonkit::decoder::Decoder;
//! use bsonkit::encoder::Encoder;
//! use wire::RawDocument;
//!
//! let bytes = vec![0x05, 0x00, 0x00, 0x00, 0x00];
//! let raw: RawDocument = bytes.decode().unwrap();
//! assert!(raw.is_empty());
//!
//! let encoded: Vec<u8> = raw.encode().unwrap();
//! assert_eq!(encoded, bytes);
//! ```

#![forbid(unsafe_code)]

pub mod decoder;
pub mod encoder;
