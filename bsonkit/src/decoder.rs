//! Decoder trait for type-safe conversions.
//!
//! The `Decoder` trait converts a source type `T` into a destination type
//! `D`. The destination names its valid sources through the
//! `DecodableFrom<T>` marker, which keeps the set of conversions closed.
//!
//! ```no_run
//! use bsonkit::decoder::{DecodableFrom, Decoder};
//!
//! struct Frame(Vec<u8>);
//! struct Length(i32);
//!
//! #[derive(Debug)]
//! struct ShortFrame;
//!
//! impl DecodableFrom<Frame> for Length {}
//!
//! impl Decoder<Frame, Length> for Frame {
//!     type Error = ShortFrame;
//!
//!     fn decode(&self) -> Result<Length, Self::Error> {
//!         let prefix: [u8; 4] = self.0.get(..4).ok_or(ShortFrame)?.try_into().map_err(|_| ShortFrame)?;
//!         Ok(Length(i32::from_le_bytes(prefix)))
//!     }
//! }
//! ```

/// Decoder trait for converting from type `T` to type `D`.
///
/// Implemented by the source type. `D` must opt in with
/// `DecodableFrom<T>`.
///
/// # Type Parameters
///
/// * `T` - The source type (usually `Self`)
/// * `D` - The destination type that can be decoded from `T`
pub trait Decoder<T, D: DecodableFrom<T>> {
    /// The error type returned when decoding fails.
    type Error;

    /// Decodes `self` into type `D`.
    ///
    /// # Errors
    ///
    /// Returns an error if `self` is not a valid encoding of `D`.
    fn decode(&self) -> Result<D, Self::Error>;
}

/// Marker trait indicating that type `D` can be decoded from type `T`.
///
/// Has no methods. Implement it on the destination type for every source
/// it accepts:
///
/// ```no_run
/// use bsonkit::decoder::DecodableFrom;
///
/// struct Bytes;
/// struct Tree;
///
/// impl DecodableFrom<Bytes> for Tree {}
/// ```
pub trait DecodableFrom<T> {}
