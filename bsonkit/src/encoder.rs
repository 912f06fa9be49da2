//! Encoder trait, the mirror image of [`crate::decoder`].

/// Encoder trait for converting from type `T` to type `E`.
///
/// Implemented by the source type; `E` opts in with `EncodableTo<T>`.
pub trait Encoder<T, E: EncodableTo<T>> {
    /// The error type returned when encoding fails.
    type Error;

    /// Encodes `self` into type `E`.
    fn encode(&self) -> Result<E, Self::Error>;
}

/// Marker trait indicating that type `E` can be encoded from type `T`.
pub trait EncodableTo<T> {}
