//! Error types for the byte layer.

use thiserror::Error;

/// Errors raised while parsing or writing document bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    // Envelope errors
    #[error("broken data: {0}")]
    BrokenData(&'static str),
    #[error("incorrect document size {0}")]
    IncorrectSize(i32),
    #[error("{0} bytes left over after the document")]
    TooManyData(usize),
    #[error("not enough data: document declares {declared} bytes but {available} are available")]
    NotEnoughData { declared: usize, available: usize },
    #[error("nesting deeper than {0} documents")]
    NestingTooDeep(usize),

    // Element errors
    #[error("invalid element type 0x{0:02x}")]
    InvalidElementType(u8),
    #[error("key is not valid UTF-8")]
    BadKeyData,

    // String errors
    #[error("string is not NUL terminated")]
    InvalidString,
    #[error("invalid string size {0}")]
    StringSize(i32),
    #[error("string size {0} runs past the enclosing document")]
    InconsistentStringSize(i32),
    #[error("string is not valid UTF-8")]
    BadStringData,

    // Writer errors
    #[error("key {0:?} contains a NUL byte")]
    KeyWithZeroByte(String),
    #[error("string of {0} bytes does not fit a length field")]
    StringTooBig(usize),
    #[error("binary of {0} bytes does not fit a length field")]
    BinaryTooBig(usize),
    #[error("document of {0} bytes does not fit a length field")]
    DocumentTooBig(usize),
    #[error("no document is open")]
    NoOpenDocument,

    // Parser errors
    #[error("parser error {0:?}")]
    Parser(nom::error::ErrorKind),
}

impl<I> nom::error::ParseError<I> for Error {
    fn from_error_kind(_input: I, kind: nom::error::ErrorKind) -> Self {
        Error::Parser(kind)
    }

    fn append(_input: I, _kind: nom::error::ErrorKind, other: Self) -> Self {
        other
    }
}

impl From<nom::Err<Error>> for Error {
    fn from(err: nom::Err<Error>) -> Self {
        match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => e,
            nom::Err::Incomplete(_) => Error::BrokenData("input ended inside an element"),
        }
    }
}
