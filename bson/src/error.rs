//! Error types for marshalling, unmarshalling and mapper configuration.

use thiserror::Error;

/// Errors raised by `marshal`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    #[error("unsupported object: {0}")]
    UnsupportedObject(String),

    // Key errors
    #[error("unsupported key of type {0}")]
    UnsupportedKey(String),
    #[error("key {0:?} contains a NUL byte")]
    KeyWithZeroByte(String),
    #[error("key {0:?} appears more than once")]
    DuplicateKey(String),

    // Size errors
    #[error("binary of {0} bytes is too big")]
    BinaryTooBig(usize),
    #[error("integer {0} does not fit in 64 bits")]
    IntegerTooBig(i128),
    #[error("string of {0} bytes is too big")]
    StringTooBig(usize),
    #[error("document of {0} bytes is too big")]
    DocumentTooBig(usize),

    // Graph errors
    #[error("cycle detected")]
    CycleDetected,
    #[error("nesting deeper than {0} containers")]
    NestingTooDeep(usize),

    #[error("failed to write document: {0}")]
    Wire(#[source] wire::Error),
}

impl MarshalError {
    /// Whether the error is one of the key rejections.
    pub fn is_unsupported_key(&self) -> bool {
        matches!(
            self,
            MarshalError::UnsupportedKey(_)
                | MarshalError::KeyWithZeroByte(_)
                | MarshalError::DuplicateKey(_)
        )
    }

    /// Whether the error is a value too large for its length or number slot.
    pub fn is_input_too_big(&self) -> bool {
        matches!(
            self,
            MarshalError::BinaryTooBig(_)
                | MarshalError::IntegerTooBig(_)
                | MarshalError::StringTooBig(_)
                | MarshalError::DocumentTooBig(_)
        )
    }
}

impl From<wire::Error> for MarshalError {
    fn from(err: wire::Error) -> Self {
        match err {
            wire::Error::KeyWithZeroByte(key) => MarshalError::KeyWithZeroByte(key),
            wire::Error::StringTooBig(len) => MarshalError::StringTooBig(len),
            wire::Error::BinaryTooBig(len) => MarshalError::BinaryTooBig(len),
            wire::Error::DocumentTooBig(len) => MarshalError::DocumentTooBig(len),
            wire::Error::NestingTooDeep(depth) => MarshalError::NestingTooDeep(depth),
            other => MarshalError::Wire(other),
        }
    }
}

/// Errors raised by `unmarshal`. Every kind means the input is broken data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnmarshalError {
    #[error("broken data: {0}")]
    BrokenData(String),

    // Size errors
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
    #[error("key {0:?} repeated")]
    RepeatedKey(String),
    #[error("invalid binary subtype 0x{0:02x}")]
    InvalidBinarySubtype(u8),
    #[error("bad array index {0:?}")]
    BadArrayIndex(String),
    #[error("bad type metadata: {0}")]
    BadMetadata(String),

    // String errors
    #[error("string is not NUL terminated")]
    InvalidString,
    #[error("invalid string size {0}")]
    StringSize(i32),
    #[error("string size {0} runs past the enclosing document")]
    InconsistentStringSize(i32),
    #[error("string is not valid UTF-8")]
    BadStringData,
}

impl From<wire::Error> for UnmarshalError {
    fn from(err: wire::Error) -> Self {
        match err {
            wire::Error::BrokenData(msg) => UnmarshalError::BrokenData(msg.to_string()),
            wire::Error::IncorrectSize(size) => UnmarshalError::IncorrectSize(size),
            wire::Error::TooManyData(extra) => UnmarshalError::TooManyData(extra),
            wire::Error::NotEnoughData {
                declared,
                available,
            } => UnmarshalError::NotEnoughData {
                declared,
                available,
            },
            wire::Error::NestingTooDeep(depth) => UnmarshalError::NestingTooDeep(depth),
            wire::Error::InvalidElementType(tag) => UnmarshalError::InvalidElementType(tag),
            wire::Error::BadKeyData => UnmarshalError::BadKeyData,
            wire::Error::InvalidString => UnmarshalError::InvalidString,
            wire::Error::StringSize(size) => UnmarshalError::StringSize(size),
            wire::Error::InconsistentStringSize(size) => {
                UnmarshalError::InconsistentStringSize(size)
            }
            wire::Error::BadStringData => UnmarshalError::BadStringData,
            other => UnmarshalError::BrokenData(other.to_string()),
        }
    }
}

/// Errors raised while building a `Mapper` from named options.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown mapper option {0:?}")]
    UnknownOption(String),
    #[error("mapper option {0:?} given more than once")]
    DuplicateOption(String),
    #[error("invalid value {value:?} for mapper option {option:?}")]
    InvalidValue { option: String, value: String },
}

/// Raised by a record field accessor. The field is left out of the document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field {0} is not readable")]
pub struct FieldError(pub String);

/// Any error this crate returns.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Marshal(#[from] MarshalError),
    #[error(transparent)]
    Unmarshal(#[from] UnmarshalError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
