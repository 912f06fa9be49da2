use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document layout error: {0}")]
    Wire(#[from] wire::Error),

    #[error("marshal error: {0}")]
    Marshal(#[from] bson::MarshalError),

    #[error("unmarshal error: {0}")]
    Unmarshal(#[from] bson::UnmarshalError),

    #[error("mapper configuration error: {0}")]
    Config(#[from] bson::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
