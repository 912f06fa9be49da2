use std::str::FromStr;

use serde::Deserialize;

use crate::error::{ConfigError, MarshalError, UnmarshalError};
use crate::marshal::Marshaler;
use crate::object::Object;
use crate::unmarshal::Unmarshaler;
use crate::value::Document;

const KEEP_TYPES: &str = "keep_types";
const PYTHON_ONLY: &str = "python_only";

/// Codec policy shared by `marshal` and `unmarshal`.
///
/// * `keep_types`: emit the `__metadata__` sidecar on encode and honour it on
///   decode, so tuples and bytearrays come back as such.
/// * `python_only`: strict decoding. Extension element types and non-generic
///   binary subtypes are errors instead of being skipped, and array indices
///   must be exactly `0..n`.
///
/// A mapper never changes after construction and can be shared freely.
///
/// ```
/// use bson::{Mapper, Object};
///
/// let mapper = Mapper::builder().keep_types(true).build();
/// let map: bson::Map = [("t", Object::Tuple(vec![Object::from(1)]))].into_iter().collect();
/// let bytes = mapper.marshal(&Object::Map(map)).unwrap();
/// let document = mapper.unmarshal(&bytes).unwrap();
/// assert_eq!(bson::SequenceKind::Tuple, document.get("t").unwrap().as_array().unwrap().kind());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Mapper {
    keep_types: bool,
    python_only: bool,
}

impl Mapper {
    pub fn new() -> Self {
        Mapper::default()
    }

    pub fn builder() -> MapperBuilder {
        MapperBuilder::default()
    }

    /// Builds a mapper from `(name, value)` pairs. Unknown names and names
    /// given twice are rejected.
    pub fn from_options<'a, I>(options: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut keep_types = None;
        let mut python_only = None;
        for (name, value) in options {
            let slot = match name {
                KEEP_TYPES => &mut keep_types,
                PYTHON_ONLY => &mut python_only,
                other => return Err(ConfigError::UnknownOption(other.to_string())),
            };
            if slot.replace(value).is_some() {
                return Err(ConfigError::DuplicateOption(name.to_string()));
            }
        }
        Ok(Mapper {
            keep_types: keep_types.unwrap_or_default(),
            python_only: python_only.unwrap_or_default(),
        })
    }

    pub fn keep_types(&self) -> bool {
        self.keep_types
    }

    pub fn python_only(&self) -> bool {
        self.python_only
    }

    /// Encodes a map or record into document bytes.
    pub fn marshal(&self, object: &Object) -> Result<Vec<u8>, MarshalError> {
        let bytes = Marshaler::new(self.keep_types).marshal(object)?;
        tracing::debug!(keep_types = self.keep_types, bytes = bytes.len(), "marshalled document");
        Ok(bytes)
    }

    /// Decodes document bytes, which must hold exactly one document.
    pub fn unmarshal(&self, bytes: &[u8]) -> Result<Document, UnmarshalError> {
        tracing::debug!(
            keep_types = self.keep_types,
            python_only = self.python_only,
            bytes = bytes.len(),
            "unmarshalling document"
        );
        Unmarshaler::new(*self, bytes.len()).unmarshal(bytes)
    }
}

/// Parses `keep_types=true,python_only=false`. A bare name means `true`.
impl FromStr for Mapper {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut options = Vec::new();
        for option in s.split(',').map(str::trim).filter(|o| !o.is_empty()) {
            let (name, value) = match option.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (option, "true"),
            };
            let value = match value {
                "true" => true,
                "false" => false,
                other => {
                    return Err(ConfigError::InvalidValue {
                        option: name.to_string(),
                        value: other.to_string(),
                    });
                }
            };
            options.push((name, value));
        }
        Mapper::from_options(options)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MapperBuilder {
    keep_types: bool,
    python_only: bool,
}

impl MapperBuilder {
    pub fn keep_types(mut self, keep_types: bool) -> Self {
        self.keep_types = keep_types;
        self
    }

    pub fn python_only(mut self, python_only: bool) -> Self {
        self.python_only = python_only;
        self
    }

    pub fn build(self) -> Mapper {
        Mapper {
            keep_types: self.keep_types,
            python_only: self.python_only,
        }
    }
}

impl From<Mapper> for MapperBuilder {
    fn from(mapper: Mapper) -> Self {
        MapperBuilder {
            keep_types: mapper.keep_types,
            python_only: mapper.python_only,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_default() {
        let mapper = Mapper::default();
        assert!(!mapper.keep_types());
        assert!(!mapper.python_only());
        assert_eq!(mapper, Mapper::new());
    }

    #[test]
    fn test_builder_round_trip() {
        let mapper = Mapper::builder().keep_types(true).build();
        assert!(mapper.keep_types());
        assert!(!mapper.python_only());
        let strict = MapperBuilder::from(mapper).python_only(true).build();
        assert!(strict.keep_types());
        assert!(strict.python_only());
    }

    #[rstest(options, expected,
        case(vec![], Ok(Mapper::default())),
        case(vec![("keep_types", true)], Ok(Mapper::builder().keep_types(true).build())),
        case(vec![("python_only", true), ("keep_types", false)], Ok(Mapper::builder().python_only(true).build())),
        case(vec![("strict", true)], Err(ConfigError::UnknownOption("strict".to_string()))),
        case(vec![("keep_types", true), ("keep_types", true)], Err(ConfigError::DuplicateOption("keep_types".to_string()))),
    )]
    fn test_from_options(options: Vec<(&'static str, bool)>, expected: Result<Mapper, ConfigError>) {
        assert_eq!(expected, Mapper::from_options(options));
    }

    #[rstest(input, expected,
        case("", Ok(Mapper::default())),
        case("keep_types", Ok(Mapper::builder().keep_types(true).build())),
        case("keep_types=false, python_only=true", Ok(Mapper::builder().python_only(true).build())),
        case("keep_types=yes", Err(ConfigError::InvalidValue { option: "keep_types".to_string(), value: "yes".to_string() })),
        case("keep_typos", Err(ConfigError::UnknownOption("keep_typos".to_string()))),
    )]
    fn test_from_str(input: &str, expected: Result<Mapper, ConfigError>) {
        assert_eq!(expected, input.parse::<Mapper>());
    }

    #[test]
    fn test_deserialize() {
        let mapper: Mapper = serde_json::from_str(r#"{"python_only": true}"#).unwrap();
        assert_eq!(Mapper::builder().python_only(true).build(), mapper);
        assert!(serde_json::from_str::<Mapper>(r#"{"strict": true}"#).is_err());
    }

    #[test]
    fn test_mapper_is_shareable() {
        fn assert_send_sync<T: Send + Sync + Copy>() {}
        assert_send_sync::<Mapper>();
    }
}
