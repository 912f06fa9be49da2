use std::fmt;

/// Element type tag, the first byte of every element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Double,
    String,
    Document,
    Array,
    Binary,
    Null,
    ObjectId,
    Boolean,
    DateTime,
    LegacyNull,
    Regex,
    DbPointer,
    Code,
    Symbol,
    CodeWithScope,
    Int32,
    Timestamp,
    Int64,
    Decimal128,
    MaxKey,
    MinKey,
    Invalid(u8),
}

impl From<u8> for ElementType {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Double,
            0x02 => Self::String,
            0x03 => Self::Document,
            0x04 => Self::Array,
            0x05 => Self::Binary,
            0x06 => Self::Null,
            0x07 => Self::ObjectId,
            0x08 => Self::Boolean,
            0x09 => Self::DateTime,
            0x0a => Self::LegacyNull,
            0x0b => Self::Regex,
            0x0c => Self::DbPointer,
            0x0d => Self::Code,
            0x0e => Self::Symbol,
            0x0f => Self::CodeWithScope,
            0x10 => Self::Int32,
            0x11 => Self::Timestamp,
            0x12 => Self::Int64,
            0x13 => Self::Decimal128,
            0x7f => Self::MaxKey,
            0xff => Self::MinKey,
            _ => Self::Invalid(value),
        }
    }
}

impl From<ElementType> for u8 {
    fn from(value: ElementType) -> Self {
        match value {
            ElementType::Double => 0x01,
            ElementType::String => 0x02,
            ElementType::Document => 0x03,
            ElementType::Array => 0x04,
            ElementType::Binary => 0x05,
            ElementType::Null => 0x06,
            ElementType::ObjectId => 0x07,
            ElementType::Boolean => 0x08,
            ElementType::DateTime => 0x09,
            ElementType::LegacyNull => 0x0a,
            ElementType::Regex => 0x0b,
            ElementType::DbPointer => 0x0c,
            ElementType::Code => 0x0d,
            ElementType::Symbol => 0x0e,
            ElementType::CodeWithScope => 0x0f,
            ElementType::Int32 => 0x10,
            ElementType::Timestamp => 0x11,
            ElementType::Int64 => 0x12,
            ElementType::Decimal128 => 0x13,
            ElementType::MaxKey => 0x7f,
            ElementType::MinKey => 0xff,
            ElementType::Invalid(value) => value,
        }
    }
}

impl ElementType {
    /// Tags that are recognised and validated but never produced by the
    /// encoder.
    pub fn is_extension(&self) -> bool {
        matches!(
            self,
            Self::ObjectId
                | Self::LegacyNull
                | Self::Regex
                | Self::DbPointer
                | Self::Code
                | Self::Symbol
                | Self::CodeWithScope
                | Self::Timestamp
                | Self::Decimal128
                | Self::MaxKey
                | Self::MinKey
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Double => "double",
            Self::String => "string",
            Self::Document => "document",
            Self::Array => "array",
            Self::Binary => "binary",
            Self::Null => "null",
            Self::ObjectId => "objectid",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::LegacyNull => "undefined",
            Self::Regex => "regex",
            Self::DbPointer => "dbpointer",
            Self::Code => "code",
            Self::Symbol => "symbol",
            Self::CodeWithScope => "code_w_scope",
            Self::Int32 => "int32",
            Self::Timestamp => "timestamp",
            Self::Int64 => "int64",
            Self::Decimal128 => "decimal128",
            Self::MaxKey => "maxkey",
            Self::MinKey => "minkey",
            Self::Invalid(_) => "invalid",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02x})", self.name(), u8::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::ElementType;

    #[rstest(input, expected,
        case(0x01, ElementType::Double),
        case(0x06, ElementType::Null),
        case(0x0a, ElementType::LegacyNull),
        case(0x10, ElementType::Int32),
        case(0x12, ElementType::Int64),
        case(0x7f, ElementType::MaxKey),
        case(0xff, ElementType::MinKey),
        case(0x00, ElementType::Invalid(0x00)),
        case(0x14, ElementType::Invalid(0x14)),
        case(0x80, ElementType::Invalid(0x80)),
        case(0xfe, ElementType::Invalid(0xfe)),
    )]
    fn test_element_type_from_u8(input: u8, expected: ElementType) {
        let actual = ElementType::from(input);
        assert_eq!(expected, actual);
        assert_eq!(input, u8::from(actual));
    }

    #[test]
    fn test_extension_tags() {
        let extensions: Vec<u8> = (0..=u8::MAX)
            .filter(|tag| ElementType::from(*tag).is_extension())
            .collect();
        assert_eq!(
            extensions,
            vec![0x07, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x11, 0x13, 0x7f, 0xff]
        );
    }
}
