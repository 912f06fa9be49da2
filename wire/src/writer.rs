use crate::error::Error;
use crate::{ElementType, MAX_DEPTH, RawDocument, RawValue};

/// Streaming document writer.
///
/// Documents are opened with [`Writer::begin_document`] (or
/// [`Writer::begin_embedded`] inside another document) and closed with
/// [`Writer::end_document`], which backfills the length prefix once the
/// element bytes are known.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
    // start offsets of the documents still open, innermost last
    open: Vec<usize>,
}

impl Writer {
    pub fn new() -> Self {
        Writer::default()
    }

    /// Number of documents currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn begin_document(&mut self) -> Result<(), Error> {
        if self.open.len() > MAX_DEPTH {
            return Err(Error::NestingTooDeep(MAX_DEPTH));
        }
        self.open.push(self.buf.len());
        self.buf.extend_from_slice(&[0; 4]);
        Ok(())
    }

    pub fn end_document(&mut self) -> Result<(), Error> {
        let start = self.open.pop().ok_or(Error::NoOpenDocument)?;
        self.buf.push(0x00);
        let len = self.buf.len() - start;
        let prefix = i32::try_from(len).map_err(|_| Error::DocumentTooBig(len))?;
        self.buf[start..start + 4].copy_from_slice(&prefix.to_le_bytes());
        Ok(())
    }

    /// Writes the header of a document or array element and opens its body.
    pub fn begin_embedded(&mut self, key: &str, element_type: ElementType) -> Result<(), Error> {
        self.write_header(element_type, key)?;
        self.begin_document()
    }

    pub fn write_double(&mut self, key: &str, value: f64) -> Result<(), Error> {
        self.write_header(ElementType::Double, key)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn write_string(&mut self, key: &str, value: &str) -> Result<(), Error> {
        self.write_header(ElementType::String, key)?;
        self.write_string_payload(value)
    }

    pub fn write_binary(&mut self, key: &str, subtype: u8, data: &[u8]) -> Result<(), Error> {
        let len = i32::try_from(data.len()).map_err(|_| Error::BinaryTooBig(data.len()))?;
        self.write_header(ElementType::Binary, key)?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.push(subtype);
        self.buf.extend_from_slice(data);
        Ok(())
    }

    pub fn write_null(&mut self, key: &str) -> Result<(), Error> {
        self.write_header(ElementType::Null, key)
    }

    pub fn write_boolean(&mut self, key: &str, value: bool) -> Result<(), Error> {
        self.write_header(ElementType::Boolean, key)?;
        self.buf.push(u8::from(value));
        Ok(())
    }

    pub fn write_datetime(&mut self, key: &str, millis: i64) -> Result<(), Error> {
        self.write_header(ElementType::DateTime, key)?;
        self.buf.extend_from_slice(&millis.to_le_bytes());
        Ok(())
    }

    pub fn write_int32(&mut self, key: &str, value: i32) -> Result<(), Error> {
        self.write_header(ElementType::Int32, key)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn write_int64(&mut self, key: &str, value: i64) -> Result<(), Error> {
        self.write_header(ElementType::Int64, key)?;
        self.buf.extend_from_slice(&value.to_le_bytes());
        Ok(())
    }

    /// Writes a complete parsed document, extension payloads included.
    pub fn write_document(&mut self, document: &RawDocument) -> Result<(), Error> {
        self.begin_document()?;
        for element in document.elements() {
            let key = element.key();
            match element.value() {
                RawValue::Double(v) => self.write_double(key, *v)?,
                RawValue::String(v) => self.write_string(key, v)?,
                RawValue::Document(inner) | RawValue::Array(inner) => {
                    self.write_header(element.element_type(), key)?;
                    self.write_document(inner)?;
                }
                RawValue::Binary { subtype, data } => self.write_binary(key, *subtype, data)?,
                RawValue::Null => self.write_null(key)?,
                RawValue::Boolean(v) => self.write_boolean(key, *v)?,
                RawValue::DateTime(v) => self.write_datetime(key, *v)?,
                RawValue::Int32(v) => self.write_int32(key, *v)?,
                RawValue::Int64(v) => self.write_int64(key, *v)?,
                RawValue::Extension {
                    element_type,
                    payload,
                } => {
                    self.write_header(*element_type, key)?;
                    self.buf.extend_from_slice(payload);
                }
            }
        }
        self.end_document()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    fn write_header(&mut self, element_type: ElementType, key: &str) -> Result<(), Error> {
        if key.as_bytes().contains(&0) {
            return Err(Error::KeyWithZeroByte(key.to_string()));
        }
        self.buf.push(u8::from(element_type));
        self.buf.extend_from_slice(key.as_bytes());
        self.buf.push(0x00);
        Ok(())
    }

    fn write_string_payload(&mut self, value: &str) -> Result<(), Error> {
        let len = value
            .len()
            .checked_add(1)
            .and_then(|len| i32::try_from(len).ok())
            .ok_or(Error::StringTooBig(value.len()))?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(value.as_bytes());
        self.buf.push(0x00);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Writer;
    use crate::error::Error;
    use crate::{ElementType, RawDocument, RawElement, RawValue};

    #[test]
    fn test_empty_document() {
        let mut writer = Writer::new();
        writer.begin_document().unwrap();
        writer.end_document().unwrap();
        assert_eq!(vec![0x05, 0x00, 0x00, 0x00, 0x00], writer.into_bytes());
    }

    #[test]
    fn test_string_element() {
        let mut writer = Writer::new();
        writer.begin_document().unwrap();
        writer.write_string("q", "abc").unwrap();
        writer.end_document().unwrap();
        assert_eq!(
            vec![
                0x10, 0x00, 0x00, 0x00, 0x02, 0x71, 0x00, 0x04, 0x00, 0x00, 0x00, 0x61, 0x62, 0x63,
                0x00, 0x00
            ],
            writer.into_bytes()
        );
    }

    #[test]
    fn test_embedded_array() {
        let mut writer = Writer::new();
        writer.begin_document().unwrap();
        writer.begin_embedded("ea", ElementType::Array).unwrap();
        assert_eq!(2, writer.depth());
        writer.end_document().unwrap();
        writer.end_document().unwrap();
        assert_eq!(0, writer.depth());
        assert_eq!(
            vec![
                0x0e, 0x00, 0x00, 0x00, 0x04, 0x65, 0x61, 0x00, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00
            ],
            writer.into_bytes()
        );
    }

    #[rstest(value, expected,
        case(true, vec![0x09, 0x00, 0x00, 0x00, 0x08, 0x62, 0x00, 0x01, 0x00]),
        case(false, vec![0x09, 0x00, 0x00, 0x00, 0x08, 0x62, 0x00, 0x00, 0x00]),
    )]
    fn test_boolean_element(value: bool, expected: Vec<u8>) {
        let mut writer = Writer::new();
        writer.begin_document().unwrap();
        writer.write_boolean("b", value).unwrap();
        writer.end_document().unwrap();
        assert_eq!(expected, writer.into_bytes());
    }

    #[test]
    fn test_binary_element_carries_subtype() {
        let mut writer = Writer::new();
        writer.begin_document().unwrap();
        writer.write_binary("k", 0x80, b"tuple").unwrap();
        writer.end_document().unwrap();
        let bytes = writer.into_bytes();
        assert_eq!(
            RawDocument::new(vec![RawElement::new(
                "k",
                RawValue::Binary {
                    subtype: 0x80,
                    data: b"tuple".to_vec()
                }
            )]),
            RawDocument::parse(&bytes).unwrap()
        );
    }

    #[test]
    fn test_key_with_zero_byte() {
        let mut writer = Writer::new();
        writer.begin_document().unwrap();
        assert_eq!(
            Err(Error::KeyWithZeroByte("a\0b".to_string())),
            writer.write_null("a\0b")
        );
    }

    #[test]
    fn test_end_without_begin() {
        let mut writer = Writer::new();
        assert_eq!(Err(Error::NoOpenDocument), writer.end_document());
    }
}
