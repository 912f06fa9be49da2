use std::fmt::Write as _;

use bsonkit::decoder::Decoder;
use clap::Args;
use wire::{RawDocument, RawValue};

use crate::error::Result;
use crate::utils::{format_hex_dump, read_input};

#[derive(Args)]
pub(crate) struct Config {
    /// Path to the document file. If not specified, reads from stdin
    file: Option<String>,

    /// Print only the hex dump
    #[arg(long)]
    raw: bool,
}

pub(crate) fn execute(config: Config) -> Result<()> {
    let bytes = read_input(config.file.as_deref())?;

    print!("{}", format_hex_dump(&bytes));
    if config.raw {
        return Ok(());
    }

    let document: RawDocument = bytes.decode()?;
    println!();
    print!("{}", format_outline(&document));

    Ok(())
}

/// One line per element: offset of its tag byte, element type and key.
fn format_outline(document: &RawDocument) -> String {
    let mut output = format!("{:08x}  document ({} bytes)\n", 0, document.encoded_len());
    outline(document, 0, 1, &mut output);
    output
}

fn outline(document: &RawDocument, start: usize, depth: usize, output: &mut String) {
    let prefix = "  ".repeat(depth);
    // past the length prefix
    let mut offset = start + 4;
    for element in document.elements() {
        let _ = writeln!(
            output,
            "{offset:08x}  {prefix}{} {:?}",
            element.element_type(),
            element.key()
        );
        if let RawValue::Document(inner) | RawValue::Array(inner) = element.value() {
            outline(inner, offset + element.key().len() + 2, depth + 1, output);
        }
        offset += element.encoded_len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_outline() {
        // {"q": "abc", "ea": [1]}
        let bytes = vec![
            0x20, 0x00, 0x00, 0x00, 0x02, 0x71, 0x00, 0x04, 0x00, 0x00, 0x00, 0x61, 0x62, 0x63,
            0x00, 0x04, 0x65, 0x61, 0x00, 0x0c, 0x00, 0x00, 0x00, 0x10, 0x30, 0x00, 0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];
        let document = RawDocument::parse(&bytes).unwrap();
        let expected = "\
00000000  document (32 bytes)
00000004    string (0x02) \"q\"
0000000f    array (0x04) \"ea\"
00000017      int32 (0x10) \"0\"
";
        assert_eq!(expected, format_outline(&document));
    }
}
