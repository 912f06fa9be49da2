use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};

use crate::error::Result;

/// Reads the whole of `file`, or stdin when no path is given.
pub(crate) fn read_input(file: Option<&str>) -> Result<Vec<u8>> {
    let bytes = match file {
        Some(path) => fs::read(path)?,
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            buffer
        }
    };
    tracing::debug!(source = file.unwrap_or("stdin"), bytes = bytes.len(), "read input");
    Ok(bytes)
}

/// `xxd`-style dump: offset, 16 hex bytes split in two groups of eight, and
/// the printable ASCII column.
pub(crate) fn format_hex_dump(data: &[u8]) -> String {
    const BYTES_PER_LINE: usize = 16;
    let mut output = String::new();

    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        let _ = write!(output, "{:08x}  ", line * BYTES_PER_LINE);
        for i in 0..BYTES_PER_LINE {
            match chunk.get(i) {
                Some(byte) => {
                    let _ = write!(output, "{byte:02x} ");
                }
                None => output.push_str("   "),
            }
            if i == 7 {
                output.push(' ');
            }
        }

        output.push_str(" |");
        output.extend(chunk.iter().map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        }));
        output.push_str("|\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::format_hex_dump;

    #[rstest(input, expected,
        case(vec![], ""),
        case(
            vec![0x05, 0x00, 0x00, 0x00, 0x00],
            "00000000  05 00 00 00 00                                    |.....|\n"
        ),
        case(
            b"0123456789abcdefgh".to_vec(),
            "00000000  30 31 32 33 34 35 36 37  38 39 61 62 63 64 65 66  |0123456789abcdef|\n00000010  67 68                                             |gh|\n"
        ),
    )]
    fn test_format_hex_dump(input: Vec<u8>, expected: &str) {
        assert_eq!(expected, format_hex_dump(&input));
    }
}
