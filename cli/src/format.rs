use bson::{Binary, BinaryKind, DateTime, Document, SequenceKind, Value};

/// Formats a decoded document as an indented tree, one element per line.
pub(crate) fn format_document(document: &Document) -> String {
    let mut output = String::new();
    output.push_str(&format!("document ({} elements)\n", document.len()));
    for (key, value) in document.iter() {
        format_value(key, value, 1, &mut output);
    }
    output
}

fn format_value(key: &str, value: &Value, depth: usize, output: &mut String) {
    let prefix = "  ".repeat(depth);

    match value {
        Value::Null => output.push_str(&format!("{prefix}{key}: null\n")),
        Value::Boolean(b) => output.push_str(&format!("{prefix}{key}: boolean {b}\n")),
        Value::Double(d) => output.push_str(&format!("{prefix}{key}: double {d:?}\n")),
        Value::Int32(i) => output.push_str(&format!("{prefix}{key}: int32 {i}\n")),
        Value::Int64(i) => output.push_str(&format!("{prefix}{key}: int64 {i}\n")),
        Value::String(s) => output.push_str(&format!("{prefix}{key}: string {s:?}\n")),
        Value::Binary(binary) => {
            output.push_str(&format!("{prefix}{key}: {}\n", format_binary(binary)));
        }
        Value::DateTime(dt) => {
            output.push_str(&format!("{prefix}{key}: datetime {}\n", format_datetime(dt)));
        }
        Value::Document(document) => {
            output.push_str(&format!("{prefix}{key}: document ({} elements)\n", document.len()));
            for (key, value) in document.iter() {
                format_value(key, value, depth + 1, output);
            }
        }
        Value::Array(array) => {
            let kind = match array.kind() {
                SequenceKind::List => "array",
                SequenceKind::Tuple => "tuple",
            };
            output.push_str(&format!("{prefix}{key}: {kind} ({} items)\n", array.len()));
            for (index, item) in array.items().iter().enumerate() {
                format_value(&index.to_string(), item, depth + 1, output);
            }
        }
    }
}

fn format_binary(binary: &Binary) -> String {
    let kind = match binary.kind() {
        BinaryKind::Bytes => "binary",
        BinaryKind::ByteArray => "bytearray",
    };
    let bytes = binary.as_bytes();
    if bytes.len() > 32 {
        format!("{kind} ({} bytes)", bytes.len())
    } else {
        let hex = bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(":");
        format!("{kind} [{hex}]")
    }
}

fn format_datetime(dt: &DateTime) -> String {
    match dt.to_chrono() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string(),
        // outside chrono's calendar range
        None => format!("{} ms", dt.timestamp_millis()),
    }
}
