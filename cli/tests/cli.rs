use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const QUERY: [u8; 16] = [
    0x10, 0x00, 0x00, 0x00, 0x02, 0x71, 0x00, 0x04, 0x00, 0x00, 0x00, 0x61, 0x62, 0x63, 0x00, 0x00,
];

// {"x": <maxkey>, "i": 1}
const WITH_MAXKEY: [u8; 15] = [
    0x0f, 0x00, 0x00, 0x00, 0x7f, 0x78, 0x00, 0x10, 0x69, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00,
];

fn bsonkit() -> Command {
    Command::new(env!("CARGO_BIN_EXE_bsonkit"))
}

fn temp_file(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file
}

#[test]
fn test_encode_stdin() {
    bsonkit()
        .arg("encode")
        .write_stdin(r#"{"q": "abc"}"#)
        .assert()
        .success()
        .stdout(QUERY.to_vec());
}

#[test]
fn test_encode_hex() {
    bsonkit()
        .args(["encode", "--hex"])
        .write_stdin(r#"{"q": "abc"}"#)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "00000000  10 00 00 00 02 71 00 04  00 00 00 61 62 63 00 00",
        ));
}

#[test]
fn test_encode_rejects_top_level_array() {
    bsonkit()
        .arg("encode")
        .write_stdin("[1, 2]")
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnsupportedObject"));
}

#[test]
fn test_encode_rejects_bad_hex() {
    bsonkit()
        .arg("encode")
        .write_stdin(r#"{"b": {"$binary": "xyz"}}"#)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Hex"));
}

#[test]
fn test_decode_file_text() {
    let file = temp_file(&QUERY);
    bsonkit()
        .args(["decode", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("document (1 elements)"))
        .stdout(predicate::str::contains("q: string \"abc\""));
}

#[test]
fn test_decode_json() {
    bsonkit()
        .args(["decode", "-o", "json"])
        .write_stdin(&QUERY[..])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""q": "abc""#));
}

#[test]
fn test_decode_yaml() {
    bsonkit()
        .args(["decode", "--output", "yaml"])
        .write_stdin(&QUERY[..])
        .assert()
        .success()
        .stdout(predicate::str::contains("q: abc"));
}

#[test]
fn test_decode_broken_data() {
    bsonkit()
        .arg("decode")
        .write_stdin(&QUERY[..8])
        .assert()
        .failure()
        .stderr(predicate::str::contains("NotEnoughData"));
}

#[test]
fn test_decode_extension_policy() {
    bsonkit()
        .arg("decode")
        .write_stdin(&WITH_MAXKEY[..])
        .assert()
        .success()
        .stdout(predicate::str::contains("i: int32 1"))
        .stdout(predicate::str::contains("x:").not());

    bsonkit()
        .args(["decode", "--python-only"])
        .write_stdin(&WITH_MAXKEY[..])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidElementType(127)"));
}

#[test]
fn test_decode_mapper_config_file() {
    let config = temp_file(br#"{"python_only": true}"#);
    bsonkit()
        .args(["decode", "--config", config.path().to_str().unwrap()])
        .write_stdin(&WITH_MAXKEY[..])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidElementType"));
}

#[test]
fn test_decode_mapper_options() {
    bsonkit()
        .args(["decode", "--options", "python_only=true"])
        .write_stdin(&WITH_MAXKEY[..])
        .assert()
        .failure()
        .stderr(predicate::str::contains("InvalidElementType"));

    bsonkit()
        .args(["decode", "--options", "strict"])
        .write_stdin(&QUERY[..])
        .assert()
        .failure()
        .stderr(predicate::str::contains("UnknownOption"));
}

#[test]
fn test_keep_types_round_trip() {
    let output = bsonkit()
        .args(["encode", "--keep-types"])
        .write_stdin(r#"{"t": {"$tuple": [1, {"$bytearray": "00ff"}]}}"#)
        .output()
        .unwrap();
    assert!(output.status.success());

    bsonkit()
        .args(["decode", "--keep-types"])
        .write_stdin(output.stdout.clone())
        .assert()
        .success()
        .stdout(predicate::str::contains("t: tuple (2 items)"))
        .stdout(predicate::str::contains("1: bytearray [00:ff]"));

    bsonkit()
        .arg("decode")
        .write_stdin(output.stdout)
        .assert()
        .success()
        .stdout(predicate::str::contains("t: array (2 items)"))
        .stdout(predicate::str::contains("__metadata__").not());
}

#[test]
fn test_dump() {
    let file = temp_file(&QUERY);
    bsonkit()
        .args(["dump", file.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("|.....q.....abc..|"))
        .stdout(predicate::str::contains("00000004    string (0x02) \"q\""));
}

#[test]
fn test_dump_broken_data_still_shows_bytes() {
    bsonkit()
        .arg("dump")
        .write_stdin(&QUERY[..8])
        .assert()
        .failure()
        .stdout(predicate::str::contains("00000000  10 00 00 00"))
        .stderr(predicate::str::contains("NotEnoughData"));
}

#[test]
fn test_dump_raw() {
    bsonkit()
        .args(["dump", "--raw"])
        .write_stdin(&QUERY[..8])
        .assert()
        .success()
        .stdout(predicate::str::contains("document").not());
}
