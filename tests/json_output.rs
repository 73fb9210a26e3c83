mod common;

use atomscan::parse_reader;
use common::{MvhdFields, atom, ftyp, mvhd};
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

/// [ftyp] [free] [mdat] [moov [mvhd] [trak]] written to a temp file.
fn make_movie_file() -> PathBuf {
    let mut data = ftyp(b"qt  ", [0, 0, 2, 0], &[b"qt  "]);
    data.extend(atom(b"free", &[]));
    data.extend(atom(b"mdat", &[0u8; 8]));
    let mut moov = mvhd(&MvhdFields::default());
    moov.extend(atom(b"trak", &[]));
    data.extend(atom(b"moov", &moov));

    let path = std::env::temp_dir().join(format!(
        "atomscan_json_output_test_{}.mov",
        std::process::id()
    ));
    let mut f = File::create(&path).expect("create temp file failed");
    f.write_all(&data).expect("write temp data failed");
    path
}

#[test]
fn parse_file_and_serialize_to_json() {
    let path = make_movie_file();
    let file = File::open(&path).expect("Failed to open test file");

    let atoms = parse_reader(file, 16).expect("parse_reader failed");
    std::fs::remove_file(&path).expect("remove temp file failed");
    assert_eq!(atoms.len(), 4);

    let json_str = serde_json::to_string(&atoms).expect("serialize to JSON failed");
    let v: Value = serde_json::from_str(&json_str).expect("parse JSON failed");
    let arr = v.as_array().unwrap();

    let first = &arr[0];
    assert_eq!(first["typ"], "ftyp");
    assert_eq!(first["size"], 20);
    assert_eq!(first["offset"], 0);
    assert_eq!(first["data"]["kind"], "ftyp");
    assert_eq!(first["data"]["major_brand"], "qt  ");
    assert_eq!(first["data"]["minor_brand"], "00000200");
    assert_eq!(first["data"]["compatible_brands"][0], "qt  ");

    assert_eq!(arr[1]["data"]["kind"], "generic");
    assert_eq!(arr[2]["data"]["kind"], "mdat");

    let moov = &arr[3];
    assert_eq!(moov["data"]["kind"], "moov");
    assert_eq!(moov["data"]["mvhd"], 0);
    assert_eq!(moov["data"]["traks"][0], 1);
    let mvhd = &moov["children"][0];
    assert_eq!(mvhd["parent"], 3);
    assert_eq!(mvhd["data"]["time_scale"], 600);
    assert_eq!(mvhd["data"]["flags"], "000000");
    assert!(mvhd["data"]["matrix"].as_str().unwrap().starts_with("00010000"));

    // leaf atoms omit the empty child list
    assert!(first.get("children").is_none());
}
