use datkit_core::{HashKind, Source};
use datkit_dat::*;

#[test]
fn scanned_tree_survives_xml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("roms");
    std::fs::create_dir_all(root.join("Disc Game")).unwrap();
    std::fs::write(root.join("Disc Game/disc.cue"), b"FILE \"disc.bin\" BINARY").unwrap();
    std::fs::write(root.join("Disc Game/disc.bin"), vec![0u8; 2352]).unwrap();
    std::fs::write(root.join("Cart & Co.gb"), b"hello world").unwrap();

    let outcome = scan_directory(&root, &Source::new(0, "roms")).unwrap();
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.items.len(), 3);

    let out_path = dir.path().join("roms.dat");
    write_dat_file(
        &out_path,
        OutputFormat::Logiqx,
        &DatHeader::new("roms"),
        &outcome.items,
    )
    .unwrap();

    let parsed = parse_dat_file(&out_path, 1).unwrap();
    assert_eq!(parsed.header.name, "roms");
    assert_eq!(parsed.items.len(), 3);
    for (scanned, read_back) in outcome.items.iter().zip(&parsed.items) {
        assert_eq!(scanned.machine.name, read_back.machine.name);
        assert_eq!(scanned.kind, read_back.kind);
        assert_eq!(read_back.source, Source::new(1, "roms.dat"));
    }

    let cart = parsed
        .items
        .iter()
        .find(|i| i.machine.name == "Cart & Co")
        .unwrap();
    assert_eq!(
        cart.hash().unwrap().text(HashKind::Sha1).as_deref(),
        Some("2aae6c35c94fcfb415dbe95f408b9ce91ee846ed")
    );
}

#[test]
fn json_output_lists_every_machine() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.bin"), b"a").unwrap();
    std::fs::write(dir.path().join("b.bin"), b"b").unwrap();

    let outcome = scan_directory(dir.path(), &Source::new(0, "scan")).unwrap();
    let mut out = Vec::new();
    write_json(&mut out, &DatHeader::new("scan"), &outcome.items).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let names: Vec<&str> = value["machines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}
