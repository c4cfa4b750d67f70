use super::*;
use datkit_core::{
    Display, HashRecord, ItemKind, ItemStatus, Machine, Rom, Sample, Source,
};

const MD5_A: &str = "d41d8cd98f00b204e9800998ecf8427e";
const MD5_B: &str = "0cc175b9c0f1b6a831c399e269772661";
const SHA_A: &str = "0123456789abcdef0123456789abcdef01234567";

fn rom(machine: &str, name: &str, record: HashRecord) -> DatItem {
    DatItem::new(
        ItemKind::Rom(Rom::new(name).with_hash(record)),
        Machine::new(machine),
        Source::new(0, "0.dat"),
    )
}

fn crc(text: &str) -> HashRecord {
    HashRecord::new().with_text(HashKind::Crc, text).unwrap()
}

fn names(items: &[DatItem]) -> Vec<(&str, &str)> {
    items
        .iter()
        .map(|i| (i.machine.name.as_str(), i.name().unwrap_or("")))
        .collect()
}

#[test]
fn test_compare_items_natural_order() {
    let mut items = vec![
        rom("game10", "a", crc("00000001")),
        rom("game2", "track10.bin", crc("00000002")),
        rom("game2", "track9.bin", crc("00000003")),
        rom("game2", "disc2/a.bin", crc("00000004")),
    ];
    items.sort_by(compare_items);
    assert_eq!(
        names(&items),
        vec![
            ("game2", "track9.bin"),
            ("game2", "track10.bin"),
            ("game2", "disc2/a.bin"),
            ("game10", "a"),
        ]
    );
}

#[test]
fn test_compare_items_source_first() {
    let mut late = rom("a", "a", crc("00000001"));
    late.source = Source::new(1, "1.dat");
    let early = rom("z", "z", crc("00000002"));
    assert_eq!(compare_items(&early, &late), Ordering::Less);
}

#[test]
fn test_compare_items_type_then_unnamed_first() {
    let display = DatItem::new(
        ItemKind::Display(Display::default()),
        Machine::new("m"),
        Source::new(0, "0.dat"),
    );
    let sample = DatItem::new(
        ItemKind::Sample(Sample { name: "a".into() }),
        Machine::new("m"),
        Source::new(0, "0.dat"),
    );
    let rom_item = rom("m", "z", crc("00000001"));
    assert_eq!(compare_items(&rom_item, &display), Ordering::Less);
    assert_eq!(compare_items(&display, &sample), Ordering::Less);
    assert_eq!(compare_names(None, Some("a")), Ordering::Less);
}

#[test]
fn test_exact_duplicate_is_dropped() {
    let items = vec![rom("m", "a.bin", crc("00000001")), rom("m", "a.bin", crc("00000001"))];
    let outcome = resolve(items);
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.dropped, 1);
    assert_eq!(outcome.renamed, 0);
}

#[test]
fn test_duplicate_of_renamed_holder_is_dropped() {
    let items = vec![
        rom("m", "x", crc("00000001")),
        rom("m", "x", crc("00000002")),
        rom("m", "x", crc("00000002")),
    ];
    let outcome = resolve(items);
    assert_eq!(names(&outcome.items), vec![("m", "x"), ("m", "x_1")]);
    assert_eq!(outcome.renamed, 1);
    assert_eq!(outcome.dropped, 1);
}

#[test]
fn test_same_name_different_hash_is_renamed_with_md5() {
    let a = HashRecord::new().with_text(HashKind::Md5, MD5_A).unwrap();
    let b = HashRecord::new().with_text(HashKind::Md5, MD5_B).unwrap();
    let outcome = resolve(vec![rom("m", "x", a), rom("m", "x", b)]);
    assert_eq!(outcome.renamed, 1);
    assert_eq!(
        names(&outcome.items),
        vec![("m", "x"), ("m", "x_0cc175b9c0f1b6a831c399e269772661")]
    );
}

#[test]
fn test_rename_suffix_falls_back_to_sha1_then_one() {
    let sha = HashRecord::new().with_text(HashKind::Sha1, SHA_A).unwrap();
    let outcome = resolve(vec![rom("m", "x", crc("00000001")), rom("m", "x", sha)]);
    assert!(names(&outcome.items).contains(&("m", &*format!("x_{SHA_A}"))));

    let outcome = resolve(vec![rom("m", "y", crc("00000001")), rom("m", "y", crc("00000002"))]);
    assert_eq!(names(&outcome.items), vec![("m", "y"), ("m", "y_1")]);
}

#[test]
fn test_repeated_renames_get_counters() {
    let items = vec![
        rom("m", "y", crc("00000001")),
        rom("m", "y", crc("00000002")),
        rom("m", "y", crc("00000003")),
        rom("m", "y", crc("00000004")),
    ];
    let outcome = resolve(items);
    assert_eq!(outcome.renamed, 3);
    let mut got: Vec<&str> = outcome.items.iter().filter_map(|i| i.name()).collect();
    got.sort();
    assert_eq!(got, vec!["y", "y_1", "y_1_1", "y_1_2"]);
}

#[test]
fn test_rename_avoids_existing_names() {
    // "y_1" already exists in the machine, so the collision gets a counter
    let items = vec![
        rom("m", "y", crc("00000001")),
        rom("m", "y", crc("00000002")),
        rom("m", "y_1", crc("00000003")),
    ];
    let outcome = resolve(items);
    let mut got: Vec<&str> = outcome.items.iter().filter_map(|i| i.name()).collect();
    got.sort();
    assert_eq!(got, vec!["y", "y_1", "y_1_1"]);
}

#[test]
fn test_names_unique_per_machine() {
    let items = vec![
        rom("m", "a", crc("00000001")),
        rom("m", "a", crc("00000002")),
        rom("m", "a_1", crc("00000003")),
        rom("m", "a", crc("00000004")),
        rom("n", "a", crc("00000005")),
        rom("m", "a", crc("00000001")),
    ];
    let outcome = resolve(items);
    let mut seen = HashSet::new();
    for (machine, name) in names(&outcome.items) {
        assert!(seen.insert((machine, name)), "{machine}/{name} repeated");
    }
    assert_eq!(outcome.dropped, 1);
    assert_eq!(outcome.items.len(), 5);
}

#[test]
fn test_same_name_in_different_machines_untouched() {
    let outcome = resolve(vec![rom("m", "a", crc("00000001")), rom("n", "a", crc("00000002"))]);
    assert_eq!(outcome.renamed, 0);
    assert_eq!(names(&outcome.items), vec![("m", "a"), ("n", "a")]);
}

#[test]
fn test_hashless_nodumps_with_same_name_collapse() {
    let nodump = || {
        DatItem::new(
            ItemKind::Rom(Rom::new("x.bin").with_status(ItemStatus::Nodump)),
            Machine::new("m"),
            Source::new(0, "0.dat"),
        )
    };
    let outcome = resolve(vec![nodump(), nodump()]);
    assert_eq!(outcome.items.len(), 1);
    assert_eq!(outcome.dropped, 1);
}

#[test]
fn test_unnamed_duplicates_collapse_only_when_equal() {
    let display = |rotate: u32| {
        DatItem::new(
            ItemKind::Display(Display {
                rotate: Some(rotate),
                ..Display::default()
            }),
            Machine::new("m"),
            Source::new(0, "0.dat"),
        )
    };
    let outcome = resolve(vec![display(0), display(0), display(90)]);
    assert_eq!(outcome.items.len(), 2);
    assert_eq!(outcome.dropped, 1);
}

#[test]
fn test_resolve_names_output_sorted() {
    let items = vec![rom("b", "z", crc("00000001")), rom("a", "z", crc("00000002"))];
    let out = resolve_names(items);
    assert_eq!(names(&out), vec![("a", "z"), ("b", "z")]);
}
