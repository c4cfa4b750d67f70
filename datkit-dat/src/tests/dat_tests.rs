use super::*;
use datkit_core::{HashKind, ItemStatus};

fn src() -> Source {
    Source::new(0, "test.dat")
}

// -- XML tests --

const SAMPLE_XML_DAT: &str = r#"<?xml version="1.0"?>
<!DOCTYPE datafile SYSTEM "http://www.logiqx.com/Dats/datafile.dtd">
<datafile>
    <header>
        <name>Nintendo - Super Nintendo Entertainment System</name>
        <description>Nintendo - Super Nintendo Entertainment System (20240101-000000)</description>
        <version>20240101-000000</version>
        <author>No-Intro</author>
    </header>
    <game name="Super Mario World (USA)">
        <description>Super Mario World (USA)</description>
        <rom name="Super Mario World (USA).sfc" size="524288" crc="b19ed489" sha1="6b47bb75d16514b6a476aa0c73a683a2a4c18765"/>
    </game>
    <game name="Super Mario World (Europe)" cloneof="Super Mario World (USA)">
        <rom name="Super Mario World (Europe).sfc" size="524288" crc="B19ED489"/>
    </game>
</datafile>"#;

#[test]
fn test_parse_xml_dat() {
    let dat = parse_dat(SAMPLE_XML_DAT.as_bytes(), &src()).unwrap();
    assert_eq!(
        dat.header.name,
        "Nintendo - Super Nintendo Entertainment System"
    );
    assert_eq!(dat.header.version, "20240101-000000");
    assert_eq!(dat.header.author.as_deref(), Some("No-Intro"));
    assert_eq!(dat.items.len(), 2);

    let smw = &dat.items[0];
    assert_eq!(smw.machine.name, "Super Mario World (USA)");
    assert_eq!(
        smw.machine.description.as_deref(),
        Some("Super Mario World (USA)")
    );
    assert_eq!(smw.name(), Some("Super Mario World (USA).sfc"));
    let hash = smw.hash().unwrap();
    assert_eq!(hash.size, Some(524288));
    assert_eq!(hash.text(HashKind::Crc).as_deref(), Some("b19ed489"));
    assert_eq!(
        hash.text(HashKind::Sha1).as_deref(),
        Some("6b47bb75d16514b6a476aa0c73a683a2a4c18765")
    );
    assert_eq!(smw.source, src());
}

#[test]
fn test_parse_xml_clone_and_case() {
    let dat = parse_dat(SAMPLE_XML_DAT.as_bytes(), &src()).unwrap();
    let eur = &dat.items[1];
    assert_eq!(
        eur.machine.clone_of.as_deref(),
        Some("Super Mario World (USA)")
    );
    assert!(eur.machine.is_child_of("Super Mario World (USA)"));
    assert_eq!(
        eur.hash().unwrap().text(HashKind::Crc).as_deref(),
        Some("b19ed489")
    );
}

#[test]
fn test_parse_empty_xml() {
    let xml = r#"<?xml version="1.0"?><datafile></datafile>"#;
    let result = parse_dat(xml.as_bytes(), &src());
    assert!(result.is_err());
}

#[test]
fn test_parse_empty_input() {
    assert!(parse_dat("   \n".as_bytes(), &src()).is_err());
}

#[test]
fn test_parse_dat_skips_utf8_bom() {
    let mut xml = b"\xEF\xBB\xBF".to_vec();
    xml.extend_from_slice(SAMPLE_XML_DAT.as_bytes());
    let dat = parse_dat(xml.as_slice(), &src()).unwrap();
    assert_eq!(dat.header.version, "20240101-000000");
    assert_eq!(dat.items.len(), 2);

    assert!(parse_dat(&b"\xEF\xBB\xBF  \n"[..], &src()).is_err());
}

#[test]
fn test_parse_xml_mixed_item_kinds() {
    let xml = r#"<?xml version="1.0"?>
<datafile>
    <header><name>Arcade</name></header>
    <machine name="pacman" romof="puckman" sampleof="pacman">
        <description>Pac-Man</description>
        <year>1980</year>
        <manufacturer>Namco</manufacturer>
        <biosset name="default" description="Default" default="yes"/>
        <rom name="pacman.6e" size="4096" crc="c1e6ab10" status="good"/>
        <rom name="missing.bin" size="2048" crc="00000000" status="nodump"/>
        <disk name="hdd" sha1="0123456789abcdef0123456789abcdef01234567"/>
        <sample name="eat"/>
        <chip type="cpu" tag="maincpu" name="Zilog Z80" clock="3072000"/>
        <display type="raster" rotate="90" width="288" height="224" refresh="60.606061"/>
        <sound channels="1"/>
        <dipswitch name="Lives" tag="DSW1" mask="12">
            <dipvalue name="1" value="0"/>
            <dipvalue name="2" value="4"/>
        </dipswitch>
        <driver status="good" emulation="good" savestate="supported"/>
    </machine>
</datafile>"#;
    let dat = parse_dat(xml.as_bytes(), &src()).unwrap();
    let types: Vec<ItemType> = dat.items.iter().map(|i| i.item_type()).collect();
    assert_eq!(
        types,
        vec![
            ItemType::BiosSet,
            ItemType::Rom,
            ItemType::Rom,
            ItemType::Disk,
            ItemType::Sample,
            ItemType::Chip,
            ItemType::Display,
            ItemType::Sound,
            ItemType::DipSwitch,
            ItemType::Driver,
        ]
    );

    let machine = &dat.items[0].machine;
    assert_eq!(machine.rom_of.as_deref(), Some("puckman"));
    assert_eq!(machine.sample_of.as_deref(), Some("pacman"));
    assert_eq!(machine.year.as_deref(), Some("1980"));
    assert_eq!(machine.manufacturer.as_deref(), Some("Namco"));

    let nodump = &dat.items[2];
    assert!(nodump.is_nodump());
    assert_eq!(nodump.hash().unwrap().size, Some(2048));
    assert!(!nodump.hash().unwrap().has_any_digest());

    assert_eq!(dat.items[1].status(), ItemStatus::Good);
    assert_eq!(dat.items[6].name(), None);
}

#[test]
fn test_parse_xml_escaped_names() {
    let xml = r#"<?xml version="1.0"?>
<datafile>
    <header><name>Test</name></header>
    <game name="Tom &amp; Jerry">
        <rom name="Tom &amp; Jerry.bin" size="1"/>
    </game>
</datafile>"#;
    let dat = parse_dat(xml.as_bytes(), &src()).unwrap();
    assert_eq!(dat.items[0].machine.name, "Tom & Jerry");
    assert_eq!(dat.items[0].name(), Some("Tom & Jerry.bin"));
}

#[test]
fn test_parse_xml_bad_hash_keeps_item() {
    let xml = r#"<?xml version="1.0"?>
<datafile>
    <header><name>Test</name></header>
    <game name="Game">
        <rom name="a.bin" size="16" crc="nothex" md5="d41d8cd98f00b204e9800998ecf8427e"/>
    </game>
</datafile>"#;
    let dat = parse_dat(xml.as_bytes(), &src()).unwrap();
    let hash = dat.items[0].hash().unwrap();
    assert!(!hash.has(HashKind::Crc));
    assert!(hash.has(HashKind::Md5));
}

#[test]
fn test_parse_xml_rom_without_name_is_rejected() {
    let xml = r#"<?xml version="1.0"?>
<datafile>
    <header><name>Test</name></header>
    <game name="Game"><rom size="16"/></game>
</datafile>"#;
    let err = parse_dat(xml.as_bytes(), &src()).unwrap_err();
    assert!(matches!(err, DatError::InvalidDat(_)));
}

// -- ClrMamePro tests --

const SAMPLE_CLR_DAT: &str = r#"clrmamepro (
	name "Nintendo - Game Boy"
	description "Nintendo - Game Boy"
	version 20240101-000000
	homepage "https://no-intro.org"
)

game (
	name "Tetris (World)"
	description "Tetris (World)"
	rom ( name "Tetris (World).gb" size 32768 crc 46DF91AD md5 982ED5D2B12A0377EB14BCDC4123744E sha1 74591CC9501AF93873F9A5D3EB12DA12C0723BBC )
)

game (
	name "Bad Game (USA)"
	cloneof "Tetris (World)"
	rom ( name "Bad Game (USA).gb" size 1024 crc 00000000 flags nodump )
	disk ( name "extra" sha1 74591CC9501AF93873F9A5D3EB12DA12C0723BBC )
	sample "boom"
)
"#;

#[test]
fn test_parse_clrmamepro_dat() {
    let dat = parse_dat(SAMPLE_CLR_DAT.as_bytes(), &src()).unwrap();
    assert_eq!(dat.header.name, "Nintendo - Game Boy");
    assert_eq!(dat.header.version, "20240101-000000");
    assert_eq!(dat.header.homepage.as_deref(), Some("https://no-intro.org"));
    assert_eq!(dat.items.len(), 4);

    let tetris = &dat.items[0];
    assert_eq!(tetris.machine.name, "Tetris (World)");
    assert_eq!(tetris.name(), Some("Tetris (World).gb"));
    let hash = tetris.hash().unwrap();
    assert_eq!(hash.size, Some(32768));
    assert_eq!(hash.text(HashKind::Crc).as_deref(), Some("46df91ad"));
    assert_eq!(
        hash.text(HashKind::Md5).as_deref(),
        Some("982ed5d2b12a0377eb14bcdc4123744e")
    );
}

#[test]
fn test_parse_clrmamepro_flags_and_bare_items() {
    let dat = parse_dat(SAMPLE_CLR_DAT.as_bytes(), &src()).unwrap();
    let bad = &dat.items[1];
    assert_eq!(bad.machine.clone_of.as_deref(), Some("Tetris (World)"));
    assert!(bad.is_nodump());

    assert_eq!(dat.items[2].item_type(), ItemType::Disk);
    assert_eq!(dat.items[3].item_type(), ItemType::Sample);
    assert_eq!(dat.items[3].name(), Some("boom"));
}

#[test]
fn test_parse_clrmamepro_name_after_items() {
    let clr = "game (\n\trom ( name a.bin size 1 )\n\tname \"Late Name\"\n)\n";
    let dat = parse_dat(clr.as_bytes(), &src()).unwrap();
    assert_eq!(dat.items[0].machine.name, "Late Name");
}

#[test]
fn test_parse_clrmamepro_unterminated_block() {
    let clr = "game (\n\tname \"x\"\n\trom ( name a.bin size 1 )\n";
    assert!(parse_dat(clr.as_bytes(), &src()).is_err());
}

#[test]
fn test_tokenize_line() {
    let tokens = tokenize_line(r#"name "Game (USA).gb" size 1024 crc AABB"#);
    assert_eq!(tokens, vec!["name", "Game (USA).gb", "size", "1024", "crc", "AABB"]);
}

#[test]
fn test_parse_kv() {
    assert_eq!(
        parse_kv(r#"name "Some Game""#),
        Some(("name".to_string(), ClrValue::Text("Some Game".to_string())))
    );
    assert_eq!(
        parse_kv("rom ( name x )"),
        Some(("rom".to_string(), ClrValue::Group("name x".to_string())))
    );
    assert_eq!(parse_kv("lonely"), None);
}

#[test]
fn test_detect_block_start() {
    assert_eq!(detect_block_start("game ("), Some("game".to_string()));
    assert_eq!(detect_block_start("clrmamepro ("), Some("clrmamepro".to_string()));
    assert_eq!(detect_block_start("name \"x\""), None);
}

#[test]
fn test_parse_dat_file_names_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gameboy.dat");
    std::fs::write(&path, SAMPLE_CLR_DAT).unwrap();
    let dat = parse_dat_file(&path, 3).unwrap();
    assert_eq!(dat.items[0].source, Source::new(3, "gameboy.dat"));
}
