use std::io::{BufRead, Read};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::Serialize;

use datkit_core::{DatItem, ItemKind, ItemType, Machine, Source};

use crate::attributes::{Attrs, build_kind};
use crate::error::DatError;

/// Descriptive header of a DAT file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatHeader {
    pub name: String,
    pub description: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl DatHeader {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            ..Self::default()
        }
    }
}

/// A parsed DAT file (Logiqx XML or ClrMamePro).
///
/// Items are flattened: each one carries its own copy of the machine it
/// was listed under and the source it came from.
#[derive(Debug, Clone, Default)]
pub struct DatFile {
    pub header: DatHeader,
    pub items: Vec<DatItem>,
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse a DAT file, auto-detecting format (XML or ClrMamePro).
///
/// Every item is tagged with `source`.
pub fn parse_dat<R: BufRead>(mut reader: R, source: &Source) -> Result<DatFile, DatError> {
    // A UTF-8 byte order mark is not content
    if reader.fill_buf()?.starts_with(UTF8_BOM) {
        reader.consume(UTF8_BOM.len());
    }

    // Peek at the first non-whitespace content to detect format
    let mut first_bytes = Vec::new();
    let mut buf = [0u8; 1];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            return Err(DatError::invalid_dat("Empty DAT file"));
        }
        first_bytes.push(buf[0]);
        if !buf[0].is_ascii_whitespace() {
            break;
        }
    }

    let chain = std::io::Cursor::new(first_bytes).chain(reader);
    let buffered = std::io::BufReader::new(chain);

    let dat = if buf[0] == b'<' {
        parse_xml(buffered, source)?
    } else {
        parse_clrmamepro(buffered, source)?
    };
    log::debug!(
        "Parsed {} items from '{}' ({})",
        dat.items.len(),
        source.name,
        dat.header.name
    );
    Ok(dat)
}

/// Parse a DAT file from a path. The source is named after the file.
pub fn parse_dat_file(path: &Path, index: usize) -> Result<DatFile, DatError> {
    let file = std::fs::File::open(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let reader = std::io::BufReader::new(file);
    parse_dat(reader, &Source::new(index, name))
}

const MACHINE_TAGS: &[&str] = &["game", "machine", "software", "set"];

// ---------------------------------------------------------------------------
// Logiqx XML parser
// ---------------------------------------------------------------------------

fn parse_xml<R: BufRead>(reader: R, source: &Source) -> Result<DatFile, DatError> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut dat = DatFile::default();

    let mut in_header = false;
    let mut current_tag = String::new();
    let mut current_machine: Option<Machine> = None;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
                if tag_name == "header" {
                    in_header = true;
                } else if MACHINE_TAGS.contains(&tag_name.as_str()) && !in_header {
                    current_machine = Some(parse_machine_attributes(e)?);
                } else if let Some(machine) = &current_machine
                    && let Some(item_type) = ItemType::from_tag(&tag_name)
                {
                    // Elements like <dipswitch> have children; only the
                    // opening tag carries the item.
                    push_xml_item(&mut dat, item_type, e, machine, source)?;
                } else {
                    current_tag = tag_name;
                }
            }
            Event::Empty(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
                if let Some(machine) = &current_machine
                    && let Some(item_type) = ItemType::from_tag(&tag_name)
                {
                    push_xml_item(&mut dat, item_type, e, machine, source)?;
                }
            }
            Event::Text(ref e) => {
                let text = e.unescape()?.to_string();
                if in_header {
                    apply_header_field(&mut dat.header, &current_tag, text);
                } else if let Some(machine) = current_machine.as_mut() {
                    apply_machine_field(machine, &current_tag, text);
                }
            }
            Event::End(ref e) => {
                let tag_name = String::from_utf8_lossy(e.name().as_ref()).to_lowercase();
                if tag_name == "header" {
                    in_header = false;
                } else if MACHINE_TAGS.contains(&tag_name.as_str()) && !in_header {
                    current_machine = None;
                } else {
                    current_tag.clear();
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if dat.header.name.is_empty() && dat.items.is_empty() {
        return Err(DatError::invalid_dat(
            "No header or games found in XML DAT file",
        ));
    }

    Ok(dat)
}

fn xml_attributes(e: &BytesStart<'_>) -> Result<Attrs, DatError> {
    let mut attrs = Attrs::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        attrs.push(key, value);
    }
    Ok(attrs)
}

fn parse_machine_attributes(e: &BytesStart<'_>) -> Result<Machine, DatError> {
    let attrs = xml_attributes(e)?;
    let name = attrs
        .get("name")
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DatError::invalid_dat("Machine element without a name"))?;
    let mut machine = Machine::new(name);
    machine.clone_of = attrs.get("cloneof").map(str::to_string);
    machine.rom_of = attrs.get("romof").map(str::to_string);
    machine.sample_of = attrs.get("sampleof").map(str::to_string);
    machine.is_bios = attrs.get("isbios") == Some("yes");
    machine.is_device = attrs.get("isdevice") == Some("yes");
    Ok(machine)
}

fn push_xml_item(
    dat: &mut DatFile,
    item_type: ItemType,
    e: &BytesStart<'_>,
    machine: &Machine,
    source: &Source,
) -> Result<(), DatError> {
    let attrs = xml_attributes(e)?;
    let kind = build_kind(item_type, &attrs)
        .map_err(|err| DatError::invalid_dat(format!("In machine '{}': {err}", machine.name)))?;
    dat.items
        .push(DatItem::new(kind, machine.clone(), source.clone()));
    Ok(())
}

fn apply_header_field(header: &mut DatHeader, tag: &str, value: String) {
    match tag {
        "name" => header.name = value,
        "description" => header.description = value,
        "version" => header.version = value,
        "author" => header.author = Some(value),
        "homepage" => header.homepage = Some(value),
        "date" => header.date = Some(value),
        _ => {}
    }
}

fn apply_machine_field(machine: &mut Machine, tag: &str, value: String) {
    match tag {
        "description" => machine.description = Some(value),
        "year" => machine.year = Some(value),
        "manufacturer" | "publisher" => machine.manufacturer = Some(value),
        "category" => machine.category = Some(value),
        "board" => machine.board = Some(value),
        // ClrMamePro spellings, shared with the line parser
        "cloneof" => machine.clone_of = Some(value),
        "romof" => machine.rom_of = Some(value),
        "sampleof" => machine.sample_of = Some(value),
        _ => {}
    }
}

// ---------------------------------------------------------------------------
// ClrMamePro DAT parser
// ---------------------------------------------------------------------------

/// Parse a ClrMamePro format DAT file.
///
/// Format:
/// ```text
/// clrmamepro (
///     name "System Name"
///     version 20240101-000000
/// )
///
/// game (
///     name "Game Name (Region)"
///     cloneof "Parent"
///     rom ( name "Game Name (Region).ext" size 12345 crc AABBCCDD sha1 ... )
///     disk ( name "hdd" sha1 ... )
///     sample "bang"
/// )
/// ```
fn parse_clrmamepro<R: BufRead>(reader: R, source: &Source) -> Result<DatFile, DatError> {
    let mut dat = DatFile::default();

    let mut in_block: Option<String> = None;
    // Items are collected until the block closes, since `name` need not
    // come first.
    let mut current_machine: Option<Machine> = None;
    let mut pending: Vec<ItemKind> = Vec::new();

    for (line_no, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        let Some(block_type) = in_block.as_deref() else {
            if let Some(block_type) = detect_block_start(trimmed) {
                if MACHINE_TAGS.contains(&block_type.as_str()) || block_type == "resource" {
                    current_machine = Some(Machine::default());
                }
                in_block = Some(block_type);
            }
            continue;
        };

        if trimmed == ")" {
            in_block = None;
            if let Some(machine) = current_machine.take() {
                if machine.name.is_empty() {
                    return Err(DatError::invalid_dat(format!(
                        "Block ending on line {} has no name",
                        line_no + 1
                    )));
                }
                for kind in pending.drain(..) {
                    dat.items
                        .push(DatItem::new(kind, machine.clone(), source.clone()));
                }
            }
            continue;
        }

        let Some((key, value)) = parse_kv(trimmed) else {
            continue;
        };

        if block_type == "clrmamepro" {
            apply_header_field(&mut dat.header, &key, value.into_text());
            continue;
        }

        let Some(machine) = current_machine.as_mut() else {
            continue;
        };
        match (ItemType::from_tag(&key), value) {
            (Some(item_type), ClrValue::Group(inner)) => {
                let attrs = tokens_to_attrs(&tokenize_line(&inner));
                pending.push(build_kind(item_type, &attrs).map_err(|err| {
                    DatError::invalid_dat(format!("Line {}: {err}", line_no + 1))
                })?);
            }
            // Bare form: `sample "bang"`
            (Some(item_type), ClrValue::Text(name)) => {
                let mut attrs = Attrs::new();
                attrs.push("name", name);
                pending.push(build_kind(item_type, &attrs).map_err(|err| {
                    DatError::invalid_dat(format!("Line {}: {err}", line_no + 1))
                })?);
            }
            (None, value) if key == "name" => machine.name = value.into_text(),
            (None, value) => apply_machine_field(machine, &key, value.into_text()),
        }
    }

    if in_block.is_some() {
        return Err(DatError::invalid_dat("Unterminated block at end of file"));
    }

    if dat.header.name.is_empty() && dat.items.is_empty() {
        return Err(DatError::invalid_dat(
            "No header or games found in ClrMamePro DAT file",
        ));
    }

    Ok(dat)
}

/// Value half of a ClrMamePro line.
#[derive(Debug, PartialEq)]
enum ClrValue {
    /// `key "text"` or `key text`
    Text(String),
    /// `key ( ... )`: the content between the outer parens
    Group(String),
}

impl ClrValue {
    fn into_text(self) -> String {
        match self {
            Self::Text(s) | Self::Group(s) => s,
        }
    }
}

/// Detect a block start like `clrmamepro (` or `game (`.
fn detect_block_start(line: &str) -> Option<String> {
    let block_type = line.trim_end().strip_suffix('(')?.trim();
    if !block_type.is_empty() && block_type.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Some(block_type.to_lowercase());
    }
    None
}

/// Parse a key-value line like `name "Some Value"`, `version 20240101`, or
/// `rom ( name x size 1 )`.
fn parse_kv(line: &str) -> Option<(String, ClrValue)> {
    let mut parts = line.trim().splitn(2, |c: char| c.is_ascii_whitespace());
    let key = parts.next()?.trim().to_lowercase();
    let raw_value = parts.next()?.trim();

    if let Some(inner) = raw_value
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return Some((key, ClrValue::Group(inner.trim().to_string())));
    }

    let value = raw_value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw_value);
    Some((key, ClrValue::Text(value.to_string())))
}

/// Pair up `key value key value ...` tokens. A trailing key without a
/// value is dropped.
fn tokens_to_attrs(tokens: &[String]) -> Attrs {
    let mut attrs = Attrs::new();
    for pair in tokens.chunks_exact(2) {
        attrs.push(pair[0].to_lowercase(), pair[1].clone());
    }
    attrs
}

/// Tokenize an item line, respecting quoted strings.
/// `name "Game (Region).ext" size 12345 crc AB` → ["name", "Game (Region).ext", "size", "12345", "crc", "AB"]
fn tokenize_line(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    loop {
        while chars.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            chars.next();
        }

        if chars.peek().is_none() {
            break;
        }

        let mut token = String::new();
        if chars.peek() == Some(&'"') {
            chars.next();
            for c in chars.by_ref() {
                if c == '"' {
                    break;
                }
                token.push(c);
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_ascii_whitespace() {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    tokens
}

#[cfg(test)]
#[path = "tests/dat_tests.rs"]
mod tests;
