//! DAT output: Logiqx XML and JSON.
//!
//! Both writers take items already grouped by machine (consecutive items
//! with the same machine name form one `<game>`/`<machine>` entry).

use std::io::Write;
use std::path::Path;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use serde::Serialize;

use datkit_core::{DatItem, Machine};

use crate::attributes::item_attributes;
use crate::dat::DatHeader;
use crate::error::DatError;

/// Write items as a Logiqx XML datafile.
///
/// Items flagged `remove` are skipped. A new machine element starts
/// whenever the machine name changes.
pub fn write_logiqx<W: Write>(out: W, header: &DatHeader, items: &[DatItem]) -> Result<(), DatError> {
    let mut xml = Writer::new_with_indent(out, b'\t', 1);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.write_event(Event::DocType(BytesText::from_escaped(
        r#"datafile PUBLIC "-//Logiqx//DTD ROM Management Datafile//EN" "http://www.logiqx.com/Dats/datafile.dtd""#,
    )))?;
    xml.write_event(Event::Start(BytesStart::new("datafile")))?;

    write_header(&mut xml, header)?;

    let mut open: Option<&str> = None;
    let mut written = 0usize;
    for item in items.iter().filter(|i| !i.remove) {
        if open != Some(item.machine.name.as_str()) {
            if open.is_some() {
                xml.write_event(Event::End(BytesEnd::new("machine")))?;
            }
            write_machine_start(&mut xml, &item.machine)?;
            open = Some(item.machine.name.as_str());
        }

        let tag = item.item_type().tag();
        let attrs = item_attributes(&item.kind);
        let element = BytesStart::new(tag).with_attributes(
            attrs.iter().map(|(k, v)| (*k, v.as_str())),
        );
        xml.write_event(Event::Empty(element))?;
        written += 1;
    }
    if open.is_some() {
        xml.write_event(Event::End(BytesEnd::new("machine")))?;
    }

    xml.write_event(Event::End(BytesEnd::new("datafile")))?;
    let mut out = xml.into_inner();
    out.write_all(b"\n")?;
    out.flush()?;
    log::debug!("Wrote {written} items as Logiqx XML");
    Ok(())
}

fn write_text_element<W: Write>(
    xml: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), DatError> {
    xml.write_event(Event::Start(BytesStart::new(tag)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_header<W: Write>(xml: &mut Writer<W>, header: &DatHeader) -> Result<(), DatError> {
    xml.write_event(Event::Start(BytesStart::new("header")))?;
    write_text_element(xml, "name", &header.name)?;
    write_text_element(xml, "description", &header.description)?;
    if !header.version.is_empty() {
        write_text_element(xml, "version", &header.version)?;
    }
    for (tag, value) in [
        ("date", &header.date),
        ("author", &header.author),
        ("homepage", &header.homepage),
    ] {
        if let Some(value) = value {
            write_text_element(xml, tag, value)?;
        }
    }
    xml.write_event(Event::End(BytesEnd::new("header")))?;
    Ok(())
}

fn write_machine_start<W: Write>(xml: &mut Writer<W>, machine: &Machine) -> Result<(), DatError> {
    let mut start = BytesStart::new("machine");
    start.push_attribute(("name", machine.name.as_str()));
    for (key, value) in [
        ("cloneof", &machine.clone_of),
        ("romof", &machine.rom_of),
        ("sampleof", &machine.sample_of),
    ] {
        if let Some(value) = value {
            start.push_attribute((key, value.as_str()));
        }
    }
    if machine.is_bios {
        start.push_attribute(("isbios", "yes"));
    }
    if machine.is_device {
        start.push_attribute(("isdevice", "yes"));
    }
    xml.write_event(Event::Start(start))?;

    let description = machine.description.as_deref().unwrap_or(&machine.name);
    write_text_element(xml, "description", description)?;
    for (tag, value) in [
        ("year", &machine.year),
        ("manufacturer", &machine.manufacturer),
        ("category", &machine.category),
        ("board", &machine.board),
    ] {
        if let Some(value) = value {
            write_text_element(xml, tag, value)?;
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonDat<'a> {
    header: &'a DatHeader,
    machines: Vec<JsonMachine<'a>>,
}

#[derive(Serialize)]
struct JsonMachine<'a> {
    #[serde(flatten)]
    machine: &'a Machine,
    items: Vec<&'a DatItem>,
}

/// Write items as pretty JSON grouped by machine.
///
/// Unlike the XML writer, removed items are kept (with `"remove": true`)
/// so a soft-deleted merge can be inspected.
pub fn write_json<W: Write>(mut out: W, header: &DatHeader, items: &[DatItem]) -> Result<(), DatError> {
    let mut machines: Vec<JsonMachine<'_>> = Vec::new();
    for item in items {
        match machines.last_mut() {
            Some(group) if group.machine.name == item.machine.name => group.items.push(item),
            _ => machines.push(JsonMachine {
                machine: &item.machine,
                items: vec![item],
            }),
        }
    }
    serde_json::to_writer_pretty(&mut out, &JsonDat { header, machines })?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

/// Output dialect for [`write_dat_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Logiqx,
    Json,
}

/// Write items to `path` in the given format, replacing any existing file.
pub fn write_dat_file(
    path: &Path,
    format: OutputFormat,
    header: &DatHeader,
    items: &[DatItem],
) -> Result<(), DatError> {
    let file = std::io::BufWriter::new(std::fs::File::create(path)?);
    match format {
        OutputFormat::Logiqx => write_logiqx(file, header, items),
        OutputFormat::Json => write_json(file, header, items),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dat::parse_dat;
    use datkit_core::{HashKind, HashRecord, ItemKind, Rom, Sample, Source};

    fn item(machine: &str, kind: ItemKind) -> DatItem {
        DatItem::new(kind, Machine::new(machine), Source::new(0, "a.dat"))
    }

    fn rom(machine: &str, name: &str, crc: &str) -> DatItem {
        let hash = HashRecord::new()
            .with_size(4)
            .with_text(HashKind::Crc, crc)
            .unwrap();
        item(machine, ItemKind::Rom(Rom::new(name).with_hash(hash)))
    }

    fn render_xml(items: &[DatItem]) -> String {
        let mut out = Vec::new();
        write_logiqx(&mut out, &DatHeader::new("Test"), items).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_logiqx_groups_by_machine() {
        let items = vec![
            rom("alpha", "a.bin", "00000001"),
            rom("alpha", "b.bin", "00000002"),
            rom("beta", "c.bin", "00000003"),
        ];
        let xml = render_xml(&items);
        assert_eq!(xml.matches("<machine ").count(), 2);
        assert!(xml.contains(r#"<rom name="a.bin" size="4" crc="00000001"/>"#));
        assert!(xml.contains("<description>alpha</description>"));
    }

    #[test]
    fn test_logiqx_skips_removed_items() {
        let mut gone = rom("alpha", "gone.bin", "00000009");
        gone.remove = true;
        let items = vec![rom("alpha", "kept.bin", "00000001"), gone];
        let xml = render_xml(&items);
        assert!(xml.contains("kept.bin"));
        assert!(!xml.contains("gone.bin"));
    }

    #[test]
    fn test_logiqx_escapes_names() {
        let items = vec![item("Tom & Jerry", ItemKind::Sample(Sample { name: "a<b".into() }))];
        let xml = render_xml(&items);
        assert!(xml.contains(r#"name="Tom &amp; Jerry""#));
        assert!(xml.contains(r#"name="a&lt;b""#));
    }

    #[test]
    fn test_logiqx_output_parses_back() {
        let mut parent = rom("child", "a.bin", "deadbeef");
        parent.machine.clone_of = Some("parent".into());
        let items = vec![parent, rom("other", "b.bin", "00000001")];
        let xml = render_xml(&items);

        let dat = parse_dat(xml.as_bytes(), &Source::new(0, "a.dat")).unwrap();
        assert_eq!(dat.header.name, "Test");
        assert_eq!(dat.items.len(), 2);
        assert_eq!(dat.items[0].machine.clone_of.as_deref(), Some("parent"));
        assert_eq!(dat.items[0].machine.description.as_deref(), Some("child"));
        assert_eq!(dat.items[0].kind, items[0].kind);
    }

    #[test]
    fn test_json_keeps_removed_items() {
        let mut gone = rom("alpha", "gone.bin", "00000009");
        gone.remove = true;
        let items = vec![rom("alpha", "kept.bin", "00000001"), gone];
        let mut out = Vec::new();
        write_json(&mut out, &DatHeader::new("Test"), &items).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let machines = value["machines"].as_array().unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0]["name"], "alpha");
        let json_items = machines[0]["items"].as_array().unwrap();
        assert_eq!(json_items.len(), 2);
        assert_eq!(json_items[0]["type"], "rom");
        assert_eq!(json_items[0]["crc"], "00000001");
        assert_eq!(json_items[1]["remove"], true);
    }
}
