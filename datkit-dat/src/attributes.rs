//! Mapping between DAT attribute lists and typed item payloads.
//!
//! Both dialects (Logiqx XML and ClrMamePro) reduce an item entry to a list
//! of `key=value` pairs, so one table drives parsing and writing for every
//! item kind.

use std::str::FromStr;

use datkit_core::{
    Adjuster, Archive, BiosSet, Chip, Configuration, DeviceRef, DipSwitch, Disk, Display, Driver,
    Feature, HashRecord, Info, ItemKind, ItemStatus, ItemType, Media, Port, RamOption,
    Release, Rom, Sample, SharedFeature, Slot, SoftwareList, Sound,
};

use crate::error::DatError;

/// Attribute list of one DAT entry, in document order.
#[derive(Debug, Clone, Default)]
pub struct Attrs(Vec<(String, String)>);

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// First value for `key` (case-insensitive key match).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    fn string(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| !v.is_empty()).map(str::to_string)
    }

    /// `yes`/`no` (or `true`/`false`) flag.
    fn flag(&self, key: &str) -> Option<bool> {
        match self.get(key)?.to_lowercase().as_str() {
            "yes" | "true" | "1" => Some(true),
            "no" | "false" | "0" => Some(false),
            other => {
                log::warn!("Ignoring unrecognized {key} flag '{other}'");
                None
            }
        }
    }

    fn number<T: FromStr>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match raw.trim().parse() {
            Ok(n) => Some(n),
            Err(_) => {
                log::warn!("Ignoring non-numeric {key} '{raw}'");
                None
            }
        }
    }

    fn name(&self, item_type: ItemType) -> Result<String, DatError> {
        self.string("name")
            .ok_or_else(|| DatError::invalid_dat(format!("<{}> entry without a name", item_type)))
    }
}

/// Build a typed payload for `item_type` from its attributes.
///
/// A missing name on a named kind, or an unparseable `size` on a
/// hash-bearing kind, rejects the entry. A malformed digest is logged and
/// left absent so the rest of the entry survives.
pub fn build_kind(item_type: ItemType, attrs: &Attrs) -> Result<ItemKind, DatError> {
    let kind = match item_type {
        ItemType::Rom => {
            let name = attrs.name(item_type)?;
            let status = parse_status(attrs);
            let hash = parse_hash(item_type, attrs, &name, status)?;
            ItemKind::Rom(Rom {
                hash,
                status,
                merge_tag: attrs.string("merge"),
                region: attrs.string("region"),
                date: attrs.string("date"),
                bios: attrs.string("bios"),
                optional: attrs.flag("optional"),
                name,
            })
        }
        ItemType::Disk => {
            let name = attrs.name(item_type)?;
            let status = parse_status(attrs);
            let hash = parse_hash(item_type, attrs, &name, status)?;
            ItemKind::Disk(Disk {
                hash,
                status,
                merge_tag: attrs.string("merge"),
                region: attrs.string("region"),
                index: attrs.string("index"),
                writable: attrs.flag("writable"),
                optional: attrs.flag("optional"),
                name,
            })
        }
        ItemType::Media => {
            let name = attrs.name(item_type)?;
            let hash = parse_hash(item_type, attrs, &name, ItemStatus::None)?;
            ItemKind::Media(Media { name, hash })
        }
        ItemType::Adjuster => ItemKind::Adjuster(Adjuster {
            name: attrs.name(item_type)?,
            default: attrs.flag("default"),
        }),
        ItemType::Archive => ItemKind::Archive(Archive {
            name: attrs.name(item_type)?,
        }),
        ItemType::BiosSet => ItemKind::BiosSet(BiosSet {
            name: attrs.name(item_type)?,
            description: attrs.string("description"),
            default: attrs.flag("default"),
        }),
        ItemType::Chip => ItemKind::Chip(Chip {
            name: attrs.name(item_type)?,
            tag: attrs.string("tag"),
            chip_type: attrs.string("type"),
            clock: attrs.number("clock"),
        }),
        ItemType::Configuration => ItemKind::Configuration(Configuration {
            name: attrs.name(item_type)?,
            tag: attrs.string("tag"),
            mask: attrs.string("mask"),
        }),
        ItemType::DeviceRef => ItemKind::DeviceRef(DeviceRef {
            name: attrs.name(item_type)?,
        }),
        ItemType::DipSwitch => ItemKind::DipSwitch(DipSwitch {
            name: attrs.name(item_type)?,
            tag: attrs.string("tag"),
            mask: attrs.string("mask"),
        }),
        ItemType::Display => ItemKind::Display(Display {
            tag: attrs.string("tag"),
            display_type: attrs.string("type"),
            rotate: attrs.number("rotate"),
            width: attrs.number("width"),
            height: attrs.number("height"),
            refresh: attrs.string("refresh"),
        }),
        ItemType::Driver => ItemKind::Driver(Driver {
            status: attrs.string("status"),
            emulation: attrs.string("emulation"),
            savestate: attrs.string("savestate"),
        }),
        ItemType::Feature => ItemKind::Feature(Feature {
            feature_type: attrs.string("type"),
            status: attrs.string("status"),
            overall: attrs.string("overall"),
        }),
        ItemType::Info => ItemKind::Info(Info {
            name: attrs.name(item_type)?,
            value: attrs.string("value"),
        }),
        ItemType::Port => ItemKind::Port(Port {
            tag: attrs.string("tag"),
        }),
        ItemType::RamOption => ItemKind::RamOption(RamOption {
            name: attrs.name(item_type)?,
            default: attrs.flag("default"),
            content: attrs.string("content"),
        }),
        ItemType::Release => ItemKind::Release(Release {
            name: attrs.name(item_type)?,
            region: attrs.string("region"),
            language: attrs.string("language"),
            date: attrs.string("date"),
            default: attrs.flag("default"),
        }),
        ItemType::Sample => ItemKind::Sample(Sample {
            name: attrs.name(item_type)?,
        }),
        ItemType::SharedFeature => ItemKind::SharedFeature(SharedFeature {
            name: attrs.name(item_type)?,
            value: attrs.string("value"),
        }),
        ItemType::Slot => ItemKind::Slot(Slot {
            name: attrs.name(item_type)?,
        }),
        ItemType::SoftwareList => ItemKind::SoftwareList(SoftwareList {
            name: attrs.name(item_type)?,
            tag: attrs.string("tag"),
            status: attrs.string("status"),
            filter: attrs.string("filter"),
        }),
        ItemType::Sound => ItemKind::Sound(Sound {
            channels: attrs.number("channels"),
        }),
    };
    Ok(kind)
}

fn parse_status(attrs: &Attrs) -> ItemStatus {
    // ClrMamePro spells it `flags`
    let raw = attrs.get("status").or_else(|| attrs.get("flags"));
    match raw.map(str::parse::<ItemStatus>) {
        Some(Ok(status)) => status,
        Some(Err(e)) => {
            log::warn!("{e}, treating as none");
            ItemStatus::None
        }
        None => ItemStatus::None,
    }
}

fn parse_hash(
    item_type: ItemType,
    attrs: &Attrs,
    name: &str,
    status: ItemStatus,
) -> Result<HashRecord, DatError> {
    let mut hash = HashRecord::new();
    if let Some(raw) = attrs.get("size").filter(|s| !s.trim().is_empty()) {
        let size = raw
            .trim()
            .parse()
            .map_err(|_| DatError::invalid_dat(format!("Invalid size for {name}: {raw}")))?;
        hash.size = Some(size);
    }

    // Nodump entries carry no digests even when the DAT lists placeholders
    if status == ItemStatus::Nodump {
        return Ok(hash);
    }

    for &kind in item_type.hash_kinds() {
        if let Some(text) = attrs.get(kind.name()) {
            if let Err(e) = hash.set_text(kind, text) {
                log::warn!("Ignoring malformed {kind} on {name}: {e}");
            }
        }
    }
    Ok(hash)
}

/// Attribute list for writing `kind`, in the conventional Logiqx order.
///
/// Absent optional fields are omitted.
pub fn item_attributes(kind: &ItemKind) -> Vec<(&'static str, String)> {
    let mut out = AttrList::default();
    match kind {
        ItemKind::Rom(r) => {
            out.put("name", &r.name);
            out.hash(&r.hash);
            out.opt("merge", &r.merge_tag);
            out.opt("region", &r.region);
            out.opt("date", &r.date);
            out.opt("bios", &r.bios);
            out.status(r.status);
            out.flag("optional", r.optional);
        }
        ItemKind::Disk(d) => {
            out.put("name", &d.name);
            out.hash(&d.hash);
            out.opt("merge", &d.merge_tag);
            out.opt("region", &d.region);
            out.opt("index", &d.index);
            out.flag("writable", d.writable);
            out.status(d.status);
            out.flag("optional", d.optional);
        }
        ItemKind::Media(m) => {
            out.put("name", &m.name);
            out.hash(&m.hash);
        }
        ItemKind::Adjuster(a) => {
            out.put("name", &a.name);
            out.flag("default", a.default);
        }
        ItemKind::Archive(a) => out.put("name", &a.name),
        ItemKind::BiosSet(b) => {
            out.put("name", &b.name);
            out.opt("description", &b.description);
            out.flag("default", b.default);
        }
        ItemKind::Chip(c) => {
            out.put("name", &c.name);
            out.opt("tag", &c.tag);
            out.opt("type", &c.chip_type);
            out.num("clock", c.clock);
        }
        ItemKind::Configuration(c) => {
            out.put("name", &c.name);
            out.opt("tag", &c.tag);
            out.opt("mask", &c.mask);
        }
        ItemKind::DeviceRef(d) => out.put("name", &d.name),
        ItemKind::DipSwitch(d) => {
            out.put("name", &d.name);
            out.opt("tag", &d.tag);
            out.opt("mask", &d.mask);
        }
        ItemKind::Display(d) => {
            out.opt("tag", &d.tag);
            out.opt("type", &d.display_type);
            out.num("rotate", d.rotate);
            out.num("width", d.width);
            out.num("height", d.height);
            out.opt("refresh", &d.refresh);
        }
        ItemKind::Driver(d) => {
            out.opt("status", &d.status);
            out.opt("emulation", &d.emulation);
            out.opt("savestate", &d.savestate);
        }
        ItemKind::Feature(f) => {
            out.opt("type", &f.feature_type);
            out.opt("status", &f.status);
            out.opt("overall", &f.overall);
        }
        ItemKind::Info(i) => {
            out.put("name", &i.name);
            out.opt("value", &i.value);
        }
        ItemKind::Port(p) => out.opt("tag", &p.tag),
        ItemKind::RamOption(r) => {
            out.put("name", &r.name);
            out.flag("default", r.default);
            out.opt("content", &r.content);
        }
        ItemKind::Release(r) => {
            out.put("name", &r.name);
            out.opt("region", &r.region);
            out.opt("language", &r.language);
            out.opt("date", &r.date);
            out.flag("default", r.default);
        }
        ItemKind::Sample(s) => out.put("name", &s.name),
        ItemKind::SharedFeature(s) => {
            out.put("name", &s.name);
            out.opt("value", &s.value);
        }
        ItemKind::Slot(s) => out.put("name", &s.name),
        ItemKind::SoftwareList(s) => {
            out.put("name", &s.name);
            out.opt("tag", &s.tag);
            out.opt("status", &s.status);
            out.opt("filter", &s.filter);
        }
        ItemKind::Sound(s) => out.num("channels", s.channels),
    }
    out.0
}

#[derive(Default)]
struct AttrList(Vec<(&'static str, String)>);

impl AttrList {
    fn put(&mut self, key: &'static str, value: &str) {
        self.0.push((key, value.to_string()));
    }

    fn opt(&mut self, key: &'static str, value: &Option<String>) {
        if let Some(v) = value {
            self.put(key, v);
        }
    }

    fn flag(&mut self, key: &'static str, value: Option<bool>) {
        if let Some(b) = value {
            self.put(key, if b { "yes" } else { "no" });
        }
    }

    fn num<T: ToString>(&mut self, key: &'static str, value: Option<T>) {
        if let Some(n) = value {
            self.0.push((key, n.to_string()));
        }
    }

    fn status(&mut self, status: ItemStatus) {
        if status != ItemStatus::None {
            self.put("status", status.as_str());
        }
    }

    fn hash(&mut self, hash: &HashRecord) {
        self.num("size", hash.size);
        for kind in hash.kinds() {
            if let Some(text) = hash.text(kind) {
                self.0.push((kind.name(), text));
            }
        }
    }
}
