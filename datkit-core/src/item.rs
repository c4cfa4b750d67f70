//! Catalog items: the closed set of entry kinds a DAT machine can hold.
//!
//! A [`DatItem`] pairs a kind-specific payload ([`ItemKind`]) with the
//! machine and source it belongs to. Only `Rom`, `Disk`, and `Media` carry
//! a [`HashRecord`]; every other kind is plain metadata compared field by
//! field.

use serde::Serialize;

use crate::hash::{HashKind, HashRecord};
use crate::machine::{Machine, Source};

/// Dump status of a ROM or disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    None,
    Good,
    BadDump,
    /// No known-good dump exists; the item carries no digests
    Nodump,
    Verified,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Good => "good",
            Self::BadDump => "baddump",
            Self::Nodump => "nodump",
            Self::Verified => "verified",
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "good" => Ok(Self::Good),
            "baddump" => Ok(Self::BadDump),
            "nodump" => Ok(Self::Nodump),
            "verified" => Ok(Self::Verified),
            other => Err(format!("unknown item status: '{other}'")),
        }
    }
}

bitflags::bitflags! {
    /// Result of classifying two duplicate items.
    ///
    /// Exactly one of `INTERNAL`/`EXTERNAL` and one of `HASH`/`ALL` is set
    /// once an item has been merged; empty means "not compared".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DupeType: u8 {
        /// Duplicate found within the same source
        const INTERNAL = 1 << 0;
        /// Duplicate found across different sources
        const EXTERNAL = 1 << 1;
        /// Matched by content only
        const HASH = 1 << 2;
        /// Matched by content, machine name, and item name
        const ALL = 1 << 3;
    }
}

impl Serialize for DupeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

/// Field-less discriminant of [`ItemKind`].
///
/// Declaration order is the sort order used when items are listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Rom,
    Disk,
    Media,
    Adjuster,
    Archive,
    BiosSet,
    Chip,
    Configuration,
    DeviceRef,
    DipSwitch,
    Display,
    Driver,
    Feature,
    Info,
    Port,
    RamOption,
    Release,
    Sample,
    SharedFeature,
    Slot,
    SoftwareList,
    Sound,
}

const ALL_ITEM_TYPES: &[ItemType] = &[
    ItemType::Rom,
    ItemType::Disk,
    ItemType::Media,
    ItemType::Adjuster,
    ItemType::Archive,
    ItemType::BiosSet,
    ItemType::Chip,
    ItemType::Configuration,
    ItemType::DeviceRef,
    ItemType::DipSwitch,
    ItemType::Display,
    ItemType::Driver,
    ItemType::Feature,
    ItemType::Info,
    ItemType::Port,
    ItemType::RamOption,
    ItemType::Release,
    ItemType::Sample,
    ItemType::SharedFeature,
    ItemType::Slot,
    ItemType::SoftwareList,
    ItemType::Sound,
];

impl ItemType {
    /// Element name used in Logiqx-style XML.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Rom => "rom",
            Self::Disk => "disk",
            Self::Media => "media",
            Self::Adjuster => "adjuster",
            Self::Archive => "archive",
            Self::BiosSet => "biosset",
            Self::Chip => "chip",
            Self::Configuration => "configuration",
            Self::DeviceRef => "device_ref",
            Self::DipSwitch => "dipswitch",
            Self::Display => "display",
            Self::Driver => "driver",
            Self::Feature => "feature",
            Self::Info => "info",
            Self::Port => "port",
            Self::RamOption => "ramoption",
            Self::Release => "release",
            Self::Sample => "sample",
            Self::SharedFeature => "sharedfeat",
            Self::Slot => "slot",
            Self::SoftwareList => "softwarelist",
            Self::Sound => "sound",
        }
    }

    /// Look up a type by its XML element name (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lower = tag.to_lowercase();
        ALL_ITEM_TYPES.iter().copied().find(|t| t.tag() == lower)
    }

    /// Stable ordinal used by the item sort order.
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Whether items of this type carry a [`HashRecord`].
    pub fn has_hash(&self) -> bool {
        matches!(self, Self::Rom | Self::Disk | Self::Media)
    }

    /// Digest kinds this type may carry.
    pub fn hash_kinds(&self) -> &'static [HashKind] {
        match self {
            Self::Rom => HashKind::all(),
            Self::Disk => &[HashKind::Md5, HashKind::Sha1],
            Self::Media => &[
                HashKind::Md5,
                HashKind::Sha1,
                HashKind::Sha256,
                HashKind::SpamSum,
            ],
            _ => &[],
        }
    }

    pub fn all() -> &'static [ItemType] {
        ALL_ITEM_TYPES
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

// -- Hash-bearing payloads --

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Rom {
    pub name: String,
    #[serde(flatten)]
    pub hash: HashRecord,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bios: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

impl Rom {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_hash(mut self, hash: HashRecord) -> Self {
        self.hash = hash;
        self
    }

    pub fn with_status(mut self, status: ItemStatus) -> Self {
        self.status = status;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Disk {
    pub name: String,
    #[serde(flatten)]
    pub hash: HashRecord,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

impl Disk {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Media {
    pub name: String,
    #[serde(flatten)]
    pub hash: HashRecord,
}

// -- Metadata payloads --

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Adjuster {
    pub name: String,
    pub default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Archive {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BiosSet {
    pub name: String,
    pub description: Option<String>,
    pub default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Chip {
    pub name: String,
    pub tag: Option<String>,
    pub chip_type: Option<String>,
    pub clock: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub name: String,
    pub tag: Option<String>,
    pub mask: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DipSwitch {
    pub name: String,
    pub tag: Option<String>,
    pub mask: Option<String>,
}

/// Video output description. Unnamed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Display {
    pub tag: Option<String>,
    pub display_type: Option<String>,
    pub rotate: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Refresh rate as written in the DAT (kept textual for exact equality)
    pub refresh: Option<String>,
}

/// Emulation status. Unnamed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Driver {
    pub status: Option<String>,
    pub emulation: Option<String>,
    pub savestate: Option<String>,
}

/// Known emulation issue. Unnamed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub feature_type: Option<String>,
    pub status: Option<String>,
    pub overall: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Info {
    pub name: String,
    pub value: Option<String>,
}

/// Input port. Unnamed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Port {
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RamOption {
    pub name: String,
    pub default: Option<bool>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Release {
    pub name: String,
    pub region: Option<String>,
    pub language: Option<String>,
    pub date: Option<String>,
    pub default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SharedFeature {
    pub name: String,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SoftwareList {
    pub name: String,
    pub tag: Option<String>,
    pub status: Option<String>,
    pub filter: Option<String>,
}

/// Audio channel count. Unnamed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sound {
    pub channels: Option<u32>,
}

/// Kind-specific payload of a catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Rom(Rom),
    Disk(Disk),
    Media(Media),
    Adjuster(Adjuster),
    Archive(Archive),
    BiosSet(BiosSet),
    Chip(Chip),
    Configuration(Configuration),
    DeviceRef(DeviceRef),
    DipSwitch(DipSwitch),
    Display(Display),
    Driver(Driver),
    Feature(Feature),
    Info(Info),
    Port(Port),
    RamOption(RamOption),
    Release(Release),
    Sample(Sample),
    SharedFeature(SharedFeature),
    Slot(Slot),
    SoftwareList(SoftwareList),
    Sound(Sound),
}

impl ItemKind {
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Rom(_) => ItemType::Rom,
            Self::Disk(_) => ItemType::Disk,
            Self::Media(_) => ItemType::Media,
            Self::Adjuster(_) => ItemType::Adjuster,
            Self::Archive(_) => ItemType::Archive,
            Self::BiosSet(_) => ItemType::BiosSet,
            Self::Chip(_) => ItemType::Chip,
            Self::Configuration(_) => ItemType::Configuration,
            Self::DeviceRef(_) => ItemType::DeviceRef,
            Self::DipSwitch(_) => ItemType::DipSwitch,
            Self::Display(_) => ItemType::Display,
            Self::Driver(_) => ItemType::Driver,
            Self::Feature(_) => ItemType::Feature,
            Self::Info(_) => ItemType::Info,
            Self::Port(_) => ItemType::Port,
            Self::RamOption(_) => ItemType::RamOption,
            Self::Release(_) => ItemType::Release,
            Self::Sample(_) => ItemType::Sample,
            Self::SharedFeature(_) => ItemType::SharedFeature,
            Self::Slot(_) => ItemType::Slot,
            Self::SoftwareList(_) => ItemType::SoftwareList,
            Self::Sound(_) => ItemType::Sound,
        }
    }

    /// Item name, or `None` for kinds that have no name.
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            Self::Rom(r) => &r.name,
            Self::Disk(d) => &d.name,
            Self::Media(m) => &m.name,
            Self::Adjuster(a) => &a.name,
            Self::Archive(a) => &a.name,
            Self::BiosSet(b) => &b.name,
            Self::Chip(c) => &c.name,
            Self::Configuration(c) => &c.name,
            Self::DeviceRef(d) => &d.name,
            Self::DipSwitch(d) => &d.name,
            Self::Info(i) => &i.name,
            Self::RamOption(r) => &r.name,
            Self::Release(r) => &r.name,
            Self::Sample(s) => &s.name,
            Self::SharedFeature(s) => &s.name,
            Self::Slot(s) => &s.name,
            Self::SoftwareList(s) => &s.name,
            Self::Display(_) | Self::Driver(_) | Self::Feature(_) | Self::Port(_) | Self::Sound(_) => {
                return None;
            }
        };
        Some(name)
    }

    /// Replace the item name. Unnamed kinds are left untouched.
    pub fn set_name(&mut self, new_name: impl Into<String>) {
        let slot = match self {
            Self::Rom(r) => &mut r.name,
            Self::Disk(d) => &mut d.name,
            Self::Media(m) => &mut m.name,
            Self::Adjuster(a) => &mut a.name,
            Self::Archive(a) => &mut a.name,
            Self::BiosSet(b) => &mut b.name,
            Self::Chip(c) => &mut c.name,
            Self::Configuration(c) => &mut c.name,
            Self::DeviceRef(d) => &mut d.name,
            Self::DipSwitch(d) => &mut d.name,
            Self::Info(i) => &mut i.name,
            Self::RamOption(r) => &mut r.name,
            Self::Release(r) => &mut r.name,
            Self::Sample(s) => &mut s.name,
            Self::SharedFeature(s) => &mut s.name,
            Self::Slot(s) => &mut s.name,
            Self::SoftwareList(s) => &mut s.name,
            Self::Display(_) | Self::Driver(_) | Self::Feature(_) | Self::Port(_) | Self::Sound(_) => {
                return;
            }
        };
        *slot = new_name.into();
    }

    pub fn hash(&self) -> Option<&HashRecord> {
        match self {
            Self::Rom(r) => Some(&r.hash),
            Self::Disk(d) => Some(&d.hash),
            Self::Media(m) => Some(&m.hash),
            _ => None,
        }
    }

    pub fn hash_mut(&mut self) -> Option<&mut HashRecord> {
        match self {
            Self::Rom(r) => Some(&mut r.hash),
            Self::Disk(d) => Some(&mut d.hash),
            Self::Media(m) => Some(&mut m.hash),
            _ => None,
        }
    }

    /// Dump status; kinds without a status report `ItemStatus::None`.
    pub fn status(&self) -> ItemStatus {
        match self {
            Self::Rom(r) => r.status,
            Self::Disk(d) => d.status,
            _ => ItemStatus::None,
        }
    }
}

/// One entry of a catalog: a payload plus the machine and source it
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatItem {
    #[serde(flatten)]
    pub kind: ItemKind,
    pub machine: Machine,
    pub source: Source,
    /// Set by the merge pass; empty until then
    #[serde(skip_serializing_if = "DupeType::is_empty")]
    pub dupe_type: DupeType,
    /// Soft-delete flag: writers skip items with this set
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub remove: bool,
}

impl DatItem {
    pub fn new(kind: ItemKind, machine: Machine, source: Source) -> Self {
        Self {
            kind,
            machine,
            source,
            dupe_type: DupeType::empty(),
            remove: false,
        }
    }

    pub fn item_type(&self) -> ItemType {
        self.kind.item_type()
    }

    pub fn name(&self) -> Option<&str> {
        self.kind.name()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.kind.set_name(name);
    }

    pub fn hash(&self) -> Option<&HashRecord> {
        self.kind.hash()
    }

    pub fn hash_mut(&mut self) -> Option<&mut HashRecord> {
        self.kind.hash_mut()
    }

    pub fn status(&self) -> ItemStatus {
        self.kind.status()
    }

    /// A Nodump ROM or disk. These are never merged away.
    pub fn is_nodump(&self) -> bool {
        matches!(self.kind, ItemKind::Rom(_) | ItemKind::Disk(_))
            && self.status() == ItemStatus::Nodump
    }
}

#[cfg(test)]
#[path = "tests/item_tests.rs"]
mod tests;
