//! Core catalog types shared by every datkit crate.
//!
//! - [`HashRecord`]: size plus optional digests, length-checked
//! - [`Machine`] / [`Source`]: set identity and provenance
//! - [`DatItem`]: one catalog entry, a closed sum over [`ItemKind`]s

pub mod error;
pub mod hash;
pub mod item;
pub mod machine;
pub mod util;

pub use error::CoreError;
pub use hash::{HashKind, HashKindParseError, HashRecord, conditional_hash_equals};
pub use item::{
    Adjuster, Archive, BiosSet, Chip, Configuration, DatItem, DeviceRef, DipSwitch, Disk, Display,
    Driver, DupeType, Feature, Info, ItemKind, ItemStatus, ItemType, Media, Port, RamOption,
    Release, Rom, Sample, SharedFeature, Slot, SoftwareList, Sound,
};
pub use machine::{Machine, Source};
