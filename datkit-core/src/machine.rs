use serde::Serialize;

/// A set/game entry in a DAT file.
///
/// Every catalog item owns its own copy. Copying identity from one item to
/// another always clones; machines are never shared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Machine {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Parent set this machine is a clone of
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_of: Option<String>,
    /// Set whose ROMs this machine shares
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rom_of: Option<String>,
    /// Set whose samples this machine shares
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_of: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_bios: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_device: bool,
}

impl Machine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn with_clone_of(mut self, parent: impl Into<String>) -> Self {
        self.clone_of = Some(parent.into());
        self
    }

    pub fn with_rom_of(mut self, parent: impl Into<String>) -> Self {
        self.rom_of = Some(parent.into());
        self
    }

    /// Whether `name` is this machine's parent, either as `cloneof` or
    /// `romof`.
    pub fn is_child_of(&self, name: &str) -> bool {
        self.clone_of.as_deref() == Some(name) || self.rom_of.as_deref() == Some(name)
    }
}

/// Provenance of a catalog item: which input it came from.
///
/// Lower `index` values are preferred when duplicate metadata is reconciled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Source {
    pub index: usize,
    pub name: String,
}

impl Source {
    pub fn new(index: usize, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}
