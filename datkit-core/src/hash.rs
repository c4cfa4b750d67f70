use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::CoreError;

/// Digest algorithms a catalog item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashKind {
    /// CRC-32 (4 bytes)
    Crc,
    /// MD5 (16 bytes)
    Md5,
    /// SHA-1 (20 bytes)
    Sha1,
    /// SHA-256 (32 bytes)
    Sha256,
    /// SHA-384 (48 bytes)
    Sha384,
    /// SHA-512 (64 bytes)
    Sha512,
    /// SpamSum fuzzy hash (variable length text)
    SpamSum,
}

const ALL_KINDS: [HashKind; 7] = [
    HashKind::Crc,
    HashKind::Md5,
    HashKind::Sha1,
    HashKind::Sha256,
    HashKind::Sha384,
    HashKind::Sha512,
    HashKind::SpamSum,
];

impl HashKind {
    /// Attribute name used for this digest in DAT files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Crc => "crc",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha384 => "sha384",
            Self::Sha512 => "sha512",
            Self::SpamSum => "spamsum",
        }
    }

    /// Fixed digest length in bytes, or `None` for variable-length digests.
    pub fn byte_len(&self) -> Option<usize> {
        match self {
            Self::Crc => Some(4),
            Self::Md5 => Some(16),
            Self::Sha1 => Some(20),
            Self::Sha256 => Some(32),
            Self::Sha384 => Some(48),
            Self::Sha512 => Some(64),
            Self::SpamSum => None,
        }
    }

    /// All digest kinds, shortest first.
    pub fn all() -> &'static [HashKind] {
        &ALL_KINDS
    }

    fn slot(self) -> usize {
        self as usize
    }

    fn validate(self, bytes: &[u8]) -> Result<(), CoreError> {
        match self.byte_len() {
            Some(expected) if expected != bytes.len() => Err(CoreError::DigestLength {
                kind: self,
                expected,
                actual: bytes.len(),
            }),
            None if bytes.is_empty() => Err(CoreError::EmptyDigest(self)),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for HashKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when a string cannot be parsed into a `HashKind`.
#[derive(Debug, Clone)]
pub struct HashKindParseError(pub String);

impl std::fmt::Display for HashKindParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown hash kind: '{}'", self.0)
    }
}

impl std::error::Error for HashKindParseError {}

impl std::str::FromStr for HashKind {
    type Err = HashKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        match lower.as_str() {
            "crc" | "crc32" => Ok(Self::Crc),
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha384" => Ok(Self::Sha384),
            "sha512" => Ok(Self::Sha512),
            "spamsum" => Ok(Self::SpamSum),
            _ => Err(HashKindParseError(s.to_string())),
        }
    }
}

/// Size and digests identifying a piece of content.
///
/// Every digest is either absent (unknown) or holds exactly the byte length
/// its algorithm produces. Setters enforce this, so a `HashRecord` can never
/// hold a truncated digest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HashRecord {
    /// Content size in bytes, if known
    pub size: Option<u64>,
    digests: [Option<Box<[u8]>>; 7],
}

impl HashRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    /// Builder form of [`set_text`](Self::set_text).
    pub fn with_text(mut self, kind: HashKind, text: &str) -> Result<Self, CoreError> {
        self.set_text(kind, text)?;
        Ok(self)
    }

    /// Raw digest bytes for `kind`, if present.
    pub fn get(&self, kind: HashKind) -> Option<&[u8]> {
        self.digests[kind.slot()].as_deref()
    }

    pub fn has(&self, kind: HashKind) -> bool {
        self.digests[kind.slot()].is_some()
    }

    /// Store a digest, rejecting bytes of the wrong length.
    pub fn set(&mut self, kind: HashKind, bytes: &[u8]) -> Result<(), CoreError> {
        kind.validate(bytes)?;
        self.digests[kind.slot()] = Some(bytes.into());
        Ok(())
    }

    pub fn clear(&mut self, kind: HashKind) {
        self.digests[kind.slot()] = None;
    }

    /// Store a digest from its textual DAT form.
    ///
    /// Fixed-length digests are hex (case-insensitive); SpamSum is kept
    /// verbatim. An empty or all-whitespace string clears the digest.
    pub fn set_text(&mut self, kind: HashKind, text: &str) -> Result<(), CoreError> {
        let text = text.trim();
        if text.is_empty() {
            self.clear(kind);
            return Ok(());
        }
        match kind {
            HashKind::SpamSum => self.set(kind, text.as_bytes()),
            _ => {
                let digits = text
                    .strip_prefix("0x")
                    .or_else(|| text.strip_prefix("0X"))
                    .unwrap_or(text);
                let bytes = hex::decode(digits).map_err(|_| CoreError::invalid_hex(text))?;
                self.set(kind, &bytes)
            }
        }
    }

    /// Textual form of a digest: lowercase hex, or SpamSum text.
    pub fn text(&self, kind: HashKind) -> Option<String> {
        let bytes = self.get(kind)?;
        Some(match kind {
            HashKind::SpamSum => String::from_utf8_lossy(bytes).into_owned(),
            _ => hex::encode(bytes),
        })
    }

    /// Digest kinds present on this record.
    pub fn kinds(&self) -> impl Iterator<Item = HashKind> + '_ {
        HashKind::all().iter().copied().filter(move |k| self.has(*k))
    }

    pub fn has_any_digest(&self) -> bool {
        self.digests.iter().any(Option::is_some)
    }

    /// Digest kinds present on both records.
    pub fn common_kinds<'a>(&'a self, other: &'a HashRecord) -> impl Iterator<Item = HashKind> + 'a {
        self.kinds().filter(move |k| other.has(*k))
    }

    /// Copy every field that is absent here but present on `other`.
    ///
    /// Present values are never overwritten. Returns whether anything was
    /// copied.
    pub fn fill_missing_from(&mut self, other: &HashRecord) -> bool {
        let mut changed = false;
        if self.size.is_none() && other.size.is_some() {
            self.size = other.size;
            changed = true;
        }
        for (mine, theirs) in self.digests.iter_mut().zip(other.digests.iter()) {
            if mine.is_none() && theirs.is_some() {
                *mine = theirs.clone();
                changed = true;
            }
        }
        changed
    }

    /// Drop every digest whose kind is not listed.
    pub fn retain_kinds(&mut self, kinds: &[HashKind]) {
        for &kind in HashKind::all() {
            if !kinds.contains(&kind) {
                self.clear(kind);
            }
        }
    }
}

/// Merge-time digest comparison: absent on either side counts as a match.
pub fn conditional_hash_equals(a: Option<&[u8]>, b: Option<&[u8]>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

impl Serialize for HashRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = usize::from(self.size.is_some()) + self.kinds().count();
        let mut map = serializer.serialize_map(Some(len))?;
        if let Some(size) = self.size {
            map.serialize_entry("size", &size)?;
        }
        for kind in self.kinds() {
            if let Some(text) = self.text(kind) {
                map.serialize_entry(kind.name(), &text)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
#[path = "tests/hash_tests.rs"]
mod tests;
