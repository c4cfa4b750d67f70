//! Bucketing index: groups catalog items under a derived string key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use datkit_core::{DatItem, HashKind};

/// Key used for items that have nothing to key on.
pub const NO_KEY: &str = "-1";

/// How an item's bucket key is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BucketKey {
    Crc,
    Md5,
    Sha1,
    Sha256,
    Size,
    Machine,
    /// CRC, else MD5, else SHA1, else size
    #[default]
    Best,
}

impl BucketKey {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Crc => "crc",
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Size => "size",
            Self::Machine => "machine",
            Self::Best => "best",
        }
    }

    fn digest(&self) -> Option<HashKind> {
        match self {
            Self::Crc => Some(HashKind::Crc),
            Self::Md5 => Some(HashKind::Md5),
            Self::Sha1 => Some(HashKind::Sha1),
            Self::Sha256 => Some(HashKind::Sha256),
            _ => None,
        }
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Error returned when a string cannot be parsed into a `BucketKey`.
#[derive(Debug, Clone)]
pub struct BucketKeyParseError(pub String);

impl std::fmt::Display for BucketKeyParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown bucket key: '{}' (expected crc, md5, sha1, sha256, size, machine or best)",
            self.0
        )
    }
}

impl std::error::Error for BucketKeyParseError {}

impl std::str::FromStr for BucketKey {
    type Err = BucketKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "crc" | "crc32" => Ok(Self::Crc),
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "size" => Ok(Self::Size),
            "machine" | "game" => Ok(Self::Machine),
            "best" | "default" => Ok(Self::Best),
            _ => Err(BucketKeyParseError(s.to_string())),
        }
    }
}

/// Derive the bucket key of `item`.
///
/// An explicit digest key falls back to the `Best` derivation when the
/// item lacks that digest, so every item lands in some bucket.
pub fn key_for(item: &DatItem, key: BucketKey) -> String {
    if key == BucketKey::Machine {
        return item.machine.name.clone();
    }
    let Some(hash) = item.hash() else {
        return NO_KEY.to_string();
    };
    if key == BucketKey::Size {
        return hash.size.map_or_else(|| NO_KEY.to_string(), |s| s.to_string());
    }
    if let Some(text) = key.digest().and_then(|kind| hash.text(kind)) {
        return text;
    }
    [HashKind::Crc, HashKind::Md5, HashKind::Sha1]
        .into_iter()
        .find_map(|kind| hash.text(kind))
        .or_else(|| hash.size.map(|s| s.to_string()))
        .unwrap_or_else(|| NO_KEY.to_string())
}

/// Items grouped by key, in sorted key order.
///
/// Items keep their insertion order within a bucket. Lookups never
/// re-key; changing the key function means building a new index with
/// [`rebucket`](Self::rebucket).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketIndex {
    buckets: BTreeMap<String, Vec<DatItem>>,
}

impl BucketIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `items` by `key`.
    pub fn build(items: impl IntoIterator<Item = DatItem>, key: BucketKey) -> Self {
        Self::build_with(items, |item| key_for(item, key))
    }

    /// Index `items` by an arbitrary key function.
    pub fn build_with<F>(items: impl IntoIterator<Item = DatItem>, key_fn: F) -> Self
    where
        F: Fn(&DatItem) -> String,
    {
        let mut index = Self::new();
        for item in items {
            index.insert(key_fn(&item), item);
        }
        index
    }

    /// Re-derive every key with `key`, consuming the old index.
    pub fn rebucket(self, key: BucketKey) -> Self {
        Self::build(self.into_items(), key)
    }

    pub fn insert(&mut self, key: String, item: DatItem) {
        self.buckets.entry(key).or_default().push(item);
    }

    /// Append a whole bucket, extending any existing one.
    pub fn insert_bucket(&mut self, key: String, items: Vec<DatItem>) {
        self.buckets.entry(key).or_default().extend(items);
    }

    pub fn get(&self, key: &str) -> Option<&[DatItem]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DatItem])> {
        self.buckets
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of items across all buckets.
    pub fn item_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// All items, bucket by bucket in key order.
    pub fn into_items(self) -> Vec<DatItem> {
        self.buckets.into_values().flatten().collect()
    }

    pub fn into_buckets(self) -> impl Iterator<Item = (String, Vec<DatItem>)> {
        self.buckets.into_iter()
    }
}

impl FromIterator<(String, Vec<DatItem>)> for BucketIndex {
    fn from_iter<I: IntoIterator<Item = (String, Vec<DatItem>)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (key, items) in iter {
            index.insert_bucket(key, items);
        }
        index
    }
}
