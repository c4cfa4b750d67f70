//! Deduplication engine for datkit.
//!
//! Items are grouped into buckets by a derived key ([`bucket`]), duplicates
//! in each bucket are merged ([`merge`]), and the survivors are regrouped by
//! machine so their names can be made unique ([`resolve`]). [`dedupe`] runs
//! the whole pipeline across a [`worker_pool`].

pub mod bucket;
pub mod dedupe;
pub mod dupe;
pub mod error;
pub mod merge;
pub mod resolve;
pub mod settings;
pub mod worker_pool;

pub use bucket::{BucketIndex, BucketKey, BucketKeyParseError, NO_KEY, key_for};
pub use dedupe::{
    DedupeOptions, DedupeReport, DedupeScope, DedupeScopeParseError, DedupeStats, dedupe,
    dedupe_blocking, default_workers, scoped_key,
};
pub use dupe::{duplicate_status, is_duplicate};
pub use error::{DedupeError, SettingsError};
pub use merge::{MergeOutcome, merge, merge_soft, reduce};
pub use resolve::{ResolveOutcome, compare_items, resolve, resolve_names};
pub use settings::{DedupeSettings, Settings, settings_path};
pub use worker_pool::WorkerPool;
