//! Parallel bucket pipeline: index, merge per bucket, regroup by machine,
//! resolve names per machine.
//!
//! Buckets are independent, so each one is merged on its own blocking task
//! and handed back by value. A bucket whose task panics or times out is
//! logged, counted, and passed through unchanged; the rest of the batch is
//! unaffected.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use datkit_core::DatItem;

use crate::bucket::{BucketIndex, BucketKey, key_for};
use crate::error::DedupeError;
use crate::merge::{MergeOutcome, reduce};
use crate::resolve::{ResolveOutcome, compare_items, resolve};
use crate::worker_pool::WorkerPool;

/// Per-bucket timeout, below the worker pool's safety net.
const BUCKET_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Whether duplicates are looked for across machines or only within one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupeScope {
    #[default]
    Full,
    Machine,
}

impl std::fmt::Display for DedupeScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Machine => write!(f, "machine"),
        }
    }
}

/// Error returned when a string cannot be parsed into a `DedupeScope`.
#[derive(Debug, Clone)]
pub struct DedupeScopeParseError(pub String);

impl std::fmt::Display for DedupeScopeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown scope: '{}' (expected full or machine)", self.0)
    }
}

impl std::error::Error for DedupeScopeParseError {}

impl std::str::FromStr for DedupeScope {
    type Err = DedupeScopeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" | "all" => Ok(Self::Full),
            "machine" | "game" => Ok(Self::Machine),
            _ => Err(DedupeScopeParseError(s.to_string())),
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupeOptions {
    pub key: BucketKey,
    pub scope: DedupeScope,
    /// Concurrent bucket tasks
    pub workers: usize,
    /// Keep absorbed items, flagged `remove`
    pub soft_delete: bool,
    pub resolve_names: bool,
}

impl Default for DedupeOptions {
    fn default() -> Self {
        Self {
            key: BucketKey::default(),
            scope: DedupeScope::default(),
            workers: default_workers(),
            soft_delete: false,
            resolve_names: true,
        }
    }
}

/// One worker per available core.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Counters describing one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupeStats {
    /// Items handed to the pipeline
    pub input: usize,
    /// Items in the result, including soft-deleted ones
    pub output: usize,
    /// Buckets built from the input
    pub buckets: usize,
    /// Items folded into another item by the merge
    pub absorbed: usize,
    /// Items given a new name by the resolver
    pub renamed: usize,
    /// Items dropped by the resolver as exact duplicates
    pub dropped: usize,
}

/// Pipeline result.
#[derive(Debug, Default)]
pub struct DedupeReport {
    /// Result items grouped by machine, machines in sorted order
    pub items: Vec<DatItem>,
    pub stats: DedupeStats,
    /// Buckets whose task failed; their items were passed through
    pub errors: Vec<DedupeError>,
}

impl DedupeReport {
    pub fn failed_buckets(&self) -> usize {
        self.errors.len()
    }
}

/// Bucket key of `item` for the given key function and scope.
///
/// Machine scope prefixes the key with the machine name so duplicates are
/// only found within one machine.
pub fn scoped_key(item: &DatItem, key: BucketKey, scope: DedupeScope) -> String {
    let base = key_for(item, key);
    match scope {
        DedupeScope::Full => base,
        DedupeScope::Machine => format!("{}\u{1f}{base}", item.machine.name),
    }
}

/// Run the whole pipeline on the current tokio runtime.
pub async fn dedupe(items: Vec<DatItem>, options: &DedupeOptions) -> DedupeReport {
    run_pipeline(items, options, reduce, resolve).await
}

/// Blocking wrapper around [`dedupe`] that owns a multi-thread runtime.
pub fn dedupe_blocking(
    items: Vec<DatItem>,
    options: &DedupeOptions,
) -> Result<DedupeReport, DedupeError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(options.workers.max(1))
        .enable_all()
        .build()?;
    Ok(runtime.block_on(dedupe(items, options)))
}

type MergeFn = fn(Vec<DatItem>) -> MergeOutcome;
type ResolveFn = fn(Vec<DatItem>) -> ResolveOutcome;

enum BucketResult<T> {
    Done(String, T),
    Failed(String, Vec<DatItem>, DedupeError),
}

async fn run_pipeline(
    items: Vec<DatItem>,
    options: &DedupeOptions,
    merge_fn: MergeFn,
    resolve_fn: ResolveFn,
) -> DedupeReport {
    let mut report = DedupeReport::default();
    report.stats.input = items.len();

    let key = options.key;
    let scope = options.scope;
    let index = BucketIndex::build_with(items, |item| scoped_key(item, key, scope));
    report.stats.buckets = index.len();
    log::debug!(
        "Merging {} items in {} buckets (key {key}, scope {scope})",
        report.stats.input,
        report.stats.buckets
    );

    // Merge stage; results are re-keyed so output order does not depend on
    // which worker finished first.
    let soft_delete = options.soft_delete;
    let merged = run_buckets(options.workers, index, move |items| {
        let MergeOutcome { mut items, absorbed } = merge_fn(items);
        let count = absorbed.len();
        if soft_delete {
            items.extend(absorbed.into_iter().map(|mut item| {
                item.remove = true;
                item
            }));
        }
        (items, count)
    })
    .await;

    let mut merged_items: BTreeMap<String, Vec<DatItem>> = BTreeMap::new();
    for result in merged {
        match result {
            BucketResult::Done(key, (items, absorbed)) => {
                report.stats.absorbed += absorbed;
                merged_items.insert(key, items);
            }
            BucketResult::Failed(key, items, error) => {
                log::warn!("{error}; passing its items through unmerged");
                report.errors.push(error);
                merged_items.insert(key, items);
            }
        }
    }

    let by_machine = BucketIndex::build(merged_items.into_values().flatten(), BucketKey::Machine);

    if !options.resolve_names {
        report.items = by_machine
            .into_buckets()
            .flat_map(|(_, mut items)| {
                items.sort_by(compare_items);
                items
            })
            .collect();
        report.stats.output = report.items.len();
        return report;
    }

    let resolved = run_buckets(options.workers, by_machine, move |items| {
        // Soft-deleted items keep their names
        let (removed, live): (Vec<DatItem>, Vec<DatItem>) =
            items.into_iter().partition(|item| item.remove);
        let mut outcome = resolve_fn(live);
        outcome.items.extend(removed);
        outcome
    })
    .await;

    let mut machines: BTreeMap<String, Vec<DatItem>> = BTreeMap::new();
    for result in resolved {
        match result {
            BucketResult::Done(machine, outcome) => {
                report.stats.renamed += outcome.renamed;
                report.stats.dropped += outcome.dropped;
                machines.insert(machine, outcome.items);
            }
            BucketResult::Failed(machine, items, error) => {
                log::warn!("{error}; keeping its names unresolved");
                report.errors.push(error);
                machines.insert(machine, items);
            }
        }
    }

    report.items = machines.into_values().flatten().collect();
    report.stats.output = report.items.len();
    report
}

/// Run `work` over every bucket on a worker pool, each bucket on its own
/// blocking task. A failed bucket comes back with its original items.
async fn run_buckets<T, F>(workers: usize, index: BucketIndex, work: F) -> Vec<BucketResult<T>>
where
    T: Send + 'static,
    F: Fn(Vec<DatItem>) -> T + Send + Sync + Copy + 'static,
{
    let buckets: Vec<(String, Vec<DatItem>)> = index.into_buckets().collect();

    let pool = WorkerPool::start(workers, buckets, move |(key, items)| async move {
        let backup = items.clone();
        let task = tokio::task::spawn_blocking(move || work(items));
        match tokio::time::timeout(BUCKET_TIMEOUT, task).await {
            Ok(Ok(result)) => BucketResult::Done(key, result),
            Ok(Err(join_error)) => {
                let error = DedupeError::bucket_failed(key.clone(), join_error.to_string());
                BucketResult::Failed(key, backup, error)
            }
            Err(_) => {
                let error = DedupeError::BucketTimedOut(key.clone());
                BucketResult::Failed(key, backup, error)
            }
        }
    });
    pool.collect().await
}

#[cfg(test)]
#[path = "tests/dedupe_tests.rs"]
mod tests;
