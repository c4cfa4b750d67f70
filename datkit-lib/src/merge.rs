//! Merge reducer: collapses duplicate items into one entry per content.

use datkit_core::DatItem;

use crate::dupe::{duplicate_status, is_duplicate};

/// Result of [`reduce`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Surviving items, pass-through items interleaved where they occurred
    pub items: Vec<DatItem>,
    /// Items folded into an earlier entry, in the order they were absorbed
    pub absorbed: Vec<DatItem>,
}

/// Merge duplicates, dropping the absorbed items.
pub fn merge(items: Vec<DatItem>) -> Vec<DatItem> {
    reduce(items).items
}

/// Merge duplicates, keeping absorbed items flagged `remove` after the
/// surviving ones.
pub fn merge_soft(items: Vec<DatItem>) -> Vec<DatItem> {
    let MergeOutcome {
        mut items,
        absorbed,
    } = reduce(items);
    items.extend(absorbed.into_iter().map(|mut item| {
        item.remove = true;
        item
    }));
    items
}

/// Merge duplicates and report what was absorbed.
///
/// Items already flagged `remove` and Nodump ROMs/disks pass through
/// untouched. Every other item is folded into the first earlier survivor
/// it duplicates: the survivor gains any digests (and size) it lacked,
/// records the duplicate classification, and takes over the newcomer's
/// machine and name when the newcomer comes from a preferred source or is
/// the survivor's parent. Passes repeat until nothing new is filled in, so
/// merging a merged list changes nothing.
pub fn reduce(items: Vec<DatItem>) -> MergeOutcome {
    let mut outcome = MergeOutcome {
        items,
        absorbed: Vec::new(),
    };
    let mut passes = 0usize;
    loop {
        passes += 1;
        let (items, absorbed, filled) = merge_pass(std::mem::take(&mut outcome.items));
        outcome.items = items;
        outcome.absorbed.extend(absorbed);
        if !filled {
            break;
        }
    }
    if passes > 1 {
        log::debug!("Merge settled after {passes} passes");
    }
    outcome
}

/// One left-to-right pass. Returns survivors, absorbed items, and whether
/// any survivor gained a field.
fn merge_pass(items: Vec<DatItem>) -> (Vec<DatItem>, Vec<DatItem>, bool) {
    let mut out: Vec<DatItem> = Vec::with_capacity(items.len());
    // Positions in `out` eligible to absorb later items
    let mut candidates: Vec<usize> = Vec::new();
    let mut absorbed = Vec::new();
    let mut filled = false;
    let mut nodumps = 0usize;

    for item in items {
        if item.remove || item.is_nodump() {
            if item.is_nodump() {
                nodumps += 1;
            }
            out.push(item);
            continue;
        }

        let hit = candidates
            .iter()
            .copied()
            .find(|&pos| is_duplicate(&out[pos], &item));
        let Some(pos) = hit else {
            candidates.push(out.len());
            out.push(item);
            continue;
        };

        let existing = &mut out[pos];
        if let (Some(dst), Some(src)) = (existing.hash_mut(), item.hash()) {
            filled |= dst.fill_missing_from(src);
        }
        existing.dupe_type = duplicate_status(&item, existing);
        if takes_identity(&item, existing) {
            existing.machine = item.machine.clone();
            if let Some(name) = item.name() {
                existing.set_name(name);
            }
        }
        absorbed.push(item);
    }

    if nodumps > 0 {
        log::debug!("{nodumps} nodump items passed through unmerged");
    }
    (out, absorbed, filled)
}

/// Whether `current` should lend its machine and name to `existing`.
fn takes_identity(current: &DatItem, existing: &DatItem) -> bool {
    current.source.index < existing.source.index
        || existing.machine.is_child_of(&current.machine.name)
}

#[cfg(test)]
#[path = "tests/merge_tests.rs"]
mod tests;
