//! Name resolver: makes item names unique within each machine.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use datkit_core::util::{natural_cmp, split_item_path};
use datkit_core::{DatItem, HashKind};

use crate::dupe::is_duplicate;

/// Output ordering: source, machine, item type, then item path.
///
/// Machine names and both halves of the item path compare naturally
/// (digit runs by value). Unnamed items sort before named ones.
pub fn compare_items(a: &DatItem, b: &DatItem) -> Ordering {
    a.source
        .index
        .cmp(&b.source.index)
        .then_with(|| natural_cmp(&a.machine.name, &b.machine.name))
        .then_with(|| a.item_type().ordinal().cmp(&b.item_type().ordinal()))
        .then_with(|| compare_names(a.name(), b.name()))
}

fn compare_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => {
            let (a_dir, a_file) = split_item_path(a);
            let (b_dir, b_file) = split_item_path(b);
            natural_cmp(a_dir, b_dir).then_with(|| natural_cmp(a_file, b_file))
        }
    }
}

/// Result of [`resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveOutcome {
    pub items: Vec<DatItem>,
    pub renamed: usize,
    pub dropped: usize,
}

/// Resolve name collisions, returning only the items.
pub fn resolve_names(items: Vec<DatItem>) -> Vec<DatItem> {
    resolve(items).items
}

/// Resolve name collisions within each machine.
///
/// A repeated `(machine, name)` is dropped when it exactly duplicates an
/// earlier holder of that name and renamed otherwise. Renames append the item's MD5
/// (else SHA1, else `1`), then a counter if that is still taken. Output is
/// sorted with [`compare_items`].
pub fn resolve(mut items: Vec<DatItem>) -> ResolveOutcome {
    items.sort_by(compare_items);

    let mut outcome = ResolveOutcome {
        items: Vec::with_capacity(items.len()),
        ..ResolveOutcome::default()
    };
    let mut names = NameTable::default();
    // Last unnamed item seen per machine
    let mut last_unnamed: HashMap<String, usize> = HashMap::new();

    for mut item in items {
        let Some(name) = item.name().map(str::to_string) else {
            let machine = item.machine.name.clone();
            if let Some(&prev) = last_unnamed.get(&machine)
                && is_duplicate(&item, &outcome.items[prev])
            {
                log::debug!("Dropping duplicate {} in '{machine}'", item.item_type());
                outcome.dropped += 1;
                continue;
            }
            last_unnamed.insert(machine, outcome.items.len());
            outcome.items.push(item);
            continue;
        };

        let key = (item.machine.name.clone(), name);
        let pos = outcome.items.len();
        if !names.used.contains(&key) {
            names.used.insert(key.clone());
            names.holders.entry(key).or_default().push(pos);
            outcome.items.push(item);
            continue;
        }

        let exact = names.holders.get(&key).is_some_and(|holders| {
            holders
                .iter()
                .any(|&h| matches_holder(&item, &outcome.items[h], &key.1))
        });
        if exact {
            log::debug!("Dropping duplicate '{}' in '{}'", key.1, key.0);
            outcome.dropped += 1;
            continue;
        }

        let new_name = names.rename(&key, rename_suffix(&item));
        log::debug!("Renaming '{}' in '{}' to '{new_name}'", key.1, key.0);
        item.set_name(new_name.clone());
        names.used.insert((key.0.clone(), new_name));
        names.holders.entry(key).or_default().push(pos);
        outcome.items.push(item);
        outcome.renamed += 1;
    }

    outcome.items.sort_by(compare_items);
    outcome
}

/// Whether `item` duplicates a holder of `original`, comparing the holder
/// under that name even if it has since been renamed.
fn matches_holder(item: &DatItem, holder: &DatItem, original: &str) -> bool {
    if holder.name() == Some(original) {
        return is_duplicate(item, holder);
    }
    let mut restored = holder.clone();
    restored.set_name(original);
    is_duplicate(item, &restored)
}

/// Names claimed so far, per machine.
#[derive(Default)]
struct NameTable {
    /// Every `(machine, name)` currently in the output, renamed or not
    used: HashSet<(String, String)>,
    /// Output positions of items that arrived with a given original name
    holders: HashMap<(String, String), Vec<usize>>,
    /// Last suffixed name produced, before any counter
    last_rename: Option<(String, String)>,
    counter: usize,
}

impl NameTable {
    fn rename(&mut self, key: &(String, String), suffix: String) -> String {
        let (machine, name) = key;
        let base = format!("{name}_{suffix}");
        let candidate = (machine.clone(), base.clone());
        let collides =
            self.last_rename.as_ref() == Some(&candidate) || self.used.contains(&candidate);
        self.last_rename = Some(candidate);
        if !collides {
            self.counter = 0;
            return base;
        }
        loop {
            self.counter += 1;
            let numbered = format!("{base}_{}", self.counter);
            if !self.used.contains(&(machine.clone(), numbered.clone())) {
                return numbered;
            }
        }
    }
}

fn rename_suffix(item: &DatItem) -> String {
    item.hash()
        .and_then(|h| h.text(HashKind::Md5).or_else(|| h.text(HashKind::Sha1)))
        .unwrap_or_else(|| "1".to_string())
}

#[cfg(test)]
#[path = "tests/resolve_tests.rs"]
mod tests;
