//! Duplicate predicate and duplicate classification.

use datkit_core::{DatItem, DupeType, HashKind, HashRecord, ItemType};

/// Whether two items describe the same content.
///
/// Items of different types never match. Two Nodump ROMs or disks without
/// digests match when their names are equal. Hash-bearing items match when
/// they share at least one digest kind and every shared kind is equal.
/// Everything else compares by payload.
pub fn is_duplicate(a: &DatItem, b: &DatItem) -> bool {
    let item_type = a.item_type();
    if item_type != b.item_type() {
        return false;
    }

    if a.is_nodump() && b.is_nodump() && !has_digests(a) && !has_digests(b) {
        return a.name() == b.name();
    }

    match (a.hash(), b.hash()) {
        (Some(ha), Some(hb)) => {
            let matched = hashes_match(ha, hb);
            if matched && item_type == ItemType::Rom {
                warn_on_size_mismatch(a, ha, hb);
            }
            matched
        }
        _ => a.kind == b.kind,
    }
}

fn has_digests(item: &DatItem) -> bool {
    item.hash().is_some_and(HashRecord::has_any_digest)
}

/// At least one shared digest kind, and all shared kinds equal.
fn hashes_match(a: &HashRecord, b: &HashRecord) -> bool {
    let mut shared = a.common_kinds(b).peekable();
    if shared.peek().is_none() {
        return false;
    }
    shared.all(|kind| a.get(kind) == b.get(kind))
}

fn warn_on_size_mismatch(item: &DatItem, a: &HashRecord, b: &HashRecord) {
    if !(a.has(HashKind::Sha1) && b.has(HashKind::Sha1)) {
        return;
    }
    if let (Some(sa), Some(sb)) = (a.size, b.size)
        && sa != sb
    {
        log::warn!(
            "'{}' in '{}': SHA1 matches but sizes differ ({sa} vs {sb})",
            item.name().unwrap_or_default(),
            item.machine.name
        );
    }
}

/// Classify `current` against an earlier item `last`.
///
/// Returns an empty set when they are not duplicates. Otherwise exactly one
/// of `EXTERNAL`/`INTERNAL` is set (external once `last` was already
/// external, or when the sources differ) together with `ALL` when the
/// machine and item names both match, else `HASH`.
pub fn duplicate_status(current: &DatItem, last: &DatItem) -> DupeType {
    if !is_duplicate(current, last) {
        return DupeType::empty();
    }

    let origin = if last.dupe_type.contains(DupeType::EXTERNAL)
        || current.source.index != last.source.index
    {
        DupeType::EXTERNAL
    } else {
        DupeType::INTERNAL
    };

    let same_names =
        current.machine.name == last.machine.name && current.name() == last.name();
    origin | if same_names { DupeType::ALL } else { DupeType::HASH }
}

#[cfg(test)]
#[path = "tests/dupe_tests.rs"]
mod tests;
