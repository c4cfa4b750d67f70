use std::cmp::Ordering;

/// Format a byte count with fractional KB/MB (e.g., "1.5 KB", "2.3 MB").
pub fn format_bytes_approx(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Split an item name into its directory part and file part.
///
/// Both `/` and `\` are treated as separators. Names without a separator
/// have an empty directory part.
pub fn split_item_path(name: &str) -> (&str, &str) {
    match name.rfind(['/', '\\']) {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => ("", name),
    }
}

/// Alphanumeric-aware string comparison.
///
/// Runs of ASCII digits compare by numeric value (so `"disc 2"` sorts
/// before `"disc 10"`), other text compares case-insensitively. Runs of any
/// length are handled without parsing, and remaining ties fall back to a
/// plain byte comparison, so the ordering is total.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ord = match (x, y) {
                    (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digit_runs(x, y),
                    (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
                    (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
                    (Chunk::Text(x), Chunk::Text(y)) => cmp_text_runs(x, y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn cmp_digit_runs(x: &str, y: &str) -> Ordering {
    let xs = x.trim_start_matches('0');
    let ys = y.trim_start_matches('0');
    xs.len()
        .cmp(&ys.len())
        .then_with(|| xs.cmp(ys))
        .then_with(|| x.len().cmp(&y.len()))
}

fn cmp_text_runs(x: &str, y: &str) -> Ordering {
    let xs = x.chars().flat_map(char::to_lowercase);
    let ys = y.chars().flat_map(char::to_lowercase);
    xs.cmp(ys)
}

enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .find(|c: char| c.is_ascii_digit() != digits)
            .unwrap_or(self.rest.len());
        let (run, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(if digits {
            Chunk::Digits(run)
        } else {
            Chunk::Text(run)
        })
    }
}
