use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use datkit_core::Source;
use datkit_core::util::format_bytes_approx;
use datkit_dat::{DatHeader, scan_directory_with_progress};

use crate::cli_types::{FormatArg, output_format};
use crate::commands::merge::write_output;
use crate::error::CliError;
use crate::spinner::spinner;

pub(crate) fn run_dir2dat(
    dir: &Path,
    output: Option<&Path>,
    name: Option<String>,
    format: Option<FormatArg>,
    quiet: bool,
) -> Result<(), CliError> {
    if !dir.is_dir() {
        return Err(CliError::usage(format!("Not a directory: {}", dir.display())));
    }
    let name = name
        .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "datkit dir2dat".to_string());
    let format = output_format(format, output);

    log::info!(
        "Scanning {}",
        dir.display().if_supports_color(Stderr, |t| t.cyan()),
    );
    let pb = spinner(quiet, "Hashing...");
    let source = Source::new(0, dir.display().to_string());
    let scan = scan_directory_with_progress(dir, &source, &|path| {
        let shown = path.strip_prefix(dir).unwrap_or(path);
        pb.set_message(format!("Hashing {}", shown.display()));
    })?;
    pb.finish_and_clear();

    for (path, error) in &scan.failures {
        log::warn!(
            "  {} {}: {}",
            "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
            path.display(),
            error,
        );
    }

    let total_bytes: u64 = scan
        .items
        .iter()
        .filter_map(|item| item.hash().and_then(|h| h.size))
        .sum();
    let machines = {
        let mut names: Vec<&str> = scan.items.iter().map(|i| i.machine.name.as_str()).collect();
        names.dedup();
        names.len()
    };

    write_output(output, format, &DatHeader::new(name), &scan.items)?;

    log::info!(
        "{} {} files in {} machines ({})",
        "\u{2714}".if_supports_color(Stderr, |t| t.green()),
        scan.items.len(),
        machines,
        format_bytes_approx(total_bytes),
    );
    if !scan.failures.is_empty() {
        log::warn!("{} files could not be read", scan.failures.len());
    }
    if let Some(path) = output {
        log::info!(
            "  Wrote {}",
            path.display().if_supports_color(Stderr, |t| t.cyan()),
        );
    }
    Ok(())
}
