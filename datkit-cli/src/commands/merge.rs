use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use datkit_core::DatItem;
use datkit_dat::{DatHeader, OutputFormat, parse_dat_file, write_json, write_logiqx};
use datkit_lib::{BucketKey, DedupeOptions, DedupeScope, DedupeStats, Settings, dedupe_blocking};

use crate::cli_types::{FormatArg, output_format};
use crate::error::CliError;
use crate::spinner::spinner;

pub(crate) struct MergeArgs {
    pub dats: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub key: Option<BucketKey>,
    pub scope: Option<DedupeScope>,
    pub format: Option<FormatArg>,
    pub workers: Option<usize>,
    pub soft_delete: bool,
    pub no_resolve: bool,
    pub name: Option<String>,
    pub quiet: bool,
}

/// Saved settings with command-line overrides applied.
fn merge_options(settings: &Settings, args: &MergeArgs) -> Result<DedupeOptions, CliError> {
    let mut options = settings.dedupe.to_options();
    if let Some(key) = args.key {
        options.key = key;
    }
    if let Some(scope) = args.scope {
        options.scope = scope;
    }
    if let Some(workers) = args.workers {
        if workers == 0 {
            return Err(CliError::usage("--workers must be at least 1"));
        }
        options.workers = workers;
    }
    options.soft_delete |= args.soft_delete;
    if args.no_resolve {
        options.resolve_names = false;
    }
    Ok(options)
}

pub(crate) fn run_merge(args: MergeArgs) -> Result<(), CliError> {
    let settings = Settings::load()?;
    let options = merge_options(&settings, &args)?;
    let format = output_format(args.format, args.output.as_deref());

    let pb = spinner(args.quiet, "Reading DATs...");
    let mut items: Vec<DatItem> = Vec::new();
    let mut first_header: Option<DatHeader> = None;
    for (index, path) in args.dats.iter().enumerate() {
        pb.set_message(format!("Reading {}", path.display()));
        let dat = parse_dat_file(path, index)?;
        pb.suspend(|| {
            log::info!(
                "  {} {} ({} items)",
                format!("[{index}]").if_supports_color(Stderr, |t| t.dimmed()),
                path.display().if_supports_color(Stderr, |t| t.cyan()),
                dat.items.len(),
            );
        });
        first_header.get_or_insert(dat.header);
        items.extend(dat.items);
    }

    pb.set_message(format!(
        "Deduplicating {} items (key {}, scope {})...",
        items.len(),
        options.key,
        options.scope
    ));
    let report = dedupe_blocking(items, &options)?;
    pb.finish_and_clear();

    let name = args
        .name
        .clone()
        .or_else(|| first_header.map(|h| h.name).filter(|n| !n.is_empty()))
        .unwrap_or_else(|| "datkit merge".to_string());
    let header = DatHeader::new(name);
    write_output(args.output.as_deref(), format, &header, &report.items)?;

    print_stats(&report.stats);
    if report.failed_buckets() > 0 {
        log::warn!(
            "{} {} bucket(s) failed and were passed through unmerged",
            "\u{26A0}".if_supports_color(Stderr, |t| t.yellow()),
            report.failed_buckets(),
        );
    }
    if let Some(path) = &args.output {
        log::info!(
            "{} Wrote {}",
            "\u{2714}".if_supports_color(Stderr, |t| t.green()),
            path.display().if_supports_color(Stderr, |t| t.cyan()),
        );
    }
    Ok(())
}

/// Write to `path`, or to stdout when no path is given.
pub(crate) fn write_output(
    path: Option<&Path>,
    format: OutputFormat,
    header: &DatHeader,
    items: &[DatItem],
) -> Result<(), CliError> {
    match path {
        Some(path) => datkit_dat::write_dat_file(path, format, header, items)?,
        None => {
            let stdout = std::io::stdout().lock();
            match format {
                OutputFormat::Logiqx => write_logiqx(stdout, header, items)?,
                OutputFormat::Json => write_json(stdout, header, items)?,
            }
        }
    }
    Ok(())
}

fn print_stats(stats: &DedupeStats) {
    log::info!("");
    log::info!(
        "{}",
        "Summary:".if_supports_color(Stderr, |t| t.bold())
    );
    log::info!("  Input items:  {}", stats.input);
    log::info!(
        "  Output items: {}",
        stats.output.if_supports_color(Stderr, |t| t.green())
    );
    log::info!("  Buckets:      {}", stats.buckets);
    log::info!("  Absorbed:     {}", stats.absorbed);
    if stats.renamed > 0 {
        log::info!(
            "  Renamed:      {}",
            stats.renamed.if_supports_color(Stderr, |t| t.yellow())
        );
    }
    if stats.dropped > 0 {
        log::info!("  Dropped:      {}", stats.dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> MergeArgs {
        MergeArgs {
            dats: vec![PathBuf::from("a.dat")],
            output: None,
            key: None,
            scope: None,
            format: None,
            workers: None,
            soft_delete: false,
            no_resolve: false,
            name: None,
            quiet: true,
        }
    }

    #[test]
    fn test_flags_override_settings() {
        let mut settings = Settings::default();
        settings.dedupe.key = BucketKey::Md5;
        settings.dedupe.workers = Some(8);

        let options = merge_options(&settings, &args()).unwrap();
        assert_eq!(options.key, BucketKey::Md5);
        assert_eq!(options.workers, 8);
        assert!(options.resolve_names);

        let overridden = MergeArgs {
            key: Some(BucketKey::Sha1),
            scope: Some(DedupeScope::Machine),
            workers: Some(2),
            soft_delete: true,
            no_resolve: true,
            ..args()
        };
        let options = merge_options(&settings, &overridden).unwrap();
        assert_eq!(options.key, BucketKey::Sha1);
        assert_eq!(options.scope, DedupeScope::Machine);
        assert_eq!(options.workers, 2);
        assert!(options.soft_delete);
        assert!(!options.resolve_names);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let bad = MergeArgs {
            workers: Some(0),
            ..args()
        };
        assert!(matches!(
            merge_options(&Settings::default(), &bad),
            Err(CliError::Usage(_))
        ));
    }
}
