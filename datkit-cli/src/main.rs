//! datkit CLI
//!
//! Command-line interface for merging, deduplicating and generating DAT files.

mod cli_types;
mod commands;
mod error;
mod spinner;

use std::io::Write;

use clap::Parser;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{Cli, Commands, ConfigAction};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Merge {
            dats,
            output,
            key,
            scope,
            format,
            workers,
            soft_delete,
            no_resolve,
            name,
        } => commands::merge::run_merge(commands::merge::MergeArgs {
            dats,
            output,
            key,
            scope,
            format,
            workers,
            soft_delete,
            no_resolve,
            name,
            quiet: cli.quiet,
        }),
        Commands::Dir2Dat {
            dir,
            output,
            name,
            format,
        } => commands::dir2dat::run_dir2dat(&dir, output.as_deref(), name, format, cli.quiet),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(),
            ConfigAction::Path => commands::config::run_config_path(),
            ConfigAction::Set { key, value } => commands::config::run_config_set(&key, &value),
        },
    };

    if let Err(e) = result {
        log::error!(
            "{} {}",
            "\u{2718}".if_supports_color(Stderr, |t| t.red()),
            e
        );
        std::process::exit(1);
    }
}

/// Install the logger. `RUST_LOG` wins over the flags.
///
/// Normal output is bare messages at info; `--verbose` adds timestamps and
/// debug messages, `--quiet` keeps warnings and errors only.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if verbose {
        builder.format_timestamp_millis();
    } else {
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }
    let _ = builder.try_init();
}
