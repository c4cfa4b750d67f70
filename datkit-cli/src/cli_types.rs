//! CLI type definitions: command enums and argument structs.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use datkit_dat::OutputFormat;
use datkit_lib::{BucketKey, DedupeScope};

#[derive(Parser)]
#[command(name = "datkit")]
#[command(about = "Merge, deduplicate and generate ROM DAT files", long_about = None)]
pub(crate) struct Cli {
    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum FormatArg {
    /// Logiqx XML datafile
    Xml,
    /// Pretty JSON grouped by machine
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xml => OutputFormat::Logiqx,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Pick the output format: explicit flag, else `.json` extension, else XML.
pub(crate) fn output_format(flag: Option<FormatArg>, output: Option<&Path>) -> OutputFormat {
    if let Some(flag) = flag {
        return flag.into();
    }
    let is_json = output
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        OutputFormat::Json
    } else {
        OutputFormat::Logiqx
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Merge DAT files and remove duplicate entries
    Merge {
        /// Input DATs (Logiqx XML or ClrMamePro); earlier files take priority
        #[arg(required = true)]
        dats: Vec<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bucket key: crc, md5, sha1, sha256, size, machine, best
        #[arg(short, long)]
        key: Option<BucketKey>,

        /// Look for duplicates across all machines or within each machine
        #[arg(long)]
        scope: Option<DedupeScope>,

        /// Output format (default: from the output extension, else xml)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,

        /// Number of concurrent bucket workers
        #[arg(long)]
        workers: Option<usize>,

        /// Keep absorbed duplicates, flagged for removal
        #[arg(long)]
        soft_delete: bool,

        /// Skip making item names unique within each machine
        #[arg(long)]
        no_resolve: bool,

        /// Name for the output DAT header
        #[arg(long)]
        name: Option<String>,
    },

    /// Hash a directory tree into a new DAT
    #[command(name = "dir2dat")]
    Dir2Dat {
        /// Directory to scan; each subdirectory becomes one machine
        dir: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Name for the output DAT header (defaults to the directory name)
        #[arg(long)]
        name: Option<String>,

        /// Output format (default: from the output extension, else xml)
        #[arg(long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Manage datkit settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings and their file
    Show,

    /// Print the settings file path
    Path,

    /// Set one setting, e.g. `dedupe.key sha1`
    Set {
        /// Setting name (dedupe.key, dedupe.scope, dedupe.workers, ...)
        key: String,

        /// New value
        value: String,
    },
}
