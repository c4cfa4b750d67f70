//! DAT file formats for datkit: parsing, writing, hashing and scanning.

pub mod attributes;
pub mod dat;
pub mod error;
pub mod hasher;
pub mod scan;
pub mod writer;

pub use dat::{DatFile, DatHeader, parse_dat, parse_dat_file};
pub use error::DatError;
pub use hasher::{hash_file, hash_reader, hash_reader_with_progress};
pub use scan::{ScanOutcome, scan_directory, scan_directory_with_progress};
pub use writer::{OutputFormat, write_dat_file, write_json, write_logiqx};
