//! Reading and writing font container formats
//!
//! This crate reads and writes the files that wrap a font's tables: plain
//! sfnt files (`.ttf`/`.otf`) and TrueType collections (`.ttc`), [WOFF]
//! files, and [EOT] files. Tables are treated as opaque, tagged blobs of
//! bytes; interpreting their contents is left to crates such as
//! [`read-fonts`].
//!
//! Each format has a reader, implementing [`TableSource`], and a writer,
//! implementing [`TableSink`]. Writers are created with the number of tables
//! they will hold, accept tables in any order, and are finished with a
//! `close` method that writes the table directory and solves the `head`
//! table's `checksumAdjustment`.
//!
//! # Example
//!
//! Converting a WOFF file to a plain sfnt:
//!
//! ```no_run
//! use std::fs::File;
//! use font_containers::{copy_tables, ReaderOptions, SfntWriter, TableSource, WoffReader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut woff = WoffReader::new(File::open("font.woff")?, ReaderOptions::default())?;
//! let num_tables = woff.table_tags().len() as u16;
//! let mut sfnt = SfntWriter::new(File::create("font.ttf")?, num_tables, woff.flavor())?;
//! copy_tables(&mut woff, &mut sfnt)?;
//! sfnt.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! [WOFF]: https://www.w3.org/TR/WOFF/
//! [EOT]: https://www.w3.org/submissions/EOT/
//! [`read-fonts`]: https://docs.rs/read-fonts/

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod checksum;
pub mod collection;
mod directory;
pub mod eot;
mod error;
mod options;
mod provider;
mod record;
pub mod sfnt;
mod tag;
pub mod woff;

pub use checksum::CHECKSUM_MAGIC;
pub use collection::{CollectionInfo, DsigRecord, TTC_HEADER_TAG};
pub use directory::{Directory, SearchRange, TableEntry, TABLE_RECORD_LEN};
pub use eot::{EotHeader, EotReader, EotWriter, EOT_MAGIC};
pub use error::{ChecksumMismatch, Error};
pub use options::{ChecksumPolicy, CompressionPolicy, ReaderOptions, WoffOptions};
pub use provider::{copy_tables, TableData, TableSink, TableSource};
pub use record::FixedRecord;
pub use sfnt::{
    SfntHeader, SfntReader, SfntWriter, TableRecord, CFF_SFNT_VERSION, TRUE_SFNT_VERSION,
    TT_SFNT_VERSION,
};
pub use tag::{InvalidTag, Tag};
pub use woff::{WoffHeader, WoffReader, WoffTableRecord, WoffWriter, WOFF_SIGNATURE};

/// Re-exported so callers can set [`WoffOptions::level`] without depending
/// on `flate2` directly.
pub use flate2::Compression;
