//! Traits shared by container readers and writers

use std::collections::BTreeSet;

use crate::{directory::TableEntry, error::ChecksumMismatch, Error, Tag};

/// The data of one table, as returned by a reader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableData {
    pub tag: Tag,
    /// The uncompressed table bytes.
    pub data: Vec<u8>,
    /// Set when the checksum did not match and the reader's policy is
    /// [`ChecksumPolicy::Warn`](crate::ChecksumPolicy::Warn).
    pub checksum_mismatch: Option<ChecksumMismatch>,
}

/// A source of raw tables, keyed by tag.
pub trait TableSource {
    /// Returns the directory entry for `tag`, if present.
    fn table_entry(&self, tag: Tag) -> Option<&TableEntry>;

    /// Returns the tags of all tables in the directory.
    fn table_tags(&self) -> BTreeSet<Tag>;

    /// Read a table and check it against the directory's checksum.
    fn table_data(&mut self, tag: Tag) -> Result<TableData, Error>;

    /// Remove a table from the directory.
    ///
    /// This does not modify the underlying file.
    fn remove_table(&mut self, tag: Tag) -> Option<TableEntry>;

    /// Returns `true` if the directory contains `tag`.
    fn has_table(&self, tag: Tag) -> bool {
        self.table_entry(tag).is_some()
    }

    /// Read the uncompressed bytes of a table.
    ///
    /// Checksum mismatches that the reader's policy tolerates are logged
    /// and otherwise ignored; use [`TableSource::table_data`] to inspect
    /// them.
    fn get_table(&mut self, tag: Tag) -> Result<Vec<u8>, Error> {
        self.table_data(tag).map(|table| table.data)
    }
}

/// A destination for raw tables.
pub trait TableSink {
    /// The number of distinct tables this sink expects before it is closed.
    fn declared_table_count(&self) -> u16;

    /// Write (or rewrite) the table `tag`.
    fn put_table(&mut self, tag: Tag, data: &[u8]) -> Result<(), Error>;
}

/// Copy every table from `source` into `sink`, in ascending tag order.
///
/// Returns the number of tables copied. Closing the sink is left to the
/// caller.
pub fn copy_tables<S, D>(source: &mut S, sink: &mut D) -> Result<usize, Error>
where
    S: TableSource + ?Sized,
    D: TableSink + ?Sized,
{
    let tags = source.table_tags();
    for tag in &tags {
        let data = source.get_table(*tag)?;
        sink.put_table(*tag, &data)?;
    }
    Ok(tags.len())
}
