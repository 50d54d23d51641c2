//! Table directory bookkeeping shared by every container format

use indexmap::IndexMap;

use crate::Tag;

/// The size of an entry in an sfnt table directory.
pub const TABLE_RECORD_LEN: usize = 16;

/// Binary search parameters stored in sfnt-style headers.
///
/// See <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#table-directory>
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchRange {
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SearchRange {
    /// Compute the search range for `num_items` items of `item_size` bytes.
    ///
    /// Values that do not fit in a `u16` are saturated, and an empty
    /// directory reports a range shift of zero.
    pub fn compute(num_items: usize, item_size: usize) -> Self {
        let entry_selector = num_items.checked_ilog2().unwrap_or(0);
        let search_range = (1usize << entry_selector).saturating_mul(item_size);
        let range_shift = num_items
            .saturating_mul(item_size)
            .saturating_sub(search_range);
        SearchRange {
            search_range: saturate(search_range),
            entry_selector: entry_selector as u16,
            range_shift: saturate(range_shift),
        }
    }

    /// The search range for a table directory with `num_tables` entries.
    pub fn for_tables(num_tables: usize) -> Self {
        Self::compute(num_tables, TABLE_RECORD_LEN)
    }
}

fn saturate(val: usize) -> u16 {
    val.try_into().unwrap_or(u16::MAX)
}

/// Round `pos` up to the next multiple of `alignment`, a power of two.
pub(crate) fn align_to(pos: u32, alignment: u32) -> Option<u32> {
    debug_assert!(alignment.is_power_of_two());
    let mask = alignment - 1;
    pos.checked_add(mask).map(|pos| pos & !mask)
}

/// Round `pos` up to the next multiple of four.
pub(crate) fn round4(pos: u32) -> Option<u32> {
    align_to(pos, 4)
}

/// One table in a container's directory.
///
/// Offsets are relative to the start of the container; for formats that
/// do not compress tables `comp_length` equals `length`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableEntry {
    pub tag: Tag,
    pub offset: u32,
    /// The uncompressed length of the table.
    pub length: u32,
    /// The number of bytes stored in the file.
    pub comp_length: u32,
    /// The checksum of the uncompressed table.
    pub checksum: u32,
}

impl TableEntry {
    /// An entry for a table stored uncompressed.
    pub fn new(tag: Tag, offset: u32, length: u32, checksum: u32) -> Self {
        TableEntry {
            tag,
            offset,
            length,
            comp_length: length,
            checksum,
        }
    }

    /// `true` if the stored bytes must be inflated to recover the table.
    pub fn is_compressed(&self) -> bool {
        self.comp_length != self.length
    }
}

/// The tables of one font, keyed by tag.
///
/// Iteration follows insertion order; serialization must go through
/// [`Directory::sorted`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Directory {
    entries: IndexMap<Tag, TableEntry>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Directory {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Build a directory from parsed entries.
    ///
    /// Entries with a length of zero are dropped, matching the behaviour of
    /// the Windows rasterizer. If a tag appears more than once, the last
    /// entry wins.
    pub fn from_parsed(entries: impl IntoIterator<Item = TableEntry>) -> Self {
        let entries = entries.into_iter();
        let mut directory = Directory::with_capacity(entries.size_hint().0);
        for entry in entries {
            if entry.length == 0 {
                log::debug!("ignoring zero-length '{}' table", entry.tag);
                continue;
            }
            if directory.insert(entry).is_some() {
                log::warn!("duplicate '{}' table in directory", entry.tag);
            }
        }
        directory
    }

    /// Insert or replace the entry for `entry.tag`, returning the old entry.
    pub fn insert(&mut self, entry: TableEntry) -> Option<TableEntry> {
        self.entries.insert(entry.tag, entry)
    }

    pub fn get(&self, tag: Tag) -> Option<&TableEntry> {
        self.entries.get(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.entries.contains_key(&tag)
    }

    /// Remove an entry, preserving the order of the remaining entries.
    pub fn remove(&mut self, tag: Tag) -> Option<TableEntry> {
        self.entries.shift_remove(&tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.entries.keys().copied()
    }

    /// Entries in insertion (or file) order.
    pub fn iter(&self) -> impl Iterator<Item = &TableEntry> + '_ {
        self.entries.values()
    }

    /// Entries sorted by ascending tag.
    ///
    /// Table directories must be written in this order so that readers can
    /// binary search them.
    pub fn sorted(&self) -> Vec<TableEntry> {
        let mut entries: Vec<_> = self.entries.values().copied().collect();
        entries.sort_unstable_by_key(|entry| entry.tag);
        entries
    }
}
