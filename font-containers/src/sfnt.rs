//! The native sfnt container: a table directory followed by table data
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font>

use std::{
    collections::BTreeSet,
    io::{self, Read, Seek, SeekFrom, Write},
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    checksum::{checksum_adjustment, table_checksum, CHECKSUM_ADJUSTMENT_OFFSET, HEAD_TAG},
    collection::{CollectionHeader, CollectionInfo, TTC_HEADER_TAG},
    directory::{round4, Directory, SearchRange, TableEntry, TABLE_RECORD_LEN},
    options::{ChecksumPolicy, ReaderOptions},
    provider::{TableData, TableSink, TableSource},
    record::{read_exact_at, write_u32_at, write_zeros, FixedRecord, ReadTagExt, WriteTagExt},
    Error, Tag,
};

/// The sfnt version for fonts containing TrueType outlines.
pub const TT_SFNT_VERSION: Tag = Tag::from_u32(0x0001_0000);
/// The sfnt version for fonts containing CFF outlines.
pub const CFF_SFNT_VERSION: Tag = Tag::new(b"OTTO");
/// The sfnt version used by some legacy Apple TrueType fonts.
pub const TRUE_SFNT_VERSION: Tag = Tag::new(b"true");

/// Returns `true` if `tag` is a recognized sfnt version (or WOFF flavor).
pub fn is_sfnt_version(tag: Tag) -> bool {
    [TT_SFNT_VERSION, CFF_SFNT_VERSION, TRUE_SFNT_VERSION].contains(&tag)
}

/// The fixed fields at the start of an sfnt table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SfntHeader {
    pub sfnt_version: Tag,
    pub num_tables: u16,
    pub search_range: u16,
    pub entry_selector: u16,
    pub range_shift: u16,
}

impl SfntHeader {
    /// A header for `num_tables` tables, with computed search parameters.
    pub fn new(sfnt_version: Tag, num_tables: u16) -> Self {
        let computed = SearchRange::for_tables(num_tables as usize);
        SfntHeader {
            sfnt_version,
            num_tables,
            search_range: computed.search_range,
            entry_selector: computed.entry_selector,
            range_shift: computed.range_shift,
        }
    }

    /// The size of this header plus its table records.
    pub fn directory_len(&self) -> usize {
        Self::RAW_BYTE_LEN + self.num_tables as usize * TABLE_RECORD_LEN
    }
}

impl FixedRecord for SfntHeader {
    const RAW_BYTE_LEN: usize = 12;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(SfntHeader {
            sfnt_version: reader.read_tag()?,
            num_tables: reader.read_u16::<BigEndian>()?,
            search_range: reader.read_u16::<BigEndian>()?,
            entry_selector: reader.read_u16::<BigEndian>()?,
            range_shift: reader.read_u16::<BigEndian>()?,
        })
    }

    fn write_into<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_tag(self.sfnt_version)?;
        writer.write_u16::<BigEndian>(self.num_tables)?;
        writer.write_u16::<BigEndian>(self.search_range)?;
        writer.write_u16::<BigEndian>(self.entry_selector)?;
        writer.write_u16::<BigEndian>(self.range_shift)
    }
}

/// One entry of an sfnt table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl FixedRecord for TableRecord {
    const RAW_BYTE_LEN: usize = TABLE_RECORD_LEN;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(TableRecord {
            tag: reader.read_tag()?,
            checksum: reader.read_u32::<BigEndian>()?,
            offset: reader.read_u32::<BigEndian>()?,
            length: reader.read_u32::<BigEndian>()?,
        })
    }

    fn write_into<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_tag(self.tag)?;
        writer.write_u32::<BigEndian>(self.checksum)?;
        writer.write_u32::<BigEndian>(self.offset)?;
        writer.write_u32::<BigEndian>(self.length)
    }
}

impl From<TableRecord> for TableEntry {
    fn from(src: TableRecord) -> TableEntry {
        TableEntry::new(src.tag, src.offset, src.length, src.checksum)
    }
}

impl From<&TableEntry> for TableRecord {
    fn from(src: &TableEntry) -> TableRecord {
        TableRecord {
            tag: src.tag,
            checksum: src.checksum,
            offset: src.offset,
            length: src.length,
        }
    }
}

/// Serialize a header and its records, sorted by tag.
pub(crate) fn serialize_directory(header: &SfntHeader, entries: &[TableEntry]) -> Vec<u8> {
    let mut data = Vec::with_capacity(header.directory_len());
    data.extend(header.to_bytes());
    for entry in entries {
        data.extend(TableRecord::from(entry).to_bytes());
    }
    data
}

/// Reads tables from an sfnt file, or from one font of a collection.
///
/// The header and directory are parsed when the reader is created; table
/// data is read on demand.
#[derive(Debug)]
pub struct SfntReader<R> {
    stream: R,
    /// Position of the start of the sfnt data within `stream`.
    base: u64,
    header: SfntHeader,
    collection: Option<CollectionInfo>,
    directory: Directory,
    checksum_policy: ChecksumPolicy,
}

impl<R: Read + Seek> SfntReader<R> {
    /// Parse the header and directory of an sfnt or collection file.
    pub fn new(stream: R, options: ReaderOptions) -> Result<Self, Error> {
        Self::with_base(stream, 0, &options)
    }

    /// Parse sfnt data that begins `base` bytes into `stream`.
    ///
    /// All offsets in the directory are taken to be relative to `base`.
    pub(crate) fn with_base(
        mut stream: R,
        base: u64,
        options: &ReaderOptions,
    ) -> Result<Self, Error> {
        stream.seek(SeekFrom::Start(base))?;
        let mut raw = [0u8; SfntHeader::RAW_BYTE_LEN];
        stream
            .read_exact(&mut raw)
            .map_err(|e| Error::from_read(e, "sfnt header"))?;

        let mut header = SfntHeader::read_from(&mut raw.as_slice())?;
        let mut directory_start = base;
        let mut collection = None;
        if header.sfnt_version == TTC_HEADER_TAG {
            let ttc_header = CollectionHeader::read_from(&mut raw.as_slice())?;
            let info = CollectionInfo::locate(&mut stream, base, &ttc_header, options.font_index)?;
            directory_start = base + info.font_offset as u64;
            stream.seek(SeekFrom::Start(directory_start))?;
            header = SfntHeader::read_exact(&mut stream, "sfnt header")?;
            collection = Some(info);
        } else if options.font_index != 0 {
            return Err(Error::BadFontIndex {
                index: options.font_index,
                num_fonts: 1,
            });
        }

        if !is_sfnt_version(header.sfnt_version) {
            return Err(Error::BadSignature(header.sfnt_version));
        }

        let records = read_exact_at(
            &mut stream,
            directory_start + SfntHeader::RAW_BYTE_LEN as u64,
            header.num_tables as usize * TABLE_RECORD_LEN,
            "table directory",
        )?;
        let mut cursor = records.as_slice();
        let entries = (0..header.num_tables)
            .map(|_| TableRecord::read_from(&mut cursor).map(TableEntry::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SfntReader {
            stream,
            base,
            header,
            collection,
            directory: Directory::from_parsed(entries),
            checksum_policy: options.checksum_policy,
        })
    }

    /// The header of the selected font's table directory.
    pub fn header(&self) -> &SfntHeader {
        &self.header
    }

    pub fn sfnt_version(&self) -> Tag {
        self.header.sfnt_version
    }

    /// If this file is a collection, which font was opened.
    pub fn collection(&self) -> Option<&CollectionInfo> {
        self.collection.as_ref()
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// The position of `entry`'s data in the underlying stream.
    pub fn stream_offset(&self, entry: &TableEntry) -> u64 {
        self.base + entry.offset as u64
    }

    /// Release the underlying stream.
    pub fn into_inner(self) -> R {
        self.stream
    }
}

impl<R: Read + Seek> TableSource for SfntReader<R> {
    fn table_entry(&self, tag: Tag) -> Option<&TableEntry> {
        self.directory.get(tag)
    }

    fn table_tags(&self) -> BTreeSet<Tag> {
        self.directory.tags().collect()
    }

    fn table_data(&mut self, tag: Tag) -> Result<TableData, Error> {
        let entry = *self.directory.get(tag).ok_or(Error::UnknownTag(tag))?;
        let pos = self.stream_offset(&entry);
        let data = read_exact_at(&mut self.stream, pos, entry.length as usize, "table data")?;
        let checksum_mismatch = self.checksum_policy.check(tag, &data, entry.checksum)?;
        Ok(TableData {
            tag,
            data,
            checksum_mismatch,
        })
    }

    fn remove_table(&mut self, tag: Tag) -> Option<TableEntry> {
        self.directory.remove(tag)
    }
}

/// Writes an sfnt file.
///
/// The number of tables is fixed when the writer is created, so that space
/// for the directory can be reserved; the directory itself is written by
/// [`SfntWriter::close`].
#[derive(Debug)]
pub struct SfntWriter<W> {
    stream: W,
    header: SfntHeader,
    next_table_offset: u32,
    directory: Directory,
}

impl<W: Write + Seek> SfntWriter<W> {
    /// Create a writer for `num_tables` tables, zero-filling the space
    /// reserved for the directory.
    pub fn new(mut stream: W, num_tables: u16, sfnt_version: Tag) -> Result<Self, Error> {
        let header = SfntHeader::new(sfnt_version, num_tables);
        let directory_len = header.directory_len();
        stream.seek(SeekFrom::Start(0))?;
        write_zeros(&mut stream, directory_len)?;
        Ok(SfntWriter {
            stream,
            header,
            // at most 12 + 16 * u16::MAX
            next_table_offset: directory_len as u32,
            directory: Directory::with_capacity(num_tables as usize),
        })
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Write the directory, solving the `head` checksum adjustment if
    /// a `head` table was written, and release the stream.
    pub fn close(mut self) -> Result<W, Error> {
        let found = self.directory.len();
        if found != self.header.num_tables as usize {
            return Err(Error::CountMismatch {
                expected: self.header.num_tables,
                found,
            });
        }

        let entries = self.directory.sorted();
        let directory = serialize_directory(&self.header, &entries);
        if let Some(head) = self.directory.get(HEAD_TAG) {
            if (head.length as usize) < CHECKSUM_ADJUSTMENT_OFFSET + 4 {
                return Err(Error::MalformedData(
                    "head table too short for checksumAdjustment",
                ));
            }
            let adjustment =
                checksum_adjustment(&directory, entries.iter().map(|entry| entry.checksum));
            let pos = head.offset as u64 + CHECKSUM_ADJUSTMENT_OFFSET as u64;
            write_u32_at(&mut self.stream, pos, adjustment)?;
            log::trace!("checksumAdjustment 0x{adjustment:08X}");
        }

        self.stream.seek(SeekFrom::Start(0))?;
        self.stream.write_all(&directory)?;
        self.stream.flush()?;
        Ok(self.stream)
    }
}

impl<W: Write + Seek> TableSink for SfntWriter<W> {
    fn declared_table_count(&self) -> u16 {
        self.header.num_tables
    }

    /// Write a table's data, padded with zeros to a 4-byte boundary.
    ///
    /// A table that has already been written may be rewritten in place,
    /// as long as its length is unchanged.
    fn put_table(&mut self, tag: Tag, data: &[u8]) -> Result<(), Error> {
        let too_large = || Error::TableTooLarge {
            tag,
            len: data.len(),
        };
        let length = u32::try_from(data.len()).map_err(|_| too_large())?;
        let offset = match self.directory.get(tag) {
            Some(entry) if entry.length != length => {
                return Err(Error::LengthMismatch {
                    tag,
                    expected: entry.length as usize,
                    found: data.len(),
                })
            }
            Some(entry) => entry.offset,
            None => {
                let offset = self.next_table_offset;
                self.next_table_offset = offset
                    .checked_add(length)
                    .and_then(round4)
                    .ok_or_else(too_large)?;
                offset
            }
        };
        let padding = round4(length).ok_or_else(too_large)? - length;

        self.stream.seek(SeekFrom::Start(offset as u64))?;
        self.stream.write_all(data)?;
        write_zeros(&mut self.stream, padding as usize)?;

        let checksum = table_checksum(tag, data);
        log::trace!("wrote '{tag}' at {offset} ({length} bytes, checksum 0x{checksum:08X})");
        self.directory
            .insert(TableEntry::new(tag, offset, length, checksum));
        Ok(())
    }
}
