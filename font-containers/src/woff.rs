//! The WOFF 1.0 container: sfnt tables with optional per-table zlib compression
//!
//! See <https://www.w3.org/TR/WOFF/>

use std::{
    borrow::Cow,
    collections::BTreeSet,
    io::{self, Read, Seek, SeekFrom, Write},
};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::{
    checksum::{checksum_adjustment, table_checksum, CHECKSUM_ADJUSTMENT_OFFSET, HEAD_TAG},
    directory::{align_to, round4, Directory, TableEntry},
    options::{ChecksumPolicy, CompressionPolicy, ReaderOptions, WoffOptions},
    provider::{TableData, TableSink, TableSource},
    record::{read_exact_at, write_zeros, FixedRecord, ReadTagExt, WriteTagExt},
    sfnt::{is_sfnt_version, serialize_directory, SfntHeader},
    Error, Tag,
};

/// The signature at the start of every WOFF file.
pub const WOFF_SIGNATURE: Tag = Tag::new(b"wOFF");

/// The WOFF file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WoffHeader {
    pub signature: Tag,
    /// The sfnt version of the wrapped font.
    pub flavor: Tag,
    /// Header, directory and stored table bytes, excluding padding.
    pub length: u32,
    pub num_tables: u16,
    pub reserved: u16,
    /// Size of the uncompressed font: sfnt header, directory and original
    /// table lengths, excluding padding.
    pub total_sfnt_size: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub meta_offset: u32,
    pub meta_length: u32,
    pub meta_orig_length: u32,
    pub priv_offset: u32,
    pub priv_length: u32,
}

impl WoffHeader {
    /// The size of this header plus its table records.
    pub fn directory_len(&self) -> usize {
        directory_len(self.num_tables)
    }
}

fn directory_len(num_tables: u16) -> usize {
    WoffHeader::RAW_BYTE_LEN + num_tables as usize * WoffTableRecord::RAW_BYTE_LEN
}

impl FixedRecord for WoffHeader {
    const RAW_BYTE_LEN: usize = 44;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(WoffHeader {
            signature: reader.read_tag()?,
            flavor: reader.read_tag()?,
            length: reader.read_u32::<BigEndian>()?,
            num_tables: reader.read_u16::<BigEndian>()?,
            reserved: reader.read_u16::<BigEndian>()?,
            total_sfnt_size: reader.read_u32::<BigEndian>()?,
            major_version: reader.read_u16::<BigEndian>()?,
            minor_version: reader.read_u16::<BigEndian>()?,
            meta_offset: reader.read_u32::<BigEndian>()?,
            meta_length: reader.read_u32::<BigEndian>()?,
            meta_orig_length: reader.read_u32::<BigEndian>()?,
            priv_offset: reader.read_u32::<BigEndian>()?,
            priv_length: reader.read_u32::<BigEndian>()?,
        })
    }

    fn write_into<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_tag(self.signature)?;
        writer.write_tag(self.flavor)?;
        writer.write_u32::<BigEndian>(self.length)?;
        writer.write_u16::<BigEndian>(self.num_tables)?;
        writer.write_u16::<BigEndian>(self.reserved)?;
        writer.write_u32::<BigEndian>(self.total_sfnt_size)?;
        writer.write_u16::<BigEndian>(self.major_version)?;
        writer.write_u16::<BigEndian>(self.minor_version)?;
        writer.write_u32::<BigEndian>(self.meta_offset)?;
        writer.write_u32::<BigEndian>(self.meta_length)?;
        writer.write_u32::<BigEndian>(self.meta_orig_length)?;
        writer.write_u32::<BigEndian>(self.priv_offset)?;
        writer.write_u32::<BigEndian>(self.priv_length)
    }
}

/// One entry of a WOFF table directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WoffTableRecord {
    pub tag: Tag,
    pub offset: u32,
    /// The number of bytes stored in the file.
    pub comp_length: u32,
    pub orig_length: u32,
    pub orig_checksum: u32,
}

impl FixedRecord for WoffTableRecord {
    const RAW_BYTE_LEN: usize = 20;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(WoffTableRecord {
            tag: reader.read_tag()?,
            offset: reader.read_u32::<BigEndian>()?,
            comp_length: reader.read_u32::<BigEndian>()?,
            orig_length: reader.read_u32::<BigEndian>()?,
            orig_checksum: reader.read_u32::<BigEndian>()?,
        })
    }

    fn write_into<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_tag(self.tag)?;
        writer.write_u32::<BigEndian>(self.offset)?;
        writer.write_u32::<BigEndian>(self.comp_length)?;
        writer.write_u32::<BigEndian>(self.orig_length)?;
        writer.write_u32::<BigEndian>(self.orig_checksum)
    }
}

impl From<WoffTableRecord> for TableEntry {
    fn from(src: WoffTableRecord) -> TableEntry {
        TableEntry {
            tag: src.tag,
            offset: src.offset,
            length: src.orig_length,
            comp_length: src.comp_length,
            checksum: src.orig_checksum,
        }
    }
}

impl From<&TableEntry> for WoffTableRecord {
    fn from(src: &TableEntry) -> WoffTableRecord {
        WoffTableRecord {
            tag: src.tag,
            offset: src.offset,
            comp_length: src.comp_length,
            orig_length: src.length,
            orig_checksum: src.checksum,
        }
    }
}

/// Reads tables from a WOFF file, inflating them as needed.
#[derive(Debug)]
pub struct WoffReader<R> {
    stream: R,
    header: WoffHeader,
    directory: Directory,
    checksum_policy: ChecksumPolicy,
}

impl<R: Read + Seek> WoffReader<R> {
    /// Parse the header and directory of a WOFF file.
    pub fn new(mut stream: R, options: ReaderOptions) -> Result<Self, Error> {
        stream.seek(SeekFrom::Start(0))?;
        let header = WoffHeader::read_exact(&mut stream, "WOFF header")?;
        if header.signature != WOFF_SIGNATURE {
            return Err(Error::BadSignature(header.signature));
        }
        if !is_sfnt_version(header.flavor) {
            return Err(Error::BadSignature(header.flavor));
        }
        if options.font_index != 0 {
            return Err(Error::BadFontIndex {
                index: options.font_index,
                num_fonts: 1,
            });
        }

        let records = read_exact_at(
            &mut stream,
            WoffHeader::RAW_BYTE_LEN as u64,
            header.num_tables as usize * WoffTableRecord::RAW_BYTE_LEN,
            "WOFF table directory",
        )?;
        let mut cursor = records.as_slice();
        let entries = (0..header.num_tables)
            .map(|_| WoffTableRecord::read_from(&mut cursor).map(TableEntry::from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WoffReader {
            stream,
            header,
            directory: Directory::from_parsed(entries),
            checksum_policy: options.checksum_policy,
        })
    }

    pub fn header(&self) -> &WoffHeader {
        &self.header
    }

    /// The sfnt version of the wrapped font.
    pub fn flavor(&self) -> Tag {
        self.header.flavor
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Release the underlying stream.
    pub fn into_inner(self) -> R {
        self.stream
    }
}

impl<R: Read + Seek> TableSource for WoffReader<R> {
    fn table_entry(&self, tag: Tag) -> Option<&TableEntry> {
        self.directory.get(tag)
    }

    fn table_tags(&self) -> BTreeSet<Tag> {
        self.directory.tags().collect()
    }

    fn table_data(&mut self, tag: Tag) -> Result<TableData, Error> {
        let entry = *self.directory.get(tag).ok_or(Error::UnknownTag(tag))?;
        if entry.comp_length > entry.length {
            return Err(Error::MalformedData(
                "compressed length exceeds original length",
            ));
        }
        let stored = read_exact_at(
            &mut self.stream,
            entry.offset as u64,
            entry.comp_length as usize,
            "table data",
        )?;
        let data = if entry.is_compressed() {
            decompress(tag, &stored, entry.length)?
        } else {
            stored
        };
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

/// Inflate `stored`, which must expand to exactly `orig_length` bytes.
fn decompress(tag: Tag, stored: &[u8], orig_length: u32) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    // one extra byte is enough to detect overlong streams
    ZlibDecoder::new(stored)
        .take(orig_length as u64 + 1)
        .read_to_end(&mut data)
        .map_err(|source| Error::Decompression { tag, source })?;
    if data.len() != orig_length as usize {
        return Err(Error::MalformedData(
            "decompressed length does not match origLength",
        ));
    }
    Ok(data)
}

fn compress(data: &[u8], level: Compression) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len()), level);
    encoder.write_all(data)?;
    encoder.finish()
}

/// Writes a WOFF file.
///
/// Tables are compressed when that makes them smaller, and stored as-is
/// otherwise. The `head` table is held in memory until [`WoffWriter::close`],
/// where its `checksumAdjustment` is set for the font a decoder will rebuild.
#[derive(Debug)]
pub struct WoffWriter<W> {
    stream: W,
    flavor: Tag,
    num_tables: u16,
    options: WoffOptions,
    next_table_offset: u32,
    directory: Directory,
    head: Option<Vec<u8>>,
}

impl<W: Write + Seek> WoffWriter<W> {
    /// Create a writer for `num_tables` tables, using the default options.
    pub fn new(stream: W, num_tables: u16, flavor: Tag) -> Result<Self, Error> {
        Self::with_options(stream, num_tables, flavor, WoffOptions::default())
    }

    pub fn with_options(
        mut stream: W,
        num_tables: u16,
        flavor: Tag,
        options: WoffOptions,
    ) -> Result<Self, Error> {
        options.validate()?;
        // at most 44 + 20 * u16::MAX
        let directory_len = directory_len(num_tables) as u32;
        let first_table = align_to(directory_len, options.alignment)
            .ok_or(Error::InvalidOption("alignment too large"))?;
        stream.seek(SeekFrom::Start(0))?;
        write_zeros(&mut stream, first_table as usize)?;
        Ok(WoffWriter {
            stream,
            flavor,
            num_tables,
            options,
            next_table_offset: first_table,
            directory: Directory::with_capacity(num_tables as usize),
            head: None,
        })
    }

    /// Entries for the tables stored so far.
    ///
    /// A `head` table is not stored until the writer is closed.
    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    fn written_table_count(&self) -> usize {
        self.directory.len() + usize::from(self.head.is_some())
    }

    /// The bytes to store for `data`: compressed if that helps.
    fn encode<'a>(&self, tag: Tag, data: &'a [u8]) -> Result<Cow<'a, [u8]>, Error> {
        if self.options.compression == CompressionPolicy::Never {
            return Ok(Cow::Borrowed(data));
        }
        let compressed = compress(data, self.options.level)?;
        if compressed.len() < data.len() {
            Ok(Cow::Owned(compressed))
        } else {
            log::debug!(
                "storing '{tag}' uncompressed ({} bytes, {} compressed)",
                data.len(),
                compressed.len()
            );
            Ok(Cow::Borrowed(data))
        }
    }

    /// Reserve an aligned slot for `len` bytes at the end of the file.
    fn allocate(&mut self, len: u32) -> Option<(u32, u32)> {
        let offset = self.next_table_offset;
        let slot = align_to(len, self.options.alignment)?;
        self.next_table_offset = offset.checked_add(slot)?;
        Some((offset, slot))
    }

    /// Write the stored form of a table, reusing its old slot when it fits.
    fn store(&mut self, tag: Tag, data: &[u8]) -> Result<(), Error> {
        let length = u32::try_from(data.len()).map_err(|_| Error::TableTooLarge {
            tag,
            len: data.len(),
        })?;
        let checksum = table_checksum(tag, data);
        let stored = self.encode(tag, data)?;
        let too_large = || Error::TableTooLarge {
            tag,
            len: stored.len(),
        };
        // never larger than `length`
        let comp_length = stored.len() as u32;

        let previous = self.directory.get(tag).copied();
        let (offset, slot) = match previous {
            Some(old) => {
                let old_slot = align_to(old.comp_length, self.options.alignment)
                    .ok_or_else(too_large)?;
                if comp_length <= old_slot {
                    (old.offset, old_slot)
                } else {
                    self.stream.seek(SeekFrom::Start(old.offset as u64))?;
                    write_zeros(&mut self.stream, old_slot as usize)?;
                    self.allocate(comp_length).ok_or_else(too_large)?
                }
            }
            None => self.allocate(comp_length).ok_or_else(too_large)?,
        };

        self.stream.seek(SeekFrom::Start(offset as u64))?;
        self.stream.write_all(&stored)?;
        write_zeros(&mut self.stream, (slot - comp_length) as usize)?;

        log::trace!("wrote '{tag}' at {offset} ({comp_length} of {length} bytes)");
        self.directory.insert(TableEntry {
            tag,
            offset,
            length,
            comp_length,
            checksum,
        });
        Ok(())
    }

    /// `length`: this header and directory plus every stored table, without
    /// padding.
    fn woff_length(entries: &[TableEntry]) -> Result<u32, Error> {
        Self::sum_lengths(
            directory_len(entries.len() as u16) as u32,
            entries,
            |entry| entry.comp_length,
        )
    }

    /// `totalSfntSize`: an sfnt header and directory plus every original
    /// table length, without padding.
    fn total_sfnt_size(entries: &[TableEntry]) -> Result<u32, Error> {
        Self::sum_lengths(
            SfntHeader::new(Tag::default(), entries.len() as u16).directory_len() as u32,
            entries,
            |entry| entry.length,
        )
    }

    fn sum_lengths(
        start: u32,
        entries: &[TableEntry],
        length: impl Fn(&TableEntry) -> u32,
    ) -> Result<u32, Error> {
        entries.iter().try_fold(start, |total, entry| {
            total
                .checked_add(length(entry))
                .ok_or(Error::TableTooLarge {
                    tag: entry.tag,
                    len: entry.length as usize,
                })
        })
    }

    /// Set `checksumAdjustment` in `head` for the sfnt a decoder rebuilds:
    /// tables in tag order, each padded to four bytes.
    fn adjust_head(&self, head: &mut [u8]) -> Result<(), Error> {
        let mut entries: Vec<_> = self.directory.iter().copied().collect();
        entries.push(TableEntry::new(
            HEAD_TAG,
            0,
            head.len() as u32,
            table_checksum(HEAD_TAG, head),
        ));
        entries.sort_unstable_by_key(|entry| entry.tag);

        let header = SfntHeader::new(self.flavor, entries.len() as u16);
        let mut offset = header.directory_len() as u32;
        for entry in entries.iter_mut() {
            entry.offset = offset;
            offset = round4(entry.length)
                .and_then(|len| offset.checked_add(len))
                .ok_or(Error::TableTooLarge {
                    tag: entry.tag,
                    len: entry.length as usize,
                })?;
        }

        let directory = serialize_directory(&header, &entries);
        let adjustment =
            checksum_adjustment(&directory, entries.iter().map(|entry| entry.checksum));
        log::trace!("checksumAdjustment 0x{adjustment:08X}");
        let field = CHECKSUM_ADJUSTMENT_OFFSET..CHECKSUM_ADJUSTMENT_OFFSET + 4;
        head[field].copy_from_slice(&adjustment.to_be_bytes());
        Ok(())
    }

    /// Store `head`, write the header and directory, and release the stream.
    pub fn close(mut self) -> Result<W, Error> {
        let found = self.written_table_count();
        if found != self.num_tables as usize {
            return Err(Error::CountMismatch {
                expected: self.num_tables,
                found,
            });
        }

        if let Some(mut head) = self.head.take() {
            if head.len() < CHECKSUM_ADJUSTMENT_OFFSET + 4 {
                return Err(Error::MalformedData(
                    "head table too short for checksumAdjustment",
                ));
            }
            self.adjust_head(&mut head)?;
            self.store(HEAD_TAG, &head)?;
        }

        let entries = self.directory.sorted();
        let header = WoffHeader {
            signature: WOFF_SIGNATURE,
            flavor: self.flavor,
            length: Self::woff_length(&entries)?,
            num_tables: self.num_tables,
            reserved: 0,
            total_sfnt_size: Self::total_sfnt_size(&entries)?,
            major_version: self.options.major_version,
            minor_version: self.options.minor_version,
            meta_offset: 0,
            meta_length: 0,
            meta_orig_length: 0,
            priv_offset: 0,
            priv_length: 0,
        };

        self.stream.seek(SeekFrom::Start(0))?;
        header.write_into(&mut self.stream)?;
        for entry in &entries {
            WoffTableRecord::from(entry).write_into(&mut self.stream)?;
        }
        self.stream.flush()?;
        Ok(self.stream)
    }
}

impl<W: Write + Seek> TableSink for WoffWriter<W> {
    fn declared_table_count(&self) -> u16 {
        self.num_tables
    }

    /// Compress and write a table.
    ///
    /// Rewriting a table is allowed if its uncompressed length is unchanged;
    /// the new data is stored in the old slot if it fits and appended
    /// otherwise.
    fn put_table(&mut self, tag: Tag, data: &[u8]) -> Result<(), Error> {
        let previous_len = match (&self.head, self.directory.get(tag)) {
            (Some(head), _) if tag == HEAD_TAG => Some(head.len()),
            (_, Some(entry)) => Some(entry.length as usize),
            _ => None,
        };
        if let Some(expected) = previous_len.filter(|len| *len != data.len()) {
            return Err(Error::LengthMismatch {
                tag,
                expected,
                found: data.len(),
            });
        }

        if tag == HEAD_TAG {
            if u32::try_from(data.len()).is_err() {
                return Err(Error::TableTooLarge {
                    tag,
                    len: data.len(),
                });
            }
            self.head = Some(data.to_vec());
            return Ok(());
        }
        self.store(tag, data)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use font_test_data::{be_buffer, bebuffer::BeBuffer, tables};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        checksum::{file_checksum, CHECKSUM_MAGIC},
        provider::copy_tables,
        sfnt::{SfntReader, SfntWriter, TT_SFNT_VERSION},
    };

    fn tag(raw: &[u8; 4]) -> Tag {
        Tag::new(raw)
    }

    fn write_woff(options: WoffOptions, tables: &[(&[u8; 4], &[u8])]) -> Vec<u8> {
        let mut writer = WoffWriter::with_options(
            Cursor::new(Vec::new()),
            tables.len() as u16,
            TT_SFNT_VERSION,
            options,
        )
        .unwrap();
        for (raw_tag, data) in tables {
            writer.put_table(tag(raw_tag), data).unwrap();
        }
        writer.close().unwrap().into_inner()
    }

    fn read_woff(data: &[u8]) -> WoffReader<Cursor<&[u8]>> {
        WoffReader::new(
            Cursor::new(data),
            ReaderOptions::new().checksum_policy(ChecksumPolicy::Fail),
        )
        .unwrap()
    }

    #[test]
    fn compresses_only_when_smaller() {
        let woff = write_woff(
            WoffOptions::default(),
            &[(b"glyf", tables::GLYF), (b"cvt ", tables::CVT)],
        );
        let mut reader = read_woff(&woff);

        let glyf = *reader.table_entry(tag(b"glyf")).unwrap();
        assert!(glyf.comp_length < glyf.length);
        let cvt = *reader.table_entry(tag(b"cvt ")).unwrap();
        assert_eq!(cvt.comp_length, cvt.length);

        assert_eq!(reader.get_table(tag(b"glyf")).unwrap(), tables::GLYF);
        assert_eq!(reader.get_table(tag(b"cvt ")).unwrap(), tables::CVT);
    }

    #[test]
    fn never_compress() {
        let woff = write_woff(
            WoffOptions::new().compression(CompressionPolicy::Never),
            &[(b"glyf", tables::GLYF)],
        );
        let mut reader = read_woff(&woff);
        assert!(!reader.table_entry(tag(b"glyf")).unwrap().is_compressed());
        assert_eq!(reader.get_table(tag(b"glyf")).unwrap(), tables::GLYF);
    }

    #[test]
    fn header_fields() {
        let woff = write_woff(
            WoffOptions::new().version(2, 5),
            &[(b"glyf", tables::GLYF), (b"cvt ", tables::CVT)],
        );
        let reader = read_woff(&woff);
        let header = reader.header();
        assert_eq!(header.signature, WOFF_SIGNATURE);
        assert_eq!(header.flavor, TT_SFNT_VERSION);
        let stored: u32 = reader.directory().iter().map(|e| e.comp_length).sum();
        assert_eq!(header.length, 44 + 2 * 20 + stored);
        assert_eq!(header.num_tables, 2);
        assert_eq!(header.reserved, 0);
        let expected_sfnt_size = 12 + 2 * 16 + (tables::GLYF.len() + tables::CVT.len()) as u32;
        assert_eq!(header.total_sfnt_size, expected_sfnt_size);
        assert_eq!((header.major_version, header.minor_version), (2, 5));
        assert_eq!(
            (header.meta_offset, header.meta_length, header.meta_orig_length),
            (0, 0, 0)
        );
        assert_eq!((header.priv_offset, header.priv_length), (0, 0));
    }

    #[test]
    fn size_fields_exclude_padding() {
        for alignment in [1u32, 4] {
            let woff = write_woff(
                WoffOptions::new().alignment(alignment),
                &[(b"fpgm", &[1u8, 2, 3, 4, 5][..]), (b"prep", &[6u8, 7, 8][..])],
            );
            let header = *read_woff(&woff).header();
            assert_eq!((header.length, header.total_sfnt_size), (92, 52), "{alignment}");
        }
    }

    #[test]
    fn directory_is_sorted() {
        let woff = write_woff(
            WoffOptions::default(),
            &[(b"post", tables::POST), (b"cvt ", tables::CVT), (b"OS/2", &[1u8; 8][..])],
        );
        let mut cursor = &woff[44..];
        let tags: Vec<_> = (0..3)
            .map(|_| WoffTableRecord::read_from(&mut cursor).unwrap().tag)
            .collect();
        assert_eq!(tags, [tag(b"OS/2"), tag(b"cvt "), tag(b"post")]);
    }

    #[test]
    fn alignment_is_configurable() {
        for alignment in [1u32, 4, 8] {
            let woff = write_woff(
                WoffOptions::new().alignment(alignment),
                &[(b"cvt ", tables::CVT), (b"fpgm", &[7u8; 5][..])],
            );
            let reader = read_woff(&woff);
            let mut entries: Vec<_> = reader.directory().iter().copied().collect();
            entries.sort_by_key(|entry| entry.offset);
            for entry in &entries {
                assert_eq!(entry.offset % alignment, 0, "alignment {alignment}");
            }
            let end = (entries[0].offset + entries[0].comp_length) as usize;
            assert!(woff[end..entries[1].offset as usize].iter().all(|b| *b == 0));
        }
        assert!(matches!(
            WoffWriter::with_options(
                Cursor::new(Vec::new()),
                1,
                TT_SFNT_VERSION,
                WoffOptions::new().alignment(6)
            ),
            Err(Error::InvalidOption(_))
        ));
    }

    #[test]
    fn head_is_adjusted_for_the_decoded_font() {
        let woff = write_woff(
            WoffOptions::default(),
            &[
                (b"post", tables::POST),
                (b"head", tables::HEAD),
                (b"glyf", tables::GLYF),
                (b"maxp", tables::MAXP),
            ],
        );
        let mut reader = read_woff(&woff);
        let head = reader.get_table(HEAD_TAG).unwrap();
        assert_eq!(&head[..8], &tables::HEAD[..8]);

        let mut writer =
            SfntWriter::new(Cursor::new(Vec::new()), 4, reader.flavor()).unwrap();
        copy_tables(&mut reader, &mut writer).unwrap();
        let sfnt = writer.close().unwrap().into_inner();
        assert_eq!(file_checksum(&sfnt), CHECKSUM_MAGIC);
        let orig_lengths: usize = [tables::POST, tables::HEAD, tables::GLYF, tables::MAXP]
            .iter()
            .map(|table| table.len())
            .sum();
        assert_eq!(
            reader.header().total_sfnt_size as usize,
            12 + 4 * 16 + orig_lengths
        );

        // the sfnt writer solves the same adjustment
        let mut sfnt_reader =
            SfntReader::new(Cursor::new(&sfnt[..]), ReaderOptions::new()).unwrap();
        assert_eq!(sfnt_reader.get_table(HEAD_TAG).unwrap(), head);
    }

    #[test]
    fn short_head_is_rejected() {
        let mut writer = WoffWriter::new(Cursor::new(Vec::new()), 1, TT_SFNT_VERSION).unwrap();
        writer.put_table(HEAD_TAG, &[0; 11]).unwrap();
        assert!(matches!(writer.close(), Err(Error::MalformedData(_))));
    }

    #[test]
    fn rewrites() {
        let compressible = vec![0u8; 256];
        let mut noisy = vec![0u8; 256];
        for (i, byte) in noisy.iter_mut().enumerate() {
            *byte = (i as u8).wrapping_mul(167).wrapping_add(13) ^ (i >> 3) as u8;
        }

        let mut writer = WoffWriter::new(Cursor::new(Vec::new()), 2, TT_SFNT_VERSION).unwrap();
        writer.put_table(tag(b"prep"), &compressible).unwrap();
        writer.put_table(tag(b"fpgm"), tables::CVT).unwrap();
        let first = *writer.directory().get(tag(b"prep")).unwrap();

        // same contents fit the old slot
        writer.put_table(tag(b"prep"), &compressible).unwrap();
        assert_eq!(writer.directory().get(tag(b"prep")).unwrap().offset, first.offset);

        // data that compresses worse is moved to the end
        writer.put_table(tag(b"prep"), &noisy).unwrap();
        let moved = *writer.directory().get(tag(b"prep")).unwrap();
        assert!(moved.offset > first.offset);

        assert!(matches!(
            writer.put_table(tag(b"prep"), &noisy[1..]),
            Err(Error::LengthMismatch { expected: 256, found: 255, .. })
        ));

        let woff = writer.close().unwrap().into_inner();
        let old_slot = first.offset as usize..(first.offset + first.comp_length) as usize;
        assert!(woff[old_slot].iter().all(|b| *b == 0));

        let mut reader = read_woff(&woff);
        assert_eq!(reader.get_table(tag(b"prep")).unwrap(), noisy);
        assert_eq!(reader.get_table(tag(b"fpgm")).unwrap(), tables::CVT);
    }

    #[test]
    fn head_rewrite_checks_length() {
        let mut writer = WoffWriter::new(Cursor::new(Vec::new()), 1, TT_SFNT_VERSION).unwrap();
        writer.put_table(HEAD_TAG, tables::HEAD).unwrap();
        assert!(matches!(
            writer.put_table(HEAD_TAG, &tables::HEAD[..20]),
            Err(Error::LengthMismatch { .. })
        ));
        writer.put_table(HEAD_TAG, tables::HEAD).unwrap();
        assert!(writer.close().is_ok());
    }

    #[test]
    fn count_mismatch() {
        let mut writer = WoffWriter::new(Cursor::new(Vec::new()), 2, TT_SFNT_VERSION).unwrap();
        writer.put_table(HEAD_TAG, tables::HEAD).unwrap();
        assert!(matches!(
            writer.close(),
            Err(Error::CountMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    fn hand_built_woff(
        signature: &[u8; 4],
        flavor: u32,
        records: &[(&[u8; 4], u32, u32, u32, u32)],
    ) -> BeBuffer {
        let mut buf = be_buffer! {
            (*signature), flavor,
            0u32,                      // length
            (records.len() as u16),
            0u16,                      // reserved
            0u32,                      // totalSfntSize
            1u16, 0u16,                // version
            [0u32, 0, 0, 0, 0]         // meta and private blocks
        };
        for (raw_tag, offset, comp_length, orig_length, checksum) in records {
            buf = buf
                .push(**raw_tag)
                .push(*offset)
                .push(*comp_length)
                .push(*orig_length)
                .push(*checksum);
        }
        buf
    }

    #[test]
    fn zero_length_entries_are_dropped() {
        let buf = hand_built_woff(
            b"wOFF",
            0x0001_0000,
            &[(b"DSIG", 0, 0, 0, 0), (b"cvt ", 84, 4, 4, 7)],
        )
        .extend([0u8, 0, 0, 7]);
        let mut reader = read_woff(&buf);
        assert_eq!(reader.table_tags().len(), 1);
        assert!(!reader.has_table(tag(b"DSIG")));
        assert_eq!(reader.get_table(tag(b"cvt ")).unwrap(), [0, 0, 0, 7]);
    }

    #[test]
    fn bad_signature_and_flavor() {
        let buf = hand_built_woff(b"wOF2", 0x0001_0000, &[]);
        assert!(matches!(
            WoffReader::new(Cursor::new(buf.as_slice()), ReaderOptions::new()),
            Err(Error::BadSignature(t)) if t == tag(b"wOF2")
        ));
        let buf = hand_built_woff(b"wOFF", 0x7474_6366, &[]);
        assert!(matches!(
            WoffReader::new(Cursor::new(buf.as_slice()), ReaderOptions::new()),
            Err(Error::BadSignature(t)) if t == tag(b"ttcf")
        ));
        assert!(matches!(
            WoffReader::new(Cursor::new(&buf[..20]), ReaderOptions::new()),
            Err(Error::TruncatedInput("WOFF header"))
        ));
    }

    #[test]
    fn malformed_tables() {
        let buf = hand_built_woff(b"wOFF", 0x0001_0000, &[(b"cvt ", 64, 8, 4, 0)])
            .extend([0u8; 8]);
        let mut reader = read_woff(&buf);
        assert!(matches!(
            reader.get_table(tag(b"cvt ")),
            Err(Error::MalformedData(_))
        ));

        let buf = hand_built_woff(b"wOFF", 0x0001_0000, &[(b"cvt ", 64, 4, 10, 0)])
            .extend([1u8, 2, 3, 4]);
        let mut reader = read_woff(&buf);
        assert!(matches!(
            reader.get_table(tag(b"cvt ")),
            Err(Error::Decompression { .. })
        ));

        // a valid stream that inflates to the wrong size
        let compressed = compress(&[0u8; 64], Compression::best()).unwrap();
        let buf = hand_built_woff(
            b"wOFF",
            0x0001_0000,
            &[(b"cvt ", 64, compressed.len() as u32, 32, 0)],
        )
        .extend(compressed);
        let mut reader = read_woff(&buf);
        assert!(matches!(
            reader.get_table(tag(b"cvt ")),
            Err(Error::MalformedData(_))
        ));
    }
}
