//! Embedded OpenType: an sfnt preceded by a fixed header
//!
//! Only the fixed part of the header is supported; the name strings that
//! later versions place after it are skipped on read and never written.
//!
//! See <https://www.w3.org/submissions/EOT/>

use std::{
    collections::BTreeSet,
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    directory::{Directory, TableEntry},
    options::ReaderOptions,
    provider::{TableData, TableSink, TableSource},
    record::FixedRecord,
    sfnt::{SfntHeader, SfntReader, SfntWriter},
    Error, Tag,
};

/// The magic number at the end of the fixed EOT header.
pub const EOT_MAGIC: u16 = 0x504C;

/// The header version written by [`EotWriter`].
pub const EOT_VERSION: u32 = 0x0002_0001;

const FIXED_HEADER_LEN: usize = 36;

/// The fixed fields at the start of an EOT file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EotHeader {
    /// The size of the whole file.
    pub total_size: u32,
    /// The size of the embedded sfnt.
    pub font_data_size: u32,
    pub version: u32,
    pub flags: u32,
    pub reserved: [u16; 9],
    pub magic: u16,
}

impl EotHeader {
    /// A header for `font_data_size` bytes of sfnt data following directly.
    pub fn new(font_data_size: u32) -> Option<Self> {
        Some(EotHeader {
            total_size: font_data_size.checked_add(FIXED_HEADER_LEN as u32)?,
            font_data_size,
            version: EOT_VERSION,
            flags: 0,
            reserved: [0; 9],
            magic: EOT_MAGIC,
        })
    }

    /// The number of bytes before the sfnt data.
    pub fn header_len(&self) -> Option<u32> {
        self.total_size.checked_sub(self.font_data_size)
    }

    fn read_with<B: ByteOrder, R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        let total_size = reader.read_u32::<B>()?;
        let font_data_size = reader.read_u32::<B>()?;
        let version = reader.read_u32::<B>()?;
        let flags = reader.read_u32::<B>()?;
        let mut reserved = [0u16; 9];
        reader.read_u16_into::<B>(&mut reserved)?;
        let magic = reader.read_u16::<B>()?;
        Ok(EotHeader {
            total_size,
            font_data_size,
            version,
            flags,
            reserved,
            magic,
        })
    }

    /// Decode a header in either byte order, as indicated by its magic
    /// number.
    ///
    /// Returns the header and `true` if it was stored big-endian.
    pub fn decode(raw: &[u8; FIXED_HEADER_LEN]) -> Result<(Self, bool), Error> {
        let magic_bytes = &raw[FIXED_HEADER_LEN - 2..];
        let big_endian = if BigEndian::read_u16(magic_bytes) == EOT_MAGIC {
            true
        } else if LittleEndian::read_u16(magic_bytes) == EOT_MAGIC {
            false
        } else {
            return Err(Error::BadEotMagic(BigEndian::read_u16(magic_bytes)));
        };
        let mut cursor = raw.as_slice();
        let header = if big_endian {
            Self::read_with::<BigEndian, _>(&mut cursor)?
        } else {
            Self::read_with::<LittleEndian, _>(&mut cursor)?
        };
        Ok((header, big_endian))
    }
}

/// Headers are written big-endian, like every other record in this crate.
///
/// Little-endian headers are still accepted by [`EotHeader::decode`].
impl FixedRecord for EotHeader {
    const RAW_BYTE_LEN: usize = FIXED_HEADER_LEN;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Self::read_with::<BigEndian, _>(reader)
    }

    fn write_into<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u32::<BigEndian>(self.total_size)?;
        writer.write_u32::<BigEndian>(self.font_data_size)?;
        writer.write_u32::<BigEndian>(self.version)?;
        writer.write_u32::<BigEndian>(self.flags)?;
        for field in self.reserved {
            writer.write_u16::<BigEndian>(field)?;
        }
        writer.write_u16::<BigEndian>(self.magic)
    }
}

/// Reads the tables of the sfnt embedded in an EOT file.
#[derive(Debug)]
pub struct EotReader<R> {
    header: EotHeader,
    big_endian: bool,
    header_len: u32,
    sfnt: SfntReader<R>,
}

impl<R: Read + Seek> EotReader<R> {
    /// Parse the EOT header and the directory of the embedded sfnt.
    pub fn new(mut stream: R, options: ReaderOptions) -> Result<Self, Error> {
        stream.seek(SeekFrom::Start(0))?;
        let mut raw = [0u8; FIXED_HEADER_LEN];
        stream
            .read_exact(&mut raw)
            .map_err(|e| Error::from_read(e, "EOT header"))?;
        let (header, big_endian) = EotHeader::decode(&raw)?;
        let header_len = header.header_len().ok_or(Error::MalformedData(
            "EOT font data size exceeds total size",
        ))?;
        if (header_len as usize) < EotHeader::RAW_BYTE_LEN {
            return Err(Error::MalformedData(
                "EOT header length is shorter than the fixed header",
            ));
        }
        let sfnt = SfntReader::with_base(stream, header_len as u64, &options)?;
        Ok(EotReader {
            header,
            big_endian,
            header_len,
            sfnt,
        })
    }

    pub fn header(&self) -> &EotHeader {
        &self.header
    }

    /// `true` if the header was stored big-endian.
    pub fn is_big_endian(&self) -> bool {
        self.big_endian
    }

    /// The offset of the embedded sfnt; every directory offset is relative
    /// to this.
    pub fn header_len(&self) -> u32 {
        self.header_len
    }

    pub fn sfnt_header(&self) -> &SfntHeader {
        self.sfnt.header()
    }

    pub fn sfnt_version(&self) -> Tag {
        self.sfnt.sfnt_version()
    }

    pub fn directory(&self) -> &Directory {
        self.sfnt.directory()
    }

    /// Release the underlying stream.
    pub fn into_inner(self) -> R {
        self.sfnt.into_inner()
    }
}

impl<R: Read + Seek> TableSource for EotReader<R> {
    fn table_entry(&self, tag: Tag) -> Option<&TableEntry> {
        self.sfnt.table_entry(tag)
    }

    fn table_tags(&self) -> BTreeSet<Tag> {
        self.sfnt.table_tags()
    }

    fn table_data(&mut self, tag: Tag) -> Result<TableData, Error> {
        self.sfnt.table_data(tag)
    }

    fn remove_table(&mut self, tag: Tag) -> Option<TableEntry> {
        self.sfnt.remove_table(tag)
    }
}

/// Writes an EOT file.
///
/// The sizes in the header are only known once the embedded sfnt is
/// complete, so the sfnt is assembled in memory and copied to the stream on
/// [`EotWriter::close`].
#[derive(Debug)]
pub struct EotWriter<W> {
    stream: W,
    sfnt: SfntWriter<Cursor<Vec<u8>>>,
}

impl<W: Write + Seek> EotWriter<W> {
    pub fn new(stream: W, num_tables: u16, sfnt_version: Tag) -> Result<Self, Error> {
        Ok(EotWriter {
            stream,
            sfnt: SfntWriter::new(Cursor::new(Vec::new()), num_tables, sfnt_version)?,
        })
    }

    pub fn directory(&self) -> &Directory {
        self.sfnt.directory()
    }

    /// Finish the embedded sfnt, then write the header and font data.
    pub fn close(mut self) -> Result<W, Error> {
        let font_data = self.sfnt.close()?.into_inner();
        let header = u32::try_from(font_data.len())
            .ok()
            .and_then(EotHeader::new)
            .ok_or(Error::MalformedData("embedded font too large for EOT"))?;
        self.stream.seek(SeekFrom::Start(0))?;
        header.write_into(&mut self.stream)?;
        self.stream.write_all(&font_data)?;
        self.stream.flush()?;
        Ok(self.stream)
    }
}

impl<W: Write + Seek> TableSink for EotWriter<W> {
    fn declared_table_count(&self) -> u16 {
        self.sfnt.declared_table_count()
    }

    fn put_table(&mut self, tag: Tag, data: &[u8]) -> Result<(), Error> {
        self.sfnt.put_table(tag, data)
    }
}
