//! TrueType collection (`.ttc`) headers
//!
//! See <https://learn.microsoft.com/en-us/typography/opentype/spec/otff#ttc-header>

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{
    record::{read_u32_at, FixedRecord, ReadTagExt, WriteTagExt},
    Error, Tag,
};

/// The header tag for a font collection file.
pub const TTC_HEADER_TAG: Tag = Tag::new(b"ttcf");

pub const TTC_VERSION_1: u32 = 0x0001_0000;
/// Version 2 headers append the location of a digital signature.
pub const TTC_VERSION_2: u32 = 0x0002_0000;

/// The fixed leading fields of a collection header.
///
/// The array of table directory offsets follows immediately.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionHeader {
    pub ttc_tag: Tag,
    pub version: u32,
    pub num_fonts: u32,
}

impl FixedRecord for CollectionHeader {
    const RAW_BYTE_LEN: usize = 12;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(CollectionHeader {
            ttc_tag: reader.read_tag()?,
            version: reader.read_u32::<BigEndian>()?,
            num_fonts: reader.read_u32::<BigEndian>()?,
        })
    }

    fn write_into<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_tag(self.ttc_tag)?;
        writer.write_u32::<BigEndian>(self.version)?;
        writer.write_u32::<BigEndian>(self.num_fonts)
    }
}

/// The location of a version 2 collection's `DSIG` data.
///
/// This is recorded but never validated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DsigRecord {
    /// `DSIG`, or zero if the collection is unsigned.
    pub tag: Tag,
    pub length: u32,
    pub offset: u32,
}

impl FixedRecord for DsigRecord {
    const RAW_BYTE_LEN: usize = 12;

    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self> {
        Ok(DsigRecord {
            tag: reader.read_tag()?,
            length: reader.read_u32::<BigEndian>()?,
            offset: reader.read_u32::<BigEndian>()?,
        })
    }

    fn write_into<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_tag(self.tag)?;
        writer.write_u32::<BigEndian>(self.length)?;
        writer.write_u32::<BigEndian>(self.offset)
    }
}

/// Which font of a collection a reader has opened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionInfo {
    pub version: u32,
    pub num_fonts: u32,
    pub font_index: u32,
    /// The offset of the selected font's table directory.
    pub font_offset: u32,
    signature: Option<DsigRecord>,
}

impl CollectionInfo {
    /// The signature fields of a version 2 header.
    pub fn signature(&self) -> Option<&DsigRecord> {
        self.signature.as_ref()
    }

    /// Locate font `index` in the collection whose header is at `base`.
    ///
    /// Only the one offset needed is read; the directories of the other
    /// fonts are never touched.
    pub(crate) fn locate<R: Read + Seek + ?Sized>(
        reader: &mut R,
        base: u64,
        header: &CollectionHeader,
        index: u32,
    ) -> Result<Self, Error> {
        if header.version != TTC_VERSION_1 && header.version != TTC_VERSION_2 {
            return Err(Error::BadCollectionVersion(header.version));
        }
        if index >= header.num_fonts {
            return Err(Error::BadFontIndex {
                index,
                num_fonts: header.num_fonts,
            });
        }
        let offsets_start = base + CollectionHeader::RAW_BYTE_LEN as u64;
        let font_offset = read_u32_at(
            reader,
            offsets_start + 4 * index as u64,
            "collection offset table",
        )?;

        let signature = if header.version == TTC_VERSION_2 {
            reader.seek(SeekFrom::Start(
                offsets_start + 4 * header.num_fonts as u64,
            ))?;
            let dsig = DsigRecord::read_exact(reader, "collection signature fields")?;
            log::debug!(
                "ignoring collection signature (tag '{}', {} bytes at {})",
                dsig.tag,
                dsig.length,
                dsig.offset
            );
            Some(dsig)
        } else {
            None
        };

        Ok(CollectionInfo {
            version: header.version,
            num_fonts: header.num_fonts,
            font_index: index,
            font_offset,
            signature,
        })
    }
}
