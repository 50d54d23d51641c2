//! Fixed-size binary records and stream helpers

use std::io::{self, Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::{Error, Tag};

/// A structure with a fixed on-disk size, encoded field by field.
pub trait FixedRecord: Sized {
    /// The encoded size of this record, in bytes.
    const RAW_BYTE_LEN: usize;

    /// Decode the record's fields, in order.
    fn read_from<R: Read + ?Sized>(reader: &mut R) -> io::Result<Self>;

    /// Encode the record's fields, in order.
    fn write_into<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()>;

    /// Read exactly [`RAW_BYTE_LEN`](FixedRecord::RAW_BYTE_LEN) bytes and
    /// decode them.
    ///
    /// A short read is reported as [`Error::TruncatedInput`], naming
    /// `context`.
    fn read_exact<R: Read + ?Sized>(reader: &mut R, context: &'static str) -> Result<Self, Error> {
        let mut buf = vec![0u8; Self::RAW_BYTE_LEN];
        reader
            .read_exact(&mut buf)
            .map_err(|e| Error::from_read(e, context))?;
        Ok(Self::read_from(&mut buf.as_slice())?)
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::RAW_BYTE_LEN);
        self.write_into(&mut buf).expect("writing to a Vec cannot fail");
        buf
    }
}

pub(crate) trait ReadTagExt: Read {
    fn read_tag(&mut self) -> io::Result<Tag> {
        let mut raw = [0u8; 4];
        self.read_exact(&mut raw)?;
        Ok(Tag::from_be_bytes(raw))
    }
}

impl<R: Read + ?Sized> ReadTagExt for R {}

pub(crate) trait WriteTagExt: Write {
    fn write_tag(&mut self, tag: Tag) -> io::Result<()> {
        self.write_all(&tag.to_be_bytes())
    }
}

impl<W: Write + ?Sized> WriteTagExt for W {}

/// Read `len` bytes starting at `pos`.
pub(crate) fn read_exact_at<R: Read + Seek + ?Sized>(
    reader: &mut R,
    pos: u64,
    len: usize,
    context: &'static str,
) -> Result<Vec<u8>, Error> {
    reader.seek(SeekFrom::Start(pos))?;
    let mut buf = Vec::new();
    // avoid trusting a length from the file with an up-front allocation
    let read = (&mut *reader).take(len as u64).read_to_end(&mut buf)?;
    if read != len {
        return Err(Error::TruncatedInput(context));
    }
    Ok(buf)
}

/// Read a big-endian `u32` at `pos`.
pub(crate) fn read_u32_at<R: Read + Seek + ?Sized>(
    reader: &mut R,
    pos: u64,
    context: &'static str,
) -> Result<u32, Error> {
    reader.seek(SeekFrom::Start(pos))?;
    reader
        .read_u32::<BigEndian>()
        .map_err(|e| Error::from_read(e, context))
}

/// Write a big-endian `u32` at `pos`.
pub(crate) fn write_u32_at<W: Write + Seek + ?Sized>(
    writer: &mut W,
    pos: u64,
    value: u32,
) -> io::Result<()> {
    writer.seek(SeekFrom::Start(pos))?;
    writer.write_u32::<BigEndian>(value)
}

/// Physically write `len` zero bytes at the current position.
///
/// Seeking past the end of a stream does not reliably materialize the
/// skipped bytes, so gaps are always filled explicitly.
pub(crate) fn write_zeros<W: Write + ?Sized>(writer: &mut W, len: usize) -> io::Result<()> {
    const ZEROS: [u8; 64] = [0; 64];
    let mut remaining = len;
    while remaining > 0 {
        let chunk = remaining.min(ZEROS.len());
        writer.write_all(&ZEROS[..chunk])?;
        remaining -= chunk;
    }
    Ok(())
}
