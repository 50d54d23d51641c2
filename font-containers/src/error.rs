//! Errors that occur while reading or writing a font container

use std::fmt::{Display, Formatter};

use crate::Tag;

/// A table whose stored checksum does not match its contents.
///
/// Under [`ChecksumPolicy::Warn`] this is returned alongside the table data
/// as a diagnostic; under [`ChecksumPolicy::Fail`] it is wrapped in
/// [`Error::ChecksumMismatch`].
///
/// [`ChecksumPolicy::Warn`]: crate::ChecksumPolicy::Warn
/// [`ChecksumPolicy::Fail`]: crate::ChecksumPolicy::Fail
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChecksumMismatch {
    pub tag: Tag,
    /// The checksum recorded in the directory.
    pub expected: u32,
    /// The checksum computed from the table data.
    pub actual: u32,
}

/// An error that occurs when reading or writing a font container.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The backing stream failed.
    Io(std::io::Error),
    /// The input ended before a fixed-size structure could be read.
    TruncatedInput(&'static str),
    /// An unrecognized sfnt version, WOFF signature or WOFF flavor.
    BadSignature(Tag),
    /// A collection header with a version other than 1.0 or 2.0.
    BadCollectionVersion(u32),
    /// An EOT header whose magic number is not `0x504C`.
    BadEotMagic(u16),
    /// The requested font index is not present in the file.
    BadFontIndex { index: u32, num_fonts: u32 },
    /// The directory has no entry for this tag.
    UnknownTag(Tag),
    ChecksumMismatch(ChecksumMismatch),
    /// A table was rewritten with a different length.
    LengthMismatch {
        tag: Tag,
        expected: usize,
        found: usize,
    },
    /// A writer was closed after writing the wrong number of tables.
    CountMismatch { expected: u16, found: usize },
    /// A table, or the file as a whole, does not fit in 32-bit offsets.
    TableTooLarge { tag: Tag, len: usize },
    /// Compressed table data could not be inflated.
    Decompression { tag: Tag, source: std::io::Error },
    MalformedData(&'static str),
    InvalidOption(&'static str),
}

impl Error {
    /// Map an `UnexpectedEof` from the stream to [`Error::TruncatedInput`].
    pub(crate) fn from_read(err: std::io::Error, context: &'static str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::TruncatedInput(context)
        } else {
            Error::Io(err)
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ChecksumMismatch> for Error {
    fn from(src: ChecksumMismatch) -> Self {
        Error::ChecksumMismatch(src)
    }
}

impl Display for ChecksumMismatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bad checksum for '{}' table: expected 0x{:08X}, computed 0x{:08X}",
            self.tag, self.expected, self.actual
        )
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {err}"),
            Error::TruncatedInput(what) => write!(f, "Not enough data to read {what}"),
            Error::BadSignature(tag) => write!(f, "Unrecognized signature '{tag}'"),
            Error::BadCollectionVersion(ver) => {
                write!(f, "Unrecognized collection version 0x{ver:08X}")
            }
            Error::BadEotMagic(magic) => write!(f, "Invalid EOT magic number 0x{magic:04X}"),
            Error::BadFontIndex { index, num_fonts } => write!(
                f,
                "Invalid font index {index}, file contains {num_fonts} font(s)"
            ),
            Error::UnknownTag(tag) => write!(f, "No '{tag}' table in directory"),
            Error::ChecksumMismatch(mismatch) => mismatch.fmt(f),
            Error::LengthMismatch {
                tag,
                expected,
                found,
            } => write!(
                f,
                "cannot rewrite '{tag}' table: length {found} does not match directory entry ({expected})"
            ),
            Error::CountMismatch { expected, found } => write!(
                f,
                "wrong number of tables; expected {expected}, found {found}"
            ),
            Error::TableTooLarge { tag, len } => {
                write!(f, "'{tag}' table ({len} bytes) exceeds 32-bit offsets")
            }
            Error::Decompression { tag, source } => {
                write!(f, "failed to decompress '{tag}' table: {source}")
            }
            Error::MalformedData(msg) => write!(f, "Malformed data: '{msg}'"),
            Error::InvalidOption(msg) => write!(f, "Invalid option: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) | Error::Decompression { source: err, .. } => Some(err),
            _ => None,
        }
    }
}
