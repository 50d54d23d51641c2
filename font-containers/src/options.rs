//! Options for readers and writers

use flate2::Compression;

use crate::{
    checksum::table_checksum,
    error::{ChecksumMismatch, Error},
    Tag,
};

/// How a reader responds when a table's checksum does not match its data.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChecksumPolicy {
    /// Do not compute checksums at all.
    Ignore,
    /// Return the data, along with a [`ChecksumMismatch`] diagnostic.
    #[default]
    Warn,
    /// Fail with [`Error::ChecksumMismatch`].
    Fail,
}

impl ChecksumPolicy {
    /// Check `data` against the checksum recorded in the directory.
    pub fn check(
        self,
        tag: Tag,
        data: &[u8],
        expected: u32,
    ) -> Result<Option<ChecksumMismatch>, Error> {
        if self == ChecksumPolicy::Ignore {
            return Ok(None);
        }
        let actual = table_checksum(tag, data);
        if actual == expected {
            return Ok(None);
        }
        let mismatch = ChecksumMismatch {
            tag,
            expected,
            actual,
        };
        match self {
            ChecksumPolicy::Fail => Err(mismatch.into()),
            _ => {
                log::warn!("{mismatch}");
                Ok(Some(mismatch))
            }
        }
    }
}

/// Options shared by the SFNT, WOFF and EOT readers.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[non_exhaustive]
pub struct ReaderOptions {
    pub checksum_policy: ChecksumPolicy,
    /// The font to open in a collection file.
    ///
    /// Must be 0 for files that are not collections.
    pub font_index: u32,
}

impl ReaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }

    pub fn font_index(mut self, index: u32) -> Self {
        self.font_index = index;
        self
    }
}

/// Whether the WOFF writer attempts to compress tables.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompressionPolicy {
    /// Compress, and keep the result only if it is strictly smaller.
    #[default]
    WhenSmaller,
    /// Store every table uncompressed.
    Never,
}

/// Options for [`WoffWriter`](crate::WoffWriter).
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct WoffOptions {
    pub compression: CompressionPolicy,
    pub level: Compression,
    /// Table data is padded to a multiple of this many bytes.
    ///
    /// WOFF 1.0 requires 4; 1 disables padding.
    pub alignment: u32,
    pub major_version: u16,
    pub minor_version: u16,
}

impl Default for WoffOptions {
    fn default() -> Self {
        WoffOptions {
            compression: CompressionPolicy::WhenSmaller,
            level: Compression::default(),
            alignment: 4,
            major_version: 1,
            minor_version: 0,
        }
    }
}

impl WoffOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compression(mut self, policy: CompressionPolicy) -> Self {
        self.compression = policy;
        self
    }

    pub fn level(mut self, level: Compression) -> Self {
        self.level = level;
        self
    }

    pub fn alignment(mut self, alignment: u32) -> Self {
        self.alignment = alignment;
        self
    }

    /// The font version recorded in the WOFF header.
    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major_version = major;
        self.minor_version = minor;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !self.alignment.is_power_of_two() {
            return Err(Error::InvalidOption("alignment must be a power of two"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignore_skips_verification() {
        let tag = Tag::new(b"maxp");
        assert!(ChecksumPolicy::Ignore
            .check(tag, b"data", 0)
            .unwrap()
            .is_none());
    }

    #[test]
    fn warn_returns_diagnostic() {
        let tag = Tag::new(b"maxp");
        let mismatch = ChecksumPolicy::Warn.check(tag, b"data", 0).unwrap().unwrap();
        assert_eq!(mismatch.expected, 0);
        assert_eq!(mismatch.actual, u32::from_be_bytes(*b"data"));
        let matching = ChecksumPolicy::Warn
            .check(tag, b"data", u32::from_be_bytes(*b"data"))
            .unwrap();
        assert!(matching.is_none());
    }

    #[test]
    fn fail_is_an_error() {
        let tag = Tag::new(b"maxp");
        let err = ChecksumPolicy::Fail.check(tag, b"data", 7).unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch(m) if m.expected == 7));
    }

    #[test]
    fn alignment_must_be_power_of_two() {
        assert!(WoffOptions::new().alignment(1).validate().is_ok());
        assert!(WoffOptions::new().alignment(4).validate().is_ok());
        assert!(matches!(
            WoffOptions::new().alignment(3).validate(),
            Err(Error::InvalidOption(_))
        ));
        assert!(WoffOptions::new().alignment(0).validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn reader_options_from_json() {
        let options: ReaderOptions =
            serde_json::from_str(r#"{"checksum_policy": "Fail"}"#).unwrap();
        assert_eq!(options, ReaderOptions::new().checksum_policy(ChecksumPolicy::Fail));
    }
}
