use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

/// A four-byte identifier, used for table tags and container signatures.
///
/// Tags read from a file are stored as-is, even when they contain bytes
/// outside the printable ASCII range; use [`Tag::new_checked`] when
/// creating a tag from user input.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Tag([u8; 4]);

impl Tag {
    /// Construct a `Tag` from raw bytes, without validation.
    pub const fn new(src: &[u8; 4]) -> Tag {
        Tag(*src)
    }

    /// Attempt to create a `Tag` from between one and four printable ascii
    /// bytes.
    ///
    /// Shorter inputs are padded with trailing spaces.
    pub const fn new_checked(src: &[u8]) -> Result<Self, InvalidTag> {
        if src.is_empty() || src.len() > 4 {
            return Err(InvalidTag::InvalidLength(src.len()));
        }
        let mut raw = [b' '; 4];
        let mut i = 0;
        while i < src.len() {
            let byte = src[i];
            if byte < 0x20 || byte > 0x7E || (i == 0 && byte == 0x20) {
                return Err(InvalidTag::InvalidByte { pos: i, byte });
            }
            raw[i] = byte;
            i += 1;
        }
        Ok(Tag(raw))
    }

    /// Create a tag from a big-endian `u32`, as stored in sfnt version fields.
    pub const fn from_u32(src: u32) -> Self {
        Tag(src.to_be_bytes())
    }

    /// Create a tag from the four bytes as they appear on disk.
    pub const fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }

    /// The on-disk representation of this tag.
    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0
    }

    /// This tag interpreted as a big-endian `u32`.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

/// An error returned by [`Tag::new_checked`] and [`Tag::from_str`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidTag {
    /// The input was not between 1 and 4 bytes long.
    InvalidLength(usize),
    /// The input contained a byte outside the printable ASCII range, or
    /// began with a space.
    InvalidByte { pos: usize, byte: u8 },
}

impl FromStr for Tag {
    type Err = InvalidTag;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        Tag::new_checked(src.as_bytes())
    }
}

impl std::error::Error for InvalidTag {}

impl Display for InvalidTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidTag::InvalidLength(len) => write!(f, "Invalid tag length ({len})"),
            InvalidTag::InvalidByte { pos, byte } => {
                write!(f, "Invalid tag byte 0x{byte:02X} at index {pos}")
            }
        }
    }
}

impl From<[u8; 4]> for Tag {
    fn from(src: [u8; 4]) -> Self {
        Tag(src)
    }
}

impl PartialEq<[u8; 4]> for Tag {
    fn eq(&self, other: &[u8; 4]) -> bool {
        &self.0 == other
    }
}

impl PartialEq<&str> for Tag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == other.as_bytes()
    }
}

impl AsRef<[u8]> for Tag {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            if (0x20..=0x7E).contains(&byte) {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "{{0x{byte:02X}}}")?;
            }
        }
        Ok(())
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tag({self})")
    }
}

// a meaningless placeholder value.
impl Default for Tag {
    fn default() -> Self {
        Tag([b' '; 4])
    }
}

// serialized as a string in human-readable formats, as raw bytes otherwise.
#[cfg(feature = "serde")]
impl serde::Serialize for Tag {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.0.serialize(serializer)
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Tag {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
            s.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; 4]>::deserialize(deserializer).map(Tag)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_tags_are_space_padded() {
        let tag = Tag::new_checked(b"cv").unwrap();
        assert_eq!(tag, *b"cv  ");
        assert_eq!(Tag::from_str("OS/2").unwrap(), Tag::new(b"OS/2"));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Tag::new_checked(b""), Err(InvalidTag::InvalidLength(0)));
        assert_eq!(Tag::new_checked(b"hello"), Err(InvalidTag::InvalidLength(5)));
        assert_eq!(
            Tag::new_checked(b" abc"),
            Err(InvalidTag::InvalidByte { pos: 0, byte: b' ' })
        );
        assert_eq!(
            Tag::new_checked(b"ab\x01c"),
            Err(InvalidTag::InvalidByte { pos: 2, byte: 1 })
        );
    }

    #[test]
    fn u32_round_trip() {
        let tag = Tag::from_u32(0x0001_0000);
        assert_eq!(tag.to_be_bytes(), [0, 1, 0, 0]);
        assert_eq!(tag.to_u32(), 0x0001_0000);
        assert_eq!(Tag::new(b"OTTO").to_u32(), 0x4F54_544F);
    }

    #[test]
    fn display_escapes_unprintable() {
        assert_eq!(Tag::new(b"glyf").to_string(), "glyf");
        assert_eq!(Tag::from_u32(0x0001_0000).to_string(), "{0x00}{0x01}{0x00}{0x00}");
        assert_eq!(format!("{:?}", Tag::new(b"head")), "Tag(head)");
    }

    #[test]
    fn ordering_is_bytewise() {
        // uppercase sorts before lowercase, as in a real table directory
        assert!(Tag::new(b"GSUB") < Tag::new(b"cmap"));
        assert!(Tag::new(b"OS/2") < Tag::new(b"head"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_as_string() {
        let tag = Tag::new(b"wOFF");
        let json = serde_json::to_string(&tag).unwrap();
        assert_eq!(json, "\"wOFF\"");
        let back: Tag = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tag);
    }
}
