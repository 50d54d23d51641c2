//! small utilities for building binary test inputs

use std::collections::HashMap;

/// A value that can be written to a [`BeBuffer`] in big-endian order.
pub trait Scalar {
    type Raw: AsRef<[u8]>;

    fn to_raw(self) -> Self::Raw;
}

macro_rules! int_scalar {
    ($($ty:ty),*) => {
        $(
            impl Scalar for $ty {
                type Raw = [u8; std::mem::size_of::<$ty>()];

                fn to_raw(self) -> Self::Raw {
                    self.to_be_bytes()
                }
            }
        )*
    };
}

int_scalar!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Raw bytes, such as a tag, are written unchanged.
impl<const N: usize> Scalar for [u8; N] {
    type Raw = [u8; N];

    fn to_raw(self) -> Self::Raw {
        self
    }
}

/// A convenience type for generating a buffer of big-endian bytes.
#[derive(Debug, Clone, Default)]
pub struct BeBuffer {
    data: Vec<u8>,
    tagged_locations: HashMap<String, usize>,
}

impl BeBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    /// The current length of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return a reference to the contents of the buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write a scalar and remember its position, for patching with
    /// [`BeBuffer::write_at`].
    pub fn push_with_tag(mut self, item: impl Scalar, tag: &str) -> Self {
        self.tagged_locations
            .insert(tag.to_string(), self.data.len());
        self.data.extend(item.to_raw().as_ref());
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            self.data.extend(item.to_raw().as_ref());
        }
        self
    }

    /// The position recorded for `tag`.
    ///
    /// Panics if no value was pushed with this tag.
    pub fn offset_for(&self, tag: &str) -> usize {
        match self.tagged_locations.get(tag) {
            Some(offset) => *offset,
            None => panic!("no value tagged '{tag}'"),
        }
    }

    /// Overwrite the value at a tagged position.
    pub fn write_at(&mut self, tag: &str, item: impl Scalar) {
        let start = self.offset_for(tag);
        let raw = item.to_raw();
        let bytes = raw.as_ref();
        let end = start + bytes.len();
        assert!(end <= self.data.len(), "write to '{tag}' runs past the end");
        self.data[start..end].copy_from_slice(bytes);
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl AsRef<[u8]> for BeBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

/// Build a [`BeBuffer`] from a comma-separated list of values.
///
/// Each item is one of:
/// - a literal or a single token, such as `7u16` or `SOME_CONST`;
/// - an expression in parentheses, such as `(*b"head")`;
/// - an array of literals, such as `[1u8, 2, 3]`, written element by element;
/// - `{value: "name"}`, which records the position for [`BeBuffer::write_at`].
#[macro_export]
macro_rules! be_buffer {
    ( $( $input:tt ),* $(,)? ) => {{
        let builder = $crate::bebuffer::BeBuffer::new();
        $(
            let builder = $crate::be_buffer_add!(builder, $input);
        )*
        builder
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! be_buffer_add {
    ($b:ident, { $v:tt : $tag:literal }) => {
        $b.push_with_tag($v, $tag)
    };
    ($b:ident, [ $( $v:literal ),+ ]) => {
        $b.extend([ $( $v ),* ])
    };
    ($b:ident, $v:tt) => {
        $b.push($v)
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn macro_items() {
        let mut buf = crate::be_buffer! {
            1u8,
            (*b"head"),
            [2u16, 3],
            {0u32: "offset"},
            (-1i16),
        };
        assert_eq!(
            buf.as_slice(),
            [1, b'h', b'e', b'a', b'd', 0, 2, 0, 3, 0, 0, 0, 0, 0xFF, 0xFF]
        );
        assert_eq!(buf.offset_for("offset"), 9);
        buf.write_at("offset", 0x0102_0304u32);
        assert_eq!(&buf[9..13], [1, 2, 3, 4]);
    }
}
