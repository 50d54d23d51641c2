//! Table and whole-file checksums
//!
//! See the [OpenType table directory] for the algorithm.
//!
//! [OpenType table directory]: https://learn.microsoft.com/en-us/typography/opentype/spec/otff#calculating-checksums

use crate::Tag;

/// The value the checksum of a complete font file must equal, once the
/// `head` table's `checksumAdjustment` has been set.
pub const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// The tag of the table that carries the `checksumAdjustment` field.
pub const HEAD_TAG: Tag = Tag::new(b"head");

/// Byte offset of `checksumAdjustment` within the `head` table.
pub const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

/// Sum `data` as a sequence of big-endian `u32`s, wrapping on overflow.
///
/// Data whose length is not a multiple of four is treated as if it were
/// padded with zeros.
pub fn checksum(data: &[u8]) -> u32 {
    checksum_from(0, data)
}

/// As [`checksum`], starting from a previous result.
///
/// This allows a checksum to be computed over discontiguous chunks, as long
/// as every chunk but the last has a length that is a multiple of four.
pub fn checksum_from(start: u32, data: &[u8]) -> u32 {
    let mut iter = data.chunks_exact(4);
    let mut sum = (&mut iter).fold(start, |sum, quad| {
        // chunks_exact only yields 4-byte slices
        let word = u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]]);
        sum.wrapping_add(word)
    });

    let rem = match *iter.remainder() {
        [a] => u32::from_be_bytes([a, 0, 0, 0]),
        [a, b] => u32::from_be_bytes([a, b, 0, 0]),
        [a, b, c] => u32::from_be_bytes([a, b, c, 0]),
        _ => 0,
    };
    sum = sum.wrapping_add(rem);
    sum
}

/// The checksum recorded in a directory entry for the table `tag`.
///
/// For the `head` table the four bytes of `checksumAdjustment` are treated
/// as zero, since that field is solved from the checksum itself.
pub fn table_checksum(tag: Tag, data: &[u8]) -> u32 {
    let sum = checksum(data);
    if tag != HEAD_TAG {
        return sum;
    }
    // the adjustment field is word-aligned, so it contributes exactly the
    // (zero-padded) word at that offset.
    let field = data
        .get(CHECKSUM_ADJUSTMENT_OFFSET..)
        .map(|rest| {
            let mut word = [0u8; 4];
            let len = rest.len().min(4);
            word[..len].copy_from_slice(&rest[..len]);
            u32::from_be_bytes(word)
        })
        .unwrap_or_default();
    sum.wrapping_sub(field)
}

/// Solve the `head` table's `checksumAdjustment`.
///
/// `directory` is the serialized header and table directory;
/// `table_checksums` are the checksums recorded for every table.
pub fn checksum_adjustment(
    directory: &[u8],
    table_checksums: impl IntoIterator<Item = u32>,
) -> u32 {
    let total = table_checksums
        .into_iter()
        .fold(checksum(directory), u32::wrapping_add);
    CHECKSUM_MAGIC.wrapping_sub(total)
}

/// The checksum of an entire font file.
///
/// For a well-formed sfnt with a `head` table this is [`CHECKSUM_MAGIC`].
pub fn file_checksum(data: &[u8]) -> u32 {
    checksum(data)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(&[], 0)]
    #[case(&[0, 0, 0, 1], 1)]
    #[case(&[1], 0x0100_0000)]
    #[case(&[0, 0, 1, 0, 0, 0, 0, 2], 0x102)]
    #[case(&[0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 2], 1)]
    #[case(&[0x12, 0x34, 0x56], 0x1234_5600)]
    fn word_sums(#[case] data: &[u8], #[case] expected: u32) {
        assert_eq!(checksum(data), expected);
    }

    #[test]
    fn chained_sums() {
        let data = b"abcdefgh123";
        let whole = checksum(data);
        let chained = checksum_from(checksum(&data[..4]), &data[4..]);
        assert_eq!(whole, chained);
    }

    #[test]
    fn head_ignores_adjustment_field() {
        let mut head = font_test_data::tables::HEAD.to_vec();
        let before = table_checksum(HEAD_TAG, &head);
        head[8..12].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(table_checksum(HEAD_TAG, &head), before);

        head[8..12].fill(0);
        assert_eq!(checksum(&head), before);
    }

    #[test]
    fn only_head_is_special() {
        let data = font_test_data::tables::HEAD;
        assert_ne!(
            table_checksum(Tag::new(b"hhea"), data),
            table_checksum(HEAD_TAG, data)
        );
        assert_eq!(table_checksum(Tag::new(b"hhea"), data), checksum(data));
    }

    #[test]
    fn short_head_tables() {
        // shorter than the adjustment field; the partial field is still zeroed
        let short = [0u8, 0, 0, 1, 0, 0, 0, 2, 0xAA, 0xBB];
        assert_eq!(table_checksum(HEAD_TAG, &short), 3);
        assert_eq!(table_checksum(HEAD_TAG, &short[..6]), checksum(&short[..6]));
    }

    #[test]
    fn adjustment_solves_for_magic() {
        let directory = [0u8, 1, 0, 0, 0, 1, 0, 16, 0, 0, 0, 0];
        let sums = [0x1234_5678u32, 0xFFFF_FFFF];
        let adjustment = checksum_adjustment(&directory, sums);
        let total = sums
            .iter()
            .fold(checksum(&directory), |acc, x| acc.wrapping_add(*x))
            .wrapping_add(adjustment);
        assert_eq!(total, CHECKSUM_MAGIC);
    }
}
