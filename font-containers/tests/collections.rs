//! Selecting one font from a TrueType collection

use std::io::Cursor;

use font_containers::{
    collection::{TTC_VERSION_1, TTC_VERSION_2},
    ChecksumPolicy, Error, ReaderOptions, SfntReader, Tag, TableSource,
};
use font_test_data::{be_buffer, bebuffer::BeBuffer};

/// Two fonts sharing a `cvt ` table; the first font's directory is corrupt.
fn two_font_collection(version: u32) -> BeBuffer {
    let header = be_buffer! {
        (*b"ttcf"), version, 2u32,
        {0u32: "font0"},
        {0u32: "font1"}
    };
    let mut buf = if version == TTC_VERSION_2 {
        header.push(*b"DSIG").push(0u32).push(0u32)
    } else {
        header
    };

    let font0 = buf.len() as u32;
    buf = buf
        .extend(*b"bad!")
        .push(1u16)
        .extend([16u16, 0, 0])
        .push(*b"cvt ")
        .push(7u32)
        .push_with_tag(0u32, "font0_cvt")
        .push(4u32);

    let font1 = buf.len() as u32;
    buf = buf
        .push(0x0001_0000u32)
        .push(2u16)
        .extend([32u16, 1, 0])
        .push(*b"cvt ")
        .push(7u32)
        .push_with_tag(0u32, "font1_cvt")
        .push(4u32)
        .push(*b"fpgm")
        .push(9u32)
        .push_with_tag(0u32, "font1_fpgm")
        .push(4u32);

    let shared_cvt = buf.len() as u32;
    buf = buf.extend([0u8, 0, 0, 7]).extend([0u8, 0, 0, 9]);

    buf.write_at("font0", font0);
    buf.write_at("font1", font1);
    buf.write_at("font0_cvt", shared_cvt);
    buf.write_at("font1_cvt", shared_cvt);
    buf.write_at("font1_fpgm", shared_cvt + 4);
    buf
}

fn open(data: &[u8], index: u32) -> Result<SfntReader<Cursor<&[u8]>>, Error> {
    SfntReader::new(
        Cursor::new(data),
        ReaderOptions::new()
            .checksum_policy(ChecksumPolicy::Fail)
            .font_index(index),
    )
}

#[test]
fn second_font_is_read_without_the_first() {
    let data = two_font_collection(TTC_VERSION_1);
    let mut reader = open(&data, 1).unwrap();

    let info = reader.collection().unwrap();
    assert_eq!((info.font_index, info.num_fonts), (1, 2));
    assert!(info.signature().is_none());
    assert_eq!(reader.header().num_tables, 2);

    let tags: Vec<_> = reader.table_tags().into_iter().collect();
    assert_eq!(tags, [Tag::new(b"cvt "), Tag::new(b"fpgm")]);
    assert_eq!(reader.get_table(Tag::new(b"cvt ")).unwrap(), [0, 0, 0, 7]);
    assert_eq!(reader.get_table(Tag::new(b"fpgm")).unwrap(), [0, 0, 0, 9]);
}

#[test]
fn first_font_directory_is_still_validated() {
    let data = two_font_collection(TTC_VERSION_1);
    assert!(matches!(
        open(&data, 0),
        Err(Error::BadSignature(tag)) if tag == Tag::new(b"bad!")
    ));
}

#[test]
fn version_two_headers() {
    let data = two_font_collection(TTC_VERSION_2);
    let mut reader = open(&data, 1).unwrap();
    let dsig = reader.collection().unwrap().signature().copied().unwrap();
    assert_eq!(dsig.tag, Tag::new(b"DSIG"));
    assert_eq!(reader.get_table(Tag::new(b"fpgm")).unwrap(), [0, 0, 0, 9]);
}

#[test]
fn out_of_range_index() {
    let data = two_font_collection(TTC_VERSION_1);
    assert!(matches!(
        open(&data, 2),
        Err(Error::BadFontIndex {
            index: 2,
            num_fonts: 2
        })
    ));
}

#[test]
fn unknown_collection_version() {
    let data = be_buffer! {
        (*b"ttcf"), 0x0003_0000u32, 1u32, 16u32
    };
    assert!(matches!(
        open(&data, 0),
        Err(Error::BadCollectionVersion(0x0003_0000))
    ));
}
