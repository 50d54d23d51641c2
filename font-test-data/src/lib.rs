//! test data shared by the font-containers tests.

pub mod bebuffer;

/// Individual tables, for building fonts in tests.
pub mod tables {

    /// A `head` table with a non-zero `checksumAdjustment`.
    #[rustfmt::skip]
    pub static HEAD: &[u8] = &[
        0x00, 0x01, 0x00, 0x00, // version 1.0
        0x00, 0x02, 0x80, 0x00, // fontRevision 2.5
        0x12, 0x34, 0x56, 0x78, // checksumAdjustment (stale)
        0x5F, 0x0F, 0x3C, 0xF5, // magicNumber
        0x00, 0x0B,             // flags
        0x03, 0xE8,             // unitsPerEm 1000
        0x00, 0x00, 0x00, 0x00, // created
        0xDA, 0x56, 0x58, 0x00,
        0x00, 0x00, 0x00, 0x00, // modified
        0xDB, 0x1A, 0x2C, 0x80,
        0xFF, 0xCE,             // xMin -50
        0xFF, 0x06,             // yMin -250
        0x04, 0x4C,             // xMax 1100
        0x03, 0x84,             // yMax 900
        0x00, 0x00,             // macStyle
        0x00, 0x08,             // lowestRecPPEM
        0x00, 0x02,             // fontDirectionHint
        0x00, 0x01,             // indexToLocFormat
        0x00, 0x00,             // glyphDataFormat
    ];

    /// A version 1.0 `maxp` table.
    #[rustfmt::skip]
    pub static MAXP: &[u8] = &[
        0x00, 0x01, 0x00, 0x00, // version 1.0
        0x00, 0x04,             // numGlyphs
        0x00, 0x20,             // maxPoints
        0x00, 0x03,             // maxContours
        0x00, 0x00,             // maxCompositePoints
        0x00, 0x00,             // maxCompositeContours
        0x00, 0x02,             // maxZones
        0x00, 0x00,             // maxTwilightPoints
        0x00, 0x10,             // maxStorage
        0x00, 0x01,             // maxFunctionDefs
        0x00, 0x00,             // maxInstructionDefs
        0x00, 0x40,             // maxStackElements
        0x00, 0x00,             // maxSizeOfInstructions
        0x00, 0x00,             // maxComponentElements
        0x00, 0x00,             // maxComponentDepth
    ];

    /// A version 3.0 `post` table.
    #[rustfmt::skip]
    pub static POST: &[u8] = &[
        0x00, 0x03, 0x00, 0x00, // version 3.0
        0xFF, 0xF4, 0x00, 0x00, // italicAngle -12
        0xFF, 0x9C,             // underlinePosition -100
        0x00, 0x32,             // underlineThickness 50
        0x00, 0x00, 0x00, 0x00, // isFixedPitch
        0x00, 0x00, 0x00, 0x00, // minMemType42
        0x00, 0x00, 0x00, 0x00, // maxMemType42
        0x00, 0x00, 0x00, 0x00, // minMemType1
        0x00, 0x00, 0x00, 0x00, // maxMemType1
    ];

    /// A short `cvt ` table that zlib cannot shrink.
    #[rustfmt::skip]
    pub static CVT: &[u8] = &[
        0x00, 0x2A, 0xFF, 0x9C, 0x01, 0x07, 0xFE, 0x31, 0x00, 0x0D,
    ];

    /// A `glyf` table of four identical square glyphs, which compresses
    /// well.
    #[rustfmt::skip]
    pub static GLYF: &[u8] = &[
        // glyph 0
        0x00, 0x01,             // numberOfContours
        0x00, 0x32, 0x00, 0x00, // xMin, yMin
        0x01, 0xC2, 0x02, 0xBC, // xMax, yMax
        0x00, 0x03,             // endPtsOfContours
        0x00, 0x00,             // instructionLength
        0x33, 0x23, 0x33, 0x23, // flags
        0x32, 0x01, 0x90,       // x deltas
        0x02, 0xBC, 0x02, 0xBC, // y deltas
        0x00,                   // padding
        // glyph 1
        0x00, 0x01,
        0x00, 0x32, 0x00, 0x00,
        0x01, 0xC2, 0x02, 0xBC,
        0x00, 0x03,
        0x00, 0x00,
        0x33, 0x23, 0x33, 0x23,
        0x32, 0x01, 0x90,
        0x02, 0xBC, 0x02, 0xBC,
        0x00,
        // glyph 2
        0x00, 0x01,
        0x00, 0x32, 0x00, 0x00,
        0x01, 0xC2, 0x02, 0xBC,
        0x00, 0x03,
        0x00, 0x00,
        0x33, 0x23, 0x33, 0x23,
        0x32, 0x01, 0x90,
        0x02, 0xBC, 0x02, 0xBC,
        0x00,
        // glyph 3
        0x00, 0x01,
        0x00, 0x32, 0x00, 0x00,
        0x01, 0xC2, 0x02, 0xBC,
        0x00, 0x03,
        0x00, 0x00,
        0x33, 0x23, 0x33, 0x23,
        0x32, 0x01, 0x90,
        0x02, 0xBC, 0x02, 0xBC,
        0x00,
    ];
}
