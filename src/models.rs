use std::fmt;

/// Highest valid Unicode scalar value.
pub const MAX_CODE_POINT: u32 = 0x10_FFFF;

/// A closed range of code points, `start..=end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CodepointInterval {
    pub start: u32,
    pub end: u32,
}

impl CodepointInterval {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn single(code_point: u32) -> Self {
        Self::new(code_point, code_point)
    }

    pub fn contains(&self, code_point: u32) -> bool {
        self.start <= code_point && code_point <= self.end
    }

    /// Number of code points covered. Inverted intervals count as zero.
    pub fn len(&self) -> u32 {
        if self.start > self.end {
            0
        } else {
            self.end - self.start + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn code_points(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }
}

impl fmt::Display for CodepointInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U+{:04X}..=U+{:04X}", self.start, self.end)
    }
}

/// Pixel depth of the packed glyph bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// Black and white, 8 pixels per byte.
    #[default]
    OneBit,
    /// Four gray levels, 4 pixels per byte.
    TwoBit,
}

impl BitDepth {
    pub fn bits(self) -> usize {
        match self {
            BitDepth::OneBit => 1,
            BitDepth::TwoBit => 2,
        }
    }

    pub fn pixels_per_byte(self) -> usize {
        8 / self.bits()
    }

    /// Packed size in bytes of a `width` x `height` glyph.
    pub fn packed_len(self, width: u32, height: u32) -> usize {
        (width as usize * height as usize).div_ceil(self.pixels_per_byte())
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitDepth::OneBit => write!(f, "1-bit"),
            BitDepth::TwoBit => write!(f, "2-bit"),
        }
    }
}

/// Antialiased glyph image as delivered by a rasterizer.
///
/// `pixels` holds `width * height` 8-bit coverage samples, row-major,
/// 0 being background and 255 fully inked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawGlyphBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RawGlyphBitmap {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Packed 1-bit or 2-bit encoding of a single glyph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackedBitmap {
    pub bytes: Vec<u8>,
}

impl PackedBitmap {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Layout record of one glyph inside a [`FontAsset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GlyphDescriptor {
    pub code_point: u32,
    pub width: u16,
    pub height: u16,
    pub advance_x: i16,
    pub bearing_left: i16,
    pub bearing_top: i16,
    pub data_length: u32,
    pub data_offset: u32,
}

/// Row of the interval table.
///
/// `glyph_offset` is the number of glyphs emitted for all preceding
/// intervals, so the glyph of `cp` lives at `glyph_offset + (cp - start)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IndexedInterval {
    pub start: u32,
    pub end: u32,
    pub glyph_offset: u32,
}

impl IndexedInterval {
    pub fn interval(&self) -> CodepointInterval {
        CodepointInterval::new(self.start, self.end)
    }
}

/// A complete, offset-addressed bitmap font.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontAsset {
    pub bitmap_blob: Vec<u8>,
    pub glyphs: Vec<GlyphDescriptor>,
    pub intervals: Vec<IndexedInterval>,
    pub line_height: i16,
    pub ascender: i16,
    pub descender: i16,
    pub bit_depth: BitDepth,
}

impl FontAsset {
    pub fn interval_count(&self) -> u32 {
        self.intervals.len() as u32
    }

    pub fn glyph_count(&self) -> u32 {
        self.glyphs.len() as u32
    }
}

/// A glyph as returned by a [`GlyphSource`](crate::GlyphSource).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RasterizedGlyph {
    pub bitmap: RawGlyphBitmap,
    /// Horizontal advance in 26.6 fixed point.
    pub advance_x: i64,
    /// Distance from the pen position to the left edge of the bitmap, in pixels.
    pub bearing_left: i32,
    /// Distance from the baseline to the top row of the bitmap, in pixels.
    pub bearing_top: i32,
}

/// Face-level vertical metrics in 26.6 fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FaceMetrics {
    pub height: i64,
    pub ascender: i64,
    pub descender: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid interval {start:#X}..={end:#X}")]
    InvalidInterval { start: u32, end: u32 },

    #[error("Invalid interval '{input}': {message}")]
    InvalidIntervalSyntax { input: String, message: String },

    #[error("Font size must be greater than zero")]
    ZeroFontSize,

    #[error("Glyph for U+{code_point:04X} vanished after interval validation")]
    MissingGlyph { code_point: u32 },

    #[error("Bitmap of U+{code_point:04X} has {actual} samples, expected {expected}")]
    BitmapSizeMismatch {
        code_point: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Value {value} of '{field}' for U+{code_point:04X} does not fit the glyph table")]
    MetricOutOfRange {
        code_point: u32,
        field: &'static str,
        value: i64,
    },

    #[error("'{0}' is not a valid C identifier")]
    InvalidIdentifier(String),

    #[error("Unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("Not an EPDF font (magic mismatch)")]
    InvalidMagic,

    #[error("EPDF version {0} not supported")]
    UnsupportedVersion(u32),

    #[error("Semantic error: {0}")]
    Semantic(String),
}
