//! EPDF: the binary rendering of a [`FontAsset`].
//!
//! All fields are little-endian.
//!
//! ```text
//! header (36 bytes)
//!   magic "EPDF", version, header_size, flags, interval_count,
//!   glyph_count, bitmap_size                       u32 each
//!   line_height, ascender, descender               i16 each
//!   reserved                                       u16
//! interval_count x { start, end, glyph_offset }    u32 each
//! glyph_count x { code_point u32, width u16, height u16, advance_x i16,
//!                 left i16, top i16, reserved u16,
//!                 data_length u32, data_offset u32 }
//! bitmap blob (bitmap_size bytes)
//! ```

#[cfg(feature = "decoding")]
use crate::models::IndexedInterval;
use crate::models::{BitDepth, FontAsset, FontError, GlyphDescriptor};
#[cfg(feature = "decoding")]
use crate::utils::semantic;

pub const EPDF_MAGIC: u32 = u32::from_le_bytes(*b"EPDF");
const EPDF_MAX_VERSION: u32 = 0;
const EPDF_HEADER_SIZE: u32 = 36;
const EPDF_FLAG_TWO_BIT: u32 = 0x01;
const INTERVAL_RECORD_SIZE: usize = 12;
const GLYPH_RECORD_SIZE: usize = 24;

/// Serialize a font to EPDF bytes.
///
/// The layout is validated first, an inconsistent asset is never written.
#[cfg(feature = "encoding")]
pub fn to_epdf_bytes(font: &FontAsset) -> Result<Vec<u8>, FontError> {
    font.validate()?;
    let bitmap_size = u32::try_from(font.bitmap_blob.len())
        .map_err(|_| FontError::Semantic("bitmap blob exceeds 4 GiB".to_string()))?;

    let flags = match font.bit_depth {
        BitDepth::OneBit => 0,
        BitDepth::TwoBit => EPDF_FLAG_TWO_BIT,
    };

    let mut data = Vec::with_capacity(
        EPDF_HEADER_SIZE as usize
            + font.intervals.len() * INTERVAL_RECORD_SIZE
            + font.glyphs.len() * GLYPH_RECORD_SIZE
            + font.bitmap_blob.len(),
    );
    data.extend_from_slice(&EPDF_MAGIC.to_le_bytes());
    data.extend_from_slice(&EPDF_MAX_VERSION.to_le_bytes());
    data.extend_from_slice(&EPDF_HEADER_SIZE.to_le_bytes());
    data.extend_from_slice(&flags.to_le_bytes());
    data.extend_from_slice(&font.interval_count().to_le_bytes());
    data.extend_from_slice(&font.glyph_count().to_le_bytes());
    data.extend_from_slice(&bitmap_size.to_le_bytes());
    data.extend_from_slice(&font.line_height.to_le_bytes());
    data.extend_from_slice(&font.ascender.to_le_bytes());
    data.extend_from_slice(&font.descender.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());

    for iv in &font.intervals {
        data.extend_from_slice(&iv.start.to_le_bytes());
        data.extend_from_slice(&iv.end.to_le_bytes());
        data.extend_from_slice(&iv.glyph_offset.to_le_bytes());
    }

    for glyph in &font.glyphs {
        write_glyph(&mut data, glyph);
    }

    data.extend_from_slice(&font.bitmap_blob);
    Ok(data)
}

#[cfg(feature = "encoding")]
fn write_glyph(data: &mut Vec<u8>, glyph: &GlyphDescriptor) {
    data.extend_from_slice(&glyph.code_point.to_le_bytes());
    data.extend_from_slice(&glyph.width.to_le_bytes());
    data.extend_from_slice(&glyph.height.to_le_bytes());
    data.extend_from_slice(&glyph.advance_x.to_le_bytes());
    data.extend_from_slice(&glyph.bearing_left.to_le_bytes());
    data.extend_from_slice(&glyph.bearing_top.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&glyph.data_length.to_le_bytes());
    data.extend_from_slice(&glyph.data_offset.to_le_bytes());
}

/// Little-endian cursor; running out of bytes is `UnexpectedEndOfInput`.
#[cfg(feature = "decoding")]
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

#[cfg(feature = "decoding")]
impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], FontError> {
        let end = self.pos + N;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or(FontError::UnexpectedEndOfInput)?;
        self.pos = end;
        let mut buf = [0u8; N];
        buf.copy_from_slice(slice);
        Ok(buf)
    }

    fn u32(&mut self) -> Result<u32, FontError> {
        self.take().map(u32::from_le_bytes)
    }

    fn u16(&mut self) -> Result<u16, FontError> {
        self.take().map(u16::from_le_bytes)
    }

    fn i16(&mut self) -> Result<i16, FontError> {
        self.take().map(i16::from_le_bytes)
    }
}

#[cfg(feature = "decoding")]
pub(crate) fn parse_epdf(bytes: &[u8]) -> Result<FontAsset, FontError> {
    if bytes.len() < EPDF_HEADER_SIZE as usize {
        return Err(FontError::UnexpectedEndOfInput);
    }
    let mut header = Reader::new(bytes);
    if header.u32()? != EPDF_MAGIC {
        return Err(FontError::InvalidMagic);
    }
    let version = header.u32()?;
    if version > EPDF_MAX_VERSION {
        return Err(FontError::UnsupportedVersion(version));
    }
    let header_size = header.u32()? as usize;
    if header_size < EPDF_HEADER_SIZE as usize {
        return Err(semantic(format!(
            "EPDF: invalid header_size {header_size} (<{EPDF_HEADER_SIZE})"
        )));
    }
    let flags = header.u32()?;
    let interval_count = header.u32()? as usize;
    let glyph_count = header.u32()? as usize;
    let bitmap_size = header.u32()? as usize;
    let line_height = header.i16()?;
    let ascender = header.i16()?;
    let descender = header.i16()?;
    if header.u16()? != 0 {
        return Err(semantic("EPDF: reserved header field is not zero"));
    }

    if flags & !EPDF_FLAG_TWO_BIT != 0 {
        return Err(semantic(format!("EPDF: unknown flags {flags:#X}")));
    }
    let bit_depth = if flags & EPDF_FLAG_TWO_BIT != 0 {
        BitDepth::TwoBit
    } else {
        BitDepth::OneBit
    };

    // Reject absurd counts before allocating anything.
    let expected_len = interval_count
        .checked_mul(INTERVAL_RECORD_SIZE)
        .and_then(|n| n.checked_add(glyph_count.checked_mul(GLYPH_RECORD_SIZE)?))
        .and_then(|n| n.checked_add(bitmap_size))
        .and_then(|n| n.checked_add(header_size))
        .ok_or_else(|| semantic("EPDF: table sizes overflow"))?;
    if bytes.len() < expected_len {
        return Err(FontError::UnexpectedEndOfInput);
    }

    let mut body = Reader::new(&bytes[header_size..]);

    let mut intervals = Vec::with_capacity(interval_count);
    for _ in 0..interval_count {
        intervals.push(IndexedInterval {
            start: body.u32()?,
            end: body.u32()?,
            glyph_offset: body.u32()?,
        });
    }

    let mut glyphs = Vec::with_capacity(glyph_count);
    for _ in 0..glyph_count {
        let code_point = body.u32()?;
        let width = body.u16()?;
        let height = body.u16()?;
        let advance_x = body.i16()?;
        let bearing_left = body.i16()?;
        let bearing_top = body.i16()?;
        if body.u16()? != 0 {
            return Err(semantic(format!(
                "EPDF: reserved field of glyph U+{code_point:04X} is not zero"
            )));
        }
        glyphs.push(GlyphDescriptor {
            code_point,
            width,
            height,
            advance_x,
            bearing_left,
            bearing_top,
            data_length: body.u32()?,
            data_offset: body.u32()?,
        });
    }

    let blob_start = header_size + body.pos;
    let bitmap_blob = bytes[blob_start..blob_start + bitmap_size].to_vec();

    let font = FontAsset {
        bitmap_blob,
        glyphs,
        intervals,
        line_height,
        ascender,
        descender,
        bit_depth,
    };
    font.validate()?;
    Ok(font)
}
