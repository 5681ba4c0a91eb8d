use crate::models::*;
use std::cmp::Ordering;

/// Expand packed glyph data into one level per pixel, row-major.
///
/// Levels are 0..=1 for [`BitDepth::OneBit`] and 0..=3 for [`BitDepth::TwoBit`].
/// Missing trailing bytes read as background.
pub fn unpack_bitmap(data: &[u8], width: u32, height: u32, depth: BitDepth) -> Vec<u8> {
    let pixel_count = width as usize * height as usize;
    let bits = depth.bits();
    let per_byte = depth.pixels_per_byte();
    let mask = (1u8 << bits) - 1;

    (0..pixel_count)
        .map(|i| {
            let byte = data.get(i / per_byte).copied().unwrap_or(0);
            let shift = 8 - bits * (i % per_byte + 1);
            (byte >> shift) & mask
        })
        .collect()
}

impl FontAsset {
    /// Look up the glyph of `code_point`: binary search over the interval
    /// table, then direct indexing into the glyph table.
    pub fn find_glyph(&self, code_point: u32) -> Option<&GlyphDescriptor> {
        let idx = self
            .intervals
            .binary_search_by(|iv| {
                if iv.end < code_point {
                    Ordering::Less
                } else if iv.start > code_point {
                    Ordering::Greater
                } else {
                    Ordering::Equal
                }
            })
            .ok()?;
        let iv = &self.intervals[idx];
        let glyph_index = iv.glyph_offset as usize + (code_point - iv.start) as usize;
        self.glyphs.get(glyph_index)
    }

    /// Packed bitmap bytes of `glyph`, or `None` if it points outside the blob.
    pub fn glyph_data(&self, glyph: &GlyphDescriptor) -> Option<&[u8]> {
        let start = glyph.data_offset as usize;
        let end = start.checked_add(glyph.data_length as usize)?;
        self.bitmap_blob.get(start..end)
    }

    /// Per-pixel levels of `glyph`, see [`unpack_bitmap`].
    pub fn glyph_levels(&self, glyph: &GlyphDescriptor) -> Option<Vec<u8>> {
        let data = self.glyph_data(glyph)?;
        Some(unpack_bitmap(
            data,
            glyph.width as u32,
            glyph.height as u32,
            self.bit_depth,
        ))
    }

    /// Check every layout invariant a renderer relies on.
    pub fn validate(&self) -> Result<(), FontError> {
        let mut expected_offset = 0u64;
        for (i, iv) in self.intervals.iter().enumerate() {
            if iv.start > iv.end {
                return Err(semantic(format!(
                    "interval {i} is inverted ({:#X} > {:#X})",
                    iv.start, iv.end
                )));
            }
            if let Some(prev) = i.checked_sub(1).map(|p| &self.intervals[p]) {
                if prev.end as u64 + 1 >= iv.start as u64 {
                    return Err(semantic(format!(
                        "interval {i} overlaps or touches its predecessor"
                    )));
                }
            }
            if iv.glyph_offset as u64 != expected_offset {
                return Err(semantic(format!(
                    "interval {i} glyph offset {} expected {expected_offset}",
                    iv.glyph_offset
                )));
            }
            expected_offset += (iv.end - iv.start) as u64 + 1;
        }
        if expected_offset != self.glyphs.len() as u64 {
            return Err(semantic(format!(
                "intervals cover {expected_offset} code points but there are {} glyphs",
                self.glyphs.len()
            )));
        }

        for iv in &self.intervals {
            for cp in iv.start..=iv.end {
                let glyph = &self.glyphs[iv.glyph_offset as usize + (cp - iv.start) as usize];
                if glyph.code_point != cp {
                    return Err(semantic(format!(
                        "glyph for U+{cp:04X} holds U+{:04X}",
                        glyph.code_point
                    )));
                }
            }
        }

        let mut data_offset = 0u64;
        for glyph in &self.glyphs {
            let expected_len = self.bit_depth.packed_len(glyph.width as u32, glyph.height as u32);
            if glyph.data_length as usize != expected_len {
                return Err(semantic(format!(
                    "glyph U+{:04X} has {} bytes of data, expected {expected_len}",
                    glyph.code_point, glyph.data_length
                )));
            }
            if glyph.data_offset as u64 != data_offset {
                return Err(semantic(format!(
                    "glyph U+{:04X} starts at {}, expected {data_offset}",
                    glyph.code_point, glyph.data_offset
                )));
            }
            data_offset += glyph.data_length as u64;
        }
        if data_offset != self.bitmap_blob.len() as u64 {
            return Err(semantic(format!(
                "glyphs use {data_offset} bitmap bytes but the blob has {}",
                self.bitmap_blob.len()
            )));
        }
        Ok(())
    }
}

pub(crate) fn semantic(msg: impl Into<String>) -> FontError {
    FontError::Semantic(msg.into())
}
