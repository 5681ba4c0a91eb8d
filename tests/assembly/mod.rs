use libepdfont::{
    assemble, compact, convert, pack, BitDepth, CodepointInterval, ConvertConfig, FaceMetrics,
    FontError, GlyphSource, RasterizedGlyph, RawGlyphBitmap,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;

/// Synthetic source: every code point renders as a glyph whose size and
/// pixels derive from the code point itself.
struct SyntheticSource {
    missing: BTreeSet<u32>,
}

impl SyntheticSource {
    fn complete() -> Self {
        Self {
            missing: BTreeSet::new(),
        }
    }
}

fn synthetic_bitmap(code_point: u32) -> RawGlyphBitmap {
    let width = code_point % 7;
    let height = code_point % 5 + 1;
    let pixels = (0..width * height)
        .map(|i| (i.wrapping_mul(37).wrapping_add(code_point) % 256) as u8)
        .collect();
    RawGlyphBitmap::new(width, height, pixels)
}

impl GlyphSource for SyntheticSource {
    fn has_glyph(&self, code_point: u32) -> bool {
        !self.missing.contains(&code_point)
    }

    fn rasterize(&self, code_point: u32, _size_px: u32) -> Option<RasterizedGlyph> {
        if !self.has_glyph(code_point) {
            return None;
        }
        let bitmap = synthetic_bitmap(code_point);
        Some(RasterizedGlyph {
            advance_x: ((bitmap.width + 1) as i64) << 6,
            bearing_left: 0,
            bearing_top: bitmap.height as i32,
            bitmap,
        })
    }

    fn face_metrics(&self, code_point: u32, _size_px: u32) -> Option<FaceMetrics> {
        self.has_glyph(code_point).then_some(FaceMetrics {
            height: 1100,
            ascender: 900,
            descender: -200,
        })
    }
}

/// Source whose glyphs disappear between validation and assembly.
struct FlakySource;

impl GlyphSource for FlakySource {
    fn has_glyph(&self, _code_point: u32) -> bool {
        true
    }

    fn rasterize(&self, code_point: u32, _size_px: u32) -> Option<RasterizedGlyph> {
        (code_point != 0x43).then(|| RasterizedGlyph {
            bitmap: synthetic_bitmap(code_point),
            ..Default::default()
        })
    }

    fn face_metrics(&self, _code_point: u32, _size_px: u32) -> Option<FaceMetrics> {
        None
    }
}

#[test]
fn assembled_glyphs_match_packer_output() {
    let source = SyntheticSource::complete();
    let intervals = [CodepointInterval::new(0x41, 0x5A)];
    let font = assemble(&intervals, &source, BitDepth::TwoBit, 20).unwrap();

    for glyph in &font.glyphs {
        let expected = pack(&synthetic_bitmap(glyph.code_point), BitDepth::TwoBit);
        assert_eq!(font.glyph_data(glyph), Some(expected.bytes.as_slice()));
    }
    assert_eq!((font.line_height, font.ascender, font.descender), (18, 15, -4));
}

#[test]
fn glyph_vanishing_after_validation_aborts() {
    let result = convert(
        &ConvertConfig {
            requested_intervals: vec![CodepointInterval::new(0x41, 0x45)],
            ..ConvertConfig::new(BitDepth::OneBit, 12)
        },
        &FlakySource,
    );
    assert!(matches!(
        result,
        Err(FontError::MissingGlyph { code_point: 0x43 })
    ));
}

#[test]
fn missing_reference_glyph_is_not_fatal() {
    let source = SyntheticSource {
        missing: [0x7C, 0x4E28].into_iter().collect(),
    };
    let font = assemble(&[CodepointInterval::new(0x61, 0x63)], &source, BitDepth::OneBit, 12)
        .unwrap();
    assert_eq!(font.glyph_count(), 3);
    assert_eq!((font.line_height, font.ascender, font.descender), (0, 0, 0));
}

fn requested_strategy() -> impl Strategy<Value = Vec<CodepointInterval>> {
    prop::collection::vec((0x20u32..0x200, 0u32..48), 1..8).prop_map(|v| {
        v.into_iter()
            .map(|(start, len)| CodepointInterval::new(start, start + len))
            .collect()
    })
}

proptest! {
    #[test]
    fn offsets_are_prefix_sums(
        requested in requested_strategy(),
        missing in prop::collection::btree_set(0x20u32..0x230, 0..40),
        two_bit in any::<bool>(),
    ) {
        let depth = if two_bit { BitDepth::TwoBit } else { BitDepth::OneBit };
        let source = SyntheticSource { missing };
        let intervals = compact(&requested, None, |cp| source.has_glyph(cp));
        let font = assemble(&intervals, &source, depth, 16).unwrap();

        for pair in font.glyphs.windows(2) {
            prop_assert!(pair[0].code_point < pair[1].code_point);
            prop_assert_eq!(pair[0].data_offset + pair[0].data_length, pair[1].data_offset);
        }
        let used: u32 = font.glyphs.iter().map(|g| g.data_length).sum();
        prop_assert_eq!(used as usize, font.bitmap_blob.len());
        prop_assert!(font.validate().is_ok());
    }

    #[test]
    fn glyphs_are_positionally_addressable(
        requested in requested_strategy(),
        missing in prop::collection::btree_set(0x20u32..0x230, 0..40),
    ) {
        let source = SyntheticSource { missing };
        let config = ConvertConfig {
            requested_intervals: requested.clone(),
            core_range: None,
            ..ConvertConfig::new(BitDepth::OneBit, 16)
        };
        let font = convert(&config, &source).unwrap();

        let mut expected_offset = 0;
        for iv in &font.intervals {
            prop_assert_eq!(iv.glyph_offset, expected_offset);
            for cp in iv.start..=iv.end {
                let glyph = &font.glyphs[(iv.glyph_offset + (cp - iv.start)) as usize];
                prop_assert_eq!(glyph.code_point, cp);
            }
            expected_offset += iv.end - iv.start + 1;
        }

        for cp in 0x20u32..0x230 {
            let wanted = requested.iter().any(|r| r.contains(cp)) && source.has_glyph(cp);
            prop_assert_eq!(font.find_glyph(cp).map(|g| g.code_point), wanted.then_some(cp));
        }
    }
}
