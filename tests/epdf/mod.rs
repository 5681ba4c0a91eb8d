use libepdfont::{
    convert, to_epdf_bytes, to_header_string, BitDepth, CodepointInterval, ConvertConfig,
    EPDF_MAGIC, FaceMetrics, FontAsset, FontError, GlyphSource, RasterizedGlyph, RawGlyphBitmap,
};
use pretty_assertions::assert_eq;

/// Every glyph is a filled square with a one pixel hole in the middle.
struct SquareSource;

impl GlyphSource for SquareSource {
    fn has_glyph(&self, code_point: u32) -> bool {
        code_point != 0x22
    }

    fn rasterize(&self, code_point: u32, size_px: u32) -> Option<RasterizedGlyph> {
        if !self.has_glyph(code_point) {
            return None;
        }
        let side = size_px / 2 + 1;
        let mut pixels = vec![0xFF; (side * side) as usize];
        pixels[(side * side / 2) as usize] = 0;
        Some(RasterizedGlyph {
            bitmap: RawGlyphBitmap::new(side, side, pixels),
            advance_x: ((side + 1) as i64) << 6,
            bearing_left: 1,
            bearing_top: side as i32,
        })
    }

    fn face_metrics(&self, _code_point: u32, size_px: u32) -> Option<FaceMetrics> {
        Some(FaceMetrics {
            height: (size_px as i64 * 5 / 4) << 6,
            ascender: (size_px as i64) << 6,
            descender: -((size_px as i64 / 4) << 6),
        })
    }
}

fn build(depth: BitDepth) -> FontAsset {
    let config = ConvertConfig {
        requested_intervals: vec![
            CodepointInterval::new(0x20, 0x7E),
            CodepointInterval::new(0x3000, 0x3003),
        ],
        ..ConvertConfig::new(depth, 8)
    };
    convert(&config, &SquareSource).unwrap()
}

#[test]
fn epdf_bytes_load_back() {
    for depth in [BitDepth::OneBit, BitDepth::TwoBit] {
        let font = build(depth);
        let bytes = to_epdf_bytes(&font).unwrap();
        assert_eq!(&bytes[0..4], &EPDF_MAGIC.to_le_bytes());

        let loaded = FontAsset::from_bytes(&bytes).unwrap();
        assert_eq!(loaded, font);
    }
}

#[test]
fn loaded_font_renders_glyphs() {
    let bytes = to_epdf_bytes(&build(BitDepth::OneBit)).unwrap();
    let font = FontAsset::from_reader(bytes.as_slice()).unwrap();

    assert_eq!(font.interval_count(), 3);
    assert!(font.find_glyph(0x22).is_none());

    let glyph = *font.find_glyph('A' as u32).unwrap();
    assert_eq!((glyph.width, glyph.height, glyph.advance_x), (5, 5, 6));
    let mut expected = vec![1u8; 25];
    expected[12] = 0;
    assert_eq!(font.glyph_levels(&glyph), Some(expected));
}

#[test]
fn font_file_round_trip_via_path() {
    let font = build(BitDepth::TwoBit);
    let path = std::env::temp_dir().join(format!("libepdfont-{}.epdf", std::process::id()));
    std::fs::write(&path, to_epdf_bytes(&font).unwrap()).unwrap();
    let loaded = FontAsset::from_path(&path);
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded.unwrap(), font);
}

#[test]
fn missing_file_is_io_error() {
    let result = FontAsset::from_path("/nonexistent/libepdfont/font.epdf");
    assert!(matches!(result, Err(FontError::Io(_))));
}

#[test]
fn header_lists_all_tables() {
    let font = build(BitDepth::TwoBit);
    let header = to_header_string(&font, "square_8", 8).unwrap();

    assert!(header.contains(" * mode: 2-bit\n"));
    assert!(header.contains(&format!(
        "static const uint8_t square_8Bitmaps[{}] = {{",
        font.bitmap_blob.len()
    )));
    assert!(header.contains("    { 0x20, 0x21, 0x0 },\n"));
    assert!(header.contains("    { 0x23, 0x7E, 0x2 },\n"));
    assert!(header.contains("    { 0x3000, 0x3003, 0x5E },\n"));
    assert!(header.contains("},\t// A\n"));
    assert!(header.contains("    3,\n    10,\n    8,\n    -2,\n    true,\n};\n"));
    assert_eq!(header.matches("\t// ").count(), font.glyphs.len());
}
