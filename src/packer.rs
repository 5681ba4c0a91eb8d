use crate::models::{BitDepth, PackedBitmap, RawGlyphBitmap};

/// Reduces an 8-bit coverage sample to the 4-bit intermediate both depths start from.
#[inline]
fn to_gray4(sample: u8) -> u8 {
    sample >> 4
}

#[inline]
fn one_bit_level(gray4: u8) -> u8 {
    // at least 2/16 coverage counts as ink
    u8::from(gray4 & 0x0E > 0)
}

#[inline]
fn two_bit_level(gray4: u8) -> u8 {
    match gray4 {
        12..=15 => 3,
        8..=11 => 2,
        4..=7 => 1,
        _ => 0,
    }
}

/// Packs one glyph into a row-major bitstream, most significant bits first.
///
/// Pixels run on across row boundaries without per-row alignment; only the
/// very last byte of the glyph is zero padded in its low bits. The result is
/// `ceil(width * height / pixels_per_byte)` bytes long.
///
/// `bitmap.pixels` must hold at least `width * height` samples, extra
/// samples are ignored.
pub fn pack(bitmap: &RawGlyphBitmap, depth: BitDepth) -> PackedBitmap {
    let pixel_count = bitmap.pixel_count();
    let bits = depth.bits();
    let per_byte = depth.pixels_per_byte();

    let mut bytes = Vec::with_capacity(pixel_count.div_ceil(per_byte));
    let mut acc: u8 = 0;

    for (i, &sample) in bitmap.pixels.iter().take(pixel_count).enumerate() {
        let gray4 = to_gray4(sample);
        let level = match depth {
            BitDepth::OneBit => one_bit_level(gray4),
            BitDepth::TwoBit => two_bit_level(gray4),
        };
        acc = (acc << bits) | level;
        if i % per_byte == per_byte - 1 {
            bytes.push(acc);
            acc = 0;
        }
    }

    let rem = pixel_count % per_byte;
    if rem != 0 {
        let padded = match depth {
            BitDepth::OneBit => acc << (8 - rem),
            BitDepth::TwoBit => acc << ((4 - rem) * 2),
        };
        bytes.push(padded);
    }

    PackedBitmap { bytes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::unpack_bitmap;
    use proptest::prelude::*;

    fn bitmap(width: u32, height: u32, pixels: &[u8]) -> RawGlyphBitmap {
        RawGlyphBitmap::new(width, height, pixels.to_vec())
    }

    #[test]
    fn test_one_bit_two_by_two() {
        let packed = pack(&bitmap(2, 2, &[0, 255, 255, 0]), BitDepth::OneBit);
        assert_eq!(packed.bytes, vec![0b0110_0000]);
    }

    #[test]
    fn test_one_bit_threshold() {
        // 0x1F -> 1 (below threshold), 0x20 -> 2 (ink)
        let packed = pack(
            &bitmap(8, 1, &[0x00, 0x1F, 0x20, 0x2F, 0x10, 0xF0, 0x30, 0xFF]),
            BitDepth::OneBit,
        );
        assert_eq!(packed.bytes, vec![0b0011_0111]);
    }

    #[test]
    fn test_one_bit_rows_are_not_aligned() {
        // 3x3 all ink: 9 bits run on across rows, one bit spills into byte 2
        let packed = pack(&bitmap(3, 3, &[255; 9]), BitDepth::OneBit);
        assert_eq!(packed.bytes, vec![0xFF, 0b1000_0000]);
    }

    #[test]
    fn test_two_bit_levels() {
        let packed = pack(
            &bitmap(4, 2, &[0x00, 0x40, 0x80, 0xC0, 0x3F, 0x7F, 0xBF, 0xFF]),
            BitDepth::TwoBit,
        );
        assert_eq!(packed.bytes, vec![0b00_01_10_11, 0b00_01_10_11]);
    }

    #[test]
    fn test_two_bit_padding() {
        // 5 pixels: one full byte, then one pixel in the top pair of the second byte
        let packed = pack(&bitmap(5, 1, &[255, 0, 255, 0, 0x80]), BitDepth::TwoBit);
        assert_eq!(packed.bytes, vec![0b11_00_11_00, 0b10_00_00_00]);
    }

    #[test]
    fn test_empty_bitmap() {
        assert!(pack(&bitmap(0, 0, &[]), BitDepth::OneBit).is_empty());
        assert!(pack(&bitmap(7, 0, &[]), BitDepth::TwoBit).is_empty());
    }

    fn raw_bitmap_strategy() -> impl Strategy<Value = RawGlyphBitmap> {
        (0u32..24, 0u32..24).prop_flat_map(|(w, h)| {
            prop::collection::vec(any::<u8>(), (w * h) as usize)
                .prop_map(move |pixels| RawGlyphBitmap::new(w, h, pixels))
        })
    }

    proptest! {
        #[test]
        fn packed_size_law(bitmap in raw_bitmap_strategy()) {
            let n = bitmap.pixel_count();
            prop_assert_eq!(pack(&bitmap, BitDepth::OneBit).len(), n.div_ceil(8));
            prop_assert_eq!(pack(&bitmap, BitDepth::TwoBit).len(), n.div_ceil(4));
        }

        #[test]
        fn one_bit_unpacks_to_thresholded_pixels(bitmap in raw_bitmap_strategy()) {
            let packed = pack(&bitmap, BitDepth::OneBit);
            let levels =
                unpack_bitmap(&packed.bytes, bitmap.width, bitmap.height, BitDepth::OneBit);
            let expected: Vec<u8> = bitmap.pixels.iter().map(|&p| u8::from(p >= 0x20)).collect();
            prop_assert_eq!(levels, expected);
        }

        #[test]
        fn two_bit_unpacks_to_quantized_pixels(bitmap in raw_bitmap_strategy()) {
            let packed = pack(&bitmap, BitDepth::TwoBit);
            let levels =
                unpack_bitmap(&packed.bytes, bitmap.width, bitmap.height, BitDepth::TwoBit);
            let expected: Vec<u8> = bitmap.pixels.iter().map(|&p| p >> 6).collect();
            prop_assert_eq!(levels, expected);
        }
    }
}
