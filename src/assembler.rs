use crate::models::*;
use crate::packer::pack;

/// Reference glyphs for the face metrics, in order of preference:
/// VERTICAL LINE and CJK UNIFIED IDEOGRAPH-4E28.
pub const REFERENCE_GLYPHS: [u32; 2] = [0x007C, 0x4E28];

/// Provider of rasterized glyphs and face metrics.
///
/// An implementation may consult several backing faces and answer from the
/// first one that covers a code point.
pub trait GlyphSource {
    /// Whether any backing face has a glyph for `code_point`.
    fn has_glyph(&self, code_point: u32) -> bool;

    /// Render `code_point` at `size_px`, or `None` if it is not available.
    fn rasterize(&self, code_point: u32, size_px: u32) -> Option<RasterizedGlyph>;

    /// Metrics of the face that renders `code_point` at `size_px`.
    fn face_metrics(&self, code_point: u32, size_px: u32) -> Option<FaceMetrics>;
}

/// 26.6 fixed point to pixels, rounding down.
pub fn floor_26_6(value: i64) -> i64 {
    value >> 6
}

/// 26.6 fixed point to pixels, rounding up.
pub fn ceil_26_6(value: i64) -> i64 {
    -((-value) >> 6)
}

fn fit<T: TryFrom<i64>>(code_point: u32, field: &'static str, value: i64) -> Result<T, FontError> {
    T::try_from(value).map_err(|_| FontError::MetricOutOfRange {
        code_point,
        field,
        value,
    })
}

/// Accumulator threaded through the assembly fold.
#[derive(Debug, Default)]
struct AssemblyState {
    bitmap_blob: Vec<u8>,
    glyphs: Vec<GlyphDescriptor>,
    intervals: Vec<IndexedInterval>,
    running_offset: u32,
    glyph_count: u32,
}

impl AssemblyState {
    fn open_interval(mut self, interval: &CodepointInterval) -> Self {
        self.intervals.push(IndexedInterval {
            start: interval.start,
            end: interval.end,
            glyph_offset: self.glyph_count,
        });
        self
    }

    fn push_glyph(
        mut self,
        code_point: u32,
        glyph: RasterizedGlyph,
        depth: BitDepth,
    ) -> Result<Self, FontError> {
        let bitmap = &glyph.bitmap;
        if bitmap.pixels.len() != bitmap.pixel_count() {
            return Err(FontError::BitmapSizeMismatch {
                code_point,
                expected: bitmap.pixel_count(),
                actual: bitmap.pixels.len(),
            });
        }

        let packed = pack(bitmap, depth);
        let data_length: u32 = fit(code_point, "data_length", packed.len() as i64)?;
        let descriptor = GlyphDescriptor {
            code_point,
            width: fit(code_point, "width", bitmap.width as i64)?,
            height: fit(code_point, "height", bitmap.height as i64)?,
            advance_x: fit(code_point, "advance_x", floor_26_6(glyph.advance_x))?,
            bearing_left: fit(code_point, "bearing_left", glyph.bearing_left as i64)?,
            bearing_top: fit(code_point, "bearing_top", glyph.bearing_top as i64)?,
            data_length,
            data_offset: self.running_offset,
        };

        self.running_offset = self
            .running_offset
            .checked_add(data_length)
            .ok_or(FontError::MetricOutOfRange {
                code_point,
                field: "data_offset",
                value: self.running_offset as i64 + data_length as i64,
            })?;
        self.glyph_count += 1;
        self.bitmap_blob.extend_from_slice(&packed.bytes);
        self.glyphs.push(descriptor);
        Ok(self)
    }
}

/// Line height, ascender and descender in pixels, taken from the face of the
/// first available reference glyph. Zero if none is available.
fn reference_metrics<S: GlyphSource>(
    source: &S,
    size_px: u32,
) -> Result<(i16, i16, i16), FontError> {
    let found = REFERENCE_GLYPHS
        .iter()
        .find_map(|&cp| source.face_metrics(cp, size_px).map(|m| (cp, m)));

    let Some((cp, metrics)) = found else {
        log::warn!("No reference glyph available, face metrics default to zero");
        return Ok((0, 0, 0));
    };
    Ok((
        fit(cp, "line_height", ceil_26_6(metrics.height))?,
        fit(cp, "ascender", ceil_26_6(metrics.ascender))?,
        fit(cp, "descender", floor_26_6(metrics.descender))?,
    ))
}

/// Rasterize and pack every code point of the compacted `intervals`, in
/// ascending order, into a single [`FontAsset`].
///
/// The intervals must come from [`compact`](crate::compact) against the same
/// source; a code point that fails to rasterize aborts with
/// [`FontError::MissingGlyph`].
pub fn assemble<S: GlyphSource>(
    intervals: &[CodepointInterval],
    source: &S,
    depth: BitDepth,
    size_px: u32,
) -> Result<FontAsset, FontError> {
    let state = intervals
        .iter()
        .try_fold(AssemblyState::default(), |state, interval| {
            log::debug!("Packing {interval}");
            interval
                .code_points()
                .try_fold(state.open_interval(interval), |state, code_point| {
                    let glyph = source
                        .rasterize(code_point, size_px)
                        .ok_or(FontError::MissingGlyph { code_point })?;
                    state.push_glyph(code_point, glyph, depth)
                })
        })?;

    let (line_height, ascender, descender) = reference_metrics(source, size_px)?;

    log::info!(
        "Assembled {} glyphs in {} intervals, {} bytes of {depth} bitmap data",
        state.glyph_count,
        state.intervals.len(),
        state.bitmap_blob.len()
    );

    Ok(FontAsset {
        bitmap_blob: state.bitmap_blob,
        glyphs: state.glyphs,
        intervals: state.intervals,
        line_height,
        ascender,
        descender,
        bit_depth: depth,
    })
}
