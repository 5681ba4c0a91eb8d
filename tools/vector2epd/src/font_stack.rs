use freetype::bitmap::{Bitmap, PixelMode};
use freetype::face::LoadFlag;
use freetype::{Face, Library};
use libepdfont::{FaceMetrics, GlyphSource, RasterizedGlyph, RawGlyphBitmap};
use std::cell::Cell;
use std::path::PathBuf;

/// FreeType faces ordered by descending priority. A code point is served by
/// the first face that renders it to an 8-bit gray bitmap.
pub struct FontStack {
    faces: Vec<Face>,
    dpi: u32,
    /// Size in points currently applied to every face.
    current_size: Cell<u32>,
    _library: Library,
}

impl FontStack {
    /// Load `paths` and size every face to `size` points at `dpi`.
    pub fn open(paths: &[PathBuf], size: u32, dpi: u32) -> Result<Self, freetype::Error> {
        let library = Library::init()?;
        let mut faces = Vec::with_capacity(paths.len());
        for path in paths {
            let face = library.new_face(path, 0)?;
            set_size(&face, size, dpi)?;
            log::info!(
                "Loaded {} ({} {})",
                path.display(),
                face.family_name().unwrap_or_default(),
                face.style_name().unwrap_or_default()
            );
            faces.push(face);
        }
        Ok(Self {
            faces,
            dpi,
            current_size: Cell::new(size),
            _library: library,
        })
    }

    fn ensure_size(&self, size: u32) -> bool {
        if self.current_size.get() == size {
            return true;
        }
        for face in &self.faces {
            if let Err(err) = set_size(face, size, self.dpi) {
                log::error!("Could not set size {size} at {} dpi: {err}", self.dpi);
                return false;
            }
        }
        self.current_size.set(size);
        true
    }

    /// Render `code_point` from the first face that yields a usable bitmap.
    fn render(&self, code_point: u32) -> Option<(&Face, RasterizedGlyph)> {
        self.faces.iter().find_map(|face| {
            let index = face
                .get_char_index(code_point as usize)
                .filter(|&index| index > 0)?;
            if let Err(err) = face.load_glyph(index, LoadFlag::RENDER) {
                log::debug!("U+{code_point:04X}: could not render glyph {index}: {err}");
                return None;
            }
            let slot = face.glyph();
            let bitmap = match to_raw_bitmap(&slot.bitmap()) {
                Ok(bitmap) => bitmap,
                Err(reason) => {
                    log::debug!("U+{code_point:04X}: {reason}, trying next face");
                    return None;
                }
            };
            let glyph = RasterizedGlyph {
                bitmap,
                advance_x: slot.advance().x as i64,
                bearing_left: slot.bitmap_left(),
                bearing_top: slot.bitmap_top(),
            };
            Some((face, glyph))
        })
    }
}

fn set_size(face: &Face, size: u32, dpi: u32) -> Result<(), freetype::Error> {
    let char_size = (size as isize) << 6;
    face.set_char_size(char_size, char_size, dpi, dpi)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RowFormat {
    /// One coverage byte per pixel.
    Gray,
    /// One bit per pixel, MSB first.
    Mono,
}

/// Expand a FreeType pixel buffer into top-down 8-bit coverage rows.
///
/// A negative `pitch` means the rows are stored bottom-up.
fn expand_rows(
    buffer: &[u8],
    width: usize,
    rows: usize,
    pitch: i32,
    format: RowFormat,
) -> Option<Vec<u8>> {
    let stride = pitch.unsigned_abs() as usize;
    let mut pixels = Vec::with_capacity(width * rows);
    for y in 0..rows {
        let row_start = if pitch < 0 { (rows - 1 - y) * stride } else { y * stride };
        match format {
            RowFormat::Gray => pixels.extend_from_slice(buffer.get(row_start..row_start + width)?),
            RowFormat::Mono => {
                for x in 0..width {
                    let byte = *buffer.get(row_start + x / 8)?;
                    let on = (byte >> (7 - (x % 8))) & 1 == 1;
                    pixels.push(if on { 0xFF } else { 0 });
                }
            }
        }
    }
    Some(pixels)
}

fn to_raw_bitmap(bitmap: &Bitmap) -> Result<RawGlyphBitmap, &'static str> {
    let format = match bitmap.pixel_mode() {
        Ok(PixelMode::Gray) => RowFormat::Gray,
        Ok(PixelMode::Mono) => RowFormat::Mono,
        _ => return Err("pixel mode has no 8-bit gray equivalent"),
    };
    let width = bitmap.width().max(0) as usize;
    let rows = bitmap.rows().max(0) as usize;
    let pixels = expand_rows(bitmap.buffer(), width, rows, bitmap.pitch(), format)
        .ok_or("bitmap buffer shorter than its rows")?;
    Ok(RawGlyphBitmap::new(width as u32, rows as u32, pixels))
}

impl GlyphSource for FontStack {
    fn has_glyph(&self, code_point: u32) -> bool {
        self.render(code_point).is_some()
    }

    fn rasterize(&self, code_point: u32, size_px: u32) -> Option<RasterizedGlyph> {
        if !self.ensure_size(size_px) {
            return None;
        }
        self.render(code_point).map(|(_, glyph)| glyph)
    }

    fn face_metrics(&self, code_point: u32, size_px: u32) -> Option<FaceMetrics> {
        if !self.ensure_size(size_px) {
            return None;
        }
        let (face, _) = self.render(code_point)?;
        let metrics = face.size_metrics()?;
        Some(FaceMetrics {
            height: metrics.height as i64,
            ascender: metrics.ascender as i64,
            descender: metrics.descender as i64,
        })
    }
}
