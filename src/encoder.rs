use crate::models::{BitDepth, FontAsset, FontError};
use std::fmt::{self, Write};

const BYTES_PER_LINE: usize = 16;

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Text shown in the trailing comment of a glyph table row.
fn glyph_comment(code_point: u32) -> String {
    match char::from_u32(code_point) {
        Some('\\') => "<backslash>".to_string(),
        Some(c) if !c.is_control() => c.to_string(),
        _ => format!("U+{code_point:04X}"),
    }
}

/// Render a font as a C header defining `<name>Bitmaps`, `<name>Glyphs`,
/// `<name>Intervals` and the `EpdFontData <name>` aggregate.
pub fn to_header_string(font: &FontAsset, name: &str, size: u32) -> Result<String, FontError> {
    if !is_c_identifier(name) {
        return Err(FontError::InvalidIdentifier(name.to_string()));
    }
    let mut out = String::new();
    write_header(&mut out, font, name, size)
        .map_err(|e| FontError::Semantic(format!("could not format header: {e}")))?;
    Ok(out)
}

fn write_header(out: &mut impl Write, font: &FontAsset, name: &str, size: u32) -> fmt::Result {
    write!(
        out,
        "/**\n * generated by {} {}\n * name: {name}\n * size: {size}\n * mode: {}\n */\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        font.bit_depth
    )?;
    out.write_str("#pragma once\n")?;
    out.write_str("#include \"EpdFontData.h\"\n\n")?;

    writeln!(
        out,
        "static const uint8_t {name}Bitmaps[{}] = {{",
        font.bitmap_blob.len()
    )?;
    for chunk in font.bitmap_blob.chunks(BYTES_PER_LINE) {
        let line: Vec<String> = chunk.iter().map(|b| format!("0x{b:02X},")).collect();
        writeln!(out, "    {}", line.join(" "))?;
    }
    out.write_str("};\n\n")?;

    writeln!(out, "static const EpdGlyph {name}Glyphs[] = {{")?;
    for g in &font.glyphs {
        writeln!(
            out,
            "    {{ {}, {}, {}, {}, {}, {}, {} }},\t// {}",
            g.width,
            g.height,
            g.advance_x,
            g.bearing_left,
            g.bearing_top,
            g.data_length,
            g.data_offset,
            glyph_comment(g.code_point)
        )?;
    }
    out.write_str("};\n\n")?;

    writeln!(out, "static const EpdUnicodeInterval {name}Intervals[] = {{")?;
    for iv in &font.intervals {
        writeln!(
            out,
            "    {{ 0x{:X}, 0x{:X}, 0x{:X} }},",
            iv.start, iv.end, iv.glyph_offset
        )?;
    }
    out.write_str("};\n\n")?;

    writeln!(out, "static const EpdFontData {name} = {{")?;
    writeln!(out, "    {name}Bitmaps,")?;
    writeln!(out, "    {name}Glyphs,")?;
    writeln!(out, "    {name}Intervals,")?;
    writeln!(out, "    {},", font.interval_count())?;
    writeln!(out, "    {},", font.line_height)?;
    writeln!(out, "    {},", font.ascender)?;
    writeln!(out, "    {},", font.descender)?;
    writeln!(out, "    {},", font.bit_depth == BitDepth::TwoBit)?;
    out.write_str("};\n")
}
