//! # libepdfont: bitmap fonts for e-paper displays
//!
//! Turns a stack of rasterized glyphs into a compact, offset-addressed font
//! asset that a small display controller can render without any lookup
//! tables beyond the ones stored in the asset itself.
//!
//! ## Pipeline
//!
//! 1. [`compact`] merges the requested code point ranges and keeps only the
//!    runs for which the [`GlyphSource`] actually has glyphs.
//! 2. [`assemble`] rasterizes every remaining code point in ascending order,
//!    packs it with [`pack`] into 1-bit or 2-bit pixels and records its
//!    offset into a shared bitmap blob.
//! 3. The resulting [`FontAsset`] is written as a C header
//!    ([`to_header_string`]) or as an EPDF binary ([`to_epdf_bytes`]).
//!
//! ```rust,no_run
//! # use libepdfont::*;
//! # fn run(source: &impl GlyphSource) -> Result<(), FontError> {
//! let config = ConvertConfig::new(BitDepth::TwoBit, 18)
//!     .with_additional_intervals(["0x20AC".parse::<CodepointInterval>()?]);
//! let font = convert(&config, source)?;
//!
//! let glyph = font.find_glyph('A' as u32).expect("ASCII is part of the defaults");
//! println!("'A' is {}x{} pixels", glyph.width, glyph.height);
//! # Ok(())
//! # }
//! ```
//!
//! ## Renderer contract
//!
//! The interval table is sorted and its rows never touch, so a renderer can
//! binary search it and then index the glyph table directly at
//! `glyph_offset + (code_point - start)`. Each glyph's pixels live at
//! `bitmap_blob[data_offset..data_offset + data_length]`, packed most
//! significant bits first and running on across rows.

mod assembler;
mod config;
#[cfg(feature = "encoding")]
mod encoder;
#[cfg(any(feature = "encoding", feature = "decoding"))]
mod epdf;
mod intervals;
mod models;
mod packer;
mod utils;

pub use crate::assembler::{assemble, ceil_26_6, floor_26_6, GlyphSource, REFERENCE_GLYPHS};
pub use crate::config::{ConvertConfig, DEFAULT_CORE_RANGE, DEFAULT_INTERVALS};
#[cfg(feature = "encoding")]
pub use crate::encoder::to_header_string;
#[cfg(any(feature = "encoding", feature = "decoding"))]
pub use crate::epdf::EPDF_MAGIC;
#[cfg(feature = "encoding")]
pub use crate::epdf::to_epdf_bytes;
pub use crate::intervals::{compact, merge_intervals};
pub use crate::models::*;
pub use crate::packer::pack;
pub use crate::utils::unpack_bitmap;

#[cfg(feature = "decoding")]
use std::fs::File;
#[cfg(feature = "decoding")]
use std::io::BufReader;
#[cfg(feature = "decoding")]
use std::path::Path;

/// Validate `config`, compact its intervals against `source` and assemble
/// the font.
pub fn convert<S: GlyphSource>(config: &ConvertConfig, source: &S) -> Result<FontAsset, FontError> {
    config.validate()?;
    let intervals = compact(&config.requested_intervals, config.core_range, |cp| {
        source.has_glyph(cp)
    });
    assemble(&intervals, source, config.bit_depth, config.font_size_px)
}

#[cfg(feature = "decoding")]
impl FontAsset {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontError> {
        epdf::parse_epdf(bytes)
    }

    pub fn from_reader<R: std::io::Read>(mut reader: R) -> Result<FontAsset, FontError> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::from_bytes(&buf)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FontError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}
