use crate::models::{BitDepth, CodepointInterval, FontError, MAX_CODE_POINT};

/// Code points exported when no explicit interval set is given.
pub const DEFAULT_INTERVALS: &[CodepointInterval] = &[
    // Basic Latin
    CodepointInterval { start: 0x0000, end: 0x007F },
    // CJK symbols and punctuation
    CodepointInterval { start: 0x3000, end: 0x303F },
    // CJK unified ideographs
    CodepointInterval { start: 0x4E00, end: 0x9FFF },
    // Halfwidth and fullwidth forms
    CodepointInterval { start: 0xFF00, end: 0xFFEF },
    // General punctuation
    CodepointInterval { start: 0x2000, end: 0x206F },
];

/// Frequently used ideographs; missing glyphs in here are reported.
pub const DEFAULT_CORE_RANGE: CodepointInterval = CodepointInterval {
    start: 0x4E00,
    end: 0x5FFF,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertConfig {
    pub bit_depth: BitDepth,
    pub requested_intervals: Vec<CodepointInterval>,
    pub font_size_px: u32,
    /// Range whose missing glyphs are worth a warning. `None` silences them.
    pub core_range: Option<CodepointInterval>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            bit_depth: BitDepth::OneBit,
            requested_intervals: DEFAULT_INTERVALS.to_vec(),
            font_size_px: 16,
            core_range: Some(DEFAULT_CORE_RANGE),
        }
    }
}

impl ConvertConfig {
    pub fn new(bit_depth: BitDepth, font_size_px: u32) -> Self {
        Self {
            bit_depth,
            font_size_px,
            ..Default::default()
        }
    }

    pub fn with_additional_intervals(
        mut self,
        intervals: impl IntoIterator<Item = CodepointInterval>,
    ) -> Self {
        self.requested_intervals.extend(intervals);
        self
    }

    /// Rejects inverted or out-of-range intervals and a zero font size.
    pub fn validate(&self) -> Result<(), FontError> {
        if self.font_size_px == 0 {
            return Err(FontError::ZeroFontSize);
        }
        for iv in self
            .requested_intervals
            .iter()
            .chain(self.core_range.as_ref())
        {
            if iv.start > iv.end || iv.end > MAX_CODE_POINT {
                return Err(FontError::InvalidInterval {
                    start: iv.start,
                    end: iv.end,
                });
            }
        }
        Ok(())
    }
}
