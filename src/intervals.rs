use crate::models::{CodepointInterval, FontError};
use std::str::FromStr;

/// Sorts the requested intervals and merges overlapping or adjacent ones.
pub fn merge_intervals(requested: &[CodepointInterval]) -> Vec<CodepointInterval> {
    let mut sorted = requested.to_vec();
    sorted.sort_unstable();

    let mut merged: Vec<CodepointInterval> = Vec::with_capacity(sorted.len());
    for iv in sorted {
        match merged.last_mut() {
            Some(last) if iv.start <= last.end.saturating_add(1) => {
                last.end = last.end.max(iv.end);
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// Merges `requested` and splits the result into maximal runs of code points
/// for which `glyph_exists` holds.
///
/// Missing code points are dropped silently, except inside `core_range` where
/// each one is logged as a warning. The returned intervals are sorted and
/// neither overlap nor touch.
pub fn compact<F>(
    requested: &[CodepointInterval],
    core_range: Option<CodepointInterval>,
    mut glyph_exists: F,
) -> Vec<CodepointInterval>
where
    F: FnMut(u32) -> bool,
{
    let mut result = Vec::new();
    let mut requested_count = 0u64;
    let mut missing_core = 0u32;

    for merged in merge_intervals(requested) {
        requested_count += merged.len() as u64;
        // `None` once the run would start past u32::MAX
        let mut sub_start = Some(merged.start);

        for cp in merged.code_points() {
            if glyph_exists(cp) {
                continue;
            }
            if core_range.is_some_and(|core| core.contains(cp)) {
                missing_core += 1;
                match char::from_u32(cp) {
                    Some(ch) => log::warn!("Missing common glyph U+{cp:04X} ({ch})"),
                    None => log::warn!("Missing common glyph U+{cp:04X}"),
                }
            }
            if let Some(start) = sub_start {
                if start < cp {
                    result.push(CodepointInterval::new(start, cp - 1));
                }
            }
            sub_start = cp.checked_add(1);
        }

        if let Some(start) = sub_start {
            if start <= merged.end {
                result.push(CodepointInterval::new(start, merged.end));
            }
        }
    }

    let available: u64 = result.iter().map(|iv| iv.len() as u64).sum();
    log::info!(
        "{available} of {requested_count} requested code points available in {} intervals",
        result.len()
    );
    if missing_core > 0 {
        log::warn!("{missing_core} glyphs missing from the core range");
    }
    result
}

fn syntax_error(input: &str, message: impl Into<String>) -> FontError {
    FontError::InvalidIntervalSyntax {
        input: input.to_string(),
        message: message.into(),
    }
}

fn parse_num(input: &str, s: &str) -> Result<u32, FontError> {
    let s = s.trim();
    let (digits, radix) = match s.get(..2) {
        Some("0x" | "0X") => (&s[2..], 16),
        Some("0o" | "0O") => (&s[2..], 8),
        Some("0b" | "0B") => (&s[2..], 2),
        _ => (s, 10),
    };
    let parsed = u32::from_str_radix(digits, radix);
    parsed.map_err(|e| syntax_error(input, format!("invalid number '{s}': {e}")))
}

/// Parses `min,max`, `min-max` or a single code point. Numbers are decimal or
/// carry a `0x`, `0o` or `0b` prefix.
impl FromStr for CodepointInterval {
    type Err = FontError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bounds: Vec<&str> = s.split([',', '-']).collect();
        let (start, end) = match bounds.as_slice() {
            [single] => {
                let n = parse_num(s, single)?;
                (n, n)
            }
            [start, end] => (parse_num(s, start)?, parse_num(s, end)?),
            _ => return Err(syntax_error(s, "expected 'min,max' or 'min-max'")),
        };
        if start > end {
            return Err(syntax_error(
                s,
                format!("start {start:#X} greater than end {end:#X}"),
            ));
        }
        Ok(CodepointInterval::new(start, end))
    }
}
