//! Splicer: substitutes transformed text back into the original buffer.
//!
//! Reconstruction is one linear left-to-right pass: for each region append
//! the untouched gap since the previous region, then that region's result;
//! finally append the tail. The pass reads only original offsets, so results
//! of any length splice correctly and completion order can never matter.
//!
//! The region list is validated up front: `results[i]` must correspond to
//! `regions[i]`, regions must be ascending and non-overlapping, and every
//! span must lie inside the text on char boundaries. Violations are internal
//! errors — the locator guarantees these invariants.

use crate::error::LitfmtError;
use crate::locate::Region;

/// Splice `results` into `text` at the region spans.
///
/// With no regions the output equals the input exactly.
pub fn splice(text: &str, regions: &[Region], results: &[String]) -> Result<String, LitfmtError> {
    if regions.len() != results.len() {
        return Err(LitfmtError::internal(format!(
            "splice called with {} regions but {} results",
            regions.len(),
            results.len()
        )));
    }

    validate_regions(text, regions)?;

    let extra: usize = results.iter().map(String::len).sum();
    let mut out = String::with_capacity(text.len() + extra);
    let mut prev_end = 0usize;

    for (region, result) in regions.iter().zip(results) {
        let gap = text
            .get(prev_end..region.span.start)
            .ok_or_else(|| boundary_error(region))?;
        out.push_str(gap);
        out.push_str(result);
        prev_end = region.span.end;
    }

    let tail = text
        .get(prev_end..)
        .ok_or_else(|| LitfmtError::internal(format!("tail offset {prev_end} is out of bounds")))?;
    out.push_str(tail);

    Ok(out)
}

fn validate_regions(text: &str, regions: &[Region]) -> Result<(), LitfmtError> {
    let mut prev_end = 0usize;
    for (i, region) in regions.iter().enumerate() {
        if region.index != i {
            return Err(LitfmtError::internal(format!(
                "region at position {i} carries index {}",
                region.index
            )));
        }
        if region.span.start < prev_end {
            return Err(LitfmtError::internal(format!(
                "region {i} {} overlaps or precedes the previous region",
                region.span
            )));
        }
        if region.span.end > text.len() {
            return Err(LitfmtError::internal(format!(
                "region {i} {} extends past end of text ({})",
                region.span,
                text.len()
            )));
        }
        prev_end = region.span.end;
    }
    Ok(())
}

fn boundary_error(region: &Region) -> LitfmtError {
    LitfmtError::internal(format!(
        "region {} {} does not fall on char boundaries",
        region.index, region.span
    ))
}

// ============================================================================
// Tests
// ============================================================================
