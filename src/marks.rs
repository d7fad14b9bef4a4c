//! Conversion between the free-text marks field and the integer list the
//! backend expects.

use thiserror::Error;

use crate::models::Mark;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{segment}' is not a whole number. Enter marks separated by commas.")]
pub struct MarkParseError {
    pub segment: String,
}

/// Split on commas, trim each segment and parse it as a base-10 integer.
///
/// A blank field is an empty list. Any other segment that does not parse
/// (including an empty one such as the middle of `"1,,2"`) is rejected.
pub fn parse_marks(input: &str) -> Result<Vec<Mark>, MarkParseError> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    input
        .split(',')
        .map(str::trim)
        .map(|segment| {
            segment.parse::<Mark>().map_err(|_| MarkParseError {
                segment: segment.to_string(),
            })
        })
        .collect()
}

/// Render marks with the given separator. `","` seeds the edit field, `", "`
/// is used in the table.
pub fn join_marks(marks: &[Mark], separator: &str) -> String {
    marks
        .iter()
        .map(Mark::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
