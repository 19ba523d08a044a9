// Human-readable sequential document numbers: a fixed prefix plus a
// zero-padded counter ("PRE-001", "INV-042"). The next number derives from
// the latest persisted one; uniqueness under concurrent creation is closed
// by a unique index plus retry in the repositories.

use crate::core::{AppError, Result};

/// Width of the zero-padded counter. Numbers keep sorting correctly past
/// 999 because allocation follows creation order, not string order.
const PAD_WIDTH: usize = 3;

pub fn seed_number(prefix: &str) -> String {
    format_number(prefix, 1)
}

pub fn format_number(prefix: &str, counter: u32) -> String {
    format!("{}-{:0width$}", prefix, counter, width = PAD_WIDTH)
}

/// Derives the next number from the latest existing one. `None` means no
/// documents exist yet and yields the seed.
pub fn next_number(prefix: &str, latest: Option<&str>) -> Result<String> {
    let Some(latest) = latest else {
        return Ok(seed_number(prefix));
    };

    let counter = parse_counter(prefix, latest)?;
    Ok(format_number(prefix, counter + 1))
}

fn parse_counter(prefix: &str, number: &str) -> Result<u32> {
    let suffix = number
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .ok_or_else(|| {
            AppError::NumberGeneration(format!(
                "Document number '{}' does not match prefix '{}'",
                number, prefix
            ))
        })?;

    suffix.parse::<u32>().map_err(|_| {
        AppError::NumberGeneration(format!(
            "Cannot parse counter from document number '{}'",
            number
        ))
    })
}
