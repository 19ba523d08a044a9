// Sequential document numbering: PREFIX-NNN with zero padding that grows
// past three digits and never wraps or resets.

use proptest::prelude::*;

use bottega::billing::{format_number, next_number, seed_number};

#[test]
fn test_seed_numbers() {
    assert_eq!(seed_number("PRE"), "PRE-001");
    assert_eq!(seed_number("INV"), "INV-001");
}

#[test]
fn test_first_number_with_no_history() {
    assert_eq!(next_number("PRE", None).unwrap(), "PRE-001");
    assert_eq!(next_number("INV", None).unwrap(), "INV-001");
}

#[test]
fn test_increments_latest() {
    assert_eq!(next_number("PRE", Some("PRE-001")).unwrap(), "PRE-002");
    assert_eq!(next_number("INV", Some("INV-041")).unwrap(), "INV-042");
}

#[test]
fn test_padding_grows_past_three_digits() {
    assert_eq!(next_number("PRE", Some("PRE-099")).unwrap(), "PRE-100");
    assert_eq!(next_number("PRE", Some("PRE-999")).unwrap(), "PRE-1000");
    assert_eq!(next_number("PRE", Some("PRE-1000")).unwrap(), "PRE-1001");
}

#[test]
fn test_unparseable_latest_is_an_error() {
    assert!(next_number("PRE", Some("garbage")).is_err());
    assert!(next_number("PRE", Some("PRE-")).is_err());
    assert!(next_number("PRE", Some("PRE-abc")).is_err());
    // Wrong prefix is also a corruption signal, not a silent reset
    assert!(next_number("PRE", Some("INV-004")).is_err());
}

proptest! {
    /// Property: following a formatted number always yields counter + 1
    #[test]
    fn test_next_follows_format(counter in 1u32..=99_999) {
        let current = format_number("PRE", counter);
        let next = next_number("PRE", Some(&current)).unwrap();
        prop_assert_eq!(next, format_number("PRE", counter + 1));
    }

    /// Property: generated numbers are strictly increasing as strings of
    /// equal or growing length
    #[test]
    fn test_numbers_monotonic(counter in 1u32..=99_998) {
        let current = format_number("INV", counter);
        let next = next_number("INV", Some(&current)).unwrap();
        prop_assert!(next.len() >= current.len());
        prop_assert_ne!(next, current);
    }
}
