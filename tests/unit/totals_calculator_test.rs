// Property-based tests for document totals.
//
// Properties tested:
// 1. total = subtotal + tax_amount, always
// 2. subtotal equals the rounded sum of quantity * unit_price
// 3. zero tax rate means zero tax and total == subtotal
// 4. totals are non-negative for non-negative inputs

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use bottega::billing::{
    compute_totals, effective_rate, standard_rate, validated_items, LineItem, LineItemInput,
    Totals,
};
use bottega::core::money::round2;

fn item(quantity: Decimal, unit_price: Decimal) -> LineItem {
    LineItem {
        description: "Test item".to_string(),
        quantity,
        unit_price,
        vat_rate: None,
    }
}

proptest! {
    /// Property: the grand total is always exactly subtotal + tax
    #[test]
    fn test_total_is_subtotal_plus_tax(
        quantity_cents in 0u64..=1_000_000u64,
        price_cents in 0u64..=10_000_000u64,
        taxed in any::<bool>()
    ) {
        let items = vec![item(
            Decimal::new(quantity_cents as i64, 2),
            Decimal::new(price_cents as i64, 2),
        )];
        let totals = compute_totals(&items, effective_rate(taxed));

        prop_assert_eq!(totals.total, totals.subtotal + totals.tax_amount);
    }

    /// Property: subtotal is the rounded sum of line totals
    #[test]
    fn test_subtotal_matches_line_sum(
        lines in prop::collection::vec(
            (1u64..=10_000u64, 0u64..=1_000_000u64),
            1..20
        )
    ) {
        let items: Vec<LineItem> = lines
            .iter()
            .map(|(q, p)| item(Decimal::new(*q as i64, 2), Decimal::new(*p as i64, 2)))
            .collect();

        let expected: Decimal = items.iter().map(|i| i.line_total()).sum();
        let totals = compute_totals(&items, standard_rate());

        prop_assert_eq!(totals.subtotal, round2(expected));
    }

    /// Property: disabling tax zeroes the tax and leaves the subtotal
    #[test]
    fn test_zero_rate_means_no_tax(
        quantity in 1u64..=1_000u64,
        price_cents in 0u64..=1_000_000u64
    ) {
        let items = vec![item(
            Decimal::from(quantity),
            Decimal::new(price_cents as i64, 2),
        )];
        let totals = compute_totals(&items, effective_rate(false));

        prop_assert_eq!(totals.tax_amount, Decimal::ZERO);
        prop_assert_eq!(totals.total, totals.subtotal);
    }

    /// Property: non-negative inputs never produce negative money
    #[test]
    fn test_totals_non_negative(
        lines in prop::collection::vec(
            (0u64..=10_000u64, 0u64..=1_000_000u64),
            0..10
        )
    ) {
        let items: Vec<LineItem> = lines
            .iter()
            .map(|(q, p)| item(Decimal::from(*q), Decimal::new(*p as i64, 2)))
            .collect();
        let totals = compute_totals(&items, standard_rate());

        prop_assert!(totals.subtotal >= Decimal::ZERO);
        prop_assert!(totals.tax_amount >= Decimal::ZERO);
        prop_assert!(totals.total >= Decimal::ZERO);
    }
}

#[test]
fn test_two_items_at_standard_rate() {
    let items = vec![
        item(dec!(1), dec!(100.00)),
        item(dec!(1), dec!(100.00)),
    ];
    let totals = compute_totals(&items, standard_rate());

    assert_eq!(
        totals,
        Totals {
            subtotal: dec!(200.00),
            tax_amount: dec!(44.00),
            total: dec!(244.00),
        }
    );
}

#[test]
fn test_mixed_quantities_without_tax() {
    let items = vec![item(dec!(1), dec!(50.00)), item(dec!(3), dec!(10.00))];
    let totals = compute_totals(&items, effective_rate(false));

    assert_eq!(totals.subtotal, dec!(80.00));
    assert_eq!(totals.tax_amount, dec!(0.00));
    assert_eq!(totals.total, dec!(80.00));
}

#[test]
fn test_empty_item_set_is_all_zero() {
    let totals = compute_totals(&[], standard_rate());
    assert_eq!(totals, Totals::zero());
}

#[test]
fn test_extreme_values_rejected_before_totals() {
    // Values beyond the money-column capacity must fail submit validation,
    // so compute_totals never multiplies unrepresentable magnitudes.
    let inputs = vec![LineItemInput {
        description: "Everything, twice".to_string(),
        quantity: Some(Decimal::MAX),
        unit_price: Some(dec!(2)),
        vat_rate: None,
    }];
    assert!(validated_items(inputs).is_err());
}

#[test]
fn test_fractional_quantity_rounds_to_cents() {
    // 0.333 * 9.99 = 3.32667 -> line sum rounds to 3.33
    let items = vec![item(dec!(0.333), dec!(9.99))];
    let totals = compute_totals(&items, effective_rate(false));
    assert_eq!(totals.subtotal, dec!(3.33));
}
