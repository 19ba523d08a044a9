use rust_decimal::Decimal;

/// Decimal scale used for all stored money amounts
pub const MONEY_SCALE: u32 = 2;

/// Rounds an amount to two decimal places (banker's rounding)
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_SCALE)
}

/// Formats an amount for rendered documents: fixed two decimals with a
/// currency glyph prefix. No thousands separators in the PDF path.
pub fn format_currency(amount: Decimal) -> String {
    format!("\u{20ac} {:.2}", round2(amount))
}

/// Formats a percentage rate, dropping a trailing ".00" for whole rates
pub fn format_rate(rate: Decimal) -> String {
    let rounded = round2(rate);
    if rounded.fract().is_zero() {
        format!("{}%", rounded.trunc())
    } else {
        format!("{}%", rounded.normalize())
    }
}
