//! Display scaling of raw token amounts.

use alloy::primitives::utils::format_units;
use alloy::primitives::U256;

/// Render `amount` in human units for a token with `decimals` decimals.
///
/// Trailing zeros of the fractional part are dropped but at least one
/// fractional digit is kept, so `1_000_000` with 6 decimals renders as `1.0`
/// and `100` with 18 decimals as `0.0000000000000001`. Decimal counts the
/// unit conversion cannot represent fall back to the raw integer.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    let Ok(formatted) = format_units(amount, decimals) else {
        return amount.to_string();
    };
    match formatted.split_once('.') {
        Some((whole, fraction)) => {
            let fraction = fraction.trim_end_matches('0');
            if fraction.is_empty() {
                format!("{whole}.0")
            } else {
                format!("{whole}.{fraction}")
            }
        }
        None => format!("{formatted}.0"),
    }
}
