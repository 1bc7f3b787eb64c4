//! Display formatting for minor-unit amounts. Integer arithmetic only.

/// Suffix appended to every formatted amount.
pub const CURRENCY_SUFFIX: &str = "$";

/// Format cents as `<whole>.<two-digit fraction>$`.
/// 1 -> "0.01$", 50 -> "0.50$", 1155 -> "11.55$"
pub fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}{}", sign, abs / 100, abs % 100, CURRENCY_SUFFIX)
}
