//! IVA arithmetic on whole-peso amounts.
//!
//! Amounts on a DTE are integers (CLP has no minor unit). Rates, quantities
//! and unit prices are [`Decimal`]; every conversion back to pesos rounds
//! half away from zero, which is what the SII totals are checked against.
//!
//! Every function here is checked: a result that leaves the `i64` range
//! (or a division by a zero divisor) yields `None` instead of a wrapped or
//! saturated number.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Standard IVA rate in percent.
pub const IVA_RATE: Decimal = dec!(19);

/// Largest amount an SII amount element (`MontoItem`, `MntTotal`, ...)
/// holds: 18 digits.
pub const MAX_AMOUNT: i64 = 999_999_999_999_999_999;

/// Fractional digits carried by `QtyItem`, `PrcItem` and `DescuentoPct`.
pub const MAX_DECIMALS: u32 = 6;

/// A quantity, price or percentage as it is written to the document.
///
/// Amounts are computed from this value so that `MontoItem` always agrees
/// with the rendered `QtyItem` and `PrcItem`.
pub(crate) fn wire_decimal(value: Decimal) -> Decimal {
    value.round_dp(MAX_DECIMALS)
}

/// Round to whole pesos, half away from zero.
///
/// `None` when the rounded value does not fit in an `i64`.
pub fn round_pesos(value: Decimal) -> Option<i64> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// IVA on a net amount: `round(net * rate_pct / 100)`.
///
/// ```
/// use dte::core::{IVA_RATE, tax_amount};
/// assert_eq!(tax_amount(8800, IVA_RATE), Some(1672));
/// ```
pub fn tax_amount(net: i64, rate_pct: Decimal) -> Option<i64> {
    Decimal::from(net)
        .checked_mul(rate_pct)?
        .checked_div(dec!(100))
        .and_then(round_pesos)
}

/// Document total `net + tax + exempt`.
///
/// When `tax` is `None` it is computed from `net` at [`IVA_RATE`].
pub fn total(net: i64, tax: Option<i64>, exempt: i64) -> Option<i64> {
    let tax = match tax {
        Some(tax) => tax,
        None => tax_amount(net, IVA_RATE)?,
    };
    net.checked_add(tax)?.checked_add(exempt)
}

/// Split a tax-inclusive total into `(net, tax)`.
///
/// `net = round(total / (1 + rate/100))` and `tax = total - net`. This is not
/// an exact inverse of [`total`]: recomputing the tax from the returned net
/// can land one peso away from the original total.
pub fn net_from_total(total: i64, rate_pct: Decimal) -> Option<(i64, i64)> {
    let divisor = Decimal::ONE.checked_add(rate_pct.checked_div(dec!(100))?)?;
    let net = Decimal::from(total)
        .checked_div(divisor)
        .and_then(round_pesos)?;
    Some((net, total.checked_sub(net)?))
}

/// Format an amount with `.` thousands separators, e.g. `1.234.567`.
pub fn format_amount(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let grouped = group_thousands(&digits, '.');
    if amount < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Insert `sep` every three digits from the right of an ASCII digit string.
pub(crate) fn group_thousands(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}
