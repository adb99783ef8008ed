//! Epsilon-tolerant numeric primitives.
//!
//! Every engine compares floating-point values against a tolerance instead of
//! exact zero. The helpers here are the single place those comparisons live.

/// Default tolerance used for zero tests, pivot checks and integrality.
pub const EPSILON: f64 = 1e-9;

/// Check whether `value` is within `eps` of zero.
#[inline]
pub fn is_zero(value: f64, eps: f64) -> bool {
    value.abs() < eps
}

/// Check whether two values differ by less than `eps`.
#[inline]
pub fn approx_eq(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() < eps
}

/// Replace values within `eps` of zero by an exact zero.
#[inline]
pub fn snap_to_zero(value: f64, eps: f64) -> f64 {
    if is_zero(value, eps) { 0.0 } else { value }
}

/// Check whether `value` is within `eps` of its nearest integer.
#[inline]
pub fn is_integral(value: f64, eps: f64) -> bool {
    (value - value.round()).abs() <= eps
}

/// Fractional part `value - floor(value)`, taken as zero near integers.
///
/// The result is always `0.0` or strictly inside `(0, 1)`, so negative inputs
/// yield the complement (`-0.25` gives `0.75`).
pub fn fractional_part(value: f64, eps: f64) -> f64 {
    if is_zero(value, eps) || approx_eq(value, value.round(), eps) {
        return 0.0;
    }

    let mut fractional = value - value.floor();
    if fractional < 0.0 {
        fractional += 1.0;
    }

    if fractional < eps || approx_eq(fractional, 1.0, eps) {
        0.0
    } else {
        fractional
    }
}

/// Format a number with a fixed number of decimals.
///
/// Values within [`EPSILON`] of zero print as positive zero, so a protocol
/// never shows `-0.00`.
pub fn format_number(value: f64, precision: usize) -> String {
    if !value.is_finite() {
        return format!("{}", value);
    }
    let value = snap_to_zero(value, EPSILON);
    let formatted = format!("{:.*}", precision, value);
    if formatted.starts_with('-') && formatted[1..].chars().all(|c| c == '0' || c == '.') {
        formatted[1..].to_string()
    } else {
        formatted
    }
}
