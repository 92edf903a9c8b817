// Vaultdesk Engine — Amount Codec
// Human decimal input ⇄ integer base units, and the pending-amount state.

use crate::atoms::types::BaseUnits;

fn scale(decimals: u8) -> f64 {
    10f64.powi(decimals as i32)
}

/// Convert a user-entered decimal string to base units: parse as a float,
/// multiply by 10^decimals, round half-up.
///
/// `None` means "no valid amount" (non-numeric, negative, non-finite or too
/// large for u128). Callers keep their previous amount in that case.
pub fn to_base_units(input: &str, decimals: u8) -> Option<BaseUnits> {
    let value: f64 = input.trim().parse().ok()?;
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    let scaled = (value * scale(decimals)).round();
    if !scaled.is_finite() || scaled >= BaseUnits::MAX as f64 {
        return None;
    }
    Some(scaled as BaseUnits)
}

/// Base units → display number. Lossy; for balances on screen only, never
/// for amounts that go on-chain.
pub fn to_display_units(base: BaseUnits, decimals: u8) -> f64 {
    base as f64 / scale(decimals)
}

/// Exact decimal rendering of a base-unit amount (trailing zeros trimmed).
/// e.g. 10_500_000 with 6 decimals → "10.5"
pub fn format_units(base: BaseUnits, decimals: u8) -> String {
    if decimals == 0 {
        return base.to_string();
    }
    let digits = format!("{:0>width$}", base, width = decimals as usize + 1);
    let (whole, frac) = digits.split_at(digits.len() - decimals as usize);
    let frac = frac.trim_end_matches('0');
    if frac.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, frac)
    }
}

/// The most recently parsed, not-yet-submitted amount.
///
/// Only a successful parse moves the state; a bad keystroke never resets a
/// valid entry back to `Empty`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PendingAmount {
    #[default]
    Empty,
    Valid(BaseUnits),
}

impl PendingAmount {
    pub fn value(&self) -> Option<BaseUnits> {
        match self {
            PendingAmount::Empty => None,
            PendingAmount::Valid(v) => Some(*v),
        }
    }

    /// Parse `input` at `decimals` and adopt it if valid.
    /// Returns whether the input was accepted.
    pub fn apply(&mut self, input: &str, decimals: u8) -> bool {
        match to_base_units(input, decimals) {
            Some(v) => {
                *self = PendingAmount::Valid(v);
                true
            }
            None => false,
        }
    }
}
