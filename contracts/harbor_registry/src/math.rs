//! Overflow-safe arithmetic helpers for collateral accounting.
//!
//! All functions use checked arithmetic and surface failures as the stable
//! `Arithmetic`-range contract errors instead of panicking.

use harbor_errors::ContractError;

/// Checked `i128` addition.
#[inline]
pub fn add_i128(a: i128, b: i128) -> Result<i128, ContractError> {
    a.checked_add(b).ok_or(ContractError::Overflow)
}

/// Checked `i128` subtraction.
#[inline]
pub fn sub_i128(a: i128, b: i128) -> Result<i128, ContractError> {
    a.checked_sub(b).ok_or(ContractError::Underflow)
}

/// Checked `i128` multiplication.
#[inline]
pub fn mul_i128(a: i128, b: i128) -> Result<i128, ContractError> {
    a.checked_mul(b).ok_or(ContractError::Overflow)
}

/// Checked `i128` division, rounding toward zero.
#[inline]
pub fn div_i128(a: i128, b: i128) -> Result<i128, ContractError> {
    a.checked_div(b).ok_or(ContractError::DivisionByZero)
}

/// Basis-point percentage of an amount: `amount * bps / 10_000`.
#[inline]
pub fn bps(amount: i128, bps: u32) -> Result<i128, ContractError> {
    div_i128(mul_i128(amount, bps as i128)?, 10_000)
}
