//! Input validation for the pending action input.
//!
//! Runs before any network call; a failure here never leaves the controller's
//! idle state.

use crate::error::{RewardError, RewardResult};
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;

/// Parse a reward address.
///
/// Accepts `0x` followed by exactly 40 hex digits. All-lowercase and
/// all-uppercase digits are taken as-is; mixed case must match the EIP-55
/// checksum.
pub fn validate_address(input: &str) -> RewardResult<Address> {
    let digits = input
        .strip_prefix("0x")
        .ok_or_else(RewardError::invalid_address)?;
    if digits.len() != 40 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RewardError::invalid_address());
    }

    let address: Address = input.parse().map_err(|_| RewardError::invalid_address())?;

    let lower = digits.to_ascii_lowercase();
    let upper = digits.to_ascii_uppercase();
    if digits == lower || digits == upper || to_checksum(&address, None) == input {
        Ok(address)
    } else {
        Err(RewardError::invalid_address())
    }
}

/// Parse a reward percentage: any number strictly greater than zero.
///
/// Surrounding whitespace is ignored. A leading `+`, fractions and exponents
/// all parse; whether the value fits the contract is decided by
/// [`percentage_argument`].
pub fn validate_percentage(input: &str) -> RewardResult<f64> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| RewardError::invalid_percentage())?;
    if !value.is_finite() || value <= 0.0 {
        return Err(RewardError::invalid_percentage());
    }
    Ok(value)
}

/// Turn the pending percentage into the contract's `uint256` argument.
///
/// Input that fails [`validate_percentage`] is a `Validation` error. A valid
/// number with no `uint256` form (`"10.5"`) is a `Contract` error.
pub fn percentage_argument(input: &str) -> RewardResult<U256> {
    let value = validate_percentage(input)?;
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    // Plain integers are parsed exactly rather than through f64
    if digits.bytes().all(|b| b.is_ascii_digit()) {
        return U256::from_dec_str(digits)
            .map_err(|_| RewardError::Contract(format!("percentage {} overflows uint256", digits)));
    }
    if value.fract() != 0.0 || value >= u128::MAX as f64 {
        return Err(RewardError::Contract(format!(
            "percentage {} is not a whole number",
            trimmed
        )));
    }
    Ok(U256::from(value as u128))
}
