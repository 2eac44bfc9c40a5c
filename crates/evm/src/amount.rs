//! Conversion between human-entered decimal amounts and on-chain integer units.
//!
//! All arithmetic is exact (`BigDecimal`), so amounts with many fractional
//! digits never drift the way binary floats do.

use std::fmt;
use std::str::FromStr;

use alloy_core::primitives::U256;
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use serde::{Deserialize, Serialize};

use crate::error::{EvmError, Result};

pub const ETHER_DECIMALS: u8 = 18;
pub const GWEI_DECIMALS: u8 = 9;

/// An on-chain integer amount together with the token's decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenAmount {
    pub raw: U256,
    pub decimals: u8,
}

impl TokenAmount {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn from_human(amount: &str, decimals: u8) -> Result<Self> {
        Ok(Self::new(parse_to_raw(amount, decimals)?, decimals))
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.raw, self.decimals))
    }
}

fn ten_pow(decimals: u8) -> BigDecimal {
    // digits * 10^-scale with a negative scale is 10^decimals
    BigDecimal::new(BigInt::from(1u8), -i64::from(decimals))
}

pub fn parse_decimal(amount: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(amount.trim())
        .map_err(|e| EvmError::Amount(format!("`{}` is not a decimal number: {}", amount, e)))
}

/// `floor(amount * 10^decimals)`.
pub fn to_raw(amount: &BigDecimal, decimals: u8) -> Result<U256> {
    if amount.sign() == Sign::Minus {
        return Err(EvmError::Amount(format!("negative amount {}", amount)));
    }

    let scaled = (amount.clone() * ten_pow(decimals)).with_scale(0);
    let (digits, _) = scaled.into_bigint_and_exponent();
    U256::from_str_radix(&digits.to_string(), 10).map_err(|_| {
        EvmError::Amount(format!("{} with {} decimals does not fit in uint256", amount, decimals))
    })
}

pub fn parse_to_raw(amount: &str, decimals: u8) -> Result<U256> {
    to_raw(&parse_decimal(amount)?, decimals)
}

/// `raw / 10^decimals`, exact.
pub fn to_human(raw: U256, decimals: u8) -> BigDecimal {
    let digits = BigInt::from_str(&raw.to_string()).unwrap_or_default();
    BigDecimal::new(digits, i64::from(decimals))
}

/// Human-readable string for a raw amount, without trailing zeros.
pub fn format_units(raw: U256, decimals: u8) -> String {
    let raw = raw.to_string();
    let decimals = usize::from(decimals);
    if decimals == 0 {
        return raw;
    }

    let padded = format!("{:0>width$}", raw, width = decimals + 1);
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    trim_fraction(&format!("{}.{}", int_part, frac_part))
}

pub fn format_gwei(wei: u128) -> String {
    format_units(U256::from(wei), GWEI_DECIMALS)
}

pub fn format_ether(wei: U256) -> String {
    format_units(wei, ETHER_DECIMALS)
}

/// Parses a human amount of the native coin (18 decimals).
pub fn to_wei(amount: &str) -> Result<U256> {
    parse_to_raw(amount, ETHER_DECIMALS)
}

/// Condenses a large total into `k`/`m`/`b` form for display.
pub fn format_large_number(value: &BigDecimal) -> String {
    let suffixes = [(9u8, "b"), (6, "m"), (3, "k")];
    for (exponent, suffix) in suffixes {
        let unit = ten_pow(exponent);
        if value >= &unit {
            let condensed = (value.clone() / unit).round(1).with_scale(1);
            return format!("{}{}", condensed, suffix);
        }
    }
    trim_fraction(&value.round(2).with_scale(2).to_string())
}

fn trim_fraction(s: &str) -> String {
    if !s.contains('.') {
        return s.to_string();
    }
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
