// This file is part of Ferry.
//
// Ferry is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Ferry is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Ferry.
// If not, see https://www.gnu.org/licenses/.

//! Token amounts expressed in a token's smallest unit

use alloy_primitives::{utils::format_units, U256};

/// Error scaling a whole-token amount by a decimal count
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{units} tokens with {decimals} decimals does not fit in 256 bits")]
pub struct ScaleOverflow {
    /// Whole tokens requested
    pub units: u64,
    /// Token decimals
    pub decimals: u8,
}

/// Scale a whole-token amount to the token's smallest unit: `units * 10^decimals`.
pub fn scale_units(units: u64, decimals: u8) -> Result<U256, ScaleOverflow> {
    let overflow = ScaleOverflow { units, decimals };
    U256::from(10)
        .checked_pow(U256::from(decimals))
        .and_then(|factor| factor.checked_mul(U256::from(units)))
        .ok_or(overflow)
}

/// Render a scaled amount as a decimal string, e.g. `100000000` with 6 decimals is `100.000000`.
///
/// Falls back to the raw integer if `decimals` is outside the range alloy can format.
pub fn display_units(amount: U256, decimals: u8) -> String {
    format_units(amount, decimals).unwrap_or_else(|_| amount.to_string())
}
