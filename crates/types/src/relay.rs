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

use alloy_primitives::{Address, Bytes, TxHash, B256, U128, U256};
use serde::{Deserialize, Serialize};

/// A single call executed by a smart account
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    /// Target contract
    pub to: Address,
    /// Wei sent with the call
    pub value: U256,
    /// ABI-encoded call data
    pub data: Bytes,
}

impl Call {
    /// A call that sends no value
    pub fn new(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to,
            value: U256::ZERO,
            data: data.into(),
        }
    }
}

/// EIP-1559 fee pair for a user operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasFees {
    /// EIP-1559 max fee per gas
    pub max_fee_per_gas: U128,
    /// EIP-1559 max priority fee per gas
    pub max_priority_fee_per_gas: U128,
}

/// Fee tiers quoted by the relay
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasFeeValues {
    /// Cheapest tier
    pub slow: GasFees,
    /// Default tier, used when submitting
    pub standard: GasFees,
    /// Most expensive tier
    pub fast: GasFees,
}

/// Projection of a mined transaction receipt
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MinedTransaction {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block the transaction was included in
    pub block_number: Option<u64>,
    /// Execution status
    pub success: bool,
}

/// Projection of a user operation receipt
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserOperationOutcome {
    /// User operation hash
    pub user_op_hash: B256,
    /// Hash of the bundle transaction that included the operation
    pub tx_hash: TxHash,
    /// Block the bundle was included in
    pub block_number: Option<u64>,
    /// Whether the operation's execution succeeded
    pub success: bool,
    /// Revert reason, if the bundler reported one
    pub reason: Option<String>,
}
