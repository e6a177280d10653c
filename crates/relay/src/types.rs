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

//! ERC-4337 JSON-RPC wire types

use alloy_primitives::{Address, Bytes, TxHash, B256, U128, U256, U64};
use ferry_types::{UserOperation, UserOperationOutcome};
use serde::{Deserialize, Serialize};

/// User operation definition for RPC inputs
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcUserOperation {
    sender: Address,
    nonce: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    factory: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    factory_data: Option<Bytes>,
    call_data: Bytes,
    call_gas_limit: U128,
    verification_gas_limit: U128,
    pre_verification_gas: U256,
    max_priority_fee_per_gas: U128,
    max_fee_per_gas: U128,
    signature: Bytes,
}

impl From<&UserOperation> for RpcUserOperation {
    fn from(op: &UserOperation) -> Self {
        let factory_data = op.factory.map(|_| op.factory_data.clone());
        RpcUserOperation {
            sender: op.sender,
            nonce: op.nonce,
            factory: op.factory,
            factory_data,
            call_data: op.call_data.clone(),
            call_gas_limit: U128::from(op.call_gas_limit),
            verification_gas_limit: U128::from(op.verification_gas_limit),
            pre_verification_gas: U256::from(op.pre_verification_gas),
            max_priority_fee_per_gas: U128::from(op.max_priority_fee_per_gas),
            max_fee_per_gas: U128::from(op.max_fee_per_gas),
            signature: op.signature.clone(),
        }
    }
}

/// Gas limits returned by `eth_estimateUserOperationGas`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GasEstimate {
    /// Gas paid to cover bundler overhead
    pub pre_verification_gas: u128,
    /// Gas limit for the verification phase
    pub verification_gas_limit: u128,
    /// Gas limit for the execution phase
    pub call_gas_limit: u128,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcGasEstimate {
    pre_verification_gas: U256,
    verification_gas_limit: U256,
    call_gas_limit: U256,
}

impl From<RpcGasEstimate> for GasEstimate {
    fn from(estimate: RpcGasEstimate) -> Self {
        GasEstimate {
            pre_verification_gas: estimate.pre_verification_gas.saturating_to(),
            verification_gas_limit: estimate.verification_gas_limit.saturating_to(),
            call_gas_limit: estimate.call_gas_limit.saturating_to(),
        }
    }
}

/// Bundle transaction fields of a user operation receipt
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcBundleReceipt {
    transaction_hash: TxHash,
    block_number: Option<U64>,
}

/// Receipt returned by `eth_getUserOperationReceipt`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RpcUserOperationReceipt {
    user_op_hash: B256,
    success: bool,
    #[serde(default)]
    reason: Option<String>,
    receipt: RpcBundleReceipt,
}

impl From<RpcUserOperationReceipt> for UserOperationOutcome {
    fn from(receipt: RpcUserOperationReceipt) -> Self {
        UserOperationOutcome {
            user_op_hash: receipt.user_op_hash,
            tx_hash: receipt.receipt.transaction_hash,
            block_number: receipt.receipt.block_number.map(|n| n.to()),
            success: receipt.success,
            reason: receipt.reason.filter(|r| !r.is_empty()),
        }
    }
}
