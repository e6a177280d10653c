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

//! Entry point v0.7 user operations

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;

/// Signature used while estimating gas, before the real signature exists.
///
/// A well-formed 65 byte ECDSA signature so that accounts running `ecrecover` during
/// validation spend the same gas as with a real one.
pub const DUMMY_SIGNATURE: [u8; 65] = {
    let mut sig = [0xff; 65];
    let mut i = 32;
    while i < 64 {
        sig[i] = 0x7a;
        i += 1;
    }
    sig[64] = 0x1c;
    sig
};

/// User Operation
///
/// Offchain version, must be packed before hashing
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct UserOperation {
    /// Smart account sending the operation
    pub sender: Address,
    /// Entry point nonce of the sender
    pub nonce: U256,
    /// Factory deploying the sender, set only while undeployed
    pub factory: Option<Address>,
    /// Calldata for the factory
    pub factory_data: Bytes,
    /// Calldata executed by the sender
    pub call_data: Bytes,
    /// Gas limit for the execution phase
    pub call_gas_limit: u128,
    /// Gas limit for the verification phase
    pub verification_gas_limit: u128,
    /// Gas paid to cover bundler overhead
    pub pre_verification_gas: u128,
    /// EIP-1559 max priority fee per gas
    pub max_priority_fee_per_gas: u128,
    /// EIP-1559 max fee per gas
    pub max_fee_per_gas: u128,
    /// Signature over the operation hash
    pub signature: Bytes,
}

/// On-chain layout of a v0.7 user operation
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct PackedUserOperation {
    /// Smart account sending the operation
    pub sender: Address,
    /// Entry point nonce of the sender
    pub nonce: U256,
    /// `factory ++ factory_data`, empty once deployed
    pub init_code: Bytes,
    /// Calldata executed by the sender
    pub call_data: Bytes,
    /// `verification_gas_limit ++ call_gas_limit`
    pub account_gas_limits: B256,
    /// Gas paid to cover bundler overhead
    pub pre_verification_gas: U256,
    /// `max_priority_fee_per_gas ++ max_fee_per_gas`
    pub gas_fees: B256,
    /// Empty, this crate never uses a paymaster
    pub paymaster_and_data: Bytes,
    /// Signature over the operation hash
    pub signature: Bytes,
}

impl UserOperation {
    /// Pack into the layout the entry point hashes.
    pub fn pack(&self) -> PackedUserOperation {
        let init_code = match self.factory {
            Some(factory) => {
                let mut init_code = factory.to_vec();
                init_code.extend_from_slice(&self.factory_data);
                Bytes::from(init_code)
            }
            None => Bytes::new(),
        };

        PackedUserOperation {
            sender: self.sender,
            nonce: self.nonce,
            init_code,
            call_data: self.call_data.clone(),
            account_gas_limits: concat_128(self.verification_gas_limit, self.call_gas_limit),
            pre_verification_gas: U256::from(self.pre_verification_gas),
            gas_fees: concat_128(self.max_priority_fee_per_gas, self.max_fee_per_gas),
            paymaster_and_data: Bytes::new(),
            signature: self.signature.clone(),
        }
    }

    /// Hash with the given entry point and chain ID.
    ///
    /// The signature is not part of the hash.
    pub fn hash(&self, entry_point: Address, chain_id: u64) -> B256 {
        let packed = self.pack();
        let encoded = (
            packed.sender,
            packed.nonce,
            keccak256(&packed.init_code),
            keccak256(&packed.call_data),
            packed.account_gas_limits,
            packed.pre_verification_gas,
            packed.gas_fees,
            keccak256(&packed.paymaster_and_data),
        )
            .abi_encode();

        keccak256((keccak256(encoded), entry_point, U256::from(chain_id)).abi_encode())
    }
}

fn concat_128(high: u128, low: u128) -> B256 {
    let mut word = [0u8; 32];
    word[..16].copy_from_slice(&high.to_be_bytes());
    word[16..].copy_from_slice(&low.to_be_bytes());
    B256::from(word)
}
