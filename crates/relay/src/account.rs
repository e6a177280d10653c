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

//! ERC-4337 v0.7 SimpleAccount owned by the admin key

use alloy_network::TransactionBuilder;
use alloy_primitives::{aliases::U192, Address, Bytes, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use alloy_sol_types::SolCall;
use ferry_contracts::v0_7::{
    IEntryPoint::getNonceCall,
    SimpleAccount::{executeBatchCall, executeCall},
    SimpleAccountFactory::{createAccountCall, getAddressCall},
};
use ferry_provider::{EvmProvider, ProviderError, TransactionRequest};
use ferry_types::{Call, UserOperation};

use crate::RelayResult;

/// Where the account lives and how its operations are hashed
#[derive(Clone, Copy, Debug)]
pub struct AccountSettings {
    /// Entry point the account is bound to
    pub entry_point: Address,
    /// Factory that deploys the account
    pub factory: Address,
    /// Salt passed to the factory
    pub salt: U256,
    /// Chain ID included in operation hashes
    pub chain_id: u64,
}

/// A counterfactual SimpleAccount, deployed by its first user operation
#[derive(Debug)]
pub struct SimpleSmartAccount<E> {
    evm: E,
    owner: PrivateKeySigner,
    address: Address,
    settings: AccountSettings,
}

impl<E: EvmProvider> SimpleSmartAccount<E> {
    /// Resolve the account address from the factory.
    pub async fn new(
        evm: E,
        owner: PrivateKeySigner,
        settings: AccountSettings,
    ) -> RelayResult<Self> {
        let call = getAddressCall {
            owner: owner.address(),
            salt: settings.salt,
        };
        let tx = TransactionRequest::default()
            .with_to(settings.factory)
            .with_call(&call);
        let data = evm.call(&tx, None).await?;
        let address = getAddressCall::abi_decode_returns(&data, true)
            .map_err(ProviderError::from)?
            .account;

        Ok(Self {
            evm,
            owner,
            address,
            settings,
        })
    }

    /// Account address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Entry point the account is bound to
    pub fn entry_point(&self) -> Address {
        self.settings.entry_point
    }

    /// True once the account has code
    pub async fn is_deployed(&self) -> RelayResult<bool> {
        Ok(!self.evm.get_code(self.address, None).await?.is_empty())
    }

    /// Factory and factory data for the next operation, empty once deployed
    pub async fn factory_fields(&self) -> RelayResult<(Option<Address>, Bytes)> {
        if self.is_deployed().await? {
            return Ok((None, Bytes::new()));
        }

        let call = createAccountCall {
            owner: self.owner.address(),
            salt: self.settings.salt,
        };
        Ok((Some(self.settings.factory), call.abi_encode().into()))
    }

    /// Entry point nonce for key 0
    pub async fn nonce(&self) -> RelayResult<U256> {
        let call = getNonceCall {
            sender: self.address,
            key: U192::ZERO,
        };
        let tx = TransactionRequest::default()
            .with_to(self.settings.entry_point)
            .with_call(&call);
        let data = self.evm.call(&tx, None).await?;
        Ok(getNonceCall::abi_decode_returns(&data, true)
            .map_err(ProviderError::from)?
            .nonce)
    }

    /// Encode calls as account call data.
    ///
    /// A single call uses `execute`, several use `executeBatch`.
    pub fn encode_calls(&self, calls: &[Call]) -> Bytes {
        match calls {
            [call] => executeCall {
                dest: call.to,
                value: call.value,
                func: call.data.clone(),
            }
            .abi_encode()
            .into(),
            calls => executeBatchCall {
                dest: calls.iter().map(|c| c.to).collect(),
                value: calls.iter().map(|c| c.value).collect(),
                func: calls.iter().map(|c| c.data.clone()).collect(),
            }
            .abi_encode()
            .into(),
        }
    }

    /// EIP-191 signature of the operation hash by the owner
    pub fn sign(&self, op: &UserOperation) -> RelayResult<Bytes> {
        let hash = op.hash(self.settings.entry_point, self.settings.chain_id);
        let signature = self.owner.sign_message_sync(hash.as_slice())?;
        Ok(Bytes::from(signature.as_bytes().to_vec()))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use alloy_primitives::{address, bytes, PrimitiveSignature};
    use alloy_sol_types::SolValue;
    use ferry_provider::MockEvmProvider;
    use ferry_types::constants::{ANVIL_DEV_KEY, ENTRY_POINT_V0_7, SIMPLE_ACCOUNT_FACTORY_V0_7};

    use super::*;

    pub(crate) const ACCOUNT: Address = address!("0x1306b01bC3e4AD202612D3843387e94737673F53");
    const POOL: Address = address!("0x87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2");
    const USDC: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

    pub(crate) fn settings() -> AccountSettings {
        AccountSettings {
            entry_point: ENTRY_POINT_V0_7,
            factory: SIMPLE_ACCOUNT_FACTORY_V0_7,
            salt: U256::ZERO,
            chain_id: 31337,
        }
    }

    pub(crate) fn owner() -> PrivateKeySigner {
        ANVIL_DEV_KEY.parse().unwrap()
    }

    // Mock that resolves the factory address and serves `nonce` from the entry point.
    pub(crate) fn evm(deployed: bool, nonce: u64) -> MockEvmProvider {
        let mut evm = MockEvmProvider::default();
        evm.expect_call().returning(move |tx, _| {
            let to = tx.to.and_then(|to| to.to().copied());
            if to == Some(SIMPLE_ACCOUNT_FACTORY_V0_7) {
                Ok(ACCOUNT.abi_encode().into())
            } else {
                Ok(U256::from(nonce).abi_encode().into())
            }
        });
        evm.expect_get_code().returning(move |_, _| {
            Ok(if deployed {
                bytes!("6080")
            } else {
                Bytes::new()
            })
        });
        evm
    }

    async fn account(deployed: bool) -> SimpleSmartAccount<MockEvmProvider> {
        SimpleSmartAccount::new(evm(deployed, 3), owner(), settings())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_address_from_factory() {
        assert_eq!(account(false).await.address(), ACCOUNT);
    }

    #[tokio::test]
    async fn test_factory_fields_only_while_undeployed() {
        let (factory, data) = account(false).await.factory_fields().await.unwrap();
        assert_eq!(factory, Some(SIMPLE_ACCOUNT_FACTORY_V0_7));
        let decoded = createAccountCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.owner, owner().address());

        let (factory, data) = account(true).await.factory_fields().await.unwrap();
        assert_eq!(factory, None);
        assert!(data.is_empty());
    }

    #[tokio::test]
    async fn test_nonce() {
        assert_eq!(account(true).await.nonce().await.unwrap(), U256::from(3));
    }

    #[tokio::test]
    async fn test_single_call_uses_execute() {
        let account = account(true).await;
        let call = Call::new(USDC, bytes!("095ea7b3"));
        let data = account.encode_calls(&[call.clone()]);

        let decoded = executeCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.dest, USDC);
        assert_eq!(decoded.func, call.data);
    }

    #[tokio::test]
    async fn test_many_calls_use_execute_batch() {
        let account = account(true).await;
        let calls = vec![
            Call::new(USDC, bytes!("095ea7b3")),
            Call::new(POOL, bytes!("617ba037")),
        ];
        let data = account.encode_calls(&calls);

        assert!(executeCall::abi_decode(&data, true).is_err());
        let decoded = executeBatchCall::abi_decode(&data, true).unwrap();
        assert_eq!(decoded.dest, vec![USDC, POOL]);
        assert_eq!(decoded.func.len(), 2);
    }

    #[tokio::test]
    async fn test_signature_recovers_owner() {
        let account = account(true).await;
        let op = UserOperation {
            sender: ACCOUNT,
            ..Default::default()
        };
        let signature = account.sign(&op).unwrap();
        assert_eq!(signature.len(), 65);

        let signature = PrimitiveSignature::try_from(signature.as_ref()).unwrap();
        let hash = op.hash(ENTRY_POINT_V0_7, 31337);
        let recovered = signature
            .recover_address_from_msg(hash.as_slice())
            .unwrap();
        assert_eq!(recovered, owner().address());
    }
}
