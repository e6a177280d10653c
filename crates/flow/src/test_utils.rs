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

use alloy_primitives::{address, b256, Address, TxHash, U256};
use ferry_provider::MockChainProvider;
use ferry_types::{MinedTransaction, RunConfig};

use crate::FlowSettings;

pub(crate) const ADMIN: Address = address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub(crate) const ACCOUNT: Address = address!("0x1306b01bC3e4AD202612D3843387e94737673F53");
pub(crate) const HASH: TxHash =
    b256!("0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060");

pub(crate) fn settings() -> FlowSettings {
    FlowSettings::from(&RunConfig::default())
}

pub(crate) fn mined(tx_hash: TxHash) -> MinedTransaction {
    MinedTransaction {
        tx_hash,
        block_number: Some(1),
        success: true,
    }
}

/// Token reads: every token reports `decimals`, every balance is `balance`.
pub(crate) fn expect_reads(chain: &mut MockChainProvider, decimals: u8, balance: U256) {
    chain.expect_admin_address().return_const(ADMIN);
    chain.expect_decimals().returning(move |_| Ok(decimals));
    chain.expect_balance_of().returning(move |_, _| Ok(balance));
    chain.expect_allowance().returning(|_, _, _| Ok(U256::ZERO));
}

/// A whale transfer that confirms.
pub(crate) fn expect_funding(chain: &mut MockChainProvider) {
    chain.expect_impersonate_account().returning(|_| Ok(()));
    chain
        .expect_stop_impersonating_account()
        .returning(|_| Ok(()));
    chain
        .expect_transfer_unlocked()
        .returning(|_, _, _, _| Ok(HASH));
}

/// Every signed transaction confirms.
pub(crate) fn expect_confirmations(chain: &mut MockChainProvider) {
    chain
        .expect_wait_for_transaction()
        .returning(|hash| Ok(mined(hash)));
}
