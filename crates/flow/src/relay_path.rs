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

//! Supplying through the smart account and relay

use alloy_primitives::{Address, U256};
use alloy_sol_types::SolCall;
use anyhow::Context;
use ferry_contracts::{
    erc20::IERC20::{approveCall, transferCall},
    pool::IPool::supplyCall,
};
use ferry_provider::ChainProvider;
use ferry_relay::RelaySender;
use ferry_types::{display_units, Call, MinedTransaction, UserOperationOutcome};

use crate::{Amounts, FlowSettings};

/// Result of the relay path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayReport {
    /// Smart account the calls ran from
    pub account: Address,
    /// Admin transfer of the supply amount to the smart account
    pub funding: MinedTransaction,
    /// Relayed approval of the pool
    pub approve: UserOperationOutcome,
    /// Relayed supply to the pool
    pub supply: UserOperationOutcome,
    /// Relayed transfer of the receipt token back to the admin
    pub transfer_back: UserOperationOutcome,
    /// Receipt token moved back to the admin
    pub receipt_transferred: U256,
    /// Admin receipt token balance at the end of the path, if it could be read
    pub admin_receipt_balance: Option<U256>,
}

/// Move the supply amount into the smart account, then approve, supply, and transfer the
/// receipt token back through the relay.
///
/// Each relayed call is confirmed before the next one is sent.
pub async fn run_relay_path<C: ChainProvider>(
    chain: &C,
    sender: &dyn RelaySender,
    settings: &FlowSettings,
    amounts: &Amounts,
) -> anyhow::Result<RelayReport> {
    let admin = chain.admin_address();
    let account = sender.account_address();

    tracing::info!("Transferring tokens to smart account {account}");
    let tx_hash = chain
        .transfer(settings.token, account, amounts.supply)
        .await
        .context("transfer to smart account failed")?;
    let funding = chain
        .wait_for_transaction(tx_hash)
        .await
        .context("transfer to smart account was not confirmed")?;
    let account_balance = chain.balance_of(settings.token, account).await?;
    tracing::info!(
        "Smart account token balance: {}",
        display_units(account_balance, amounts.decimals)
    );

    let approve = approveCall {
        spender: settings.pool,
        amount: amounts.supply,
    };
    let supply = supplyCall {
        asset: settings.token,
        amount: amounts.supply,
        onBehalfOf: account,
        referralCode: settings.referral_code,
    };

    let approve = send_and_wait(
        sender,
        "approval",
        Call::new(settings.token, approve.abi_encode()),
    )
    .await?;
    let supply = send_and_wait(
        sender,
        "supply",
        Call::new(settings.pool, supply.abi_encode()),
    )
    .await?;

    let receipt_transferred = chain.balance_of(settings.receipt_token, account).await?;
    tracing::info!(
        "Smart account receipt token balance: {}",
        display_units(receipt_transferred, amounts.receipt_decimals)
    );

    let transfer_back = transferCall {
        to: admin,
        amount: receipt_transferred,
    };
    let transfer_back = send_and_wait(
        sender,
        "transfer back",
        Call::new(settings.receipt_token, transfer_back.abi_encode()),
    )
    .await?;

    // Every relayed call is confirmed, a failed read here must not trigger the fallback.
    let admin_receipt_balance = match chain.balance_of(settings.receipt_token, admin).await {
        Ok(balance) => {
            tracing::info!(
                "Admin receipt token balance: {}",
                display_units(balance, amounts.receipt_decimals)
            );
            Some(balance)
        }
        Err(err) => {
            tracing::warn!("Failed to read admin receipt token balance: {err}");
            None
        }
    };

    Ok(RelayReport {
        account,
        funding,
        approve,
        supply,
        transfer_back,
        receipt_transferred,
        admin_receipt_balance,
    })
}

async fn send_and_wait(
    sender: &dyn RelaySender,
    label: &str,
    call: Call,
) -> anyhow::Result<UserOperationOutcome> {
    tracing::info!("Sending {label} transaction");
    let hash = sender
        .send_calls(vec![call])
        .await
        .with_context(|| format!("failed to send {label}"))?;
    tracing::info!("{label} user operation hash: {hash}");
    let outcome = sender
        .wait_for_receipt(hash)
        .await
        .with_context(|| format!("{label} was not confirmed"))?;
    tracing::info!("{label} included in transaction {}", outcome.tx_hash);
    Ok(outcome)
}

/// Log tokens left in the smart account after a failed relay path.
///
/// Nothing is moved back. Read failures are logged and ignored.
pub async fn log_stranded_balances<C: ChainProvider>(
    chain: &C,
    account: Address,
    settings: &FlowSettings,
    amounts: &Amounts,
) {
    let tokens = [
        ("token", settings.token, amounts.decimals),
        ("receipt token", settings.receipt_token, amounts.receipt_decimals),
    ];
    for (name, token, decimals) in tokens {
        match chain.balance_of(token, account).await {
            Ok(balance) if !balance.is_zero() => tracing::warn!(
                "Smart account {account} still holds {} {name}, it is not recovered",
                display_units(balance, decimals)
            ),
            Ok(_) => {}
            Err(err) => tracing::warn!("Failed to read stranded {name} balance: {err}"),
        }
    }
}
