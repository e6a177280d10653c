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

//! Drives a run through its stages

use std::sync::Arc;

use alloy_primitives::U256;
use anyhow::Context;
use ferry_provider::ChainProvider;
use ferry_relay::{RelayConnector, RelaySender, RelayStatus};
use ferry_types::{display_units, Event, Path, Stage};
use tracing::{error, info, instrument, warn};

use crate::{
    fund_admin, log_stranded_balances, run_direct_path, run_relay_path, Amounts, DirectReport,
    FlowSettings, FundingReport, RelayReport,
};

/// Result of the path that completed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathReport {
    /// Supply went through the relay
    Relay(RelayReport),
    /// Supply was signed by the admin
    Direct(DirectReport),
}

impl PathReport {
    /// The path that produced this report
    pub fn path(&self) -> Path {
        match self {
            PathReport::Relay(_) => Path::Relay,
            PathReport::Direct(_) => Path::Direct,
        }
    }
}

/// Balances after withdrawing everything from the pool
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WithdrawReport {
    /// Admin stablecoin balance
    pub token_balance: U256,
    /// Admin receipt token balance
    pub receipt_balance: U256,
}

/// Outcome of a successful run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Stages in the order they were entered
    pub stages: Vec<Stage>,
    /// Funding stage result
    pub funding: FundingReport,
    /// Completed path
    pub outcome: PathReport,
    /// Present when a withdrawal was requested and succeeded
    pub withdrawal: Option<WithdrawReport>,
}

impl RunSummary {
    /// The path that completed
    pub fn path(&self) -> Path {
        self.outcome.path()
    }
}

#[derive(Default)]
struct RunState {
    funding: Option<FundingReport>,
    amounts: Option<Amounts>,
    sender: Option<Arc<dyn RelaySender>>,
    outcome: Option<PathReport>,
    failure: Option<anyhow::Error>,
}

impl RunState {
    fn amounts(&self) -> anyhow::Result<Amounts> {
        self.amounts.context("amounts are resolved during funding")
    }
}

/// Runs the stages of a single run, from funding to a completed path
pub struct Runner<C, R> {
    chain: C,
    connector: R,
    settings: FlowSettings,
}

impl<C, R> Runner<C, R>
where
    C: ChainProvider,
    R: RelayConnector,
{
    /// Create a new runner
    pub fn new(chain: C, connector: R, settings: FlowSettings) -> Self {
        Self {
            chain,
            connector,
            settings,
        }
    }

    /// Run every stage until `Done` or `Failed`.
    ///
    /// Errors when the run ends in `Failed`.
    #[instrument(skip_all)]
    pub async fn run(&self) -> anyhow::Result<RunSummary> {
        let mut stage = Stage::Funding;
        let mut stages = vec![stage];
        let mut state = RunState::default();

        while !stage.is_terminal() {
            let event = self.step(stage, &mut state).await?;
            let next = stage.next(event)?;
            info!("Stage {stage} --{event}--> {next}");
            stage = next;
            stages.push(stage);
        }

        if stage == Stage::Failed {
            let err = state
                .failure
                .unwrap_or_else(|| anyhow::anyhow!("run failed without an error"));
            return Err(err.context(format!("run failed after stages {stages:?}")));
        }

        let funding = state.funding.context("done without funding")?;
        let outcome = state.outcome.context("done without a completed path")?;
        match outcome.path() {
            Path::Relay => info!("=== RELAY INTEGRATION COMPLETED SUCCESSFULLY ==="),
            Path::Direct => info!("=== DIRECT INTEGRATION COMPLETED SUCCESSFULLY ==="),
        }

        let withdrawal = if self.settings.withdraw_after_supply {
            let amounts = state.amounts.context("done without amounts")?;
            match self.withdraw_all(&amounts).await {
                Ok(report) => Some(report),
                Err(err) => {
                    warn!("Withdrawal failed: {err:#}");
                    None
                }
            }
        } else {
            None
        };

        Ok(RunSummary {
            stages,
            funding,
            outcome,
            withdrawal,
        })
    }

    async fn step(&self, stage: Stage, state: &mut RunState) -> anyhow::Result<Event> {
        let event = match stage {
            Stage::Funding => self.handle_funding(state).await,
            Stage::Probing => self.handle_probing(state).await,
            Stage::RelayPath => self.handle_relay_path(state).await?,
            Stage::DirectPath => self.handle_direct_path(state).await?,
            Stage::Done | Stage::Failed => anyhow::bail!("no step from terminal stage {stage}"),
        };
        Ok(event)
    }

    async fn handle_funding(&self, state: &mut RunState) -> Event {
        info!("--- FUNDING ADMIN ACCOUNT ---");
        let result = async {
            let report = fund_admin(&self.chain, &self.settings).await?;
            let amounts = Amounts::resolve(&self.chain, &self.settings, report.decimals).await?;
            anyhow::Ok((report, amounts))
        }
        .await;

        match result {
            Ok((report, amounts)) => {
                info!(
                    "Supply amount: {}",
                    display_units(amounts.supply, amounts.decimals)
                );
                state.funding = Some(report);
                state.amounts = Some(amounts);
                Event::Funded
            }
            Err(err) => {
                error!("Funding failed: {err:#}");
                state.failure = Some(err.context("funding failed"));
                Event::FundingFailed
            }
        }
    }

    async fn handle_probing(&self, state: &mut RunState) -> Event {
        info!("--- CHECKING RELAY ---");
        match self.connector.probe().await {
            RelayStatus::Available { url, .. } => {
                info!("Relay available at {url}");
            }
            RelayStatus::Unavailable(err) => {
                warn!("Relay is not available ({err}), using direct interaction instead");
                return Event::RelayUnavailable;
            }
        }

        match self.connector.connect().await {
            Ok(sender) => {
                state.sender = Some(sender);
                Event::RelayReady
            }
            Err(err) => {
                warn!("Failed to connect to relay: {err}. Proceeding with direct interaction");
                Event::RelayUnavailable
            }
        }
    }

    async fn handle_relay_path(&self, state: &mut RunState) -> anyhow::Result<Event> {
        info!("--- RELAY TRANSACTION SEQUENCE ---");
        let amounts = state.amounts()?;
        let sender = state
            .sender
            .take()
            .context("relay path entered without a sender")?;

        let event = match run_relay_path(&self.chain, sender.as_ref(), &self.settings, &amounts)
            .await
        {
            Ok(report) => {
                state.outcome = Some(PathReport::Relay(report));
                Event::RelayCompleted
            }
            Err(err) => {
                warn!("Relay transaction failed: {err:#}");
                log_stranded_balances(
                    &self.chain,
                    sender.account_address(),
                    &self.settings,
                    &amounts,
                )
                .await;
                info!("Falling back to direct interaction");
                Event::RelayFailed
            }
        };
        Ok(event)
    }

    async fn handle_direct_path(&self, state: &mut RunState) -> anyhow::Result<Event> {
        info!("--- DIRECT INTERACTION ---");
        let amounts = state.amounts()?;

        let event = match run_direct_path(&self.chain, &self.settings, &amounts).await {
            Ok(report) => {
                state.outcome = Some(PathReport::Direct(report));
                Event::DirectCompleted
            }
            Err(err) => {
                error!("Direct interaction failed: {err:#}");
                state.failure = Some(err.context("direct interaction failed"));
                Event::DirectFailed
            }
        };
        Ok(event)
    }

    async fn withdraw_all(&self, amounts: &Amounts) -> anyhow::Result<WithdrawReport> {
        let admin = self.chain.admin_address();
        info!("Withdrawing everything from pool {}", self.settings.pool);
        let tx_hash = self
            .chain
            .withdraw(self.settings.pool, self.settings.token, U256::MAX, admin)
            .await?;
        self.chain.wait_for_transaction(tx_hash).await?;

        let token_balance = self.chain.balance_of(self.settings.token, admin).await?;
        let receipt_balance = self
            .chain
            .balance_of(self.settings.receipt_token, admin)
            .await?;
        info!(
            "After withdrawal: token balance {}, receipt token balance {}",
            display_units(token_balance, amounts.decimals),
            display_units(receipt_balance, amounts.receipt_decimals)
        );

        Ok(WithdrawReport {
            token_balance,
            receipt_balance,
        })
    }
}
