//! Status aggregation
//!
//! Runs the collector loops that keep the shared status current:
//! 1. Status loop: polls the node every tick and republishes the snapshot
//! 2. Reward loop: averages stored reward samples (store configured only)
//! 3. History loop: rebuilds the hourly/daily buckets (store configured only)
//!
//! Each loop is its own task; a slow node or database stalls only the loop
//! that is waiting on it. Cancellation is checked between ticks.

mod shared;

pub use shared::SharedStatus;

use crate::client::NodeClient;
use crate::reward::{summarize_samples, RewardSmoother};
use crate::storage::HistoryStore;
use crate::types::{Granularity, HistoryBucket, NodeState, NodeStatus, RewardRates, StatusSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Samples averaged by the reward loop
pub const REWARD_SAMPLE_COUNT: usize = 100;

/// Loop cadence and wallet selection
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub wallet: String,
    pub status_interval: Duration,
    pub reward_interval: Duration,
    pub history_interval: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            wallet: String::new(),
            status_interval: Duration::from_secs(60),
            reward_interval: Duration::from_secs(60),
            history_interval: Duration::from_secs(600),
        }
    }
}

/// Owner of the published status and the loops that feed it
pub struct StatusAggregator {
    shared: SharedStatus,
    node: Arc<dyn NodeClient>,
    store: Option<Arc<dyn HistoryStore>>,
    config: AggregatorConfig,
}

impl StatusAggregator {
    pub fn new(
        node: Arc<dyn NodeClient>,
        store: Option<Arc<dyn HistoryStore>>,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            shared: SharedStatus::new(),
            node,
            store,
            config,
        }
    }

    /// Read handle for consumers (HTTP, bot)
    pub fn shared(&self) -> SharedStatus {
        self.shared.clone()
    }

    pub fn status(&self) -> StatusSnapshot {
        self.shared.status()
    }

    pub fn history(&self, granularity: Granularity) -> Vec<HistoryBucket> {
        self.shared.history(granularity)
    }

    /// Spawn the status loop and, with a store, the reward and history loops
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();

        let this = Arc::clone(&self);
        let token = cancel.clone();
        handles.push(tokio::spawn(async move { this.run_status_loop(token).await }));

        if self.store.is_some() {
            let this = Arc::clone(&self);
            let token = cancel.clone();
            handles.push(tokio::spawn(async move { this.run_reward_loop(token).await }));

            let this = Arc::clone(&self);
            handles.push(tokio::spawn(async move { this.run_history_loop(cancel).await }));
        }

        handles
    }

    pub async fn run_status_loop(&self, cancel: CancellationToken) {
        tracing::info!(
            "Status collector started (interval: {}s)",
            self.config.status_interval.as_secs()
        );

        let mut smoother = RewardSmoother::new();

        while !cancel.is_cancelled() {
            self.poll_status(&mut smoother).await;

            if !sleep_or_cancel(self.config.status_interval, &cancel).await {
                break;
            }
        }

        tracing::info!("Status collector shutting down");
    }

    pub async fn run_reward_loop(&self, cancel: CancellationToken) {
        let Some(store) = self.store.clone() else {
            return;
        };

        tracing::info!(
            "Reward collector started (interval: {}s)",
            self.config.reward_interval.as_secs()
        );

        while !cancel.is_cancelled() {
            self.refresh_rates(store.as_ref()).await;

            if !sleep_or_cancel(self.config.reward_interval, &cancel).await {
                break;
            }
        }

        tracing::info!("Reward collector shutting down");
    }

    pub async fn run_history_loop(&self, cancel: CancellationToken) {
        let Some(store) = self.store.clone() else {
            return;
        };

        tracing::info!(
            "History collector started (interval: {}s)",
            self.config.history_interval.as_secs()
        );

        while !cancel.is_cancelled() {
            self.refresh_history(store.as_ref()).await;

            if !sleep_or_cancel(self.config.history_interval, &cancel).await {
                break;
            }
        }

        tracing::info!("History collector shutting down");
    }

    /// One status tick. Every query runs even when an earlier one failed, so
    /// a failure only blanks the fields that query is responsible for.
    pub async fn poll_status(&self, smoother: &mut RewardSmoother) -> NodeStatus {
        if let Err(e) = self.node.authenticate().await {
            tracing::warn!("Node authentication failed: {}", e);
            let status = NodeStatus::communication_error();
            self.shared.publish_node(status.clone(), None);
            return status;
        }

        let wallet = self.config.wallet.as_str();
        let mut status = NodeStatus::default();
        let mut failures = 0usize;
        let mut rates: Option<RewardRates> = None;

        match self.node.network_info().await {
            Ok(info) => {
                status.version = Some(info.subversion);
                status.peers = Some(info.connections);
            }
            Err(e) => {
                tracing::error!("getnetworkinfo failed: {}", e);
                failures += 1;
            }
        }

        match self.node.blockchain_info().await {
            Ok(info) => status.last_block = Some(info.blocks),
            Err(e) => {
                tracing::error!("getblockchaininfo failed: {}", e);
                failures += 1;
            }
        }

        let staking = match self.node.staking_info(wallet).await {
            Ok(info) => {
                status.weight = Some(info.weight);
                status.net_weight = Some(info.net_stake_weight);

                // Without a store the rates come straight from the node
                if self.store.is_none() {
                    match smoother.observe(&info) {
                        Ok(r) => rates = Some(r),
                        Err(e) => tracing::warn!("Skipping reward estimate: {}", e),
                    }
                }
                Some(info)
            }
            Err(e) => {
                tracing::error!("getstakinginfo failed: {}", e);
                failures += 1;
                None
            }
        };

        match self.node.uptime().await {
            Ok(secs) => status.uptime_secs = Some(secs),
            Err(e) => {
                tracing::error!("uptime failed: {}", e);
                failures += 1;
            }
        }

        match self.node.staking_options(wallet).await {
            Ok(options) => status.smsg_fee_rate_target = options.smsg_fee_rate_target,
            Err(e) => {
                tracing::error!("walletsettings stakingoptions failed: {}", e);
                failures += 1;
            }
        }

        status.status = match staking {
            _ if failures > 0 => NodeState::CommunicationError,
            Some(info) if info.staking => NodeState::Staking,
            Some(info) => NodeState::NotStaking(info.errors),
            None => NodeState::CommunicationError,
        };

        tracing::debug!("Node status: {} ({} failed queries)", status.status, failures);

        self.shared.publish_node(status.clone(), rates);
        status
    }

    /// One reward tick; store failures keep the previous rates
    pub async fn refresh_rates(&self, store: &dyn HistoryStore) -> Option<RewardRates> {
        let samples = match store.recent_samples(REWARD_SAMPLE_COUNT).await {
            Ok(samples) => samples,
            Err(e) => {
                tracing::error!("Reward sample query failed: {}", e);
                return None;
            }
        };

        let rates = summarize_samples(&samples)?;
        self.shared.publish_rates(rates);
        Some(rates)
    }

    /// One history tick; both sequences are replaced only if both queries
    /// succeed
    pub async fn refresh_history(&self, store: &dyn HistoryStore) -> bool {
        let hourly = store
            .bucketed(
                Granularity::Hourly.interval_secs(),
                Granularity::Hourly.max_buckets(),
            )
            .await;
        let daily = store
            .bucketed(
                Granularity::Daily.interval_secs(),
                Granularity::Daily.max_buckets(),
            )
            .await;

        match (hourly, daily) {
            (Ok(hourly), Ok(daily)) => {
                tracing::debug!(
                    "Reward history updated: {} hourly, {} daily buckets",
                    hourly.len(),
                    daily.len()
                );
                self.shared.publish_history(hourly, daily);
                true
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!("Reward history query failed: {}", e);
                false
            }
        }
    }
}

/// Sleep for `period`; false when cancelled first
pub(crate) async fn sleep_or_cancel(period: Duration, cancel: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(period) => true,
    }
}
