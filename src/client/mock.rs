//! Mock node and pool clients for testing
//!
//! Each query can be switched between a canned answer and a failure, and the
//! node mock counts status ticks so loop cadence can be asserted.

use super::{NodeClient, PoolClient};
use crate::error::{DaemonError, Result};
use crate::types::{
    BlockchainInfo, NetworkInfo, PoolAccountInfo, StakingInfo, StakingOptions, SAT_PER_PART,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// How the mock answers `set_staking_options`
#[derive(Debug, Clone)]
pub enum SetReply {
    /// Report back exactly what was requested
    Echo,
    /// Report fixed options regardless of the request
    Fixed(StakingOptions),
    Fail,
}

/// Canned node answers; `None` makes the call fail
#[derive(Debug, Clone)]
pub struct MockNodeState {
    pub auth_ok: bool,
    pub network: Option<NetworkInfo>,
    pub blockchain: Option<BlockchainInfo>,
    pub staking: Option<StakingInfo>,
    pub uptime: Option<u64>,
    pub options: Option<StakingOptions>,
    pub set_reply: SetReply,
}

impl Default for MockNodeState {
    fn default() -> Self {
        Self {
            auth_ok: true,
            network: Some(NetworkInfo {
                subversion: "/Satoshi:23.2.7/".to_string(),
                connections: 8,
            }),
            blockchain: Some(BlockchainInfo { blocks: 1_500_000 }),
            staking: Some(healthy_staking_info()),
            uptime: Some(2 * 86_400),
            options: Some(StakingOptions {
                enabled: true,
                reward_address: Some("pcs1qpool".to_string()),
                smsg_fee_rate_target: 0.0005,
            }),
            set_reply: SetReply::Echo,
        }
    }
}

/// Staking info with an 18% actual and 7.2% nominal rate
pub fn healthy_staking_info() -> StakingInfo {
    StakingInfo {
        staking: true,
        errors: String::new(),
        weight: 50_000 * SAT_PER_PART,
        net_stake_weight: 4_000_000 * SAT_PER_PART,
        money_supply: 10_000_000.0,
        percent_year_reward: 8.0,
        donation_percent: 10.0,
    }
}

/// Mock staking node
#[derive(Debug, Default)]
pub struct MockNode {
    state: Mutex<MockNodeState>,
    auth_calls: AtomicU64,
    latency: Duration,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: MockNodeState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Mutate the canned answers in place
    pub fn update(&self, f: impl FnOnce(&mut MockNodeState)) {
        f(&mut self.state.lock());
    }

    /// Number of ticks that reached the node
    pub fn auth_calls(&self) -> u64 {
        self.auth_calls.load(Ordering::SeqCst)
    }

    async fn answer<T: Clone>(&self, pick: impl FnOnce(&MockNodeState) -> Option<T>) -> Result<T> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let value = pick(&self.state.lock());
        value.ok_or_else(|| DaemonError::Communication("mock node failure".to_string()))
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn authenticate(&self) -> Result<()> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        let ok = self.state.lock().auth_ok;
        if ok {
            Ok(())
        } else {
            Err(DaemonError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no cookie",
            )))
        }
    }

    async fn network_info(&self) -> Result<NetworkInfo> {
        self.answer(|s| s.network.clone()).await
    }

    async fn blockchain_info(&self) -> Result<BlockchainInfo> {
        self.answer(|s| s.blockchain.clone()).await
    }

    async fn staking_info(&self, _wallet: &str) -> Result<StakingInfo> {
        self.answer(|s| s.staking.clone()).await
    }

    async fn uptime(&self) -> Result<u64> {
        self.answer(|s| s.uptime).await
    }

    async fn staking_options(&self, _wallet: &str) -> Result<StakingOptions> {
        self.answer(|s| s.options.clone()).await
    }

    async fn set_staking_options(
        &self,
        enabled: bool,
        reward_address: &str,
        fee_rate_target: f64,
        _wallet: &str,
    ) -> Result<StakingOptions> {
        let reply = self.state.lock().set_reply.clone();
        match reply {
            SetReply::Echo => Ok(StakingOptions {
                enabled,
                reward_address: Some(reward_address.to_string()),
                smsg_fee_rate_target: fee_rate_target,
            }),
            SetReply::Fixed(options) => Ok(options),
            SetReply::Fail => Err(DaemonError::Communication("mock node failure".to_string())),
        }
    }
}

/// Mock pool service
#[derive(Debug, Default)]
pub struct MockPool {
    accounts: HashMap<String, PoolAccountInfo>,
    fail: bool,
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: &str, info: PoolAccountInfo) -> Self {
        self.accounts.insert(account.to_string(), info);
        self
    }

    pub fn with_failures(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl PoolClient for MockPool {
    async fn account_info(&self, account: &str) -> Result<PoolAccountInfo> {
        if self.fail {
            return Err(DaemonError::Communication("mock pool failure".to_string()));
        }

        Ok(self.accounts.get(account).cloned().unwrap_or(PoolAccountInfo {
            error: Some("Invalid address".to_string()),
            ..PoolAccountInfo::default()
        }))
    }
}
