//! Node and pool clients
//!
//! This module provides the narrow interfaces the aggregation core talks to:
//! - NodeClient: the staking node's JSON-RPC interface
//! - PoolClient: the stake pool's public web service

mod particl;
mod pool;
#[cfg(test)]
pub mod mock;

pub use particl::ParticlRpc;
pub use pool::PoolApi;

use crate::error::Result;
use crate::types::{BlockchainInfo, NetworkInfo, PoolAccountInfo, StakingInfo, StakingOptions};
use async_trait::async_trait;
use std::time::Duration;

/// Timeout applied to every node and pool request
pub const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Queries against the staking node
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Refresh the authentication context (RPC cookie)
    async fn authenticate(&self) -> Result<()>;

    async fn network_info(&self) -> Result<NetworkInfo>;

    async fn blockchain_info(&self) -> Result<BlockchainInfo>;

    async fn staking_info(&self, wallet: &str) -> Result<StakingInfo>;

    /// Node uptime in seconds
    async fn uptime(&self) -> Result<u64>;

    async fn staking_options(&self, wallet: &str) -> Result<StakingOptions>;

    /// Apply staking options and return what the node reports back
    async fn set_staking_options(
        &self,
        enabled: bool,
        reward_address: &str,
        fee_rate_target: f64,
        wallet: &str,
    ) -> Result<StakingOptions>;
}

/// Read-only queries against the pool service
#[async_trait]
pub trait PoolClient: Send + Sync {
    async fn account_info(&self, account: &str) -> Result<PoolAccountInfo>;
}
