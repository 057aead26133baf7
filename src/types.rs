//! Core data types shared across the daemon

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Base units per coin.
pub const SAT_PER_PART: u64 = 100_000_000;

/// Placeholder rendered for fields that have no fresh value.
pub const NA: &str = "n/a";

/// Overall node classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeState {
    /// No poll has completed yet
    #[default]
    Unknown,
    Staking,
    NotStaking(String),
    CommunicationError,
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => f.write_str(NA),
            Self::Staking => f.write_str("staking"),
            Self::NotStaking(cause) => write!(f, "not-staking: {}", cause),
            Self::CommunicationError => f.write_str("communication-error"),
        }
    }
}

impl Serialize for NodeState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Node-derived part of the status, written by the status loop
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStatus {
    pub status: NodeState,
    pub uptime_secs: Option<u64>,
    pub peers: Option<u32>,
    pub last_block: Option<u64>,
    pub version: Option<String>,
    /// Own stake weight in base units
    pub weight: Option<u64>,
    /// Network stake weight in base units
    pub net_weight: Option<u64>,
    pub smsg_fee_rate_target: f64,
}

impl NodeStatus {
    /// Status published when the node cannot be reached at all.
    pub fn communication_error() -> Self {
        Self {
            status: NodeState::CommunicationError,
            ..Self::default()
        }
    }

    pub fn uptime_display(&self) -> String {
        self.uptime_secs
            .map(|s| format!("{:.1} days", s as f64 / 3600.0 / 24.0))
            .unwrap_or_else(|| NA.to_string())
    }

    pub fn peers_display(&self) -> String {
        self.peers
            .map(|p| p.to_string())
            .unwrap_or_else(|| NA.to_string())
    }

    pub fn last_block_display(&self) -> String {
        self.last_block
            .map(|b| b.to_string())
            .unwrap_or_else(|| NA.to_string())
    }

    pub fn version_display(&self) -> String {
        self.version.clone().unwrap_or_else(|| NA.to_string())
    }

    pub fn weight_display(&self) -> String {
        self.weight
            .map(|w| format!("{} PART", w / SAT_PER_PART))
            .unwrap_or_else(|| NA.to_string())
    }

    pub fn net_weight_display(&self) -> String {
        self.net_weight
            .map(|w| format!("{}K PART", w / SAT_PER_PART / 1000))
            .unwrap_or_else(|| NA.to_string())
    }
}

/// Annual reward rates in percent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RewardRates {
    pub nominal: f64,
    pub actual: f64,
}

/// Point-in-time copy of everything the daemon knows about the node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusSnapshot {
    pub node: NodeStatus,
    pub rates: RewardRates,
}

impl Serialize for StatusSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("StatusSnapshot", 10)?;
        s.serialize_field("status", &self.node.status)?;
        s.serialize_field("uptime", &self.node.uptime_display())?;
        s.serialize_field("peers", &self.node.peers_display())?;
        s.serialize_field("last_block", &self.node.last_block_display())?;
        s.serialize_field("version", &self.node.version_display())?;
        s.serialize_field("weight", &self.node.weight_display())?;
        s.serialize_field("net_weight", &self.node.net_weight_display())?;
        s.serialize_field("nominal_rate", &self.rates.nominal)?;
        s.serialize_field("actual_rate", &self.rates.actual)?;
        s.serialize_field("smsg_fee_rate_target", &self.node.smsg_fee_rate_target)?;
        s.end()
    }
}

/// One persisted reward observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardSample {
    /// Unix seconds
    pub timestamp: i64,
    pub nominal_rate: f64,
    pub actual_rate: f64,
}

/// Aggregated actual reward rate over one time window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryBucket {
    /// Start of the window, unix seconds
    pub timestamp: i64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Hourly,
    Daily,
}

impl Granularity {
    pub fn interval_secs(&self) -> i64 {
        match self {
            Self::Hourly => 60 * 60,
            Self::Daily => 24 * 60 * 60,
        }
    }

    pub fn max_buckets(&self) -> usize {
        match self {
            Self::Hourly => 24,
            Self::Daily => 30,
        }
    }
}

/// `getnetworkinfo` subset
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NetworkInfo {
    pub subversion: String,
    pub connections: u32,
}

/// `getblockchaininfo` subset
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BlockchainInfo {
    pub blocks: u64,
}

/// `getstakinginfo` subset
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StakingInfo {
    pub staking: bool,
    /// Node supplied reason when not staking
    pub errors: String,
    pub weight: u64,
    #[serde(rename = "netstakeweight")]
    pub net_stake_weight: u64,
    #[serde(rename = "moneysupply")]
    pub money_supply: f64,
    #[serde(rename = "percentyearreward")]
    pub percent_year_reward: f64,
    #[serde(rename = "treasurydonationpercent")]
    pub donation_percent: f64,
}

/// Wallet staking options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StakingOptions {
    pub enabled: bool,
    #[serde(rename = "rewardaddress", skip_serializing_if = "Option::is_none")]
    pub reward_address: Option<String>,
    #[serde(rename = "smsgfeeratetarget")]
    pub smsg_fee_rate_target: f64,
}

/// Pool service account record, amounts in base units
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PoolAccountInfo {
    #[serde(deserialize_with = "empty_string_as_none")]
    pub error: Option<String>,
    /// Scaled by an extra 1e8 relative to the payout fields
    pub accumulated: i64,
    #[serde(rename = "rewardpending")]
    pub reward_pending: i64,
    #[serde(rename = "rewardpaidout")]
    pub reward_paid_out: i64,
    #[serde(rename = "currenttotal")]
    pub current_total: i64,
    #[serde(rename = "laststaking")]
    pub last_staking: i64,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
