//! Shared status accessor
//!
//! The snapshot and both history sequences live behind one lock. Readers get
//! copies, writers replace whole values; the lock is never held across I/O.

use crate::types::{Granularity, HistoryBucket, NodeStatus, RewardRates, StatusSnapshot};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Default)]
struct AggregateState {
    snapshot: StatusSnapshot,
    /// Newest first
    hourly: Vec<HistoryBucket>,
    /// Newest first
    daily: Vec<HistoryBucket>,
}

/// Cloneable handle to the published status
#[derive(Debug, Clone, Default)]
pub struct SharedStatus {
    inner: Arc<RwLock<AggregateState>>,
}

impl SharedStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current snapshot
    pub fn status(&self) -> StatusSnapshot {
        self.inner.read().snapshot.clone()
    }

    /// Copy of one history sequence, newest first
    pub fn history(&self, granularity: Granularity) -> Vec<HistoryBucket> {
        let state = self.inner.read();
        match granularity {
            Granularity::Hourly => state.hourly.clone(),
            Granularity::Daily => state.daily.clone(),
        }
    }

    /// Copy of (hourly, daily) taken under a single read
    pub fn histories(&self) -> (Vec<HistoryBucket>, Vec<HistoryBucket>) {
        let state = self.inner.read();
        (state.hourly.clone(), state.daily.clone())
    }

    /// Replace the node part of the snapshot and, when given, the rates
    pub fn publish_node(&self, node: NodeStatus, rates: Option<RewardRates>) {
        let mut state = self.inner.write();
        state.snapshot.node = node;
        if let Some(rates) = rates {
            state.snapshot.rates = rates;
        }
    }

    pub fn publish_rates(&self, rates: RewardRates) {
        self.inner.write().snapshot.rates = rates;
    }

    /// Swap both history sequences together
    pub fn publish_history(&self, hourly: Vec<HistoryBucket>, daily: Vec<HistoryBucket>) {
        let mut state = self.inner.write();
        state.hourly = hourly;
        state.daily = daily;
    }
}
