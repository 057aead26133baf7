//! In-memory history store for testing

use super::{bucketize, HistoryStore};
use crate::error::{DaemonError, Result};
use crate::types::{HistoryBucket, RewardSample};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct MockHistoryStore {
    samples: Mutex<Vec<RewardSample>>,
    fail: AtomicBool,
    sample_queries: AtomicU64,
    bucket_queries: AtomicU64,
}

impl MockHistoryStore {
    pub fn new(samples: Vec<RewardSample>) -> Self {
        Self {
            samples: Mutex::new(samples),
            ..Self::default()
        }
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn push(&self, sample: RewardSample) {
        self.samples.lock().push(sample);
    }

    pub fn sample_queries(&self) -> u64 {
        self.sample_queries.load(Ordering::SeqCst)
    }

    pub fn bucket_queries(&self) -> u64 {
        self.bucket_queries.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            Err(DaemonError::Communication("mock store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl HistoryStore for MockHistoryStore {
    async fn recent_samples(&self, limit: usize) -> Result<Vec<RewardSample>> {
        self.sample_queries.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let mut samples = self.samples.lock().clone();
        samples.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        samples.truncate(limit);
        Ok(samples)
    }

    async fn bucketed(&self, interval_secs: i64, limit: usize) -> Result<Vec<HistoryBucket>> {
        self.bucket_queries.fetch_add(1, Ordering::SeqCst);
        self.check()?;

        let samples = self.samples.lock().clone();
        Ok(bucketize(&samples, interval_secs, limit))
    }
}
