//! Reward statistics storage
//!
//! The daemon never writes samples itself; an external indexer fills the
//! `stakingratestats` table and this module only issues read and aggregate
//! queries against it.

pub mod history;
#[cfg(test)]
pub mod mock;


use crate::error::Result;
use crate::types::{HistoryBucket, RewardSample};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

pub use history::{bucketize, reduce_buckets, round2};

/// Queryable time series of reward samples
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Most recent samples, newest first
    async fn recent_samples(&self, limit: usize) -> Result<Vec<RewardSample>>;

    /// Samples grouped into `interval_secs` windows, newest first, at most
    /// `limit` buckets, values rounded to two decimals
    async fn bucketed(&self, interval_secs: i64, limit: usize) -> Result<Vec<HistoryBucket>>;
}

// The table is owned by the indexer; columns are cast so narrower integer or
// float column types still decode as i64/f64.
pub(crate) const RECENT_SAMPLES_SQL: &str = r#"
    SELECT block_time::bigint AS block_time,
           nominal_rate::float8 AS nominal_rate,
           actual_rate::float8 AS actual_rate
    FROM stakingratestats
    ORDER BY block_nr DESC
    LIMIT $1
"#;

pub(crate) const BUCKETED_SQL: &str = r#"
    SELECT (block_time::bigint / $1)::bigint AS bucket,
           (sum(actual_rate::float8) / count(actual_rate))::float8 AS avg_rate,
           min(actual_rate::float8) AS min_rate,
           max(actual_rate::float8) AS max_rate
    FROM stakingratestats
    GROUP BY bucket
    ORDER BY bucket DESC
    LIMIT $2
"#;

/// Postgres backed reward statistics
pub struct PgHistoryStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct SampleRow {
    block_time: i64,
    nominal_rate: f64,
    actual_rate: f64,
}

#[derive(Debug, sqlx::FromRow)]
struct BucketRow {
    bucket: i64,
    avg_rate: f64,
    min_rate: f64,
    max_rate: f64,
}

impl PgHistoryStore {
    /// Connect and verify the connection with a round trip
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl HistoryStore for PgHistoryStore {
    async fn recent_samples(&self, limit: usize) -> Result<Vec<RewardSample>> {
        let rows = sqlx::query_as::<_, SampleRow>(RECENT_SAMPLES_SQL)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RewardSample {
                timestamp: r.block_time,
                nominal_rate: r.nominal_rate,
                actual_rate: r.actual_rate,
            })
            .collect())
    }

    async fn bucketed(&self, interval_secs: i64, limit: usize) -> Result<Vec<HistoryBucket>> {
        let rows = sqlx::query_as::<_, BucketRow>(BUCKETED_SQL)
        .bind(interval_secs)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let buckets = rows
            .into_iter()
            .map(|r| HistoryBucket {
                timestamp: r.bucket * interval_secs,
                avg: r.avg_rate,
                min: r.min_rate,
                max: r.max_rate,
            })
            .collect();

        Ok(reduce_buckets(buckets, limit))
    }
}
