//! Time-bucketed reward history
//!
//! Groups samples into fixed-width windows (hourly/daily) and summarizes the
//! actual rate of each window as average, minimum and maximum.

use crate::types::{HistoryBucket, RewardSample};
use std::collections::BTreeMap;

/// Round to two decimals, halves away from zero for positive values
pub fn round2(x: f64) -> f64 {
    (x * 100.0 + 0.5).floor() / 100.0
}

/// Order buckets newest first, keep at most `max_buckets` and round them.
///
/// Applied to store output as well as to locally grouped samples so both
/// paths publish identical shapes.
pub fn reduce_buckets(mut buckets: Vec<HistoryBucket>, max_buckets: usize) -> Vec<HistoryBucket> {
    buckets.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    buckets.truncate(max_buckets);

    for bucket in &mut buckets {
        bucket.avg = round2(bucket.avg);
        bucket.min = round2(bucket.min);
        bucket.max = round2(bucket.max);
    }

    buckets
}

/// Group samples by `floor(timestamp / interval_secs)`
pub fn bucketize(
    samples: &[RewardSample],
    interval_secs: i64,
    max_buckets: usize,
) -> Vec<HistoryBucket> {
    if interval_secs <= 0 {
        return Vec::new();
    }

    #[derive(Clone, Copy)]
    struct Acc {
        sum: f64,
        count: u32,
        min: f64,
        max: f64,
    }

    let mut groups: BTreeMap<i64, Acc> = BTreeMap::new();

    for sample in samples {
        let key = sample.timestamp.div_euclid(interval_secs);
        let rate = sample.actual_rate;

        groups
            .entry(key)
            .and_modify(|acc| {
                acc.sum += rate;
                acc.count += 1;
                acc.min = acc.min.min(rate);
                acc.max = acc.max.max(rate);
            })
            .or_insert(Acc {
                sum: rate,
                count: 1,
                min: rate,
                max: rate,
            });
    }

    let buckets = groups
        .into_iter()
        .rev()
        .take(max_buckets)
        .map(|(key, acc)| HistoryBucket {
            timestamp: key * interval_secs,
            avg: acc.sum / acc.count as f64,
            min: acc.min,
            max: acc.max,
        })
        .collect();

    reduce_buckets(buckets, max_buckets)
}
