//! Reward rate estimation
//!
//! Turns raw `getstakinginfo` numbers into annual reward-rate estimates:
//! - Nominal rate: the advertised yearly reward after the treasury donation
//! - Actual rate: the yearly reward spread over the network-wide stake weight
//!
//! The actual rate is noisy from one poll to the next, so it is passed through
//! an exponential moving average before being published.


use crate::error::{DaemonError, Result};
use crate::types::{RewardRates, RewardSample, StakingInfo, SAT_PER_PART};

/// Weight kept from the previous average on every update.
///
/// Fixed at 0.99, which gives the filter a horizon of roughly 100 samples
/// (about 100 minutes at the default poll interval). Not a deployment knob.
pub const SMOOTHING_RETAIN: f64 = 0.99;

/// Weight given to the newest observation.
pub const SMOOTHING_ADOPT: f64 = 1.0 - SMOOTHING_RETAIN;

/// Nominal annual rate in percent
pub fn nominal_rate(percent_year_reward: f64, donation_percent: f64) -> f64 {
    percent_year_reward * (100.0 - donation_percent) / 100.0
}

/// Actual annual rate in percent given the network stake weight in base units
pub fn actual_rate(
    money_supply: f64,
    percent_year_reward: f64,
    donation_percent: f64,
    net_stake_weight: u64,
) -> Result<f64> {
    if net_stake_weight == 0 {
        return Err(DaemonError::DivisionByZero);
    }

    let yearly_reward = money_supply * percent_year_reward * (100.0 - donation_percent) / (100.0 * 100.0);
    let staked = net_stake_weight as f64 / SAT_PER_PART as f64;

    Ok(yearly_reward / staked * 100.0)
}

/// One EMA step; a zero previous value means "not seeded yet"
pub fn smooth(previous: f64, value: f64) -> f64 {
    if previous == 0.0 {
        value
    } else {
        SMOOTHING_RETAIN * previous + SMOOTHING_ADOPT * value
    }
}

/// Owns the smoothing state for the actual reward rate
#[derive(Debug, Clone, Default)]
pub struct RewardSmoother {
    average: f64,
}

impl RewardSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current smoothed actual rate, 0 before the first observation
    pub fn average(&self) -> f64 {
        self.average
    }

    /// Fold one staking-info observation into the average and return the
    /// rates to publish. On error the state is left untouched.
    pub fn observe(&mut self, info: &StakingInfo) -> Result<RewardRates> {
        let nominal = nominal_rate(info.percent_year_reward, info.donation_percent);
        let actual = actual_rate(
            info.money_supply,
            info.percent_year_reward,
            info.donation_percent,
            info.net_stake_weight,
        )?;

        self.average = smooth(self.average, actual);

        Ok(RewardRates {
            nominal,
            actual: self.average,
        })
    }
}

/// Rates derived from stored samples (newest first): the mean actual rate
/// and the most recent non-zero nominal rate. `None` for an empty window.
pub fn summarize_samples(samples: &[RewardSample]) -> Option<RewardRates> {
    if samples.is_empty() {
        return None;
    }

    let nominal = samples
        .iter()
        .map(|s| s.nominal_rate)
        .find(|r| *r != 0.0)
        .unwrap_or(0.0);
    let actual = samples.iter().map(|s| s.actual_rate).sum::<f64>() / samples.len() as f64;

    Some(RewardRates { nominal, actual })
}

/// Projected daily reward for `amount` coins at an annual `rate` in percent
pub fn daily_reward(amount: f64, rate: f64) -> f64 {
    amount * rate / 100.0 / 365.0
}
