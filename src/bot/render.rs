//! Chat reply formatting

use crate::reward::daily_reward;
use crate::types::{PoolAccountInfo, RewardRates, StatusSnapshot, SAT_PER_PART};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Format a base-unit amount with `scale` implied decimals as `"x.xx PART"`
pub fn part_amount(value: i64, scale: u32) -> String {
    let amount = Decimal::new(value, scale)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2} PART", amount)
}

/// Fixed-width node status block
pub fn render_status(snapshot: &StatusSnapshot, now: DateTime<Utc>) -> String {
    let node = &snapshot.node;

    let mut msg = String::from("*Particl Node Info*\n```");
    msg += &format!(" Timestamp  : {}\n", now.to_rfc3339_opts(SecondsFormat::Secs, true));
    msg += &format!(" Status     : {}\n", node.status);
    msg += &format!(" Version    : {}\n", node.version_display());
    msg += &format!(" Uptime     : {}\n", node.uptime_display());
    msg += &format!(" Peers      : {}\n", node.peers_display());
    msg += &format!(" Last Block : {}\n", node.last_block_display());
    msg += &format!(" Staking    : {}\n", node.weight_display());
    msg += &format!(" NetStaking : {}\n", node.net_weight_display());
    msg += &format!(" MP Fee Vote: {:.6} PART\n", node.smsg_fee_rate_target);
    msg += "```";
    msg
}

pub fn render_account_info(account: &str, info: &PoolAccountInfo) -> String {
    let open_payout = info.accumulated / SAT_PER_PART as i64 - info.reward_paid_out - info.reward_pending;

    format!(
        "Staking pool account info for `{}`:\n\
         total rewards: {}, confirmed payout: {}, unconfirmed payout: {}, open payout: {}, last staking weight: {}",
        account,
        part_amount(info.accumulated, 16),
        part_amount(info.reward_paid_out, 8),
        part_amount(info.reward_pending, 8),
        part_amount(open_payout, 8),
        part_amount(info.current_total, 8),
    )
}

pub fn render_stake_info(rates: RewardRates, amount: f64) -> String {
    let mut msg = format!("Nominal annual staking interest rate: {:.1}\n", rates.nominal);
    msg += &format!("Actual annual staking interest rate: {:.1}\n", rates.actual);

    if amount > 0.0 {
        msg += &format!(
            "Nominal daily reward for staking {:.2} PART: {:.2} PART\n",
            amount,
            daily_reward(amount, rates.nominal)
        );
        msg += &format!(
            "Actual daily reward for staking {:.2} PART: {:.2} PART\n",
            amount,
            daily_reward(amount, rates.actual)
        );
    }

    msg
}
