//! Particl Staking Pool Info Daemon
//!
//! Aggregates staking node status and reward-rate history and republishes
//! them over a small HTTP API and a Telegram bot.

pub mod api;
pub mod bot;
pub mod client;
pub mod config;
pub mod control;
pub mod error;
pub mod monitor;
pub mod notify;
pub mod reward;
pub mod storage;
pub mod types;

#[cfg(test)]
mod error_tests;

pub use error::{DaemonError, Result};
