use super::render::{render_account_info, render_stake_info, render_status};
use crate::client::PoolClient;
use crate::error::{DaemonError, Result};
use crate::monitor::SharedStatus;
use crate::notify::telegram::Message;
use chrono::Utc;
use std::sync::Arc;

/// Extract the command and its arguments from a chat message
///
/// Entity offsets are taken as byte offsets into the text. A trailing
/// `@botname` is stripped from the command.
pub fn parse_command(message: &Message) -> Option<(String, Vec<String>)> {
    let text = message.text.as_str();

    message
        .entities
        .iter()
        .filter(|e| e.kind == "bot_command")
        .filter_map(|e| {
            let end = e.offset.checked_add(e.length)?;
            let raw = text.get(e.offset..end)?;
            let cmd = raw.split('@').next().unwrap_or(raw).to_string();
            let args = text
                .get(end..)
                .unwrap_or_default()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            Some((cmd, args))
        })
        .last()
}

/// Maps chat commands to reply text
pub struct CommandDispatcher {
    status: SharedStatus,
    pool: Arc<dyn PoolClient>,
}

impl CommandDispatcher {
    pub fn new(status: SharedStatus, pool: Arc<dyn PoolClient>) -> Self {
        Self { status, pool }
    }

    pub async fn dispatch(&self, cmd: &str, args: &[String], user: &str) -> String {
        match cmd {
            "/start" => start_text(user),
            "/status" => render_status(&self.status.status(), Utc::now()),
            "/accountinfo" => self
                .account_info(args)
                .await
                .unwrap_or_else(|e| error_reply(&e, ACCOUNT_INFO_FAILED)),
            "/stakeinfo" => self
                .stake_info(args)
                .unwrap_or_else(|e| error_reply(&e, STAKE_INFO_FAILED)),
            _ => "Invalid command.".to_string(),
        }
    }

    async fn account_info(&self, args: &[String]) -> Result<String> {
        let account = args
            .first()
            .ok_or_else(|| DaemonError::Validation("Missing account ID argument.".to_string()))?;

        let info = self.pool.account_info(account).await?;
        if info.error.as_deref() == Some("Invalid address") {
            return Err(DaemonError::Validation(format!(
                "Account ID `{}` is not valid.",
                account
            )));
        }

        Ok(render_account_info(account, &info))
    }

    fn stake_info(&self, args: &[String]) -> Result<String> {
        let amount = match args.first() {
            Some(arg) => parse_amount(arg)?,
            None => 0.0,
        };

        Ok(render_stake_info(self.status.status().rates, amount))
    }
}

const ACCOUNT_INFO_FAILED: &str = "Error while retrieving account information - try again later.";
const STAKE_INFO_FAILED: &str = "Error while retrieving staking information - try again later.";

fn parse_amount(arg: &str) -> Result<f64> {
    arg.parse::<f64>()
        .map_err(|_| DaemonError::Validation(format!("PART amount value \"{}\" is not valid.", arg)))
}

/// Reply for a failed command: validation errors are shown as-is, anything
/// else is logged and replaced by `generic`
pub(crate) fn error_reply(err: &DaemonError, generic: &str) -> String {
    match err.user_message() {
        Some(msg) => msg.to_string(),
        None => {
            tracing::warn!("Bot command failed ({:?}): {}", err.kind(), err);
            generic.to_string()
        }
    }
}

fn start_text(user: &str) -> String {
    format!(
        "Hello {}!\n\n\
         This bot is intended to monitor and query the Crymel Particl Cold Staking Pool: https://particl.crymel.icu\n\
         \n*Commands:*\n\
         /status - Get Particl node status\n\
         /accountinfo <account id> - Get account balance in staking pool\n\
         /stakeinfo [<amount PART>] - Get staking interest rate info",
        user
    )
}
