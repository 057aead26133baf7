//! JSON-RPC client for particld
//!
//! Authenticates with the `.cookie` file the node writes into its data
//! directory. Wallet-scoped calls go to `/wallet/<name>`.

use super::{NodeClient, CONTROL_TIMEOUT};
use crate::error::{DaemonError, Result};
use crate::types::{BlockchainInfo, NetworkInfo, StakingInfo, StakingOptions};
use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;

const COOKIE_FILE: &str = ".cookie";

/// particld RPC client
pub struct ParticlRpc {
    http: Client,
    base_url: String,
    data_dir: PathBuf,
    credentials: RwLock<Option<Credentials>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Credentials {
    user: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: &'static str,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl ParticlRpc {
    pub fn new(host: &str, port: u16, data_dir: PathBuf) -> Result<Self> {
        let http = Client::builder().timeout(CONTROL_TIMEOUT).build()?;

        Ok(Self {
            http,
            base_url: format!("http://{}:{}", host, port),
            data_dir,
            credentials: RwLock::new(None),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
        wallet: Option<&str>,
    ) -> Result<T> {
        let credentials = self
            .credentials
            .read()
            .clone()
            .ok_or_else(|| DaemonError::Communication("RPC cookie not loaded".to_string()))?;

        let url = match wallet.filter(|w| !w.is_empty()) {
            Some(w) => format!("{}/wallet/{}", self.base_url, w),
            None => self.base_url.clone(),
        };

        let request = RpcRequest {
            jsonrpc: "1.0",
            id: "stakepool-infod",
            method,
            params,
        };

        let response = self
            .http
            .post(&url)
            .basic_auth(&credentials.user, Some(&credentials.password))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        // RPC errors come back as HTTP 500 with a JSON error object
        let parsed: RpcResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(DaemonError::Communication(format!(
                    "{} returned HTTP {}",
                    method, status
                )));
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(err) = parsed.error {
            return Err(DaemonError::Protocol(format!(
                "{} failed ({}): {}",
                method, err.code, err.message
            )));
        }

        Ok(serde_json::from_value(parsed.result)?)
    }
}

fn parse_cookie(contents: &str) -> Result<Credentials> {
    let (user, password) = contents
        .trim()
        .split_once(':')
        .ok_or_else(|| DaemonError::Protocol("malformed RPC cookie".to_string()))?;

    Ok(Credentials {
        user: user.to_string(),
        password: password.to_string(),
    })
}

/// `walletsettings stakingoptions` wraps the options, and reports a plain
/// string when nothing has been set yet
fn unwrap_staking_options(value: Value) -> Result<StakingOptions> {
    match value.get("stakingoptions") {
        Some(options @ Value::Object(_)) => Ok(serde_json::from_value(options.clone())?),
        Some(_) => Ok(StakingOptions::default()),
        None => Err(DaemonError::Protocol(
            "walletsettings reply lacks stakingoptions".to_string(),
        )),
    }
}

#[async_trait]
impl NodeClient for ParticlRpc {
    async fn authenticate(&self) -> Result<()> {
        let path = self.data_dir.join(COOKIE_FILE);
        let contents = tokio::fs::read_to_string(&path).await?;
        let credentials = parse_cookie(&contents)?;

        *self.credentials.write() = Some(credentials);
        Ok(())
    }

    async fn network_info(&self) -> Result<NetworkInfo> {
        self.call("getnetworkinfo", json!([]), None).await
    }

    async fn blockchain_info(&self) -> Result<BlockchainInfo> {
        self.call("getblockchaininfo", json!([]), None).await
    }

    async fn staking_info(&self, wallet: &str) -> Result<StakingInfo> {
        self.call("getstakinginfo", json!([]), Some(wallet)).await
    }

    async fn uptime(&self) -> Result<u64> {
        self.call("uptime", json!([]), None).await
    }

    async fn staking_options(&self, wallet: &str) -> Result<StakingOptions> {
        let value: Value = self
            .call("walletsettings", json!(["stakingoptions"]), Some(wallet))
            .await?;
        unwrap_staking_options(value)
    }

    async fn set_staking_options(
        &self,
        enabled: bool,
        reward_address: &str,
        fee_rate_target: f64,
        wallet: &str,
    ) -> Result<StakingOptions> {
        let options = StakingOptions {
            enabled,
            reward_address: Some(reward_address.to_string()),
            smsg_fee_rate_target: fee_rate_target,
        };

        let value: Value = self
            .call(
                "walletsettings",
                json!(["stakingoptions", options]),
                Some(wallet),
            )
            .await?;
        unwrap_staking_options(value)
    }
}
