//! Stake pool web service client

use super::{PoolClient, CONTROL_TIMEOUT};
use crate::error::{DaemonError, Result};
use crate::types::PoolAccountInfo;
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Client for the pool's public JSON endpoints
pub struct PoolApi {
    http: Client,
    base_url: Url,
}

impl PoolApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder().timeout(CONTROL_TIMEOUT).build()?;
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| DaemonError::Config(format!("invalid pool url {}: {}", base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(DaemonError::Config(format!("invalid pool url {}", base_url)));
        }

        Ok(Self { http, base_url })
    }

    /// `<base>/json/address/<account>` with the account percent-encoded
    fn account_url(&self, account: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["json", "address", account]);
        }
        url
    }
}

#[async_trait]
impl PoolClient for PoolApi {
    async fn account_info(&self, account: &str) -> Result<PoolAccountInfo> {
        let response = self.http.get(self.account_url(account)).send().await?;

        if !response.status().is_success() {
            return Err(DaemonError::Communication(format!(
                "pool returned HTTP {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}
