//! Staking on/off control

use crate::client::NodeClient;
use std::fmt;
use std::sync::Arc;

/// Result of a staking control request, rendered verbatim to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Ok,
    CommunicationFailed,
    SettingFailed,
}

impl fmt::Display for ControlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::CommunicationFailed => "communication failed",
            Self::SettingFailed => "setting failed",
        })
    }
}

/// Switches staking on the pool wallet while keeping the pool reward address
pub struct StakingController {
    node: Arc<dyn NodeClient>,
    wallet: String,
    reward_address: String,
    fee_rate_target: f64,
}

impl StakingController {
    pub fn new(
        node: Arc<dyn NodeClient>,
        wallet: String,
        reward_address: String,
        fee_rate_target: f64,
    ) -> Self {
        Self {
            node,
            wallet,
            reward_address,
            fee_rate_target,
        }
    }

    pub async fn set_staking(&self, enabled: bool) -> ControlOutcome {
        tracing::info!("Staking control: {}", if enabled { "on" } else { "off" });

        if let Err(e) = self.node.authenticate().await {
            tracing::error!("Staking control: failed to read node cookie: {}", e);
            return ControlOutcome::CommunicationFailed;
        }

        let options = match self
            .node
            .set_staking_options(enabled, &self.reward_address, self.fee_rate_target, &self.wallet)
            .await
        {
            Ok(options) => options,
            Err(e) => {
                tracing::error!("Staking control: set staking options failed: {}", e);
                return ControlOutcome::CommunicationFailed;
            }
        };

        if options.enabled != enabled
            || options.reward_address.as_deref() != Some(self.reward_address.as_str())
        {
            tracing::error!("Staking control: node reported {:?}", options);
            return ControlOutcome::SettingFailed;
        }

        ControlOutcome::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockNode, SetReply};
    use crate::types::StakingOptions;

    fn controller(node: Arc<MockNode>) -> StakingController {
        StakingController::new(node, "pool".to_string(), "pcs1qpool".to_string(), 0.0005)
    }

    #[tokio::test]
    async fn test_staking_on_ok() {
        let node = Arc::new(MockNode::new());
        assert_eq!(controller(node).set_staking(true).await, ControlOutcome::Ok);
    }

    #[tokio::test]
    async fn test_staking_off_ok() {
        let node = Arc::new(MockNode::new());
        assert_eq!(controller(node).set_staking(false).await, ControlOutcome::Ok);
    }

    #[tokio::test]
    async fn test_cookie_failure() {
        let node = Arc::new(MockNode::new());
        node.update(|s| s.auth_ok = false);
        let outcome = controller(node).set_staking(true).await;
        assert_eq!(outcome, ControlOutcome::CommunicationFailed);
        assert_eq!(outcome.to_string(), "communication failed");
    }

    #[tokio::test]
    async fn test_rpc_failure() {
        let node = Arc::new(MockNode::new());
        node.update(|s| s.set_reply = SetReply::Fail);
        assert_eq!(
            controller(node).set_staking(true).await,
            ControlOutcome::CommunicationFailed
        );
    }

    #[tokio::test]
    async fn test_node_ignores_request() {
        let node = Arc::new(MockNode::new());
        node.update(|s| {
            s.set_reply = SetReply::Fixed(StakingOptions {
                enabled: false,
                reward_address: Some("pcs1qpool".to_string()),
                smsg_fee_rate_target: 0.0005,
            })
        });
        let outcome = controller(node).set_staking(true).await;
        assert_eq!(outcome, ControlOutcome::SettingFailed);
        assert_eq!(outcome.to_string(), "setting failed");
    }

    #[tokio::test]
    async fn test_wrong_reward_address() {
        let node = Arc::new(MockNode::new());
        node.update(|s| {
            s.set_reply = SetReply::Fixed(StakingOptions {
                enabled: true,
                reward_address: Some("pother".to_string()),
                smsg_fee_rate_target: 0.0005,
            })
        });
        assert_eq!(
            controller(node).set_staking(true).await,
            ControlOutcome::SettingFailed
        );
    }
}
