//! AWS cost/inventory integration
//!
//! Optional read-only source of compute-inventory and cost data for the
//! dashboard's autoscaler panel. Lives behind the [`CostInventory`]
//! trait so its absence degrades gracefully; it shares nothing with the
//! relay's credential path, and a failure here never affects proxying.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Whether the integration is active, and for which region.
#[derive(Debug, Clone, Serialize)]
pub struct AwsStatus {
    /// True when the integration is configured and usable
    pub enabled: bool,
    /// Region being queried, `null` when disabled
    pub region: Option<String>,
}

/// Read-only source of compute inventory and cost data.
#[async_trait]
pub trait CostInventory: Send + Sync {
    /// Integration state for `/api/aws/status`.
    fn status(&self) -> AwsStatus;

    /// Current compute instance inventory.
    async fn instances(&self) -> Result<Value>;

    /// Current-month cost snapshot.
    async fn costs(&self) -> Result<Value>;

    /// Auto-scaling group state.
    async fn autoscaler(&self) -> Result<Value>;
}

/// Always-disabled source, used when credentials are absent or the
/// `aws` feature is compiled out.
pub struct NullCostInventory;

#[async_trait]
impl CostInventory for NullCostInventory {
    fn status(&self) -> AwsStatus {
        AwsStatus {
            enabled: false,
            region: None,
        }
    }

    async fn instances(&self) -> Result<Value> {
        Err(Error::AwsDisabled)
    }

    async fn costs(&self) -> Result<Value> {
        Err(Error::AwsDisabled)
    }

    async fn autoscaler(&self) -> Result<Value> {
        Err(Error::AwsDisabled)
    }
}

#[cfg(feature = "aws")]
pub use self::sdk::AwsCostInventory;

#[cfg(feature = "aws")]
mod sdk {
    use async_trait::async_trait;
    use aws_config::{BehaviorVersion, Region};
    use serde_json::{Value, json};

    use super::{AwsStatus, CostInventory};
    use crate::{Error, Result};

    /// Live AWS-backed source: EC2 inventory, Cost Explorer spend, Auto
    /// Scaling group state. Credentials come from the SDK's default
    /// provider chain; this type never sees them.
    pub struct AwsCostInventory {
        region: String,
        ec2: aws_sdk_ec2::Client,
        cost: aws_sdk_costexplorer::Client,
        autoscaling: aws_sdk_autoscaling::Client,
    }

    impl AwsCostInventory {
        /// Build clients for `region` using the default credential chain.
        pub async fn new(region: &str) -> Self {
            let config = aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.to_string()))
                .load()
                .await;
            Self {
                region: region.to_string(),
                ec2: aws_sdk_ec2::Client::new(&config),
                cost: aws_sdk_costexplorer::Client::new(&config),
                autoscaling: aws_sdk_autoscaling::Client::new(&config),
            }
        }
    }

    fn aws_error(err: impl std::fmt::Display) -> Error {
        Error::Aws(err.to_string())
    }

    #[async_trait]
    impl CostInventory for AwsCostInventory {
        fn status(&self) -> AwsStatus {
            AwsStatus {
                enabled: true,
                region: Some(self.region.clone()),
            }
        }

        async fn instances(&self) -> Result<Value> {
            let mut instances = Vec::new();
            let mut pages = self.ec2.describe_instances().into_paginator().send();
            while let Some(page) = pages.next().await {
                let page = page.map_err(aws_error)?;
                for reservation in page.reservations() {
                    for instance in reservation.instances() {
                        let name = instance
                            .tags()
                            .iter()
                            .find(|t| t.key() == Some("Name"))
                            .and_then(|t| t.value())
                            .unwrap_or_default();
                        instances.push(json!({
                            "id": instance.instance_id(),
                            "type": instance.instance_type().map(|t| t.as_str()),
                            "state": instance
                                .state()
                                .and_then(|s| s.name())
                                .map(|n| n.as_str()),
                            "name": name,
                            "launch_time": instance.launch_time().map(ToString::to_string),
                            "private_ip": instance.private_ip_address(),
                        }));
                    }
                }
            }
            Ok(json!({ "region": self.region, "instances": instances }))
        }

        async fn costs(&self) -> Result<Value> {
            use aws_sdk_costexplorer::types::{DateInterval, Granularity};
            use chrono::Datelike;

            let today = chrono::Utc::now().date_naive();
            let month_start = today.with_day0(0).unwrap_or(today);
            let period = DateInterval::builder()
                .start(month_start.format("%Y-%m-%d").to_string())
                .end(
                    today
                        .succ_opt()
                        .unwrap_or(today)
                        .format("%Y-%m-%d")
                        .to_string(),
                )
                .build()
                .map_err(aws_error)?;

            let output = self
                .cost
                .get_cost_and_usage()
                .time_period(period)
                .granularity(Granularity::Daily)
                .metrics("UnblendedCost")
                .send()
                .await
                .map_err(aws_error)?;

            let days: Vec<Value> = output
                .results_by_time()
                .iter()
                .map(|result| {
                    let cost = result
                        .total()
                        .and_then(|totals| totals.get("UnblendedCost"));
                    json!({
                        "start": result.time_period().map(|p| p.start()),
                        "amount": cost.and_then(|c| c.amount()),
                        "unit": cost.and_then(|c| c.unit()),
                    })
                })
                .collect();
            Ok(json!({ "region": self.region, "days": days }))
        }

        async fn autoscaler(&self) -> Result<Value> {
            let output = self
                .autoscaling
                .describe_auto_scaling_groups()
                .send()
                .await
                .map_err(aws_error)?;

            let groups: Vec<Value> = output
                .auto_scaling_groups()
                .iter()
                .map(|group| {
                    json!({
                        "name": group.auto_scaling_group_name(),
                        "desired": group.desired_capacity(),
                        "min": group.min_size(),
                        "max": group.max_size(),
                        "instances": group.instances().len(),
                    })
                })
                .collect();
            Ok(json!({ "region": self.region, "groups": groups }))
        }
    }
}
