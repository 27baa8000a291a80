//! Auto Scaling Group instance discovery through the AWS CLI.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use tfinv_runner::{CommandRunner, CommandSpec};

use crate::config::InventoryConfig;
use crate::error::{InventoryError, InventoryResult};
use crate::terraform::TerraformReader;

const ASG_INSTANCE_IDS_QUERY: &str = "AutoScalingGroups[0].Instances[*].InstanceId";
const INSTANCE_DETAILS_QUERY: &str =
    "Reservations[*].Instances[*].[InstanceId,PublicIpAddress,PrivateIpAddress]";

/// An EC2 instance as projected by `describe-instances`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, Option<String>, Option<String>)")]
pub struct InstanceRecord {
    pub instance_id: String,
    pub public_ip: Option<String>,
    pub private_ip: Option<String>,
}

impl From<(String, Option<String>, Option<String>)> for InstanceRecord {
    fn from((instance_id, public_ip, private_ip): (String, Option<String>, Option<String>)) -> Self {
        Self {
            instance_id,
            public_ip,
            private_ip,
        }
    }
}

impl InstanceRecord {
    pub fn new(instance_id: &str, public_ip: Option<&str>, private_ip: Option<&str>) -> Self {
        Self {
            instance_id: instance_id.to_string(),
            public_ip: public_ip.map(str::to_string),
            private_ip: private_ip.map(str::to_string),
        }
    }

    /// Address Ansible should connect to: the public IP unless it is
    /// missing or blank, otherwise the private IP.
    pub fn reachable_address(&self) -> Option<&str> {
        self.public_ip
            .as_deref()
            .filter(|ip| !ip.is_empty())
            .or(self.private_ip.as_deref())
    }
}

/// Parse the instance ID list returned for an Auto Scaling Group.
///
/// A group that does not exist comes back as `null` and is treated as
/// having no members.
pub fn parse_instance_ids(json: &str) -> InventoryResult<Vec<String>> {
    let ids: Option<Vec<String>> = serde_json::from_str(json)?;
    Ok(ids.unwrap_or_default())
}

/// Parse `describe-instances` output and flatten its per-reservation lists.
pub fn flatten_reservations(json: &str) -> InventoryResult<Vec<InstanceRecord>> {
    let reservations: Vec<Vec<InstanceRecord>> = serde_json::from_str(json)?;
    Ok(reservations.into_iter().flatten().collect())
}

/// Lists the instances currently in the Auto Scaling Group named by a
/// Terraform output.
pub struct AsgInstanceLister {
    runner: Arc<dyn CommandRunner>,
    terraform: TerraformReader,
    aws_bin: String,
    asg_output: String,
    profile: Option<String>,
    region: Option<String>,
}

impl AsgInstanceLister {
    pub fn new(runner: Arc<dyn CommandRunner>, config: &InventoryConfig) -> Self {
        let terraform = TerraformReader::new(runner.clone(), &config.state_dir)
            .with_binary(&config.terraform_bin);

        Self {
            runner,
            terraform,
            aws_bin: config.aws_bin.clone(),
            asg_output: config.asg_output.clone(),
            profile: config.aws_profile.clone(),
            region: config.aws_region.clone(),
        }
    }

    fn aws_command(&self, service: &str, operation: &str) -> CommandSpec {
        let mut spec = CommandSpec::new(&self.aws_bin).args([service, operation]);
        if let Some(profile) = &self.profile {
            spec = spec.args(["--profile", profile.as_str()]);
        }
        if let Some(region) = &self.region {
            spec = spec.args(["--region", region.as_str()]);
        }
        spec
    }

    async fn run_aws(&self, spec: CommandSpec) -> InventoryResult<String> {
        let output = self
            .runner
            .run_checked(&spec)
            .await
            .map_err(|e| InventoryError::CloudProvider(e.to_string()))?;
        Ok(output.stdout)
    }

    /// Instance IDs currently attached to the group.
    pub async fn asg_instance_ids(&self, asg_name: &str) -> InventoryResult<Vec<String>> {
        let spec = self
            .aws_command("autoscaling", "describe-auto-scaling-groups")
            .args(["--auto-scaling-group-names", asg_name])
            .args(["--query", ASG_INSTANCE_IDS_QUERY])
            .args(["--output", "json"]);

        let stdout = self.run_aws(spec).await?;
        parse_instance_ids(&stdout).map_err(|e| {
            InventoryError::CloudProvider(format!("unexpected describe-auto-scaling-groups output: {}", e))
        })
    }

    /// ID and addresses of the given instances, flattened across reservations.
    pub async fn describe_instances(&self, ids: &[String]) -> InventoryResult<Vec<InstanceRecord>> {
        let spec = self
            .aws_command("ec2", "describe-instances")
            .arg("--instance-ids")
            .args(ids.iter().cloned())
            .args(["--query", INSTANCE_DETAILS_QUERY])
            .args(["--output", "json"]);

        let stdout = self.run_aws(spec).await?;
        flatten_reservations(&stdout).map_err(|e| {
            InventoryError::CloudProvider(format!("unexpected describe-instances output: {}", e))
        })
    }

    /// Resolve the group name, then its members and their addresses.
    pub async fn list(&self) -> InventoryResult<Vec<InstanceRecord>> {
        let asg_name = self.terraform.raw_output(&self.asg_output).await?;
        info!("Listing instances in Auto Scaling Group {}", asg_name);

        let ids = self.asg_instance_ids(&asg_name).await?;
        if ids.is_empty() {
            warn!("Auto Scaling Group {} has no instances", asg_name);
            return Ok(Vec::new());
        }
        debug!("Group {} members: {:?}", asg_name, ids);

        let instances = self.describe_instances(&ids).await?;
        info!("Found {} instances", instances.len());
        Ok(instances)
    }
}
