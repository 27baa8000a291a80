//! End-to-end inventory generation.

use std::sync::Arc;

use tracing::{info, warn};

use tfinv_runner::CommandRunner;

use crate::assembler;
use crate::aws::{AsgInstanceLister, InstanceRecord};
use crate::config::{FailurePolicy, InventoryConfig};
use crate::error::InventoryResult;
use crate::inventory::Inventory;
use crate::terraform::{TerraformOutputs, TerraformReader};

/// Runs the Terraform read, the instance lookup and the assembly in order.
///
/// Terraform read failures abort by default; instance lookup failures
/// degrade to an empty host list. Both are governed by the config's
/// failure policies. Aborting errors are returned unlogged; the caller
/// reports them.
pub struct InventoryGenerator {
    config: InventoryConfig,
    runner: Arc<dyn CommandRunner>,
}

impl InventoryGenerator {
    pub fn new(config: InventoryConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Read all Terraform outputs, honoring the state read policy.
    pub async fn read_outputs(&self) -> InventoryResult<TerraformOutputs> {
        let reader = TerraformReader::new(self.runner.clone(), &self.config.state_dir)
            .with_binary(&self.config.terraform_bin);

        match reader.outputs().await {
            Ok(outputs) => Ok(outputs),
            Err(e) => match self.config.state_read_policy {
                FailurePolicy::Abort => Err(e),
                FailurePolicy::Degrade => {
                    warn!("Error getting Terraform outputs, using defaults: {}", e);
                    Ok(TerraformOutputs::new())
                }
            },
        }
    }

    /// List the Auto Scaling Group's instances, honoring the instance query policy.
    pub async fn list_instances(&self) -> InventoryResult<Vec<InstanceRecord>> {
        let lister = AsgInstanceLister::new(self.runner.clone(), &self.config);

        match lister.list().await {
            Ok(instances) => Ok(instances),
            Err(e) => match self.config.instance_query_policy {
                FailurePolicy::Abort => Err(e),
                FailurePolicy::Degrade => {
                    warn!("Error getting EC2 instances, continuing without hosts: {}", e);
                    Ok(Vec::new())
                }
            },
        }
    }

    /// Produce the inventory document.
    pub async fn generate(&self) -> InventoryResult<Inventory> {
        let outputs = self.read_outputs().await?;
        let instances = self.list_instances().await?;

        let inventory = assembler::assemble(&self.config, &outputs, &instances);
        info!(
            "Generated inventory with {} hosts and {} global vars",
            inventory.host_count(),
            inventory.all.vars.len()
        );

        Ok(inventory)
    }
}
