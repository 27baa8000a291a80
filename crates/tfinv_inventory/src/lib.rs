//! # tfinv_inventory
//!
//! Ansible dynamic inventory generation from Terraform state and AWS
//! Auto Scaling Group membership.
//!
//! The pipeline has three stages:
//!
//! - [`TerraformReader`] runs `terraform output -json` in the state directory
//! - [`AsgInstanceLister`] resolves the group name from a Terraform output and
//!   asks the AWS CLI for its instances and their addresses
//! - [`assemble`] merges both into an [`Inventory`] without any I/O
//!
//! [`InventoryGenerator`] runs them in order and applies the configured
//! [`FailurePolicy`] to each upstream query.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tfinv_inventory::{InventoryConfig, InventoryGenerator};
//! use tfinv_runner::ProcessRunner;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InventoryConfig::default().with_state_dir("infra/terraform");
//! let generator = InventoryGenerator::new(config, Arc::new(ProcessRunner::default()));
//!
//! let inventory = generator.generate().await?;
//! println!("{}", inventory.to_json_pretty()?);
//! # Ok(())
//! # }
//! ```

pub mod assembler;
pub mod aws;
pub mod config;
pub mod error;
pub mod generator;
pub mod inventory;
pub mod terraform;

pub use assembler::{assemble, global_vars, host_name};
pub use aws::{AsgInstanceLister, InstanceRecord};
pub use config::{FailurePolicy, GlobalVarSpec, InventoryConfig, DEFAULT_STATE_DIR};
pub use error::{InventoryError, InventoryResult};
pub use generator::InventoryGenerator;
pub use inventory::{AllGroup, HostGroup, HostVars, Inventory, Meta};
pub use terraform::{TerraformOutput, TerraformOutputs, TerraformReader};
