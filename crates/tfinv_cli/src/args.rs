//! Command-line arguments.
//!
//! Ansible invokes inventory scripts with either `--list` or
//! `--host <name>`; running without either behaves like `--list`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use tfinv_inventory::{FailurePolicy, InventoryConfig};

/// tfinv - Ansible dynamic inventory from Terraform outputs and AWS Auto Scaling Groups
#[derive(Parser, Debug)]
#[command(name = "tfinv")]
#[command(version, about = "Ansible dynamic inventory from Terraform outputs and AWS Auto Scaling Groups")]
#[command(long_about = r#"
tfinv reads `terraform output -json` from a state directory, looks up the
instances of the Auto Scaling Group named by a Terraform output, and prints
an Ansible dynamic inventory document on stdout.

EXIT CODES:
  0 - Success (also when the instance lookup failed and no hosts are listed)
  1 - Terraform outputs could not be read
  2 - Invalid arguments or configuration
"#)]
pub struct Cli {
    /// Print the whole inventory (default)
    #[arg(long, conflicts_with = "host")]
    pub list: bool,

    /// Print the variables of a single host
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// YAML file overriding the built-in settings
    #[arg(short, long, env = "TFINV_CONFIG")]
    pub config: Option<PathBuf>,

    /// Terraform state directory
    #[arg(long, env = "TFINV_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Terraform executable
    #[arg(long, env = "TFINV_TERRAFORM_BIN")]
    pub terraform_bin: Option<String>,

    /// AWS CLI executable
    #[arg(long, env = "TFINV_AWS_BIN")]
    pub aws_bin: Option<String>,

    /// AWS CLI profile
    #[arg(long, env = "TFINV_AWS_PROFILE")]
    pub aws_profile: Option<String>,

    /// AWS region
    #[arg(long, env = "TFINV_AWS_REGION")]
    pub aws_region: Option<String>,

    /// Fail instead of emitting a host-less inventory when the AWS lookup fails
    #[arg(long)]
    pub strict: bool,

    /// Kill external commands that run longer than this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Enable debug logging (on stderr)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Build the run configuration: config file first, then flags.
    pub fn inventory_config(&self) -> Result<InventoryConfig> {
        let mut config = match &self.config {
            Some(path) => InventoryConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => InventoryConfig::default(),
        };

        if let Some(dir) = &self.state_dir {
            config = config.with_state_dir(dir);
        }
        if let Some(bin) = &self.terraform_bin {
            config = config.with_terraform_bin(bin);
        }
        if let Some(bin) = &self.aws_bin {
            config = config.with_aws_bin(bin);
        }
        if let Some(profile) = &self.aws_profile {
            config = config.with_aws_profile(profile);
        }
        if let Some(region) = &self.aws_region {
            config = config.with_aws_region(region);
        }
        if self.strict {
            config = config.with_instance_query_policy(FailurePolicy::Abort);
        }
        if let Some(seconds) = self.timeout {
            config = config.with_command_timeout(seconds);
        }

        Ok(config)
    }
}
