//! Inventory generation settings.
//!
//! Everything the pipeline would otherwise hard-code lives here: where the
//! Terraform state is, which tools to call, how hosts are named, the static
//! connection variables and the table mapping inventory variables to
//! Terraform outputs.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{InventoryError, InventoryResult};

/// Default Terraform state directory, relative to the working directory.
pub const DEFAULT_STATE_DIR: &str = "../../terraform";

const RESERVED_GROUP_NAMES: [&str; 2] = ["all", "_meta"];

/// What to do when an upstream query fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop the run and report the error.
    Abort,
    /// Log the error and continue with an empty result.
    Degrade,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::Abort => "abort",
            FailurePolicy::Degrade => "degrade",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One `all.vars` entry sourced from a Terraform output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalVarSpec {
    /// Variable name in the inventory.
    pub name: String,
    /// Terraform output to read the value from.
    pub terraform_key: String,
    /// Value used when the output is absent.
    #[serde(default = "empty_string")]
    pub default: Value,
}

fn empty_string() -> Value {
    Value::String(String::new())
}

impl GlobalVarSpec {
    pub fn new(
        name: impl Into<String>,
        terraform_key: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            terraform_key: terraform_key.into(),
            default: default.into(),
        }
    }

    /// Table of data-store endpoints, ports and secret references.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new("mysql_endpoint", "rds_endpoint", ""),
            Self::new("mysql_port", "rds_port", 3306),
            Self::new("docdb_endpoint", "docdb_endpoint", ""),
            Self::new("docdb_port", "docdb_port", 27017),
            Self::new("redis_endpoint", "redis_configuration_endpoint", ""),
            Self::new("redis_port", "redis_port", 6379),
            Self::new("kafka_brokers", "msk_bootstrap_brokers_tls", ""),
            Self::new("opensearch_endpoint", "opensearch_endpoint", ""),
            Self::new("s3_bucket", "uploads_bucket_name", ""),
            Self::new("alb_dns", "alb_dns_name", ""),
            Self::new("mysql_secret_arn", "rds_secret_arn", ""),
            Self::new("docdb_secret_arn", "docdb_secret_arn", ""),
            Self::new("opensearch_secret_arn", "opensearch_secret_arn", ""),
        ]
    }
}

/// Configuration for a single inventory run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Directory `terraform output` runs in.
    pub state_dir: PathBuf,
    pub terraform_bin: String,
    pub aws_bin: String,
    /// Terraform output holding the Auto Scaling Group name.
    pub asg_output: String,
    pub aws_profile: Option<String>,
    pub aws_region: Option<String>,
    /// Host names are `<host_prefix><n>`, counting from 1.
    pub host_prefix: String,
    pub group_name: String,
    pub ansible_user: String,
    pub python_interpreter: String,
    pub environment_name: String,
    pub ansible_connection: String,
    pub global_vars: Vec<GlobalVarSpec>,
    pub state_read_policy: FailurePolicy,
    pub instance_query_policy: FailurePolicy,
    /// Per-command timeout; unset means wait indefinitely.
    pub command_timeout_secs: Option<u64>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            terraform_bin: "terraform".to_string(),
            aws_bin: "aws".to_string(),
            asg_output: "asg_name".to_string(),
            aws_profile: None,
            aws_region: None,
            host_prefix: "app-server-".to_string(),
            group_name: "app_servers".to_string(),
            ansible_user: "ubuntu".to_string(),
            python_interpreter: "/usr/bin/python3".to_string(),
            environment_name: "production".to_string(),
            ansible_connection: "ssh".to_string(),
            global_vars: GlobalVarSpec::standard(),
            state_read_policy: FailurePolicy::Abort,
            instance_query_policy: FailurePolicy::Degrade,
            command_timeout_secs: None,
        }
    }
}

impl InventoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a YAML config file; fields it omits keep their defaults.
    ///
    /// `group_name` may not be `all` or `_meta`, which are already top-level
    /// keys of the inventory document.
    pub fn from_file(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref();
        debug!("Reading inventory config from {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| InventoryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content).map_err(|e| InventoryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        if RESERVED_GROUP_NAMES.contains(&config.group_name.as_str()) {
            return Err(InventoryError::Config {
                path: path.to_path_buf(),
                message: format!("group_name '{}' is reserved", config.group_name),
            });
        }

        Ok(config)
    }

    pub fn with_state_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    pub fn with_terraform_bin(mut self, bin: impl Into<String>) -> Self {
        self.terraform_bin = bin.into();
        self
    }

    pub fn with_aws_bin(mut self, bin: impl Into<String>) -> Self {
        self.aws_bin = bin.into();
        self
    }

    pub fn with_aws_profile(mut self, profile: impl Into<String>) -> Self {
        self.aws_profile = Some(profile.into());
        self
    }

    pub fn with_aws_region(mut self, region: impl Into<String>) -> Self {
        self.aws_region = Some(region.into());
        self
    }

    pub fn with_state_read_policy(mut self, policy: FailurePolicy) -> Self {
        self.state_read_policy = policy;
        self
    }

    pub fn with_instance_query_policy(mut self, policy: FailurePolicy) -> Self {
        self.instance_query_policy = policy;
        self
    }

    pub fn with_command_timeout(mut self, seconds: u64) -> Self {
        self.command_timeout_secs = Some(seconds);
        self
    }
}
