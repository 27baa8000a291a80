//! Terraform output reader.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use tfinv_runner::{CommandRunner, CommandSpec};

use crate::error::{InventoryError, InventoryResult};

/// One entry of `terraform output -json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerraformOutput {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub sensitive: bool,
    #[serde(default, rename = "type")]
    pub output_type: Value,
}

impl TerraformOutput {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            sensitive: false,
            output_type: Value::Null,
        }
    }
}

/// All outputs of a Terraform state, keyed by output name.
pub type TerraformOutputs = BTreeMap<String, TerraformOutput>;

/// Parse the stdout of `terraform output -json`.
pub fn parse_outputs(json: &str) -> InventoryResult<TerraformOutputs> {
    Ok(serde_json::from_str(json)?)
}

/// Look up an output's value, falling back to `default` when either the
/// output or its `value` field is absent.
pub fn get(outputs: &TerraformOutputs, key: &str, default: &Value) -> Value {
    outputs
        .get(key)
        .and_then(|output| output.value.clone())
        .unwrap_or_else(|| default.clone())
}

/// Reads outputs from an initialized Terraform state directory.
pub struct TerraformReader {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    state_dir: PathBuf,
}

impl TerraformReader {
    pub fn new(runner: Arc<dyn CommandRunner>, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            binary: "terraform".to_string(),
            state_dir: state_dir.into(),
        }
    }

    /// Use a different terraform executable.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn command(&self, args: &[&str]) -> CommandSpec {
        CommandSpec::new(&self.binary)
            .args(args.iter().copied())
            .current_dir(&self.state_dir)
    }

    /// Run `terraform output -json` and parse every output.
    pub async fn outputs(&self) -> InventoryResult<TerraformOutputs> {
        info!("Reading terraform outputs from {:?}", self.state_dir);

        let output = self
            .runner
            .run_checked(&self.command(&["output", "-json"]))
            .await
            .map_err(|e| InventoryError::StateRead(e.to_string()))?;

        let outputs = parse_outputs(&output.stdout).map_err(|e| {
            InventoryError::StateRead(format!("invalid JSON from terraform output: {}", e))
        })?;

        debug!("Read {} terraform outputs", outputs.len());
        Ok(outputs)
    }

    /// Run `terraform output -raw <name>` and return the trimmed value.
    pub async fn raw_output(&self, name: &str) -> InventoryResult<String> {
        debug!("Reading terraform output {}", name);

        let output = self
            .runner
            .run_checked(&self.command(&["output", "-raw", name]))
            .await
            .map_err(|e| InventoryError::TerraformOutput {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        let value = output.stdout.trim();
        if value.is_empty() {
            return Err(InventoryError::TerraformOutput {
                name: name.to_string(),
                message: "output is empty".to_string(),
            });
        }

        Ok(value.to_string())
    }
}
