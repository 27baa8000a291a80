//! Ansible dynamic inventory document.
//!
//! Serializes to the JSON shape `ansible-inventory` expects from a script:
//!
//! ```json
//! {
//!   "_meta": { "hostvars": { "app-server-1": { "ansible_host": "..." } } },
//!   "all": { "vars": { "ansible_user": "ubuntu" } },
//!   "app_servers": { "hosts": ["app-server-1"], "vars": { "ansible_connection": "ssh" } }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::InventoryResult;

/// Variables attached to a single host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostVars {
    pub ansible_host: Option<String>,
    pub instance_id: String,
    pub private_ip: Option<String>,
    pub public_ip: Option<String>,
}

/// The `_meta` section carrying every host's variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    pub hostvars: BTreeMap<String, HostVars>,
}

/// The `all` group; only its variables are emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllGroup {
    pub vars: BTreeMap<String, Value>,
}

/// A named group of hosts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostGroup {
    pub hosts: Vec<String>,
    pub vars: BTreeMap<String, Value>,
}

/// Complete inventory document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    pub all: AllGroup,
    #[serde(flatten)]
    pub groups: BTreeMap<String, HostGroup>,
}

impl Inventory {
    /// Variables for one host, as answered by `--host <name>`.
    pub fn host_vars(&self, host: &str) -> Option<&HostVars> {
        self.meta.hostvars.get(host)
    }

    pub fn group(&self, name: &str) -> Option<&HostGroup> {
        self.groups.get(name)
    }

    pub fn host_count(&self) -> usize {
        self.meta.hostvars.len()
    }

    /// Render with two-space indentation.
    pub fn to_json_pretty(&self) -> InventoryResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Inventory {
        let mut inventory = Inventory::default();
        inventory.all.vars.insert("ansible_user".into(), json!("ubuntu"));
        inventory.meta.hostvars.insert(
            "app-server-1".into(),
            HostVars {
                ansible_host: Some("10.0.0.2".into()),
                instance_id: "i-2".into(),
                private_ip: Some("10.0.0.2".into()),
                public_ip: None,
            },
        );
        inventory.groups.insert(
            "app_servers".into(),
            HostGroup {
                hosts: vec!["app-server-1".into()],
                vars: BTreeMap::from([("ansible_connection".to_string(), json!("ssh"))]),
            },
        );
        inventory
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(sample()).unwrap();

        assert_eq!(
            value,
            json!({
                "_meta": {
                    "hostvars": {
                        "app-server-1": {
                            "ansible_host": "10.0.0.2",
                            "instance_id": "i-2",
                            "private_ip": "10.0.0.2",
                            "public_ip": null
                        }
                    }
                },
                "all": { "vars": { "ansible_user": "ubuntu" } },
                "app_servers": {
                    "hosts": ["app-server-1"],
                    "vars": { "ansible_connection": "ssh" }
                }
            })
        );
    }

    #[test]
    fn test_pretty_uses_two_space_indent() {
        let rendered = sample().to_json_pretty().unwrap();
        assert!(rendered.starts_with("{\n  \"_meta\": {\n    \"hostvars\""));
    }

    #[test]
    fn test_deserialize_collects_groups() {
        let rendered = sample().to_json_pretty().unwrap();
        let parsed: Inventory = serde_json::from_str(&rendered).unwrap();

        assert_eq!(parsed.groups.len(), 1);
        assert_eq!(parsed.group("app_servers").unwrap().hosts, vec!["app-server-1"]);
    }

    #[test]
    fn test_host_vars_lookup() {
        let inventory = sample();

        assert_eq!(inventory.host_vars("app-server-1").unwrap().instance_id, "i-2");
        assert!(inventory.host_vars("app-server-9").is_none());
        assert_eq!(inventory.host_count(), 1);
    }
}
