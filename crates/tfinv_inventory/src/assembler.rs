//! Builds the inventory document from Terraform outputs and instances.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::aws::InstanceRecord;
use crate::config::InventoryConfig;
use crate::inventory::{AllGroup, HostGroup, HostVars, Inventory, Meta};
use crate::terraform::{self, TerraformOutputs};

/// Host name for the instance at zero-based `index`.
///
/// Names follow the provider's response order, so the same instance can
/// get a different name on the next run if that order changes.
pub fn host_name(prefix: &str, index: usize) -> String {
    format!("{}{}", prefix, index + 1)
}

/// `all.vars`: static connection settings plus the Terraform-derived table.
pub fn global_vars(config: &InventoryConfig, outputs: &TerraformOutputs) -> BTreeMap<String, Value> {
    let mut vars = BTreeMap::from([
        ("ansible_user".to_string(), Value::from(config.ansible_user.as_str())),
        (
            "ansible_python_interpreter".to_string(),
            Value::from(config.python_interpreter.as_str()),
        ),
        (
            "environment_name".to_string(),
            Value::from(config.environment_name.as_str()),
        ),
    ]);

    for spec in &config.global_vars {
        vars.insert(
            spec.name.clone(),
            terraform::get(outputs, &spec.terraform_key, &spec.default),
        );
    }

    vars
}

/// Assemble the full document. Pure: performs no I/O and cannot fail.
pub fn assemble(
    config: &InventoryConfig,
    outputs: &TerraformOutputs,
    instances: &[InstanceRecord],
) -> Inventory {
    let mut hostvars = BTreeMap::new();
    let mut hosts = Vec::with_capacity(instances.len());

    // Group membership and hostvars are filled together so they always agree.
    for (index, instance) in instances.iter().enumerate() {
        let name = host_name(&config.host_prefix, index);

        hostvars.insert(
            name.clone(),
            HostVars {
                ansible_host: instance.reachable_address().map(str::to_string),
                instance_id: instance.instance_id.clone(),
                private_ip: instance.private_ip.clone(),
                public_ip: instance.public_ip.clone(),
            },
        );
        hosts.push(name);
    }

    let group = HostGroup {
        hosts,
        vars: BTreeMap::from([(
            "ansible_connection".to_string(),
            Value::from(config.ansible_connection.as_str()),
        )]),
    };

    Inventory {
        meta: Meta { hostvars },
        all: AllGroup {
            vars: global_vars(config, outputs),
        },
        groups: BTreeMap::from([(config.group_name.clone(), group)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalVarSpec;
    use crate::terraform::{parse_outputs, TerraformOutput};
    use serde_json::json;

    fn instances(n: usize) -> Vec<InstanceRecord> {
        (0..n)
            .map(|i| InstanceRecord {
                instance_id: format!("i-{:04}", i),
                public_ip: None,
                private_ip: Some(format!("10.0.{}.{}", i / 256, i % 256)),
            })
            .collect()
    }

    #[test]
    fn test_reference_scenario() {
        let outputs = parse_outputs(
            r#"{"rds_endpoint": {"value": "db.example.com"}, "rds_port": {"value": 3306}}"#,
        )
        .unwrap();
        let instances = vec![
            InstanceRecord::new("i-1", Some("1.2.3.4"), Some("10.0.0.1")),
            InstanceRecord::new("i-2", Some(""), Some("10.0.0.2")),
        ];

        let inventory = assemble(&InventoryConfig::default(), &outputs, &instances);

        assert_eq!(inventory.all.vars["mysql_endpoint"], json!("db.example.com"));
        assert_eq!(inventory.all.vars["mysql_port"], json!(3306));
        assert_eq!(inventory.all.vars["docdb_endpoint"], json!(""));
        assert_eq!(
            inventory.group("app_servers").unwrap().hosts,
            vec!["app-server-1", "app-server-2"]
        );
        assert_eq!(
            inventory.host_vars("app-server-1").unwrap().ansible_host.as_deref(),
            Some("1.2.3.4")
        );
        let second = inventory.host_vars("app-server-2").unwrap();
        assert_eq!(second.ansible_host.as_deref(), Some("10.0.0.2"));
        assert_eq!(second.public_ip.as_deref(), Some(""));
        assert_eq!(second.instance_id, "i-2");
    }

    #[test]
    fn test_every_global_var_is_value_or_default() {
        let config = InventoryConfig::default();
        let mut outputs = TerraformOutputs::new();
        outputs.insert("redis_port".into(), TerraformOutput::new(6380));
        outputs.insert("alb_dns_name".into(), TerraformOutput::new("lb.example.com"));
        outputs.insert("msk_bootstrap_brokers_tls".into(), TerraformOutput::new("b-1:9094,b-2:9094"));
        outputs.insert("unrelated".into(), TerraformOutput::new(true));

        let vars = global_vars(&config, &outputs);

        for spec in &config.global_vars {
            let expected = outputs
                .get(&spec.terraform_key)
                .and_then(|o| o.value.clone())
                .unwrap_or_else(|| spec.default.clone());
            assert_eq!(vars[&spec.name], expected, "{}", spec.name);
        }
        assert!(!vars.contains_key("unrelated"));
        assert_eq!(vars["redis_port"], json!(6380));
        assert_eq!(vars["docdb_port"], json!(27017));
    }

    #[test]
    fn test_static_vars() {
        let vars = global_vars(&InventoryConfig::default(), &TerraformOutputs::new());

        assert_eq!(vars["ansible_user"], json!("ubuntu"));
        assert_eq!(vars["ansible_python_interpreter"], json!("/usr/bin/python3"));
        assert_eq!(vars["environment_name"], json!("production"));
        assert_eq!(vars.len(), 3 + GlobalVarSpec::standard().len());
    }

    #[test]
    fn test_hosts_and_hostvars_match() {
        for n in [0, 1, 2, 11, 300] {
            let inventory = assemble(&InventoryConfig::default(), &TerraformOutputs::new(), &instances(n));
            let group = inventory.group("app_servers").unwrap();

            let expected: Vec<String> = (1..=n).map(|i| format!("app-server-{}", i)).collect();
            assert_eq!(group.hosts, expected);
            assert_eq!(inventory.host_count(), n);
            for (index, name) in group.hosts.iter().enumerate() {
                let vars = inventory.host_vars(name).unwrap();
                assert_eq!(vars.instance_id, format!("i-{:04}", index));
            }
        }
    }

    #[test]
    fn test_host_without_addresses() {
        let instances = vec![InstanceRecord::new("i-dark", None, None)];
        let inventory = assemble(&InventoryConfig::default(), &TerraformOutputs::new(), &instances);

        let vars = inventory.host_vars("app-server-1").unwrap();
        assert!(vars.ansible_host.is_none());
        assert!(vars.private_ip.is_none());
    }

    #[test]
    fn test_group_vars_and_custom_naming() {
        let mut config = InventoryConfig::default();
        config.host_prefix = "web-".into();
        config.group_name = "web".into();
        config.ansible_connection = "aws_ssm".into();

        let inventory = assemble(&config, &TerraformOutputs::new(), &instances(2));

        assert!(inventory.group("app_servers").is_none());
        let group = inventory.group("web").unwrap();
        assert_eq!(group.hosts, vec!["web-1", "web-2"]);
        assert_eq!(group.vars["ansible_connection"], json!("aws_ssm"));
    }

    #[test]
    fn test_empty_inputs_still_produce_document() {
        let inventory = assemble(&InventoryConfig::default(), &TerraformOutputs::new(), &[]);
        let value = serde_json::to_value(&inventory).unwrap();

        assert_eq!(value["_meta"]["hostvars"], json!({}));
        assert_eq!(value["app_servers"]["hosts"], json!([]));
        assert_eq!(value["app_servers"]["vars"]["ansible_connection"], json!("ssh"));
        assert_eq!(value["all"]["vars"]["mysql_port"], json!(3306));
    }
}
