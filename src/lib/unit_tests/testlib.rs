// SPDX-License-Identifier: Apache-2.0

use crate::{compile, GenConfOptions, NetworkParams, Role, Topology};

pub(crate) fn load_topology(yaml: &str) -> Topology {
    serde_yaml::from_str(yaml).unwrap()
}

/// Compile with default options and parse the nic-config of specified role
/// back.
pub(crate) fn gen_nic_config(
    topology: &Topology,
    params: &NetworkParams,
    role: Role,
) -> serde_yaml::Value {
    let templates =
        compile(topology, params, &GenConfOptions::default()).unwrap();
    serde_yaml::from_str(&templates.nic_configs[&role]).unwrap()
}

/// The `network_config` list of a parsed nic-config document.
pub(crate) fn network_config(doc: &serde_yaml::Value) -> &serde_yaml::Value {
    &doc["resources"]["OsNetConfigImpl"]["properties"]["config"]
        ["os_net_config"]["network_config"]
}

pub(crate) fn gen_network_environment(
    topology: &Topology,
    params: &NetworkParams,
) -> serde_yaml::Value {
    let templates =
        compile(topology, params, &GenConfOptions::default()).unwrap();
    serde_yaml::from_str(&templates.network_environment).unwrap()
}

pub(crate) fn mapping_keys(value: &serde_yaml::Value) -> Vec<String> {
    value
        .as_mapping()
        .unwrap()
        .keys()
        .map(|k| k.as_str().unwrap().to_string())
        .collect()
}

/// Compute role with one bridge on External, carried by an OVS bond of
/// nic2 and nic3 and with an InternalApi VLAN.
pub(crate) fn bonded_bridge_topology() -> Topology {
    load_topology(
        r"---
compute:
- type: interface
  name: nic1
  network: ControlPlane
- type: bridge
  name: br-ex
  network: External
  members:
  - type: bond
    name: bond1
    members:
    - type: interface
      name: nic2
      primary: true
    - type: interface
      name: nic3
  - type: vlan
    network: InternalApi
",
    )
}
