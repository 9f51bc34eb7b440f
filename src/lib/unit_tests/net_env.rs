// SPDX-License-Identifier: Apache-2.0

use crate::{
    unit_tests::testlib::{
        bonded_bridge_topology, gen_network_environment, load_topology,
        mapping_keys,
    },
    NetworkParams, Topology,
};

#[test]
fn test_resource_registry_map_every_role() {
    let doc = gen_network_environment(&Topology::new(), &NetworkParams::new());
    let registry = &doc["resource_registry"];

    assert_eq!(
        mapping_keys(registry),
        vec![
            "OS::TripleO::Controller::Net::SoftwareConfig",
            "OS::TripleO::Compute::Net::SoftwareConfig",
            "OS::TripleO::CephStorage::Net::SoftwareConfig",
            "OS::TripleO::BlockStorage::Net::SoftwareConfig",
            "OS::TripleO::SwiftStorage::Net::SoftwareConfig",
        ]
    );
    assert_eq!(
        registry["OS::TripleO::BlockStorage::Net::SoftwareConfig"].as_str(),
        Some("nic-configs/cinder-storage.yaml")
    );
}

#[test]
fn test_parameter_defaults_of_used_networks() {
    let topology = bonded_bridge_topology();
    let mut params = NetworkParams::new();
    params.external.bridge_name = "br-ex".to_string();
    let doc = gen_network_environment(&topology, &params);
    let defaults = &doc["parameter_defaults"];

    assert_eq!(
        mapping_keys(defaults),
        vec![
            "ControlPlaneSubnetCidr",
            "ControlPlaneDefaultRoute",
            "EC2MetadataIp",
            "ExternalNetCidr",
            "ExternalAllocationPools",
            "ExternalInterfaceDefaultRoute",
            "NeutronExternalNetworkBridge",
            "InternalApiNetCidr",
            "InternalApiAllocationPools",
            "InternalApiNetworkVlanID",
            "DnsServers",
        ]
    );
    assert_eq!(defaults["ControlPlaneSubnetCidr"].as_str(), Some("24"));
    assert_eq!(defaults["ExternalNetCidr"].as_str(), Some("10.0.0.0/24"));
    assert_eq!(
        defaults["ExternalAllocationPools"][0]["start"].as_str(),
        Some("10.0.0.10")
    );
    assert_eq!(
        defaults["ExternalAllocationPools"][0]["end"].as_str(),
        Some("10.0.0.50")
    );
    assert_eq!(
        defaults["ExternalInterfaceDefaultRoute"].as_str(),
        Some("10.0.0.1")
    );
    assert_eq!(
        defaults["NeutronExternalNetworkBridge"].as_str(),
        Some("br-ex")
    );
    assert_eq!(defaults["InternalApiNetworkVlanID"].as_u64(), Some(2));
    assert_eq!(defaults["DnsServers"][0].as_str(), Some("8.8.8.8"));
    assert_eq!(defaults["DnsServers"][1].as_str(), Some("8.8.4.4"));
}

#[test]
fn test_vlan_id_only_for_vlan_networks() {
    let topology = load_topology(
        r"---
compute:
- type: interface
  name: nic1
  network: Storage
- type: bridge
  name: br-ex
  members:
  - type: interface
    name: nic2
    primary: true
  - type: vlan
    network: External
",
    );
    let doc = gen_network_environment(&topology, &NetworkParams::new());
    let defaults = &doc["parameter_defaults"];

    assert_eq!(defaults["StorageNetCidr"].as_str(), Some("172.18.0.0/24"));
    assert!(defaults.get("StorageNetworkVlanID").is_none());
    assert_eq!(defaults["ExternalNetworkVlanID"].as_u64(), Some(1));
    assert!(defaults.get("ControlPlaneSubnetCidr").is_none());
    assert!(defaults.get("TenantNetCidr").is_none());
}

#[test]
fn test_bond_options_only_when_set() {
    let topology = bonded_bridge_topology();
    let mut params = NetworkParams::new();
    let doc = gen_network_environment(&topology, &params);
    assert!(doc["parameter_defaults"]
        .get("BondInterfaceOvsOptions")
        .is_none());

    params.bond_options = "bond_mode=balance-slb".to_string();
    let doc = gen_network_environment(&topology, &params);
    assert_eq!(
        doc["parameter_defaults"]["BondInterfaceOvsOptions"].as_str(),
        Some("bond_mode=balance-slb")
    );
}
