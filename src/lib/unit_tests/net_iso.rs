// SPDX-License-Identifier: Apache-2.0

use serde_yaml::Value;

use crate::{
    compile,
    unit_tests::testlib::{bonded_bridge_topology, load_topology, mapping_keys},
    GenConfOptions, NetworkParams, Templates, Topology,
};

fn gen_templates(topology: &Topology, params: &NetworkParams) -> Templates {
    compile(topology, params, &GenConfOptions::default()).unwrap()
}

fn parse(content: &str) -> Value {
    serde_yaml::from_str(content).unwrap()
}

#[test]
fn test_network_isolation_of_used_networks() {
    let topology = bonded_bridge_topology();
    let templates = gen_templates(&topology, &NetworkParams::new());
    let doc = parse(&templates.network_isolation);
    let registry = &doc["resource_registry"];

    assert_eq!(
        mapping_keys(registry),
        vec![
            "OS::TripleO::Network::Ports::RedisVipPort",
            "OS::TripleO::Controller::Ports::RedisVipPort",
            "OS::TripleO::Network::External",
            "OS::TripleO::Network::Ports::ExternalVipPort",
            "OS::TripleO::Compute::Ports::ExternalPort",
            "OS::TripleO::Network::InternalApi",
            "OS::TripleO::Network::Ports::InternalApiVipPort",
            "OS::TripleO::Compute::Ports::InternalApiPort",
        ]
    );
    assert_eq!(
        registry["OS::TripleO::Network::Ports::RedisVipPort"].as_str(),
        Some("../network/ports/vip.yaml")
    );
    assert_eq!(
        registry["OS::TripleO::Network::InternalApi"].as_str(),
        Some("../network/internal_api.yaml")
    );
    assert_eq!(
        registry["OS::TripleO::Compute::Ports::InternalApiPort"].as_str(),
        Some("../network/ports/internal_api.yaml")
    );
    assert!(doc.get("parameter_defaults").is_none());
}

#[test]
fn test_network_isolation_absolute() {
    let topology = bonded_bridge_topology();
    let templates = gen_templates(&topology, &NetworkParams::new());
    let doc = parse(&templates.network_isolation_absolute);

    assert_eq!(
        doc["resource_registry"]["OS::TripleO::Network::External"].as_str(),
        Some(
            "/usr/share/openstack-tripleo-heat-templates/network/\
            external.yaml"
        )
    );
}

#[test]
fn test_port_only_for_roles_using_network() {
    let topology = load_topology(
        r"---
controller:
- type: interface
  name: nic1
  network: StorageMgmt
ceph-storage:
- type: interface
  name: nic1
  network: StorageMgmt
compute:
- type: interface
  name: nic1
  network: Storage
",
    );
    let templates = gen_templates(&topology, &NetworkParams::new());
    let doc = parse(&templates.network_isolation);

    assert_eq!(
        mapping_keys(&doc["resource_registry"]),
        vec![
            "OS::TripleO::Network::Storage",
            "OS::TripleO::Network::Ports::StorageVipPort",
            "OS::TripleO::Compute::Ports::StoragePort",
            "OS::TripleO::Network::StorageMgmt",
            "OS::TripleO::Network::Ports::StorageMgmtVipPort",
            "OS::TripleO::Controller::Ports::StorageMgmtPort",
            "OS::TripleO::CephStorage::Ports::StorageMgmtPort",
        ]
    );
}

#[test]
fn test_network_isolation_ipv6() {
    let topology = load_topology(
        r"---
controller:
- type: interface
  name: nic1
  network: InternalApi
- type: interface
  name: nic2
  network: Tenant
",
    );
    let mut params = NetworkParams::new();
    params.ipv6 = true;
    let templates = gen_templates(&topology, &params);
    let doc = parse(&templates.network_isolation);
    let registry = &doc["resource_registry"];

    assert_eq!(
        registry["OS::TripleO::Controller::Ports::RedisVipPort"].as_str(),
        Some("../network/ports/vip_v6.yaml")
    );
    assert_eq!(
        registry["OS::TripleO::Network::InternalApi"].as_str(),
        Some("../network/internal_api_v6.yaml")
    );
    assert_eq!(
        registry["OS::TripleO::Network::Tenant"].as_str(),
        Some("../network/tenant.yaml")
    );
    assert_eq!(
        mapping_keys(&doc["parameter_defaults"]),
        vec![
            "CephIPv6",
            "CorosyncIPv6",
            "MongoDbIPv6",
            "NovaIPv6",
            "RabbitIPv6",
            "MemcachedIPv6",
        ]
    );
    assert_eq!(doc["parameter_defaults"]["NovaIPv6"].as_bool(), Some(true));
}

#[test]
fn test_nothing_isolated() {
    let templates = gen_templates(&Topology::new(), &NetworkParams::new());
    let doc = parse(&templates.network_isolation);
    assert_eq!(
        doc["resource_registry"].as_mapping().map(|m| m.len()),
        Some(0)
    );
}
