// SPDX-License-Identifier: Apache-2.0

use crate::{
    check_bond_primaries, check_bridge_carriers, check_duplicate_bonds,
    check_duplicate_networks, check_duplicate_nics, check_duplicate_vlans,
    check_ips_in_cidr, check_overlapping_cidrs,
    unit_tests::testlib::{bonded_bridge_topology, load_topology},
    validate, ErrorKind, NetIsoError, NetworkName, NetworkParams, Role,
    ValidationError,
};

#[test]
fn test_valid_topology() {
    let topology = bonded_bridge_topology();
    assert_eq!(validate(&topology, &NetworkParams::new()), Ok(()));
}

#[test]
fn test_duplicate_vlan_of_used_networks() {
    let topology = bonded_bridge_topology();
    let mut params = NetworkParams::new();
    params.internal_api.vlan_id = 1;

    assert_eq!(
        check_duplicate_vlans(&topology, &params),
        vec![ValidationError::DuplicateVlanId {
            vlan_id: 1,
            networks: vec![NetworkName::External, NetworkName::InternalApi],
        }]
    );
}

#[test]
fn test_duplicate_vlan_of_unused_network_ignored() {
    let topology = bonded_bridge_topology();
    let mut params = NetworkParams::new();
    params.storage.vlan_id = 1;
    params.tenant.vlan_id = 1;
    assert!(check_duplicate_vlans(&topology, &params).is_empty());
}

#[test]
fn test_duplicate_network_in_role() {
    let topology = load_topology(
        r"---
controller:
- type: interface
  name: nic1
  network: Storage
- type: bridge
  name: br-ex
  network: Storage
  members:
  - type: interface
    name: nic2
    primary: true
compute:
- type: interface
  name: nic1
  network: Storage
",
    );
    assert_eq!(
        check_duplicate_networks(&topology),
        vec![ValidationError::DuplicateNetwork {
            role: Role::Controller,
            network: NetworkName::Storage,
        }]
    );
}

#[test]
fn test_duplicate_nic_name_nested() {
    let topology = load_topology(
        r"---
compute:
- type: interface
  name: nic2
- type: bridge
  name: br-ex
  members:
  - type: interface
    name: nic2
    primary: true
",
    );
    assert_eq!(
        check_duplicate_nics(&topology),
        vec![ValidationError::DuplicateInterfaceName {
            role: Role::Compute,
            name: "nic2".to_string(),
        }]
    );
}

#[test]
fn test_overlapping_cidrs() {
    let topology = load_topology(
        r"---
controller:
- type: interface
  name: nic1
  network: Storage
- type: interface
  name: nic2
  network: Tenant
",
    );
    let mut params = NetworkParams::new();
    params.tenant.cidr = "172.18.0.128/25".to_string();
    params.tenant.range_start = "172.18.0.130".to_string();
    params.tenant.range_end = "172.18.0.140".to_string();

    assert_eq!(
        check_overlapping_cidrs(&topology, &params),
        vec![ValidationError::OverlappingCidrs {
            network: NetworkName::Storage,
            cidr: "172.18.0.0/24".to_string(),
            other_network: NetworkName::Tenant,
            other_cidr: "172.18.0.128/25".to_string(),
        }]
    );
}

#[test]
fn test_distinct_cidrs_do_not_overlap() {
    let topology = load_topology(
        r"---
controller:
- type: interface
  name: nic1
  network: External
- type: interface
  name: nic2
  network: Storage
",
    );
    let mut params = NetworkParams::new();
    params.storage.cidr = "10.1.0.0/24".to_string();
    params.storage.range_start = "10.1.0.10".to_string();
    params.storage.range_end = "10.1.0.250".to_string();
    assert!(check_overlapping_cidrs(&topology, &params).is_empty());

    params.storage.cidr = "10.0.0.0/24".to_string();
    assert_eq!(
        check_overlapping_cidrs(&topology, &params),
        vec![ValidationError::OverlappingCidrs {
            network: NetworkName::External,
            cidr: "10.0.0.0/24".to_string(),
            other_network: NetworkName::Storage,
            other_cidr: "10.0.0.0/24".to_string(),
        }]
    );
}

#[test]
fn test_range_and_gateway_outside_cidr() {
    let topology = bonded_bridge_topology();
    let mut params = NetworkParams::new();
    params.internal_api.range_end = "172.17.1.250".to_string();
    params.external.gateway = "10.0.1.1".to_string();

    assert_eq!(
        check_ips_in_cidr(&topology, &params),
        vec![
            ValidationError::AddressNotInCidr {
                network: NetworkName::External,
                field: "gateway",
                address: "10.0.1.1".to_string(),
                cidr: "10.0.0.0/24".to_string(),
            },
            ValidationError::AddressNotInCidr {
                network: NetworkName::InternalApi,
                field: "range end",
                address: "172.17.1.250".to_string(),
                cidr: "172.17.0.0/24".to_string(),
            },
        ]
    );
}

#[test]
fn test_invalid_address() {
    let topology = bonded_bridge_topology();
    let mut params = NetworkParams::new();
    params.internal_api.range_start = "172.17.0.300".to_string();

    assert_eq!(
        check_ips_in_cidr(&topology, &params),
        vec![ValidationError::InvalidAddress {
            network: NetworkName::InternalApi,
            field: "range start",
            value: "172.17.0.300".to_string(),
        }]
    );
}

#[test]
fn test_bond_without_primary() {
    let topology = load_topology(
        r"---
compute:
- type: bridge
  name: br-ex
  members:
  - type: bond
    name: bond1
    members:
    - type: interface
      name: nic2
    - type: interface
      name: nic3
",
    );
    assert_eq!(
        check_bond_primaries(&topology),
        vec![ValidationError::BondPrimaryCount {
            role: Role::Compute,
            bond: "bond1".to_string(),
            count: 0,
        }]
    );
}

#[test]
fn test_bond_with_two_primaries() {
    let topology = load_topology(
        r"---
compute:
- type: bridge
  name: br-ex
  members:
  - type: bond
    name: bond1
    members:
    - type: interface
      name: nic2
      primary: true
    - type: interface
      name: nic3
      primary: true
",
    );
    assert_eq!(
        check_bond_primaries(&topology),
        vec![ValidationError::BondPrimaryCount {
            role: Role::Compute,
            bond: "bond1".to_string(),
            count: 2,
        }]
    );
}

#[test]
fn test_duplicate_bond_name_in_role() {
    let topology = load_topology(
        r"---
compute:
- type: bridge
  name: br-ex
  members:
  - type: bond
    name: bond1
    members:
    - type: interface
      name: nic1
      primary: true
    - type: interface
      name: nic2
- type: bridge
  name: br-ex1
  members:
  - type: bond
    name: bond1
    members:
    - type: interface
      name: nic3
      primary: true
    - type: interface
      name: nic4
controller:
- type: bridge
  name: br-ex
  members:
  - type: bond
    name: bond1
    members:
    - type: interface
      name: nic1
      primary: true
    - type: interface
      name: nic2
",
    );
    assert_eq!(
        check_duplicate_bonds(&topology),
        vec![ValidationError::DuplicateBondName {
            role: Role::Compute,
            name: "bond1".to_string(),
        }]
    );
}

#[test]
fn test_bridge_without_carrier() {
    let topology = load_topology(
        r"---
compute:
- type: bridge
  name: br-ex
  members:
  - type: vlan
    network: Storage
",
    );
    assert_eq!(
        check_bridge_carriers(&topology),
        vec![ValidationError::BridgeCarrierCount {
            role: Role::Compute,
            bridge: "br-ex".to_string(),
            count: 0,
        }]
    );
}

#[test]
fn test_validate_collect_all_errors() {
    let topology = load_topology(
        r"---
compute:
- type: interface
  name: nic1
  network: Storage
- type: interface
  name: nic1
  network: Storage
- type: bridge
  name: br-ex
",
    );
    let mut params = NetworkParams::new();
    params.storage.cidr = "not-a-cidr".to_string();

    let errors = validate(&topology, &params).unwrap_err();
    assert_eq!(
        errors,
        vec![
            ValidationError::DuplicateNetwork {
                role: Role::Compute,
                network: NetworkName::Storage,
            },
            ValidationError::DuplicateInterfaceName {
                role: Role::Compute,
                name: "nic1".to_string(),
            },
            ValidationError::InvalidAddress {
                network: NetworkName::Storage,
                field: "cidr",
                value: "not-a-cidr".to_string(),
            },
            ValidationError::BridgeCarrierCount {
                role: Role::Compute,
                bridge: "br-ex".to_string(),
                count: 0,
            },
        ]
    );

    let e = NetIsoError::from(errors);
    assert_eq!(e.kind(), ErrorKind::ValidationFailure);
    assert!(e.msg().contains("Duplicate interface name nic1"));
}
