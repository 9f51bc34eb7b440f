// SPDX-License-Identifier: Apache-2.0

use crate::{
    unit_tests::testlib::{bonded_bridge_topology, load_topology},
    DeviceNode, ErrorKind, NetworkName, NodePath, Role, RouteEntry, Topology,
};

#[test]
fn test_new_topology_has_every_role() {
    let topology = Topology::new();
    assert_eq!(topology.roles().count(), Role::ALL.len());
    assert!(topology.roles().all(|(_, devs)| devs.is_empty()));
}

#[test]
fn test_load_topology_fill_missing_roles() {
    let topology = load_topology(
        r"---
compute:
- type: interface
  name: nic1
",
    );
    assert_eq!(topology.roles().count(), Role::ALL.len());
    assert_eq!(topology.devices(Role::Compute).len(), 1);
    assert!(topology.devices(Role::Controller).is_empty());
}

#[test]
fn test_add_interface_to_root() {
    let mut topology = Topology::new();
    let root = NodePath::root(Role::Controller);
    let nic1 = topology.add_interface(&root).unwrap();
    let nic2 = topology.add_interface(&root).unwrap();

    assert_eq!(nic1.to_string(), "controller/0");
    assert_eq!(topology.get(&nic1).unwrap().name(), Some("nic1"));
    assert_eq!(topology.get(&nic2).unwrap().name(), Some("nic2"));
    if let Some(DeviceNode::Interface(nic)) = topology.get(&nic1) {
        assert!(!nic.primary);
        assert_eq!(nic.network, NetworkName::None);
        assert_eq!(nic.mtu, None);
    } else {
        panic!("Expecting interface");
    }
}

#[test]
fn test_next_nic_name_count_nested_interfaces() {
    let topology = bonded_bridge_topology();
    assert_eq!(topology.next_nic_name(Role::Compute).unwrap(), "nic4");
    assert_eq!(topology.next_nic_name(Role::Controller).unwrap(), "nic1");
}

#[test]
fn test_next_nic_name_after_rename() {
    let mut topology = Topology::new();
    let root = NodePath::root(Role::Compute);
    let nic1 = topology.add_interface(&root).unwrap();
    topology.rename(&nic1, "nic7").unwrap();
    let nic = topology.add_interface(&root).unwrap();
    assert_eq!(topology.get(&nic).unwrap().name(), Some("nic8"));
}

#[test]
fn test_next_nic_name_exhausted() {
    let mut topology = Topology::new();
    let root = NodePath::root(Role::Compute);
    let nic = topology.add_interface(&root).unwrap();
    topology.rename(&nic, &format!("nic{}", u32::MAX)).unwrap();

    let result = topology.add_interface(&root);
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }
    assert_eq!(topology.devices(Role::Compute).len(), 1);
}

#[test]
fn test_bridge_allow_only_one_carrier() {
    let mut topology = Topology::new();
    let br = topology
        .add_bridge(&NodePath::root(Role::Compute))
        .unwrap();
    let nic = topology.add_interface(&br).unwrap();
    if let Some(DeviceNode::Interface(nic)) = topology.get(&nic) {
        assert!(nic.primary);
    } else {
        panic!("Expecting interface");
    }

    let result = topology.add_interface(&br);
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidTopology);
    }
    let result = topology.add_bond(&br);
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidTopology);
    }
}

#[test]
fn test_bond_first_interface_is_primary() {
    let mut topology = Topology::new();
    let br = topology
        .add_bridge(&NodePath::root(Role::Compute))
        .unwrap();
    let bond = topology.add_bond(&br).unwrap();
    assert_eq!(topology.get(&bond).unwrap().name(), Some("bond1"));

    let nic1 = topology.add_interface(&bond).unwrap();
    let nic2 = topology.add_interface(&bond).unwrap();
    let primaries: Vec<bool> = [nic1, nic2]
        .iter()
        .map(|p| match topology.get(p) {
            Some(DeviceNode::Interface(nic)) => nic.primary,
            _ => panic!("Expecting interface"),
        })
        .collect();
    assert_eq!(primaries, vec![true, false]);
}

#[test]
fn test_add_interface_to_vlan_rejected() {
    let mut topology = Topology::new();
    let br = topology
        .add_bridge(&NodePath::root(Role::Compute))
        .unwrap();
    let vlan = topology.add_vlan(&br).unwrap();
    let result = topology.add_interface(&vlan);
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidTopology);
    }
}

#[test]
fn test_add_bridge_only_to_root() {
    let mut topology = Topology::new();
    let root = NodePath::root(Role::Controller);
    let br = topology.add_bridge(&root).unwrap();
    let br1 = topology.add_bridge(&root).unwrap();
    assert_eq!(topology.get(&br).unwrap().name(), Some("br-ex"));
    assert_eq!(topology.get(&br1).unwrap().name(), Some("br-ex1"));

    let result = topology.add_bridge(&br);
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidTopology);
    }
}

#[test]
fn test_add_vlan_only_to_bridge() {
    let mut topology = Topology::new();
    let root = NodePath::root(Role::Compute);
    let nic = topology.add_interface(&root).unwrap();
    for parent in [root, nic] {
        let result = topology.add_vlan(&parent);
        assert!(result.is_err());
        if let Err(e) = result {
            assert_eq!(e.kind(), ErrorKind::InvalidTopology);
        }
    }
}

#[test]
fn test_vlan_device_follow_bond_name() {
    let mut topology = bonded_bridge_topology();
    let bond = NodePath::root(Role::Compute).child(1).child(0);
    let vlan = NodePath::root(Role::Compute).child(1).child(1);

    match topology.get(&vlan) {
        Some(DeviceNode::Vlan(v)) => {
            assert_eq!(v.device.as_deref(), Some("bond1"))
        }
        _ => panic!("Expecting VLAN"),
    }

    topology.rename(&bond, "bond5").unwrap();
    match topology.get(&vlan) {
        Some(DeviceNode::Vlan(v)) => {
            assert_eq!(v.device.as_deref(), Some("bond5"))
        }
        _ => panic!("Expecting VLAN"),
    }

    topology.delete(&bond).unwrap();
    // The VLAN moved up to index 0
    let vlan = NodePath::root(Role::Compute).child(1).child(0);
    match topology.get(&vlan) {
        Some(DeviceNode::Vlan(v)) => assert_eq!(v.device, None),
        _ => panic!("Expecting VLAN"),
    }
}

#[test]
fn test_delete_subtree() {
    let mut topology = bonded_bridge_topology();
    let br = NodePath::root(Role::Compute).child(1);
    let node = topology.delete(&br).unwrap();
    assert_eq!(node.descendants().len(), 5);
    assert_eq!(topology.devices(Role::Compute).len(), 1);
    assert!(!topology.is_network_used(NetworkName::InternalApi));
}

#[test]
fn test_delete_role_root_rejected() {
    let mut topology = bonded_bridge_topology();
    let result = topology.delete(&NodePath::root(Role::Compute));
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidTopology);
    }
}

#[test]
fn test_delete_missing_node() {
    let mut topology = bonded_bridge_topology();
    let result = topology.delete(&NodePath::root(Role::Compute).child(9));
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }
}

#[test]
fn test_add_route_to_interface_and_bridge() {
    let mut topology = bonded_bridge_topology();
    let nic1 = NodePath::root(Role::Compute).child(0);
    let br = NodePath::root(Role::Compute).child(1);

    topology
        .add_route(&nic1, RouteEntry::new("10.1.0.0/16", "192.0.2.254"))
        .unwrap();
    topology
        .add_route(&br, RouteEntry::new_default("10.0.0.254"))
        .unwrap();

    match topology.get(&nic1) {
        Some(DeviceNode::Interface(nic)) => assert_eq!(nic.routes.len(), 1),
        _ => panic!("Expecting interface"),
    }
    assert!(matches!(
        topology.get(&br.child(2)),
        Some(DeviceNode::Route(rt)) if rt.default
    ));

    let removed = topology.remove_route(&nic1, 0).unwrap();
    assert_eq!(removed.ip_netmask, "10.1.0.0/16");
}

#[test]
fn test_add_invalid_route() {
    let mut topology = bonded_bridge_topology();
    let nic1 = NodePath::root(Role::Compute).child(0);
    let vlan = NodePath::root(Role::Compute).child(1).child(1);

    let result = topology.add_route(&nic1, RouteEntry::new("", "192.0.2.1"));
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }
    let result = topology.add_route(&vlan, RouteEntry::new_default("1.1.1.1"));
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidTopology);
    }
    let result = topology.add_route(
        &NodePath::root(Role::Compute),
        RouteEntry::new_default("1.1.1.1"),
    );
    assert!(result.is_err());
}

#[test]
fn test_set_mtu() {
    let mut topology = bonded_bridge_topology();
    let br = NodePath::root(Role::Compute).child(1);
    topology.set_mtu(&br, Some(9000)).unwrap();
    assert_eq!(topology.get(&br).unwrap().mtu(), Some(9000));
    topology.set_mtu(&br, None).unwrap();
    assert_eq!(topology.get(&br).unwrap().mtu(), None);

    let result = topology.set_mtu(&br, Some(0));
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidArgument);
    }
}

#[test]
fn test_set_network_on_bond_rejected() {
    let mut topology = bonded_bridge_topology();
    let bond = NodePath::root(Role::Compute).child(1).child(0);
    let result = topology.set_network(&bond, NetworkName::Storage);
    assert!(result.is_err());
    if let Err(e) = result {
        assert_eq!(e.kind(), ErrorKind::InvalidTopology);
    }
}

#[test]
fn test_network_usage() {
    let topology = bonded_bridge_topology();
    assert_eq!(
        topology.networks_in_use().into_iter().collect::<Vec<_>>(),
        vec![
            NetworkName::ControlPlane,
            NetworkName::External,
            NetworkName::InternalApi
        ]
    );
    assert!(topology.is_network_used_by_role(
        NetworkName::External,
        Role::Compute
    ));
    assert!(!topology.is_network_used_by_role(
        NetworkName::External,
        Role::Controller
    ));
    assert!(topology.is_network_used_on_vlan(NetworkName::InternalApi));
    assert!(!topology.is_network_used_on_vlan(NetworkName::External));
    assert!(!topology.is_network_used(NetworkName::None));
}

#[test]
fn test_network_used_until_last_user_deleted() {
    let mut topology = Topology::new();
    assert!(!topology.is_network_used(NetworkName::Storage));

    let compute_nic =
        topology.add_interface(&NodePath::root(Role::Compute)).unwrap();
    topology
        .set_network(&compute_nic, NetworkName::Storage)
        .unwrap();
    assert!(topology.is_network_used(NetworkName::Storage));

    let ceph_nic = topology
        .add_interface(&NodePath::root(Role::CephStorage))
        .unwrap();
    topology.set_network(&ceph_nic, NetworkName::Storage).unwrap();

    topology.delete(&compute_nic).unwrap();
    assert!(topology.is_network_used(NetworkName::Storage));
    assert!(!topology
        .is_network_used_by_role(NetworkName::Storage, Role::Compute));

    topology.delete(&ceph_nic).unwrap();
    assert!(!topology.is_network_used(NetworkName::Storage));
    assert!(topology.networks_in_use().is_empty());
}

#[test]
fn test_topology_serde_keep_mtu_unset_as_minus_one() {
    let topology = bonded_bridge_topology();
    let value = serde_json::to_value(&topology).unwrap();
    assert_eq!(value["compute"][0]["mtu"], serde_json::json!(-1));
    let topology2: Topology = serde_json::from_value(value).unwrap();
    assert_eq!(topology, topology2);
}
