// SPDX-License-Identifier: Apache-2.0

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{
    BondInterface, BondType, BridgeInterface, BridgeType, DeviceNode,
    ErrorKind, NetIsoError, NetworkName, NicInterface, Role, RouteEntry,
    VlanInterface,
};

const NIC_NAME_PREFIX: &str = "nic";
const BOND_NAME_PREFIX: &str = "bond";
const DEFAULT_BRIDGE_NAME: &str = "br-ex";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Location of a node inside a [Topology]: the role plus the index at every
/// nesting level. An empty index list is the role root.
pub struct NodePath {
    pub role: Role,
    pub indexes: Vec<usize>,
}

impl NodePath {
    pub fn root(role: Role) -> Self {
        Self {
            role,
            indexes: Vec::new(),
        }
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indexes = self.indexes.clone();
        indexes.push(index);
        Self {
            role: self.role,
            indexes,
        }
    }

    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            None
        } else {
            Some(Self {
                role: self.role,
                indexes: self.indexes[..self.indexes.len() - 1].to_vec(),
            })
        }
    }

    pub fn is_root(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.role)?;
        for index in &self.indexes {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<Role, Vec<DeviceNode>>",
    into = "BTreeMap<Role, Vec<DeviceNode>>"
)]
/// Device trees of every role. This is the single source of truth edited by
/// the operator; compilation only ever reads a copy of it.
pub struct Topology {
    roles: BTreeMap<Role, Vec<DeviceNode>>,
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

impl From<BTreeMap<Role, Vec<DeviceNode>>> for Topology {
    fn from(mut roles: BTreeMap<Role, Vec<DeviceNode>>) -> Self {
        for role in Role::ALL {
            roles.entry(role).or_default();
        }
        let mut ret = Self { roles };
        ret.sync_vlan_devices();
        ret
    }
}

impl From<Topology> for BTreeMap<Role, Vec<DeviceNode>> {
    fn from(topology: Topology) -> Self {
        topology.roles
    }
}

impl Topology {
    pub fn new() -> Self {
        Self {
            roles: Role::ALL.into_iter().map(|r| (r, Vec::new())).collect(),
        }
    }

    /// Top level devices of specified role.
    pub fn devices(&self, role: Role) -> &[DeviceNode] {
        self.roles.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roles(&self) -> impl Iterator<Item = (Role, &[DeviceNode])> {
        self.roles.iter().map(|(r, devs)| (*r, devs.as_slice()))
    }

    pub fn get(&self, path: &NodePath) -> Option<&DeviceNode> {
        let (first, rest) = path.indexes.split_first()?;
        let mut node = self.roles.get(&path.role)?.get(*first)?;
        for index in rest {
            node = node.members().get(*index)?;
        }
        Some(node)
    }

    fn get_mut(&mut self, path: &NodePath) -> Option<&mut DeviceNode> {
        let (first, rest) = path.indexes.split_first()?;
        let mut node = self.roles.get_mut(&path.role)?.get_mut(*first)?;
        for index in rest {
            node = node.members_mut()?.get_mut(*index)?;
        }
        Some(node)
    }

    fn node_mut(
        &mut self,
        path: &NodePath,
    ) -> Result<&mut DeviceNode, NetIsoError> {
        self.get_mut(path).ok_or_else(|| {
            NetIsoError::new(
                ErrorKind::InvalidArgument,
                format!("Node {path} not found"),
            )
        })
    }

    fn node(&self, path: &NodePath) -> Result<&DeviceNode, NetIsoError> {
        self.get(path).ok_or_else(|| {
            NetIsoError::new(
                ErrorKind::InvalidArgument,
                format!("Node {path} not found"),
            )
        })
    }

    fn children_mut(
        &mut self,
        parent: &NodePath,
    ) -> Result<&mut Vec<DeviceNode>, NetIsoError> {
        if parent.is_root() {
            return self.roles.get_mut(&parent.role).ok_or_else(|| {
                NetIsoError::new(
                    ErrorKind::Bug,
                    format!("Role {} has no root", parent.role),
                )
            });
        }
        let node = self.node_mut(parent)?;
        let node_type = node.type_name();
        node.members_mut().ok_or_else(|| {
            NetIsoError::new(
                ErrorKind::InvalidTopology,
                format!("A {node_type} cannot hold member devices"),
            )
        })
    }

    fn append(
        &mut self,
        parent: &NodePath,
        node: DeviceNode,
    ) -> Result<NodePath, NetIsoError> {
        let children = self.children_mut(parent)?;
        children.push(node);
        let path = parent.child(children.len() - 1);
        self.sync_vlan_devices();
        Ok(path)
    }

    /// Add an interface named after the next free `nic<N>` to a role root,
    /// a bridge without carrier or a bond.
    pub fn add_interface(
        &mut self,
        parent: &NodePath,
    ) -> Result<NodePath, NetIsoError> {
        let primary = if parent.is_root() {
            false
        } else {
            match self.node(parent)? {
                DeviceNode::Bridge(br) => {
                    if let Some(carrier) = br.carriers().next() {
                        return Err(NetIsoError::new(
                            ErrorKind::InvalidTopology,
                            format!(
                                "Bridge {} already has {} {} as member, \
                                only one interface or bond is allowed",
                                br.name,
                                carrier.type_name(),
                                carrier.name().unwrap_or_default()
                            ),
                        ));
                    }
                    true
                }
                DeviceNode::Bond(bond) => bond.interfaces().all(|i| !i.primary),
                node => {
                    return Err(NetIsoError::new(
                        ErrorKind::InvalidTopology,
                        format!(
                            "Can only add interfaces to role roots, bridges \
                            and bonds, not to a {}",
                            node.type_name()
                        ),
                    ));
                }
            }
        };
        let mut nic = NicInterface::new(&self.next_nic_name(parent.role)?);
        nic.primary = primary;
        log::debug!("Adding interface {} to {parent}", nic.name);
        self.append(parent, DeviceNode::Interface(nic))
    }

    /// Add a bridge to a role root.
    pub fn add_bridge(
        &mut self,
        parent: &NodePath,
    ) -> Result<NodePath, NetIsoError> {
        if !parent.is_root() {
            return Err(NetIsoError::new(
                ErrorKind::InvalidTopology,
                "Can only add bridges to role roots".to_string(),
            ));
        }
        let br = BridgeInterface::new(&self.next_bridge_name(parent.role));
        log::debug!("Adding bridge {} to {parent}", br.name);
        self.append(parent, DeviceNode::Bridge(br))
    }

    /// Add a bond to a bridge which has no carrier yet.
    pub fn add_bond(
        &mut self,
        parent: &NodePath,
    ) -> Result<NodePath, NetIsoError> {
        match self.get(parent) {
            Some(DeviceNode::Bridge(br)) => {
                if let Some(carrier) = br.carriers().next() {
                    return Err(NetIsoError::new(
                        ErrorKind::InvalidTopology,
                        format!(
                            "Bridge {} already has {} {} as member, only \
                            one interface or bond is allowed",
                            br.name,
                            carrier.type_name(),
                            carrier.name().unwrap_or_default()
                        ),
                    ));
                }
            }
            _ => {
                return Err(NetIsoError::new(
                    ErrorKind::InvalidTopology,
                    "Can only add bonds to bridges".to_string(),
                ));
            }
        }
        let bond = BondInterface::new(&self.next_bond_name(parent.role));
        log::debug!("Adding bond {} to {parent}", bond.name);
        self.append(parent, DeviceNode::Bond(bond))
    }

    /// Add a VLAN to a bridge. The VLAN has no network until
    /// [Topology::set_network] is invoked.
    pub fn add_vlan(
        &mut self,
        parent: &NodePath,
    ) -> Result<NodePath, NetIsoError> {
        if !matches!(self.get(parent), Some(DeviceNode::Bridge(_))) {
            return Err(NetIsoError::new(
                ErrorKind::InvalidTopology,
                "Can only add VLANs to bridges".to_string(),
            ));
        }
        log::debug!("Adding VLAN to {parent}");
        self.append(parent, DeviceNode::Vlan(VlanInterface::default()))
    }

    /// Add a static route to an interface, bridge or bond.
    pub fn add_route(
        &mut self,
        parent: &NodePath,
        route: RouteEntry,
    ) -> Result<(), NetIsoError> {
        if route.next_hop.is_empty() {
            return Err(NetIsoError::new(
                ErrorKind::InvalidArgument,
                "Route next hop should not be empty".to_string(),
            ));
        }
        if !route.default && route.ip_netmask.is_empty() {
            return Err(NetIsoError::new(
                ErrorKind::InvalidArgument,
                "Route ip_netmask should not be empty for non-default route"
                    .to_string(),
            ));
        }
        let is_root = parent.is_root();
        let node = match self.get_mut(parent) {
            Some(n) if !is_root => n,
            _ => {
                return Err(NetIsoError::new(
                    ErrorKind::InvalidTopology,
                    "Can only add routes to interfaces, bridges and bonds"
                        .to_string(),
                ));
            }
        };
        match node {
            DeviceNode::Interface(nic) => {
                nic.routes.push(route);
            }
            DeviceNode::Bridge(br) => {
                br.members.push(DeviceNode::Route(route));
            }
            DeviceNode::Bond(bond) => {
                bond.members.push(DeviceNode::Route(route));
            }
            node => {
                return Err(NetIsoError::new(
                    ErrorKind::InvalidTopology,
                    format!(
                        "Can only add routes to interfaces, bridges and \
                        bonds, not to a {}",
                        node.type_name()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Remove a route stored directly on an interface. Route members of
    /// bridges and bonds are removed by [Topology::delete].
    pub fn remove_route(
        &mut self,
        parent: &NodePath,
        index: usize,
    ) -> Result<RouteEntry, NetIsoError> {
        match self.node_mut(parent)? {
            DeviceNode::Interface(nic) if index < nic.routes.len() => {
                Ok(nic.routes.remove(index))
            }
            DeviceNode::Interface(nic) => Err(NetIsoError::new(
                ErrorKind::InvalidArgument,
                format!("Interface {} has no route {index}", nic.name),
            )),
            node => Err(NetIsoError::new(
                ErrorKind::InvalidTopology,
                format!(
                    "Only interfaces store routes directly, got {}",
                    node.type_name()
                ),
            )),
        }
    }

    /// Remove the node and everything nested in it. Role roots are fixed.
    pub fn delete(
        &mut self,
        path: &NodePath,
    ) -> Result<DeviceNode, NetIsoError> {
        let parent = match path.parent() {
            Some(p) => p,
            None => {
                return Err(NetIsoError::new(
                    ErrorKind::InvalidTopology,
                    format!("Cannot delete role root {}", path.role),
                ));
            }
        };
        let index = path.indexes[path.indexes.len() - 1];
        let children = self.children_mut(&parent)?;
        if index >= children.len() {
            return Err(NetIsoError::new(
                ErrorKind::InvalidArgument,
                format!("Node {path} not found"),
            ));
        }
        let node = children.remove(index);
        log::debug!("Deleted {} at {path}", node.type_name());
        self.sync_vlan_devices();
        Ok(node)
    }

    pub fn rename(
        &mut self,
        path: &NodePath,
        new_name: &str,
    ) -> Result<(), NetIsoError> {
        if new_name.trim().is_empty() {
            return Err(NetIsoError::new(
                ErrorKind::InvalidArgument,
                "Device name should not be empty".to_string(),
            ));
        }
        match self.node_mut(path)? {
            DeviceNode::Interface(i) => i.name = new_name.to_string(),
            DeviceNode::Bridge(i) => i.name = new_name.to_string(),
            DeviceNode::Bond(i) => i.name = new_name.to_string(),
            node => {
                return Err(NetIsoError::new(
                    ErrorKind::InvalidTopology,
                    format!("A {} has no name", node.type_name()),
                ));
            }
        }
        self.sync_vlan_devices();
        Ok(())
    }

    pub fn set_network(
        &mut self,
        path: &NodePath,
        network: NetworkName,
    ) -> Result<(), NetIsoError> {
        match self.node_mut(path)? {
            DeviceNode::Interface(i) => i.network = network,
            DeviceNode::Bridge(i) => i.network = network,
            DeviceNode::Vlan(i) => i.network = network,
            node => {
                return Err(NetIsoError::new(
                    ErrorKind::InvalidTopology,
                    format!("Cannot assign network to a {}", node.type_name()),
                ));
            }
        }
        Ok(())
    }

    pub fn set_primary(
        &mut self,
        path: &NodePath,
        primary: bool,
    ) -> Result<(), NetIsoError> {
        match self.node_mut(path)? {
            DeviceNode::Interface(i) => {
                i.primary = primary;
                Ok(())
            }
            node => Err(NetIsoError::new(
                ErrorKind::InvalidTopology,
                format!(
                    "Primary flag is not supported by {}",
                    node.type_name()
                ),
            )),
        }
    }

    /// Set MTU, `None` to leave it to the system default.
    pub fn set_mtu(
        &mut self,
        path: &NodePath,
        mtu: Option<u32>,
    ) -> Result<(), NetIsoError> {
        if mtu == Some(0) {
            return Err(NetIsoError::new(
                ErrorKind::InvalidArgument,
                "MTU should be a positive integer".to_string(),
            ));
        }
        match self.node_mut(path)? {
            DeviceNode::Interface(i) => i.mtu = mtu,
            DeviceNode::Bridge(i) => i.mtu = mtu,
            DeviceNode::Bond(i) => i.mtu = mtu,
            DeviceNode::Vlan(i) => i.mtu = mtu,
            DeviceNode::Route(_) => {
                return Err(NetIsoError::new(
                    ErrorKind::InvalidTopology,
                    "Routes have no MTU".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn set_use_dhcp(
        &mut self,
        path: &NodePath,
        use_dhcp: bool,
    ) -> Result<(), NetIsoError> {
        match self.node_mut(path)? {
            DeviceNode::Interface(i) => i.use_dhcp = use_dhcp,
            DeviceNode::Bridge(i) => i.use_dhcp = use_dhcp,
            node => {
                return Err(NetIsoError::new(
                    ErrorKind::InvalidTopology,
                    format!("DHCP is not supported by {}", node.type_name()),
                ));
            }
        }
        Ok(())
    }

    pub fn set_bridge_type(
        &mut self,
        path: &NodePath,
        bridge_type: BridgeType,
    ) -> Result<(), NetIsoError> {
        match self.node_mut(path)? {
            DeviceNode::Bridge(br) => {
                br.bridge_type = bridge_type;
                Ok(())
            }
            node => Err(NetIsoError::new(
                ErrorKind::InvalidTopology,
                format!("A {} is not a bridge", node.type_name()),
            )),
        }
    }

    /// Set bond type and its `ovs_options`/`bonding_options`, `None` options
    /// reference the cluster wide bond options.
    pub fn set_bond_type(
        &mut self,
        path: &NodePath,
        bond_type: BondType,
        options: Option<String>,
    ) -> Result<(), NetIsoError> {
        match self.node_mut(path)? {
            DeviceNode::Bond(bond) => {
                bond.bond_type = bond_type;
                bond.options = options.filter(|o| !o.is_empty());
                Ok(())
            }
            node => Err(NetIsoError::new(
                ErrorKind::InvalidTopology,
                format!("A {} is not a bond", node.type_name()),
            )),
        }
    }

    pub fn set_dpdk_port_name(
        &mut self,
        path: &NodePath,
        dpdk_port_name: Option<String>,
    ) -> Result<(), NetIsoError> {
        match self.node_mut(path)? {
            DeviceNode::Interface(i) => {
                i.dpdk_port_name = dpdk_port_name.filter(|n| !n.is_empty());
                Ok(())
            }
            node => Err(NetIsoError::new(
                ErrorKind::InvalidTopology,
                format!("A {} cannot be a DPDK port", node.type_name()),
            )),
        }
    }

    /// Networks assigned to any device of any role, `None` excluded.
    pub fn networks_in_use(&self) -> BTreeSet<NetworkName> {
        self.roles
            .values()
            .flatten()
            .flat_map(DeviceNode::descendants)
            .filter_map(DeviceNode::network)
            .filter(|n| !n.is_none())
            .collect()
    }

    pub fn is_network_used(&self, network: NetworkName) -> bool {
        Role::ALL
            .into_iter()
            .any(|role| self.is_network_used_by_role(network, role))
    }

    pub fn is_network_used_by_role(
        &self,
        network: NetworkName,
        role: Role,
    ) -> bool {
        !network.is_none()
            && self
                .devices(role)
                .iter()
                .flat_map(DeviceNode::descendants)
                .any(|n| n.network() == Some(network))
    }

    /// Whether any VLAN device of any role carries specified network.
    pub fn is_network_used_on_vlan(&self, network: NetworkName) -> bool {
        !network.is_none()
            && self
                .roles
                .values()
                .flatten()
                .flat_map(DeviceNode::descendants)
                .any(|n| match n {
                    DeviceNode::Vlan(vlan) => vlan.network == network,
                    _ => false,
                })
    }

    /// Next unused `nic<N>` name: one above the highest numbered interface
    /// anywhere in the role tree.
    pub fn next_nic_name(&self, role: Role) -> Result<String, NetIsoError> {
        let next = match self
            .devices(role)
            .iter()
            .flat_map(DeviceNode::descendants)
            .filter_map(|n| match n {
                DeviceNode::Interface(nic) => nic
                    .name
                    .strip_prefix(NIC_NAME_PREFIX)
                    .and_then(|num| num.parse::<u32>().ok()),
                _ => None,
            })
            .max()
        {
            Some(max) => max.checked_add(1).ok_or_else(|| {
                NetIsoError::new(
                    ErrorKind::InvalidArgument,
                    format!(
                        "No interface name left after \
                        {NIC_NAME_PREFIX}{max} in role {role}"
                    ),
                )
            })?,
            None => 1,
        };
        Ok(format!("{NIC_NAME_PREFIX}{next}"))
    }

    fn next_bond_name(&self, role: Role) -> String {
        let names = self.names_of(role);
        (1..)
            .map(|i| format!("{BOND_NAME_PREFIX}{i}"))
            .find(|n| !names.contains(n.as_str()))
            .unwrap_or_else(|| BOND_NAME_PREFIX.to_string())
    }

    fn next_bridge_name(&self, role: Role) -> String {
        let names = self.names_of(role);
        if !names.contains(DEFAULT_BRIDGE_NAME) {
            return DEFAULT_BRIDGE_NAME.to_string();
        }
        (1..)
            .map(|i| format!("{DEFAULT_BRIDGE_NAME}{i}"))
            .find(|n| !names.contains(n.as_str()))
            .unwrap_or_else(|| DEFAULT_BRIDGE_NAME.to_string())
    }

    fn names_of(&self, role: Role) -> BTreeSet<&str> {
        self.devices(role)
            .iter()
            .flat_map(DeviceNode::descendants)
            .filter_map(DeviceNode::name)
            .collect()
    }

    // VLANs reference their sibling bond by name only.
    fn sync_vlan_devices(&mut self) {
        for node in self.roles.values_mut().flatten() {
            if let DeviceNode::Bridge(br) = node {
                let bond_name = br.bond_name().map(str::to_string);
                for member in br.members.iter_mut() {
                    if let DeviceNode::Vlan(vlan) = member {
                        vlan.device.clone_from(&bond_name);
                    }
                }
            }
        }
    }
}
