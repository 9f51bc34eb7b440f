// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::NetworkName;

pub(crate) const MTU_UNSET: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
/// One entry of a role's device tree.
///
/// Serialize and deserialize with the variant stored as `type`, e.g.
/// ```yml
/// - type: bridge
///   name: br-ex
///   use_dhcp: false
///   network: External
///   bridge_type: ovs
///   dns_servers: true
///   mtu: -1
///   members:
///   - type: interface
///     name: nic2
///     use_dhcp: false
///     network: None
///     primary: true
///     mtu: -1
/// ```
pub enum DeviceNode {
    Interface(NicInterface),
    Bridge(BridgeInterface),
    Bond(BondInterface),
    Vlan(VlanInterface),
    /// Pseudo-member of a bridge or bond, folded into the parent's routes
    /// when compiling.
    Route(RouteEntry),
}

impl DeviceNode {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Interface(i) => Some(i.name.as_str()),
            Self::Bridge(i) => Some(i.name.as_str()),
            Self::Bond(i) => Some(i.name.as_str()),
            Self::Vlan(_) | Self::Route(_) => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Interface(_) => "interface",
            Self::Bridge(_) => "bridge",
            Self::Bond(_) => "bond",
            Self::Vlan(_) => "vlan",
            Self::Route(_) => "route",
        }
    }

    /// Network assigned to this node, `None` for node types which cannot
    /// hold one (bonds and routes).
    pub fn network(&self) -> Option<NetworkName> {
        match self {
            Self::Interface(i) => Some(i.network),
            Self::Bridge(i) => Some(i.network),
            Self::Vlan(i) => Some(i.network),
            Self::Bond(_) | Self::Route(_) => None,
        }
    }

    pub fn mtu(&self) -> Option<u32> {
        match self {
            Self::Interface(i) => i.mtu,
            Self::Bridge(i) => i.mtu,
            Self::Bond(i) => i.mtu,
            Self::Vlan(i) => i.mtu,
            Self::Route(_) => None,
        }
    }

    pub fn members(&self) -> &[DeviceNode] {
        match self {
            Self::Bridge(i) => i.members.as_slice(),
            Self::Bond(i) => i.members.as_slice(),
            _ => &[],
        }
    }

    pub(crate) fn members_mut(&mut self) -> Option<&mut Vec<DeviceNode>> {
        match self {
            Self::Bridge(i) => Some(&mut i.members),
            Self::Bond(i) => Some(&mut i.members),
            _ => None,
        }
    }

    /// Interface or bond: the node giving a bridge its uplink.
    pub fn is_carrier(&self) -> bool {
        matches!(self, Self::Interface(_) | Self::Bond(_))
    }

    /// This node followed by every nested node, depth first.
    pub fn descendants(&self) -> Vec<&DeviceNode> {
        let mut ret = vec![self];
        for member in self.members() {
            ret.extend(member.descendants());
        }
        ret
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
/// Physical NIC, referenced by its os-net-config abstract name (`nic1`).
pub struct NicInterface {
    pub name: String,
    #[serde(default)]
    pub use_dhcp: bool,
    #[serde(default)]
    pub network: NetworkName,
    /// Meaningful only for members of bonds and bridges.
    #[serde(default)]
    pub primary: bool,
    #[serde(
        default,
        serialize_with = "crate::serializer::mtu_or_unset",
        deserialize_with = "crate::deserializer::mtu_or_unset"
    )]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// When set, the interface is wrapped into an OVS DPDK port of this
    /// name.
    pub dpdk_port_name: Option<String>,
}

impl NicInterface {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BridgeType {
    Ovs,
    OvsUser,
}

impl Default for BridgeType {
    fn default() -> Self {
        Self::Ovs
    }
}

impl std::fmt::Display for BridgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Ovs => "ovs",
                Self::OvsUser => "ovs_user",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub struct BridgeInterface {
    pub name: String,
    #[serde(default)]
    pub use_dhcp: bool,
    #[serde(default)]
    pub network: NetworkName,
    #[serde(default)]
    pub bridge_type: BridgeType,
    /// Attach the cluster DNS servers to this bridge.
    #[serde(default = "default_true")]
    pub dns_servers: bool,
    #[serde(
        default,
        serialize_with = "crate::serializer::mtu_or_unset",
        deserialize_with = "crate::deserializer::mtu_or_unset"
    )]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub members: Vec<DeviceNode>,
}

impl BridgeInterface {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            dns_servers: true,
            ..Default::default()
        }
    }

    pub(crate) fn carriers(&self) -> impl Iterator<Item = &DeviceNode> {
        self.members.iter().filter(|m| m.is_carrier())
    }

    /// Name of the bond member, the device VLAN siblings ride on.
    pub fn bond_name(&self) -> Option<&str> {
        self.members.iter().find_map(|m| match m {
            DeviceNode::Bond(b) => Some(b.name.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum BondType {
    Ovs,
    Linux,
    Team,
    OvsDpdk,
}

impl Default for BondType {
    fn default() -> Self {
        Self::Ovs
    }
}

impl std::fmt::Display for BondType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Ovs => "ovs",
                Self::Linux => "linux",
                Self::Team => "team",
                Self::OvsDpdk => "ovs_dpdk",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub struct BondInterface {
    pub name: String,
    #[serde(default)]
    pub bond_type: BondType,
    /// `ovs_options` for OVS bonds, `bonding_options` for linux and team
    /// bonds. When unset the cluster wide `BondInterfaceOvsOptions`
    /// parameter is referenced instead.
    pub options: Option<String>,
    #[serde(
        default,
        serialize_with = "crate::serializer::mtu_or_unset",
        deserialize_with = "crate::deserializer::mtu_or_unset"
    )]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub members: Vec<DeviceNode>,
}

impl BondInterface {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn interfaces(&self) -> impl Iterator<Item = &NicInterface> {
        self.members.iter().filter_map(|m| match m {
            DeviceNode::Interface(i) => Some(i),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub struct VlanInterface {
    /// Informational only, the compiled VLAN ID always comes from the
    /// assigned network.
    #[serde(
        default,
        deserialize_with = "crate::deserializer::option_u16_or_string"
    )]
    pub vlan_id: Option<u16>,
    #[serde(default)]
    pub network: NetworkName,
    #[serde(
        default,
        serialize_with = "crate::serializer::mtu_or_unset",
        deserialize_with = "crate::deserializer::mtu_or_unset"
    )]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub addresses: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
    /// Name of the sibling bond, kept in sync by [crate::Topology].
    #[serde(default)]
    pub device: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
pub struct RouteEntry {
    #[serde(default)]
    pub ip_netmask: String,
    pub next_hop: String,
    /// Default route, `ip_netmask` is ignored.
    #[serde(default)]
    pub default: bool,
}

impl RouteEntry {
    pub fn new(ip_netmask: &str, next_hop: &str) -> Self {
        Self {
            ip_netmask: ip_netmask.to_string(),
            next_hop: next_hop.to_string(),
            default: false,
        }
    }

    pub fn new_default(next_hop: &str) -> Self {
        Self {
            ip_netmask: String::new(),
            next_hop: next_hop.to_string(),
            default: true,
        }
    }
}

fn default_true() -> bool {
    true
}
