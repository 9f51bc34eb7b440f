// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use crate::NetworkName;

pub(crate) const DEFAULT_FORMAT_VERSION: &str = "2015-04-30";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
#[non_exhaustive]
/// Provisioning network settings. The CIDR itself is owned by the
/// provisioning node, only the netmask length is needed here.
pub struct ControlPlaneParams {
    pub mask_length: u8,
    pub default_route: String,
    pub ec2_metadata_ip: String,
}

impl Default for ControlPlaneParams {
    fn default() -> Self {
        Self {
            mask_length: 24,
            default_route: "192.0.2.1".to_string(),
            ec2_metadata_ip: "192.0.2.1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[non_exhaustive]
/// CIDR, allocation range and VLAN ID of an isolated network.
pub struct SubnetParams {
    pub cidr: String,
    pub range_start: String,
    pub range_end: String,
    #[serde(deserialize_with = "crate::deserializer::u16_or_string")]
    pub vlan_id: u16,
}

impl SubnetParams {
    pub fn new(
        cidr: &str,
        range_start: &str,
        range_end: &str,
        vlan_id: u16,
    ) -> Self {
        Self {
            cidr: cidr.to_string(),
            range_start: range_start.to_string(),
            range_end: range_end.to_string(),
            vlan_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct ExternalParams {
    #[serde(flatten)]
    pub subnet: SubnetParams,
    pub gateway: String,
    /// Neutron external network bridge, empty to let neutron use a provider
    /// network.
    pub bridge_name: String,
}

impl Default for ExternalParams {
    fn default() -> Self {
        Self {
            subnet: SubnetParams::new(
                "10.0.0.0/24",
                "10.0.0.10",
                "10.0.0.50",
                1,
            ),
            gateway: "10.0.0.1".to_string(),
            bridge_name: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
/// Global network registry: every network's addressing plus cluster wide
/// settings. Edited directly by the operator.
pub struct NetworkParams {
    pub control_plane: ControlPlaneParams,
    pub external: ExternalParams,
    pub internal_api: SubnetParams,
    pub storage: SubnetParams,
    pub storage_mgmt: SubnetParams,
    pub tenant: SubnetParams,
    pub management: SubnetParams,
    pub dns_servers: [String; 2],
    /// Cluster wide `BondInterfaceOvsOptions`, omitted when empty.
    pub bond_options: String,
    /// Append default routes to ControlPlane (non-controller roles) and
    /// External devices.
    pub auto_default_routes: bool,
    pub ipv6: bool,
    /// `heat_template_version` of generated device-config templates.
    pub format_version: String,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            control_plane: ControlPlaneParams::default(),
            external: ExternalParams::default(),
            internal_api: SubnetParams::new(
                "172.17.0.0/24",
                "172.17.0.10",
                "172.17.0.250",
                2,
            ),
            storage: SubnetParams::new(
                "172.18.0.0/24",
                "172.18.0.10",
                "172.18.0.250",
                3,
            ),
            storage_mgmt: SubnetParams::new(
                "172.19.0.0/24",
                "172.19.0.10",
                "172.19.0.250",
                4,
            ),
            tenant: SubnetParams::new(
                "172.16.0.0/24",
                "172.16.0.10",
                "172.16.0.250",
                5,
            ),
            management: SubnetParams::new(
                "172.20.0.0/24",
                "172.20.0.10",
                "172.20.0.250",
                6,
            ),
            dns_servers: ["8.8.8.8".to_string(), "8.8.4.4".to_string()],
            bond_options: String::new(),
            auto_default_routes: true,
            ipv6: false,
            format_version: DEFAULT_FORMAT_VERSION.to_string(),
        }
    }
}

impl NetworkParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Addressing of specified network, `None` for the control plane and
    /// for [NetworkName::None] which declare no subnet.
    pub fn subnet(&self, network: NetworkName) -> Option<&SubnetParams> {
        match network {
            NetworkName::External => Some(&self.external.subnet),
            NetworkName::InternalApi => Some(&self.internal_api),
            NetworkName::Storage => Some(&self.storage),
            NetworkName::StorageMgmt => Some(&self.storage_mgmt),
            NetworkName::Tenant => Some(&self.tenant),
            NetworkName::Management => Some(&self.management),
            NetworkName::None | NetworkName::ControlPlane => None,
        }
    }

    pub fn subnet_mut(
        &mut self,
        network: NetworkName,
    ) -> Option<&mut SubnetParams> {
        match network {
            NetworkName::External => Some(&mut self.external.subnet),
            NetworkName::InternalApi => Some(&mut self.internal_api),
            NetworkName::Storage => Some(&mut self.storage),
            NetworkName::StorageMgmt => Some(&mut self.storage_mgmt),
            NetworkName::Tenant => Some(&mut self.tenant),
            NetworkName::Management => Some(&mut self.management),
            NetworkName::None | NetworkName::ControlPlane => None,
        }
    }
}
