// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use crate::{
    ip::{is_cidr_overlap, parse_cidr, parse_ip},
    DeviceNode, ErrorKind, NetIsoError, NetworkName, NetworkParams, Role,
    Topology,
};

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
/// A single topology or network registry inconsistency.
pub enum ValidationError {
    DuplicateVlanId {
        vlan_id: u16,
        networks: Vec<NetworkName>,
    },
    DuplicateNetwork {
        role: Role,
        network: NetworkName,
    },
    DuplicateBondName {
        role: Role,
        name: String,
    },
    DuplicateInterfaceName {
        role: Role,
        name: String,
    },
    OverlappingCidrs {
        network: NetworkName,
        cidr: String,
        other_network: NetworkName,
        other_cidr: String,
    },
    AddressNotInCidr {
        network: NetworkName,
        field: &'static str,
        address: String,
        cidr: String,
    },
    InvalidAddress {
        network: NetworkName,
        field: &'static str,
        value: String,
    },
    BondPrimaryCount {
        role: Role,
        bond: String,
        count: usize,
    },
    BridgeCarrierCount {
        role: Role,
        bridge: String,
        count: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateVlanId { vlan_id, networks } => write!(
                f,
                "VLAN ID {vlan_id} is used by multiple networks: {}",
                networks
                    .iter()
                    .map(NetworkName::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Self::DuplicateNetwork { role, network } => write!(
                f,
                "Network {network} is assigned to more than one device of \
                role {role}"
            ),
            Self::DuplicateBondName { role, name } => {
                write!(f, "Duplicate bond name {name} in role {role}")
            }
            Self::DuplicateInterfaceName { role, name } => {
                write!(f, "Duplicate interface name {name} in role {role}")
            }
            Self::OverlappingCidrs {
                network,
                cidr,
                other_network,
                other_cidr,
            } => write!(
                f,
                "CIDR {cidr} of network {network} overlaps with CIDR \
                {other_cidr} of network {other_network}"
            ),
            Self::AddressNotInCidr {
                network,
                field,
                address,
                cidr,
            } => write!(
                f,
                "The {field} {address} of network {network} is not in its \
                CIDR {cidr}"
            ),
            Self::InvalidAddress {
                network,
                field,
                value,
            } => write!(f, "Invalid {field} '{value}' for network {network}"),
            Self::BondPrimaryCount { role, bond, count } => write!(
                f,
                "Bond {bond} of role {role} should have exactly one primary \
                interface, found {count}"
            ),
            Self::BridgeCarrierCount {
                role,
                bridge,
                count,
            } => write!(
                f,
                "Bridge {bridge} of role {role} should have exactly one \
                interface or bond member, found {count}"
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<Vec<ValidationError>> for NetIsoError {
    fn from(errors: Vec<ValidationError>) -> Self {
        NetIsoError::new(
            ErrorKind::ValidationFailure,
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join("; "),
        )
    }
}

/// Run every check and report all violations together.
pub fn validate(
    topology: &Topology,
    params: &NetworkParams,
) -> Result<(), Vec<ValidationError>> {
    let mut errors: Vec<ValidationError> = Vec::new();
    for error in check_duplicate_vlans(topology, params)
        .into_iter()
        .chain(check_duplicate_networks(topology))
        .chain(check_duplicate_bonds(topology))
        .chain(check_duplicate_nics(topology))
        .chain(check_overlapping_cidrs(topology, params))
        .chain(check_ips_in_cidr(topology, params))
        .chain(check_bond_primaries(topology))
        .chain(check_bridge_carriers(topology))
    {
        // Unparsable CIDRs are reported by two checks
        if !errors.contains(&error) {
            errors.push(error);
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        for error in &errors {
            log::error!("{error}");
        }
        Err(errors)
    }
}

fn used_subnets<'a>(
    topology: &'a Topology,
    params: &'a NetworkParams,
) -> impl Iterator<Item = (NetworkName, &'a crate::SubnetParams)> + 'a {
    NetworkName::ISOLATED
        .into_iter()
        .filter(move |n| topology.is_network_used(*n))
        .filter_map(move |n| params.subnet(n).map(|s| (n, s)))
}

fn count_duplicates<'a, I>(items: I) -> Vec<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }
    counts
        .into_iter()
        .filter_map(|(item, count)| if count > 1 { Some(item) } else { None })
        .collect()
}

/// VLAN IDs of networks in use must be unique across the deployment.
pub fn check_duplicate_vlans(
    topology: &Topology,
    params: &NetworkParams,
) -> Vec<ValidationError> {
    let mut vlans: BTreeMap<u16, Vec<NetworkName>> = BTreeMap::new();
    for (network, subnet) in used_subnets(topology, params) {
        vlans.entry(subnet.vlan_id).or_default().push(network);
    }
    vlans
        .into_iter()
        .filter(|(_, networks)| networks.len() > 1)
        .map(|(vlan_id, networks)| ValidationError::DuplicateVlanId {
            vlan_id,
            networks,
        })
        .collect()
}

/// A network can only be assigned once within a role's device tree.
pub fn check_duplicate_networks(topology: &Topology) -> Vec<ValidationError> {
    let mut ret = Vec::new();
    for (role, devices) in topology.roles() {
        let mut counts: BTreeMap<NetworkName, usize> = BTreeMap::new();
        for network in devices
            .iter()
            .flat_map(DeviceNode::descendants)
            .filter_map(DeviceNode::network)
            .filter(|n| !n.is_none())
        {
            *counts.entry(network).or_default() += 1;
        }
        ret.extend(counts.into_iter().filter(|(_, c)| *c > 1).map(
            |(network, _)| ValidationError::DuplicateNetwork { role, network },
        ));
    }
    ret
}

pub fn check_duplicate_bonds(topology: &Topology) -> Vec<ValidationError> {
    let mut ret = Vec::new();
    for (role, devices) in topology.roles() {
        let names = devices
            .iter()
            .flat_map(DeviceNode::descendants)
            .filter(|n| matches!(n, DeviceNode::Bond(_)))
            .filter_map(DeviceNode::name);
        ret.extend(count_duplicates(names).into_iter().map(|name| {
            ValidationError::DuplicateBondName {
                role,
                name: name.to_string(),
            }
        }));
    }
    ret
}

/// Interface names must be unique within a role, including interfaces
/// nested in bridges and bonds.
pub fn check_duplicate_nics(topology: &Topology) -> Vec<ValidationError> {
    let mut ret = Vec::new();
    for (role, devices) in topology.roles() {
        let names = devices
            .iter()
            .flat_map(DeviceNode::descendants)
            .filter(|n| matches!(n, DeviceNode::Interface(_)))
            .filter_map(DeviceNode::name);
        ret.extend(count_duplicates(names).into_iter().map(|name| {
            ValidationError::DuplicateInterfaceName {
                role,
                name: name.to_string(),
            }
        }));
    }
    ret
}

/// CIDRs of networks in use must neither duplicate nor contain each other.
pub fn check_overlapping_cidrs(
    topology: &Topology,
    params: &NetworkParams,
) -> Vec<ValidationError> {
    let mut ret = Vec::new();
    let mut cidrs = Vec::new();
    for (network, subnet) in used_subnets(topology, params) {
        match parse_cidr(&subnet.cidr) {
            Ok(ip_net) => cidrs.push((network, subnet.cidr.as_str(), ip_net)),
            Err(_) => ret.push(ValidationError::InvalidAddress {
                network,
                field: "cidr",
                value: subnet.cidr.clone(),
            }),
        }
    }
    for (i, (network, cidr, ip_net)) in cidrs.iter().enumerate() {
        for (other_network, other_cidr, other_ip_net) in &cidrs[i + 1..] {
            if is_cidr_overlap(ip_net, other_ip_net) {
                ret.push(ValidationError::OverlappingCidrs {
                    network: *network,
                    cidr: cidr.to_string(),
                    other_network: *other_network,
                    other_cidr: other_cidr.to_string(),
                });
            }
        }
    }
    ret
}

/// Allocation range boundaries and the external gateway must be inside
/// their network.
pub fn check_ips_in_cidr(
    topology: &Topology,
    params: &NetworkParams,
) -> Vec<ValidationError> {
    let mut ret = Vec::new();
    for (network, subnet) in used_subnets(topology, params) {
        let ip_net = match parse_cidr(&subnet.cidr) {
            Ok(n) => n,
            Err(_) => {
                ret.push(ValidationError::InvalidAddress {
                    network,
                    field: "cidr",
                    value: subnet.cidr.clone(),
                });
                continue;
            }
        };
        let mut addresses = vec![
            ("range start", subnet.range_start.as_str()),
            ("range end", subnet.range_end.as_str()),
        ];
        if network == NetworkName::External {
            addresses.push(("gateway", params.external.gateway.as_str()));
        }
        for (field, address) in addresses {
            match parse_ip(address) {
                Ok(ip) if ip_net.contains(&ip) => (),
                Ok(_) => ret.push(ValidationError::AddressNotInCidr {
                    network,
                    field,
                    address: address.to_string(),
                    cidr: subnet.cidr.clone(),
                }),
                Err(_) => ret.push(ValidationError::InvalidAddress {
                    network,
                    field,
                    value: address.to_string(),
                }),
            }
        }
    }
    ret
}

/// Every bond needs exactly one primary interface.
pub fn check_bond_primaries(topology: &Topology) -> Vec<ValidationError> {
    let mut ret = Vec::new();
    for (role, devices) in topology.roles() {
        for node in devices.iter().flat_map(DeviceNode::descendants) {
            if let DeviceNode::Bond(bond) = node {
                let count = bond.interfaces().filter(|i| i.primary).count();
                if count != 1 {
                    ret.push(ValidationError::BondPrimaryCount {
                        role,
                        bond: bond.name.clone(),
                        count,
                    });
                }
            }
        }
    }
    ret
}

/// Every bridge needs exactly one carrier: a single interface or bond.
pub fn check_bridge_carriers(topology: &Topology) -> Vec<ValidationError> {
    let mut ret = Vec::new();
    for (role, devices) in topology.roles() {
        for node in devices.iter().flat_map(DeviceNode::descendants) {
            if let DeviceNode::Bridge(br) = node {
                let count = br.carriers().count();
                if count != 1 {
                    ret.push(ValidationError::BridgeCarrierCount {
                        role,
                        bridge: br.name.clone(),
                        count,
                    });
                }
            }
        }
    }
    ret
}
