// SPDX-License-Identifier: Apache-2.0

use super::template::{
    AllocationPool, EnvValue, NetworkEnvironment, OrderedMap,
};
use crate::{NetworkName, NetworkParams, Role, Topology};

pub(crate) fn gen_network_environment(
    topology: &Topology,
    params: &NetworkParams,
) -> NetworkEnvironment {
    let mut resource_registry = OrderedMap::new();
    for role in Role::ALL {
        resource_registry.insert(
            format!(
                "OS::TripleO::{}::Net::SoftwareConfig",
                role.template_name()
            ),
            format!("nic-configs/{}", role.file_name()),
        );
    }

    let mut defaults = OrderedMap::new();
    if topology.is_network_used(NetworkName::ControlPlane) {
        let cp = &params.control_plane;
        defaults.insert(
            "ControlPlaneSubnetCidr",
            EnvValue::String(cp.mask_length.to_string()),
        );
        defaults.insert(
            "ControlPlaneDefaultRoute",
            EnvValue::String(cp.default_route.clone()),
        );
        defaults.insert(
            "EC2MetadataIp",
            EnvValue::String(cp.ec2_metadata_ip.clone()),
        );
    }
    for network in NetworkName::ISOLATED {
        if !topology.is_network_used(network) {
            continue;
        }
        let subnet = match params.subnet(network) {
            Some(s) => s,
            None => continue,
        };
        defaults.insert(
            network.cidr_param(),
            EnvValue::String(subnet.cidr.clone()),
        );
        defaults.insert(
            network.allocation_pools_param(),
            EnvValue::Pools(vec![AllocationPool {
                start: subnet.range_start.clone(),
                end: subnet.range_end.clone(),
            }]),
        );
        if network == NetworkName::External {
            defaults.insert(
                "ExternalInterfaceDefaultRoute",
                EnvValue::String(params.external.gateway.clone()),
            );
        }
        // Untagged networks keep the template default
        if topology.is_network_used_on_vlan(network) {
            defaults.insert(
                network.vlan_id_param(),
                EnvValue::Number(subnet.vlan_id),
            );
        }
        if network == NetworkName::External {
            defaults.insert(
                "NeutronExternalNetworkBridge",
                EnvValue::String(params.external.bridge_name.clone()),
            );
        }
    }
    defaults.insert("DnsServers", EnvValue::List(params.dns_servers.to_vec()));
    if !params.bond_options.is_empty() {
        defaults.insert(
            "BondInterfaceOvsOptions",
            EnvValue::String(params.bond_options.clone()),
        );
    }

    NetworkEnvironment {
        resource_registry,
        parameter_defaults: defaults,
    }
}
