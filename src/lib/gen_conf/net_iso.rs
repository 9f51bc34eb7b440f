// SPDX-License-Identifier: Apache-2.0

use super::template::{NetworkIsolation, OrderedMap};
use crate::{NetworkName, NetworkParams, Role, Topology};

const IPV6_SERVICE_FLAGS: [&str; 6] = [
    "CephIPv6",
    "CorosyncIPv6",
    "MongoDbIPv6",
    "NovaIPv6",
    "RabbitIPv6",
    "MemcachedIPv6",
];

/// Map network and port resources of every used isolated network onto the
/// Heat template tree found at `template_root`.
pub(crate) fn gen_network_isolation(
    topology: &Topology,
    params: &NetworkParams,
    template_root: &str,
) -> NetworkIsolation {
    let basename = |network: NetworkName| -> String {
        if params.ipv6 {
            network.template_basename_v6()
        } else {
            network.template_basename().to_string()
        }
    };
    let mut registry = OrderedMap::new();

    if topology.is_network_used(NetworkName::InternalApi) {
        let vip = if params.ipv6 { "vip_v6" } else { "vip" };
        let vip_path = format!("{template_root}network/ports/{vip}.yaml");
        registry.insert(
            "OS::TripleO::Network::Ports::RedisVipPort",
            vip_path.clone(),
        );
        registry.insert(
            "OS::TripleO::Controller::Ports::RedisVipPort",
            vip_path,
        );
    }

    for network in NetworkName::ISOLATED {
        if !topology.is_network_used(network) {
            continue;
        }
        let base = basename(network);
        let port_path = format!("{template_root}network/ports/{base}.yaml");
        registry.insert(
            format!("OS::TripleO::Network::{network}"),
            format!("{template_root}network/{base}.yaml"),
        );
        registry.insert(
            format!("OS::TripleO::Network::Ports::{network}VipPort"),
            port_path.clone(),
        );
        for role in Role::ALL {
            if topology.is_network_used_by_role(network, role) {
                registry.insert(
                    format!(
                        "OS::TripleO::{}::Ports::{network}Port",
                        role.template_name()
                    ),
                    port_path.clone(),
                );
            }
        }
    }

    let mut defaults = OrderedMap::new();
    if params.ipv6 {
        for flag in IPV6_SERVICE_FLAGS {
            defaults.insert(flag, true);
        }
    }

    NetworkIsolation {
        resource_registry: registry,
        parameter_defaults: defaults,
    }
}
