// SPDX-License-Identifier: Apache-2.0

use super::template::{
    AddressConfig, NetConfig, NicConfigOutputs, NicConfigResources,
    NicConfigTemplate, OrderedMap, OsNetConfig, ParameterDecl,
    ParameterDefault, RouteConfig, StructuredConfig, StructuredConfigData,
    StructuredConfigProperties, TemplateOutput, TemplateValue,
};
use crate::{
    BondInterface, BondType, BridgeInterface, BridgeType, DeviceNode,
    ErrorKind, NetIsoError, NetworkName, NetworkParams, NicInterface, Role,
    VlanInterface,
};

const EC2_METADATA_CIDR: &str = "169.254.169.254/32";
const EXTERNAL_DEFAULT_ROUTE_CIDR: &str = "0.0.0.0/0";

/// Build the device-config document of specified role. The devices are
/// consumed, callers are expected to hand over a private copy.
pub(crate) fn gen_nic_config_template(
    role: Role,
    devices: Vec<DeviceNode>,
    params: &NetworkParams,
) -> Result<NicConfigTemplate, NetIsoError> {
    let network_config = devices
        .into_iter()
        .map(|dev| gen_top_level(role, dev, params))
        .collect::<Result<Vec<NetConfig>, NetIsoError>>()?;

    Ok(NicConfigTemplate {
        heat_template_version: params.format_version.clone(),
        description: format!(
            "Software Config to drive os-net-config to configure multiple \
            interfaces for the {} role.",
            role.description()
        ),
        parameters: gen_parameters(),
        resources: NicConfigResources {
            os_net_config_impl: StructuredConfig {
                resource_type: "OS::Heat::StructuredConfig",
                properties: StructuredConfigProperties {
                    group: "os-apply-config",
                    config: StructuredConfigData {
                        os_net_config: OsNetConfig { network_config },
                    },
                },
            },
        },
        outputs: NicConfigOutputs {
            stack_id: TemplateOutput {
                description: "The OsNetConfigImpl resource.",
                value: TemplateValue::resource("OsNetConfigImpl"),
            },
        },
    })
}

// Every role template declares the same parameter set whatever networks it
// uses, the resource registry passes all of them unconditionally.
fn gen_parameters() -> OrderedMap<ParameterDecl> {
    let mut ret = OrderedMap::new();
    ret.insert(
        "ControlPlaneIp",
        string_param("IP address/subnet on the ctlplane network", Some("")),
    );
    for network in NetworkName::ISOLATED {
        ret.insert(
            network.ip_subnet_param(),
            string_param(
                &format!("IP address/subnet on the {network} network"),
                Some(""),
            ),
        );
    }
    for (network, vlan_id) in NetworkName::ISOLATED
        .into_iter()
        .zip([10u16, 20, 30, 40, 50, 60])
    {
        ret.insert(
            network.vlan_id_param(),
            ParameterDecl {
                default: Some(ParameterDefault::Number(vlan_id)),
                description: format!(
                    "Vlan ID for the {network} network traffic."
                ),
                param_type: "number",
            },
        );
    }
    ret.insert(
        "ControlPlaneSubnetCidr",
        string_param(
            "The subnet CIDR of the control plane network.",
            Some("24"),
        ),
    );
    ret.insert(
        "ControlPlaneDefaultRoute",
        string_param(
            "The default route of the control plane network.",
            None,
        ),
    );
    ret.insert(
        "ExternalInterfaceDefaultRoute",
        string_param(
            "default route for the external network",
            Some("10.0.0.1"),
        ),
    );
    ret.insert(
        "DnsServers",
        ParameterDecl {
            default: Some(ParameterDefault::List(Vec::new())),
            description: "A list of DNS servers (2 max for some \
                implementations) that will be added to resolv.conf."
                .to_string(),
            param_type: "comma_delimited_list",
        },
    );
    ret.insert(
        "EC2MetadataIp",
        string_param("The IP address of the EC2 metadata server.", None),
    );
    ret.insert(
        "BondInterfaceOvsOptions",
        string_param(
            "The ovs_options string for the bond interface. Set things like \
            lacp=active and/or bond_mode=balance-slb using this option.",
            Some(""),
        ),
    );
    ret
}

fn string_param(description: &str, default: Option<&str>) -> ParameterDecl {
    ParameterDecl {
        default: default.map(|d| ParameterDefault::String(d.to_string())),
        description: description.to_string(),
        param_type: "string",
    }
}

fn gen_top_level(
    role: Role,
    node: DeviceNode,
    params: &NetworkParams,
) -> Result<NetConfig, NetIsoError> {
    match node {
        DeviceNode::Interface(nic) => Ok(gen_interface(role, nic, params)),
        DeviceNode::Bridge(br) => gen_bridge(role, br, params),
        other => {
            let e = NetIsoError::new(
                ErrorKind::CompileFailure,
                format!(
                    "Only interfaces and bridges are allowed at the top \
                    level of role {role}, got {}",
                    other.type_name()
                ),
            );
            log::error!("{}", e);
            Err(e)
        }
    }
}

fn gen_interface(
    role: Role,
    nic: NicInterface,
    params: &NetworkParams,
) -> NetConfig {
    if let Some(dpdk_name) = nic.dpdk_port_name.as_deref() {
        log::warn!(
            "Ignoring DPDK port {dpdk_name} of top level interface {} in \
            role {role}, DPDK ports are only supported inside bridges",
            nic.name
        );
    }
    let mut conf = NetConfig::new("interface", Some(nic.name));
    conf.use_dhcp = Some(nic.use_dhcp);
    conf.mtu = nic.mtu;
    let routes = nic.routes.into_iter().map(RouteConfig::from).collect();
    apply_network(&mut conf, role, nic.network, routes, params);
    conf
}

/// Resolve addresses and implicit routes of a top level device from its
/// network. Devices without a network get neither addresses nor routes.
fn apply_network(
    conf: &mut NetConfig,
    role: Role,
    network: NetworkName,
    user_routes: Vec<RouteConfig>,
    params: &NetworkParams,
) {
    if network.is_none() {
        if !user_routes.is_empty() {
            log::debug!(
                "Dropping routes of {} in role {role}: no network assigned",
                conf.name.as_deref().unwrap_or_default()
            );
        }
        conf.addresses.clear();
        conf.routes.clear();
        return;
    }
    conf.addresses = vec![AddressConfig::for_network(network)];
    conf.routes = implicit_routes(role, network, params);
    conf.routes.extend(user_routes);
}

fn implicit_routes(
    role: Role,
    network: NetworkName,
    params: &NetworkParams,
) -> Vec<RouteConfig> {
    let mut ret = Vec::new();
    match network {
        NetworkName::ControlPlane => {
            ret.push(RouteConfig::new(
                EC2_METADATA_CIDR,
                TemplateValue::param("EC2MetadataIp"),
            ));
            if params.auto_default_routes && role != Role::Controller {
                ret.push(RouteConfig::new_default(TemplateValue::param(
                    "ControlPlaneDefaultRoute",
                )));
            }
        }
        NetworkName::External if params.auto_default_routes => {
            ret.push(RouteConfig::new(
                EXTERNAL_DEFAULT_ROUTE_CIDR,
                TemplateValue::param("ExternalInterfaceDefaultRoute"),
            ));
        }
        _ => (),
    }
    ret
}

/// Split route pseudo-members off a member list.
fn fold_routes(
    members: Vec<DeviceNode>,
) -> (Vec<RouteConfig>, Vec<DeviceNode>) {
    let mut routes = Vec::new();
    let mut devices = Vec::new();
    for member in members {
        match member {
            DeviceNode::Route(rt) => routes.push(RouteConfig::from(rt)),
            dev => devices.push(dev),
        }
    }
    (routes, devices)
}

fn gen_bridge(
    role: Role,
    br: BridgeInterface,
    params: &NetworkParams,
) -> Result<NetConfig, NetIsoError> {
    let bond_name = br.bond_name().map(str::to_string);
    let bridge_name = br.name.clone();
    let iface_type = match br.bridge_type {
        BridgeType::Ovs => "ovs_bridge",
        BridgeType::OvsUser => "ovs_user_bridge",
    };
    let mut conf = NetConfig::new(iface_type, Some(br.name));
    conf.use_dhcp = Some(br.use_dhcp);
    if br.dns_servers {
        conf.dns_servers = Some(TemplateValue::param("DnsServers"));
    }
    conf.mtu = br.mtu;

    let (routes, members) = fold_routes(br.members);
    apply_network(&mut conf, role, br.network, routes, params);

    for member in members {
        conf.members.push(match member {
            DeviceNode::Interface(nic) => gen_port(nic),
            DeviceNode::Bond(bond) => gen_bond(role, bond)?,
            DeviceNode::Vlan(vlan) => gen_vlan(
                role,
                &bridge_name,
                vlan,
                bond_name.as_deref(),
                params,
            )?,
            other => {
                let e = NetIsoError::new(
                    ErrorKind::CompileFailure,
                    format!(
                        "Bridge {bridge_name} of role {role} cannot hold a \
                        {}",
                        other.type_name()
                    ),
                );
                log::error!("{}", e);
                return Err(e);
            }
        });
    }
    Ok(conf)
}

/// Interface enslaved to a bridge or bond: addressing belongs to the
/// master, only the name, MTU and primary flag are kept.
fn gen_port(nic: NicInterface) -> NetConfig {
    if !nic.addresses.is_empty() || !nic.routes.is_empty() {
        log::debug!(
            "Dropping addresses and routes of port interface {}",
            nic.name
        );
    }
    match nic.dpdk_port_name {
        Some(dpdk_name) => {
            let mut conf = NetConfig::new("ovs_dpdk_port", Some(dpdk_name));
            conf.mtu = nic.mtu;
            conf.members = vec![NetConfig::new("interface", Some(nic.name))];
            conf
        }
        None => {
            let mut conf = NetConfig::new("interface", Some(nic.name));
            conf.mtu = nic.mtu;
            if nic.primary {
                conf.primary = Some(true);
            }
            conf
        }
    }
}

fn gen_bond(
    role: Role,
    bond: BondInterface,
) -> Result<NetConfig, NetIsoError> {
    let (routes, members) = fold_routes(bond.members);
    let mut ports = Vec::new();
    for member in members {
        match member {
            DeviceNode::Interface(nic) => ports.push(gen_port(nic)),
            other => {
                let e = NetIsoError::new(
                    ErrorKind::CompileFailure,
                    format!(
                        "Bond {} of role {role} can only hold interfaces, \
                        got {}",
                        bond.name,
                        other.type_name()
                    ),
                );
                log::error!("{}", e);
                return Err(e);
            }
        }
    }
    if ports.len() < 2 {
        let e = NetIsoError::new(
            ErrorKind::CompileFailure,
            format!(
                "Bond {} of role {role} requires at least 2 interfaces, \
                got {}",
                bond.name,
                ports.len()
            ),
        );
        log::error!("{}", e);
        return Err(e);
    }

    let options = match bond.options {
        Some(opts) => TemplateValue::Literal(opts),
        None => TemplateValue::param("BondInterfaceOvsOptions"),
    };
    let mut conf = match bond.bond_type {
        BondType::Ovs => {
            let mut conf = NetConfig::new("ovs_bond", Some(bond.name));
            conf.ovs_options = Some(options);
            conf
        }
        BondType::Linux => {
            let mut conf = NetConfig::new("linux_bond", Some(bond.name));
            conf.bonding_options = Some(options);
            conf
        }
        BondType::Team => {
            let mut conf = NetConfig::new("team", Some(bond.name));
            conf.bonding_options = Some(options);
            conf
        }
        BondType::OvsDpdk => NetConfig::new("ovs_dpdk_bond", Some(bond.name)),
    };
    conf.mtu = bond.mtu;
    conf.routes = routes;
    conf.members = ports;
    Ok(conf)
}

fn gen_vlan(
    role: Role,
    bridge_name: &str,
    vlan: VlanInterface,
    bond_name: Option<&str>,
    params: &NetworkParams,
) -> Result<NetConfig, NetIsoError> {
    if matches!(vlan.network, NetworkName::None | NetworkName::ControlPlane) {
        let e = NetIsoError::new(
            ErrorKind::CompileFailure,
            format!(
                "VLAN of bridge {bridge_name} in role {role} should be \
                assigned to an isolated network, got {}",
                vlan.network
            ),
        );
        log::error!("{}", e);
        return Err(e);
    }
    let mut conf = NetConfig::new("vlan", None);
    conf.device = bond_name.map(str::to_string);
    conf.mtu = vlan.mtu;
    conf.vlan_id = Some(TemplateValue::param(&vlan.network.vlan_id_param()));
    conf.addresses = vec![AddressConfig::for_network(vlan.network)];
    conf.routes = implicit_routes(role, vlan.network, params);
    conf.routes.extend(vlan.routes.into_iter().map(RouteConfig::from));
    Ok(conf)
}
