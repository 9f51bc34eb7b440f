// SPDX-License-Identifier: Apache-2.0

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{NetworkName, RouteEntry};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
/// Value of a template property: either a literal or an intrinsic function
/// resolved by the orchestration engine.
pub(crate) enum TemplateValue {
    Literal(String),
    Intrinsic(Intrinsic),
}

/// Heat intrinsic function, rendered as a single-key mapping such as
/// `{get_param: Name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Intrinsic {
    GetParam(String),
    GetResource(String),
    ListJoin(String, Vec<TemplateValue>),
}

impl Serialize for Intrinsic {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::GetParam(name) => map.serialize_entry("get_param", name)?,
            Self::GetResource(name) => {
                map.serialize_entry("get_resource", name)?
            }
            Self::ListJoin(delimiter, values) => {
                map.serialize_entry("list_join", &(delimiter, values))?
            }
        }
        map.end()
    }
}

impl TemplateValue {
    pub(crate) fn param(name: &str) -> Self {
        Self::Intrinsic(Intrinsic::GetParam(name.to_string()))
    }

    pub(crate) fn resource(name: &str) -> Self {
        Self::Intrinsic(Intrinsic::GetResource(name.to_string()))
    }

    pub(crate) fn join(delimiter: &str, values: Vec<TemplateValue>) -> Self {
        Self::Intrinsic(Intrinsic::ListJoin(delimiter.to_string(), values))
    }
}

/// Mapping which keeps insertion order when serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderedMap<V>(Vec<(String, V)>);

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> OrderedMap<V> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: V) {
        self.0.push((key.into(), value));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct AddressConfig {
    pub(crate) ip_netmask: TemplateValue,
}

impl AddressConfig {
    /// Address of a device attached to specified network. The control
    /// plane address is assembled from the node IP and the subnet netmask.
    pub(crate) fn for_network(network: NetworkName) -> Self {
        let ip_netmask = if network == NetworkName::ControlPlane {
            TemplateValue::join(
                "/",
                vec![
                    TemplateValue::param("ControlPlaneIp"),
                    TemplateValue::param("ControlPlaneSubnetCidr"),
                ],
            )
        } else {
            TemplateValue::param(&network.ip_subnet_param())
        };
        Self { ip_netmask }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct RouteConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) default: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ip_netmask: Option<String>,
    pub(crate) next_hop: TemplateValue,
}

impl RouteConfig {
    pub(crate) fn new(ip_netmask: &str, next_hop: TemplateValue) -> Self {
        Self {
            default: None,
            ip_netmask: Some(ip_netmask.to_string()),
            next_hop,
        }
    }

    pub(crate) fn new_default(next_hop: TemplateValue) -> Self {
        Self {
            default: Some(true),
            ip_netmask: None,
            next_hop,
        }
    }
}

impl From<RouteEntry> for RouteConfig {
    fn from(rt: RouteEntry) -> Self {
        let next_hop = TemplateValue::Literal(rt.next_hop);
        if rt.default {
            Self::new_default(next_hop)
        } else {
            Self {
                default: None,
                ip_netmask: Some(rt.ip_netmask),
                next_hop,
            }
        }
    }
}

// Field order is the rendered key order: `type` and `name` first, then
// alphabetical, then `addresses`, `routes` and `members`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
/// One os-net-config device entry.
pub(crate) struct NetConfig {
    #[serde(rename = "type")]
    pub(crate) iface_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) bonding_options: Option<TemplateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) dns_servers: Option<TemplateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) ovs_options: Option<TemplateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) primary: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) use_dhcp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) vlan_id: Option<TemplateValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) addresses: Vec<AddressConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) routes: Vec<RouteConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) members: Vec<NetConfig>,
}

impl NetConfig {
    pub(crate) fn new(iface_type: &'static str, name: Option<String>) -> Self {
        Self {
            iface_type,
            name,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub(crate) enum ParameterDefault {
    String(String),
    Number(u16),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ParameterDecl {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) default: Option<ParameterDefault>,
    pub(crate) description: String,
    #[serde(rename = "type")]
    pub(crate) param_type: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct OsNetConfig {
    pub(crate) network_config: Vec<NetConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StructuredConfigData {
    pub(crate) os_net_config: OsNetConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StructuredConfigProperties {
    pub(crate) group: &'static str,
    pub(crate) config: StructuredConfigData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct StructuredConfig {
    #[serde(rename = "type")]
    pub(crate) resource_type: &'static str,
    pub(crate) properties: StructuredConfigProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NicConfigResources {
    #[serde(rename = "OsNetConfigImpl")]
    pub(crate) os_net_config_impl: StructuredConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct TemplateOutput {
    pub(crate) description: &'static str,
    pub(crate) value: TemplateValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NicConfigOutputs {
    #[serde(rename = "OS::stack_id")]
    pub(crate) stack_id: TemplateOutput,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Device-config template of one role.
pub(crate) struct NicConfigTemplate {
    pub(crate) heat_template_version: String,
    pub(crate) description: String,
    pub(crate) parameters: OrderedMap<ParameterDecl>,
    pub(crate) resources: NicConfigResources,
    pub(crate) outputs: NicConfigOutputs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct AllocationPool {
    pub(crate) start: String,
    pub(crate) end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub(crate) enum EnvValue {
    String(String),
    Number(u16),
    List(Vec<String>),
    Pools(Vec<AllocationPool>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NetworkEnvironment {
    pub(crate) resource_registry: OrderedMap<String>,
    pub(crate) parameter_defaults: OrderedMap<EnvValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct NetworkIsolation {
    pub(crate) resource_registry: OrderedMap<String>,
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub(crate) parameter_defaults: OrderedMap<bool>,
}
