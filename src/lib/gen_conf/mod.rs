// SPDX-License-Identifier: Apache-2.0

mod net_env;
mod net_iso;
mod nic_config;
mod template;

use std::collections::BTreeMap;

use crate::{DeviceNode, NetIsoError, NetworkParams, Role, Topology};

pub(crate) use self::net_env::gen_network_environment;
pub(crate) use self::net_iso::gen_network_isolation;
pub(crate) use self::nic_config::gen_nic_config_template;

pub const NIC_CONFIG_DIR: &str = "nic-configs";
pub const NETWORK_ENVIRONMENT_FILE: &str = "network-environment.yaml";
pub const NETWORK_ISOLATION_FILE: &str = "network-isolation.yaml";
pub const NETWORK_ISOLATION_ABSOLUTE_FILE: &str =
    "network-isolation-absolute.yaml";

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
/// Where the network isolation documents expect the Heat template tree.
pub struct GenConfOptions {
    /// Prefix used by `network-isolation.yaml`, relative to the output
    /// directory. Should end with `/`.
    pub relative_template_root: String,
    /// Prefix used by `network-isolation-absolute.yaml`. Should end with
    /// `/`.
    pub absolute_template_root: String,
}

impl Default for GenConfOptions {
    fn default() -> Self {
        Self {
            relative_template_root: "../".to_string(),
            absolute_template_root:
                "/usr/share/openstack-tripleo-heat-templates/".to_string(),
        }
    }
}

impl GenConfOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
/// Rendered YAML documents.
pub struct Templates {
    pub nic_configs: BTreeMap<Role, String>,
    pub network_environment: String,
    pub network_isolation: String,
    pub network_isolation_absolute: String,
}

impl Templates {
    /// Every document as `(path_relative_to_output_dir, content)` in a
    /// stable order.
    pub fn files(&self) -> Vec<(String, &str)> {
        let mut ret: Vec<(String, &str)> = self
            .nic_configs
            .iter()
            .map(|(role, content)| {
                (
                    format!("{NIC_CONFIG_DIR}/{}", role.file_name()),
                    content.as_str(),
                )
            })
            .collect();
        ret.push((
            NETWORK_ENVIRONMENT_FILE.to_string(),
            self.network_environment.as_str(),
        ));
        ret.push((
            NETWORK_ISOLATION_FILE.to_string(),
            self.network_isolation.as_str(),
        ));
        ret.push((
            NETWORK_ISOLATION_ABSOLUTE_FILE.to_string(),
            self.network_isolation_absolute.as_str(),
        ));
        ret
    }
}

/// Render every template document out of the device topology and network
/// registry. Neither input is modified. No validation is done here, see
/// [crate::validate()].
pub fn compile(
    topology: &Topology,
    params: &NetworkParams,
    options: &GenConfOptions,
) -> Result<Templates, NetIsoError> {
    let roles: BTreeMap<Role, Vec<DeviceNode>> = topology.clone().into();
    let mut nic_configs = BTreeMap::new();
    for (role, devices) in roles {
        log::debug!("Compiling nic config of role {role}");
        let doc = gen_nic_config_template(role, devices, params)?;
        nic_configs.insert(role, serde_yaml::to_string(&doc)?);
    }

    let network_environment =
        serde_yaml::to_string(&gen_network_environment(topology, params))?;
    let network_isolation = serde_yaml::to_string(&gen_network_isolation(
        topology,
        params,
        &options.relative_template_root,
    ))?;
    let network_isolation_absolute =
        serde_yaml::to_string(&gen_network_isolation(
            topology,
            params,
            &options.absolute_template_root,
        ))?;

    Ok(Templates {
        nic_configs,
        network_environment,
        network_isolation,
        network_isolation_absolute,
    })
}

impl Topology {
    /// Shortcut of [compile()].
    pub fn gen_conf(
        &self,
        params: &NetworkParams,
        options: &GenConfOptions,
    ) -> Result<Templates, NetIsoError> {
        compile(self, params, options)
    }
}
