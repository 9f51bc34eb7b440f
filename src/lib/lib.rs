// SPDX-License-Identifier: Apache-2.0

//! Network isolation template generator.
//!
//! Model the NIC layout of every overcloud role as a device tree
//! ([Topology]), describe the addressing of each isolated network
//! ([NetworkParams]), then [generate()] the os-net-config nic-configs and
//! the Heat environment files enabling network isolation:
//!
//! ```no_run
//! use std::path::Path;
//!
//! use netiso::{
//!     generate, GenConfOptions, NetIsoError, NetworkName, NetworkParams,
//!     NodePath, Role, Topology,
//! };
//!
//! fn main() -> Result<(), NetIsoError> {
//!     let mut topology = Topology::new();
//!     let nic1 = topology.add_interface(&NodePath::root(Role::Compute))?;
//!     topology.set_network(&nic1, NetworkName::ControlPlane)?;
//!     generate(
//!         Path::new("templates"),
//!         &topology,
//!         &NetworkParams::new(),
//!         &GenConfOptions::new(),
//!     )?;
//!     Ok(())
//! }
//! ```

mod deserializer;
mod device;
mod error;
mod gen_conf;
mod ip;
mod network;
mod params;
mod persist;
mod role;
mod serializer;
mod topology;
mod validate;
mod writer;

#[cfg(test)]
mod unit_tests;

pub use crate::device::{
    BondInterface, BondType, BridgeInterface, BridgeType, DeviceNode,
    NicInterface, RouteEntry, VlanInterface,
};
pub use crate::error::{ErrorKind, NetIsoError};
pub use crate::gen_conf::{
    compile, GenConfOptions, Templates, NETWORK_ENVIRONMENT_FILE,
    NETWORK_ISOLATION_ABSOLUTE_FILE, NETWORK_ISOLATION_FILE, NIC_CONFIG_DIR,
};
pub use crate::network::NetworkName;
pub use crate::params::{
    ControlPlaneParams, ExternalParams, NetworkParams, SubnetParams,
};
pub use crate::persist::{
    load, save, SETTINGS_MAJOR_VERSION, SETTINGS_MINOR_VERSION,
};
pub use crate::role::Role;
pub use crate::topology::{NodePath, Topology};
pub use crate::validate::{
    check_bond_primaries, check_bridge_carriers, check_duplicate_bonds,
    check_duplicate_networks, check_duplicate_nics, check_duplicate_vlans,
    check_ips_in_cidr, check_overlapping_cidrs, validate, ValidationError,
};
pub use crate::writer::{
    generate, write_templates, README_FILE, SETTINGS_FILE,
};
