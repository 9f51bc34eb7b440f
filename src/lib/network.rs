// SPDX-License-Identifier: Apache-2.0

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ErrorKind, NetIsoError};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Default,
)]
#[non_exhaustive]
/// Logical traffic class a device can be attached to.
///
/// Serialize and deserialize to/from the Heat parameter prefix, for example
/// `InternalApi`. [NetworkName::None] means the device is not isolated onto
/// any network.
pub enum NetworkName {
    #[default]
    None,
    ControlPlane,
    External,
    InternalApi,
    Storage,
    StorageMgmt,
    Tenant,
    Management,
}

impl NetworkName {
    /// Every assignable network, in catalog order.
    pub const ALL: [NetworkName; 7] = [
        Self::ControlPlane,
        Self::External,
        Self::InternalApi,
        Self::Storage,
        Self::StorageMgmt,
        Self::Tenant,
        Self::Management,
    ];

    /// Networks which get their own Heat network resource and ports. The
    /// control plane is owned by the provisioning node and never isolated.
    pub const ISOLATED: [NetworkName; 6] = [
        Self::External,
        Self::InternalApi,
        Self::Storage,
        Self::StorageMgmt,
        Self::Tenant,
        Self::Management,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::ControlPlane => "ControlPlane",
            Self::External => "External",
            Self::InternalApi => "InternalApi",
            Self::Storage => "Storage",
            Self::StorageMgmt => "StorageMgmt",
            Self::Tenant => "Tenant",
            Self::Management => "Management",
        }
    }

    pub fn is_none(&self) -> bool {
        *self == Self::None
    }

    /// Base file name of the network and port templates shipped with the
    /// Heat template tree, e.g. `storage_mgmt`.
    pub fn template_basename(&self) -> &'static str {
        match self {
            Self::None => "noop",
            Self::ControlPlane => "ctlplane",
            Self::External => "external",
            Self::InternalApi => "internal_api",
            Self::Storage => "storage",
            Self::StorageMgmt => "storage_mgmt",
            Self::Tenant => "tenant",
            Self::Management => "management",
        }
    }

    /// Same as [NetworkName::template_basename] but pointing at the IPv6
    /// flavour. Tenant networks have no IPv6 template.
    pub fn template_basename_v6(&self) -> String {
        match self {
            Self::Tenant => self.template_basename().to_string(),
            _ => format!("{}_v6", self.template_basename()),
        }
    }

    pub(crate) fn ip_subnet_param(&self) -> String {
        format!("{}IpSubnet", self.as_str())
    }

    pub(crate) fn vlan_id_param(&self) -> String {
        format!("{}NetworkVlanID", self.as_str())
    }

    pub(crate) fn cidr_param(&self) -> String {
        format!("{}NetCidr", self.as_str())
    }

    pub(crate) fn allocation_pools_param(&self) -> String {
        format!("{}AllocationPools", self.as_str())
    }
}

impl std::fmt::Display for NetworkName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NetworkName {
    type Err = NetIsoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        std::iter::once(Self::None)
            .chain(Self::ALL)
            .find(|n| n.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                NetIsoError::new(
                    ErrorKind::InvalidArgument,
                    format!(
                        "Unknown network {s}, should be one of None, \
                        ControlPlane, External, InternalApi, Storage, \
                        StorageMgmt, Tenant, Management"
                    ),
                )
            })
    }
}
