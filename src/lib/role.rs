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
)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
/// Class of cluster node sharing one device-config template.
///
/// Serialize and deserialize to/from the identifier used as nic-config file
/// name, e.g. `ceph-storage`.
pub enum Role {
    Controller,
    Compute,
    CephStorage,
    CinderStorage,
    SwiftStorage,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Self::Controller,
        Self::Compute,
        Self::CephStorage,
        Self::CinderStorage,
        Self::SwiftStorage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Compute => "compute",
            Self::CephStorage => "ceph-storage",
            Self::CinderStorage => "cinder-storage",
            Self::SwiftStorage => "swift-storage",
        }
    }

    /// File name of the role's device-config document under `nic-configs/`.
    pub fn file_name(&self) -> String {
        format!("{}.yaml", self.as_str())
    }

    /// Role name as used in the orchestration engine's resource registry.
    pub fn template_name(&self) -> &'static str {
        match self {
            Self::Controller => "Controller",
            Self::Compute => "Compute",
            Self::CephStorage => "CephStorage",
            Self::CinderStorage => "BlockStorage",
            Self::SwiftStorage => "SwiftStorage",
        }
    }

    pub(crate) fn description(&self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Compute => "compute",
            Self::CephStorage => "ceph storage",
            Self::CinderStorage => "block storage",
            Self::SwiftStorage => "object storage",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = NetIsoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_suffix(".yaml").unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s || r.template_name() == s)
            .ok_or_else(|| {
                NetIsoError::new(
                    ErrorKind::InvalidArgument,
                    format!(
                        "Unknown role {s}, should be one of controller, \
                        compute, ceph-storage, cinder-storage, swift-storage"
                    ),
                )
            })
    }
}
