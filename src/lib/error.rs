// SPDX-License-Identifier: Apache-2.0

use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Malformed input data: bad JSON/YAML, unknown names, bad addresses.
    InvalidArgument,
    /// Topology edit rejected: wrong parent type, deleting a role root and
    /// alike.
    InvalidTopology,
    /// One or more validator checks failed.
    ValidationFailure,
    /// The compiler hit a device it cannot render.
    CompileFailure,
    /// Persisted data was written by an incompatible schema version.
    IncompatibleVersion,
    IoFailure,
    Bug,
}

impl Default for ErrorKind {
    fn default() -> Self {
        Self::Bug
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::fmt::Display for NetIsoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)
    }
}

impl Error for NetIsoError {}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct NetIsoError {
    kind: ErrorKind,
    msg: String,
}

impl NetIsoError {
    pub fn new(kind: ErrorKind, msg: String) -> Self {
        Self { kind, msg }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        self.msg.as_str()
    }
}

impl From<serde_json::Error> for NetIsoError {
    fn from(e: serde_json::Error) -> Self {
        NetIsoError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid settings data: {e}"),
        )
    }
}

impl From<serde_yaml::Error> for NetIsoError {
    fn from(e: serde_yaml::Error) -> Self {
        NetIsoError::new(ErrorKind::Bug, format!("Failed to render YAML: {e}"))
    }
}

impl From<std::io::Error> for NetIsoError {
    fn from(e: std::io::Error) -> Self {
        NetIsoError::new(ErrorKind::IoFailure, format!("std::io::Error: {e}"))
    }
}

impl From<std::net::AddrParseError> for NetIsoError {
    fn from(e: std::net::AddrParseError) -> Self {
        NetIsoError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid IP address : {e}"),
        )
    }
}

impl From<ipnet::AddrParseError> for NetIsoError {
    fn from(e: ipnet::AddrParseError) -> Self {
        NetIsoError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid IP network : {e}"),
        )
    }
}
