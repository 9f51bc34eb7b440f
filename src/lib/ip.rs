// SPDX-License-Identifier: Apache-2.0

use std::net::IpAddr;
use std::str::FromStr;

use crate::{ErrorKind, NetIsoError};

/// Parse `<address>/<prefix>`, host bits are dropped: `10.0.0.5/24` turns
/// into `10.0.0.0/24`.
pub(crate) fn parse_cidr(cidr: &str) -> Result<ipnet::IpNet, NetIsoError> {
    let cidr = cidr.trim();
    if !cidr.contains('/') {
        let e = NetIsoError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid CIDR {cidr}: missing prefix length"),
        );
        log::error!("{}", e);
        return Err(e);
    }
    let ip_net = ipnet::IpNet::from_str(cidr).map_err(|parse_error| {
        let e = NetIsoError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid CIDR {cidr}: {parse_error}"),
        );
        log::error!("{}", e);
        e
    })?;
    Ok(ip_net.trunc())
}

pub(crate) fn parse_ip(addr: &str) -> Result<IpAddr, NetIsoError> {
    IpAddr::from_str(addr.trim()).map_err(|parse_error| {
        let e = NetIsoError::new(
            ErrorKind::InvalidArgument,
            format!("Invalid IP address {addr}: {parse_error}"),
        );
        log::error!("{}", e);
        e
    })
}

/// Two networks overlap when either one contains the other. Networks of
/// different address families never overlap.
pub(crate) fn is_cidr_overlap(a: &ipnet::IpNet, b: &ipnet::IpNet) -> bool {
    a.contains(b) || b.contains(a)
}
