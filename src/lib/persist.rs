// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    params::DEFAULT_FORMAT_VERSION, ErrorKind, NetIsoError, NetworkParams,
    Topology,
};

/// Schema major version of the settings blob. Blobs of another major
/// version are refused.
pub const SETTINGS_MAJOR_VERSION: u64 = 0;
/// Schema minor version written by [save()]. Older minor versions are
/// upgraded on [load()].
pub const SETTINGS_MINOR_VERSION: u64 = 5;

#[derive(Serialize)]
struct SettingsRef<'a> {
    major: u64,
    minor: u64,
    roles: &'a Topology,
    networks: &'a NetworkParams,
}

#[derive(Deserialize)]
struct Settings {
    roles: Topology,
    networks: NetworkParams,
}

/// Serialize topology and network registry into the versioned JSON
/// settings blob.
pub fn save(
    topology: &Topology,
    params: &NetworkParams,
) -> Result<String, NetIsoError> {
    let mut ret = serde_json::to_string_pretty(&SettingsRef {
        major: SETTINGS_MAJOR_VERSION,
        minor: SETTINGS_MINOR_VERSION,
        roles: topology,
        networks: params,
    })
    .map_err(|e| {
        NetIsoError::new(
            ErrorKind::Bug,
            format!("Failed to serialize settings: {e}"),
        )
    })?;
    ret.push('\n');
    Ok(ret)
}

/// Load a settings blob written by [save()] of this or any older minor
/// version.
pub fn load(content: &str) -> Result<(Topology, NetworkParams), NetIsoError> {
    let mut value: Value = serde_json::from_str(content)?;
    let (major, minor) = version_of(&value)?;
    if major != SETTINGS_MAJOR_VERSION || minor > SETTINGS_MINOR_VERSION {
        let e = NetIsoError::new(
            ErrorKind::IncompatibleVersion,
            format!(
                "Settings version {major}.{minor} is not supported, \
                supported versions are {SETTINGS_MAJOR_VERSION}.0 up to \
                {SETTINGS_MAJOR_VERSION}.{SETTINGS_MINOR_VERSION}"
            ),
        );
        log::error!("{}", e);
        return Err(e);
    }
    for from in minor..SETTINGS_MINOR_VERSION {
        log::info!(
            "Upgrading settings from version {major}.{from} to {major}.{}",
            from + 1
        );
        upgrade(&mut value, from + 1)?;
    }
    let settings: Settings = serde_json::from_value(value)?;
    Ok((settings.roles, settings.networks))
}

fn version_of(value: &Value) -> Result<(u64, u64), NetIsoError> {
    let get = |key: &str| {
        value.get(key).and_then(Value::as_u64).ok_or_else(|| {
            NetIsoError::new(
                ErrorKind::InvalidArgument,
                format!("Settings data has no valid '{key}' version"),
            )
        })
    };
    Ok((get("major")?, get("minor")?))
}

fn upgrade(value: &mut Value, to_minor: u64) -> Result<(), NetIsoError> {
    match to_minor {
        // 0.0 and 0.1 share the baseline schema
        1 => (),
        // 0.1 had no MTU support
        2 => for_each_device(value, &mut |dev: &mut Map<String, Value>| {
            if dev.get("type").and_then(Value::as_str) != Some("route") {
                set_absent(dev, "mtu", Value::from(-1));
            }
        }),
        3 => for_each_device(value, &mut |dev: &mut Map<String, Value>| {
            if dev.get("type").and_then(Value::as_str) == Some("bond") {
                set_absent(dev, "bond_type", Value::from("ovs"));
                set_absent(dev, "options", Value::Null);
            }
        }),
        4 => for_each_device(value, &mut |dev: &mut Map<String, Value>| {
            if dev.get("type").and_then(Value::as_str) == Some("bridge") {
                set_absent(dev, "bridge_type", Value::from("ovs"));
            }
        }),
        5 => {
            for_each_device(value, &mut |dev: &mut Map<String, Value>| {
                if dev.get("type").and_then(Value::as_str) == Some("interface")
                {
                    set_absent(dev, "dpdk_port_name", Value::Null);
                }
            });
            let networks = value
                .get_mut("networks")
                .and_then(Value::as_object_mut)
                .ok_or_else(|| {
                    NetIsoError::new(
                        ErrorKind::InvalidArgument,
                        "Settings data has no 'networks' section".to_string(),
                    )
                })?;
            set_absent(networks, "auto_default_routes", Value::Bool(true));
            set_absent(networks, "ipv6", Value::Bool(false));
            set_absent(networks, "bond_options", Value::from(""));
            set_absent(
                networks,
                "format_version",
                Value::from(DEFAULT_FORMAT_VERSION),
            );
        }
        _ => {
            return Err(NetIsoError::new(
                ErrorKind::Bug,
                format!("No upgrade path to settings minor version {to_minor}"),
            ));
        }
    }
    if let Some(obj) = value.as_object_mut() {
        obj.insert("minor".to_string(), Value::from(to_minor));
    }
    Ok(())
}

fn set_absent(obj: &mut Map<String, Value>, key: &str, default: Value) {
    if !obj.contains_key(key) {
        obj.insert(key.to_string(), default);
    }
}

fn for_each_device(
    value: &mut Value,
    f: &mut dyn FnMut(&mut Map<String, Value>),
) {
    if let Some(roles) = value.get_mut("roles").and_then(Value::as_object_mut) {
        for devices in roles.values_mut() {
            for_each_in_list(devices, f);
        }
    }
}

fn for_each_in_list(
    devices: &mut Value,
    f: &mut dyn FnMut(&mut Map<String, Value>),
) {
    if let Some(devices) = devices.as_array_mut() {
        for dev in devices.iter_mut().filter_map(Value::as_object_mut) {
            f(dev);
            if let Some(members) = dev.get_mut("members") {
                for_each_in_list(members, f);
            }
        }
    }
}
