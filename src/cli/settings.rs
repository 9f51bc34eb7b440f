// SPDX-License-Identifier: Apache-2.0

use std::io::Read;
use std::path::{Path, PathBuf};

use netiso::{NetworkParams, Topology, SETTINGS_FILE};

use crate::error::CliError;

/// Settings file behind `file_path`: a generated output directory resolves
/// to the settings blob written into it.
pub(crate) fn settings_path(file_path: &str) -> PathBuf {
    let path = Path::new(file_path);
    if path.is_dir() {
        path.join(SETTINGS_FILE)
    } else {
        path.to_path_buf()
    }
}

pub(crate) fn settings_from_file(
    file_path: &str,
) -> Result<(Topology, NetworkParams), CliError> {
    let mut content = String::new();
    if file_path == "-" {
        std::io::stdin().read_to_string(&mut content)?;
    } else {
        let path = settings_path(file_path);
        log::debug!("Loading settings from {}", path.display());
        std::fs::File::open(&path)
            .map_err(|e| {
                CliError::from(format!(
                    "Failed to open {}: {e}",
                    path.display()
                ))
            })?
            .read_to_string(&mut content)?;
    };
    Ok(netiso::load(&content)?)
}

pub(crate) fn settings_to_file(
    file_path: &str,
    topology: &Topology,
    params: &NetworkParams,
) -> Result<(), CliError> {
    let path = settings_path(file_path);
    std::fs::write(&path, netiso::save(topology, params)?).map_err(|e| {
        CliError::from(format!("Failed to write {}: {e}", path.display()))
    })?;
    log::info!("Settings saved to {}", path.display());
    Ok(())
}

pub(crate) fn init(file_path: &str, force: bool) -> Result<String, CliError> {
    let path = settings_path(file_path);
    if path.exists() && !force {
        return Err(CliError::from(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }
    settings_to_file(file_path, &Topology::new(), &NetworkParams::new())?;
    Ok(path.display().to_string())
}

pub(crate) fn format(file_path: &str) -> Result<String, CliError> {
    let (topology, params) = settings_from_file(file_path)?;
    Ok(netiso::save(&topology, &params)?.trim_end().to_string())
}
