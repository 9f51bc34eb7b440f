// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    compile, persist::save, validate, GenConfOptions, NetIsoError,
    NetworkParams, Templates, Topology,
};

pub const SETTINGS_FILE: &str = "netiso-settings.json";
pub const README_FILE: &str = "README";

const README: &str = "\
Network isolation templates

nic-configs/<role>.yaml
    os-net-config device layout of each role.
network-environment.yaml
    Maps every role onto its nic-config and sets the network parameters.
network-isolation.yaml
    Enables the isolated networks in use. Template paths are relative to
    this directory: place it below the Heat template tree.
network-isolation-absolute.yaml
    Same as network-isolation.yaml with absolute template paths.
netiso-settings.json
    Settings these files were generated from. Point netisoctl at this
    directory to load them again.

Deploy with:
    openstack overcloud deploy --templates \\
        -e network-isolation.yaml -e network-environment.yaml
";

/// Validate, compile and write every document into `output_dir`.
/// Nothing is written when any step fails.
pub fn generate(
    output_dir: &Path,
    topology: &Topology,
    params: &NetworkParams,
    options: &GenConfOptions,
) -> Result<Vec<PathBuf>, NetIsoError> {
    validate(topology, params)?;
    let templates = compile(topology, params, options)?;
    write_templates(output_dir, &templates, topology, params)
}

/// Write the compiled documents along with the settings blob and a README.
///
/// Files are first written into a staging directory inside `output_dir`
/// then moved into place, so a failed write leaves previous output intact.
/// Returns the written file paths.
pub fn write_templates(
    output_dir: &Path,
    templates: &Templates,
    topology: &Topology,
    params: &NetworkParams,
) -> Result<Vec<PathBuf>, NetIsoError> {
    let settings = save(topology, params)?;
    let mut files = templates.files();
    files.push((SETTINGS_FILE.to_string(), settings.as_str()));
    files.push((README_FILE.to_string(), README));

    fs::create_dir_all(output_dir)?;
    let staging_dir = output_dir
        .join(format!(".netiso-staging-{}", uuid::Uuid::new_v4()));
    log::debug!("Staging generated files in {}", staging_dir.display());

    if let Err(e) = stage_files(&staging_dir, &files) {
        log::error!("Failed to write generated files: {e}");
        remove_staging_dir(&staging_dir);
        return Err(e);
    }

    let mut ret = Vec::new();
    for (rel_path, _) in &files {
        let dst = output_dir.join(rel_path);
        if let Err(e) = move_into_place(&staging_dir.join(rel_path), &dst) {
            log::error!("Failed to move {} into place: {e}", dst.display());
            remove_staging_dir(&staging_dir);
            return Err(e);
        }
        log::info!("Wrote {}", dst.display());
        ret.push(dst);
    }
    remove_staging_dir(&staging_dir);
    Ok(ret)
}

fn stage_files(
    staging_dir: &Path,
    files: &[(String, &str)],
) -> Result<(), NetIsoError> {
    for (rel_path, content) in files {
        let path = staging_dir.join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
    }
    Ok(())
}

fn move_into_place(src: &Path, dst: &Path) -> Result<(), NetIsoError> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(src, dst)?;
    Ok(())
}

fn remove_staging_dir(staging_dir: &Path) {
    if let Err(e) = fs::remove_dir_all(staging_dir) {
        log::warn!(
            "Failed to remove staging directory {}: {e}",
            staging_dir.display()
        );
    }
}
