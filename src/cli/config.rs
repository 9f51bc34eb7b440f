// SPDX-License-Identifier: Apache-2.0

use std::io::Read;

use netiso::GenConfOptions;
use serde::Deserialize;

use crate::error::CliError;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) gen: GenConfig,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenConfig {
    /// Heat template tree referenced by `network-isolation-absolute.yaml`.
    #[serde(default)]
    pub(crate) absolute_template_root: Option<String>,
    /// Heat template tree referenced by `network-isolation.yaml`, relative
    /// to the output directory.
    #[serde(default)]
    pub(crate) relative_template_root: Option<String>,
}

impl Config {
    pub(crate) const DEFAULT_CONFIG_PATH: &'static str =
        "/etc/netiso/netiso.conf";

    pub(crate) fn load(path: &str) -> Result<Self, CliError> {
        let path = std::path::Path::new(path);
        if !path.exists() {
            return Ok(Config::default());
        }
        let mut fd = std::fs::File::open(path)?;
        let mut content = String::new();
        fd.read_to_string(&mut content)?;
        Self::from_toml(&content).map_err(|e| {
            CliError::from(format!(
                "Failed to read configuration from {}: {e}",
                path.display()
            ))
        })
    }

    fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        let config = toml::from_str::<Config>(content)?;
        log::info!("Configuration loaded:\n{content}");
        Ok(config)
    }

    pub(crate) fn gen_conf_options(&self) -> GenConfOptions {
        let mut opts = GenConfOptions::new();
        if let Some(root) = self.gen.absolute_template_root.as_deref() {
            opts.absolute_template_root = with_trailing_slash(root);
        }
        if let Some(root) = self.gen.relative_template_root.as_deref() {
            opts.relative_template_root = with_trailing_slash(root);
        }
        opts
    }
}

fn with_trailing_slash(path: &str) -> String {
    if path.is_empty() || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}
