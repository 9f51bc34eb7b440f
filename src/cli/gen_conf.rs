// SPDX-License-Identifier: Apache-2.0

use std::path::Path;
use std::str::FromStr;

use netiso::{compile, generate, validate, NetIsoError, Role};

use crate::{
    config::Config,
    error::{CliError, EX_DATAERR},
    settings::settings_from_file,
};

fn load_config(matches: &clap::ArgMatches) -> Result<Config, CliError> {
    Config::load(
        matches
            .value_of("CONFIG")
            .unwrap_or(Config::DEFAULT_CONFIG_PATH),
    )
}

pub(crate) fn gen_conf(matches: &clap::ArgMatches) -> Result<String, CliError> {
    let file_path = matches
        .value_of("SETTINGS_FILE")
        .ok_or("Please define SETTINGS_FILE")?;
    let out_dir = matches
        .value_of("OUTPUT_DIR")
        .ok_or("Please define OUTPUT_DIR")?;
    let config = load_config(matches)?;
    let (topology, params) = settings_from_file(file_path)?;

    let files = generate(
        Path::new(out_dir),
        &topology,
        &params,
        &config.gen_conf_options(),
    )?;
    Ok(files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<String>>()
        .join("\n"))
}

pub(crate) fn show(matches: &clap::ArgMatches) -> Result<String, CliError> {
    let file_path = matches
        .value_of("SETTINGS_FILE")
        .ok_or("Please define SETTINGS_FILE")?;
    let role = match matches.value_of("ROLE") {
        Some(r) => Some(Role::from_str(r)?),
        None => None,
    };
    let config = load_config(matches)?;
    let (topology, params) = settings_from_file(file_path)?;
    validate(&topology, &params).map_err(NetIsoError::from)?;
    let templates = compile(&topology, &params, &config.gen_conf_options())?;

    if let Some(role) = role {
        return templates
            .nic_configs
            .get(&role)
            .map(|c| c.trim_end().to_string())
            .ok_or_else(|| {
                CliError::from(format!("No nic config for role {role}"))
            });
    }
    Ok(templates
        .files()
        .into_iter()
        .map(|(path, content)| format!("# {path}\n---\n{content}"))
        .collect::<Vec<String>>()
        .join("\n")
        .trim_end()
        .to_string())
}

pub(crate) fn validate_settings(
    matches: &clap::ArgMatches,
) -> Result<String, CliError> {
    let file_path = matches
        .value_of("SETTINGS_FILE")
        .ok_or("Please define SETTINGS_FILE")?;
    let (topology, params) = settings_from_file(file_path)?;
    match validate(&topology, &params) {
        Ok(()) => Ok("valid".to_string()),
        Err(errors) => Err(CliError {
            code: EX_DATAERR,
            error_msg: errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<String>>()
                .join("\n"),
        }),
    }
}
