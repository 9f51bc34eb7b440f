// SPDX-License-Identifier: Apache-2.0

use std::fs::File;
use std::io::{stdin, stdout, Write};
use std::process::{Command, Stdio};

use netiso::{validate, NetworkParams, Topology};
use serde::{Deserialize, Serialize};

use crate::{
    error::CliError,
    settings::{settings_from_file, settings_to_file},
};

#[derive(Debug, Serialize, Deserialize)]
struct EditableSettings {
    roles: Topology,
    networks: NetworkParams,
}

/// Open the settings as YAML in `$EDITOR` and save them back once they
/// parse.
pub(crate) fn edit(matches: &clap::ArgMatches) -> Result<String, CliError> {
    let file_path = matches
        .value_of("SETTINGS_FILE")
        .ok_or("Please define SETTINGS_FILE")?;
    if file_path == "-" {
        return Err("Cannot edit settings from stdin".into());
    }
    let (roles, networks) = settings_from_file(file_path)?;

    let tmp_file_path = gen_tmp_file_path();
    write_settings_to_file(
        &tmp_file_path,
        &EditableSettings { roles, networks },
    )?;
    let result = run_editor(&tmp_file_path);
    del_file(&tmp_file_path);
    let settings = result?;

    if let Err(errors) = validate(&settings.roles, &settings.networks) {
        for error in errors {
            log::warn!("{error}");
        }
    }
    settings_to_file(file_path, &settings.roles, &settings.networks)?;
    Ok(String::new())
}

fn gen_tmp_file_path() -> String {
    format!(
        "{}/netiso-{}.yml",
        std::env::temp_dir().display(),
        uuid::Uuid::new_v4()
    )
}

fn del_file(file_path: &str) {
    if let Err(e) = std::fs::remove_file(file_path) {
        log::warn!("Failed to delete file {file_path}: {e}");
    }
}

fn write_settings_to_file(
    file_path: &str,
    settings: &EditableSettings,
) -> Result<(), CliError> {
    let mut fd = File::create(file_path)?;
    fd.write_all(serde_yaml::to_string(settings)?.as_bytes())?;
    Ok(())
}

fn run_editor(tmp_file_path: &str) -> Result<EditableSettings, CliError> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    loop {
        let status = Command::new(&editor)
            .arg(tmp_file_path)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .stdout(Stdio::inherit())
            .status()
            .map_err(|e| {
                CliError::from(format!("Editor '{editor}' failed with {e}"))
            })?;
        if !status.success() {
            return Err(format!("Editor '{editor}' failed").into());
        }
        let fd = File::open(tmp_file_path)?;
        match serde_yaml::from_reader(fd) {
            Ok(s) => return Ok(s),
            Err(e) => {
                eprintln!("{e}");
                if !ask_for_retry()? {
                    return Err(CliError::from(e));
                }
            }
        }
    }
}

fn ask_for_retry() -> Result<bool, CliError> {
    loop {
        println!(
            "Try again? [y,n]:\n\
            y - yes, start editor again\n\
            n - no, throw away my changes\n\
            > "
        );
        stdout().lock().flush().ok();
        let mut retry = String::new();
        stdin().read_line(&mut retry)?;
        retry.make_ascii_lowercase();
        match retry.trim() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Invalid reply, please try y or n"),
        }
    }
}
