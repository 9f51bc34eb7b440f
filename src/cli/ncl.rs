// SPDX-License-Identifier: Apache-2.0

mod config;
mod edit;
mod error;
mod gen_conf;
mod result;
mod settings;

use env_logger::Builder;
use log::LevelFilter;

use crate::result::print_result_and_exit;

const APP_NAME: &str = "netisoctl";

const SUB_CMD_INIT: &str = "init";
const SUB_CMD_VALIDATE: &str = "validate";
const SUB_CMD_SHOW: &str = "show";
const SUB_CMD_GEN: &str = "gen";
const SUB_CMD_EDIT: &str = "edit";
const SUB_CMD_FORMAT: &str = "format";
const SUB_CMD_VERSION: &str = "version";

fn settings_file_arg(required: bool) -> clap::Arg<'static> {
    clap::Arg::new("SETTINGS_FILE")
        .required(required)
        .index(1)
        .help(
            "Settings file, a directory holding generated templates or \
            '-' for stdin",
        )
}

fn main() {
    let matches = clap::Command::new(APP_NAME)
        .version(clap::crate_version!())
        .about("Generate network isolation templates")
        .subcommand_required(true)
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .multiple_occurrences(true)
                .help("Set verbose level")
                .global(true),
        )
        .arg(
            clap::Arg::new("quiet")
                .short('q')
                .help("Disable logging")
                .global(true),
        )
        .arg(
            clap::Arg::new("CONFIG")
                .long("config")
                .short('c')
                .takes_value(true)
                .global(true)
                .help("Configuration file, default is /etc/netiso/netiso.conf"),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_INIT)
                .about("Create settings with empty roles and default networks")
                .arg(settings_file_arg(true))
                .arg(
                    clap::Arg::new("FORCE")
                        .long("force")
                        .short('f')
                        .takes_value(false)
                        .help("Overwrite existing settings"),
                ),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_VALIDATE)
                .about("Check settings for conflicts")
                .arg(settings_file_arg(true)),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_SHOW)
                .about("Print generated templates")
                .arg(settings_file_arg(true))
                .arg(
                    clap::Arg::new("ROLE")
                        .long("role")
                        .short('r')
                        .takes_value(true)
                        .help("Show the nic config of specified role only"),
                ),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_GEN)
                .about("Generate templates into a directory")
                .alias("gc")
                .arg(settings_file_arg(true))
                .arg(
                    clap::Arg::new("OUTPUT_DIR")
                        .long("output")
                        .short('o')
                        .takes_value(true)
                        .required(true)
                        .help("Output directory"),
                ),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_EDIT)
                .about("Edit settings in EDITOR")
                .arg(settings_file_arg(true)),
        )
        .subcommand(
            clap::Command::new(SUB_CMD_FORMAT)
                .about("Upgrade and print settings in the current format")
                .alias("fmt")
                .arg(settings_file_arg(true)),
        )
        .subcommand(clap::Command::new(SUB_CMD_VERSION).about("Show version"))
        .get_matches();

    let (log_module_filters, log_level) =
        match matches.occurrences_of("verbose") {
            0 => (vec!["netiso", "netisoctl"], LevelFilter::Info),
            1 => (vec!["netiso", "netisoctl"], LevelFilter::Debug),
            _ => (vec![""], LevelFilter::Debug),
        };

    if !matches.is_present("quiet") {
        let mut log_builder = Builder::new();
        for log_module_filter in log_module_filters {
            if !log_module_filter.is_empty() {
                log_builder.filter(Some(log_module_filter), log_level);
            } else {
                log_builder.filter(None, log_level);
            }
        }
        log_builder.init();
    }

    if let Some(matches) = matches.subcommand_matches(SUB_CMD_INIT) {
        if let Some(file_path) = matches.value_of("SETTINGS_FILE") {
            print_result_and_exit(settings::init(
                file_path,
                matches.is_present("FORCE"),
            ));
        }
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_VALIDATE)
    {
        print_result_and_exit(gen_conf::validate_settings(matches));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_SHOW) {
        print_result_and_exit(gen_conf::show(matches));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_GEN) {
        print_result_and_exit(gen_conf::gen_conf(matches));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_EDIT) {
        print_result_and_exit(edit::edit(matches));
    } else if let Some(matches) = matches.subcommand_matches(SUB_CMD_FORMAT) {
        if let Some(file_path) = matches.value_of("SETTINGS_FILE") {
            print_result_and_exit(settings::format(file_path));
        }
    } else if matches.subcommand_matches(SUB_CMD_VERSION).is_some() {
        print_result_and_exit(Ok(format!(
            "{} {}",
            APP_NAME,
            clap::crate_version!()
        )));
    }
}
