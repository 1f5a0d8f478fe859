use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use std::path::PathBuf;

use gemprice_cli::input::{serve_config_from_arguments, train_config_from_arguments};
use gemprice_cli::server::{self, AppState};
use gemprice_cli::train::run_training;
use gemprice_ml::config::PipelineConfig;
use gemprice_ml::logging::init_logging;

fn config_arg() -> Arg {
    Arg::new("config")
        .help("Path to the JSON pipeline configuration. Defaults are used when omitted.")
        .required(false)
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn main() -> Result<()> {
    let matches = Command::new("gemprice")
        .version(clap::crate_version!())
        .about("\u{1F48E} gemprice - gemstone price regression: training and prediction server")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Ingest the source data, fit the preprocessor and select the best model")
                .arg(config_arg())
                .arg(
                    Arg::new("data")
                        .short('d')
                        .long("data")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help(
                            "Path to the source CSV. Overrides the source data path \
                             specified in the configuration file.",
                        )
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the prediction form and JSON API")
                .arg(config_arg())
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .help("Address to bind. Overrides the configured host.")
                        .value_hint(ValueHint::Hostname),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_parser(clap::value_parser!(u16))
                        .help("Port to bind. Overrides the configured port."),
                ),
        )
        .subcommand(Command::new("config").about("Print the default configuration as JSON"))
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("serve", sub_m)) => handle_serve(sub_m),
        Some(("config", _)) => {
            println!("{}", serde_json::to_string_pretty(&PipelineConfig::default())?);
            Ok(())
        }
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config = train_config_from_arguments(matches)?;
    init_logging(&config.logging)?;
    log::info!(
        "[gemprice::train] Training from {}",
        config.ingestion.source_data_path.display()
    );

    match run_training(&config) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_serve(matches: &ArgMatches) -> Result<()> {
    let config = serve_config_from_arguments(matches)?;
    init_logging(&config.logging)?;
    log::info!(
        "[gemprice::serve] Serving on {}:{}",
        config.server.host,
        config.server.port
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    match runtime.block_on(server::run(AppState::new(config))) {
        Ok(()) => Ok(()),
        Err(e) => {
            log::error!("Server failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
