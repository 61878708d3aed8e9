use clap::{Arg, Command};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use gemma_codegen::config::Config;
use gemma_codegen::session::CodeSession;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so they never mix with generated code on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("gemgen")
        .about("Generate code from a plain-language description")
        .long_about("gemgen turns a one-line description into code by asking a hosted Gemma model and streaming the answer to the terminal")
        .arg(Arg::new("description")
            .help("Description of the code to generate (asked interactively when omitted)")
            .num_args(1..))
        .arg(Arg::new("language")
            .short('l')
            .long("language")
            .help("Target programming language")
            .value_name("LANGUAGE")
            .num_args(1))
        .arg(Arg::new("model")
            .short('m')
            .long("model")
            .help("Model identifier to request")
            .value_name("MODEL")
            .num_args(1))
        .arg(Arg::new("temperature")
            .short('t')
            .long("temperature")
            .help("Sampling temperature")
            .value_name("TEMPERATURE")
            .value_parser(clap::value_parser!(f32))
            .num_args(1))
        .arg(Arg::new("config")
            .long("config")
            .help("Show configuration information")
            .action(clap::ArgAction::SetTrue))
        .get_matches();

    let mut config = Config::load()?;
    config.apply_overrides(
        matches.get_one::<String>("language").map(String::as_str),
        matches.get_one::<String>("model").map(String::as_str),
        matches.get_one::<f32>("temperature").copied(),
    );
    debug!("Effective configuration: {:?}", config);

    if matches.get_flag("config") {
        config.show_config_info()?;
        return Ok(ExitCode::SUCCESS);
    }

    let description = matches
        .get_many::<String>("description")
        .map(|parts| parts.map(String::as_str).collect::<Vec<_>>().join(" "));

    let session = CodeSession::new(config);
    let outcome = session.run(description).await?;
    info!("Run finished: {:?}", outcome);

    Ok(outcome.exit_code())
}
