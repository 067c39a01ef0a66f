mod onboard;
mod settings;
mod status;
mod topics;

use ferronap_core::{Onap, Settings};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let settings = load_settings(cli)?;

    match &cli.command {
        Command::Settings => settings::run(&settings),
        Command::Onboard(command) => onboard::run(command, &connect(settings)?).await,
        Command::Status(args) => status::run(args, &connect(settings)?).await,
        Command::Topics(command) => topics::run(command, &connect(settings)?).await,
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, CliError> {
    let settings = match &cli.settings {
        Some(path) => Settings::from_file(path)?,
        None => Settings::from_env()?,
    };
    Ok(settings)
}

fn connect(settings: Settings) -> Result<Onap, CliError> {
    Ok(Onap::connect(settings)?)
}
