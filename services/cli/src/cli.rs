use crate::commands::{run_country, run_normalize, CountryArgs, NormalizeArgs};
use clap::{Parser, Subcommand};
use tax_address::config::AppConfig;
use tax_address::error::AppError;
use tax_address::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "tax-address",
    about = "Normalize checkout addresses for submission to a tax calculation provider",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a raw address and print it as JSON
    Normalize(NormalizeArgs),
    /// Show the ISO-3 code and regions known for a country
    Country(CountryArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Normalize(args) => run_normalize(args, &config),
        Command::Country(args) => run_country(args, &config),
    }
}
