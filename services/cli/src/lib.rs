mod cli;
mod commands;
mod infra;

use tax_address::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
