mod cli;
mod commands;
mod infra;

use shelter::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
