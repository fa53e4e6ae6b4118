mod cli;
mod infra;
mod routes;
mod server;

use knighthaven::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
