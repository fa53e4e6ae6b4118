use crate::server;
use clap::{Args, Parser, Subcommand};
use knighthaven::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "KnightHaven",
    about = "Run the KnightHaven campus marketplace and reviews API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Seed the place table from Yelp once and print the report
    Ingest,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Keep all data in process memory instead of the configured database
    #[arg(long)]
    pub(crate) in_memory: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Ingest => server::ingest().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from(["knighthaven-api", "serve", "--port", "4000", "--in-memory"])
            .expect("parse serve");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(4000));
                assert!(args.in_memory);
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_defaults_to_serve() {
        let cli = Cli::try_parse_from(["knighthaven-api"]).expect("parse");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["knighthaven-api", "ingest"]).expect("parse ingest");
        assert!(matches!(cli.command, Some(Command::Ingest)));
    }
}
