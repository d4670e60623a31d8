use crate::report::{run_screen, run_search, ScreenArgs, SearchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rental_scout::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Rental Scout",
    about = "Screen short-term-rental listings by cap rate, cash-on-cash return and heat score",
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
    /// Rank listings from a saved JSON or CSV export
    Screen(ScreenArgs),
    /// Run a live search against the listing service and rank the results
    Search(SearchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Seed the session with listings from a JSON or CSV export
    #[arg(long)]
    pub(crate) input: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Screen(args) => run_screen(args),
        Command::Search(args) => run_search(args).await,
    }
}
