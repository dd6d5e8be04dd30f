use bridgewatch::cli::{self, Cli, Commands, RunArgs};
use clap::Parser;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let result = match cli.command {
        None => cli::run::execute(&RunArgs::default()).await,
        Some(Commands::Run(args)) => cli::run::execute(&args).await,
        Some(Commands::Exchanges(args)) => cli::exchanges::execute(&args),
        Some(Commands::Stats(args)) => cli::stats::execute(&args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
