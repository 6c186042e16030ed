//! dask-operator CLI entry point.

use clap::Parser;

use dask_operator::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Run(args) => dask_operator::cli::commands::run::execute(args, config_path).await,
        Commands::Crd(args) => dask_operator::cli::commands::crd::execute(args, cli.json),
        Commands::Config(args) => {
            dask_operator::cli::commands::config::execute(args, config_path, cli.json)
        }
    };

    if let Err(err) = result {
        dask_operator::cli::handle_error(err, cli.json);
    }
}
