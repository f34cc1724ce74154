// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

use signspeak::cli::args::{Cli, Commands};
use signspeak::cli::catalog::{run_catalog, run_status};
use signspeak::cli::logging;
use signspeak::cli::predict::run_prediction;

fn main() {
    logging::init_from_env();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Predict(args) => run_prediction(args),
        Commands::Catalog(args) => run_catalog(args),
        Commands::Status(args) => run_status(args),
    }
}
