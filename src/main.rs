// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

use pose_preprocess::cli::args::{Cli, Commands};
use pose_preprocess::cli::run::{run_pipeline, run_process, run_split};

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Run(args) => run_pipeline(args),
        Commands::Split(args) => run_split(args),
        Commands::Process(args) => run_process(args),
    }
}
