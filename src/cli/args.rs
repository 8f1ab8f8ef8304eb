// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Examples:
    pose-preprocess run --source ~/datasets/yoga_poses --output pose_dataset
    pose-preprocess run -s raw_images -o pose_dataset --train-ratio 0.7 --seed 7
    pose-preprocess split --source raw_images --output pose_dataset
    pose-preprocess process --images pose_dataset/train --out train_data.csv"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: split, extract landmarks, and aggregate both splits
    Run(RunArgs),
    /// Split a source dataset into train/test trees only
    Split(SplitArgs),
    /// Extract landmarks and aggregate one existing images tree
    Process(ProcessArgs),
}

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source directory with one subdirectory per pose class
    #[arg(short, long)]
    pub source: String,

    /// Output root for split trees, per-class tables, and combined tables
    #[arg(short, long, default_value = "pose_dataset")]
    pub output: String,

    /// Directory holding (or receiving) the pose model
    #[arg(long, default_value = ".")]
    pub model_dir: String,

    /// Fraction of each class assigned to the train split
    #[arg(long, default_value_t = 0.8)]
    pub train_ratio: f32,

    /// Seed for the split shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Minimum acceptable worst-keypoint confidence
    #[arg(long, default_value_t = 0.1)]
    pub threshold: f32,

    /// Inference passes per image
    #[arg(long, default_value_t = 3)]
    pub inference_count: usize,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Arguments for the split command.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Source directory with one subdirectory per pose class
    #[arg(short, long)]
    pub source: String,

    /// Output root for the train/test trees
    #[arg(short, long, default_value = "pose_dataset")]
    pub output: String,

    /// Fraction of each class assigned to the train split
    #[arg(long, default_value_t = 0.8)]
    pub train_ratio: f32,

    /// Seed for the split shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// Arguments for the process command.
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Images root with one subdirectory per pose class
    #[arg(short, long)]
    pub images: String,

    /// Directory receiving the per-class tables
    #[arg(long, default_value = "csv_per_pose")]
    pub csv_dir: String,

    /// Path of the combined table
    #[arg(short, long)]
    pub out: String,

    /// Directory holding (or receiving) the pose model
    #[arg(long, default_value = ".")]
    pub model_dir: String,

    /// Minimum acceptable worst-keypoint confidence
    #[arg(long, default_value_t = 0.1)]
    pub threshold: f32,

    /// Inference passes per image
    #[arg(long, default_value_t = 3)]
    pub inference_count: usize,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args_defaults() {
        let args = Cli::parse_from(["app", "run", "--source", "raw"]);
        match args.command {
            Commands::Run(run_args) => {
                assert_eq!(run_args.source, "raw");
                assert_eq!(run_args.output, "pose_dataset");
                assert!((run_args.train_ratio - 0.8).abs() < f32::EPSILON);
                assert_eq!(run_args.seed, 42);
                assert!((run_args.threshold - 0.1).abs() < f32::EPSILON);
                assert_eq!(run_args.inference_count, 3);
                assert!(run_args.verbose);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_run_args_custom() {
        let args = Cli::parse_from([
            "app",
            "run",
            "--source",
            "raw",
            "--train-ratio",
            "0.7",
            "--seed",
            "7",
            "--threshold",
            "0.25",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Run(run_args) => {
                assert!((run_args.train_ratio - 0.7).abs() < f32::EPSILON);
                assert_eq!(run_args.seed, 7);
                assert!((run_args.threshold - 0.25).abs() < f32::EPSILON);
                assert!(!run_args.verbose);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_process_args() {
        let args = Cli::parse_from([
            "app",
            "process",
            "--images",
            "pose_dataset/test",
            "--out",
            "test_data.csv",
        ]);
        match args.command {
            Commands::Process(process_args) => {
                assert_eq!(process_args.images, "pose_dataset/test");
                assert_eq!(process_args.out, "test_data.csv");
                assert_eq!(process_args.csv_dir, "csv_per_pose");
            }
            _ => panic!("expected process command"),
        }
    }
}
