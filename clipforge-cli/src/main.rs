// clipforge-cli/src/main.rs
//
// Command-line interface for the Clipforge media edit transcoding engine.
//
// Responsibilities:
// - Defining the CLI argument structures (`Cli`, `Commands`).
// - Setting up logging from the environment and verbosity flags.
// - Translating arguments into an `EditSpec` and invoking the core
//   library (single runs, batch manifests, media info).
// - Managing process exit codes based on success or failure.

use clap::{Parser, Subcommand};
use std::process;

mod commands;
mod progress;

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Clipforge: media edit transcoding tool",
    long_about = "Applies edits (trim, crop, rotate, flip, speed, volume, watermark, \
                  format transcode) to media files by driving an external ffmpeg binary."
)]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Applies edits to a single media file
    Process(commands::process::ProcessArgs),
    /// Processes a JSON manifest of edit jobs strictly one at a time
    Batch(commands::batch::BatchArgs),
    /// Prints a summary of a media file
    Info(commands::info::InfoArgs),
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_level),
    )
    .format_timestamp_secs()
    .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match cli.command {
        Commands::Process(args) => commands::process::run(&args),
        Commands::Batch(args) => commands::batch::run(&args),
        Commands::Info(args) => commands::info::run(&args),
    };

    process::exit(exit_code);
}
