//! The `info` subcommand: media file summary via the prober.

use clap::Args;
use clipforge_core::{format_bytes, format_duration, probe_summary};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Media file to inspect
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

pub fn run(args: &InfoArgs) -> i32 {
    let size = std::fs::metadata(&args.input).map(|meta| meta.len()).ok();

    match probe_summary(&args.input) {
        Ok(summary) => {
            println!("File:     {}", args.input.display());
            if let Some(size) = size {
                println!("Size:     {}", format_bytes(size));
            }
            match summary.duration_secs {
                Some(duration) => println!("Duration: {}", format_duration(duration)),
                None => println!("Duration: unknown"),
            }
            if let (Some(width), Some(height)) = (summary.width, summary.height) {
                println!(
                    "Video:    {width}x{height} ({})",
                    summary.video_codec.as_deref().unwrap_or("unknown")
                );
            }
            for (index, channels) in summary.audio_channels.iter().enumerate() {
                println!("Audio #{index}: {channels} channel(s)");
            }
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}
