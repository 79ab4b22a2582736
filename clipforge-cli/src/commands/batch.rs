//! The `batch` subcommand: a JSON manifest of edit jobs, processed
//! strictly one at a time in manifest order.

use clap::Args;
use clipforge_core::{BatchQueue, CoreConfig, EditSpec, JobStatus, Transcoder};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::progress::BatchDisplay;

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON manifest: an array of edit specs
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Path to the encoder binary (falls back to CLIPFORGE_FFMPEG, then PATH)
    #[arg(long, value_name = "PATH")]
    pub encoder: Option<PathBuf>,
}

pub fn run(args: &BatchArgs) -> i32 {
    let file = match File::open(&args.manifest) {
        Ok(file) => file,
        Err(err) => {
            eprintln!(
                "error: cannot open manifest {}: {err}",
                args.manifest.display()
            );
            return 2;
        }
    };

    let specs: Vec<EditSpec> = match serde_json::from_reader(BufReader::new(file)) {
        Ok(specs) => specs,
        Err(err) => {
            eprintln!("error: invalid manifest: {err}");
            return 2;
        }
    };

    if specs.is_empty() {
        println!("Manifest contains no jobs.");
        return 0;
    }

    let mut config = CoreConfig::default();
    config.encoder_path = args.encoder.clone();
    let transcoder = Transcoder::new(config);

    let queue = BatchQueue::new();
    for spec in specs {
        queue.enqueue(spec);
    }
    log::info!(
        "Loaded {} job(s) from {}",
        queue.len(),
        args.manifest.display()
    );

    let display = BatchDisplay::new(queue.len());
    queue.process_all(&transcoder, Some(&display));
    display.finish();

    let jobs = queue.jobs();
    let done = jobs
        .iter()
        .filter(|job| job.status == JobStatus::Done)
        .count();
    println!("Batch finished: {done}/{} succeeded", jobs.len());
    for job in &jobs {
        println!(
            "  {:<10} {}",
            format!("{:?}", job.status),
            job.spec.input.display()
        );
    }

    if done == jobs.len() { 0 } else { 1 }
}
