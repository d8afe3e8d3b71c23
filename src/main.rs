use anyhow::{bail, Context};
use clap::Parser;
use log::LevelFilter;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use synothumb::{
    discover, generate_log_path, BatchProcessor, Cli, Ffmpeg, MediaCategory, ProgressReporter,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if !cli.root.is_dir() {
        bail!("The directory '{}' does not exist", cli.root.display());
    }

    let log_path = init_logging(&cli.log_dir, cli.verbose)?;
    println!("Logging has started. Details are being saved to: {}", log_path.display());
    log::info!("Started in directory: {}", cli.root.display());

    let config = cli.process_config();
    config.validate().context("Invalid configuration")?;

    println!("Searching for media files (this might take a while)...");
    let files = discover(&cli.root)
        .with_context(|| format!("Failed to scan {}", cli.root.display()))?;

    if files.is_empty() {
        println!("No media files found to process.");
        log::info!("No media files found.");
        return Ok(());
    }

    println!("Found {} media files.", files.len());

    if files.iter().any(|f| f.category() == MediaCategory::Video) {
        Ffmpeg::new(config.ffmpeg.clone())
            .probe()
            .with_context(|| format!("{} is required for video files", config.ffmpeg.display()))?;
    }

    let processor = BatchProcessor::new(config)?;
    let reporter = ProgressReporter::new(files.len());
    let summary = processor.run(&files, &reporter);
    reporter.finish(&summary);

    println!(
        "\nAll tasks completed: {} processed, {} skipped, {} failed.",
        summary.processed, summary.skipped, summary.failed
    );
    if !summary.failures.is_empty() {
        eprintln!("Files that failed (details in {}):", log_path.display());
        for (path, detail) in &summary.failures {
            eprintln!("  {}: {}", path.display(), detail.message);
        }
    }
    log::info!("Finished: {} files handled", summary.total());

    Ok(())
}

fn init_logging(log_dir: &Path, verbose: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let log_path = generate_log_path(log_dir);
    let file = File::create(&log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;

    env_logger::Builder::new()
        .filter_level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp(),
                record.level(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();

    Ok(log_path)
}
