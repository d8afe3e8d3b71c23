// synothumb/src/cli.rs
use crate::core::{FilmstripPolicy, ProcessConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "synothumb")]
#[command(about = "Generate Synology Photos thumbnails for a photo and video tree")]
#[command(version)]
pub struct Cli {
    /// Root directory to scan
    pub root: PathBuf,

    /// Number of worker threads (0 = min(32, cores + 4))
    #[arg(short = 'j', long, default_value_t = 0)]
    pub threads: usize,

    /// How a failed filmstrip affects a video
    #[arg(long, value_enum, default_value_t = Filmstrip::Required)]
    pub filmstrip: Filmstrip,

    /// ffmpeg executable
    #[arg(long, default_value = "ffmpeg")]
    pub ffmpeg: PathBuf,

    /// Directory for the run log
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Filmstrip {
    /// Fail the video when the filmstrip cannot be made
    Required,
    /// Log the failure and keep going
    BestEffort,
    /// Do not generate filmstrips
    Skip,
}

impl From<Filmstrip> for FilmstripPolicy {
    fn from(mode: Filmstrip) -> Self {
        match mode {
            Filmstrip::Required => FilmstripPolicy::Required,
            Filmstrip::BestEffort => FilmstripPolicy::BestEffort,
            Filmstrip::Skip => FilmstripPolicy::Skip,
        }
    }
}

impl Cli {
    pub fn process_config(&self) -> ProcessConfig {
        ProcessConfig {
            filmstrip: self.filmstrip.into(),
            ffmpeg: self.ffmpeg.clone(),
            max_workers: self.threads,
            ..Default::default()
        }
    }
}
