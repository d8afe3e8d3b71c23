// synothumb/src/processors/mod.rs
mod batch;
mod compressor;
mod discover;
mod loader;
mod metadata;
mod raw;
mod report;
mod resizer;
mod sidecar;
mod video;

pub use batch::BatchProcessor;
pub use compressor::Compressor;
pub use discover::discover;
pub use loader::{Decoded, Loader};
pub use metadata::{MetadataProcessor, Orientation};
pub use raw::{demosaic, sensor_orientation, RawDeveloper};
pub use report::{create_progress_bar, log_outcome, OutcomeSink, ProgressReporter, RunSummary, Tally};
pub use resizer::{fit_dimensions, Resizer};
pub use sidecar::{is_inside_sidecar, SidecarDir, SkipGuard, SIDECAR_DIR_NAME};
pub use video::{Ffmpeg, Transcoder, VideoProcessor};
