mod cli;
mod core;
mod processors;
mod utils;

pub use cli::{Cli, Filmstrip};
pub use crate::core::{
    classify, ErrorKind, FailureDetail, FilmstripPolicy, ImageProcessor, MediaCategory, MediaFile,
    Outcome, OutcomeStatus, PreviewSpec, ProcessConfig, Result, ThumbError, ThumbnailSpec,
    FILMSTRIP_NAME, PREVIEW_THUMBNAIL, STANDARD_THUMBNAILS,
};
pub use processors::{
    create_progress_bar, demosaic, discover, fit_dimensions, is_inside_sidecar, log_outcome,
    sensor_orientation, BatchProcessor, Compressor, Decoded, Ffmpeg, Loader, MetadataProcessor,
    Orientation, OutcomeSink, ProgressReporter, RawDeveloper, Resizer, RunSummary, SidecarDir,
    SkipGuard, Tally, Transcoder, VideoProcessor, SIDECAR_DIR_NAME,
};
pub use utils::{default_worker_count, generate_log_path, resolve_workers, stderr_excerpt};
