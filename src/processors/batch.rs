use crate::core::{
    ImageProcessor, MediaCategory, MediaFile, Outcome, ProcessConfig, Result, ThumbError,
};
use crate::processors::discover::discover;
use crate::processors::report::{OutcomeSink, RunSummary, Tally};
use crate::processors::sidecar::{SidecarDir, SkipGuard};
use crate::processors::video::{Ffmpeg, Transcoder, VideoProcessor};
use crate::utils::resolve_workers;
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

/// Runs one task per media file on a bounded pool and reports exactly one
/// outcome for each.
pub struct BatchProcessor {
    config: ProcessConfig,
    transcoder: Box<dyn Transcoder>,
    max_threads: usize,
    thread_pool: rayon::ThreadPool,
}

impl BatchProcessor {
    pub fn new(config: ProcessConfig) -> Result<Self> {
        let transcoder = Box::new(Ffmpeg::new(config.ffmpeg.clone()));
        Self::with_transcoder(config, transcoder)
    }

    pub fn with_transcoder(config: ProcessConfig, transcoder: Box<dyn Transcoder>) -> Result<Self> {
        config.validate()?;

        let max_threads = resolve_workers(config.max_workers);
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .thread_name(|i| format!("synothumb-worker-{}", i))
            .build()
            .map_err(|e| {
                ThumbError::InvalidConfig(format!("Failed to create thread pool: {}", e))
            })?;

        log::info!("Using {} worker threads", max_threads);

        Ok(Self {
            config,
            transcoder,
            max_threads,
            thread_pool,
        })
    }

    pub fn max_threads(&self) -> usize {
        self.max_threads
    }

    pub fn process_directory(&self, root: &Path, sink: &dyn OutcomeSink) -> Result<RunSummary> {
        let files = discover(root)?;
        Ok(self.run(&files, sink))
    }

    /// Processes every file, forwarding each outcome to `sink` as its task
    /// finishes. Returns once all files have an outcome.
    pub fn run(&self, files: &[MediaFile], sink: &dyn OutcomeSink) -> RunSummary {
        if files.is_empty() {
            log::warn!("No media files to process");
            return RunSummary::default();
        }

        log::info!("Processing {} media files", files.len());

        let tally = Tally::new();
        let images = ImageProcessor::new(&self.config);
        let videos = VideoProcessor::new(&self.config, self.transcoder.as_ref(), &images);
        let guard = SkipGuard::new(&self.config);

        self.thread_pool.install(|| {
            files
                .par_iter()
                .filter(|file| file.category().is_media())
                .for_each(|file| {
                    let outcome = process_isolated(file, &guard, &images, &videos);
                    tally.record(&outcome);
                    sink.record(&outcome);
                });
        });

        tally.summary()
    }
}

/// One task. Errors and panics both become a failed outcome.
fn process_isolated(
    file: &MediaFile,
    guard: &SkipGuard<'_>,
    images: &ImageProcessor<'_>,
    videos: &VideoProcessor<'_>,
) -> Outcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| process_file(file, guard, images, videos)));

    match result {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => Outcome::failed(file, &e),
        Err(payload) => Outcome::failed(file, &ThumbError::Panicked(panic_message(payload))),
    }
}

fn process_file(
    file: &MediaFile,
    guard: &SkipGuard<'_>,
    images: &ImageProcessor<'_>,
    videos: &VideoProcessor<'_>,
) -> Result<Outcome> {
    let sidecar = SidecarDir::for_source(file.path())?;
    if guard.is_complete(&sidecar) {
        return Ok(Outcome::skipped(file));
    }

    log::debug!("Processing {} {}", file.category().label(), file.path().display());

    match file.category() {
        MediaCategory::Video => videos.process(file)?,
        MediaCategory::Image | MediaCategory::RawImage => images.process(file)?,
        // `run` filters these out, so no outcome is ever reported for them.
        MediaCategory::Ignored => {
            return Err(ThumbError::InvalidConfig(format!(
                "{} is not a media file",
                file.path().display()
            )))
        }
    }

    Ok(Outcome::processed(file))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, OutcomeStatus};
    use image::{Rgb, RgbImage};
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Default)]
    struct Collect(Mutex<Vec<Outcome>>);

    impl OutcomeSink for Collect {
        fn record(&self, outcome: &Outcome) {
            self.0.lock().unwrap().push(outcome.clone());
        }
    }

    struct PanickingTranscoder;

    impl Transcoder for PanickingTranscoder {
        fn filmstrip(&self, _input: &Path, _output: &Path) -> Result<()> {
            panic!("transcoder exploded");
        }

        fn extract_frame(&self, _input: &Path, _offset: &str, _output: &Path) -> Result<()> {
            unreachable!()
        }
    }

    fn config(workers: usize) -> ProcessConfig {
        ProcessConfig {
            max_workers: workers,
            ..Default::default()
        }
    }

    #[test]
    fn one_outcome_per_file_even_when_tasks_fail() {
        let dir = TempDir::new().unwrap();
        let mut files = Vec::new();
        for i in 0..6 {
            let path = dir.path().join(format!("img{}.png", i));
            RgbImage::from_pixel(64, 48, Rgb([i * 30, 0, 0])).save(&path).unwrap();
            files.push(MediaFile::new(path, MediaCategory::Image));
        }
        let broken = dir.path().join("broken.jpg");
        std::fs::write(&broken, b"nope").unwrap();
        files.push(MediaFile::new(broken.clone(), MediaCategory::Image));

        let batch = BatchProcessor::with_transcoder(config(3), Box::new(PanickingTranscoder)).unwrap();
        let sink = Collect::default();
        let summary = batch.run(&files, &sink);

        let outcomes = sink.0.into_inner().unwrap();
        assert_eq!(outcomes.len(), files.len());
        assert_eq!(summary.processed, 6);
        assert_eq!(summary.failed, 1);
        let failed = outcomes.iter().find(|o| o.path == broken).unwrap();
        assert_eq!(failed.status, OutcomeStatus::Failed);
        assert_eq!(failed.error_kind(), Some(ErrorKind::Decode));
    }

    #[test]
    fn panicking_task_becomes_failed_outcome() {
        let dir = TempDir::new().unwrap();
        let clip = dir.path().join("clip.mov");
        std::fs::write(&clip, b"").unwrap();
        let files = vec![MediaFile::new(clip, MediaCategory::Video)];

        let batch = BatchProcessor::with_transcoder(config(1), Box::new(PanickingTranscoder)).unwrap();
        let sink = Collect::default();
        let summary = batch.run(&files, &sink);

        assert_eq!(summary.failed, 1);
        let outcomes = sink.0.lock().unwrap();
        let outcome = &outcomes[0];
        assert_eq!(outcome.error_kind(), Some(ErrorKind::Panic));
        assert!(outcome.error.as_ref().unwrap().message.contains("transcoder exploded"));
    }

    #[test]
    fn ignored_files_get_no_outcome() {
        let dir = TempDir::new().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, b"shopping list").unwrap();
        let files = vec![MediaFile::new(notes, MediaCategory::Ignored)];

        let batch = BatchProcessor::with_transcoder(config(1), Box::new(PanickingTranscoder)).unwrap();
        let sink = Collect::default();
        let summary = batch.run(&files, &sink);

        assert_eq!(summary.total(), 0);
        assert!(sink.0.lock().unwrap().is_empty());
        assert!(!dir.path().join("@eaDir").exists());
    }

    #[test]
    fn ignored_file_is_refused_if_dispatched() {
        let dir = TempDir::new().unwrap();
        let file = MediaFile::new(dir.path().join("notes.txt"), MediaCategory::Ignored);
        let config = config(1);
        let transcoder = PanickingTranscoder;
        let images = ImageProcessor::new(&config);
        let videos = VideoProcessor::new(&config, &transcoder, &images);

        let err = process_file(&file, &SkipGuard::new(&config), &images, &videos).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn worker_override_is_respected() {
        let batch = BatchProcessor::with_transcoder(config(2), Box::new(PanickingTranscoder)).unwrap();
        assert_eq!(batch.max_threads(), 2);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut bad = config(1);
        bad.thumbnails.clear();
        assert!(BatchProcessor::new(bad).is_err());
    }

    #[test]
    fn empty_input_reports_nothing() {
        let batch = BatchProcessor::with_transcoder(config(1), Box::new(PanickingTranscoder)).unwrap();
        let sink = Collect::default();
        assert_eq!(batch.run(&[], &sink), RunSummary::default());
        assert!(sink.0.lock().unwrap().is_empty());
    }
}
