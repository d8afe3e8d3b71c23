// synothumb/src/core/mod.rs
pub mod media;
pub mod processor;
pub mod thumbnails;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use media::{classify, MediaCategory, MediaFile};
pub use processor::ImageProcessor;
pub use thumbnails::{
    PreviewSpec, ThumbnailSpec, FILMSTRIP_NAME, PREVIEW_THUMBNAIL, STANDARD_THUMBNAILS,
};

/// What to do when the legacy filmstrip clip cannot be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilmstripPolicy {
    /// A filmstrip failure fails the whole video.
    Required,
    /// Log the failure and carry on with the still thumbnails.
    BestEffort,
    /// Never generate a filmstrip.
    Skip,
}

#[derive(Debug, Clone)]
pub struct ProcessConfig {
    pub thumbnails: Vec<ThumbnailSpec>,
    pub preview: PreviewSpec,
    pub thumbnail_quality: u8,
    pub preview_quality: u8,
    /// Seek position handed to ffmpeg for the still frame.
    pub frame_offset: String,
    pub filmstrip: FilmstripPolicy,
    pub ffmpeg: PathBuf,
    /// 0 selects the pool size heuristic.
    pub max_workers: usize,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            thumbnails: STANDARD_THUMBNAILS.to_vec(),
            preview: PREVIEW_THUMBNAIL,
            thumbnail_quality: 95,
            preview_quality: 90,
            frame_offset: "00:00:01".to_string(),
            filmstrip: FilmstripPolicy::Required,
            ffmpeg: PathBuf::from("ffmpeg"),
            max_workers: 0,
        }
    }
}

impl ProcessConfig {
    pub fn validate(&self) -> Result<()> {
        if self.thumbnails.is_empty() {
            return Err(ThumbError::InvalidConfig(
                "At least one standard thumbnail is required".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for spec in &self.thumbnails {
            if spec.width == 0 || spec.height == 0 {
                return Err(ThumbError::InvalidConfig(format!(
                    "Thumbnail {} has a zero bounding box",
                    spec.name
                )));
            }
            if !names.insert(spec.name) {
                return Err(ThumbError::InvalidConfig(format!(
                    "Duplicate thumbnail name {}",
                    spec.name
                )));
            }
        }

        if self.preview.width == 0 || self.preview.height == 0 {
            return Err(ThumbError::InvalidConfig(
                "Preview has a zero bounding box".to_string(),
            ));
        }
        if names.contains(self.preview.name) {
            return Err(ThumbError::InvalidConfig(format!(
                "Preview name {} collides with a standard thumbnail",
                self.preview.name
            )));
        }

        for quality in [self.thumbnail_quality, self.preview_quality] {
            if quality == 0 || quality > 100 {
                return Err(ThumbError::InvalidConfig(
                    "Quality must be between 1 and 100".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The standard entry whose presence means a source is fully processed.
    pub fn marker(&self) -> &ThumbnailSpec {
        &self.thumbnails[0]
    }
}

#[derive(Error, Debug)]
pub enum ThumbError {
    #[error("Failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unsupported RAW file {}: {detail}", .path.display())]
    UnsupportedRaw { path: PathBuf, detail: String },

    #[error("{tool} failed ({}): {stderr}", describe_exit(.code))]
    ExternalTool {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Could not run {tool}: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Frame extraction produced no image at {}", .0.display())]
    MissingFrame(PathBuf),

    #[error("Filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Worker panicked: {0}")]
    Panicked(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl ThumbError {
    pub fn fs(path: &Path, source: std::io::Error) -> Self {
        ThumbError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ThumbError::Decode { .. } => ErrorKind::Decode,
            ThumbError::UnsupportedRaw { .. } => ErrorKind::UnsupportedRaw,
            ThumbError::ExternalTool { .. } | ThumbError::ToolUnavailable { .. } => {
                ErrorKind::ExternalTool
            }
            ThumbError::MissingFrame(_) => ErrorKind::MissingFrame,
            ThumbError::Filesystem { .. } => ErrorKind::Filesystem,
            ThumbError::Encode(_) => ErrorKind::Encode,
            ThumbError::InvalidConfig(_) => ErrorKind::Config,
            ThumbError::Panicked(_) => ErrorKind::Panic,
        }
    }
}

pub type Result<T> = std::result::Result<T, ThumbError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Decode,
    UnsupportedRaw,
    ExternalTool,
    MissingFrame,
    Filesystem,
    Encode,
    Config,
    Panic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    Skipped,
    Processed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureDetail {
    pub kind: ErrorKind,
    pub message: String,
}

/// The single result reported for every discovered file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub path: PathBuf,
    pub category: MediaCategory,
    pub status: OutcomeStatus,
    pub error: Option<FailureDetail>,
}

impl Outcome {
    pub fn skipped(file: &MediaFile) -> Self {
        Self::new(file, OutcomeStatus::Skipped, None)
    }

    pub fn processed(file: &MediaFile) -> Self {
        Self::new(file, OutcomeStatus::Processed, None)
    }

    pub fn failed(file: &MediaFile, error: &ThumbError) -> Self {
        let detail = FailureDetail {
            kind: error.kind(),
            message: error.to_string(),
        };
        Self::new(file, OutcomeStatus::Failed, Some(detail))
    }

    fn new(file: &MediaFile, status: OutcomeStatus, error: Option<FailureDetail>) -> Self {
        Self {
            path: file.path().to_path_buf(),
            category: file.category(),
            status,
            error,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|detail| detail.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_marker_is_xl() {
        let config = ProcessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.marker().name, "SYNOPHOTO_THUMB_XL.jpg");
        assert_eq!(config.thumbnails.len(), 5);
        assert_eq!(config.preview.width, 120);
        assert_eq!(config.preview.height, 120);
    }

    #[test]
    fn validate_rejects_bad_tables() {
        let mut config = ProcessConfig::default();
        config.thumbnails.clear();
        assert!(matches!(config.validate(), Err(ThumbError::InvalidConfig(_))));

        let mut config = ProcessConfig::default();
        config.thumbnails.push(config.thumbnails[1].clone());
        assert!(config.validate().is_err());

        let mut config = ProcessConfig::default();
        config.preview.name = "SYNOPHOTO_THUMB_S.jpg";
        assert!(config.validate().is_err());

        let mut config = ProcessConfig::default();
        config.thumbnail_quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn external_tool_error_mentions_exit_code() {
        let err = ThumbError::ExternalTool {
            tool: "ffmpeg".to_string(),
            code: Some(1),
            stderr: "moov atom not found".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::ExternalTool);
        assert_eq!(
            err.to_string(),
            "ffmpeg failed (exit code 1): moov atom not found"
        );
    }
}
