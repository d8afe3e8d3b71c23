// synothumb/src/processors/video.rs
use crate::core::{FilmstripPolicy, ImageProcessor, MediaFile, ProcessConfig, Result, ThumbError};
use crate::core::FILMSTRIP_NAME;
use crate::processors::SidecarDir;
use crate::utils::stderr_excerpt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// The two calls made against the external video tool. Both block until
/// the tool exits.
pub trait Transcoder: Send + Sync {
    fn filmstrip(&self, input: &Path, output: &Path) -> Result<()>;

    /// Writes exactly one frame taken at `offset` (`HH:MM:SS`) to `output`.
    fn extract_frame(&self, input: &Path, offset: &str, output: &Path) -> Result<()>;
}

pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn name(&self) -> String {
        self.program.display().to_string()
    }

    /// Runs `ffmpeg -version` to confirm the executable can be launched.
    pub fn probe(&self) -> Result<()> {
        self.run(vec!["-version".into()])
    }

    pub fn filmstrip_args(input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into()];
        args.extend(quiet_args());
        args.extend(
            [
                "-ar", "44100", "-r", "12", "-ac", "2", "-f", "flv", "-qscale", "5", "-s",
                "320x180",
            ]
            .map(OsString::from),
        );
        args.push(output.into());
        args
    }

    pub fn frame_args(input: &Path, offset: &str, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-ss".into(),
            offset.into(),
            "-i".into(),
            input.into(),
        ];
        args.extend(quiet_args());
        args.extend(["-vframes", "1"].map(OsString::from));
        args.push(output.into());
        args
    }

    fn run(&self, args: Vec<OsString>) -> Result<()> {
        log::debug!("Running {} {:?}", self.name(), args);

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ThumbError::ToolUnavailable {
                tool: self.name(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ThumbError::ExternalTool {
                tool: self.name(),
                code: output.status.code(),
                stderr: stderr_excerpt(&output.stderr),
            })
        }
    }
}

fn quiet_args() -> [OsString; 4] {
    ["-hide_banner", "-nostdin", "-loglevel", "error"].map(OsString::from)
}

impl Transcoder for Ffmpeg {
    fn filmstrip(&self, input: &Path, output: &Path) -> Result<()> {
        self.run(Self::filmstrip_args(input, output))
    }

    fn extract_frame(&self, input: &Path, offset: &str, output: &Path) -> Result<()> {
        self.run(Self::frame_args(input, offset, output))
    }
}

/// Filmstrip plus the still thumbnail family for a video source.
pub struct VideoProcessor<'a> {
    config: &'a ProcessConfig,
    transcoder: &'a dyn Transcoder,
    images: &'a ImageProcessor<'a>,
}

impl<'a> VideoProcessor<'a> {
    pub fn new(
        config: &'a ProcessConfig,
        transcoder: &'a dyn Transcoder,
        images: &'a ImageProcessor<'a>,
    ) -> Self {
        Self {
            config,
            transcoder,
            images,
        }
    }

    pub fn process(&self, file: &MediaFile) -> Result<()> {
        let sidecar = SidecarDir::for_source(file.path())?;
        sidecar.ensure()?;

        self.make_filmstrip(file, &sidecar)?;

        let frame = frame_path(file, &sidecar);
        let rendered = self.render_frame(file, &frame, &sidecar);
        remove_frame(&frame);

        rendered
    }

    fn render_frame(&self, file: &MediaFile, frame: &Path, sidecar: &SidecarDir) -> Result<()> {
        self.transcoder
            .extract_frame(file.path(), &self.config.frame_offset, frame)?;
        if !frame.is_file() {
            return Err(ThumbError::MissingFrame(frame.to_path_buf()));
        }

        self.images.process_still(frame, sidecar)
    }

    fn make_filmstrip(&self, file: &MediaFile, sidecar: &SidecarDir) -> Result<()> {
        let output = sidecar.join(FILMSTRIP_NAME);

        match self.config.filmstrip {
            FilmstripPolicy::Skip => Ok(()),
            FilmstripPolicy::Required => self.transcoder.filmstrip(file.path(), &output),
            FilmstripPolicy::BestEffort => {
                if let Err(e) = self.transcoder.filmstrip(file.path(), &output) {
                    log::warn!(
                        "Filmstrip for {} not generated, continuing: {}",
                        file.path().display(),
                        e
                    );
                }
                Ok(())
            }
        }
    }
}

/// Removes the extracted frame, including one a failed extraction left behind.
fn remove_frame(frame: &Path) {
    match std::fs::remove_file(frame) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Could not remove {}: {}", frame.display(), e),
    }
}

/// `<sidecar>/<stem>_temp.jpg`. It lives inside the sidecar directory so
/// discovery never sees it.
fn frame_path(file: &MediaFile, sidecar: &SidecarDir) -> PathBuf {
    let stem = file
        .path()
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    sidecar.join(&format!("{}_temp.jpg", stem))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, MediaCategory};
    use image::{GenericImageView, Rgb, RgbImage};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Stands in for ffmpeg: writes a 640x360 frame, or fails on request.
    #[derive(Default)]
    struct FakeTranscoder {
        fail_filmstrip: bool,
        fail_frame: bool,
        partial_frame: bool,
        skip_frame_file: bool,
        calls: Mutex<Vec<&'static str>>,
    }

    impl Transcoder for FakeTranscoder {
        fn filmstrip(&self, _input: &Path, output: &Path) -> Result<()> {
            self.calls.lock().unwrap().push("filmstrip");
            if self.fail_filmstrip {
                return Err(ThumbError::ExternalTool {
                    tool: "ffmpeg".to_string(),
                    code: Some(1),
                    stderr: "Invalid data found when processing input".to_string(),
                });
            }
            std::fs::write(output, b"FLV").unwrap();
            Ok(())
        }

        fn extract_frame(&self, _input: &Path, offset: &str, output: &Path) -> Result<()> {
            assert_eq!(offset, "00:00:01");
            self.calls.lock().unwrap().push("frame");
            if self.partial_frame {
                std::fs::write(output, b"\xFF\xD8 half a frame").unwrap();
            }
            if self.fail_frame {
                return Err(ThumbError::ExternalTool {
                    tool: "ffmpeg".to_string(),
                    code: Some(1),
                    stderr: "Output file is empty".to_string(),
                });
            }
            if !self.skip_frame_file {
                RgbImage::from_pixel(640, 360, Rgb([10, 200, 30]))
                    .save(output)
                    .unwrap();
            }
            Ok(())
        }
    }

    fn video(dir: &Path) -> MediaFile {
        let path = dir.join("c.mp4");
        std::fs::write(&path, b"not really a video").unwrap();
        MediaFile::new(path, MediaCategory::Video)
    }

    fn run(config: &ProcessConfig, transcoder: &FakeTranscoder, file: &MediaFile) -> Result<()> {
        let images = ImageProcessor::new(config);
        VideoProcessor::new(config, transcoder, &images).process(file)
    }

    #[test]
    fn builds_filmstrip_and_thumbnails_then_removes_frame() {
        let dir = TempDir::new().unwrap();
        let file = video(dir.path());
        let config = ProcessConfig::default();
        let transcoder = FakeTranscoder::default();

        run(&config, &transcoder, &file).unwrap();

        let sidecar = dir.path().join("@eaDir/c.mp4");
        assert!(sidecar.join(FILMSTRIP_NAME).is_file());
        for spec in &config.thumbnails {
            assert!(sidecar.join(spec.name).is_file(), "missing {}", spec.name);
        }
        let xl = image::open(sidecar.join("SYNOPHOTO_THUMB_XL.jpg")).unwrap();
        assert_eq!(xl.dimensions(), (640, 360));
        assert!(sidecar.join(config.preview.name).is_file());
        assert!(!sidecar.join("c_temp.jpg").exists());
        assert_eq!(*transcoder.calls.lock().unwrap(), vec!["filmstrip", "frame"]);
    }

    #[test]
    fn failed_extraction_leaves_no_marker() {
        let dir = TempDir::new().unwrap();
        let file = video(dir.path());
        let config = ProcessConfig::default();
        let transcoder = FakeTranscoder {
            fail_frame: true,
            ..Default::default()
        };

        let err = run(&config, &transcoder, &file).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalTool);
        assert!(!dir.path().join("@eaDir/c.mp4/SYNOPHOTO_THUMB_XL.jpg").exists());
    }

    #[test]
    fn failed_extraction_removes_partial_frame() {
        let dir = TempDir::new().unwrap();
        let file = video(dir.path());
        let config = ProcessConfig::default();
        let transcoder = FakeTranscoder {
            fail_frame: true,
            partial_frame: true,
            ..Default::default()
        };

        let err = run(&config, &transcoder, &file).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ExternalTool);
        assert!(!dir.path().join("@eaDir/c.mp4/c_temp.jpg").exists());
    }

    #[test]
    fn undecodable_frame_is_removed() {
        let dir = TempDir::new().unwrap();
        let file = video(dir.path());
        let config = ProcessConfig::default();
        let transcoder = FakeTranscoder {
            partial_frame: true,
            skip_frame_file: true,
            ..Default::default()
        };

        let err = run(&config, &transcoder, &file).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Decode);
        assert!(!dir.path().join("@eaDir/c.mp4/c_temp.jpg").exists());
        assert!(!dir.path().join("@eaDir/c.mp4/SYNOPHOTO_THUMB_XL.jpg").exists());
    }

    #[test]
    fn absent_frame_is_reported_distinctly() {
        let dir = TempDir::new().unwrap();
        let file = video(dir.path());
        let config = ProcessConfig::default();
        let transcoder = FakeTranscoder {
            skip_frame_file: true,
            ..Default::default()
        };

        let err = run(&config, &transcoder, &file).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingFrame);
    }

    #[test]
    fn required_filmstrip_failure_stops_before_extraction() {
        let dir = TempDir::new().unwrap();
        let file = video(dir.path());
        let config = ProcessConfig::default();
        let transcoder = FakeTranscoder {
            fail_filmstrip: true,
            ..Default::default()
        };

        assert!(run(&config, &transcoder, &file).is_err());
        assert_eq!(*transcoder.calls.lock().unwrap(), vec!["filmstrip"]);
    }

    #[test]
    fn best_effort_filmstrip_failure_still_renders() {
        let dir = TempDir::new().unwrap();
        let file = video(dir.path());
        let config = ProcessConfig {
            filmstrip: FilmstripPolicy::BestEffort,
            ..Default::default()
        };
        let transcoder = FakeTranscoder {
            fail_filmstrip: true,
            ..Default::default()
        };

        run(&config, &transcoder, &file).unwrap();
        assert!(dir.path().join("@eaDir/c.mp4/SYNOPHOTO_THUMB_XL.jpg").is_file());
    }

    #[test]
    fn skipped_filmstrip_is_never_requested() {
        let dir = TempDir::new().unwrap();
        let file = video(dir.path());
        let config = ProcessConfig {
            filmstrip: FilmstripPolicy::Skip,
            ..Default::default()
        };
        let transcoder = FakeTranscoder::default();

        run(&config, &transcoder, &file).unwrap();
        assert_eq!(*transcoder.calls.lock().unwrap(), vec!["frame"]);
        assert!(!dir.path().join("@eaDir/c.mp4").join(FILMSTRIP_NAME).exists());
    }

    #[test]
    fn ffmpeg_arguments_are_fixed() {
        let args = Ffmpeg::filmstrip_args(Path::new("in.mp4"), Path::new("out.flv"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args.first().map(String::as_str), Some("-y"));
        assert_eq!(args.last().map(String::as_str), Some("out.flv"));
        for pair in [["-ar", "44100"], ["-r", "12"], ["-ac", "2"], ["-f", "flv"], ["-qscale", "5"], ["-s", "320x180"]] {
            assert!(args.windows(2).any(|w| w[0] == pair[0] && w[1] == pair[1]), "{:?}", pair);
        }

        let args = Ffmpeg::frame_args(Path::new("in.mp4"), "00:00:01", Path::new("f.jpg"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(&args[..3], &["-y", "-ss", "00:00:01"]);
        assert!(args.windows(2).any(|w| w[0] == "-vframes" && w[1] == "1"));
        assert!(args.windows(2).any(|w| w[0] == "-loglevel" && w[1] == "error"));
    }

    #[test]
    fn missing_executable_is_reported() {
        let ffmpeg = Ffmpeg::new("/nonexistent/bin/ffmpeg");
        let err = ffmpeg.probe().unwrap_err();
        assert!(matches!(err, ThumbError::ToolUnavailable { .. }));
    }
}
