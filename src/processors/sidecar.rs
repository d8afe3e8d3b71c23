// synothumb/src/processors/sidecar.rs
use crate::core::{ProcessConfig, Result, ThumbError};
use std::path::{Path, PathBuf};

pub const SIDECAR_DIR_NAME: &str = "@eaDir";

/// `<parent>/@eaDir/<file name>/` for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarDir {
    path: PathBuf,
}

impl SidecarDir {
    pub fn for_source(source: &Path) -> Result<Self> {
        let name = source.file_name().ok_or_else(|| {
            ThumbError::fs(
                source,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;
        let parent = source.parent().unwrap_or_else(|| Path::new(""));

        Ok(Self {
            path: parent.join(SIDECAR_DIR_NAME).join(name),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    /// Creates the directory and its parents. An existing directory is fine.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.path).map_err(|e| ThumbError::fs(&self.path, e))
    }
}

/// True when `path` has a sidecar directory among its components.
pub fn is_inside_sidecar(path: &Path) -> bool {
    path.components()
        .any(|component| component.as_os_str() == SIDECAR_DIR_NAME)
}

/// Decides whether a source was completed by an earlier run. Only the
/// marker file is consulted; nothing is created.
pub struct SkipGuard<'a> {
    config: &'a ProcessConfig,
}

impl<'a> SkipGuard<'a> {
    pub fn new(config: &'a ProcessConfig) -> Self {
        Self { config }
    }

    pub fn marker_path(&self, sidecar: &SidecarDir) -> PathBuf {
        sidecar.join(self.config.marker().name)
    }

    pub fn is_complete(&self, sidecar: &SidecarDir) -> bool {
        self.marker_path(sidecar).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    #[test]
    fn sidecar_sits_next_to_source() {
        let sidecar = SidecarDir::for_source(Path::new("/photos/2020/a.jpg")).unwrap();
        assert_eq!(sidecar.path(), Path::new("/photos/2020/@eaDir/a.jpg"));
        assert_eq!(
            sidecar.join("SYNOPHOTO_THUMB_S.jpg"),
            PathBuf::from("/photos/2020/@eaDir/a.jpg/SYNOPHOTO_THUMB_S.jpg")
        );
    }

    #[test]
    fn detects_sidecar_components() {
        assert!(is_inside_sidecar(Path::new("/p/@eaDir/a.jpg/SYNOPHOTO_THUMB_XL.jpg")));
        assert!(!is_inside_sidecar(Path::new("/p/eaDir/a.jpg")));
        assert!(!is_inside_sidecar(Path::new("/p/my@eaDir.jpg")));
    }

    #[test]
    fn guard_checks_marker_only() {
        let temp = TempDir::new().unwrap();
        let source = temp.child("a.jpg");
        source.touch().unwrap();

        let config = ProcessConfig::default();
        let guard = SkipGuard::new(&config);
        let sidecar = SidecarDir::for_source(source.path()).unwrap();

        assert!(!guard.is_complete(&sidecar));
        assert!(!sidecar.path().exists());

        sidecar.ensure().unwrap();
        temp.child("@eaDir/a.jpg/SYNOPHOTO_THUMB_S.jpg").touch().unwrap();
        assert!(!guard.is_complete(&sidecar));

        temp.child("@eaDir/a.jpg/SYNOPHOTO_THUMB_XL.jpg").touch().unwrap();
        assert!(guard.is_complete(&sidecar));
    }

    #[test]
    fn ensure_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let sidecar = SidecarDir::for_source(&temp.path().join("clip.mp4")).unwrap();
        sidecar.ensure().unwrap();
        sidecar.ensure().unwrap();
        assert!(sidecar.path().is_dir());
    }
}
