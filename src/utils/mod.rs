// synothumb/src/utils/mod.rs
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const STDERR_EXCERPT_LIMIT: usize = 512;
const MAX_WORKERS: usize = 32;

/// `min(32, available_parallelism + 4)`. Work is a mix of decoding and
/// waiting on ffmpeg, so the pool runs a few threads past the core count.
pub fn default_worker_count() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    worker_count_for(cores)
}

pub fn worker_count_for(cores: usize) -> usize {
    (cores + 4).min(MAX_WORKERS)
}

/// Resolves a requested worker count, where 0 means the default.
pub fn resolve_workers(requested: usize) -> usize {
    if requested == 0 {
        default_worker_count()
    } else {
        requested
    }
}

/// Tool stderr reduced to something safe to log on one line: control
/// characters replaced, whitespace collapsed, tail kept when too long.
pub fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let cleaned: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .map(|c| if c.is_control() { '?' } else { c })
        .collect();

    if cleaned.is_empty() {
        return "no error output".to_string();
    }

    let count = cleaned.chars().count();
    if count <= STDERR_EXCERPT_LIMIT {
        cleaned
    } else {
        let tail: String = cleaned.chars().skip(count - STDERR_EXCERPT_LIMIT).collect();
        format!("...{}", tail)
    }
}

/// `<log_dir>/synothumb_<unix seconds>.log`, with a counter appended if
/// that name is taken.
pub fn generate_log_path(log_dir: &Path) -> PathBuf {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut path = log_dir.join(format!("synothumb_{}.log", timestamp));
    let mut counter = 1;

    while path.exists() {
        path = log_dir.join(format!("synothumb_{}_{}.log", timestamp, counter));
        counter += 1;
    }

    path
}
