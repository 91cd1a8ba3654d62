// src/config.rs

use anyhow::{Context, Result};
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

/// Directory whose presence marks the project root.
pub const PROJECT_MARKER: &str = "src";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Settings shared by every fetch in a run.
#[derive(Debug, Clone)]
pub struct Config {
    pub raw_dir: PathBuf,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Config {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Walk upward from `start` (inclusive) to the first directory containing
/// [`PROJECT_MARKER`].
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(PROJECT_MARKER).exists())
        .map(Path::to_path_buf)
}

/// `<project root>/data/raw`, where the root is searched upward from the
/// running executable. Falls back to `<cwd>/data/raw`.
pub fn default_raw_dir() -> Result<PathBuf> {
    let exe = env::current_exe()
        .ok()
        .map(|p| p.canonicalize().unwrap_or(p));
    let cwd = env::current_dir().context("reading current directory")?;
    Ok(raw_dir_from(exe.as_deref(), &cwd))
}

fn raw_dir_from(exe: Option<&Path>, cwd: &Path) -> PathBuf {
    let root = match exe.and_then(find_project_root) {
        Some(root) => root,
        None => {
            debug!(cwd = %cwd.display(), "no project root above the executable, using cwd");
            cwd.to_path_buf()
        }
    };
    root.join("data").join("raw")
}
