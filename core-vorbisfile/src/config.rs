//! # Loader Configuration
//!
//! Where to look for the libvorbisfile shared library.

use crate::error::{Result, VorbisError};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit library file.
pub const ENV_LIBRARY_PATH: &str = "VORBISFILE_LIBRARY";

/// Environment variable holding extra directories to search, separated like
/// `PATH` on the host platform.
pub const ENV_SEARCH_PATH: &str = "VORBISFILE_SEARCH_PATH";

/// Shared library resolution settings.
///
/// Resolution order:
/// 1. `library_path`, if set
/// 2. every `search_dirs` entry joined with every candidate name
/// 3. every bare candidate name, left to the platform loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Explicit library file. When set it is tried first.
    #[serde(default)]
    pub library_path: Option<PathBuf>,

    /// File names to try, in order.
    ///
    /// Default: the platform's usual names for libvorbisfile.
    #[serde(default = "default_candidates")]
    pub candidates: Vec<String>,

    /// Directories searched before falling back to the platform loader.
    #[serde(default)]
    pub search_dirs: Vec<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            library_path: None,
            candidates: default_candidates(),
            search_dirs: Vec::new(),
        }
    }
}

impl LoaderConfig {
    /// Default configuration overridden by [`ENV_LIBRARY_PATH`] and
    /// [`ENV_SEARCH_PATH`].
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = env::var_os(ENV_LIBRARY_PATH).filter(|p| !p.is_empty()) {
            config.library_path = Some(PathBuf::from(path));
        }

        if let Some(dirs) = env::var_os(ENV_SEARCH_PATH) {
            config.search_dirs = env::split_paths(&dirs)
                .filter(|d| !d.as_os_str().is_empty())
                .collect();
        }

        config
    }

    /// Set an explicit library file.
    pub fn with_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.library_path = Some(path.into());
        self
    }

    /// Replace the candidate file names.
    pub fn with_candidates<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = candidates.into_iter().map(Into::into).collect();
        self
    }

    /// Add a directory to search.
    pub fn with_search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_dirs.push(dir.into());
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.library_path.is_none() && self.candidates.is_empty() {
            return Err(VorbisError::Config(
                "either library_path or at least one candidate is required".to_string(),
            ));
        }

        if self.candidates.iter().any(|c| c.trim().is_empty()) {
            return Err(VorbisError::Config(
                "candidate names cannot be empty".to_string(),
            ));
        }

        if let Some(path) = &self.library_path {
            if path.as_os_str().is_empty() {
                return Err(VorbisError::Config("library_path cannot be empty".to_string()));
            }
        }

        Ok(())
    }

    /// Every location to try, in resolution order.
    pub fn search_order(&self) -> Vec<PathBuf> {
        let mut order = Vec::new();

        if let Some(path) = &self.library_path {
            order.push(path.clone());
        }

        for dir in &self.search_dirs {
            for name in &self.candidates {
                order.push(dir.join(name));
            }
        }

        order.extend(self.candidates.iter().map(|name| Path::new(name).to_path_buf()));
        order
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_candidates() -> Vec<String> {
    let names: &[&str] = if cfg!(target_os = "windows") {
        &["vorbisfile.dll", "libvorbisfile-3.dll", "libvorbisfile.dll"]
    } else if cfg!(target_os = "macos") {
        &["libvorbisfile.3.dylib", "libvorbisfile.dylib"]
    } else {
        &["libvorbisfile.so.3", "libvorbisfile.so"]
    };

    names.iter().map(|s| s.to_string()).collect()
}
