//! # Library Loader
//!
//! Load-once state for the native library. A [`Loader`] starts unloaded,
//! becomes loaded on the first successful resolution and never goes back.
//! A failed resolution leaves it unloaded so loading can be retried.
//!
//! The process-wide instance backs the free functions [`load`],
//! [`load_with`], [`is_loaded`] and [`library`]. Separate `Loader` values
//! exist for hosts that want an isolated binding (and for tests).
//!
//! Calling into the decoder before a successful load is a caller bug, not a
//! runtime condition: [`Loader::library`] panics in that case.

use crate::error::Result;
use crate::ffi::VorbisfileApi;
use crate::file::VorbisFile;
use crate::library::DynamicResolver;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

const NOT_LOADED: &str = "libvorbisfile shared library/dll was not loaded";

/// Locates the native library and binds its symbols.
pub trait LibraryResolver: Send + Sync {
    /// Attempt resolution. Called at most once per successful load.
    fn resolve(&self) -> Result<Arc<dyn VorbisfileApi>>;
}

/// Load-once cell holding the bound native library.
pub struct Loader {
    library: Mutex<Option<Arc<dyn VorbisfileApi>>>,
    loaded: AtomicBool,
}

impl Loader {
    /// An unloaded loader.
    pub const fn new() -> Self {
        Self {
            library: Mutex::new(None),
            loaded: AtomicBool::new(false),
        }
    }

    /// Load the library using `resolver`.
    ///
    /// Returns immediately once loaded; the resolver is not consulted again.
    /// Concurrent callers are serialized, so exactly one resolution succeeds.
    pub fn load_with<R>(&self, resolver: &R) -> Result<()>
    where
        R: LibraryResolver + ?Sized,
    {
        if self.is_loaded() {
            return Ok(());
        }

        let mut slot = self.library.lock();
        if slot.is_some() {
            // Another thread finished loading while we waited for the lock
            return Ok(());
        }

        match resolver.resolve() {
            Ok(library) => {
                *slot = Some(library);
                self.loaded.store(true, Ordering::Release);
                debug!("libvorbisfile bound");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "libvorbisfile load failed");
                Err(e)
            }
        }
    }

    /// Whether a load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// The bound library, if loaded.
    pub fn try_library(&self) -> Option<Arc<dyn VorbisfileApi>> {
        if !self.is_loaded() {
            return None;
        }
        self.library.lock().clone()
    }

    /// The bound library.
    ///
    /// # Panics
    ///
    /// Panics if no load has succeeded. Every decoder entry point goes
    /// through here, so using the binding before [`Loader::load_with`] fails
    /// loudly instead of returning an error value.
    pub fn library(&self) -> Arc<dyn VorbisfileApi> {
        match self.try_library() {
            Some(library) => library,
            None => panic!("{}", NOT_LOADED),
        }
    }

    /// Open `path` with this loader's library. Panics if not loaded.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<VorbisFile> {
        VorbisFile::open_with(self.library(), path)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Loader = Loader::new();

/// The process-wide loader.
pub fn global() -> &'static Loader {
    &GLOBAL
}

/// Load libvorbisfile into the process-wide loader, resolving it according to
/// [`LoaderConfig::from_env`](crate::config::LoaderConfig::from_env).
///
/// Idempotent: after the first success this returns `Ok(())` without
/// touching the filesystem.
pub fn load() -> Result<()> {
    if GLOBAL.is_loaded() {
        return Ok(());
    }
    GLOBAL.load_with(&DynamicResolver::from_env())
}

/// Load the process-wide loader with a caller-supplied resolver.
pub fn load_with<R>(resolver: &R) -> Result<()>
where
    R: LibraryResolver + ?Sized,
{
    GLOBAL.load_with(resolver)
}

/// Whether the process-wide loader has succeeded.
pub fn is_loaded() -> bool {
    GLOBAL.is_loaded()
}

/// The process-wide library. Panics if not loaded.
pub fn library() -> Arc<dyn VorbisfileApi> {
    GLOBAL.library()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VorbisError;

    struct FailingResolver;

    impl LibraryResolver for FailingResolver {
        fn resolve(&self) -> Result<Arc<dyn VorbisfileApi>> {
            Err(VorbisError::Load {
                tried: vec!["nowhere".into()],
            })
        }
    }

    #[test]
    fn test_new_loader_is_unloaded() {
        let loader = Loader::new();
        assert!(!loader.is_loaded());
        assert!(loader.try_library().is_none());
    }

    #[test]
    fn test_failed_load_stays_unloaded() {
        let loader = Loader::new();
        assert!(loader.load_with(&FailingResolver).is_err());
        assert!(!loader.is_loaded());
        // Retry is allowed and fails the same way
        assert!(loader.load_with(&FailingResolver).is_err());
    }

    #[test]
    #[should_panic(expected = "was not loaded")]
    fn test_library_before_load_panics() {
        let loader = Loader::new();
        let _ = loader.library();
    }
}
