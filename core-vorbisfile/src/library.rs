//! # Native Library Binding
//!
//! Opens libvorbisfile with `libloading` and binds the `ov_*` symbols into a
//! function table. The `Library` is kept alive alongside the table so the
//! function pointers stay valid for as long as the binding exists.

use crate::config::LoaderConfig;
use crate::error::{Result, VorbisError};
use crate::ffi::{ogg_int64_t, OggVorbisFile, VorbisComment, VorbisInfo, VorbisfileApi};
use crate::loader::LibraryResolver;
use libloading::{Library, Symbol};
use std::os::raw::{c_char, c_double, c_int, c_long};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

type FopenFn = unsafe extern "C" fn(*const c_char, *mut OggVorbisFile) -> c_int;
type ClearFn = unsafe extern "C" fn(*mut OggVorbisFile) -> c_int;
type ReadFn = unsafe extern "C" fn(
    *mut OggVorbisFile,
    *mut c_char,
    c_int,
    c_int,
    c_int,
    c_int,
    *mut c_int,
) -> c_long;
type InfoFn = unsafe extern "C" fn(*mut OggVorbisFile, c_int) -> *mut VorbisInfo;
type CommentFn = unsafe extern "C" fn(*mut OggVorbisFile, c_int) -> *mut VorbisComment;
type LongQueryFn = unsafe extern "C" fn(*mut OggVorbisFile) -> c_long;
type PcmSeekFn = unsafe extern "C" fn(*mut OggVorbisFile, ogg_int64_t) -> c_int;
type TimeSeekFn = unsafe extern "C" fn(*mut OggVorbisFile, c_double) -> c_int;
type LinkTotalFn = unsafe extern "C" fn(*mut OggVorbisFile, c_int) -> ogg_int64_t;
type TimeTotalFn = unsafe extern "C" fn(*mut OggVorbisFile, c_int) -> c_double;
type PcmTellFn = unsafe extern "C" fn(*mut OggVorbisFile) -> ogg_int64_t;
type TimeTellFn = unsafe extern "C" fn(*mut OggVorbisFile) -> c_double;
type BitrateFn = unsafe extern "C" fn(*mut OggVorbisFile, c_int) -> c_long;

struct Symbols {
    fopen: FopenFn,
    clear: ClearFn,
    read: ReadFn,
    info: InfoFn,
    comment: CommentFn,
    seekable: LongQueryFn,
    streams: LongQueryFn,
    pcm_seek: PcmSeekFn,
    time_seek: TimeSeekFn,
    pcm_total: LinkTotalFn,
    raw_total: LinkTotalFn,
    time_total: TimeTotalFn,
    pcm_tell: PcmTellFn,
    time_tell: TimeTellFn,
    bitrate: BitrateFn,
}

impl Symbols {
    /// # Safety
    ///
    /// `library` must be libvorbisfile so each symbol has the declared type.
    unsafe fn bind(library: &Library) -> std::result::Result<Self, libloading::Error> {
        Ok(Self {
            fopen: bind(library, b"ov_fopen\0")?,
            clear: bind(library, b"ov_clear\0")?,
            read: bind(library, b"ov_read\0")?,
            info: bind(library, b"ov_info\0")?,
            comment: bind(library, b"ov_comment\0")?,
            seekable: bind(library, b"ov_seekable\0")?,
            streams: bind(library, b"ov_streams\0")?,
            pcm_seek: bind(library, b"ov_pcm_seek\0")?,
            time_seek: bind(library, b"ov_time_seek\0")?,
            pcm_total: bind(library, b"ov_pcm_total\0")?,
            raw_total: bind(library, b"ov_raw_total\0")?,
            time_total: bind(library, b"ov_time_total\0")?,
            pcm_tell: bind(library, b"ov_pcm_tell\0")?,
            time_tell: bind(library, b"ov_time_tell\0")?,
            bitrate: bind(library, b"ov_bitrate\0")?,
        })
    }
}

unsafe fn bind<T: Copy>(library: &Library, name: &[u8]) -> std::result::Result<T, libloading::Error> {
    let symbol: Symbol<'_, T> = library.get(name)?;
    Ok(*symbol)
}

/// libvorbisfile opened from disk with all required symbols bound.
pub struct NativeLibrary {
    symbols: Symbols,
    path: PathBuf,
    // Declared last: dropped after nothing can call through `symbols` anymore.
    _library: Library,
}

impl NativeLibrary {
    /// Open the shared library at `path` and bind every `ov_*` symbol.
    ///
    /// A library that lacks any required symbol is rejected.
    pub fn open(path: &Path) -> std::result::Result<Self, libloading::Error> {
        // SAFETY: loading runs the library's initializers; libvorbisfile has
        // none with preconditions on the caller.
        let library = unsafe { Library::new(path)? };
        // SAFETY: symbol types mirror the vorbisfile.h prototypes.
        let symbols = unsafe { Symbols::bind(&library)? };

        Ok(Self {
            symbols,
            path: path.to_path_buf(),
            _library: library,
        })
    }

    /// Location the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VorbisfileApi for NativeLibrary {
    unsafe fn ov_fopen(&self, path: *const c_char, vf: *mut OggVorbisFile) -> c_int {
        (self.symbols.fopen)(path, vf)
    }

    unsafe fn ov_clear(&self, vf: *mut OggVorbisFile) -> c_int {
        (self.symbols.clear)(vf)
    }

    unsafe fn ov_read(
        &self,
        vf: *mut OggVorbisFile,
        buffer: *mut c_char,
        length: c_int,
        bigendianp: c_int,
        word: c_int,
        sgned: c_int,
        bitstream: *mut c_int,
    ) -> c_long {
        (self.symbols.read)(vf, buffer, length, bigendianp, word, sgned, bitstream)
    }

    unsafe fn ov_info(&self, vf: *mut OggVorbisFile, link: c_int) -> *mut VorbisInfo {
        (self.symbols.info)(vf, link)
    }

    unsafe fn ov_comment(&self, vf: *mut OggVorbisFile, link: c_int) -> *mut VorbisComment {
        (self.symbols.comment)(vf, link)
    }

    unsafe fn ov_seekable(&self, vf: *mut OggVorbisFile) -> c_long {
        (self.symbols.seekable)(vf)
    }

    unsafe fn ov_streams(&self, vf: *mut OggVorbisFile) -> c_long {
        (self.symbols.streams)(vf)
    }

    unsafe fn ov_pcm_seek(&self, vf: *mut OggVorbisFile, pos: ogg_int64_t) -> c_int {
        (self.symbols.pcm_seek)(vf, pos)
    }

    unsafe fn ov_time_seek(&self, vf: *mut OggVorbisFile, s: c_double) -> c_int {
        (self.symbols.time_seek)(vf, s)
    }

    unsafe fn ov_pcm_total(&self, vf: *mut OggVorbisFile, i: c_int) -> ogg_int64_t {
        (self.symbols.pcm_total)(vf, i)
    }

    unsafe fn ov_raw_total(&self, vf: *mut OggVorbisFile, i: c_int) -> ogg_int64_t {
        (self.symbols.raw_total)(vf, i)
    }

    unsafe fn ov_time_total(&self, vf: *mut OggVorbisFile, i: c_int) -> c_double {
        (self.symbols.time_total)(vf, i)
    }

    unsafe fn ov_pcm_tell(&self, vf: *mut OggVorbisFile) -> ogg_int64_t {
        (self.symbols.pcm_tell)(vf)
    }

    unsafe fn ov_time_tell(&self, vf: *mut OggVorbisFile) -> c_double {
        (self.symbols.time_tell)(vf)
    }

    unsafe fn ov_bitrate(&self, vf: *mut OggVorbisFile, i: c_int) -> c_long {
        (self.symbols.bitrate)(vf, i)
    }
}

/// Resolves libvorbisfile from disk according to a [`LoaderConfig`].
#[derive(Debug, Clone, Default)]
pub struct DynamicResolver {
    config: LoaderConfig,
}

impl DynamicResolver {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Resolver configured from the process environment.
    pub fn from_env() -> Self {
        Self::new(LoaderConfig::from_env())
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }
}

impl LibraryResolver for DynamicResolver {
    fn resolve(&self) -> Result<Arc<dyn VorbisfileApi>> {
        self.config.validate()?;

        let mut tried = Vec::new();
        for candidate in self.config.search_order() {
            match NativeLibrary::open(&candidate) {
                Ok(library) => {
                    info!(path = %library.path().display(), "Loaded libvorbisfile");
                    return Ok(Arc::new(library));
                }
                Err(e) => {
                    debug!(path = %candidate.display(), error = %e, "Candidate rejected");
                    tried.push(candidate.display().to_string());
                }
            }
        }

        warn!(attempts = tried.len(), "libvorbisfile could not be loaded");
        Err(VorbisError::Load { tried })
    }
}
