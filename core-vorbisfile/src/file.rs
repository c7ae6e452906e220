//! # Decoder Handle
//!
//! [`VorbisFile`] owns one native `OggVorbis_File` for the lifetime of an
//! open stream.
//!
//! ## Lifecycle
//!
//! ```text
//! open ──► Open ──close──► Closed
//! ```
//!
//! - `open` allocates the native struct and initializes it with `ov_fopen`.
//!   If initialization fails the allocation is released before the error is
//!   returned.
//! - `close` runs `ov_clear` and then frees the allocation. If `ov_clear`
//!   fails nothing is freed and the handle stays open.
//! - Any call on a closed handle, including a second `close`, is a caller
//!   bug and panics.
//! - Dropping an open handle closes it.
//!
//! ## Threading
//!
//! A handle may move between threads but is not `Sync`: the native library
//! keeps per-handle decode state without locking. Distinct handles are
//! independent.

use crate::error::{Operation, Result, VorbisError};
use crate::ffi::{OggVorbisFile, VorbisfileApi};
use crate::info::{StreamInfo, VorbisComment};
use crate::loader;
use crate::pcm::{PcmChunk, PcmFormat};
use crate::reader::PcmReader;
use core_runtime::logging::strip_path;
use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::raw::c_int;
use std::path::Path;
use std::ptr::NonNull;
use std::sync::Arc;
use tracing::{debug, error, instrument, trace, warn};

/// Link index selecting the whole physical bitstream for totals, or the
/// current logical bitstream for [`VorbisFile::info`] and
/// [`VorbisFile::comment`].
pub const ALL_LINKS: i32 = -1;

/// Heap allocation for one `OggVorbis_File`, released on drop unless handed
/// over with [`NativeAlloc::into_raw`].
struct NativeAlloc(NonNull<OggVorbisFile>);

impl NativeAlloc {
    fn new() -> Self {
        let boxed: Box<MaybeUninit<OggVorbisFile>> = Box::new(MaybeUninit::uninit());
        // SAFETY: Box::into_raw never returns null.
        Self(unsafe { NonNull::new_unchecked(Box::into_raw(boxed).cast()) })
    }

    fn as_ptr(&self) -> *mut OggVorbisFile {
        self.0.as_ptr()
    }

    fn into_raw(self) -> NonNull<OggVorbisFile> {
        let ptr = self.0;
        std::mem::forget(self);
        ptr
    }

    /// # Safety
    ///
    /// `ptr` must come from [`NativeAlloc::into_raw`] and not be freed yet.
    unsafe fn free(ptr: NonNull<OggVorbisFile>) {
        drop(Box::from_raw(ptr.as_ptr().cast::<MaybeUninit<OggVorbisFile>>()));
    }
}

impl Drop for NativeAlloc {
    fn drop(&mut self) {
        // SAFETY: still owned by this guard.
        unsafe { Self::free(self.0) }
    }
}

/// One open Ogg Vorbis stream.
pub struct VorbisFile {
    api: Arc<dyn VorbisfileApi>,
    /// Non-null exactly while the handle is open.
    vf: Option<NonNull<OggVorbisFile>>,
    /// Logical bitstream reported by the most recent read.
    bitstream: i32,
    /// File name for diagnostics (basename only).
    name: String,
}

// SAFETY: the native decoder state is only reached through this handle and
// libvorbisfile has no thread affinity. `Sync` is deliberately absent.
unsafe impl Send for VorbisFile {}

impl VorbisFile {
    /// Open `path` using the process-wide loader.
    ///
    /// # Panics
    ///
    /// Panics if [`load`](crate::load) has not succeeded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(loader::library(), path)
    }

    /// Open `path` with the library bound by a loaded [`Loader`](crate::Loader).
    ///
    /// Only reachable through [`Loader::open`](crate::Loader::open) and
    /// [`VorbisFile::open`], both of which pass the not-loaded guard first.
    /// The path is handed to the native library unchecked; missing files and
    /// permission problems come back as the native open error.
    pub(crate) fn open_with(api: Arc<dyn VorbisfileApi>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let c_path = path_to_cstring(path)?;
        let name = strip_path(&path.to_string_lossy()).to_string();

        let alloc = NativeAlloc::new();
        // SAFETY: c_path is NUL terminated and alloc points to writable
        // memory sized for OggVorbis_File.
        let status = unsafe { api.ov_fopen(c_path.as_ptr(), alloc.as_ptr()) };
        if status != 0 {
            // alloc drops here: ov_fopen already tore down its own state
            let err = VorbisError::native(Operation::Open, status);
            warn!(file = %name, error = %err, "Open failed");
            return Err(err);
        }

        debug!(file = %name, "Opened");
        Ok(Self {
            api,
            vf: Some(alloc.into_raw()),
            bitstream: 0,
            name,
        })
    }

    /// Whether the handle still owns its native decoder.
    pub fn is_open(&self) -> bool {
        self.vf.is_some()
    }

    /// Basename of the opened file.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn raw(&self) -> *mut OggVorbisFile {
        match self.vf {
            Some(vf) => vf.as_ptr(),
            None => panic!("VorbisFile '{}' used after close", self.name),
        }
    }

    /// Release the native decoder: `ov_clear`, then free the allocation.
    ///
    /// On failure the handle is left open and unchanged.
    ///
    /// # Panics
    ///
    /// Panics if the handle is already closed.
    #[instrument(level = "debug", skip(self), fields(file = %self.name))]
    pub fn close(&mut self) -> Result<()> {
        let vf = self.raw();
        // SAFETY: vf is an initialized, open decoder.
        let status = unsafe { self.api.ov_clear(vf) };
        if status != 0 {
            let err = VorbisError::native(Operation::Close, status);
            error!(error = %err, "Close failed; native state retained");
            return Err(err);
        }

        if let Some(vf) = self.vf.take() {
            // SAFETY: ov_clear succeeded; nothing references the memory.
            unsafe { NativeAlloc::free(vf) };
        }
        debug!("Closed");
        Ok(())
    }

    // ========================================================================
    // Decoding
    // ========================================================================

    /// Decode up to `buffer.len()` bytes of PCM in `format`.
    ///
    /// Zero bytes from a non-empty buffer means end of stream. An empty
    /// buffer returns zero bytes and the current bitstream without calling
    /// the decoder. Requests beyond `i32::MAX` bytes are truncated to what
    /// the C interface accepts.
    pub fn read(&mut self, buffer: &mut [u8], format: PcmFormat) -> Result<PcmChunk> {
        let vf = self.raw();
        if buffer.is_empty() {
            return Ok(PcmChunk {
                bytes: 0,
                bitstream: self.bitstream,
            });
        }

        let length = c_int::try_from(buffer.len()).unwrap_or(c_int::MAX);
        let mut bitstream: c_int = self.bitstream;
        // SAFETY: buffer is valid for `length` bytes and bitstream is a live
        // out-parameter.
        let result = unsafe {
            self.api.ov_read(
                vf,
                buffer.as_mut_ptr().cast(),
                length,
                format.endianness.as_bigendianp(),
                format.word_size.as_word(),
                format.as_sgned(),
                &mut bitstream,
            )
        };

        if result < 0 {
            let err = VorbisError::native(Operation::Read, status_code(i64::from(result)));
            debug!(file = %self.name, error = %err, "Read failed");
            return Err(err);
        }

        if bitstream != self.bitstream {
            debug!(file = %self.name, from = self.bitstream, to = bitstream, "Crossed logical bitstream boundary");
        }
        self.bitstream = bitstream;

        let bytes = usize::try_from(result).unwrap_or(0);
        trace!(bytes, bitstream, "Decoded");
        Ok(PcmChunk { bytes, bitstream })
    }

    /// Logical bitstream reported by the last read (0 before any read).
    pub fn current_bitstream(&self) -> i32 {
        self.bitstream
    }

    /// An `io::Read` view of this handle producing PCM in `format`.
    pub fn pcm_reader(&mut self, format: PcmFormat) -> PcmReader<'_> {
        PcmReader::new(self, format)
    }

    // ========================================================================
    // Seeking
    // ========================================================================

    /// Whether the stream supports seeking. Check before interpreting an
    /// `EnoSeek` failure.
    pub fn seekable(&self) -> bool {
        // SAFETY: open decoder.
        unsafe { self.api.ov_seekable(self.raw()) != 0 }
    }

    /// Seek to an absolute PCM sample offset in the physical bitstream. The
    /// next read resumes exactly there.
    #[instrument(level = "debug", skip(self), fields(file = %self.name))]
    pub fn pcm_seek(&mut self, position: i64) -> Result<()> {
        // SAFETY: open decoder.
        let status = unsafe { self.api.ov_pcm_seek(self.raw(), position) };
        check_status(Operation::PcmSeek, status)
    }

    /// Seek to an absolute time in seconds.
    #[instrument(level = "debug", skip(self), fields(file = %self.name))]
    pub fn time_seek(&mut self, seconds: f64) -> Result<()> {
        // SAFETY: open decoder.
        let status = unsafe { self.api.ov_time_seek(self.raw(), seconds) };
        check_status(Operation::TimeSeek, status)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Number of logical bitstreams in the physical bitstream.
    pub fn streams(&self) -> u32 {
        // SAFETY: open decoder.
        let count = unsafe { self.api.ov_streams(self.raw()) };
        u32::try_from(count).unwrap_or(0)
    }

    /// Total PCM samples of link `link`, or of the whole file for
    /// [`ALL_LINKS`].
    pub fn pcm_total(&self, link: i32) -> Result<i64> {
        // SAFETY: open decoder.
        let total = unsafe { self.api.ov_pcm_total(self.raw(), link) };
        check_i64(Operation::PcmTotal, total)
    }

    /// Total compressed bytes of link `link`, or of the whole file for
    /// [`ALL_LINKS`].
    pub fn raw_total(&self, link: i32) -> Result<i64> {
        // SAFETY: open decoder.
        let total = unsafe { self.api.ov_raw_total(self.raw(), link) };
        check_i64(Operation::RawTotal, total)
    }

    /// Total seconds of link `link`, or of the whole file for [`ALL_LINKS`].
    pub fn time_total(&self, link: i32) -> Result<f64> {
        // SAFETY: open decoder.
        let total = unsafe { self.api.ov_time_total(self.raw(), link) };
        check_f64(Operation::TimeTotal, total)
    }

    /// Current decode position in PCM samples.
    pub fn pcm_tell(&self) -> Result<i64> {
        // SAFETY: open decoder.
        let position = unsafe { self.api.ov_pcm_tell(self.raw()) };
        check_i64(Operation::PcmTell, position)
    }

    /// Current decode position in seconds.
    pub fn time_tell(&self) -> Result<f64> {
        // SAFETY: open decoder.
        let position = unsafe { self.api.ov_time_tell(self.raw()) };
        check_f64(Operation::TimeTell, position)
    }

    /// Average bitrate in bits per second of link `link`, or of the whole
    /// file for [`ALL_LINKS`].
    pub fn bitrate(&self, link: i32) -> Result<i64> {
        // SAFETY: open decoder.
        let bitrate = unsafe { self.api.ov_bitrate(self.raw(), link) };
        check_i64(Operation::Bitrate, i64::from(bitrate))
    }

    /// Audio parameters of link `link`.
    ///
    /// [`ALL_LINKS`] selects the logical bitstream currently being decoded,
    /// as libvorbisfile defines it; it is not an aggregate. Does not move the
    /// decode position.
    pub fn info(&self, link: i32) -> Result<StreamInfo> {
        // SAFETY: open decoder.
        let vi = unsafe { self.api.ov_info(self.raw(), link) };
        // SAFETY: non-null pointers from ov_info stay valid while open.
        match unsafe { vi.as_ref() } {
            Some(vi) => Ok(StreamInfo::from_native(vi)),
            None => Err(VorbisError::InfoNotFound { link }),
        }
    }

    /// Vendor string and user comments of link `link`, with the same link
    /// convention as [`info`](Self::info).
    pub fn comment(&self, link: i32) -> Result<VorbisComment> {
        // SAFETY: open decoder.
        let vc = unsafe { self.api.ov_comment(self.raw(), link) };
        // SAFETY: non-null pointers from ov_comment stay valid while open.
        match unsafe { vc.as_ref() } {
            Some(vc) => Ok(unsafe { VorbisComment::from_native(vc) }),
            None => Err(VorbisError::CommentNotFound { link }),
        }
    }
}

impl Drop for VorbisFile {
    fn drop(&mut self) {
        let Some(vf) = self.vf.take() else {
            return;
        };

        // SAFETY: vf is an initialized, open decoder.
        let status = unsafe { self.api.ov_clear(vf.as_ptr()) };
        if status == 0 {
            // SAFETY: ov_clear succeeded.
            unsafe { NativeAlloc::free(vf) };
        } else {
            // The library may still reference the allocation: leak it.
            error!(
                file = %self.name,
                code = %crate::error::ErrorCode::from_raw(status),
                "ov_clear failed during drop; leaking decoder state"
            );
        }
    }
}

impl std::fmt::Debug for VorbisFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VorbisFile")
            .field("name", &self.name)
            .field("open", &self.is_open())
            .field("bitstream", &self.bitstream)
            .finish()
    }
}

#[cfg(unix)]
fn path_to_cstring(path: &Path) -> Result<CString> {
    use std::os::unix::ffi::OsStrExt;
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| VorbisError::InvalidPath(path.display().to_string()))
}

#[cfg(not(unix))]
fn path_to_cstring(path: &Path) -> Result<CString> {
    let text = path
        .to_str()
        .ok_or_else(|| VorbisError::InvalidPath(path.display().to_string()))?;
    CString::new(text).map_err(|_| VorbisError::InvalidPath(path.display().to_string()))
}

/// Narrow a negative 64-bit native result to its `OV_*` code.
fn status_code(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MIN)
}

fn check_status(operation: Operation, status: c_int) -> Result<()> {
    if status == 0 {
        Ok(())
    } else {
        Err(VorbisError::native(operation, status))
    }
}

fn check_i64(operation: Operation, value: i64) -> Result<i64> {
    if value < 0 {
        Err(VorbisError::native(operation, status_code(value)))
    } else {
        Ok(value)
    }
}

fn check_f64(operation: Operation, value: f64) -> Result<f64> {
    if value < 0.0 {
        // The library reports errors from double-returning calls as the
        // integer code converted to double.
        Err(VorbisError::native(operation, value as i32))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_check_helpers() {
        assert!(check_status(Operation::PcmSeek, 0).is_ok());
        assert_eq!(
            check_status(Operation::PcmSeek, -138).unwrap_err().code(),
            Some(ErrorCode::EnoSeek)
        );

        assert_eq!(check_i64(Operation::PcmTotal, 220500).unwrap(), 220500);
        assert_eq!(
            check_i64(Operation::PcmTotal, -131).unwrap_err().code(),
            Some(ErrorCode::Einval)
        );

        assert_eq!(check_f64(Operation::TimeTotal, 5.0).unwrap(), 5.0);
        assert_eq!(
            check_f64(Operation::TimeTotal, -131.0).unwrap_err().code(),
            Some(ErrorCode::Einval)
        );
    }

    #[test]
    fn test_status_code_saturates() {
        assert_eq!(status_code(-137), -137);
        assert_eq!(status_code(i64::MIN), i32::MIN);
    }

    #[cfg(unix)]
    #[test]
    fn test_path_with_nul_is_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"bad\0name.ogg"));
        assert!(matches!(path_to_cstring(path), Err(VorbisError::InvalidPath(_))));
    }

    #[test]
    fn test_native_alloc_round_trip() {
        let alloc = NativeAlloc::new();
        let raw = alloc.into_raw();
        unsafe { NativeAlloc::free(raw) };

        // Dropping the guard frees as well
        let _guard = NativeAlloc::new();
    }
}
