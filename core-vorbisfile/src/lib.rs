//! # Vorbisfile Binding
//!
//! Decodes Ogg Vorbis files through the native libvorbisfile library, which
//! is loaded at runtime instead of linked.
//!
//! ## Overview
//!
//! This crate handles:
//! - Locating and binding the shared library once per process
//! - Opening files into decoder handles with explicit close
//! - Reading interleaved integer PCM in a chosen layout
//! - Seeking and position/duration queries
//! - Stream parameters and comment headers per logical bitstream
//!
//! ## Usage
//!
//! ```no_run
//! use core_vorbisfile::{PcmFormat, VorbisFile, ALL_LINKS};
//!
//! core_vorbisfile::load()?;
//!
//! let mut file = VorbisFile::open("track.ogg")?;
//! let info = file.info(ALL_LINKS)?;
//! println!("{} Hz, {} channels", info.rate, info.channels);
//!
//! let mut buffer = vec![0u8; 4096];
//! loop {
//!     let chunk = file.read(&mut buffer, PcmFormat::default())?;
//!     if chunk.is_end_of_stream() {
//!         break;
//!     }
//!     // consume &buffer[..chunk.bytes]
//! }
//! file.close()?;
//! # Ok::<(), core_vorbisfile::VorbisError>(())
//! ```
//!
//! Every decoder entry point requires a prior successful [`load`]; calling
//! one without it panics.

pub mod config;
pub mod error;
pub mod ffi;
pub mod file;
pub mod info;
pub mod library;
pub mod loader;
pub mod pcm;
pub mod reader;

pub use config::LoaderConfig;
pub use error::{ErrorCode, Operation, Result, VorbisError};
pub use ffi::VorbisfileApi;
pub use file::{VorbisFile, ALL_LINKS};
pub use info::{StreamInfo, VorbisComment};
pub use library::{DynamicResolver, NativeLibrary};
pub use loader::{is_loaded, load, load_with, LibraryResolver, Loader};
pub use pcm::{Endianness, PcmChunk, PcmFormat, WordSize};
pub use reader::{PcmReader, MAX_SKIPPED_HOLES};
