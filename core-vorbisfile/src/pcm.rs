//! # PCM Output Format
//!
//! Parameters for `ov_read`: byte order, sample word width and signedness,
//! and the result of one read.

use serde::{Deserialize, Serialize};
use std::os::raw::c_int;

/// Byte order of decoded samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Byte order of the host.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::Big
        } else {
            Self::Little
        }
    }

    pub(crate) fn as_bigendianp(self) -> c_int {
        match self {
            Self::Little => 0,
            Self::Big => 1,
        }
    }
}

/// Width of one decoded sample. libvorbisfile supports 8 and 16 bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WordSize {
    Byte = 1,
    Short = 2,
}

impl WordSize {
    /// Bytes per sample.
    pub fn bytes(self) -> usize {
        self as usize
    }

    pub(crate) fn as_word(self) -> c_int {
        self as c_int
    }
}

/// Requested PCM layout for [`VorbisFile::read`](crate::VorbisFile::read).
///
/// Default: little-endian, 16-bit, signed samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PcmFormat {
    pub endianness: Endianness,
    pub word_size: WordSize,
    pub signed: bool,
}

impl Default for PcmFormat {
    fn default() -> Self {
        Self {
            endianness: Endianness::Little,
            word_size: WordSize::Short,
            signed: true,
        }
    }
}

impl PcmFormat {
    /// 16-bit signed samples in host byte order.
    pub fn native_s16() -> Self {
        Self::default().with_endianness(Endianness::native())
    }

    /// 8-bit unsigned samples, the usual layout for 8-bit PCM.
    pub fn u8() -> Self {
        Self {
            endianness: Endianness::Little,
            word_size: WordSize::Byte,
            signed: false,
        }
    }

    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    pub fn with_word_size(mut self, word_size: WordSize) -> Self {
        self.word_size = word_size;
        self
    }

    pub fn with_signed(mut self, signed: bool) -> Self {
        self.signed = signed;
        self
    }

    /// Bytes in one interleaved frame of `channels` samples, as reported by
    /// [`StreamInfo::channels`](crate::StreamInfo::channels).
    pub fn bytes_per_frame(&self, channels: u16) -> usize {
        self.word_size.bytes() * channels as usize
    }

    pub(crate) fn as_sgned(&self) -> c_int {
        c_int::from(self.signed)
    }
}

/// Outcome of one successful read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmChunk {
    /// Bytes written to the front of the buffer.
    pub bytes: usize,
    /// Logical bitstream the bytes belong to. Changes when a chained stream
    /// crosses a link boundary.
    pub bitstream: i32,
}

impl PcmChunk {
    /// `true` when the read produced nothing.
    ///
    /// For a non-empty buffer this is end of stream. A zero-length request
    /// also yields zero bytes without reaching the decoder.
    pub fn is_end_of_stream(&self) -> bool {
        self.bytes == 0
    }
}
