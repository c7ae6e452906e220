//! # Vorbisfile Error Types
//!
//! The native library reports failures as negative integers. [`ErrorCode`]
//! gives every known value a name, and [`VorbisError`] attaches the operation
//! that produced it.

use std::fmt;
use thiserror::Error;

/// Native `OV_*` status codes returned by libvorbisfile.
///
/// `from_raw` is total: values outside the documented set map to
/// [`ErrorCode::Unknown`] so a negative return is never mistaken for success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// `OV_FALSE`: the call returned false or the stream is not in the
    /// required state.
    False,
    /// `OV_EOF`: end of file reached during a seek or read helper.
    Eof,
    /// `OV_HOLE`: an interruption in the data (lost page, garbage between
    /// pages). Decoding may continue.
    Hole,
    /// `OV_EREAD`: a read from the media returned an error.
    Eread,
    /// `OV_EFAULT`: internal logic fault; indicates a bug or heap/stack
    /// corruption.
    Efault,
    /// `OV_EIMPL`: the bitstream makes use of a feature not implemented.
    Eimpl,
    /// `OV_EINVAL`: invalid argument, or the handle is not fully open.
    Einval,
    /// `OV_ENOTVORBIS`: the given data does not contain Vorbis.
    EnotVorbis,
    /// `OV_EBADHEADER`: invalid Vorbis bitstream header.
    EbadHeader,
    /// `OV_EVERSION`: Vorbis version mismatch.
    Eversion,
    /// `OV_ENOTAUDIO`: packet data submitted is not audio.
    EnotAudio,
    /// `OV_EBADPACKET`: invalid packet submitted.
    EbadPacket,
    /// `OV_EBADLINK`: invalid stream section, or the requested link is
    /// corrupt.
    EbadLink,
    /// `OV_ENOSEEK`: the bitstream is not seekable.
    EnoSeek,
    /// A negative code the library documents nowhere.
    Unknown(i32),
}

impl ErrorCode {
    pub const OV_FALSE: i32 = -1;
    pub const OV_EOF: i32 = -2;
    pub const OV_HOLE: i32 = -3;
    pub const OV_EREAD: i32 = -128;
    pub const OV_EFAULT: i32 = -129;
    pub const OV_EIMPL: i32 = -130;
    pub const OV_EINVAL: i32 = -131;
    pub const OV_ENOTVORBIS: i32 = -132;
    pub const OV_EBADHEADER: i32 = -133;
    pub const OV_EVERSION: i32 = -134;
    pub const OV_ENOTAUDIO: i32 = -135;
    pub const OV_EBADPACKET: i32 = -136;
    pub const OV_EBADLINK: i32 = -137;
    pub const OV_ENOSEEK: i32 = -138;

    /// Map a raw native status to its named code.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            Self::OV_FALSE => Self::False,
            Self::OV_EOF => Self::Eof,
            Self::OV_HOLE => Self::Hole,
            Self::OV_EREAD => Self::Eread,
            Self::OV_EFAULT => Self::Efault,
            Self::OV_EIMPL => Self::Eimpl,
            Self::OV_EINVAL => Self::Einval,
            Self::OV_ENOTVORBIS => Self::EnotVorbis,
            Self::OV_EBADHEADER => Self::EbadHeader,
            Self::OV_EVERSION => Self::Eversion,
            Self::OV_ENOTAUDIO => Self::EnotAudio,
            Self::OV_EBADPACKET => Self::EbadPacket,
            Self::OV_EBADLINK => Self::EbadLink,
            Self::OV_ENOSEEK => Self::EnoSeek,
            other => Self::Unknown(other),
        }
    }

    /// The raw native value of this code.
    pub fn raw(self) -> i32 {
        match self {
            Self::False => Self::OV_FALSE,
            Self::Eof => Self::OV_EOF,
            Self::Hole => Self::OV_HOLE,
            Self::Eread => Self::OV_EREAD,
            Self::Efault => Self::OV_EFAULT,
            Self::Eimpl => Self::OV_EIMPL,
            Self::Einval => Self::OV_EINVAL,
            Self::EnotVorbis => Self::OV_ENOTVORBIS,
            Self::EbadHeader => Self::OV_EBADHEADER,
            Self::Eversion => Self::OV_EVERSION,
            Self::EnotAudio => Self::OV_ENOTAUDIO,
            Self::EbadPacket => Self::OV_EBADPACKET,
            Self::EbadLink => Self::OV_EBADLINK,
            Self::EnoSeek => Self::OV_ENOSEEK,
            Self::Unknown(raw) => raw,
        }
    }

    /// Short symbolic name, e.g. `"EnotVorbis"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::False => "False",
            Self::Eof => "Eof",
            Self::Hole => "Hole",
            Self::Eread => "Eread",
            Self::Efault => "Efault",
            Self::Eimpl => "Eimpl",
            Self::Einval => "Einval",
            Self::EnotVorbis => "EnotVorbis",
            Self::EbadHeader => "EbadHeader",
            Self::Eversion => "Eversion",
            Self::EnotAudio => "EnotAudio",
            Self::EbadPacket => "EbadPacket",
            Self::EbadLink => "EbadLink",
            Self::EnoSeek => "EnoSeek",
            Self::Unknown(_) => "Unknown",
        }
    }

    /// Human-readable description.
    pub fn description(self) -> &'static str {
        match self {
            Self::False => "not true, or the stream is not in the required state",
            Self::Eof => "end of file",
            Self::Hole => "interruption in the data",
            Self::Eread => "read from media returned an error",
            Self::Efault => "internal logic fault",
            Self::Eimpl => "feature not implemented",
            Self::Einval => "invalid argument",
            Self::EnotVorbis => "data is not Vorbis",
            Self::EbadHeader => "invalid Vorbis bitstream header",
            Self::Eversion => "Vorbis version mismatch",
            Self::EnotAudio => "packet is not audio",
            Self::EbadPacket => "invalid packet",
            Self::EbadLink => "invalid or corrupt stream section",
            Self::EnoSeek => "bitstream is not seekable",
            Self::Unknown(_) => "unknown native error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(raw) => write!(f, "Unknown({raw}): {}", self.description()),
            _ => write!(f, "{}: {}", self.name(), self.description()),
        }
    }
}

/// Native entry point that produced an error, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Open,
    Close,
    Read,
    PcmSeek,
    TimeSeek,
    PcmTotal,
    TimeTotal,
    RawTotal,
    PcmTell,
    TimeTell,
    Bitrate,
}

impl Operation {
    /// Name of the native function behind this operation.
    pub fn native_name(self) -> &'static str {
        match self {
            Self::Open => "ov_fopen",
            Self::Close => "ov_clear",
            Self::Read => "ov_read",
            Self::PcmSeek => "ov_pcm_seek",
            Self::TimeSeek => "ov_time_seek",
            Self::PcmTotal => "ov_pcm_total",
            Self::TimeTotal => "ov_time_total",
            Self::RawTotal => "ov_raw_total",
            Self::PcmTell => "ov_pcm_tell",
            Self::TimeTell => "ov_time_tell",
            Self::Bitrate => "ov_bitrate",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.native_name())
    }
}

/// Errors surfaced by the binding.
#[derive(Error, Debug)]
pub enum VorbisError {
    // ========================================================================
    // Library Loading
    // ========================================================================
    /// The shared library could not be resolved. Loading may be retried.
    #[error("Error loading libvorbisfile shared library/dll (tried: {})", tried.join(", "))]
    Load { tried: Vec<String> },

    /// Loader configuration is invalid.
    #[error("Invalid loader configuration: {0}")]
    Config(String),

    // ========================================================================
    // Native Call Failures
    // ========================================================================
    /// A native call returned a negative status.
    #[error("{code} from {operation}")]
    Native { operation: Operation, code: ErrorCode },

    /// `ov_info` reported no such logical bitstream.
    #[error("No stream info for logical bitstream {link}")]
    InfoNotFound { link: i32 },

    /// `ov_comment` reported no such logical bitstream.
    #[error("No comment header for logical bitstream {link}")]
    CommentNotFound { link: i32 },

    // ========================================================================
    // Argument Errors
    // ========================================================================
    /// The path contains an interior NUL byte and cannot be passed to C.
    #[error("Path cannot be passed to the native library: {0}")]
    InvalidPath(String),
}

impl VorbisError {
    pub(crate) fn native(operation: Operation, raw: i32) -> Self {
        Self::Native {
            operation,
            code: ErrorCode::from_raw(raw),
        }
    }

    /// The native code carried by this error, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Native { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Returns `true` if this error is the `OV_ENOSEEK` condition.
    pub fn is_not_seekable(&self) -> bool {
        self.code() == Some(ErrorCode::EnoSeek)
    }

    /// Returns `true` if the caller may reasonably retry or keep going.
    ///
    /// Load failures can be retried, and `OV_HOLE` during a read only marks
    /// a gap in the data.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Load { .. }
                | Self::Native {
                    code: ErrorCode::Hole,
                    ..
                }
        )
    }
}

/// Result type for vorbisfile operations.
pub type Result<T> = std::result::Result<T, VorbisError>;

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: [i32; 14] = [
        -1, -2, -3, -128, -129, -130, -131, -132, -133, -134, -135, -136, -137, -138,
    ];

    #[test]
    fn test_known_codes_are_named() {
        for raw in KNOWN {
            let code = ErrorCode::from_raw(raw);
            assert!(!matches!(code, ErrorCode::Unknown(_)), "{raw} unnamed");
            assert_eq!(code.raw(), raw);
        }
    }

    #[test]
    fn test_bad_header_is_mapped() {
        assert_eq!(ErrorCode::from_raw(-133), ErrorCode::EbadHeader);
        assert_eq!(ErrorCode::EbadHeader.name(), "EbadHeader");
    }

    #[test]
    fn test_unknown_code_is_still_an_error() {
        let code = ErrorCode::from_raw(-999);
        assert_eq!(code, ErrorCode::Unknown(-999));
        assert_eq!(code.raw(), -999);
        assert!(code.to_string().contains("-999"));
    }

    #[test]
    fn test_native_error_display_names_operation() {
        let err = VorbisError::native(Operation::Open, ErrorCode::OV_ENOTVORBIS);
        let text = err.to_string();
        assert!(text.contains("EnotVorbis"));
        assert!(text.contains("ov_fopen"));
        assert_eq!(err.code(), Some(ErrorCode::EnotVorbis));
    }

    #[test]
    fn test_predicates() {
        assert!(VorbisError::native(Operation::PcmSeek, -138).is_not_seekable());
        assert!(!VorbisError::native(Operation::PcmSeek, -131).is_not_seekable());
        assert!(VorbisError::native(Operation::Read, -3).is_recoverable());
        assert!(VorbisError::Load { tried: vec![] }.is_recoverable());
        assert!(!VorbisError::InfoNotFound { link: 3 }.is_recoverable());
    }

    #[test]
    fn test_load_error_lists_attempts() {
        let err = VorbisError::Load {
            tried: vec!["libvorbisfile.so.3".into(), "libvorbisfile.so".into()],
        };
        assert!(err
            .to_string()
            .contains("libvorbisfile.so.3, libvorbisfile.so"));
    }
}
