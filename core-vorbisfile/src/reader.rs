//! `std::io::Read` over a decoder handle.

use crate::error::{ErrorCode, VorbisError};
use crate::file::VorbisFile;
use crate::pcm::PcmFormat;
use std::io;
use tracing::debug;

/// Upper bound on consecutive `OV_HOLE` results skipped by one `read` call
/// when hole skipping is enabled.
pub const MAX_SKIPPED_HOLES: u32 = 64;

/// Streams decoded PCM from a [`VorbisFile`] through [`io::Read`].
///
/// End of stream is reported as `Ok(0)`. Decoder failures, including
/// `OV_HOLE`, become `io::ErrorKind::InvalidData` with the [`VorbisError`] as
/// the source, and the next `read` resumes decoding. With
/// [`skip_holes`](Self::skip_holes) enabled, up to [`MAX_SKIPPED_HOLES`]
/// consecutive holes are passed over before the hole is reported.
pub struct PcmReader<'a> {
    file: &'a mut VorbisFile,
    format: PcmFormat,
    bitstream: Option<i32>,
    skip_holes: bool,
}

impl<'a> PcmReader<'a> {
    pub(crate) fn new(file: &'a mut VorbisFile, format: PcmFormat) -> Self {
        Self {
            file,
            format,
            bitstream: None,
            skip_holes: false,
        }
    }

    /// Pass over interruptions in the data instead of reporting them.
    pub fn skip_holes(mut self, skip: bool) -> Self {
        self.skip_holes = skip;
        self
    }

    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Logical bitstream of the most recent non-empty read.
    pub fn bitstream(&self) -> Option<i32> {
        self.bitstream
    }

    pub fn into_inner(self) -> &'a mut VorbisFile {
        self.file
    }
}

impl io::Read for PcmReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut skipped = 0;
        loop {
            match self.file.read(buf, self.format) {
                Ok(chunk) => {
                    if chunk.bytes > 0 {
                        self.bitstream = Some(chunk.bitstream);
                    }
                    return Ok(chunk.bytes);
                }
                Err(e) if self.skip_holes && is_hole(&e) && skipped < MAX_SKIPPED_HOLES => {
                    skipped += 1;
                    debug!(file = %self.file.name(), skipped, "Skipping hole in stream");
                }
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e)),
            }
        }
    }
}

fn is_hole(error: &VorbisError) -> bool {
    error.code() == Some(ErrorCode::Hole)
}
