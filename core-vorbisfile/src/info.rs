//! # Stream Metadata
//!
//! Value snapshots copied out of native `vorbis_info` / `vorbis_comment`
//! structures. They are not cached: in a chained file each logical
//! bitstream has its own parameters, so query per link.

use crate::ffi;
use serde::{Deserialize, Serialize};
use std::ffi::CStr;

/// Audio parameters of one logical bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Vorbis encoder version.
    pub version: i32,
    /// Number of interleaved channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub rate: i64,
    /// Maximum bitrate, or <= 0 if unset.
    pub bitrate_upper: i64,
    /// Nominal bitrate, or <= 0 if unset.
    pub bitrate_nominal: i64,
    /// Minimum bitrate, or <= 0 if unset.
    pub bitrate_lower: i64,
    /// Bitrate window (unused by current encoders).
    pub bitrate_window: i64,
}

impl StreamInfo {
    pub(crate) fn from_native(vi: &ffi::VorbisInfo) -> Self {
        Self {
            version: vi.version,
            channels: u16::try_from(vi.channels).unwrap_or(0),
            rate: i64::from(vi.rate),
            bitrate_upper: i64::from(vi.bitrate_upper),
            bitrate_nominal: i64::from(vi.bitrate_nominal),
            bitrate_lower: i64::from(vi.bitrate_lower),
            bitrate_window: i64::from(vi.bitrate_window),
        }
    }

    /// Whether the stream was encoded at a fixed bitrate.
    pub fn is_constant_bitrate(&self) -> bool {
        self.bitrate_nominal > 0
            && self.bitrate_upper == self.bitrate_nominal
            && self.bitrate_lower == self.bitrate_nominal
    }
}

/// Vendor string and user comments of one logical bitstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VorbisComment {
    pub vendor: String,
    /// Raw `TAG=value` entries in stream order.
    pub user_comments: Vec<String>,
}

impl VorbisComment {
    /// Copy a native comment block.
    ///
    /// # Safety
    ///
    /// `vc` must be a valid `vorbis_comment` owned by an open decoder.
    pub(crate) unsafe fn from_native(vc: &ffi::VorbisComment) -> Self {
        let vendor = if vc.vendor.is_null() {
            String::new()
        } else {
            CStr::from_ptr(vc.vendor).to_string_lossy().into_owned()
        };

        let count = usize::try_from(vc.comments).unwrap_or(0);
        let mut user_comments = Vec::with_capacity(count);
        if !vc.user_comments.is_null() {
            for i in 0..count {
                let entry = *vc.user_comments.add(i);
                if entry.is_null() {
                    continue;
                }
                // Comments are length-prefixed in the stream and may embed NULs
                let text = if vc.comment_lengths.is_null() {
                    CStr::from_ptr(entry).to_string_lossy().into_owned()
                } else {
                    let len = usize::try_from(*vc.comment_lengths.add(i)).unwrap_or(0);
                    let bytes = std::slice::from_raw_parts(entry.cast::<u8>(), len);
                    String::from_utf8_lossy(bytes).into_owned()
                };
                user_comments.push(text);
            }
        }

        Self {
            vendor,
            user_comments,
        }
    }

    /// Values of every comment whose tag matches `tag`, ignoring ASCII case.
    pub fn get_all<'a, 'b>(&'a self, tag: &'b str) -> impl Iterator<Item = &'a str> + 'b
    where
        'a: 'b,
    {
        self.user_comments
            .iter()
            .filter_map(move |entry| split_tag(entry, tag))
    }

    /// First value for `tag`, ignoring ASCII case.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.user_comments
            .iter()
            .find_map(|entry| split_tag(entry, tag))
    }
}

fn split_tag<'a>(entry: &'a str, tag: &str) -> Option<&'a str> {
    let (key, value) = entry.split_once('=')?;
    key.eq_ignore_ascii_case(tag).then_some(value)
}
