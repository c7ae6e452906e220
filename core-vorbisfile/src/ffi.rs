//! # Raw FFI Surface
//!
//! C layouts from `ogg/ogg.h`, `vorbis/codec.h` and `vorbis/vorbisfile.h`,
//! plus the [`VorbisfileApi`] seam through which every native call flows.
//!
//! The layouts must match the C headers exactly: the binding allocates the
//! `OggVorbis_File` itself and reads `vorbis_info` / `vorbis_comment` fields
//! through pointers returned by the library.

#![allow(non_camel_case_types)]

use std::os::raw::{c_char, c_double, c_int, c_long, c_uchar, c_void};

pub type ogg_int64_t = i64;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OggSyncState {
    pub data: *mut c_uchar,
    pub storage: c_int,
    pub fill: c_int,
    pub returned: c_int,
    pub unsynced: c_int,
    pub headerbytes: c_int,
    pub bodybytes: c_int,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct OggStreamState {
    pub body_data: *mut c_uchar,
    pub body_storage: c_long,
    pub body_fill: c_long,
    pub body_returned: c_long,
    pub lacing_vals: *mut c_int,
    pub granule_vals: *mut ogg_int64_t,
    pub lacing_storage: c_long,
    pub lacing_fill: c_long,
    pub lacing_packet: c_long,
    pub lacing_returned: c_long,
    pub header: [c_uchar; 282],
    pub header_fill: c_int,
    pub e_o_s: c_int,
    pub b_o_s: c_int,
    pub serialno: c_long,
    pub pageno: c_long,
    pub packetno: ogg_int64_t,
    pub granulepos: ogg_int64_t,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OggpackBuffer {
    pub endbyte: c_long,
    pub endbit: c_int,
    pub buffer: *mut c_uchar,
    pub ptr: *mut c_uchar,
    pub storage: c_long,
}

/// `vorbis_info`: per logical bitstream audio parameters.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VorbisInfo {
    pub version: c_int,
    pub channels: c_int,
    pub rate: c_long,
    pub bitrate_upper: c_long,
    pub bitrate_nominal: c_long,
    pub bitrate_lower: c_long,
    pub bitrate_window: c_long,
    pub codec_setup: *mut c_void,
}

/// `vorbis_comment`: vendor string and `TAG=value` user comments.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VorbisComment {
    pub user_comments: *mut *mut c_char,
    pub comment_lengths: *mut c_int,
    pub comments: c_int,
    pub vendor: *mut c_char,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VorbisDspState {
    pub analysisp: c_int,
    pub vi: *mut VorbisInfo,
    pub pcm: *mut *mut f32,
    pub pcmret: *mut *mut f32,
    pub pcm_storage: c_int,
    pub pcm_current: c_int,
    pub pcm_returned: c_int,
    pub preextrapolate: c_int,
    pub eofflag: c_int,
    pub l_w: c_long,
    pub w: c_long,
    pub n_w: c_long,
    pub center_w: c_long,
    pub granulepos: ogg_int64_t,
    pub sequence: ogg_int64_t,
    pub glue_bits: ogg_int64_t,
    pub time_bits: ogg_int64_t,
    pub floor_bits: ogg_int64_t,
    pub res_bits: ogg_int64_t,
    pub backend_state: *mut c_void,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VorbisBlock {
    pub pcm: *mut *mut f32,
    pub opb: OggpackBuffer,
    pub l_w: c_long,
    pub w: c_long,
    pub n_w: c_long,
    pub pcmend: c_int,
    pub mode: c_int,
    pub eofflag: c_int,
    pub granulepos: ogg_int64_t,
    pub sequence: ogg_int64_t,
    pub vd: *mut VorbisDspState,
    pub localstore: *mut c_void,
    pub localtop: c_long,
    pub localalloc: c_long,
    pub totaluse: c_long,
    pub reap: *mut c_void,
    pub glue_bits: c_long,
    pub time_bits: c_long,
    pub floor_bits: c_long,
    pub res_bits: c_long,
    pub internal: *mut c_void,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct OvCallbacks {
    pub read_func:
        Option<unsafe extern "C" fn(*mut c_void, usize, usize, *mut c_void) -> usize>,
    pub seek_func: Option<unsafe extern "C" fn(*mut c_void, ogg_int64_t, c_int) -> c_int>,
    pub close_func: Option<unsafe extern "C" fn(*mut c_void) -> c_int>,
    pub tell_func: Option<unsafe extern "C" fn(*mut c_void) -> c_long>,
}

/// `OggVorbis_File`: the decoder context owned by one open handle.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct OggVorbisFile {
    pub datasource: *mut c_void,
    pub seekable: c_int,
    pub offset: ogg_int64_t,
    pub end: ogg_int64_t,
    pub oy: OggSyncState,
    pub links: c_int,
    pub offsets: *mut ogg_int64_t,
    pub dataoffsets: *mut ogg_int64_t,
    pub serialnos: *mut c_long,
    pub pcmlengths: *mut ogg_int64_t,
    pub vi: *mut VorbisInfo,
    pub vc: *mut VorbisComment,
    pub pcm_offset: ogg_int64_t,
    pub ready_state: c_int,
    pub current_serialno: c_long,
    pub current_link: c_int,
    pub bittrack: c_double,
    pub samptrack: c_double,
    pub os: OggStreamState,
    pub vd: VorbisDspState,
    pub vb: VorbisBlock,
    pub callbacks: OvCallbacks,
}

/// The native functions the binding calls.
///
/// [`NativeLibrary`](crate::library::NativeLibrary) implements this over
/// symbols bound from the shared library. Every method has the exact C
/// contract of its `ov_*` namesake, including which pointers must be valid.
///
/// # Safety
///
/// Implementations receive raw pointers from the binding and must honor the
/// libvorbisfile contract for each call. Callers must pass an
/// `OggVorbisFile` that was initialized by a successful `ov_fopen` (except to
/// `ov_fopen` itself) and not yet passed to `ov_clear`.
pub trait VorbisfileApi: Send + Sync {
    unsafe fn ov_fopen(&self, path: *const c_char, vf: *mut OggVorbisFile) -> c_int;

    unsafe fn ov_clear(&self, vf: *mut OggVorbisFile) -> c_int;

    #[allow(clippy::too_many_arguments)]
    unsafe fn ov_read(
        &self,
        vf: *mut OggVorbisFile,
        buffer: *mut c_char,
        length: c_int,
        bigendianp: c_int,
        word: c_int,
        sgned: c_int,
        bitstream: *mut c_int,
    ) -> c_long;

    unsafe fn ov_info(&self, vf: *mut OggVorbisFile, link: c_int) -> *mut VorbisInfo;

    unsafe fn ov_comment(&self, vf: *mut OggVorbisFile, link: c_int) -> *mut VorbisComment;

    unsafe fn ov_seekable(&self, vf: *mut OggVorbisFile) -> c_long;

    unsafe fn ov_streams(&self, vf: *mut OggVorbisFile) -> c_long;

    unsafe fn ov_pcm_seek(&self, vf: *mut OggVorbisFile, pos: ogg_int64_t) -> c_int;

    unsafe fn ov_time_seek(&self, vf: *mut OggVorbisFile, s: c_double) -> c_int;

    unsafe fn ov_pcm_total(&self, vf: *mut OggVorbisFile, i: c_int) -> ogg_int64_t;

    unsafe fn ov_raw_total(&self, vf: *mut OggVorbisFile, i: c_int) -> ogg_int64_t;

    unsafe fn ov_time_total(&self, vf: *mut OggVorbisFile, i: c_int) -> c_double;

    unsafe fn ov_pcm_tell(&self, vf: *mut OggVorbisFile) -> ogg_int64_t;

    unsafe fn ov_time_tell(&self, vf: *mut OggVorbisFile) -> c_double;

    unsafe fn ov_bitrate(&self, vf: *mut OggVorbisFile, i: c_int) -> c_long;
}
