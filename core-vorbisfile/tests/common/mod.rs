//! In-process stand-in for libvorbisfile.
//!
//! The file name passed to `ov_fopen` selects the simulated stream:
//! - `missing*`      fails with `OV_FALSE` like a failed `fopen`
//! - `notvorbis*`    fails with `OV_ENOTVORBIS`
//! - `stream*`       stereo 44.1 kHz, 5 s, not seekable
//! - `chained*`      link 0 stereo 44.1 kHz 2 s, link 1 mono 22.05 kHz 1 s
//! - `hole*`         default stream whose first read reports `OV_HOLE`
//! - `corrupt*`      default stream whose every read reports `OV_HOLE`
//! - anything else   stereo 44.1 kHz, 5 s, seekable

#![allow(dead_code)]

use core_vorbisfile::ffi::{ogg_int64_t, OggVorbisFile, VorbisComment, VorbisInfo};
use core_vorbisfile::{ErrorCode, LibraryResolver, Loader, Result, VorbisfileApi};
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_double, c_int, c_long};
use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Samples handed out per `ov_read` call at most, like a decoded packet.
const PACKET_FRAMES: i64 = 1024;

struct Link {
    channels: i32,
    rate: i64,
    samples: i64,
    nominal_bitrate: i64,
}

impl Link {
    fn raw_bytes(&self) -> i64 {
        self.samples * self.nominal_bitrate / (8 * self.rate)
    }

    fn seconds(&self) -> f64 {
        self.samples as f64 / self.rate as f64
    }
}

struct CommentBlock {
    _vendor: CString,
    _entries: Vec<CString>,
    _pointers: Vec<*mut c_char>,
    _lengths: Vec<c_int>,
    block: Box<VorbisComment>,
}

impl CommentBlock {
    fn new(vendor: &str, entries: &[&str]) -> Self {
        let vendor = CString::new(vendor).unwrap();
        let entries: Vec<CString> = entries.iter().map(|e| CString::new(*e).unwrap()).collect();
        let mut pointers: Vec<*mut c_char> = entries.iter().map(|e| e.as_ptr() as *mut c_char).collect();
        let mut lengths: Vec<c_int> = entries.iter().map(|e| e.as_bytes().len() as c_int).collect();

        let block = Box::new(VorbisComment {
            user_comments: pointers.as_mut_ptr(),
            comment_lengths: lengths.as_mut_ptr(),
            comments: entries.len() as c_int,
            vendor: vendor.as_ptr() as *mut c_char,
        });

        Self {
            _vendor: vendor,
            _entries: entries,
            _pointers: pointers,
            _lengths: lengths,
            block,
        }
    }
}

struct FakeStream {
    links: Vec<Link>,
    infos: Vec<Box<VorbisInfo>>,
    comments: Vec<CommentBlock>,
    seekable: bool,
    /// Absolute sample position across all links.
    position: i64,
    /// Reads left that report `OV_HOLE` before data flows.
    pending_holes: u32,
}

impl FakeStream {
    fn for_name(name: &str) -> Self {
        let stereo = || Link {
            channels: 2,
            rate: 44100,
            samples: 220_500,
            nominal_bitrate: 128_000,
        };

        let (links, seekable, pending_holes) = if name.starts_with("chained") {
            let first = Link {
                channels: 2,
                rate: 44100,
                samples: 88_200,
                nominal_bitrate: 128_000,
            };
            let second = Link {
                channels: 1,
                rate: 22050,
                samples: 22_050,
                nominal_bitrate: 64_000,
            };
            (vec![first, second], true, 0)
        } else if name.starts_with("stream") {
            (vec![stereo()], false, 0)
        } else if name.starts_with("hole") {
            (vec![stereo()], true, 1)
        } else if name.starts_with("corrupt") {
            (vec![stereo()], true, u32::MAX)
        } else {
            (vec![stereo()], true, 0)
        };

        let infos = links
            .iter()
            .map(|l| {
                Box::new(VorbisInfo {
                    version: 0,
                    channels: l.channels,
                    rate: l.rate as c_long,
                    bitrate_upper: -1,
                    bitrate_nominal: l.nominal_bitrate as c_long,
                    bitrate_lower: -1,
                    bitrate_window: 0,
                    codec_setup: ptr::null_mut(),
                })
            })
            .collect();

        let comments = (0..links.len())
            .map(|i| {
                let title = format!("TITLE=Part {}", i + 1);
                CommentBlock::new("Fake vorbisfile", &[title.as_str(), "ARTIST=Test Tone"])
            })
            .collect();

        Self {
            links,
            infos,
            comments,
            seekable,
            position: 0,
            pending_holes,
        }
    }

    fn total_samples(&self) -> i64 {
        self.links.iter().map(|l| l.samples).sum()
    }

    /// Link containing `position` and the sample offset where it starts.
    fn locate(&self, position: i64) -> (usize, i64) {
        let mut start = 0;
        for (index, link) in self.links.iter().enumerate() {
            if position < start + link.samples {
                return (index, start);
            }
            start += link.samples;
        }
        let last = self.links.len() - 1;
        (last, start - self.links[last].samples)
    }

    fn link(&self, i: c_int) -> Option<&Link> {
        usize::try_from(i).ok().and_then(|i| self.links.get(i))
    }

    fn current_link(&self) -> usize {
        self.locate(self.position).0
    }

    fn elapsed_seconds(&self) -> f64 {
        let (index, start) = self.locate(self.position);
        let before: f64 = self.links[..index].iter().map(Link::seconds).sum();
        before + (self.position - start) as f64 / self.links[index].rate as f64
    }
}

unsafe fn stream<'a>(vf: *mut OggVorbisFile) -> &'a mut FakeStream {
    &mut *((*vf).datasource as *mut FakeStream)
}

/// Resolver handing out a prepared fake library.
pub struct FakeResolver(pub Arc<FakeVorbisfile>);

impl LibraryResolver for FakeResolver {
    fn resolve(&self) -> Result<Arc<dyn VorbisfileApi>> {
        Ok(self.0.clone())
    }
}

/// A fresh loader that has bound `fake`.
pub fn loaded(fake: &Arc<FakeVorbisfile>) -> Loader {
    let loader = Loader::new();
    loader.load_with(&FakeResolver(fake.clone())).unwrap();
    loader
}

/// Fake library with call counters.
#[derive(Default)]
pub struct FakeVorbisfile {
    opens: AtomicUsize,
    failed_opens: AtomicUsize,
    clears: AtomicUsize,
    reads: AtomicUsize,
    fail_clear: AtomicBool,
}

impl FakeVorbisfile {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Successful `ov_fopen` calls.
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn failed_opens(&self) -> usize {
        self.failed_opens.load(Ordering::SeqCst)
    }

    /// Successful `ov_clear` calls.
    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    /// `ov_read` calls that reached the decoder.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Decoders currently open.
    pub fn live(&self) -> usize {
        self.opens() - self.clears()
    }

    /// Make `ov_clear` fail until reset.
    pub fn set_fail_clear(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }
}

impl VorbisfileApi for FakeVorbisfile {
    unsafe fn ov_fopen(&self, path: *const c_char, vf: *mut OggVorbisFile) -> c_int {
        let path = CStr::from_ptr(path).to_string_lossy().into_owned();
        let name = path.rsplit(['/', '\\']).next().unwrap_or(&path).to_string();

        if name.starts_with("missing") {
            self.failed_opens.fetch_add(1, Ordering::SeqCst);
            return ErrorCode::OV_FALSE;
        }
        if name.starts_with("notvorbis") {
            self.failed_opens.fetch_add(1, Ordering::SeqCst);
            return ErrorCode::OV_ENOTVORBIS;
        }

        let mut native: OggVorbisFile = std::mem::zeroed();
        let state = Box::new(FakeStream::for_name(&name));
        native.seekable = c_int::from(state.seekable);
        native.links = state.links.len() as c_int;
        native.datasource = Box::into_raw(state).cast();
        vf.write(native);

        self.opens.fetch_add(1, Ordering::SeqCst);
        0
    }

    unsafe fn ov_clear(&self, vf: *mut OggVorbisFile) -> c_int {
        if self.fail_clear.load(Ordering::SeqCst) {
            return ErrorCode::OV_EFAULT;
        }
        let datasource = (*vf).datasource;
        if !datasource.is_null() {
            drop(Box::from_raw(datasource as *mut FakeStream));
            (*vf).datasource = ptr::null_mut();
        }
        self.clears.fetch_add(1, Ordering::SeqCst);
        0
    }

    unsafe fn ov_read(
        &self,
        vf: *mut OggVorbisFile,
        buffer: *mut c_char,
        length: c_int,
        _bigendianp: c_int,
        word: c_int,
        _sgned: c_int,
        bitstream: *mut c_int,
    ) -> c_long {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let s = stream(vf);

        if s.pending_holes > 0 {
            s.pending_holes -= 1;
            return ErrorCode::OV_HOLE as c_long;
        }
        if s.position >= s.total_samples() {
            return 0;
        }

        let (index, start) = s.locate(s.position);
        let link = &s.links[index];
        let frame_bytes = i64::from(word) * i64::from(link.channels);
        let frames = (i64::from(length) / frame_bytes)
            .min(start + link.samples - s.position)
            .min(PACKET_FRAMES);
        if frames <= 0 {
            return ErrorCode::OV_EINVAL as c_long;
        }

        let bytes = frames * frame_bytes;
        ptr::write_bytes(buffer.cast::<u8>(), 0x11, bytes as usize);
        s.position += frames;
        *bitstream = index as c_int;
        (*vf).current_link = index as c_int;
        bytes as c_long
    }

    unsafe fn ov_info(&self, vf: *mut OggVorbisFile, link: c_int) -> *mut VorbisInfo {
        let s = stream(vf);
        let index = if link < 0 { s.current_link() } else { link as usize };
        match s.infos.get_mut(index) {
            Some(info) => &mut **info as *mut VorbisInfo,
            None => ptr::null_mut(),
        }
    }

    unsafe fn ov_comment(&self, vf: *mut OggVorbisFile, link: c_int) -> *mut VorbisComment {
        let s = stream(vf);
        let index = if link < 0 { s.current_link() } else { link as usize };
        match s.comments.get_mut(index) {
            Some(comment) => &mut *comment.block as *mut VorbisComment,
            None => ptr::null_mut(),
        }
    }

    unsafe fn ov_seekable(&self, vf: *mut OggVorbisFile) -> c_long {
        c_long::from(stream(vf).seekable)
    }

    unsafe fn ov_streams(&self, vf: *mut OggVorbisFile) -> c_long {
        stream(vf).links.len() as c_long
    }

    unsafe fn ov_pcm_seek(&self, vf: *mut OggVorbisFile, pos: ogg_int64_t) -> c_int {
        let s = stream(vf);
        if !s.seekable {
            return ErrorCode::OV_ENOSEEK;
        }
        if pos < 0 || pos > s.total_samples() {
            return ErrorCode::OV_EINVAL;
        }
        s.position = pos;
        0
    }

    unsafe fn ov_time_seek(&self, vf: *mut OggVorbisFile, seconds: c_double) -> c_int {
        let s = stream(vf);
        if !s.seekable {
            return ErrorCode::OV_ENOSEEK;
        }
        if seconds < 0.0 {
            return ErrorCode::OV_EINVAL;
        }

        let mut remaining = seconds;
        let mut start = 0;
        for link in &s.links {
            if remaining < link.seconds() {
                s.position = start + (remaining * link.rate as f64) as i64;
                return 0;
            }
            remaining -= link.seconds();
            start += link.samples;
        }
        ErrorCode::OV_EINVAL
    }

    unsafe fn ov_pcm_total(&self, vf: *mut OggVorbisFile, i: c_int) -> ogg_int64_t {
        let s = stream(vf);
        if !s.seekable {
            return i64::from(ErrorCode::OV_EINVAL);
        }
        if i < 0 {
            return s.total_samples();
        }
        s.link(i).map_or(i64::from(ErrorCode::OV_EINVAL), |l| l.samples)
    }

    unsafe fn ov_raw_total(&self, vf: *mut OggVorbisFile, i: c_int) -> ogg_int64_t {
        let s = stream(vf);
        if !s.seekable {
            return i64::from(ErrorCode::OV_EINVAL);
        }
        if i < 0 {
            return s.links.iter().map(Link::raw_bytes).sum();
        }
        s.link(i).map_or(i64::from(ErrorCode::OV_EINVAL), Link::raw_bytes)
    }

    unsafe fn ov_time_total(&self, vf: *mut OggVorbisFile, i: c_int) -> c_double {
        let s = stream(vf);
        if !s.seekable {
            return f64::from(ErrorCode::OV_EINVAL);
        }
        if i < 0 {
            return s.links.iter().map(Link::seconds).sum();
        }
        s.link(i).map_or(f64::from(ErrorCode::OV_EINVAL), Link::seconds)
    }

    unsafe fn ov_pcm_tell(&self, vf: *mut OggVorbisFile) -> ogg_int64_t {
        stream(vf).position
    }

    unsafe fn ov_time_tell(&self, vf: *mut OggVorbisFile) -> c_double {
        stream(vf).elapsed_seconds()
    }

    unsafe fn ov_bitrate(&self, vf: *mut OggVorbisFile, i: c_int) -> c_long {
        let s = stream(vf);
        if i < 0 {
            let bits: i64 = s.links.iter().map(Link::raw_bytes).sum::<i64>() * 8;
            let seconds: f64 = s.links.iter().map(Link::seconds).sum();
            return (bits as f64 / seconds) as c_long;
        }
        s.link(i)
            .map_or(ErrorCode::OV_EINVAL as c_long, |l| l.nominal_bitrate as c_long)
    }
}
