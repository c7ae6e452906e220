//! # Decode Example
//!
//! Loads libvorbisfile, prints stream details and decodes a file to raw
//! 16-bit little-endian PCM.
//!
//! Run with: `cargo run --example decode_demo --package core-vorbisfile -- <input.ogg> [output.pcm]`
//!
//! Set `VORBISFILE_LIBRARY` to point at a specific shared library.

use anyhow::{bail, Context, Result};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_vorbisfile::{PcmFormat, VorbisFile, ALL_LINKS};
use std::fs::File;
use std::io::{self, BufWriter};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default().with_format(LogFormat::Compact))?;

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        bail!("usage: decode_demo <input.ogg> [output.pcm]");
    };
    let output = args.next();

    core_vorbisfile::load().context("libvorbisfile is not available")?;

    let mut file = VorbisFile::open(&input).with_context(|| format!("cannot open {input}"))?;

    // ========================================================================
    // Stream Details
    // ========================================================================

    let info = file.info(ALL_LINKS)?;
    let comment = file.comment(ALL_LINKS)?;
    println!("File:      {}", file.name());
    println!("Vendor:    {}", comment.vendor);
    println!("Channels:  {}", info.channels);
    println!("Rate:      {} Hz", info.rate);
    println!("Streams:   {}", file.streams());

    if file.seekable() {
        println!("Duration:  {:.2} s", file.time_total(ALL_LINKS)?);
        println!("Samples:   {}", file.pcm_total(ALL_LINKS)?);
        println!("Bitrate:   {} bps", file.bitrate(ALL_LINKS)?);
    } else {
        println!("Duration:  unknown (not seekable)");
    }

    for tag in ["TITLE", "ARTIST", "ALBUM"] {
        if let Some(value) = comment.get(tag) {
            println!("{tag:<10} {value}");
        }
    }

    // ========================================================================
    // Decode
    // ========================================================================

    let written = {
        let mut reader = file.pcm_reader(PcmFormat::default()).skip_holes(true);
        match &output {
            Some(path) => {
                let mut sink = BufWriter::new(File::create(path)?);
                io::copy(&mut reader, &mut sink)?
            }
            None => io::copy(&mut reader, &mut io::sink())?,
        }
    };
    println!("Decoded:   {written} bytes");

    file.close()?;
    Ok(())
}
