//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-vorbisfile`, `core-runtime`). Host applications can
//! depend on `ov-workspace` and enable the documented features without needing
//! to wire each crate individually.

#[cfg(feature = "vorbisfile")]
pub use core_vorbisfile as vorbisfile;

#[cfg(feature = "logging")]
pub use core_runtime as runtime;
