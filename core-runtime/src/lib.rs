//! # Core Runtime Module
//!
//! Provides the runtime plumbing shared by the Ogg Vorbis binding crates:
//! - Logging and tracing infrastructure
//! - Runtime error type
//!
//! ## Overview
//!
//! The binding crates only emit `tracing` events; installing a subscriber is
//! the host's decision. This crate offers a ready-made subscriber setup with
//! the filtering conventions used across the workspace.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
