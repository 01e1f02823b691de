// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Raw mode: byte-at-a-time, no-echo terminal input.
//!
//! - **Unix/Linux/macOS**: rustix termios, explicit flag set.
//! - **Windows**: Console API modes + virtual terminal processing.
//!
//! Use [`RawModeSession`] rather than calling the platform functions
//! directly; it reference-counts nested use and restores the terminal on
//! drop, including on panic.

mod raw_mode_core;
#[cfg(unix)]
mod raw_mode_unix;
#[cfg(windows)]
mod raw_mode_windows;

pub use raw_mode_core::*;
