// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Platform terminal I/O: raw mode, width query, signal/console hooks,
//! capability checks, and the blocking byte sources the decoder reads from.

#[cfg(windows)]
mod console_input_windows;
mod raw_mode;
pub mod signal_registry;
#[cfg(unix)]
mod stdin_byte_source;
mod support;
mod terminal_size;

#[cfg(windows)]
pub use console_input_windows::*;
pub use raw_mode::*;
#[cfg(unix)]
pub use stdin_byte_source::*;
pub use support::*;
pub use terminal_size::*;
