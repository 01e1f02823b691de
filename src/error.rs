// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Public error type for the line editor.

use thiserror::Error;

/// Errors surfaced by [`InlineEditor`](crate::InlineEditor) entry points.
///
/// Recoverable conditions (malformed UTF-8 from the splitter, misbehaving
/// host callbacks, failed resize queries) are handled internally and never
/// reach the host; see the individual component docs.
#[derive(Debug, Error)]
pub enum InlineError {
    /// An internal allocation failed or a requested buffer growth would
    /// overflow `usize`. The editor state is left unchanged.
    #[error("out of memory growing the edit buffer")]
    OutOfMemory,

    /// I/O failure reading from or writing to the terminal.
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// Raw mode could not be entered even though the terminal looked
    /// interactive. The read returns whatever is already in the buffer.
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(String),
}

impl From<std::collections::TryReserveError> for InlineError {
    fn from(_: std::collections::TryReserveError) -> Self { InlineError::OutOfMemory }
}
