// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Blocking single-byte reads from the POSIX stdin file descriptor.
//!
//! With raw mode's `VMIN=1 / VTIME=0` each `read(2)` returns as soon as one
//! byte is available; this is the interactive loop's only suspension point.

#![cfg(unix)]

use std::io;

/// [`std::io::Read`] over the raw stdin fd (and therefore a
/// [`ByteSource`](crate::ByteSource) via the blanket impl), unbuffered so
/// raw-mode keystrokes are seen the instant they arrive.
#[derive(Debug, Default)]
pub struct StdinByteSource;

impl StdinByteSource {
    #[must_use]
    pub fn new() -> Self { Self }
}

impl io::Read for StdinByteSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        rustix::io::read(rustix::stdio::stdin(), buf).map_err(io::Error::from)
    }
}
