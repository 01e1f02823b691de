// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal capability checks and small output helpers exposed to hosts.

use crate::core::ansi::PaletteColor;
use std::io::{self, Write};

/// Terminal types the interactive path refuses to drive.
const UNSUPPORTED_TERMS: &[&str] = &["dumb", "cons25", "emacs"];

/// Whether both stdin and stdout are terminals.
#[must_use]
pub fn check_tty() -> bool {
    #[cfg(unix)]
    {
        rustix::termios::isatty(rustix::stdio::stdin())
            && rustix::termios::isatty(rustix::stdio::stdout())
    }

    #[cfg(windows)]
    {
        use windows_sys::Win32::System::Console::{
            GetConsoleMode, GetStdHandle, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
        };
        unsafe {
            let mut mode = 0;
            GetConsoleMode(GetStdHandle(STD_INPUT_HANDLE), &mut mode) != 0
                && GetConsoleMode(GetStdHandle(STD_OUTPUT_HANDLE), &mut mode) != 0
        }
    }
}

/// Whether the terminal type is one the escape-sequence renderer can drive.
/// On POSIX this consults `TERM`; the Windows console is always supported.
#[must_use]
pub fn check_supported() -> bool {
    #[cfg(unix)]
    {
        match std::env::var("TERM") {
            Ok(term) if !term.is_empty() => !UNSUPPORTED_TERMS
                .iter()
                .any(|deny| term.eq_ignore_ascii_case(deny)),
            _ => false,
        }
    }

    #[cfg(windows)]
    {
        true
    }
}

/// Switch the console code pages to UTF-8. A no-op on POSIX, where the
/// terminal encoding is byte-transparent already.
pub fn set_utf8_mode() {
    #[cfg(windows)]
    unsafe {
        use windows_sys::Win32::System::Console::{SetConsoleCP, SetConsoleOutputCP};
        const CP_UTF8: u32 = 65001;
        SetConsoleCP(CP_UTF8);
        SetConsoleOutputCP(CP_UTF8);
    }
}

/// Write a string straight to stdout and flush.
///
/// # Errors
///
/// Propagates the underlying write/flush failure.
pub fn emit(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()
}

/// Emit the foreground-colour escape for a palette-encoded colour value
/// (`-1` default, `0–7` basic, `8–15` bright, `16–255` xterm-256, RGB with
/// the `0x01000000` bit). Negative / default values emit nothing.
///
/// # Errors
///
/// Propagates the underlying write/flush failure.
pub fn emit_color(code: i32) -> io::Result<()> {
    let color = PaletteColor::from_code(code);
    if color == PaletteColor::Default {
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    write!(stdout, "{color}")?;
    stdout.flush()
}
