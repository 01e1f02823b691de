// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal width query, with the traditional 80-column fallback.

/// Width assumed when the terminal cannot be queried.
pub const DEFAULT_WIDTH: usize = 80;

/// Query the terminal width in columns.
///
/// # Errors
///
/// Returns a diagnostic when stdout is not attached to a terminal or the
/// query fails.
pub fn try_get_terminal_width() -> miette::Result<usize> {
    #[cfg(unix)]
    {
        let size = rustix::termios::tcgetwinsize(rustix::stdio::stdout())
            .map_err(|e| miette::miette!("failed to query terminal size: {e}"))?;
        if size.ws_col == 0 {
            return Err(miette::miette!("terminal reported zero width"));
        }
        Ok(usize::from(size.ws_col))
    }

    #[cfg(windows)]
    {
        use std::mem::MaybeUninit;
        use windows_sys::Win32::System::Console::{
            GetConsoleScreenBufferInfo, GetStdHandle, CONSOLE_SCREEN_BUFFER_INFO,
            STD_OUTPUT_HANDLE,
        };

        unsafe {
            let output = GetStdHandle(STD_OUTPUT_HANDLE);
            let mut info = MaybeUninit::<CONSOLE_SCREEN_BUFFER_INFO>::zeroed();
            if GetConsoleScreenBufferInfo(output, info.as_mut_ptr()) == 0 {
                return Err(miette::miette!("failed to query console screen buffer"));
            }
            let info = info.assume_init();
            let width = info.srWindow.Right - info.srWindow.Left + 1;
            if width <= 0 {
                return Err(miette::miette!("console reported zero width"));
            }
            Ok(width as usize)
        }
    }
}

/// Terminal width, falling back to [`DEFAULT_WIDTH`] when the query fails.
#[must_use]
pub fn get_terminal_width() -> usize {
    try_get_terminal_width().unwrap_or(DEFAULT_WIDTH)
}
