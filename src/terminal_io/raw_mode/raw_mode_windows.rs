// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Windows console raw mode.
//!
//! Input handle: clear `ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT |
//! ENABLE_PROCESSED_INPUT`, set `ENABLE_VIRTUAL_TERMINAL_INPUT`. Output
//! handle: set `ENABLE_VIRTUAL_TERMINAL_PROCESSING` so our escape
//! sequences are interpreted. Both code pages are switched to UTF-8.
//! Prior modes and code pages are saved for restoration.

use std::sync::{LazyLock, Mutex};
use windows_sys::Win32::System::Console::{
    GetConsoleCP, GetConsoleMode, GetConsoleOutputCP, GetStdHandle, SetConsoleCP,
    SetConsoleMode, SetConsoleOutputCP, CONSOLE_MODE, ENABLE_ECHO_INPUT,
    ENABLE_LINE_INPUT, ENABLE_PROCESSED_INPUT, ENABLE_VIRTUAL_TERMINAL_INPUT,
    ENABLE_VIRTUAL_TERMINAL_PROCESSING, STD_INPUT_HANDLE, STD_OUTPUT_HANDLE,
};

/// UTF-8 code page identifier.
pub const CP_UTF8: u32 = 65001;

#[derive(Debug, Clone, Copy)]
struct SavedConsole {
    input_mode: CONSOLE_MODE,
    output_mode: CONSOLE_MODE,
    input_cp: u32,
    output_cp: u32,
}

static SAVED_CONSOLE: LazyLock<Mutex<Option<SavedConsole>>> =
    LazyLock::new(|| Mutex::new(None));

/// Enable raw console input and VT output processing, saving prior state.
///
/// # Errors
///
/// Returns a diagnostic if the console modes cannot be read or changed
/// (e.g. the process has no console).
pub fn enable_raw_mode() -> miette::Result<()> {
    unsafe {
        let input = GetStdHandle(STD_INPUT_HANDLE);
        let output = GetStdHandle(STD_OUTPUT_HANDLE);

        let mut input_mode: CONSOLE_MODE = 0;
        let mut output_mode: CONSOLE_MODE = 0;
        if GetConsoleMode(input, &mut input_mode) == 0
            || GetConsoleMode(output, &mut output_mode) == 0
        {
            return Err(miette::miette!("failed to query console mode"));
        }

        let saved = SavedConsole {
            input_mode,
            output_mode,
            input_cp: GetConsoleCP(),
            output_cp: GetConsoleOutputCP(),
        };
        if let Ok(mut slot) = SAVED_CONSOLE.lock() {
            if slot.is_none() {
                *slot = Some(saved);
            }
        }

        let raw_input = (input_mode
            & !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT | ENABLE_PROCESSED_INPUT))
            | ENABLE_VIRTUAL_TERMINAL_INPUT;
        let raw_output = output_mode | ENABLE_VIRTUAL_TERMINAL_PROCESSING;

        if SetConsoleMode(input, raw_input) == 0 || SetConsoleMode(output, raw_output) == 0
        {
            return Err(miette::miette!("failed to set console mode"));
        }

        SetConsoleCP(CP_UTF8);
        SetConsoleOutputCP(CP_UTF8);
    }
    Ok(())
}

/// Restore the console modes and code pages saved by [`enable_raw_mode`].
/// No-op if raw mode was never enabled.
pub fn disable_raw_mode() -> miette::Result<()> {
    let saved = SAVED_CONSOLE.lock().ok().and_then(|mut slot| slot.take());
    if let Some(saved) = saved {
        unsafe {
            let input = GetStdHandle(STD_INPUT_HANDLE);
            let output = GetStdHandle(STD_OUTPUT_HANDLE);
            SetConsoleMode(input, saved.input_mode);
            SetConsoleMode(output, saved.output_mode);
            SetConsoleCP(saved.input_cp);
            SetConsoleOutputCP(saved.output_cp);
        }
    }
    Ok(())
}
