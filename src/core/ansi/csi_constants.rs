// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Byte and string constants for the VT escape sequences this crate reads
//! and writes. The renderer's wire-level output is restricted to this set.

/// ESC byte, introducer of every escape sequence.
pub const ESC: u8 = 0x1B;

/// `[`, the second byte of the Control Sequence Introducer.
pub const CSI_BRACKET: u8 = b'[';

/// Raw control bytes produced by terminals in raw mode.
pub const CTRL_RETURN_BYTE: u8 = 0x0A; // Ctrl-Return (LF / Ctrl-J)
pub const TAB_BYTE: u8 = 0x09;
pub const RETURN_BYTE: u8 = 0x0D; // CR
pub const BACKSPACE_BYTE: u8 = 0x08; // Ctrl-H
pub const DEL_BYTE: u8 = 0x7F;

/// Clear from cursor to end of line.
pub const CLEAR_TO_EOL: &str = "\x1b[K";
/// Reset all attributes.
pub const SGR_RESET: &str = "\x1b[0m";
/// Reset foreground colour only.
pub const SGR_RESET_FOREGROUND: &str = "\x1b[39m";
/// Faint / dim, used for ghost suggestions.
pub const SGR_FAINT: &str = "\x1b[2m";
/// Inverse video, used for the active selection.
pub const SGR_INVERSE: &str = "\x1b[7m";
/// Hide and show the cursor around a redraw.
pub const CURSOR_HIDE: &str = "\x1b[?25l";
pub const CURSOR_SHOW: &str = "\x1b[?25h";
