// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Logical key events produced by the decoder. Backend-agnostic: the POSIX
//! byte stream and the Windows console translation both funnel into this
//! one enum.

/// A single decoded keypress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// An escape sequence or byte the decoder does not recognise.
    Unknown,
    /// A printable character, decoded from UTF-8.
    Character(char),
    /// Return / Enter (CR).
    Return,
    /// Ctrl-Return (LF, i.e. Ctrl-J).
    CtrlReturn,
    Tab,
    /// Shift-Tab (`CSI Z`).
    ShiftTab,
    /// Backspace / DEL.
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    ShiftLeft,
    ShiftRight,
    /// Ctrl plus an uppercase letter `A`–`Z`.
    Ctrl(char),
    /// Alt (ESC prefix) plus a character.
    Alt(char),
}
