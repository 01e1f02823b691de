// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Windows console input translation.
//!
//! The console delivers structured key events rather than a byte stream.
//! This layer maps virtual-key codes to the same escape sequences a POSIX
//! terminal would produce, Ctrl+letter to control bytes, Alt to an ESC
//! prefix, and Unicode characters (including surrogate pairs) to UTF-8,
//! then feeds everything through the one shared decoder. Window resize
//! events flip the process-wide resize flag.

#![cfg(windows)]

use super::signal_registry;
use std::collections::VecDeque;
use std::io;
use windows_sys::Win32::System::Console::{
    GetStdHandle, ReadConsoleInputW, INPUT_RECORD, KEY_EVENT, LEFT_ALT_PRESSED,
    LEFT_CTRL_PRESSED, RIGHT_ALT_PRESSED, RIGHT_CTRL_PRESSED, SHIFT_PRESSED,
    STD_INPUT_HANDLE, WINDOW_BUFFER_SIZE_EVENT,
};
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{
    VK_DELETE, VK_DOWN, VK_END, VK_HOME, VK_LEFT, VK_NEXT, VK_PRIOR, VK_RIGHT, VK_TAB,
    VK_UP,
};

/// Byte source over the console input handle. Implements
/// [`std::io::Read`], so the blanket [`ByteSource`](crate::ByteSource)
/// impl applies and the POSIX decoder consumes it unchanged.
#[derive(Debug, Default)]
pub struct ConsoleByteSource {
    queue: VecDeque<u8>,
    pending_high_surrogate: Option<u16>,
}

impl ConsoleByteSource {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Block until the console produces at least one translated byte, or
    /// report EOF when reading the console fails.
    fn pump(&mut self) -> io::Result<bool> {
        while self.queue.is_empty() {
            let mut record: INPUT_RECORD = unsafe { std::mem::zeroed() };
            let mut read: u32 = 0;
            let ok = unsafe {
                ReadConsoleInputW(GetStdHandle(STD_INPUT_HANDLE), &mut record, 1, &mut read)
            };
            if ok == 0 || read == 0 {
                return Ok(false);
            }

            match record.EventType as u32 {
                e if e == KEY_EVENT as u32 => {
                    let key = unsafe { record.Event.KeyEvent };
                    if key.bKeyDown == 0 {
                        continue;
                    }
                    for _ in 0..key.wRepeatCount.max(1) {
                        self.translate_key(
                            key.wVirtualKeyCode,
                            unsafe { key.uChar.UnicodeChar },
                            key.dwControlKeyState,
                        );
                    }
                }
                e if e == WINDOW_BUFFER_SIZE_EVENT as u32 => {
                    signal_registry::set_resize_pending();
                }
                _ => {}
            }
        }
        Ok(true)
    }

    fn translate_key(&mut self, vk: u16, unicode: u16, control_state: u32) {
        let shift = control_state & SHIFT_PRESSED != 0;
        let ctrl = control_state & (LEFT_CTRL_PRESSED | RIGHT_CTRL_PRESSED) != 0;
        let alt = control_state & (LEFT_ALT_PRESSED | RIGHT_ALT_PRESSED) != 0;

        // Navigation keys become the POSIX escape sequences.
        let sequence: Option<&[u8]> = match vk {
            VK_UP => Some(b"\x1b[A"),
            VK_DOWN => Some(b"\x1b[B"),
            VK_RIGHT => {
                if shift {
                    Some(b"\x1b[1;2C")
                } else {
                    Some(b"\x1b[C")
                }
            }
            VK_LEFT => {
                if shift {
                    Some(b"\x1b[1;2D")
                } else {
                    Some(b"\x1b[D")
                }
            }
            VK_HOME => Some(b"\x1b[H"),
            VK_END => Some(b"\x1b[F"),
            VK_PRIOR => Some(b"\x1b[5~"),
            VK_NEXT => Some(b"\x1b[6~"),
            VK_TAB if shift => Some(b"\x1b[Z"),
            VK_DELETE => Some(&[0x7F]),
            _ => None,
        };
        if let Some(sequence) = sequence {
            self.queue.extend(sequence);
            return;
        }

        if unicode == 0 {
            return; // modifier-only event
        }

        // Ctrl+letter arrives as the control byte already on most layouts;
        // synthesise it when the console hands us the plain letter instead.
        if ctrl {
            let c = unicode as u8;
            if (0x01..=0x1A).contains(&c) {
                self.queue.push_back(c);
                return;
            }
            if unicode.is_ascii() {
                let upper = (unicode as u8).to_ascii_uppercase();
                if upper.is_ascii_uppercase() {
                    self.queue.push_back(upper - b'A' + 1);
                    return;
                }
            }
        }

        if alt {
            self.queue.push_back(0x1B);
        }

        // Unicode character, possibly one half of a surrogate pair.
        let code_unit = unicode;
        if (0xD800..=0xDBFF).contains(&code_unit) {
            self.pending_high_surrogate = Some(code_unit);
            return;
        }
        let scalar = if (0xDC00..=0xDFFF).contains(&code_unit) {
            match self.pending_high_surrogate.take() {
                Some(high) => {
                    0x10000
                        + ((u32::from(high) - 0xD800) << 10)
                        + (u32::from(code_unit) - 0xDC00)
                }
                None => return, // stray low surrogate
            }
        } else {
            u32::from(code_unit)
        };

        if let Some(c) = char::from_u32(scalar) {
            let mut utf8 = [0u8; 4];
            self.queue.extend(c.encode_utf8(&mut utf8).as_bytes());
        }
    }
}

impl io::Read for ConsoleByteSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.queue.is_empty() && !self.pump()? {
            return Ok(0);
        }
        let mut n = 0;
        while n < buf.len() {
            match self.queue.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }
}
