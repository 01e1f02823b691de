// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # `r3bl_inline`
//!
//! An embeddable, UTF-8 aware interactive line editor for terminals:
//! grapheme-cluster cursor motion, a horizontally scrolling viewport,
//! selection with clipboard cut/copy/paste, in-place ghost autocomplete
//! suggestions, syntax colouring via a host callback, bounded command
//! history with browsing, and opt-in multi-line editing governed by a host
//! predicate.
//!
//! The crate is strictly synchronous: no async runtime, no background
//! tasks. The only suspension point is the blocking single-byte read from
//! standard input, and all rendering for one keystroke is flushed before
//! the next keystroke is read.
//!
//! ## Quick start
//!
//! ```no_run
//! use r3bl_inline::InlineEditor;
//!
//! let mut editor = InlineEditor::new("calc> ");
//! while let Ok(Some(line)) = editor.readline() {
//!     println!("you typed: {line}");
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! stdin bytes ──▶ key_decoder ──▶ editor state machine ──▶ buffer/lists
//!      ▲                                                      │ dirty
//!      │ raw mode, width,                                     ▼
//! terminal_io ◀───────────────────────────────── render (escape sequences)
//! ```
//!
//! - [`crate::core::graphemes`]: UTF-8 decode, the heuristic cluster
//!   splitter and width estimator, segment/line indices.
//! - [`editor`]: buffer model, selection/clipboard, autocomplete and
//!   history drivers, the key dispatch table, the [`InlineEditor`] handle.
//! - [`key_decoder`]: raw bytes to [`KeyEvent`]s (ESC/CSI table, UTF-8
//!   gathering; the Windows console translator feeds the same decoder).
//! - [`terminal_io`]: raw mode (termios / Console API), width query,
//!   signal handlers with terminal restoration, capability checks.
//! - `render`: incremental redraw with viewport clipping, syntax colour,
//!   selection inverse video, ghost suggestions, cursor parking.

#![warn(clippy::all)]
#![warn(clippy::unwrap_in_result)]
#![warn(rust_2018_idioms)]

pub mod core;
pub mod editor;
mod error;
pub mod key_decoder;
mod render;
pub mod terminal_io;
pub mod test_fixtures;

pub use self::core::ansi::{PaletteColor, PALETTE_RGB_BIT};
pub use self::core::graphemes::{
    default_split, default_width, display_width, utf8_len, GraphemeSplitFn,
    GraphemeWidthFn, TAB_WIDTH,
};
pub use editor::{
    AutocompleteFn, ColorSpan, History, InlineEditor, MultilineFn, SyntaxColorFn,
};
pub use error::InlineError;
pub use key_decoder::{read_key_event, ByteSource, KeyEvent};
pub use render::Viewport;
pub use terminal_io::{
    check_supported, check_tty, emit, emit_color, get_terminal_width, set_utf8_mode,
    RawModeSession, DEFAULT_WIDTH,
};
pub use test_fixtures::OutputMock;
