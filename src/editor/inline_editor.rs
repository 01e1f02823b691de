// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The editor handle and the `readline` entry points.
//!
//! A host creates one [`InlineEditor`], installs whatever callbacks it
//! wants, and calls [`readline`](InlineEditor::readline) in its REPL loop.
//! Depending on the terminal, `readline` takes one of three paths:
//!
//! - stdin/stdout are not TTYs → read a line verbatim from stdin;
//! - the terminal type is unsupported (`TERM` = dumb/cons25/emacs) → print
//!   the prompt and read a line through the OS;
//! - otherwise → raw mode plus the full interactive editor.
//!
//! The interactive loop is strictly synchronous: decode one keypress,
//! dispatch it, repaint if anything changed, repeat until commit or EOF.
//! I/O is injected ([`ByteSource`] in, [`Write`] out), which is how the
//! scripted tests drive the editor without a terminal.

use super::callbacks::{AutocompleteFn, ColorSpan, MultilineFn, SyntaxColorFn};
use super::clipboard::Clipboard;
use super::edit_buffer::EditBuffer;
use super::history::History;
use super::selection::Selection;
use super::suggestions::Suggestions;
use crate::core::ansi::PaletteColor;
use crate::core::graphemes::{
    default_split, default_width, display_width, GraphemeSplitFn, GraphemeWidthFn,
};
use crate::error::InlineError;
use crate::key_decoder::{read_key_event, ByteSource};
use crate::render::{display_with_syntax, redraw, RenderContext, Viewport};
use crate::terminal_io::{self, signal_registry, RawModeSession};
use std::io::{self, BufRead, Write};

use super::apply_key_event::LoopControl;

/// Turn on `tracing` debug events for the read loop.
pub(crate) const DEBUG_INLINE: bool = false;

/// Prompt used by [`InlineEditor::default`].
const DEFAULT_PROMPT: &str = "> ";

/// An embeddable interactive line editor.
///
/// Owns the prompt strings, the text buffer with its grapheme/line indices,
/// the clipboard, the palette, the suggestion and history lists, and the
/// viewport. Host callbacks are installed with the `set_*` methods and are
/// only borrowed. Not `Sync`: an editor must stay on the thread that owns
/// its terminal.
pub struct InlineEditor {
    pub(crate) prompt: String,
    pub(crate) continuation_prompt: Option<String>,
    pub(crate) buffer: EditBuffer,
    pub(crate) selection: Selection,
    pub(crate) clipboard: Clipboard,
    pub(crate) palette: Vec<PaletteColor>,
    pub(crate) suggestions: Suggestions,
    pub(crate) history: History,
    pub(crate) syntax_fn: Option<SyntaxColorFn>,
    pub(crate) complete_fn: Option<AutocompleteFn>,
    pub(crate) multiline_fn: Option<MultilineFn>,
    pub(crate) split: GraphemeSplitFn,
    pub(crate) width_fn: GraphemeWidthFn,
    pub(crate) viewport: Viewport,
    install_signal_handlers: bool,
    pub(crate) refresh_requested: bool,
    pub(crate) suggestion_shown: bool,
    pub(crate) term_cursor_row: usize,
    pub(crate) term_lines_drawn: usize,
}

impl InlineEditor {
    /// Create an editor that displays `prompt` (copied).
    #[must_use]
    pub fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_owned(),
            continuation_prompt: None,
            buffer: EditBuffer::new(),
            selection: Selection::new(),
            clipboard: Clipboard::new(),
            palette: Vec::new(),
            suggestions: Suggestions::new(),
            history: History::new(),
            syntax_fn: None,
            complete_fn: None,
            multiline_fn: None,
            split: default_split,
            width_fn: default_width,
            viewport: Viewport::new(),
            install_signal_handlers: true,
            refresh_requested: false,
            suggestion_shown: false,
            term_cursor_row: 0,
            term_lines_drawn: 0,
        }
    }

    // Configuration.

    /// History cap: positive caps the entry count, `0` disables history,
    /// negative means unlimited. Excess entries are trimmed immediately.
    pub fn set_history_max_length(&mut self, max: isize) {
        self.history.set_max_length(max);
    }

    /// Append an entry to the history (copied). Returns whether it was
    /// accepted; empty entries and repeats of the most recent entry are
    /// not.
    pub fn add_history(&mut self, entry: &str) -> bool { self.history.add(entry) }

    /// Install the syntax colouring callback. Takes effect once a palette
    /// is installed too.
    pub fn set_syntax_color(
        &mut self,
        f: impl FnMut(&str, usize) -> Option<ColorSpan> + 'static,
    ) {
        self.syntax_fn = Some(Box::new(f));
    }

    /// Install the colour palette (copied). An empty palette is rejected
    /// and clears any previous one. Returns whether the palette was
    /// accepted.
    pub fn set_palette(&mut self, codes: &[i32]) -> bool {
        self.palette.clear();
        if codes.is_empty() {
            return false;
        }
        self.palette.extend(codes.iter().map(|&c| PaletteColor::from_code(c)));
        true
    }

    /// Install the autocomplete enumerator.
    pub fn set_autocomplete(
        &mut self,
        f: impl FnMut(&str, &mut usize) -> Option<String> + 'static,
    ) {
        self.complete_fn = Some(Box::new(f));
    }

    /// Install the multi-line predicate and an optional continuation
    /// prompt (copied; the main prompt is used when `None`).
    pub fn set_multiline(
        &mut self,
        f: impl FnMut(&str) -> bool + 'static,
        continuation_prompt: Option<&str>,
    ) {
        self.multiline_fn = Some(Box::new(f));
        self.continuation_prompt = continuation_prompt.map(ToOwned::to_owned);
    }

    /// Replace the built-in heuristic grapheme splitter.
    pub fn set_grapheme_splitter(&mut self, f: GraphemeSplitFn) { self.split = f; }

    /// Replace the built-in grapheme width estimator.
    pub fn set_grapheme_width(&mut self, f: GraphemeWidthFn) { self.width_fn = f; }

    /// Opt out of installing signal/console handlers on raw-mode entry.
    pub fn set_install_signal_handlers(&mut self, install: bool) {
        self.install_signal_handlers = install;
    }

    // Observable state (used by hosts and tests).

    /// Current buffer contents.
    #[must_use]
    pub fn line(&self) -> &str { self.buffer.as_str() }

    /// Cursor position, as a grapheme index in `[0, grapheme_count]`.
    #[must_use]
    pub fn cursor_position(&self) -> usize { self.buffer.cursor() }

    #[must_use]
    pub fn has_selection(&self) -> bool { self.selection.is_active() }

    /// The suffix the autocomplete driver currently offers.
    #[must_use]
    pub fn current_suggestion(&self) -> Option<&str> { self.suggestions.current() }

    #[must_use]
    pub fn history(&self) -> &History { &self.history }

    // Reading.

    /// Read one line of input. Returns `Ok(None)` on end-of-input,
    /// distinguishable from a committed empty line (`Ok(Some(""))`).
    ///
    /// # Errors
    ///
    /// Fails on terminal I/O errors or allocation failure; the terminal is
    /// restored on every exit path.
    pub fn readline(&mut self) -> Result<Option<String>, InlineError> {
        self.reset_read_state();

        if !terminal_io::check_tty() {
            DEBUG_INLINE.then(|| tracing::debug!(message = "readline: not a tty"));
            return read_no_terminal();
        }
        if !terminal_io::check_supported() {
            DEBUG_INLINE.then(|| tracing::debug!(message = "readline: unsupported TERM"));
            return self.read_unsupported();
        }
        self.read_interactive()
    }

    /// Drive the interactive editor over injected I/O, bypassing terminal
    /// detection and raw mode. This is the dependency-injection seam used
    /// by the scripted tests; embedders with their own transport (an SSH
    /// channel, a PTY mux) can use it directly.
    ///
    /// # Errors
    ///
    /// Same contract as [`readline`](Self::readline).
    pub fn readline_with_io(
        &mut self,
        source: &mut dyn ByteSource,
        sink: &mut dyn Write,
        terminal_cols: usize,
    ) -> Result<Option<String>, InlineError> {
        self.reset_read_state();
        self.run_event_loop(source, sink, terminal_cols)
    }

    /// Echo `text` to stdout through the syntax callback and palette.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn display_with_syntax_coloring(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.display_with_syntax_coloring_to(text, &mut stdout)
    }

    /// [`display_with_syntax_coloring`](Self::display_with_syntax_coloring)
    /// into an arbitrary sink.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn display_with_syntax_coloring_to(
        &mut self,
        text: &str,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        display_with_syntax(text, &self.palette, self.syntax_fn.as_mut(), out)
    }

    // Internals.

    /// Every read starts from a blank slate; only history, clipboard,
    /// palette and callbacks persist across reads.
    fn reset_read_state(&mut self) {
        self.buffer.clear();
        self.selection.clear();
        self.suggestions.clear();
        self.history.end_browse();
        self.suggestion_shown = false;
        self.refresh_requested = false;
        self.term_cursor_row = 0;
        self.term_lines_drawn = 0;
        self.viewport.reset_scroll();
    }

    fn read_interactive(&mut self) -> Result<Option<String>, InlineError> {
        terminal_io::set_utf8_mode();

        let Ok(session) = RawModeSession::enter(self.install_signal_handlers) else {
            // Terminal looked interactive but raw mode failed: skip the
            // interactive path, producing whatever is already buffered.
            return Ok(Some(self.buffer.as_str().to_owned()));
        };

        let cols = terminal_io::get_terminal_width();
        let mut sink = io::stdout();
        let result = {
            #[cfg(unix)]
            {
                let mut source = terminal_io::StdinByteSource::new();
                self.run_event_loop(&mut source, &mut sink, cols)
            }
            #[cfg(windows)]
            {
                let mut source = terminal_io::ConsoleByteSource::new();
                self.run_event_loop(&mut source, &mut sink, cols)
            }
        };
        drop(session);
        result
    }

    fn run_event_loop(
        &mut self,
        source: &mut dyn ByteSource,
        sink: &mut dyn Write,
        terminal_cols: usize,
    ) -> Result<Option<String>, InlineError> {
        let prompt_cols = display_width(&self.prompt, self.split, self.width_fn);
        self.viewport.resize(terminal_cols, prompt_cols);

        self.render(sink)?;

        let mut saw_eof = false;
        loop {
            let Some(key) = read_key_event(source)? else {
                saw_eof = true;
                break;
            };

            let control = self.apply_key_event(key)?;

            // A resize that arrived during the read is folded in before the
            // repaint.
            if signal_registry::take_resize_pending() {
                let cols = terminal_io::get_terminal_width();
                let prompt_cols = display_width(&self.prompt, self.split, self.width_fn);
                self.viewport.resize(cols, prompt_cols);
                self.refresh_requested = true;
            }

            if control == LoopControl::Commit {
                break;
            }
            if self.refresh_requested {
                self.render(sink)?;
                self.refresh_requested = false;
            }
        }

        // Hand the terminal back at the start of a fresh row.
        sink.write_all(b"\r\n")?;
        sink.flush()?;

        let line = self.buffer.as_str().to_owned();
        if saw_eof && line.is_empty() {
            DEBUG_INLINE.then(|| tracing::debug!(message = "readline: end of input"));
            return Ok(None);
        }
        self.history.add(&line);
        Ok(Some(line))
    }

    fn render(&mut self, sink: &mut dyn Write) -> Result<(), InlineError> {
        let selection = self.selection.range(self.buffer.cursor());
        let mut ctx = RenderContext {
            buffer: &self.buffer,
            prompt: &self.prompt,
            continuation_prompt: self.continuation_prompt.as_deref(),
            selection,
            palette: &self.palette,
            syntax_fn: self.syntax_fn.as_mut(),
            suggestion: self.suggestions.current(),
            split: self.split,
            width_fn: self.width_fn,
            viewport: &mut self.viewport,
            term_cursor_row: self.term_cursor_row,
            term_lines_drawn: self.term_lines_drawn,
        };
        let outcome = redraw(&mut ctx, sink)?;
        self.term_cursor_row = outcome.term_cursor_row;
        self.term_lines_drawn = outcome.term_lines_drawn;
        self.suggestion_shown = outcome.suggestion_shown;
        Ok(())
    }

    fn read_unsupported(&mut self) -> Result<Option<String>, InlineError> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(self.prompt.as_bytes())?;
        stdout.flush()?;

        let Some(mut line) = read_line_from_stdin()? else {
            return Ok(None);
        };
        // Strip trailing control characters (newline included).
        while line
            .as_bytes()
            .last()
            .is_some_and(u8::is_ascii_control)
        {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// Not attached to a terminal: pass a line of standard input through
/// verbatim (minus the newline terminator).
fn read_no_terminal() -> Result<Option<String>, InlineError> {
    let Some(mut line) = read_line_from_stdin()? else {
        return Ok(None);
    };
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(Some(line))
}

fn read_line_from_stdin() -> Result<Option<String>, InlineError> {
    let mut line = String::new();
    let n = io::stdin().lock().read_line(&mut line)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(line))
}

impl Default for InlineEditor {
    fn default() -> Self { Self::new(DEFAULT_PROMPT) }
}

impl std::fmt::Debug for InlineEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InlineEditor")
            .field("prompt", &self.prompt)
            .field("buffer", &self.buffer.as_str())
            .field("cursor", &self.buffer.cursor())
            .field("history_len", &self.history.len())
            .finish_non_exhaustive()
    }
}
