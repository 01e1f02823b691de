// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Incremental renderer.
//!
//! Each redraw repaints the edited lines in place:
//!
//! 1. hide the cursor;
//! 2. move to the editor's origin (carriage return, then up past the rows
//!    drawn last time);
//! 3. locate the cursor's logical row/column from the line index;
//! 4. scroll the horizontal viewport the minimum amount to keep the cursor
//!    visible;
//! 5. repaint every logical line (prompt, clipped graphemes, syntax colour,
//!    selection inverse video, ghost suggestion);
//! 6. blank any rows left over from a previous, taller draw;
//! 7. park the terminal cursor on the logical cursor position;
//! 8. show the cursor again.
//!
//! The renderer is a pure function of the editor's observable state; the
//! state machine never calls into it directly; a dirty flag couples them.

use super::viewport::Viewport;
use crate::core::ansi::{
    PaletteColor, CLEAR_TO_EOL, CURSOR_HIDE, CURSOR_SHOW, SGR_FAINT, SGR_INVERSE,
    SGR_RESET, SGR_RESET_FOREGROUND,
};
use crate::core::ansi::palette_lookup;
use crate::core::graphemes::{display_width, GraphemeSplitFn, GraphemeWidthFn, TAB_WIDTH};
use crate::editor::callbacks::{ColorSpan, SyntaxColorFn};
use crate::editor::edit_buffer::EditBuffer;
use std::io::{self, Write};

/// Everything one redraw needs, borrowed from the editor.
pub(crate) struct RenderContext<'a> {
    pub buffer: &'a EditBuffer,
    pub prompt: &'a str,
    pub continuation_prompt: Option<&'a str>,
    /// Normalised selection range in grapheme indices.
    pub selection: Option<(usize, usize)>,
    pub palette: &'a [PaletteColor],
    pub syntax_fn: Option<&'a mut SyntaxColorFn>,
    /// Suffix currently offered by the autocomplete driver.
    pub suggestion: Option<&'a str>,
    pub split: GraphemeSplitFn,
    pub width_fn: GraphemeWidthFn,
    pub viewport: &'a mut Viewport,
    /// Terminal row (relative to the first drawn row) the cursor was parked
    /// on by the previous redraw.
    pub term_cursor_row: usize,
    /// Rows the previous redraw painted.
    pub term_lines_drawn: usize,
}

/// What the redraw observed and decided; the editor folds this back into
/// its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RenderOutcome {
    pub term_cursor_row: usize,
    pub term_lines_drawn: usize,
    pub suggestion_shown: bool,
}

/// Width of one grapheme as drawn, which for tabs is the fixed tab width.
fn drawn_width(grapheme: &[u8], width_fn: GraphemeWidthFn) -> usize {
    if grapheme == b"\t" {
        TAB_WIDTH
    } else {
        width_fn(grapheme)
    }
}

/// Absolute column of the cursor within its logical line.
fn cursor_column(ctx: &RenderContext<'_>, row: usize) -> usize {
    let first = ctx.buffer.row_first_seg(row);
    let mut col = 0;
    for g in first..ctx.buffer.cursor() {
        col += drawn_width(ctx.buffer.grapheme(g), ctx.width_fn);
    }
    col
}

pub(crate) fn redraw(
    ctx: &mut RenderContext<'_>,
    out: &mut dyn Write,
) -> io::Result<RenderOutcome> {
    out.write_all(CURSOR_HIDE.as_bytes())?;

    // Back to the origin of the drawn region.
    out.write_all(b"\r")?;
    if ctx.term_cursor_row > 0 {
        write!(out, "\x1b[{}A", ctx.term_cursor_row)?;
    }

    let line_count = ctx.buffer.lines().count();
    let cursor_row = ctx.buffer.cursor_row();
    let cursor_col = cursor_column(ctx, cursor_row);
    ctx.viewport.scroll_to(cursor_col);

    let mut suggestion_shown = false;
    for row in 0..line_count {
        out.write_all(b"\r")?;
        let ghost = render_line(ctx, out, row)?;
        suggestion_shown |= ghost;
        if row + 1 < line_count {
            out.write_all(b"\n")?;
        }
    }

    // Blank rows left over from a previous, taller draw.
    let extra = ctx.term_lines_drawn.saturating_sub(line_count);
    for _ in 0..extra {
        out.write_all(b"\n\r")?;
        out.write_all(CLEAR_TO_EOL.as_bytes())?;
    }

    // Park the cursor: currently on the last touched row.
    out.write_all(b"\r")?;
    let rows_below = (line_count - 1 - cursor_row) + extra;
    if rows_below > 0 {
        write!(out, "\x1b[{rows_below}A")?;
    }
    let prompt = row_prompt(ctx, cursor_row);
    let prompt_cols = display_width(prompt, ctx.split, ctx.width_fn);
    let parked_col = prompt_cols + (cursor_col - ctx.viewport.first_visible_col);
    if parked_col > 0 {
        write!(out, "\x1b[{parked_col}C")?;
    }

    out.write_all(CURSOR_SHOW.as_bytes())?;
    out.flush()?;

    Ok(RenderOutcome {
        term_cursor_row: cursor_row,
        term_lines_drawn: line_count,
        suggestion_shown,
    })
}

fn row_prompt<'a>(ctx: &RenderContext<'a>, row: usize) -> &'a str {
    if row == 0 {
        ctx.prompt
    } else {
        ctx.continuation_prompt.unwrap_or(ctx.prompt)
    }
}

/// Per-line syntax-colouring state. A `None` from the callback, or a span
/// that fails to advance, switches colouring off for the rest of the line.
struct SpanCursor {
    current: Option<ColorSpan>,
    exhausted: bool,
}

impl SpanCursor {
    fn new() -> Self {
        Self {
            current: None,
            exhausted: false,
        }
    }

    fn color_at(
        &mut self,
        byte: usize,
        text: &str,
        palette: &[PaletteColor],
        syntax_fn: &mut Option<&mut SyntaxColorFn>,
    ) -> PaletteColor {
        let Some(syntax_fn) = syntax_fn.as_mut() else {
            return PaletteColor::Default;
        };
        if self.exhausted || palette.is_empty() {
            return PaletteColor::Default;
        }

        while self
            .current
            .map_or(true, |span| span.byte_end <= byte)
        {
            match syntax_fn(text, byte) {
                Some(span) if span.byte_end > byte => self.current = Some(span),
                _ => {
                    self.current = None;
                    self.exhausted = true;
                    return PaletteColor::Default;
                }
            }
        }

        self.current
            .map_or(PaletteColor::Default, |span| {
                palette_lookup(palette, span.color_index)
            })
    }
}

/// Repaint one logical line. Returns whether the ghost suggestion was drawn
/// on this line.
fn render_line(
    ctx: &mut RenderContext<'_>,
    out: &mut dyn Write,
    row: usize,
) -> io::Result<bool> {
    let prompt = row_prompt(ctx, row);
    out.write_all(prompt.as_bytes())?;

    let first_g = ctx.buffer.row_first_seg(row);
    let end_g = ctx.buffer.row_end_seg(row); // excludes a trailing \n
    let fvc = ctx.viewport.first_visible_col;
    let right_edge = fvc + ctx.viewport.screen_cols;

    let text = ctx.buffer.as_str();
    let mut spans = SpanCursor::new();
    let mut current_color = PaletteColor::Default;
    let mut inverse = false;

    let mut col = 0; // absolute column within the logical line
    let mut emitted_end_col = fvc; // rightmost column drawn so far
    for g in first_g..end_g {
        let grapheme = ctx.buffer.grapheme(g);
        let w = drawn_width(grapheme, ctx.width_fn);

        if col < fvc {
            // Entirely (or partially) left of the viewport: skipped.
            col += w;
            continue;
        }
        if col + w > right_edge {
            break; // would cross the right edge
        }

        let byte = ctx.buffer.segs().offset(g);
        let desired_color = spans.color_at(byte, text, ctx.palette, &mut ctx.syntax_fn);
        let desired_inverse = ctx
            .selection
            .is_some_and(|(l, r)| g >= l && g < r);

        if desired_inverse != inverse {
            if desired_inverse {
                out.write_all(SGR_INVERSE.as_bytes())?;
            } else {
                // Leaving the selection resets everything; the syntax colour
                // is reapplied below.
                out.write_all(SGR_RESET.as_bytes())?;
                current_color = PaletteColor::Default;
            }
            inverse = desired_inverse;
        }
        if desired_color != current_color {
            if desired_color == PaletteColor::Default {
                out.write_all(SGR_RESET_FOREGROUND.as_bytes())?;
            } else {
                write!(out, "{desired_color}")?;
            }
            current_color = desired_color;
        }

        if grapheme == b"\t" {
            for _ in 0..TAB_WIDTH {
                out.write_all(b" ")?;
            }
        } else {
            out.write_all(grapheme)?;
        }
        col += w;
        emitted_end_col = col;
    }

    if inverse || current_color != PaletteColor::Default {
        out.write_all(SGR_RESET.as_bytes())?;
    }

    // Ghost suggestion: only past the end of the buffer, on the final line.
    let mut ghost_cols = 0;
    let mut suggestion_shown = false;
    let is_last_row = row + 1 == ctx.buffer.lines().count();
    let cursor_at_end = ctx.buffer.cursor() == ctx.buffer.grapheme_count();
    if is_last_row && cursor_at_end {
        if let Some(suggestion) = ctx.suggestion {
            let width = display_width(suggestion, ctx.split, ctx.width_fn);
            let remaining = right_edge.saturating_sub(emitted_end_col);
            if width <= remaining && !suggestion.is_empty() {
                out.write_all(SGR_FAINT.as_bytes())?;
                out.write_all(suggestion.as_bytes())?;
                out.write_all(SGR_RESET.as_bytes())?;
                ghost_cols = width;
                suggestion_shown = true;
            }
        }
    }

    if (emitted_end_col - fvc) + ghost_cols < ctx.viewport.screen_cols {
        out.write_all(CLEAR_TO_EOL.as_bytes())?;
    }

    Ok(suggestion_shown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graphemes::{default_split, default_width};
    use crate::test_fixtures::OutputMock;
    use pretty_assertions::assert_eq;

    fn buffer(text: &str) -> EditBuffer {
        let mut b = EditBuffer::new();
        b.replace_all(text, default_split).unwrap();
        b
    }

    struct Fixture {
        buffer: EditBuffer,
        viewport: Viewport,
        palette: Vec<PaletteColor>,
        selection: Option<(usize, usize)>,
        suggestion: Option<String>,
        term_cursor_row: usize,
        term_lines_drawn: usize,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            Self {
                buffer: buffer(text),
                viewport: Viewport { first_visible_col: 0, screen_cols: 20 },
                palette: Vec::new(),
                selection: None,
                suggestion: None,
                term_cursor_row: 0,
                term_lines_drawn: 0,
            }
        }

        fn redraw(&mut self, syntax_fn: Option<&mut SyntaxColorFn>) -> (String, RenderOutcome) {
            let mut out = OutputMock::new();
            let mut ctx = RenderContext {
                buffer: &self.buffer,
                prompt: "> ",
                continuation_prompt: Some(". "),
                selection: self.selection,
                palette: &self.palette,
                syntax_fn,
                suggestion: self.suggestion.as_deref(),
                split: default_split,
                width_fn: default_width,
                viewport: &mut self.viewport,
                term_cursor_row: self.term_cursor_row,
                term_lines_drawn: self.term_lines_drawn,
            };
            let outcome = redraw(&mut ctx, &mut out).unwrap();
            self.term_cursor_row = outcome.term_cursor_row;
            self.term_lines_drawn = outcome.term_lines_drawn;
            (out.into_string(), outcome)
        }
    }

    #[test]
    fn test_minimal_line() {
        let mut f = Fixture::new("hi");
        let (raw, outcome) = f.redraw(None);
        assert!(raw.contains("> hi"));
        assert!(raw.starts_with(CURSOR_HIDE));
        assert!(raw.ends_with(CURSOR_SHOW));
        // Cursor parked after the prompt (2 cols) plus "hi" (2 cols).
        assert!(raw.contains("\x1b[4C"));
        assert_eq!(outcome.term_lines_drawn, 1);
        assert_eq!(outcome.term_cursor_row, 0);
        assert!(!outcome.suggestion_shown);
    }

    #[test]
    fn test_two_lines_use_continuation_prompt() {
        let mut f = Fixture::new("ab\ncd");
        let (raw, outcome) = f.redraw(None);
        assert!(raw.contains("> ab"));
        assert!(raw.contains(". cd"));
        assert_eq!(outcome.term_lines_drawn, 2);
        assert_eq!(outcome.term_cursor_row, 1); // cursor at end of last line
    }

    #[test]
    fn test_trailing_newline_not_emitted_as_text() {
        let mut f = Fixture::new("ab\n");
        let (raw, outcome) = f.redraw(None);
        assert_eq!(outcome.term_lines_drawn, 2);
        // First line shows "ab" without the newline grapheme; the second
        // line is just the continuation prompt.
        let stripped = OutputMock::strip_ansi(&raw);
        assert!(stripped.contains("> ab"));
        assert!(stripped.contains(". "));
    }

    #[test]
    fn test_extra_lines_cleared_when_shrinking() {
        let mut f = Fixture::new("ab");
        f.term_lines_drawn = 3; // previous draw was 3 rows tall
        let (raw, outcome) = f.redraw(None);
        assert_eq!(raw.matches("\n\r\x1b[K").count(), 2);
        assert_eq!(outcome.term_lines_drawn, 1);
        // After blanking the two stale rows the cursor climbs back up.
        assert!(raw.contains("\x1b[2A"));
    }

    #[test]
    fn test_selection_inverse_video() {
        let mut f = Fixture::new("hello");
        f.selection = Some((1, 3));
        let (raw, _) = f.redraw(None);
        let expected = format!("h{SGR_INVERSE}el{SGR_RESET}lo");
        assert!(raw.contains(&expected), "got: {raw:?}");
    }

    #[test]
    fn test_syntax_coloring_emits_on_transitions_only() {
        let mut f = Fixture::new("abcd");
        f.palette = vec![PaletteColor::Basic(1), PaletteColor::Basic(2)];
        // One span covering the first two bytes, another for the rest.
        let mut syntax: SyntaxColorFn = Box::new(|_, offset| {
            if offset < 2 {
                Some(ColorSpan { byte_end: 2, color_index: 0 })
            } else {
                Some(ColorSpan { byte_end: 4, color_index: 1 })
            }
        });
        let (raw, _) = f.redraw(Some(&mut syntax));
        let expected = format!("\x1b[31mab\x1b[32mcd{SGR_RESET}");
        assert!(raw.contains(&expected), "got: {raw:?}");
    }

    #[test]
    fn test_non_advancing_span_uncolours_rest() {
        let mut f = Fixture::new("abcd");
        f.palette = vec![PaletteColor::Basic(1)];
        let mut syntax: SyntaxColorFn = Box::new(|_, offset| {
            if offset == 0 {
                Some(ColorSpan { byte_end: 2, color_index: 0 })
            } else {
                // Regressive span: colouring stops here.
                Some(ColorSpan { byte_end: offset, color_index: 0 })
            }
        });
        let (raw, _) = f.redraw(Some(&mut syntax));
        // After the foreground reset the attributes are back to default, so
        // no trailing full reset is needed.
        let expected = format!("\x1b[31mab{SGR_RESET_FOREGROUND}cd");
        assert!(raw.contains(&expected), "got: {raw:?}");
        assert!(!raw.contains(&format!("cd{SGR_RESET}")), "got: {raw:?}");
    }

    #[test]
    fn test_out_of_range_palette_index_is_default() {
        let mut f = Fixture::new("ab");
        f.palette = vec![PaletteColor::Basic(1)];
        let mut syntax: SyntaxColorFn =
            Box::new(|_, _| Some(ColorSpan { byte_end: 2, color_index: 9 }));
        let (raw, _) = f.redraw(Some(&mut syntax));
        let stripped = OutputMock::strip_ansi(&raw);
        assert!(stripped.contains("> ab"));
        assert!(!raw.contains("\x1b[31m"));
    }

    #[test]
    fn test_ghost_suggestion_shown_and_faint() {
        let mut f = Fixture::new("ty");
        f.suggestion = Some("pedef".into());
        let (raw, outcome) = f.redraw(None);
        assert!(outcome.suggestion_shown);
        let expected = format!("{SGR_FAINT}pedef{SGR_RESET}");
        assert!(raw.contains(&expected), "got: {raw:?}");
    }

    #[test]
    fn test_ghost_suggestion_hidden_when_too_wide() {
        let mut f = Fixture::new("ty");
        f.viewport.screen_cols = 4;
        f.suggestion = Some("pedef".into()); // needs 5, only 2 remain
        let (raw, outcome) = f.redraw(None);
        assert!(!outcome.suggestion_shown);
        assert!(!raw.contains(SGR_FAINT));
    }

    #[test]
    fn test_ghost_hidden_when_cursor_not_at_end() {
        let mut f = Fixture::new("ty");
        f.buffer.set_cursor(1);
        f.suggestion = Some("pedef".into());
        let (_, outcome) = f.redraw(None);
        assert!(!outcome.suggestion_shown);
    }

    #[test]
    fn test_viewport_clips_long_line_and_scrolls() {
        let mut f = Fixture::new("abcdefghijklmnopqrstuvwxyz");
        f.viewport.screen_cols = 10;
        let (raw, _) = f.redraw(None);
        // Cursor is at the end, so the window slides to the last 10 cols.
        assert_eq!(f.viewport.first_visible_col, 17);
        let stripped = OutputMock::strip_ansi(&raw);
        assert!(stripped.contains("rstuvwxyz"));
        assert!(!stripped.contains("abc"));
    }

    #[test]
    fn test_tab_rendered_as_spaces() {
        let mut f = Fixture::new("a\tb");
        let (raw, _) = f.redraw(None);
        let stripped = OutputMock::strip_ansi(&raw);
        assert!(stripped.contains("a  b"));
        assert!(!stripped.contains('\t'));
    }

    #[test]
    fn test_cursor_parked_on_cursor_row() {
        let mut f = Fixture::new("ab\ncd");
        f.buffer.set_cursor(1); // on 'b', row 0
        let (raw, outcome) = f.redraw(None);
        assert_eq!(outcome.term_cursor_row, 0);
        // After drawing 2 rows the renderer climbs one row back up.
        assert!(raw.contains("\x1b[1A"));
        // Prompt (2) + one column.
        assert!(raw.ends_with(&format!("\x1b[3C{CURSOR_SHOW}")), "got: {raw:?}");
    }
}
