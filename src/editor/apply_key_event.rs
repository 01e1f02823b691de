// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Editor state machine: one decoded [`KeyEvent`] plus the current modes
//! (selection, history browse, suggestions, multi-line) becomes a mutation
//! of the buffer/selection/clipboard/lists, and a loop-control verdict.
//!
//! Every key carries three dispositions applied after its action, in this
//! order: end history browsing, regenerate suggestions, clear the
//! selection. Regeneration therefore still sees the selection a key is
//! about to clear, which is what keeps suggestions away while a selection
//! exists.

use super::inline_editor::InlineEditor;
use crate::error::InlineError;
use crate::key_decoder::KeyEvent;

/// Whether the interactive loop keeps going after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    /// Commit the buffer and end the read.
    Commit,
}

/// Post-action dispositions for one key.
struct Disposition {
    clear_selection: bool,
    regenerate: bool,
    end_browse: bool,
}

impl Disposition {
    /// The common case: selection cleared, suggestions regenerated, history
    /// browsing ended.
    const EDIT: Self = Self {
        clear_selection: true,
        regenerate: true,
        end_browse: true,
    };
}

impl InlineEditor {
    pub(crate) fn apply_key_event(&mut self, key: KeyEvent) -> Result<LoopControl, InlineError> {
        let mut d = Disposition::EDIT;
        let mut control = LoopControl::Continue;

        match key {
            KeyEvent::Return => {
                d.regenerate = false;
                let needs_more = match self.multiline_fn.as_mut() {
                    Some(f) => f(self.buffer.as_str()),
                    None => false,
                };
                if needs_more {
                    self.insert_bytes(b"\n")?;
                } else {
                    control = LoopControl::Commit;
                }
            }
            KeyEvent::CtrlReturn => {
                d.regenerate = false;
                self.insert_bytes(b"\n")?;
            }
            KeyEvent::Character(c) => {
                let mut utf8 = [0u8; 4];
                self.insert_bytes(c.encode_utf8(&mut utf8).as_bytes())?;
            }
            KeyEvent::Tab => {
                if self.suggestions.has_suggestions() {
                    self.suggestions.advance(1);
                    d.regenerate = false;
                } else {
                    self.insert_bytes(b"\t")?;
                }
            }
            KeyEvent::ShiftTab => {
                d.regenerate = false;
                if self.suggestions.has_suggestions() {
                    self.suggestions.advance(-1);
                }
            }
            KeyEvent::Right => {
                if self.suggestion_shown {
                    self.accept_suggestion()?;
                    d.regenerate = false;
                } else {
                    self.cursor_right();
                }
            }
            KeyEvent::Left => self.cursor_left(),
            KeyEvent::ShiftLeft => {
                d.clear_selection = false;
                self.selection.begin(self.buffer.cursor());
                self.cursor_left();
            }
            KeyEvent::ShiftRight => {
                d.clear_selection = false;
                self.selection.begin(self.buffer.cursor());
                self.cursor_right();
            }
            KeyEvent::Up => {
                d.end_browse = false;
                self.browse_history(-1)?;
            }
            KeyEvent::Down => {
                d.end_browse = false;
                self.browse_history(1)?;
            }
            KeyEvent::Home => self.cursor_home(),
            KeyEvent::End => self.cursor_end_of_line(),
            KeyEvent::PageUp => self.buffer.set_cursor(0),
            KeyEvent::PageDown => {
                let end = self.buffer.grapheme_count();
                self.buffer.set_cursor(end);
            }
            KeyEvent::Delete => self.delete_backward(),
            KeyEvent::Ctrl('A') => self.cursor_home(),
            KeyEvent::Ctrl('B') => self.cursor_left(),
            KeyEvent::Ctrl('E') => self.cursor_end_of_line(),
            KeyEvent::Ctrl('F') => self.cursor_right(),
            KeyEvent::Ctrl('C') => {
                d.regenerate = false;
                self.clear_buffer();
                control = LoopControl::Commit;
            }
            KeyEvent::Ctrl('D') => {
                self.selection.clear();
                self.delete_forward();
            }
            KeyEvent::Ctrl('G') => {
                d.clear_selection = false;
                d.regenerate = false;
                d.end_browse = false;
                control = LoopControl::Commit;
            }
            KeyEvent::Ctrl('K') => self.cut_to_line_end(),
            KeyEvent::Ctrl('U') => self.cut_to_line_start(),
            KeyEvent::Ctrl('N') => {
                d.regenerate = false;
                d.end_browse = false;
                self.browse_history(1)?;
            }
            KeyEvent::Ctrl('P') => {
                d.regenerate = false;
                d.end_browse = false;
                self.browse_history(-1)?;
            }
            KeyEvent::Ctrl('L') => self.clear_buffer(),
            KeyEvent::Ctrl('O') => self.copy_selection(),
            KeyEvent::Ctrl('V') | KeyEvent::Ctrl('Y') => self.paste()?,
            KeyEvent::Ctrl('X') => self.cut_selection(),
            KeyEvent::Ctrl('T') => {
                let split = self.split;
                self.buffer.transpose_at_cursor(split);
            }
            KeyEvent::Alt('w') | KeyEvent::Alt('W') => self.copy_selection(),
            _ => {
                // Unrecognised keys leave the buffer and selection alone,
                // but still end a history browse.
                d.clear_selection = false;
                d.regenerate = false;
            }
        }

        if d.end_browse {
            self.history.end_browse();
        }
        if d.regenerate {
            self.regenerate_suggestions();
        }
        if d.clear_selection {
            self.selection.clear();
        }
        self.refresh_requested = true;
        Ok(control)
    }

    // Cursor motion.

    fn cursor_left(&mut self) {
        let cursor = self.buffer.cursor();
        if cursor > 0 {
            self.buffer.set_cursor(cursor - 1);
        }
    }

    fn cursor_right(&mut self) {
        let cursor = self.buffer.cursor();
        self.buffer.set_cursor(cursor + 1); // clamped by the buffer
    }

    fn cursor_home(&mut self) {
        let row = self.buffer.cursor_row();
        let first = self.buffer.row_first_seg(row);
        self.buffer.set_cursor(first);
    }

    fn cursor_end_of_line(&mut self) {
        let row = self.buffer.cursor_row();
        let end = self.buffer.row_end_seg(row);
        self.buffer.set_cursor(end);
    }

    // Buffer edits.

    pub(crate) fn insert_bytes(&mut self, bytes: &[u8]) -> Result<(), InlineError> {
        let split = self.split;
        self.buffer.insert(bytes, split)
    }

    fn clear_buffer(&mut self) {
        self.buffer.clear();
        self.suggestions.clear();
        self.suggestion_shown = false;
    }

    /// Backspace: selection first, then the grapheme before the cursor,
    /// then, at position 0, the grapheme under it.
    fn delete_backward(&mut self) {
        if self.delete_selection() {
            return;
        }
        let split = self.split;
        let cursor = self.buffer.cursor();
        if cursor > 0 {
            self.buffer.delete_grapheme(cursor - 1, split);
            self.buffer.set_cursor(cursor - 1);
        } else if self.buffer.grapheme_count() > 0 {
            self.buffer.delete_grapheme(0, split);
        }
    }

    /// Forward delete (Ctrl-D): the grapheme under the cursor, if any.
    fn delete_forward(&mut self) {
        let split = self.split;
        if self.buffer.cursor() < self.buffer.grapheme_count() {
            self.buffer.delete_grapheme(self.buffer.cursor(), split);
        }
    }

    // Selection and clipboard.

    /// Delete the active selection, leaving the cursor at its left edge.
    /// Returns whether a selection existed.
    fn delete_selection(&mut self) -> bool {
        let Some((l, r)) = self.selection.range(self.buffer.cursor()) else {
            return false;
        };
        if l < r {
            let start = self.buffer.segs().offset(l);
            let end = self.buffer.segs().offset(r);
            let split = self.split;
            self.buffer.delete_byte_range(start, end, split);
        }
        self.buffer.set_cursor(l);
        self.selection.clear();
        true
    }

    fn copy_selection(&mut self) {
        if let Some((l, r)) = self.selection.range(self.buffer.cursor()) {
            let start = self.buffer.segs().offset(l);
            let end = self.buffer.segs().offset(r);
            let bytes = self.buffer.as_bytes()[start..end].to_vec();
            self.clipboard.set(&bytes);
        }
    }

    fn cut_selection(&mut self) {
        self.copy_selection();
        self.delete_selection();
    }

    /// Paste replaces any active selection; an empty clipboard is a no-op.
    fn paste(&mut self) -> Result<(), InlineError> {
        if self.clipboard.is_empty() {
            return Ok(());
        }
        self.delete_selection();
        let bytes = self.clipboard.bytes().to_vec();
        self.insert_bytes(&bytes)
    }

    /// Ctrl-K: cut from the cursor to the end of the current line.
    fn cut_to_line_end(&mut self) {
        let row = self.buffer.cursor_row();
        let l = self.buffer.cursor();
        let r = self.buffer.row_end_seg(row);
        self.cut_seg_range(l, r, l);
    }

    /// Ctrl-U: cut from the start of the current line to the cursor.
    fn cut_to_line_start(&mut self) {
        let row = self.buffer.cursor_row();
        let l = self.buffer.row_first_seg(row);
        let r = self.buffer.cursor();
        self.cut_seg_range(l, r, l);
    }

    fn cut_seg_range(&mut self, l: usize, r: usize, cursor_after: usize) {
        if l >= r {
            return;
        }
        let start = self.buffer.segs().offset(l);
        let end = self.buffer.segs().offset(r);
        let bytes = self.buffer.as_bytes()[start..end].to_vec();
        self.clipboard.set(&bytes);
        let split = self.split;
        self.buffer.delete_byte_range(start, end, split);
        self.buffer.set_cursor(cursor_after);
    }

    // Suggestions.

    fn accept_suggestion(&mut self) -> Result<(), InlineError> {
        let Some(suffix) = self.suggestions.current().map(ToOwned::to_owned) else {
            return Ok(());
        };
        self.insert_bytes(suffix.as_bytes())?;
        self.suggestions.clear();
        self.suggestion_shown = false;
        Ok(())
    }

    pub(crate) fn regenerate_suggestions(&mut self) {
        let eligible = self.buffer.cursor() == self.buffer.grapheme_count()
            && !self.selection.is_active();
        self.suggestions
            .regenerate(self.buffer.as_str(), eligible, self.complete_fn.as_mut());
    }

    // History.

    fn browse_history(&mut self, delta: isize) -> Result<(), InlineError> {
        let entry = self.history.browse(delta).map(ToOwned::to_owned);
        if let Some(entry) = entry {
            let split = self.split;
            self.buffer.replace_all(&entry, split)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editor() -> InlineEditor { InlineEditor::new("> ") }

    fn type_str(ed: &mut InlineEditor, s: &str) {
        for c in s.chars() {
            ed.apply_key_event(KeyEvent::Character(c)).unwrap();
        }
    }

    #[test]
    fn test_character_insert_and_commit() {
        let mut ed = editor();
        type_str(&mut ed, "hi");
        assert_eq!(ed.line(), "hi");
        let control = ed.apply_key_event(KeyEvent::Return).unwrap();
        assert_eq!(control, LoopControl::Commit);
    }

    #[test]
    fn test_backspace_variants() {
        let mut ed = editor();
        type_str(&mut ed, "ab");
        ed.apply_key_event(KeyEvent::Delete).unwrap();
        assert_eq!(ed.line(), "a");
        // Backspace at position 0 with content deletes the grapheme under
        // the cursor.
        ed.apply_key_event(KeyEvent::Home).unwrap();
        ed.apply_key_event(KeyEvent::Delete).unwrap();
        assert_eq!(ed.line(), "");
        // And on an empty buffer it is a no-op.
        ed.apply_key_event(KeyEvent::Delete).unwrap();
        assert_eq!(ed.line(), "");
    }

    #[test]
    fn test_ctrl_d_deletes_under_cursor() {
        let mut ed = editor();
        type_str(&mut ed, "abc");
        ed.apply_key_event(KeyEvent::Home).unwrap();
        ed.apply_key_event(KeyEvent::Ctrl('D')).unwrap();
        assert_eq!(ed.line(), "bc");
    }

    #[test]
    fn test_home_end_on_single_line() {
        let mut ed = editor();
        type_str(&mut ed, "abc");
        ed.apply_key_event(KeyEvent::Home).unwrap();
        assert_eq!(ed.cursor_position(), 0);
        ed.apply_key_event(KeyEvent::End).unwrap();
        assert_eq!(ed.cursor_position(), 3);
    }

    #[test]
    fn test_home_end_respect_lines() {
        let mut ed = editor();
        type_str(&mut ed, "ab");
        ed.apply_key_event(KeyEvent::CtrlReturn).unwrap();
        type_str(&mut ed, "cd");
        // Cursor on line 1.
        ed.apply_key_event(KeyEvent::Home).unwrap();
        assert_eq!(ed.cursor_position(), 3); // first grapheme of line 1
        ed.apply_key_event(KeyEvent::End).unwrap();
        assert_eq!(ed.cursor_position(), 5);
        // Jump to line 0 and check End stops before the newline.
        ed.apply_key_event(KeyEvent::PageUp).unwrap();
        ed.apply_key_event(KeyEvent::End).unwrap();
        assert_eq!(ed.cursor_position(), 2);
    }

    #[test]
    fn test_page_up_down() {
        let mut ed = editor();
        type_str(&mut ed, "abc");
        ed.apply_key_event(KeyEvent::PageUp).unwrap();
        assert_eq!(ed.cursor_position(), 0);
        ed.apply_key_event(KeyEvent::PageDown).unwrap();
        assert_eq!(ed.cursor_position(), 3);
    }

    #[test]
    fn test_shift_arrows_build_selection_and_cut_paste() {
        let mut ed = editor();
        type_str(&mut ed, "hello");
        for _ in 0..3 {
            ed.apply_key_event(KeyEvent::ShiftLeft).unwrap();
        }
        // Selection now covers "llo".
        ed.apply_key_event(KeyEvent::Ctrl('X')).unwrap();
        assert_eq!(ed.line(), "he");
        ed.apply_key_event(KeyEvent::Left).unwrap();
        ed.apply_key_event(KeyEvent::Ctrl('V')).unwrap();
        assert_eq!(ed.line(), "hlloe");
        assert_eq!(ed.cursor_position(), 4); // just past the pasted run
    }

    #[test]
    fn test_selection_cleared_by_plain_motion() {
        let mut ed = editor();
        type_str(&mut ed, "ab");
        ed.apply_key_event(KeyEvent::ShiftLeft).unwrap();
        assert!(ed.has_selection());
        ed.apply_key_event(KeyEvent::Left).unwrap();
        assert!(!ed.has_selection());
    }

    #[test]
    fn test_backspace_deletes_selection() {
        let mut ed = editor();
        type_str(&mut ed, "hello");
        ed.apply_key_event(KeyEvent::ShiftLeft).unwrap();
        ed.apply_key_event(KeyEvent::ShiftLeft).unwrap();
        ed.apply_key_event(KeyEvent::Delete).unwrap();
        assert_eq!(ed.line(), "hel");
        assert_eq!(ed.cursor_position(), 3);
        assert!(!ed.has_selection());
    }

    #[test]
    fn test_copy_then_paste_round_trip() {
        let mut ed = editor();
        type_str(&mut ed, "abc");
        ed.apply_key_event(KeyEvent::ShiftLeft).unwrap();
        ed.apply_key_event(KeyEvent::ShiftLeft).unwrap();
        ed.apply_key_event(KeyEvent::Ctrl('O')).unwrap(); // copy "bc"
        ed.apply_key_event(KeyEvent::End).unwrap();
        ed.apply_key_event(KeyEvent::Ctrl('Y')).unwrap();
        assert_eq!(ed.line(), "abcbc");
    }

    #[test]
    fn test_copy_paste_over_live_selection_is_identity() {
        let mut ed = editor();
        type_str(&mut ed, "abc");
        // Anchor at 1 with the cursor at the right edge (3): copying and
        // pasting replaces the selection with its own contents.
        ed.selection.begin(1);
        ed.copy_selection();
        ed.paste().unwrap();
        assert_eq!(ed.line(), "abc");
        assert_eq!(ed.cursor_position(), 3);
    }

    #[test]
    fn test_paste_empty_clipboard_is_noop() {
        let mut ed = editor();
        type_str(&mut ed, "a");
        ed.apply_key_event(KeyEvent::Ctrl('V')).unwrap();
        assert_eq!(ed.line(), "a");
    }

    #[test]
    fn test_ctrl_k_cuts_to_line_end() {
        let mut ed = editor();
        type_str(&mut ed, "hello");
        ed.apply_key_event(KeyEvent::Home).unwrap();
        ed.apply_key_event(KeyEvent::Right).unwrap();
        ed.apply_key_event(KeyEvent::Right).unwrap();
        ed.apply_key_event(KeyEvent::Ctrl('K')).unwrap();
        assert_eq!(ed.line(), "he");
        // The cut text is on the clipboard.
        ed.apply_key_event(KeyEvent::Ctrl('V')).unwrap();
        assert_eq!(ed.line(), "hello");
    }

    #[test]
    fn test_ctrl_u_cuts_to_line_start() {
        let mut ed = editor();
        type_str(&mut ed, "hello");
        ed.apply_key_event(KeyEvent::Left).unwrap();
        ed.apply_key_event(KeyEvent::Ctrl('U')).unwrap();
        assert_eq!(ed.line(), "o");
        assert_eq!(ed.cursor_position(), 0);
    }

    #[test]
    fn test_ctrl_t_transpose() {
        let mut ed = editor();
        type_str(&mut ed, "ab");
        ed.apply_key_event(KeyEvent::Left).unwrap();
        ed.apply_key_event(KeyEvent::Ctrl('T')).unwrap();
        assert_eq!(ed.line(), "ba");
        assert_eq!(ed.cursor_position(), 2);
    }

    #[test]
    fn test_ctrl_c_clears_and_commits() {
        let mut ed = editor();
        type_str(&mut ed, "secret");
        let control = ed.apply_key_event(KeyEvent::Ctrl('C')).unwrap();
        assert_eq!(control, LoopControl::Commit);
        assert_eq!(ed.line(), "");
    }

    #[test]
    fn test_ctrl_g_commits_keeping_buffer() {
        let mut ed = editor();
        type_str(&mut ed, "keep");
        let control = ed.apply_key_event(KeyEvent::Ctrl('G')).unwrap();
        assert_eq!(control, LoopControl::Commit);
        assert_eq!(ed.line(), "keep");
    }

    #[test]
    fn test_ctrl_l_clears_buffer() {
        let mut ed = editor();
        type_str(&mut ed, "junk");
        let control = ed.apply_key_event(KeyEvent::Ctrl('L')).unwrap();
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(ed.line(), "");
    }

    #[test]
    fn test_multiline_predicate_inserts_newline() {
        let mut ed = editor();
        ed.set_multiline(|text: &str| {
            let open = text.matches('(').count();
            let close = text.matches(')').count();
            open > close
        }, Some(". "));
        type_str(&mut ed, "(1");
        let control = ed.apply_key_event(KeyEvent::Return).unwrap();
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(ed.line(), "(1\n");
        type_str(&mut ed, "2)");
        let control = ed.apply_key_event(KeyEvent::Return).unwrap();
        assert_eq!(control, LoopControl::Commit);
        assert_eq!(ed.line(), "(1\n2)");
    }

    #[test]
    fn test_tab_inserts_literal_tab_without_suggestions() {
        let mut ed = editor();
        ed.apply_key_event(KeyEvent::Tab).unwrap();
        assert_eq!(ed.line(), "\t");
    }

    #[test]
    fn test_tab_cycles_suggestions() {
        let mut ed = editor();
        ed.set_autocomplete(|buf: &str, index: &mut usize| {
            let all = ["one", "two"];
            if buf.is_empty() {
                return None;
            }
            let out = all.get(*index).map(|s| (*s).to_string());
            *index += 1;
            out
        });
        type_str(&mut ed, "x");
        assert_eq!(ed.current_suggestion(), Some("one"));
        ed.apply_key_event(KeyEvent::Tab).unwrap();
        assert_eq!(ed.current_suggestion(), Some("two"));
        ed.apply_key_event(KeyEvent::Tab).unwrap();
        assert_eq!(ed.current_suggestion(), Some("one")); // wrapped
        ed.apply_key_event(KeyEvent::ShiftTab).unwrap();
        assert_eq!(ed.current_suggestion(), Some("two"));
        // The buffer itself never changed.
        assert_eq!(ed.line(), "x");
    }

    #[test]
    fn test_no_suggestions_while_selection_active() {
        let mut ed = editor();
        ed.set_autocomplete(|_: &str, index: &mut usize| {
            let out = (*index == 0).then(|| "sfx".to_string());
            *index += 1;
            out
        });
        type_str(&mut ed, "a");
        assert!(ed.current_suggestion().is_some());
        ed.apply_key_event(KeyEvent::ShiftLeft).unwrap();
        assert!(ed.current_suggestion().is_none());
    }

    #[test]
    fn test_history_browse_up_down() {
        let mut ed = editor();
        assert!(ed.add_history("a"));
        assert!(ed.add_history("bb"));
        ed.apply_key_event(KeyEvent::Up).unwrap();
        assert_eq!(ed.line(), "bb");
        assert_eq!(ed.cursor_position(), 2);
        ed.apply_key_event(KeyEvent::Up).unwrap();
        assert_eq!(ed.line(), "a");
        ed.apply_key_event(KeyEvent::Down).unwrap();
        assert_eq!(ed.line(), "bb");
    }

    #[test]
    fn test_ctrl_p_n_browse_history() {
        let mut ed = editor();
        ed.add_history("first");
        ed.add_history("second");
        ed.apply_key_event(KeyEvent::Ctrl('P')).unwrap();
        assert_eq!(ed.line(), "second");
        ed.apply_key_event(KeyEvent::Ctrl('P')).unwrap();
        assert_eq!(ed.line(), "first");
        ed.apply_key_event(KeyEvent::Ctrl('N')).unwrap();
        assert_eq!(ed.line(), "second");
    }

    #[test]
    fn test_typing_ends_history_browse() {
        let mut ed = editor();
        ed.add_history("old");
        ed.apply_key_event(KeyEvent::Up).unwrap();
        assert_eq!(ed.line(), "old");
        ed.apply_key_event(KeyEvent::Character('!')).unwrap();
        assert_eq!(ed.line(), "old!");
        // Browsing ended; Up starts from the most recent entry again.
        ed.apply_key_event(KeyEvent::Up).unwrap();
        assert_eq!(ed.line(), "old");
    }

    #[test]
    fn test_unknown_key_is_inert() {
        let mut ed = editor();
        type_str(&mut ed, "ab");
        ed.apply_key_event(KeyEvent::ShiftLeft).unwrap();
        ed.apply_key_event(KeyEvent::Unknown).unwrap();
        assert_eq!(ed.line(), "ab");
        assert!(ed.has_selection(), "unknown keys keep the selection");
    }

    #[test]
    fn test_emoji_left_then_backspace_empties_buffer() {
        let mut ed = editor();
        ed.apply_key_event(KeyEvent::Character('👍')).unwrap();
        assert_eq!(ed.cursor_position(), 1);
        ed.apply_key_event(KeyEvent::Left).unwrap();
        assert_eq!(ed.cursor_position(), 0);
        ed.apply_key_event(KeyEvent::Delete).unwrap();
        assert_eq!(ed.line(), "");
    }

    #[test]
    fn test_insert_then_delete_selection_round_trip() {
        let mut ed = editor();
        type_str(&mut ed, "base");
        let before = ed.line().to_owned();
        type_str(&mut ed, "xyz");
        for _ in 0..3 {
            ed.apply_key_event(KeyEvent::ShiftLeft).unwrap();
        }
        ed.apply_key_event(KeyEvent::Delete).unwrap();
        assert_eq!(ed.line(), before);
    }
}
