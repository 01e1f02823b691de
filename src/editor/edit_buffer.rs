// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The editable text buffer: UTF-8 bytes plus the grapheme and line indices
//! and the grapheme-based cursor.
//!
//! Invariants, re-established by [`EditBuffer::recompute`] after every
//! mutation:
//! - all bytes in `[0, len)` are valid UTF-8 as segmented by the active
//!   splitter;
//! - the grapheme index starts at 0 (when non-empty), ends with a sentinel
//!   equal to the buffer length, and is strictly monotonic;
//! - the line index starts at 0 and ends with the same sentinel;
//! - `cursor` is a grapheme index in `[0, grapheme_count]`, where
//!   `grapheme_count` means "after the last grapheme".

use crate::core::graphemes::{GraphemeSplitFn, LineIndex, SegmentIndex};
use crate::error::InlineError;

#[derive(Debug)]
pub struct EditBuffer {
    bytes: Vec<u8>,
    segs: SegmentIndex,
    lines: LineIndex,
    cursor: usize,
}

impl EditBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            segs: SegmentIndex::new(),
            lines: LineIndex::new(),
            cursor: 0,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // The buffer only ever receives decoded characters, its own bytes
        // (clipboard), or host strings, so this cannot fail in practice.
        std::str::from_utf8(&self.bytes).unwrap_or("")
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    #[must_use]
    pub fn grapheme_count(&self) -> usize { self.segs.count() }

    #[must_use]
    pub fn segs(&self) -> &SegmentIndex { &self.segs }

    #[must_use]
    pub fn lines(&self) -> &LineIndex { &self.lines }

    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    pub fn set_cursor(&mut self, posn: usize) {
        self.cursor = posn.min(self.grapheme_count());
    }

    /// Byte offset the cursor sits at. The sentinel makes this valid for
    /// `cursor == grapheme_count` too.
    #[must_use]
    pub fn cursor_byte(&self) -> usize { self.segs.offset(self.cursor) }

    /// Bytes of grapheme `i`.
    #[must_use]
    pub fn grapheme(&self, i: usize) -> &[u8] { &self.bytes[self.segs.byte_range(i)] }

    /// Rebuild both indices and clamp the cursor. Must run after every
    /// byte-level mutation, before anything consumes the indices.
    pub fn recompute(&mut self, split: GraphemeSplitFn) {
        self.segs.recompute(&self.bytes, split);
        self.lines.recompute(&self.bytes, &self.segs);
        self.cursor = self.cursor.min(self.segs.count());
    }

    fn ensure_extra(&mut self, extra: usize) -> Result<(), InlineError> {
        self.bytes
            .len()
            .checked_add(extra)
            .ok_or(InlineError::OutOfMemory)?;
        self.bytes.try_reserve(extra)?;
        Ok(())
    }

    /// Insert `new_bytes` at the cursor's byte offset. Afterwards the cursor
    /// is the grapheme immediately after the inserted run.
    pub fn insert(
        &mut self,
        new_bytes: &[u8],
        split: GraphemeSplitFn,
    ) -> Result<(), InlineError> {
        if new_bytes.is_empty() {
            return Ok(());
        }
        self.ensure_extra(new_bytes.len())?;

        let offset = self.cursor_byte();
        self.bytes.splice(offset..offset, new_bytes.iter().copied());
        self.recompute(split);
        self.cursor = self.segs.seg_at_byte(offset + new_bytes.len());
        Ok(())
    }

    /// Remove the byte range `[start, end)`. The caller guarantees a valid
    /// range; the cursor is re-clamped by the recompute.
    pub fn delete_byte_range(&mut self, start: usize, end: usize, split: GraphemeSplitFn) {
        self.bytes.drain(start..end);
        self.recompute(split);
    }

    /// Remove grapheme `i`.
    pub fn delete_grapheme(&mut self, i: usize, split: GraphemeSplitFn) {
        let range = self.segs.byte_range(i);
        self.delete_byte_range(range.start, range.end, split);
    }

    /// Reset to the empty state.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.segs = SegmentIndex::new();
        self.lines = LineIndex::new();
        self.cursor = 0;
    }

    /// Replace the whole contents (history recall), leaving the cursor at
    /// the end.
    pub fn replace_all(&mut self, text: &str, split: GraphemeSplitFn) -> Result<(), InlineError> {
        self.clear();
        self.bytes.try_reserve(text.len())?;
        self.bytes.extend_from_slice(text.as_bytes());
        self.recompute(split);
        self.cursor = self.grapheme_count();
        Ok(())
    }

    /// Swap the graphemes at `cursor - 1` and `cursor`, then move the cursor
    /// right by one. No-op with fewer than two graphemes, at position 0, or
    /// at the end of the buffer. Returns whether anything changed.
    pub fn transpose_at_cursor(&mut self, split: GraphemeSplitFn) -> bool {
        let cursor = self.cursor;
        if self.grapheme_count() < 2 || cursor == 0 || cursor >= self.grapheme_count() {
            return false;
        }

        let a = self.segs.byte_range(cursor - 1);
        let b = self.segs.byte_range(cursor);
        let scratch: Vec<u8> = self.bytes[a.clone()].to_vec();
        self.bytes.copy_within(b.clone(), a.start);
        let a_new_start = a.start + (b.end - b.start);
        self.bytes[a_new_start..b.end].copy_from_slice(&scratch);

        self.recompute(split);
        self.cursor = (cursor + 1).min(self.grapheme_count());
        true
    }

    // Line-oriented queries used by Home/End, Ctrl-K/Ctrl-U and the
    // renderer.

    /// Row the cursor is on.
    #[must_use]
    pub fn cursor_row(&self) -> usize { self.lines.row_at_byte(self.cursor_byte()) }

    /// Grapheme index of the first grapheme of `row`.
    #[must_use]
    pub fn row_first_seg(&self, row: usize) -> usize {
        self.segs.seg_at_byte(self.lines.start(row))
    }

    /// Grapheme index of the end of `row`: before the trailing `\n` for all
    /// but the last row, the buffer end for the last one.
    #[must_use]
    pub fn row_end_seg(&self, row: usize) -> usize {
        let next = self.segs.seg_at_byte(self.lines.start(row + 1));
        if row + 1 < self.lines.count() {
            next.saturating_sub(1) // sit before the \n grapheme
        } else {
            next
        }
    }
}

impl Default for EditBuffer {
    fn default() -> Self { Self::new() }
}
