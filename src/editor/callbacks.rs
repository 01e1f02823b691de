// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Host callback contracts. The C-style `void *ref` user pointer of
//! traditional line editors becomes closure capture here; the editor only
//! borrows the callbacks for its own lifetime.

/// One coloured span of the buffer, as reported by a [`SyntaxColorFn`].
/// `byte_end` must be strictly greater than the offset the callback was
/// invoked with; a non-advancing span aborts colouring for the rest of the
/// line (but never aborts rendering).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSpan {
    /// Exclusive end of the span, as a byte offset into the buffer.
    pub byte_end: usize,
    /// Index into the palette installed with
    /// [`set_palette`](crate::InlineEditor::set_palette). Out-of-range
    /// indices fall back to the default colour.
    pub color_index: usize,
}

/// Autocomplete enumerator. Called repeatedly with the buffer contents and
/// an iteration cursor that starts at 0 and is otherwise opaque to the
/// editor. Returns the *suffix* to append at the cursor (not the full
/// match), or `None` to end enumeration. The editor copies each suffix
/// immediately.
pub type AutocompleteFn = Box<dyn FnMut(&str, &mut usize) -> Option<String>>;

/// Syntax colouring callback: given the buffer and a start offset, report
/// the span that begins there, or `None` to leave the remainder uncoloured.
pub type SyntaxColorFn = Box<dyn FnMut(&str, usize) -> Option<ColorSpan>>;

/// Multi-line predicate, consulted on Return: `true` means "input is
/// incomplete, insert a newline instead of committing". Should be pure and
/// fast.
pub type MultilineFn = Box<dyn FnMut(&str) -> bool>;
