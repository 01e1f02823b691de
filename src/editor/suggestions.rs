// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Autocomplete driver. Owns the gathered suggestion suffixes and the
//! "current" cursor cycled by Tab / Shift-Tab.
//!
//! Suggestions are only ever generated while the cursor sits at the end of
//! the buffer and no selection is active; any regeneration request outside
//! those conditions just clears the list.

use super::callbacks::AutocompleteFn;
use super::string_list::StringList;

#[derive(Debug, Default)]
pub struct Suggestions {
    list: StringList,
}

impl Suggestions {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn has_suggestions(&self) -> bool { !self.list.is_empty() }

    /// The suffix currently offered as the ghost suggestion.
    #[must_use]
    pub fn current(&self) -> Option<&str> { self.list.current() }

    /// Cycle through the gathered suffixes with wrap-around.
    pub fn advance(&mut self, delta: isize) { self.list.advance(delta, true); }

    pub fn clear(&mut self) { self.list.clear(); }

    /// Re-run the host enumerator against the current buffer. `eligible` is
    /// the gating condition (cursor at buffer end, no active selection)
    /// computed by the caller.
    pub fn regenerate(
        &mut self,
        buffer: &str,
        eligible: bool,
        complete_fn: Option<&mut AutocompleteFn>,
    ) {
        self.list.clear();
        let Some(complete_fn) = complete_fn else { return };
        if !eligible {
            return;
        }

        let mut index: usize = 0;
        while let Some(suffix) = complete_fn(buffer, &mut index) {
            self.list.append(&suffix);
        }
        if !self.list.is_empty() {
            self.list.set_current(Some(0));
        }
    }
}
