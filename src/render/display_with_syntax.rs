// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Standalone "echo with syntax colouring" helper.
//!
//! Unlike the interactive renderer there is no viewport clipping: the
//! syntax callback is walked from offset 0 to the end of the string, each
//! span is emitted in its palette colour, and the foreground is reset after
//! every span. A missing or non-advancing span flushes the remainder
//! uncoloured.

use crate::core::ansi::{palette_lookup, PaletteColor, SGR_RESET_FOREGROUND};
use crate::core::graphemes::TAB_WIDTH;
use crate::editor::callbacks::SyntaxColorFn;
use std::io::{self, Write};

pub(crate) fn display_with_syntax(
    text: &str,
    palette: &[PaletteColor],
    mut syntax_fn: Option<&mut SyntaxColorFn>,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut offset = 0;
    while offset < text.len() {
        let span = match syntax_fn.as_mut() {
            Some(f) if !palette.is_empty() => f(text, offset),
            _ => None,
        };

        match span {
            Some(span) if span.byte_end > offset => {
                let end = span.byte_end.min(text.len());
                let color = palette_lookup(palette, span.color_index);
                if color != PaletteColor::Default {
                    write!(out, "{color}")?;
                }
                write_expanding_tabs(&text[offset..end], out)?;
                out.write_all(SGR_RESET_FOREGROUND.as_bytes())?;
                offset = end;
            }
            _ => {
                // Null or non-advancing result: rest goes out uncoloured.
                write_expanding_tabs(&text[offset..], out)?;
                break;
            }
        }
    }
    out.flush()
}

fn write_expanding_tabs(chunk: &str, out: &mut dyn Write) -> io::Result<()> {
    for part in chunk.split_inclusive('\t') {
        match part.strip_suffix('\t') {
            Some(head) => {
                out.write_all(head.as_bytes())?;
                for _ in 0..TAB_WIDTH {
                    out.write_all(b" ")?;
                }
            }
            None => out.write_all(part.as_bytes())?,
        }
    }
    Ok(())
}
