// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Grapheme engine: UTF-8 decode, the default heuristic cluster splitter,
//! the default width estimator, and the segment/line indices built on them.

mod grapheme_splitter;
mod grapheme_width;
mod segment_index;

pub use grapheme_splitter::*;
pub use grapheme_width::*;
pub use segment_index::*;
