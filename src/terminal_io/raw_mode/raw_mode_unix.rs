// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Unix/Linux/macOS raw mode via rustix's safe termios API.
//!
//! The explicit flag set below (instead of `Termios::make_raw`) is the
//! classic raw-mode recipe: it disables exactly the input processing,
//! output post-processing, echo/canonical/extended/signal bits the
//! interactive loop cannot tolerate, and nothing else.

use crate::terminal_io::signal_registry;
use rustix::termios::{
    self, ControlModes, InputModes, LocalModes, OptionalActions, OutputModes,
    SpecialCodeIndex,
};

/// Enable raw mode on stdin, saving the prior attributes into the
/// process-wide restore slot so signal/atexit handlers can undo it.
///
/// # Errors
///
/// Returns a diagnostic when terminal attributes cannot be read or written
/// (stdin not a terminal, or the tty went away).
pub fn enable_raw_mode() -> miette::Result<()> {
    let stdin = rustix::stdio::stdin();

    let saved = termios::tcgetattr(stdin)
        .map_err(|e| miette::miette!("failed to retrieve terminal attributes: {e}"))?;

    signal_registry::arm_restore(saved.clone());

    let mut raw = saved;
    // Input: no software flow control, no CR→NL translation, no break/parity
    // processing, keep all 8 bits.
    raw.input_modes &= !(InputModes::IXON
        | InputModes::ICRNL
        | InputModes::BRKINT
        | InputModes::INPCK
        | InputModes::ISTRIP);
    // Output: no post-processing ("\n" stays a bare line feed).
    raw.output_modes &= !OutputModes::OPOST;
    // 8 bits per character.
    raw.control_modes |= ControlModes::CS8;
    // No echo, no canonical line assembly, no implementation-defined input
    // processing, no signal generation from Ctrl-C / Ctrl-Z.
    raw.local_modes &= !(LocalModes::ECHO
        | LocalModes::ICANON
        | LocalModes::IEXTEN
        | LocalModes::ISIG);
    // Return each read as soon as one byte is available, with no timer.
    raw.special_codes[SpecialCodeIndex::VMIN] = 1;
    raw.special_codes[SpecialCodeIndex::VTIME] = 0;

    termios::tcsetattr(stdin, OptionalActions::Flush, &raw)
        .map_err(|e| miette::miette!("failed to set terminal attributes: {e}"))?;

    Ok(())
}

/// Restore the attributes saved by [`enable_raw_mode`] and disarm the
/// restore slot. No-op if raw mode was never enabled.
pub fn disable_raw_mode() -> miette::Result<()> {
    signal_registry::restore_terminal();
    signal_registry::disarm_restore();
    Ok(())
}
