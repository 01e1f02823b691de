// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Platform-agnostic raw mode entry/exit with nesting support, plus the
//! RAII guard used by the interactive read.
//!
//! A process-wide reference count makes nested raw-mode sessions (multiple
//! editors, or re-entrant hosts) safe: only the outermost enter touches the
//! terminal and installs the signal handlers, and only the matching exit
//! restores them.

#[cfg(unix)]
use super::raw_mode_unix as platform;
#[cfg(windows)]
use super::raw_mode_windows as platform;
#[cfg(unix)]
use crate::terminal_io::signal_registry;
use std::sync::atomic::{AtomicUsize, Ordering};

static RAW_MODE_COUNT: AtomicUsize = AtomicUsize::new(0);

/// RAII session for raw mode. Dropping it exits raw mode (outermost level
/// only), which guarantees restoration on every exit path from the
/// interactive read: commit, EOF, error, and early return.
#[derive(Debug)]
pub struct RawModeSession {
    #[cfg_attr(windows, allow(dead_code))]
    install_handlers: bool,
}

impl RawModeSession {
    /// Enter raw mode. When `install_handlers` is set (the default for
    /// interactive reads; hosts can opt out), the signal/console handlers
    /// are installed for the duration of the outermost session.
    ///
    /// # Errors
    ///
    /// Returns a diagnostic if the terminal attributes cannot be changed.
    pub fn enter(install_handlers: bool) -> miette::Result<Self> {
        if RAW_MODE_COUNT.fetch_add(1, Ordering::AcqRel) == 0 {
            if let Err(e) = platform::enable_raw_mode() {
                RAW_MODE_COUNT.fetch_sub(1, Ordering::AcqRel);
                return Err(e);
            }
            #[cfg(unix)]
            if install_handlers {
                signal_registry::install_handlers();
            }
            tracing::debug!(message = "raw mode entered");
        }
        Ok(Self { install_handlers })
    }
}

impl Drop for RawModeSession {
    fn drop(&mut self) {
        if RAW_MODE_COUNT.fetch_sub(1, Ordering::AcqRel) == 1 {
            #[cfg(unix)]
            if self.install_handlers {
                signal_registry::uninstall_handlers();
            }
            drop(platform::disable_raw_mode());
            tracing::debug!(message = "raw mode exited");
        }
    }
}
