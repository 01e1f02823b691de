// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Process-wide registry backing the signal and exit handlers.
//!
//! There is exactly one interactive terminal per process, so the state the
//! handlers need lives in module-level statics:
//!
//! - a resize-pending flag flipped by `SIGWINCH` (or the console's window
//!   event on Windows) and polled by the interactive loop between
//!   keystrokes;
//! - the "restore slot": the terminal attributes saved by the editor that
//!   most recently entered raw mode, written *before* the handlers are
//!   installed so the handlers only ever read it;
//! - the previously installed disposition of every signal we take over,
//!   so graceful-termination handlers can chain to them, and so uninstall
//!   can put everything back.
//!
//! Everything a handler touches is either an atomic or written strictly
//! before installation, keeping the handlers async-signal-safe: they only
//! flip the flag or perform a single `tcsetattr`.

use std::sync::atomic::{AtomicBool, Ordering};

/// Resize events coalesce into this single flag; the interactive loop
/// re-queries the width when it observes it.
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

pub fn set_resize_pending() { RESIZE_PENDING.store(true, Ordering::Release); }

/// Observe-and-clear.
pub fn take_resize_pending() -> bool { RESIZE_PENDING.swap(false, Ordering::AcqRel) }

#[cfg(unix)]
pub use unix_impl::*;

#[cfg(unix)]
mod unix_impl {
    use super::set_resize_pending;
    use rustix::termios::{self, OptionalActions, Termios};
    use std::cell::UnsafeCell;
    use std::mem::MaybeUninit;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Once;

    /// Signals whose handlers restore the terminal and then chain to the
    /// previously installed handler (or re-raise the default disposition).
    const GRACEFUL_SIGNALS: &[i32] =
        &[libc::SIGINT, libc::SIGTERM, libc::SIGQUIT, libc::SIGHUP];

    /// Signals that indicate a crash: restore the terminal, restore the
    /// default disposition, and re-raise.
    const CRASH_SIGNALS: &[i32] = &[
        libc::SIGSEGV,
        libc::SIGABRT,
        libc::SIGBUS,
        libc::SIGILL,
        libc::SIGFPE,
    ];

    const ALL_SIGNALS_MAX: usize = 10;

    /// Saved terminal attributes for the editor currently in raw mode.
    ///
    /// Protocol: the raw-mode layer writes the termios while `armed` is
    /// false, then arms with a release store. Handlers (and the atexit
    /// hook) acquire-load `armed` and only then read the termios. It is
    /// never mutated while armed, so the unsynchronised read is sound.
    struct RestoreSlot {
        armed: AtomicBool,
        termios: UnsafeCell<Option<Termios>>,
    }

    // Access follows the write-before-arm protocol above.
    unsafe impl Sync for RestoreSlot {}

    static RESTORE_SLOT: RestoreSlot = RestoreSlot {
        armed: AtomicBool::new(false),
        termios: UnsafeCell::new(None),
    };

    /// Previously installed sigactions, captured once per install. Written
    /// only from the (single) thread that owns the terminal, before the
    /// corresponding handler is installed.
    struct SavedActions(UnsafeCell<[Option<(i32, libc::sigaction)>; ALL_SIGNALS_MAX]>);

    unsafe impl Sync for SavedActions {}

    static SAVED_ACTIONS: SavedActions = SavedActions(UnsafeCell::new([None; ALL_SIGNALS_MAX]));

    static ATEXIT_ONCE: Once = Once::new();

    /// Record the terminal attributes the handlers should restore. Called by
    /// the raw-mode layer before handler installation.
    pub fn arm_restore(saved: Termios) {
        RESTORE_SLOT.armed.store(false, Ordering::Release);
        // No handler can observe the slot while disarmed.
        unsafe { *RESTORE_SLOT.termios.get() = Some(saved) };
        RESTORE_SLOT.armed.store(true, Ordering::Release);
    }

    /// Forget the saved attributes (raw mode exited normally).
    pub fn disarm_restore() { RESTORE_SLOT.armed.store(false, Ordering::Release); }

    /// Put the terminal back into its saved state. Idempotent; safe to call
    /// from signal handlers and atexit (a single `tcsetattr`).
    pub fn restore_terminal() {
        if !RESTORE_SLOT.armed.load(Ordering::Acquire) {
            return;
        }
        let saved = unsafe { &*RESTORE_SLOT.termios.get() };
        if let Some(saved) = saved {
            drop(termios::tcsetattr(
                rustix::stdio::stdin(),
                OptionalActions::Flush,
                saved,
            ));
        }
    }

    extern "C" fn atexit_restore() { restore_terminal(); }

    fn saved_action_for(sig: i32) -> Option<libc::sigaction> {
        let saved = unsafe { &*SAVED_ACTIONS.0.get() };
        saved
            .iter()
            .flatten()
            .find(|(s, _)| *s == sig)
            .map(|(_, act)| *act)
    }

    fn reset_and_reraise(sig: i32) {
        unsafe {
            let mut dfl: libc::sigaction = MaybeUninit::zeroed().assume_init();
            dfl.sa_sigaction = libc::SIG_DFL;
            libc::sigemptyset(&mut dfl.sa_mask);
            libc::sigaction(sig, &dfl, std::ptr::null_mut());
            libc::raise(sig);
        }
    }

    /// Invoke the handler that was installed before ours, if there was one.
    /// Returns false when the previous disposition was default/ignore.
    fn chain_to_previous(sig: i32) -> bool {
        let Some(prev) = saved_action_for(sig) else {
            return false;
        };
        let fn_ptr = prev.sa_sigaction;
        if fn_ptr == libc::SIG_DFL || fn_ptr == libc::SIG_IGN {
            return false;
        }
        unsafe {
            if prev.sa_flags & libc::SA_SIGINFO != 0 {
                let f: extern "C" fn(libc::c_int, *mut libc::siginfo_t, *mut libc::c_void) =
                    std::mem::transmute(fn_ptr);
                f(sig, std::ptr::null_mut(), std::ptr::null_mut());
            } else {
                let f: extern "C" fn(libc::c_int) = std::mem::transmute(fn_ptr);
                f(sig);
            }
        }
        true
    }

    extern "C" fn signal_handler(sig: libc::c_int) {
        if sig == libc::SIGWINCH {
            set_resize_pending();
            return;
        }

        restore_terminal();

        if GRACEFUL_SIGNALS.contains(&sig) && chain_to_previous(sig) {
            return;
        }
        reset_and_reraise(sig);
    }

    /// Install the signal handlers, capturing whatever was there before.
    /// The restore slot must already be armed.
    pub fn install_handlers() {
        ATEXIT_ONCE.call_once(|| unsafe {
            libc::atexit(atexit_restore);
        });

        let saved = unsafe { &mut *SAVED_ACTIONS.0.get() };
        let mut slot = 0;

        let all = GRACEFUL_SIGNALS
            .iter()
            .chain(CRASH_SIGNALS)
            .chain(std::iter::once(&libc::SIGWINCH));
        for &sig in all {
            unsafe {
                let mut action: libc::sigaction = MaybeUninit::zeroed().assume_init();
                action.sa_sigaction = signal_handler as usize;
                libc::sigemptyset(&mut action.sa_mask);
                action.sa_flags = libc::SA_RESTART;

                let mut previous: libc::sigaction = MaybeUninit::zeroed().assume_init();
                if libc::sigaction(sig, &action, &mut previous) == 0 {
                    saved[slot] = Some((sig, previous));
                    slot += 1;
                }
            }
        }
    }

    /// Put every captured disposition back.
    pub fn uninstall_handlers() {
        let saved = unsafe { &mut *SAVED_ACTIONS.0.get() };
        for entry in saved.iter_mut() {
            if let Some((sig, previous)) = entry.take() {
                unsafe {
                    libc::sigaction(sig, &previous, std::ptr::null_mut());
                }
            }
        }
    }
}
