//! # FastC Fault Primitive
//!
//! When a generated safety check fails there is nothing to recover: the
//! program has already proven itself wrong. [`fault`] reports what happened
//! and aborts the process. It does not unwind, run destructors or return a
//! value to inspect.
//!
//! ## Reporting
//!
//! A fault is reported twice:
//!
//! 1. as a `log::error!` record, for whatever logger the host installed;
//! 2. as one line written straight to standard error,
//!    `fastc: fatal runtime fault: <kind> at <file>:<line>:<col>`,
//!    so the diagnostic survives a process with no logger at all.
//!
//! The direct line can be silenced with [`set_quiet`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use fc_trap::{FaultKind, fault};
//!
//! fn checked_index(xs: &[u32], i: usize) -> u32 {
//!     if i >= xs.len() {
//!         fault(FaultKind::BoundsCheck);
//!     }
//!     xs[i]
//! }
//! # checked_index(&[], 0);
//! ```

use std::io::Write;
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};

pub mod check;
mod kind;

pub use kind::FaultKind;

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress (or restore) the direct standard-error diagnostic.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

#[must_use]
pub fn is_quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Report `kind` at the caller's location and abort.
#[cold]
#[inline(never)]
#[track_caller]
pub fn fault(kind: FaultKind) -> ! {
    fault_at(kind, Some(Location::caller()))
}

/// A fault with no further detail.
#[cold]
#[inline(never)]
#[track_caller]
pub fn trap() -> ! {
    fault(FaultKind::Unspecified)
}

/// Report `kind` and abort; `location` is `None` when the fault comes from
/// code that has no Rust source location, such as a C caller.
#[cold]
#[inline(never)]
pub fn fault_at(kind: FaultKind, location: Option<&Location<'_>>) -> ! {
    match location {
        Some(at) => log::error!("fatal runtime fault: {kind} at {at}"),
        None => log::error!("fatal runtime fault: {kind}"),
    }
    if !is_quiet() {
        report(kind, location);
    }
    std::process::abort()
}

fn report(kind: FaultKind, location: Option<&Location<'_>>) {
    // Nothing useful to do if stderr itself is gone; abort regardless.
    let mut err = std::io::stderr().lock();
    let _ = match location {
        Some(at) => writeln!(err, "fastc: fatal runtime fault: {kind} at {at}"),
        None => writeln!(err, "fastc: fatal runtime fault: {kind}"),
    };
    let _ = err.flush();
}
