//! # FastC Runtime
//!
//! The runtime layer FastC programs link against, and the binary layout
//! contract they share with C. This crate gathers the component crates behind
//! one Rust API and one C ABI, and owns process-level concerns: logging and
//! configuration.
//!
//! ```text
//!   fc-rt ─┬─ layout     (fc-layout)     struct / enum / slice representation
//!          ├─ unaligned  (fc-unaligned)  byte-copy loads and stores
//!          ├─ allocator  (fc-alloc)      pluggable allocation capability
//!          ├─ fault      (fc-trap)       abort on safety violations
//!          └─ ffi                        extern "C" symbols for generated code
//! ```
//!
//! Built as both `rlib` and `staticlib`; a C program links `libfc_rt.a`.
//!
//! ## Initialization
//!
//! Optional. Without it the primitives work and faults still print their
//! diagnostic; only the `log` records go nowhere. [`init`] (or `fc_rt_init()`
//! from C) installs [`StderrLogger`] at the configured level and applies the
//! fault settings.
//!
//! ```rust
//! let config = fc_rt::RuntimeConfig::from_env().unwrap_or_default();
//! let _ = fc_rt::init(&config);
//! ```

pub mod ffi;

mod config;
#[cfg(feature = "logger")]
mod logger;

pub use config::{ConfigError, FAULT_QUIET_ENV, LOG_ENV, RuntimeConfig};
#[cfg(feature = "logger")]
pub use logger::StderrLogger;

pub use fc_alloc as allocator;
pub use fc_layout as layout;
pub use fc_trap as fault;
pub use fc_unaligned as unaligned;

pub use fc_alloc::{AllocRequest, Allocator, FcAllocator, FreeListHeap, SystemAllocator};
pub use fc_layout::{CLayout, FcSlice, TypeShape};
pub use fc_trap::{FaultKind, check, trap};

/// Apply `config` to the process.
///
/// The fault settings always take effect. With the `logger` feature the
/// [`StderrLogger`] is installed as well.
///
/// # Errors
/// A logger is already installed; the fault settings are applied anyway and
/// the log level is still raised or lowered to `config.log_level`, on a
/// previously installed [`StderrLogger`] too.
pub fn init(config: &RuntimeConfig) -> Result<(), log::SetLoggerError> {
    fc_trap::set_quiet(config.fault_quiet);

    #[cfg(feature = "logger")]
    StderrLogger::new(config.log_level).init()?;
    #[cfg(not(feature = "logger"))]
    log::set_max_level(config.log_level);

    log::debug!("runtime configured: {config:?}");
    Ok(())
}

/// Element `index` of `slice`, after the bounds check generated code emits.
///
/// Faults with [`FaultKind::BoundsCheck`] if `index >= slice.len()`.
///
/// # Safety
/// The slice's backing storage is live and initialized.
#[inline]
#[track_caller]
pub unsafe fn slice_get<T: Copy>(slice: FcSlice<T>, index: usize) -> T {
    check::bounds(index, slice.len());
    unsafe { slice.read(index) }
}

/// Store `value` at `index` of `slice`, after the bounds check.
///
/// # Safety
/// The slice's backing storage is live and writable.
#[inline]
#[track_caller]
pub unsafe fn slice_set<T: Copy>(slice: FcSlice<T>, index: usize, value: T) {
    check::bounds(index, slice.len());
    unsafe { slice.write(index, value) }
}
