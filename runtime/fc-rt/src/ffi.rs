//! # C ABI
//!
//! The symbols generated C code links against. Declarations live in the
//! `fastc_runtime.h` emitted by `fc-abi-gen`.
//!
//! Nothing here unwinds into C: the functions either return or abort.

use crate::{RuntimeConfig, init};
use core::ffi::{c_int, c_void};
use fc_alloc::{Allocator, FcAllocator, SystemAllocator};
use fc_trap::{FaultKind, fault_at};

/// # Safety
/// `ptr` is readable for 2 bytes; any alignment.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_read_u16_unaligned(ptr: *const c_void) -> u16 {
    unsafe { fc_unaligned::read_u16(ptr.cast()) }
}

/// # Safety
/// `ptr` is readable for 4 bytes; any alignment.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_read_u32_unaligned(ptr: *const c_void) -> u32 {
    unsafe { fc_unaligned::read_u32(ptr.cast()) }
}

/// # Safety
/// `ptr` is readable for 8 bytes; any alignment.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_read_u64_unaligned(ptr: *const c_void) -> u64 {
    unsafe { fc_unaligned::read_u64(ptr.cast()) }
}

/// # Safety
/// `ptr` is writable for 2 bytes; any alignment.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_write_u16_unaligned(ptr: *mut c_void, value: u16) {
    unsafe { fc_unaligned::write_u16(ptr.cast(), value) }
}

/// # Safety
/// `ptr` is writable for 4 bytes; any alignment.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_write_u32_unaligned(ptr: *mut c_void, value: u32) {
    unsafe { fc_unaligned::write_u32(ptr.cast(), value) }
}

/// # Safety
/// `ptr` is writable for 8 bytes; any alignment.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_write_u64_unaligned(ptr: *mut c_void, value: u64) {
    unsafe { fc_unaligned::write_u64(ptr.cast(), value) }
}

/// # Safety
/// `src` readable and `dst` writable for `n` bytes; the ranges do not overlap.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_memcpy(dst: *mut c_void, src: *const c_void, n: usize) {
    unsafe { fc_unaligned::copy_bytes(dst.cast(), src.cast(), n) }
}

/// Allocate from the process allocator. NULL on failure or for an alignment
/// that is not a power of two.
#[unsafe(no_mangle)]
pub extern "C" fn fc_alloc(size: usize, align: usize) -> *mut c_void {
    SystemAllocator.allocate_raw(size, align).cast()
}

/// # Safety
/// `ptr` is NULL or came from [`fc_alloc`] and was not freed since.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_free(ptr: *mut c_void) {
    unsafe { SystemAllocator.release_raw(ptr.cast()) }
}

#[unsafe(no_mangle)]
pub extern "C" fn fc_allocator_system() -> FcAllocator {
    FcAllocator::system()
}

/// Allocate through an explicit allocator capability.
///
/// # Safety
/// `allocator` points to a valid [`FcAllocator`]; a NULL `allocator` faults.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_allocator_alloc(
    allocator: *const FcAllocator,
    size: usize,
    align: usize,
) -> *mut c_void {
    let Some(allocator) = (unsafe { allocator.as_ref() }) else {
        fault_at(FaultKind::NullPointer, None)
    };
    allocator.allocate_raw(size, align).cast()
}

/// # Safety
/// `allocator` points to a valid [`FcAllocator`]; `ptr` is NULL or a live
/// block of that allocator. A NULL `allocator` faults.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn fc_allocator_free(allocator: *const FcAllocator, ptr: *mut c_void) {
    let Some(allocator) = (unsafe { allocator.as_ref() }) else {
        fault_at(FaultKind::NullPointer, None)
    };
    unsafe { allocator.release_raw(ptr.cast()) }
}

#[unsafe(no_mangle)]
pub extern "C" fn fc_trap() -> ! {
    fault_at(FaultKind::Unspecified, None)
}

/// Fault with an `fc_fault_kind`; unknown values report as unspecified.
#[unsafe(no_mangle)]
pub extern "C" fn fc_trap_kind(kind: c_int) -> ! {
    fault_at(FaultKind::from_c(kind), None)
}

/// Apply the environment configuration.
///
/// Returns 0 on success, -1 if the environment holds an invalid value (the
/// defaults stay in effect) and 1 if a logger was already installed.
#[unsafe(no_mangle)]
pub extern "C" fn fc_rt_init() -> c_int {
    let config = match RuntimeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            let _ = init(&RuntimeConfig::default());
            log::error!("{e}");
            return -1;
        }
    };
    match init(&config) {
        Ok(()) => 0,
        Err(_) => 1,
    }
}
