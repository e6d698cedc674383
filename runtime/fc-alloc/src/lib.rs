//! # FastC Allocator Abstraction
//!
//! Storage for dynamically sized FastC values comes from an explicitly passed
//! allocator capability, never from hidden global state.
//!
//! ```text
//!            generated code / Rust callers            C callers
//!                         │                              │
//!                  &dyn Allocator                  FcAllocator (vtable)
//!                         │                              │
//!         ┌───────────────┼───────────────────┐          │
//!         ▼               ▼                   ▼          │
//!  SystemAllocator   FreeListHeap   TrackingAllocator<A> │
//!  (process heap)    (fixed region)  (counts, wraps A) ◄─┘ from_static()
//! ```
//!
//! ## Contract
//!
//! * `allocate(request)` returns a block of at least `request.size()` bytes
//!   aligned to `request.align()`, or `None`. The allocator never faults;
//!   what to do about a failed allocation is the caller's decision.
//! * `release(ptr)` returns a block. Foreign pointers and double release are
//!   undefined. The built-in allocators carry a header that catches some of
//!   these and logs them instead.
//! * Use after release is not detected.
//!
//! ## Example
//!
//! ```rust
//! use fc_alloc::{AllocRequest, Allocator, FreeListHeap};
//!
//! let heap = FreeListHeap::with_capacity(4096).unwrap();
//! let p = heap.allocate(AllocRequest::new(20, 4).unwrap()).unwrap();
//! assert_eq!(p.as_ptr() as usize % 4, 0);
//! unsafe { heap.release(p) };
//! assert_eq!(heap.free_bytes(), heap.capacity());
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

extern crate alloc;

mod allocator;
mod error;
mod header;
mod heap;
mod request;
mod spin_lock;
mod system;
mod tracking;
mod vtable;

pub use allocator::Allocator;
pub use error::AllocError;
pub use heap::FreeListHeap;
pub use request::{AllocRequest, MAX_ALIGN, MAX_SIZE};
pub use system::SystemAllocator;
pub use tracking::{AllocStats, TrackingAllocator};
pub use vtable::{FcAllocFn, FcAllocator, FcFreeFn};
