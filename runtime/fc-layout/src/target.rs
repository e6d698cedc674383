//! # Target data models
//!
//! The layout contract is fixed, but the widths it is expressed in are not:
//! a slice is "pointer + `size_t`", which is 16 bytes on x86-64 and 8 bytes on
//! wasm32. [`TargetAbi`] captures the handful of widths the contract depends on.

use core::ffi::{c_int, c_long};

/// C data model of a target (how wide `int`, `long` and pointers are).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DataModel {
    /// `int`, `long` and pointers are 32 bits.
    Ilp32,
    /// `long` and pointers are 64 bits (Unix-like 64-bit targets).
    Lp64,
    /// Only pointers are 64 bits (64-bit Windows).
    Llp64,
}

/// Widths and alignments the layout contract is expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TargetAbi {
    pub name: &'static str,
    pub data_model: DataModel,
    /// Width of a data pointer in bytes.
    pub pointer_width: usize,
    /// Width of `size_t` in bytes.
    pub size_width: usize,
    /// Width of C `int` in bytes.
    pub int_width: usize,
    /// Alignment of 64-bit scalars (`int64_t`, `double`) inside a struct.
    ///
    /// This is 4 on i686 System V and 8 nearly everywhere else.
    pub align_64: usize,
}

impl TargetAbi {
    pub const X86_64_SYSV: Self = Self {
        name: "x86_64-sysv",
        data_model: DataModel::Lp64,
        pointer_width: 8,
        size_width: 8,
        int_width: 4,
        align_64: 8,
    };

    pub const AARCH64_SYSV: Self = Self {
        name: "aarch64-sysv",
        data_model: DataModel::Lp64,
        pointer_width: 8,
        size_width: 8,
        int_width: 4,
        align_64: 8,
    };

    pub const X86_64_WINDOWS: Self = Self {
        name: "x86_64-windows",
        data_model: DataModel::Llp64,
        pointer_width: 8,
        size_width: 8,
        int_width: 4,
        align_64: 8,
    };

    pub const I686_SYSV: Self = Self {
        name: "i686-sysv",
        data_model: DataModel::Ilp32,
        pointer_width: 4,
        size_width: 4,
        int_width: 4,
        align_64: 4,
    };

    pub const WASM32: Self = Self {
        name: "wasm32",
        data_model: DataModel::Ilp32,
        pointer_width: 4,
        size_width: 4,
        int_width: 4,
        align_64: 8,
    };

    /// The target this crate is being compiled for.
    #[must_use]
    pub const fn host() -> Self {
        let pointer_width = size_of::<*const ()>();
        let data_model = if pointer_width == 4 {
            DataModel::Ilp32
        } else if size_of::<c_long>() == 4 {
            DataModel::Llp64
        } else {
            DataModel::Lp64
        };

        Self {
            name: "host",
            data_model,
            pointer_width,
            size_width: size_of::<usize>(),
            int_width: size_of::<c_int>(),
            align_64: align_of::<u64>(),
        }
    }

    /// All presets, in declaration order.
    pub const PRESETS: [Self; 5] = [
        Self::X86_64_SYSV,
        Self::AARCH64_SYSV,
        Self::X86_64_WINDOWS,
        Self::I686_SYSV,
        Self::WASM32,
    ];
}
