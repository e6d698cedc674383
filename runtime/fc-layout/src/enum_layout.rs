use crate::{FieldLayout, LayoutError};
use core::ffi::c_int;

/// Width of every FastC enum value: a plain C `int`.
pub const ENUM_REPR_SIZE: usize = 4;

const _: () = assert!(
    size_of::<c_int>() == ENUM_REPR_SIZE,
    "the enum contract assumes a 4-byte C int"
);

/// Layout of a C-compatible enum with sequential discriminants.
///
/// Variant `k` (declaration order, zero-based) has value `k`. There are no
/// gaps and no user-chosen discriminants.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EnumLayout {
    variants: usize,
}

impl EnumLayout {
    /// # Errors
    /// [`LayoutError::TooManyVariants`] if the last discriminant exceeds `i32::MAX`.
    #[allow(clippy::cast_sign_loss)]
    pub const fn new(variants: usize) -> Result<Self, LayoutError> {
        if variants > i32::MAX as usize + 1 {
            return Err(LayoutError::TooManyVariants(variants));
        }
        Ok(Self { variants })
    }

    #[must_use]
    pub const fn variants(&self) -> usize {
        self.variants
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        ENUM_REPR_SIZE
    }

    #[must_use]
    pub const fn align(&self) -> usize {
        ENUM_REPR_SIZE
    }

    #[must_use]
    pub const fn as_field(&self) -> FieldLayout {
        FieldLayout::new(ENUM_REPR_SIZE, ENUM_REPR_SIZE)
    }

    /// The integer value of variant `index`, if it exists.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub const fn discriminant(&self, index: usize) -> Option<i32> {
        if index < self.variants {
            Some(index as i32)
        } else {
            None
        }
    }

    /// The variant index an integer value denotes, if any.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub const fn variant_of(&self, value: i32) -> Option<usize> {
        if value >= 0 && (value as usize) < self.variants {
            Some(value as usize)
        } else {
            None
        }
    }
}
