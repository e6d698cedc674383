//! # Struct layout
//!
//! The C layout algorithm, in two flavors sharing one [`Cursor`]:
//!
//! - [`c_struct_layout`] is a `const fn` over a fixed number of fields, so the
//!   derive macro can compare it against `offset_of!` inside `const _: () = …`
//!   blocks and turn any mismatch into a compile error;
//! - [`StructLayout::compute`] accepts any number of fields at runtime.
//!
//! ```text
//!  struct { u8 a; u32 b; u16 c; }
//!
//!  offset  0   1   2   3   4   5   6   7   8   9  10  11
//!         [a ][ pad      ][ b             ][ c     ][pad]
//!  size 12, align 4
//! ```

use crate::{LayoutError, Scalar, TargetAbi};
use alloc::vec::Vec;

/// Size and alignment of a single field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FieldLayout {
    pub size: usize,
    pub align: usize,
}

impl FieldLayout {
    #[must_use]
    pub const fn new(size: usize, align: usize) -> Self {
        Self { size, align }
    }

    /// The layout Rust uses for `T` on the compiling target.
    #[must_use]
    pub const fn of<T>() -> Self {
        Self::new(size_of::<T>(), align_of::<T>())
    }

    #[must_use]
    pub const fn scalar(scalar: Scalar, target: &TargetAbi) -> Self {
        Self::new(scalar.size(target), scalar.align(target))
    }

    /// Layout of a C array `T[count]` with `self` as element layout.
    ///
    /// # Errors
    /// [`LayoutError::SizeOverflow`] if the array does not fit the address space.
    pub const fn array(self, count: usize) -> Result<Self, LayoutError> {
        match self.size.checked_mul(count) {
            Some(size) => Ok(Self::new(size, self.align)),
            None => Err(LayoutError::SizeOverflow),
        }
    }
}

/// Round `offset` up to the next multiple of `align` (a power of two).
///
/// Returns `None` on overflow or a zero `align`.
#[inline]
#[must_use]
pub const fn align_up(offset: usize, align: usize) -> Option<usize> {
    if align == 0 {
        return None;
    }
    match offset.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Running state of the C layout algorithm.
#[derive(Debug, Copy, Clone)]
struct Cursor {
    offset: usize,
    align: usize,
}

impl Cursor {
    const fn new() -> Self {
        Self {
            offset: 0,
            align: 1,
        }
    }

    /// Place the next field and return its offset.
    const fn place(&mut self, field: FieldLayout) -> Result<usize, LayoutError> {
        if !field.align.is_power_of_two() {
            return Err(LayoutError::AlignNotPowerOfTwo(field.align));
        }
        let Some(offset) = align_up(self.offset, field.align) else {
            return Err(LayoutError::SizeOverflow);
        };
        let Some(end) = offset.checked_add(field.size) else {
            return Err(LayoutError::SizeOverflow);
        };
        self.offset = end;
        if field.align > self.align {
            self.align = field.align;
        }
        Ok(offset)
    }

    /// Tail padding: round the total up to the struct alignment.
    const fn finish(self) -> Result<FieldLayout, LayoutError> {
        match align_up(self.offset, self.align) {
            Some(size) => Ok(FieldLayout::new(size, self.align)),
            None => Err(LayoutError::SizeOverflow),
        }
    }
}

/// Offsets, size and alignment of a struct with `N` fields.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StructShape<const N: usize> {
    pub offsets: [usize; N],
    pub size: usize,
    pub align: usize,
}

/// Lay out `fields` in declaration order following the C algorithm.
///
/// # Errors
/// - [`LayoutError::AlignNotPowerOfTwo`] for an invalid field alignment.
/// - [`LayoutError::SizeOverflow`] if the struct does not fit the address space.
pub const fn c_struct_layout<const N: usize>(
    fields: &[FieldLayout; N],
) -> Result<StructShape<N>, LayoutError> {
    let mut cursor = Cursor::new();
    let mut offsets = [0usize; N];
    let mut i = 0;
    while i < N {
        offsets[i] = match cursor.place(fields[i]) {
            Ok(offset) => offset,
            Err(e) => return Err(e),
        };
        i += 1;
    }
    match cursor.finish() {
        Ok(total) => Ok(StructShape {
            offsets,
            size: total.size,
            align: total.align,
        }),
        Err(e) => Err(e),
    }
}

/// A struct layout computed at runtime for an arbitrary field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructLayout {
    offsets: Vec<usize>,
    size: usize,
    align: usize,
}

impl StructLayout {
    /// Lay out `fields` in declaration order following the C algorithm.
    ///
    /// An empty field list yields size 0 and alignment 1.
    ///
    /// # Errors
    /// Same as [`c_struct_layout`].
    pub fn compute(fields: &[FieldLayout]) -> Result<Self, LayoutError> {
        let mut cursor = Cursor::new();
        let offsets = fields
            .iter()
            .map(|&f| cursor.place(f))
            .collect::<Result<Vec<_>, _>>()?;
        let total = cursor.finish()?;
        Ok(Self {
            offsets,
            size: total.size,
            align: total.align,
        })
    }

    #[must_use]
    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    #[must_use]
    pub fn offset(&self, field: usize) -> Option<usize> {
        self.offsets.get(field).copied()
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn align(&self) -> usize {
        self.align
    }

    /// The layout of this struct when nested as a field of another.
    #[must_use]
    pub const fn as_field(&self) -> FieldLayout {
        FieldLayout::new(self.size, self.align)
    }
}
