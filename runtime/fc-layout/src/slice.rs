//! # Slices
//!
//! A slice is a non-owning `{ data, len }` pair:
//!
//! ```text
//!  FcSlice<T>                    backing storage (owned elsewhere)
//! ┌──────────────┬────────────┐  ┌────┬────┬────┬────┬────┐
//! │ data: *mut T │ len: usize │  │ e0 │ e1 │ e2 │ e3 │ e4 │
//! └──────┬───────┴────────────┘  └────┴────┴────┴────┴────┘
//!  0     │       ptr width         ▲
//!        └─────────────────────────┘
//! ```
//!
//! `len` counts elements, not bytes. The slice carries no bounds-check logic;
//! generated code checks the index before each access. A slice dangles as soon
//! as its backing storage is released, and nothing detects that.

use crate::{
    CLayout, FieldDesc, FieldLayout, LayoutError, Scalar, TargetAbi, TypeShape, c_struct_layout,
};
use core::fmt;
use core::mem::offset_of;
use core::ptr::{self, NonNull};

/// The C representation of a FastC slice: `struct { T* data; size_t len; }`.
#[repr(C)]
pub struct FcSlice<T> {
    data: *mut T,
    len: usize,
}

// Size guards: pointer first, length second, nothing else.
const _: () = {
    assert!(offset_of!(FcSlice<u8>, data) == 0);
    assert!(offset_of!(FcSlice<u8>, len) == size_of::<*mut u8>());
    assert!(size_of::<FcSlice<u8>>() == size_of::<*mut u8>() + size_of::<usize>());
    assert!(size_of::<FcSlice<u64>>() == size_of::<FcSlice<u8>>());
    assert!(offset_of!(FcSlice<f64>, len) == offset_of!(FcSlice<u8>, len));
};

impl<T> FcSlice<T> {
    /// View `len` elements starting at `data`.
    ///
    /// Construction is always safe; every access is not.
    #[inline]
    #[must_use]
    pub const fn from_raw_parts(data: *mut T, len: usize) -> Self {
        Self { data, len }
    }

    /// A zero-length slice with a dangling, well-aligned pointer.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self::from_raw_parts(NonNull::dangling().as_ptr(), 0)
    }

    /// View the elements of a Rust slice. The view does not borrow it.
    #[inline]
    #[must_use]
    pub const fn from_mut(elements: &mut [T]) -> Self {
        Self::from_raw_parts(elements.as_mut_ptr(), elements.len())
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *const T {
        self.data.cast_const()
    }

    #[inline]
    #[must_use]
    pub const fn as_mut_ptr(&self) -> *mut T {
        self.data
    }

    /// Read element `index`.
    ///
    /// # Safety
    /// - `index < self.len()`; the caller has already bounds-checked.
    /// - The backing storage is live and holds an initialized `T` there.
    #[inline]
    #[must_use]
    pub unsafe fn read(&self, index: usize) -> T
    where
        T: Copy,
    {
        unsafe { ptr::read(self.data.add(index)) }
    }

    /// Overwrite element `index` with `value`.
    ///
    /// # Safety
    /// - `index < self.len()`; the caller has already bounds-checked.
    /// - The backing storage is live, writable and not aliased by a Rust reference.
    #[inline]
    pub unsafe fn write(&self, index: usize, value: T)
    where
        T: Copy,
    {
        unsafe { ptr::write(self.data.add(index), value) }
    }

    /// Reborrow the view as a Rust slice.
    ///
    /// # Safety
    /// The backing storage must be live and initialized for `'a`, and not
    /// mutated through another path while the borrow exists.
    #[inline]
    #[must_use]
    pub unsafe fn as_slice<'a>(&self) -> &'a [T] {
        if self.len == 0 {
            return &[];
        }
        unsafe { core::slice::from_raw_parts(self.data, self.len) }
    }
}

impl<T> Clone for FcSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for FcSlice<T> {}

impl<T> fmt::Debug for FcSlice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FcSlice")
            .field("data", &self.data)
            .field("len", &self.len)
            .finish()
    }
}

/// Offsets and size of the slice pair on some target.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SliceLayout {
    pub data_offset: usize,
    pub len_offset: usize,
    pub size: usize,
    pub align: usize,
}

impl SliceLayout {
    /// The slice layout on the compiling target.
    pub const HOST: Self = Self {
        data_offset: offset_of!(FcSlice<u8>, data),
        len_offset: offset_of!(FcSlice<u8>, len),
        size: size_of::<FcSlice<u8>>(),
        align: align_of::<FcSlice<u8>>(),
    };

    /// Derive the slice layout for `target` from the struct algorithm.
    ///
    /// # Errors
    /// Only for a malformed [`TargetAbi`] (non-power-of-two widths).
    pub const fn for_target(target: &TargetAbi) -> Result<Self, LayoutError> {
        let fields = [
            FieldLayout::scalar(Scalar::Ptr, target),
            FieldLayout::scalar(Scalar::Usize, target),
        ];
        match c_struct_layout(&fields) {
            Ok(shape) => Ok(Self {
                data_offset: shape.offsets[0],
                len_offset: shape.offsets[1],
                size: shape.size,
                align: shape.align,
            }),
            Err(e) => Err(e),
        }
    }
}

/// Element types with a predefined `fc_slice_<T>` typedef in the runtime header.
pub trait SliceElement: Copy {
    const SCALAR: Scalar;
    /// Name of the C typedef, e.g. `fc_slice_int32_t`.
    const SLICE_C_NAME: &'static str;
}

macro_rules! slice_elements {
    ($($ty:ty => $scalar:ident, $name:literal;)*) => {
        $(
            impl SliceElement for $ty {
                const SCALAR: Scalar = Scalar::$scalar;
                const SLICE_C_NAME: &'static str = $name;
            }
        )*

        /// Scalars with a predefined slice typedef, in header order.
        pub const SLICE_ELEMENTS: &[Scalar] = &[$(Scalar::$scalar),*];

        /// The C typedef name of a slice over `elem`, if the runtime header
        /// predefines one.
        #[must_use]
        pub const fn slice_c_name(elem: Scalar) -> Option<&'static str> {
            match elem {
                $(Scalar::$scalar => Some($name),)*
                _ => None,
            }
        }
    };
}

slice_elements! {
    u8 => U8, "fc_slice_uint8_t";
    i8 => I8, "fc_slice_int8_t";
    u16 => U16, "fc_slice_uint16_t";
    i16 => I16, "fc_slice_int16_t";
    u32 => U32, "fc_slice_uint32_t";
    i32 => I32, "fc_slice_int32_t";
    u64 => U64, "fc_slice_uint64_t";
    i64 => I64, "fc_slice_int64_t";
    f32 => F32, "fc_slice_float";
    f64 => F64, "fc_slice_double";
}

// SAFETY: `FcSlice` is `repr(C)` and its layout is pinned by the const block above.
unsafe impl<T: SliceElement> CLayout for FcSlice<T> {
    const C_NAME: &'static str = T::SLICE_C_NAME;
    const SHAPE: TypeShape = TypeShape::Struct {
        fields: &[
            FieldDesc {
                name: "data",
                offset: SliceLayout::HOST.data_offset,
                layout: FieldLayout::of::<*mut u8>(),
            },
            FieldDesc {
                name: "len",
                offset: SliceLayout::HOST.len_offset,
                layout: FieldLayout::of::<usize>(),
            },
        ],
        size: SliceLayout::HOST.size,
        align: SliceLayout::HOST.align,
    };
}
