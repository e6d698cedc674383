use core::fmt;
use fc_layout::CLayout;

/// The safety invariant a fault reports as violated.
///
/// Purely diagnostic: it picks the message, nothing else. Crosses the C ABI
/// as a plain `int` (`fc_fault_kind`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, CLayout)]
#[repr(C)]
#[clayout(c_name = "fc_fault_kind")]
pub enum FaultKind {
    /// A bare `fc_trap()` with no further detail.
    Unspecified,
    BoundsCheck,
    NullPointer,
    Overflow,
    DivisionByZero,
    /// A value outside its type's domain, e.g. an enum integer with no variant.
    InvalidValue,
    OutOfMemory,
    Unreachable,
}

impl FaultKind {
    pub const ALL: [Self; Self::VARIANT_COUNT] = [
        Self::Unspecified,
        Self::BoundsCheck,
        Self::NullPointer,
        Self::Overflow,
        Self::DivisionByZero,
        Self::InvalidValue,
        Self::OutOfMemory,
        Self::Unreachable,
    ];

    /// Name of the matching enumerator in the runtime header.
    #[must_use]
    pub const fn c_constant(self) -> &'static str {
        match self {
            Self::Unspecified => "FC_FAULT_UNSPECIFIED",
            Self::BoundsCheck => "FC_FAULT_BOUNDS_CHECK",
            Self::NullPointer => "FC_FAULT_NULL_POINTER",
            Self::Overflow => "FC_FAULT_OVERFLOW",
            Self::DivisionByZero => "FC_FAULT_DIVISION_BY_ZERO",
            Self::InvalidValue => "FC_FAULT_INVALID_VALUE",
            Self::OutOfMemory => "FC_FAULT_OUT_OF_MEMORY",
            Self::Unreachable => "FC_FAULT_UNREACHABLE",
        }
    }

    /// Map a C integer back to a kind; unknown values become `Unspecified`.
    #[must_use]
    pub const fn from_c(value: i32) -> Self {
        match Self::from_discriminant(value) {
            Some(kind) => kind,
            None => Self::Unspecified,
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Unspecified => "trap",
            Self::BoundsCheck => "index out of bounds",
            Self::NullPointer => "null pointer dereference",
            Self::Overflow => "arithmetic overflow",
            Self::DivisionByZero => "division by zero",
            Self::InvalidValue => "invalid value",
            Self::OutOfMemory => "out of memory",
            Self::Unreachable => "entered unreachable code",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fc_layout::TypeShape;

    #[test]
    fn all_is_in_discriminant_order() {
        for (k, kind) in FaultKind::ALL.iter().enumerate() {
            assert_eq!(usize::try_from(kind.discriminant()).unwrap(), k);
        }
    }

    #[test]
    fn c_round_trip() {
        for kind in FaultKind::ALL {
            assert_eq!(FaultKind::from_c(kind.discriminant()), kind);
            assert!(kind.c_constant().starts_with("FC_FAULT_"));
        }
        assert_eq!(FaultKind::from_c(-1), FaultKind::Unspecified);
        assert_eq!(FaultKind::from_c(99), FaultKind::Unspecified);
    }

    #[test]
    fn c_shape() {
        assert_eq!(FaultKind::C_NAME, "fc_fault_kind");
        assert_eq!(size_of::<FaultKind>(), 4);
        let TypeShape::Enum { variants } = FaultKind::SHAPE else {
            panic!("fault kind must be an enum shape");
        };
        assert_eq!(variants.len(), 8);
        assert_eq!(variants[1], "BoundsCheck");
    }
}
