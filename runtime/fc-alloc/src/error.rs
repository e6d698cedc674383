/// Why an allocation request or heap setup was rejected.
///
/// These are caller errors. Running out of memory is not one of them: it is
/// reported by `allocate` returning `None`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocError {
    #[error("alignment {0} is not a power of two")]
    AlignNotPowerOfTwo(usize),
    #[error("alignment {0} exceeds the 32 KiB maximum")]
    AlignTooLarge(usize),
    #[error("size {0} exceeds the largest representable allocation")]
    SizeTooLarge(usize),
    #[error("could not reserve a heap region of {0} bytes")]
    RegionUnavailable(usize),
}
