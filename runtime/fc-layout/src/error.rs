/// Reasons a layout cannot be computed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("alignment {0} is not a power of two")]
    AlignNotPowerOfTwo(usize),
    #[error("layout size overflows the address space")]
    SizeOverflow,
    #[error("{0} variants do not fit the C int representation")]
    TooManyVariants(usize),
}
