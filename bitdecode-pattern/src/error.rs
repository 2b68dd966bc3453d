use crate::Word;

use thiserror::Error;

/// Pattern algebra and tree construction error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// An empty string was given where a bit pattern was expected.
    #[error("empty pattern strings are not allowed")]
    EmptyPattern,

    /// A pattern string contained a character outside `0 1 x X . o O`.
    #[error("illegal character `{0}` in bit pattern")]
    IllegalBitChar(char),

    /// Two patterns of different widths were combined or compared.
    #[error("bit patterns must match in length ({0} vs {1})")]
    LengthMismatch(u32, u32),

    /// A split mask selected bits outside the pattern's fixed mask.
    #[error("mask {mask:#x} is not contained in the fixed mask {fixed_mask:#x}")]
    MaskNotContained {
        /// The mask passed to the split.
        mask: Word,
        /// The pattern's own fixed mask.
        fixed_mask: Word,
    },

    /// Two patterns specified the same bit with different values.
    #[error("conflicting patterns cannot be combined")]
    ConflictingPatterns,

    /// A pattern did not fit the requested width.
    #[error("pattern of width {width} does not fit in {max} bits")]
    WidthOverflow {
        /// Width of the offending pattern.
        width: u32,
        /// Largest width that would have been accepted.
        max: u32,
    },

    /// The size probe would have to read past the shortest instruction.
    #[error("size probe needs {probe_bits} bits but the narrowest pattern has {narrowest_bits}")]
    SizeProbeOverflow {
        /// Bits the probe must inspect, rounded up to whole bytes.
        probe_bits: u32,
        /// Width of the narrowest input pattern.
        narrowest_bits: u32,
    },

    /// An operation that needs at least one pattern received none.
    #[error("pattern sets must not be empty")]
    EmptyPatternSet,
}
