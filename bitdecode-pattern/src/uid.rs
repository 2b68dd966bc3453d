//! Opaque identity tokens for patterns.

use derive_more::Display;

/// Identity token for an input pattern.
///
/// Minted once per pattern at ingest, in insertion order, as an index into
/// the caller's pattern arena. The decode tree refers to patterns through
/// their token so transformed leaves (masked, shifted) stay linked to the
/// original definition. Tokens are only ever compared for equality.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display(fmt = "u{}", _0)]
#[repr(transparent)]
pub struct Uid(usize);

impl Uid {
    /// Token for the arena slot `index`.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The arena slot this token refers to.
    pub const fn index(&self) -> usize {
        self.0
    }
}

/// Identity token for a size-tree leaf.
///
/// Unlike [`Uid`], a `DataUid` stands for the data a leaf resolves to
/// rather than for one pattern: every pattern of the same bit length maps
/// to the same token, which is what lets the size tree collapse.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display(fmt = "s{}", _0)]
#[repr(transparent)]
pub struct DataUid(usize);

impl DataUid {
    /// Token for the length-table slot `index`.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The length-table slot this token refers to.
    pub const fn index(&self) -> usize {
        self.0
    }
}
