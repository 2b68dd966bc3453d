//! Bit-pattern algebra and decode-tree construction.
//!
//! A [`BitPattern`] describes a fixed-width instruction encoding in which
//! every bit is either specified (`0`/`1`) or a wildcard. Sets of patterns
//! are partitioned by their shared fixed bits into a hierarchical
//! [`tree::DecodeNode`] dispatch tree, which a code generator walks to emit
//! ordered match probes. For mixed-width instruction sets the tree can be
//! minimized into a size tree whose leaves carry only instruction lengths,
//! so a decoder can learn how many bytes to fetch before decoding in full.

#![warn(missing_docs)]

pub mod bits;
pub mod group;
pub mod pattern;
pub mod tree;
pub mod uid;

mod error;

pub use error::Error;
pub use pattern::BitPattern;
pub use uid::{DataUid, Uid};

/// Backing word for pattern masks and fixed bits.
pub type Word = u128;

/// Widest supported pattern, in bits.
pub const MAX_WIDTH: u32 = Word::BITS;
