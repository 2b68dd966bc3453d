//! Decoder generation on top of [`bitdecode_pattern`].
//!
//! This crate turns a declarative input document (bit patterns plus their
//! record types, extraction operations and helper functions) into the
//! emission context a code generator renders from: the flattened decode
//! tree, the minimized size tree for mixed-width instruction sets, the
//! associated repositories and the action transpiler. Rendering itself
//! happens behind the [`emit::TemplateEngine`] collaborator; output flows
//! through the [`emit::Printer`] collaborator line by line.

#![warn(missing_docs)]

pub mod action;
pub mod emit;
pub mod generate;
pub mod input;
pub mod ops;
pub mod structs;
pub mod tree_print;

mod error;

pub use error::Error;
pub use generate::{generate_code, show_decode_tree, show_size_tree, DecoderModel};
pub use input::InputDoc;
