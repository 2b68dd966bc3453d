//! Decode-tree construction, flattening and size minimization.

mod build;
mod flatten;
mod node;
mod size;

pub use build::build_decode_tree;
pub use flatten::{flatten_tree, FlatNode};
pub use node::DecodeNode;
pub use size::{minimize_size_tree, probe_width, SizeProbe, SizeTree};
