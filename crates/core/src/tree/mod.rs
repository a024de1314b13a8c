//! Assembly of the renderable result tree.

pub mod assembler;

pub use assembler::{build_file_node, group_into_tree};
