pub mod query;
pub mod tree;

pub use query::{encode, render, Argument, Comparison, Node, Operator};
pub use tree::{load_tree, parse_tree, TreeError};
