pub mod ast;
pub mod printer;

pub use ast::{Argument, Comparison, Node, Operator};
pub use printer::{encode, encode_into, render};
