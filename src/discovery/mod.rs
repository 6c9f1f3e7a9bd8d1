mod tree;

pub use tree::*;

#[cfg(test)]
mod tree_test;
