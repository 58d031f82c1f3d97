pub mod tree_ops;
