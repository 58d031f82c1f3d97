pub mod config;
pub mod task;
pub mod tree;

pub use config::*;
pub use task::*;
pub use tree::*;
