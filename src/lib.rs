//! della: a hierarchical task tree kept in a plain TOML file.
//!
//! - [`model`]: the arena-backed [`model::TaskTree`] and its nodes
//! - [`ops`]: validated tree mutations
//! - [`parse`]: the nested document form and its TOML codec
//! - [`io`]: loading, saving, config discovery and the recovery log
//! - [`session`]: the loaded tree plus the current node
//! - [`complete`]: path completion for interactive front-ends

pub mod cli;
pub mod complete;
pub mod io;
pub mod logging;
pub mod model;
pub mod ops;
pub mod parse;
pub mod session;
