//! Fork-join execution for tree operations.
//!
//! Every parallel operation in the crate takes an explicit [`Executor`]; there
//! is no implicit process-wide pool in the core.

pub mod executor;

pub use executor::Executor;
