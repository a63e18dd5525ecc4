//! Tool catalog and tool implementations
//!
//! Provides the registry the dispatcher resolves `tools/call` against, plus the built-in tools.

pub mod calculator;
pub mod registry;
pub mod tools;
