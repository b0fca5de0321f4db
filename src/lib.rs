//! Debugging support for SaC programs under a C-level debugger.
//!
//! Translates SaC identifiers in debugger commands into the mangled,
//! SSA-renamed C symbols the binary exposes, and tracks which variables
//! each active function has written so far.

pub mod bridge;
pub mod config;
pub mod debugger;
pub mod parser;
pub mod symbols;
