//! The host debugger as seen by the session.
//!
//! The session never touches the target process itself. Everything it needs
//! (locals, the function list, breakpoint management, running commands) goes
//! through [`HostDebugger`], which the bridge implements over the wire and
//! tests implement in memory.

use super::BreakpointId;
use crate::config::NamingScheme;
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    /// The debugger refused a request; the message is its own.
    #[error("{0}")]
    Rejected(String),

    #[error("I/O error talking to the debugger: {0}")]
    Io(#[from] io::Error),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("debugger disconnected")]
    Disconnected,
}

pub trait HostDebugger {
    /// `info locals` style text, one variable per line, name first.
    fn read_locals_dump(&mut self) -> Result<String, HostError>;

    /// `info functions` style text.
    fn list_known_functions(&mut self) -> Result<String, HostError>;

    fn create_function_entry_breakpoint(&mut self, function: &str)
        -> Result<BreakpointId, HostError>;

    fn create_return_breakpoint(&mut self, function: &str) -> Result<BreakpointId, HostError>;

    /// One-shot watchpoint on the next write to `variable`.
    fn create_write_watchpoint(&mut self, variable: &str) -> Result<BreakpointId, HostError>;

    fn delete_breakpoint(&mut self, id: BreakpointId) -> Result<(), HostError>;

    fn issue_command(&mut self, command: &str) -> Result<(), HostError>;
}

/// Mangled function names from a function listing, first occurrence order.
///
/// The name is read between the first space and the first `(` of a line,
/// e.g. `12:\tint SACf__MAIN__main(void);`. Storage qualifiers and pointer
/// stars in front of it are dropped.
pub fn parse_function_list(scheme: &NamingScheme, listing: &str) -> Vec<String> {
    let marker = scheme.function_marker();
    let mut seen = HashSet::new();
    let mut functions = Vec::new();

    for line in listing.lines().filter(|line| line.contains(&marker)) {
        let (Some(space), Some(paren)) = (line.find(' '), line.find('(')) else {
            continue;
        };
        if space >= paren {
            continue;
        }

        let Some(name) = line[space..paren].split_whitespace().last() else {
            continue;
        };
        let name = name.trim_start_matches('*');

        if name.starts_with(&marker) && seen.insert(name.to_string()) {
            functions.push(name.to_string());
        }
    }

    functions
}
