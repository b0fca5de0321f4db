mod breakpoints;
mod host;
mod session;
mod stepping;

pub use breakpoints::{BreakpointId, BreakpointKind, BreakpointRegistry, InternalStop};
pub use host::{parse_function_list, HostDebugger, HostError};
pub use session::{CommandOutcome, DebugSession, SessionError, StopReport};
pub use stepping::ExecutionMode;

/// Variables written since a function invocation was entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    /// Low-level names, in the order their first write was observed.
    pub written: Vec<String>,
    /// Watchpoints installed for this frame that have not fired yet.
    pub watchpoints: Vec<BreakpointId>,
    pub return_breakpoint: Option<BreakpointId>,
}

impl Frame {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            written: Vec::new(),
            watchpoints: Vec::new(),
            return_breakpoint: None,
        }
    }
}
