use super::breakpoints::{BreakpointId, BreakpointKind, BreakpointRegistry, InternalStop};
use super::host::{parse_function_list, HostDebugger, HostError};
use super::stepping::ExecutionMode;
use super::Frame;
use crate::config::{Config, NamingScheme, SessionOptions};
use crate::parser::{
    extract_blocks, parse_command, substitute, ControlCommand, InfoTopic, QueryError,
    SessionCommand,
};
use crate::symbols::{demangle_function, demangle_variable, extract_locals, resolve_variable};
use log::{debug, error, info, warn};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    /// A return breakpoint fired with no frame to pop: entry and return
    /// breakpoints are out of step with the target's control flow.
    #[error("return from {function} with an empty frame stack")]
    FrameUnderflow { function: String },

    #[error("write to {variable} with an empty frame stack")]
    NoActiveFrame { variable: String },

    #[error("error in query block: {0}")]
    Query(#[from] QueryError),

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Result of a user command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Entry breakpoints were installed on this many functions.
    Initialized { functions: usize },
    /// This command was handed to the debugger.
    Forwarded(String),
    Info(Vec<String>),
    /// Not a session command; nothing was forwarded.
    Ignored,
}

/// How a stop-event batch was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopReport {
    /// Ids in the batch that were internal breakpoints.
    pub consumed: usize,
    pub total: usize,
    /// Internal ids whose handling failed; they count as user-visible.
    pub failed: Vec<BreakpointId>,
    /// Commands issued to resume past the internal breakpoints.
    pub follow_up: Vec<String>,
}

impl StopReport {
    /// Whether the stop belongs to the user (some id was not internal).
    pub fn user_visible(&self) -> bool {
        self.consumed < self.total
    }
}

/// Session state: frame stack, internal breakpoints, execution mode.
#[derive(Debug)]
pub struct DebugSession {
    scheme: NamingScheme,
    options: SessionOptions,
    frames: Vec<Frame>,
    registry: BreakpointRegistry,
    mode: ExecutionMode,
}

impl Default for DebugSession {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl DebugSession {
    pub fn new(config: &Config) -> Self {
        Self {
            scheme: config.naming.clone(),
            options: config.session.clone(),
            frames: Vec::new(),
            registry: BreakpointRegistry::new(),
            mode: ExecutionMode::Stopped,
        }
    }

    pub fn scheme(&self) -> &NamingScheme {
        &self.scheme
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn registry(&self) -> &BreakpointRegistry {
        &self.registry
    }

    /// Handle one line typed by the user.
    pub fn execute(
        &mut self,
        host: &mut dyn HostDebugger,
        line: &str,
    ) -> Result<CommandOutcome, SessionError> {
        match parse_command(line, &self.scheme.block_opener()) {
            SessionCommand::Init => {
                let functions = self.initialize(host)?;
                Ok(CommandOutcome::Initialized { functions })
            }
            SessionCommand::Control(command) => {
                self.control(host, command)?;
                Ok(CommandOutcome::Forwarded(command.literal().to_string()))
            }
            SessionCommand::Info(topic) => Ok(CommandOutcome::Info(self.info(host, topic)?)),
            SessionCommand::Query(text) => {
                let command = self.translate(host, &text)?;
                host.issue_command(&command)?;
                Ok(CommandOutcome::Forwarded(command))
            }
            SessionCommand::Unknown(text) => {
                warn!("ignoring unrecognized command `{}`", text);
                Ok(CommandOutcome::Ignored)
            }
        }
    }

    /// Reset the session and put an entry breakpoint on every known
    /// function. Returns how many were installed.
    pub fn initialize(&mut self, host: &mut dyn HostDebugger) -> Result<usize, SessionError> {
        self.reset(host);

        if self.options.disable_hw_watchpoints {
            host.issue_command("set can-use-hw-watchpoints 0")?;
        }

        let listing = host.list_known_functions()?;
        let functions = parse_function_list(&self.scheme, &listing);

        for function in &functions {
            let id = host.create_function_entry_breakpoint(function)?;
            self.registry.add(BreakpointKind::Entry, id, function.as_str());
            debug!("entry breakpoint {} on {}", id, function);
        }

        info!("installed {} function entry breakpoints", functions.len());
        Ok(functions.len())
    }

    /// Drop all frames and internal breakpoints.
    fn reset(&mut self, host: &mut dyn HostDebugger) {
        for id in self.registry.clear() {
            discard_breakpoint(host, id);
        }
        self.frames.clear();
        self.mode = ExecutionMode::Stopped;
    }

    /// Forward an execution-control command and record the new mode.
    pub fn control(
        &mut self,
        host: &mut dyn HostDebugger,
        command: ControlCommand,
    ) -> Result<(), SessionError> {
        self.mode = ExecutionMode::for_command(command);
        debug!("mode is now {:?}", self.mode);
        host.issue_command(command.literal())?;
        Ok(())
    }

    /// Substitute every query block of `text`. Session state is untouched.
    pub fn translate(
        &self,
        host: &mut dyn HostDebugger,
        text: &str,
    ) -> Result<String, SessionError> {
        let blocks = extract_blocks(text, &self.scheme.block_opener())?;
        if blocks.is_empty() {
            return Ok(text.to_string());
        }

        let dump = host.read_locals_dump()?;
        let locals = extract_locals(&self.scheme, &dump);
        Ok(substitute(&self.scheme, text, &blocks, &locals)?)
    }

    pub fn info(
        &self,
        host: &mut dyn HostDebugger,
        topic: InfoTopic,
    ) -> Result<Vec<String>, SessionError> {
        let lines = match topic {
            InfoTopic::Functions => self
                .registry
                .iter(BreakpointKind::Entry)
                .map(|(id, name)| match demangle_function(&self.scheme, name) {
                    Some(signature) => format!("{:>4}  {}  {}", id, name, signature),
                    None => format!("{:>4}  {}", id, name),
                })
                .collect(),
            InfoTopic::Frames => self
                .frames
                .iter()
                .enumerate()
                .map(|(depth, frame)| {
                    format!("#{} {} [{}]", depth, frame.function, frame.written.join(", "))
                })
                .collect(),
            InfoTopic::Variables => {
                let dump = host.read_locals_dump()?;
                let locals = extract_locals(&self.scheme, &dump);
                let mut shown: Vec<String> = Vec::new();
                let mut lines = Vec::new();
                for local in &locals {
                    let Some(short) = demangle_variable(&self.scheme, &local.name) else {
                        continue;
                    };
                    if shown.contains(&short) {
                        continue;
                    }
                    if let Some(live) = resolve_variable(&short, &locals) {
                        lines.push(format!("{} -> {}", short, live));
                    }
                    shown.push(short);
                }
                lines
            }
        };
        Ok(lines)
    }

    /// Process one batch of fired breakpoint ids, in the order given.
    ///
    /// Every id is attempted. One whose handling fails is logged, left out
    /// of `consumed` and listed in `failed`, which makes the stop visible to
    /// the user. Only a batch consumed entirely resumes execution according
    /// to the current mode.
    pub fn handle_stop(
        &mut self,
        host: &mut dyn HostDebugger,
        ids: &[BreakpointId],
    ) -> Result<StopReport, SessionError> {
        let mut consumed = 0;
        let mut failed = Vec::new();

        for &id in ids {
            let Some(stop) = self.registry.classify(id) else {
                debug!("breakpoint {} is not internal", id);
                continue;
            };

            let handled = match stop {
                InternalStop::FunctionEntry(function) => self.enter_function(host, &function),
                InternalStop::VariableWrite(variable) => self.record_write(id, variable),
                InternalStop::FunctionReturn(function) => self.leave_function(host, id, &function),
            };
            match handled {
                Ok(()) => consumed += 1,
                Err(e) => {
                    error!("internal breakpoint {}: {}", id, e);
                    failed.push(id);
                }
            }
        }

        let follow_up = if consumed > 0 && consumed == ids.len() {
            self.mode.follow_up(consumed)
        } else {
            Vec::new()
        };
        for command in &follow_up {
            host.issue_command(command)?;
        }

        Ok(StopReport {
            consumed,
            total: ids.len(),
            failed,
            follow_up,
        })
    }

    /// Install the watchpoints and return breakpoint of a new invocation,
    /// then push its frame. Nothing is kept if any host call fails.
    fn enter_function(
        &mut self,
        host: &mut dyn HostDebugger,
        function: &str,
    ) -> Result<(), SessionError> {
        let mut watched = Vec::new();
        let installed = Self::install_frame_breakpoints(
            &self.scheme,
            host,
            function,
            &mut watched,
        );

        let return_id = match installed {
            Ok(id) => id,
            Err(e) => {
                for (id, _) in &watched {
                    discard_breakpoint(host, *id);
                }
                return Err(e);
            }
        };

        let mut frame = Frame::new(function);
        for (id, name) in watched {
            self.registry.add(BreakpointKind::Watch, id, name);
            frame.watchpoints.push(id);
        }
        self.registry.add(BreakpointKind::Return, return_id, function);
        frame.return_breakpoint = Some(return_id);

        self.frames.push(frame);
        debug!("entered {} (depth {})", function, self.frames.len());
        Ok(())
    }

    /// Watchpoints go into `watched` as they are created so a caller can
    /// undo them when a later call fails.
    fn install_frame_breakpoints(
        scheme: &NamingScheme,
        host: &mut dyn HostDebugger,
        function: &str,
        watched: &mut Vec<(BreakpointId, String)>,
    ) -> Result<BreakpointId, SessionError> {
        let dump = host.read_locals_dump()?;
        for local in extract_locals(scheme, &dump) {
            let id = host.create_write_watchpoint(&local.name)?;
            watched.push((id, local.name));
        }
        Ok(host.create_return_breakpoint(function)?)
    }

    fn record_write(&mut self, id: BreakpointId, variable: String) -> Result<(), SessionError> {
        if self.frames.is_empty() {
            error!("watchpoint {} on {} fired with no active frame", id, variable);
            return Err(SessionError::NoActiveFrame { variable });
        }

        self.registry.remove(BreakpointKind::Watch, id);
        for frame in &mut self.frames {
            frame.watchpoints.retain(|&w| w != id);
        }

        if let Some(frame) = self.frames.last_mut() {
            debug!("{} written in {}", variable, frame.function);
            frame.written.push(variable);
        }
        Ok(())
    }

    /// Pop the innermost frame on return from `function`. An empty stack
    /// means entry and return breakpoints have fallen out of step.
    pub fn pop_frame(&mut self, function: &str) -> Result<Frame, SessionError> {
        self.frames.pop().ok_or_else(|| {
            error!("return from {} with an empty frame stack", function);
            SessionError::FrameUnderflow {
                function: function.to_string(),
            }
        })
    }

    /// Pop the frame and drop its unfired watchpoints. Registry entries go
    /// with the frame even when the host fails to delete them.
    fn leave_function(
        &mut self,
        host: &mut dyn HostDebugger,
        id: BreakpointId,
        function: &str,
    ) -> Result<(), SessionError> {
        self.registry.remove(BreakpointKind::Return, id);
        let frame = self.pop_frame(function)?;

        if frame.function != function {
            warn!(
                "return from {} popped the frame of {}",
                function, frame.function
            );
        }

        for &watchpoint in &frame.watchpoints {
            if self
                .registry
                .remove(BreakpointKind::Watch, watchpoint)
                .is_some()
            {
                discard_breakpoint(host, watchpoint);
            }
        }

        debug!("left {} (depth {})", function, self.frames.len());
        Ok(())
    }
}

/// Best-effort host delete. The id may already be gone on the host side.
fn discard_breakpoint(host: &mut dyn HostDebugger, id: BreakpointId) {
    if let Err(e) = host.delete_breakpoint(id) {
        warn!("could not delete breakpoint {}: {}", id, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_report_visibility() {
        let internal = StopReport {
            consumed: 2,
            total: 2,
            failed: Vec::new(),
            follow_up: vec!["continue 1".into()],
        };
        assert!(!internal.user_visible());

        let mixed = StopReport {
            consumed: 1,
            total: 2,
            failed: vec![7],
            follow_up: Vec::new(),
        };
        assert!(mixed.user_visible());
    }
}
