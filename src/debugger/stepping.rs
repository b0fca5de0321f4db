use crate::parser::ControlCommand;

/// Execution mode last requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Stopped,
    Stepping,
    Running,
}

impl ExecutionMode {
    pub fn for_command(command: ControlCommand) -> Self {
        match command {
            ControlCommand::Run | ControlCommand::Continue => ExecutionMode::Running,
            ControlCommand::Step => ExecutionMode::Stepping,
            ControlCommand::Stop => ExecutionMode::Stopped,
        }
    }

    /// Commands that carry execution past `consumed` internal breakpoints
    /// which fired together.
    pub fn follow_up(self, consumed: usize) -> Vec<String> {
        let skip = consumed.saturating_sub(1);
        match self {
            ExecutionMode::Stopped => vec![with_count("continue", skip), "stop".to_string()],
            ExecutionMode::Stepping => vec![with_count("step", skip)],
            ExecutionMode::Running => vec![with_count("continue", skip)],
        }
    }
}

fn with_count(command: &str, count: usize) -> String {
    if count == 0 {
        command.to_string()
    } else {
        format!("{} {}", command, count)
    }
}
