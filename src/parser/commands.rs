/// Execution-control commands forwarded verbatim to the debugger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Run,
    Continue,
    Step,
    Stop,
}

impl ControlCommand {
    pub fn literal(self) -> &'static str {
        match self {
            ControlCommand::Run => "run",
            ControlCommand::Continue => "continue",
            ControlCommand::Step => "step",
            ControlCommand::Stop => "stop",
        }
    }

    fn from_word(word: &str) -> Option<Self> {
        match word {
            "run" => Some(ControlCommand::Run),
            "continue" => Some(ControlCommand::Continue),
            "step" => Some(ControlCommand::Step),
            "stop" => Some(ControlCommand::Stop),
            _ => None,
        }
    }
}

/// Topics of the `info` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoTopic {
    Functions,
    Frames,
    Variables,
}

/// A line typed by the user, as the session understands it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Install entry breakpoints on every known function.
    Init,
    Control(ControlCommand),
    Info(InfoTopic),
    /// A debugger command containing query blocks.
    Query(String),
    Unknown(String),
}

/// Classify a user command line. `opener` is the sentinel plus `(`.
pub fn parse_command(input: &str, opener: &str) -> SessionCommand {
    let input = input.trim();

    if input.contains(opener) {
        return SessionCommand::Query(input.to_string());
    }

    if let Some(control) = ControlCommand::from_word(input) {
        return SessionCommand::Control(control);
    }

    if input == "init" {
        return SessionCommand::Init;
    }

    let words: Vec<String> = shlex::Shlex::new(input).collect();
    if let [command, topic] = words.as_slice() {
        let topic = match topic.as_str() {
            "functions" => Some(InfoTopic::Functions),
            "frames" => Some(InfoTopic::Frames),
            "variables" => Some(InfoTopic::Variables),
            _ => None,
        };
        if let Some(topic) = topic.filter(|_| command == "info") {
            return SessionCommand::Info(topic);
        }
    }

    SessionCommand::Unknown(input.to_string())
}
