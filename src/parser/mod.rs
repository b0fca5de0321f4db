mod commands;
mod query;

pub use commands::{parse_command, ControlCommand, InfoTopic, SessionCommand};
pub use query::{extract_blocks, substitute, translate_command, Query, QueryBlock, QueryError};
