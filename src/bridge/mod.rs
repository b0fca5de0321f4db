//! Transport between the host debugger shim and the session.
//!
//! The shim forwards user commands as `command` requests and breakpoint
//! stops as `stopped` events; the session answers commands and drives the
//! host with its own requests (see [`BridgeServer`]).

mod protocol;
mod server;

pub use protocol::{BridgeMessage, MessageContent};
pub use server::BridgeServer;

use crate::debugger::{BreakpointId, CommandOutcome, DebugSession};
use log::{debug, error, info, warn};
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

/// Serve the host until it disconnects or closes the stream.
pub fn run_bridge<R: BufRead, W: Write>(
    server: &mut BridgeServer<R, W>,
    session: &mut DebugSession,
) -> io::Result<()> {
    info!("bridge ready");

    while let Some(msg) = server.next_incoming()? {
        match msg.content {
            MessageContent::Request { command, arguments } => match command.as_str() {
                "command" => {
                    let line = arguments
                        .as_ref()
                        .and_then(|v| v.get("line"))
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_string();
                    handle_user_command(server, session, msg.seq, command, &line)?;
                }
                "disconnect" => {
                    server.send_response(msg.seq, command, true, None, None)?;
                    break;
                }
                _ => {
                    warn!("unhandled request `{}`", command);
                    let message = format!("unsupported request `{}`", command);
                    server.send_response(msg.seq, command, false, Some(message), None)?;
                }
            },
            MessageContent::Event { event, body } if event == "stopped" => {
                let ids = stopped_ids(body.as_ref());
                match session.handle_stop(server, &ids) {
                    Ok(report) => {
                        debug!("stop {:?}: {:?}", ids, report);
                        server.send_event(
                            "stopHandled",
                            Some(json!({
                                "consumed": report.consumed,
                                "total": report.total,
                                "failed": report.failed,
                                "userVisible": report.user_visible(),
                            })),
                        )?;
                    }
                    Err(e) => error!("while handling stop {:?}: {}", ids, e),
                }
            }
            MessageContent::Event { event, .. } => {
                debug!("ignoring event `{}`", event);
            }
            MessageContent::Response { request_seq, .. } => {
                warn!("unexpected response to request {}", request_seq);
            }
        }
    }

    info!("bridge closed");
    Ok(())
}

fn stopped_ids(body: Option<&Value>) -> Vec<BreakpointId> {
    body.and_then(|v| v.get("breakpoints"))
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

fn handle_user_command<R: BufRead, W: Write>(
    server: &mut BridgeServer<R, W>,
    session: &mut DebugSession,
    seq: u64,
    command: String,
    line: &str,
) -> io::Result<()> {
    match session.execute(server, line) {
        Ok(outcome) => {
            let body = match outcome {
                CommandOutcome::Initialized { functions } => json!({ "functions": functions }),
                CommandOutcome::Forwarded(forwarded) => json!({ "forwarded": forwarded }),
                CommandOutcome::Info(lines) => json!({ "lines": lines }),
                CommandOutcome::Ignored => json!({ "ignored": true }),
            };
            server.send_response(seq, command, true, None, Some(body))
        }
        Err(e) => {
            warn!("command `{}` failed: {}", line, e);
            server.send_response(seq, command, false, Some(e.to_string()), None)
        }
    }
}
