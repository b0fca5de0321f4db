use super::protocol::{BridgeMessage, MessageContent, EVENT, REQUEST, RESPONSE};
use crate::debugger::{BreakpointId, HostDebugger, HostError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

const CONTENT_LENGTH: &str = "Content-Length:";

/// Framed JSON channel to the host debugger shim.
///
/// Requests the session makes of the host block until the matching
/// response arrives; anything else read in the meantime is queued and
/// handed out by [`BridgeServer::next_incoming`] in arrival order.
pub struct BridgeServer<R, W> {
    seq: u64,
    reader: R,
    writer: W,
    backlog: VecDeque<BridgeMessage>,
}

impl<R: BufRead, W: Write> BridgeServer<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            seq: 0,
            reader,
            writer,
            backlog: VecDeque::new(),
        }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    pub fn send_response(
        &mut self,
        request_seq: u64,
        command: String,
        success: bool,
        message: Option<String>,
        body: Option<Value>,
    ) -> io::Result<()> {
        let msg = BridgeMessage {
            seq: self.next_seq(),
            msg_type: RESPONSE.to_string(),
            content: MessageContent::Response {
                request_seq,
                success,
                command,
                message,
                body,
            },
        };
        self.send_message(&msg)
    }

    pub fn send_event(&mut self, event: &str, body: Option<Value>) -> io::Result<()> {
        let msg = BridgeMessage {
            seq: self.next_seq(),
            msg_type: EVENT.to_string(),
            content: MessageContent::Event {
                event: event.to_string(),
                body,
            },
        };
        self.send_message(&msg)
    }

    pub fn send_request(&mut self, command: &str, arguments: Option<Value>) -> io::Result<u64> {
        let seq = self.next_seq();
        let msg = BridgeMessage {
            seq,
            msg_type: REQUEST.to_string(),
            content: MessageContent::Request {
                command: command.to_string(),
                arguments,
            },
        };
        self.send_message(&msg)?;
        Ok(seq)
    }

    fn send_message(&mut self, msg: &BridgeMessage) -> io::Result<()> {
        let json = serde_json::to_string(msg)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        write!(self.writer, "{} {}\r\n\r\n{}", CONTENT_LENGTH, json.len(), json)?;
        self.writer.flush()?;
        log::trace!("sent {}", json);
        Ok(())
    }

    /// Read one framed message. `Ok(None)` on a clean end of stream.
    pub fn read_message(&mut self) -> io::Result<Option<BridgeMessage>> {
        let mut content_length = None;
        let mut line = String::new();

        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                return if content_length.is_none() {
                    Ok(None)
                } else {
                    Err(io::ErrorKind::UnexpectedEof.into())
                };
            }

            let header = line.trim_end();
            if header.is_empty() {
                if content_length.is_some() {
                    break;
                }
                continue;
            }
            if let Some(value) = header.strip_prefix(CONTENT_LENGTH) {
                let length = value.trim().parse::<usize>().map_err(|e| {
                    io::Error::new(io::ErrorKind::InvalidData, format!("bad length: {}", e))
                })?;
                content_length = Some(length);
            }
        }

        let mut buffer = vec![0u8; content_length.unwrap_or(0)];
        self.reader.read_exact(&mut buffer)?;
        let msg: BridgeMessage = serde_json::from_slice(&buffer)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        log::trace!("received {:?}", msg);
        Ok(Some(msg))
    }

    /// Next message to act on: queued ones first, then the stream.
    pub fn next_incoming(&mut self) -> io::Result<Option<BridgeMessage>> {
        match self.backlog.pop_front() {
            Some(msg) => Ok(Some(msg)),
            None => self.read_message(),
        }
    }

    /// Send a request to the host and wait for its response body.
    pub fn call(&mut self, command: &str, arguments: Option<Value>) -> Result<Value, HostError> {
        let seq = self.send_request(command, arguments)?;

        loop {
            let msg = self.read_message()?.ok_or(HostError::Disconnected)?;

            let is_reply = matches!(
                &msg.content,
                MessageContent::Response { request_seq, .. } if *request_seq == seq
            );
            if !is_reply {
                self.backlog.push_back(msg);
                continue;
            }

            if let MessageContent::Response {
                success,
                message,
                body,
                ..
            } = msg.content
            {
                return if success {
                    Ok(body.unwrap_or(Value::Null))
                } else {
                    Err(HostError::Rejected(
                        message.unwrap_or_else(|| format!("{} failed", command)),
                    ))
                };
            }
        }
    }

    fn call_for_text(&mut self, command: &str) -> Result<String, HostError> {
        let body = self.call(command, None)?;
        body.get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| HostError::Protocol(format!("{} response has no text", command)))
    }

    fn create_breakpoint(&mut self, kind: &str, location: &str) -> Result<BreakpointId, HostError> {
        let body = self.call(
            "createBreakpoint",
            Some(json!({ "kind": kind, "location": location })),
        )?;
        body.get("id").and_then(Value::as_i64).ok_or_else(|| {
            HostError::Protocol(format!("no breakpoint id for {} on {}", kind, location))
        })
    }
}

impl<R: BufRead, W: Write> HostDebugger for BridgeServer<R, W> {
    fn read_locals_dump(&mut self) -> Result<String, HostError> {
        self.call_for_text("readLocals")
    }

    fn list_known_functions(&mut self) -> Result<String, HostError> {
        self.call_for_text("listFunctions")
    }

    fn create_function_entry_breakpoint(
        &mut self,
        function: &str,
    ) -> Result<BreakpointId, HostError> {
        self.create_breakpoint("entry", function)
    }

    fn create_return_breakpoint(&mut self, function: &str) -> Result<BreakpointId, HostError> {
        self.create_breakpoint("return", function)
    }

    fn create_write_watchpoint(&mut self, variable: &str) -> Result<BreakpointId, HostError> {
        self.create_breakpoint("watch", variable)
    }

    fn delete_breakpoint(&mut self, id: BreakpointId) -> Result<(), HostError> {
        self.call("deleteBreakpoint", Some(json!({ "id": id })))?;
        Ok(())
    }

    fn issue_command(&mut self, command: &str) -> Result<(), HostError> {
        self.call("execute", Some(json!({ "command": command })))?;
        Ok(())
    }
}
