// tests/bridge_tests.rs
// Framed JSON transport between the host shim and the session

use sac_debugger::bridge::{run_bridge, BridgeMessage, BridgeServer, MessageContent};
use sac_debugger::debugger::{BreakpointKind, DebugSession, HostDebugger, HostError};
use serde_json::{json, Value};
use std::io::{self, Cursor};

fn framed(messages: &[Value]) -> Vec<u8> {
    let mut out = String::new();
    for msg in messages {
        let body = msg.to_string();
        out.push_str(&format!("Content-Length: {}\r\n\r\n{}", body.len(), body));
    }
    out.into_bytes()
}

fn response(request_seq: u64, command: &str, body: Value) -> Value {
    json!({
        "seq": 100 + request_seq,
        "type": "response",
        "request_seq": request_seq,
        "success": true,
        "command": command,
        "body": body,
    })
}

fn read_all(bytes: Vec<u8>) -> Vec<BridgeMessage> {
    let mut reader = BridgeServer::new(Cursor::new(bytes), io::sink());
    let mut messages = Vec::new();
    while let Some(msg) = reader.read_message().expect("well-formed output") {
        messages.push(msg);
    }
    messages
}

fn requests(messages: &[BridgeMessage]) -> Vec<(String, Value)> {
    messages
        .iter()
        .filter_map(|msg| match &msg.content {
            MessageContent::Request { command, arguments } => Some((
                command.clone(),
                arguments.clone().unwrap_or(Value::Null),
            )),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod bridge_tests {
    use super::*;

    #[test]
    fn test_event_framing_round_trip() {
        let mut server = BridgeServer::new(Cursor::new(Vec::new()), Vec::new());
        server
            .send_event("stopHandled", Some(json!({ "consumed": 1 })))
            .unwrap();

        let written = server.into_writer();
        assert!(String::from_utf8_lossy(&written).starts_with("Content-Length: "));

        let messages = read_all(written);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].msg_type, "event");
        assert_eq!(
            messages[0].content,
            MessageContent::Event {
                event: "stopHandled".to_string(),
                body: Some(json!({ "consumed": 1 })),
            }
        );
    }

    #[test]
    fn test_response_is_not_mistaken_for_request() {
        let input = framed(&[response(1, "readLocals", json!({ "text": "" }))]);
        let mut server = BridgeServer::new(Cursor::new(input), io::sink());
        let msg = server.read_message().unwrap().unwrap();
        assert!(matches!(
            msg.content,
            MessageContent::Response { request_seq: 1, success: true, .. }
        ));
    }

    #[test]
    fn test_call_queues_unrelated_messages() {
        let input = framed(&[
            json!({ "seq": 1, "type": "event", "event": "stopped", "body": { "breakpoints": [4] } }),
            response(1, "readLocals", json!({ "text": "SACl_x = 1\n" })),
        ]);
        let mut server = BridgeServer::new(Cursor::new(input), Vec::new());

        assert_eq!(server.read_locals_dump().unwrap(), "SACl_x = 1\n");

        let queued = server.next_incoming().unwrap().expect("queued event");
        assert!(matches!(queued.content, MessageContent::Event { ref event, .. } if event == "stopped"));
        assert!(server.next_incoming().unwrap().is_none());

        let sent = requests(&read_all(server.into_writer()));
        assert_eq!(sent, vec![("readLocals".to_string(), Value::Null)]);
    }

    #[test]
    fn test_rejection_is_verbatim() {
        let input = framed(&[json!({
            "seq": 7,
            "type": "response",
            "request_seq": 1,
            "success": false,
            "command": "execute",
            "message": "No symbol \"SACl_q\" in current context.",
        })]);
        let mut server = BridgeServer::new(Cursor::new(input), io::sink());

        match server.issue_command("print SACl_q") {
            Err(HostError::Rejected(message)) => {
                assert_eq!(message, "No symbol \"SACl_q\" in current context.")
            }
            other => panic!("Expected a rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_disconnect_mid_call() {
        let mut server = BridgeServer::new(Cursor::new(Vec::new()), io::sink());
        assert!(matches!(
            server.list_known_functions(),
            Err(HostError::Disconnected)
        ));
    }

    #[test]
    fn test_missing_breakpoint_id_is_protocol_error() {
        let input = framed(&[response(1, "createBreakpoint", json!({}))]);
        let mut server = BridgeServer::new(Cursor::new(input), io::sink());
        assert!(matches!(
            server.create_write_watchpoint("SACl_x"),
            Err(HostError::Protocol(_))
        ));
    }

    #[test]
    fn test_init_and_entry_over_the_wire() {
        let input = framed(&[
            json!({ "seq": 1, "type": "request", "command": "command", "arguments": { "line": "init" } }),
            response(1, "execute", Value::Null),
            response(2, "listFunctions", json!({ "text": "10:\tint SACf__MAIN__main(void);\n" })),
            response(3, "createBreakpoint", json!({ "id": 1 })),
            json!({ "seq": 2, "type": "event", "event": "stopped", "body": { "breakpoints": [1] } }),
            response(5, "readLocals", json!({ "text": "SACl_a = 3\n" })),
            response(6, "createBreakpoint", json!({ "id": 2 })),
            response(7, "createBreakpoint", json!({ "id": 3 })),
            response(8, "execute", Value::Null),
            response(9, "execute", Value::Null),
            json!({ "seq": 3, "type": "request", "command": "disconnect" }),
        ]);

        let mut server = BridgeServer::new(Cursor::new(input), Vec::new());
        let mut session = DebugSession::default();
        run_bridge(&mut server, &mut session).unwrap();

        assert_eq!(session.depth(), 1);
        assert_eq!(session.registry().get(BreakpointKind::Watch, 2), Some("SACl_a"));
        assert_eq!(
            session.registry().get(BreakpointKind::Return, 3),
            Some("SACf__MAIN__main")
        );

        let output = read_all(server.into_writer());
        let sent = requests(&output);
        let commands: Vec<&str> = sent.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(
            commands,
            vec![
                "execute",
                "listFunctions",
                "createBreakpoint",
                "readLocals",
                "createBreakpoint",
                "createBreakpoint",
                "execute",
                "execute",
            ]
        );
        assert_eq!(sent[4].1, json!({ "kind": "watch", "location": "SACl_a" }));
        assert_eq!(sent[6].1, json!({ "command": "continue" }));
        assert_eq!(sent[7].1, json!({ "command": "stop" }));

        let init_reply = output
            .iter()
            .find_map(|msg| match &msg.content {
                MessageContent::Response { request_seq: 1, success, body, .. } => {
                    Some((*success, body.clone()))
                }
                _ => None,
            })
            .expect("init should be answered");
        assert_eq!(init_reply, (true, Some(json!({ "functions": 1 }))));

        let handled = output.iter().any(|msg| {
            matches!(&msg.content, MessageContent::Event { event, .. } if event == "stopHandled")
        });
        assert!(handled, "Stop handling should be reported");
    }

    #[test]
    fn test_failed_query_is_answered_with_error() {
        let input = framed(&[
            json!({ "seq": 1, "type": "request", "command": "command", "arguments": { "line": "print *sac(1x)" } }),
            response(1, "readLocals", json!({ "text": "SACl_x = 1\n" })),
            json!({ "seq": 2, "type": "request", "command": "disconnect" }),
        ]);

        let mut server = BridgeServer::new(Cursor::new(input), Vec::new());
        let mut session = DebugSession::default();
        run_bridge(&mut server, &mut session).unwrap();

        let output = read_all(server.into_writer());
        let sent = requests(&output);
        assert!(
            sent.iter().all(|(command, _)| command != "execute"),
            "Nothing may reach the debugger"
        );

        let (success, message) = output
            .iter()
            .find_map(|msg| match &msg.content {
                MessageContent::Response {
                    request_seq: 1,
                    success,
                    message,
                    ..
                } => Some((*success, message.clone())),
                _ => None,
            })
            .expect("command should be answered");
        assert!(!success);
        assert!(message.unwrap_or_default().contains("digit"));
    }
}
