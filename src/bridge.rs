use crate::metadata::PluginEdits;
use crate::settings::Settings;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::{
    io::{BufRead, BufReader, Write},
    process::{Child, ChildStdin, ChildStdout, Command, Stdio},
};
use thiserror::Error;

/// One backend command. The wire form is a JSON envelope
/// `{"name": <command>, "args": [...]}` per request; every command name and
/// argument shape is fixed here so handlers cannot drift from the protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    GetSettings,
    GetGameData,
    ChangeGame { folder: String },
    UpdateMasterlist,
    SortPlugins,
    ApplySort { load_order: Vec<String> },
    CancelSort,
    DiscardUnappliedChanges,
    ClearPluginMetadata { plugin: String },
    ClearAllMetadata,
    RedatePlugins,
    EditorOpened,
    EditorClosed { edits: Option<PluginEdits> },
    OpenReadme,
    CloseSettings { settings: Settings },
    SaveFilterState { filter: String, enabled: bool },
    GetConflictingPlugins { plugin: String },
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::GetSettings => "getSettings",
            Request::GetGameData => "getGameData",
            Request::ChangeGame { .. } => "changeGame",
            Request::UpdateMasterlist => "updateMasterlist",
            Request::SortPlugins => "sortPlugins",
            Request::ApplySort { .. } => "applySort",
            Request::CancelSort => "cancelSort",
            Request::DiscardUnappliedChanges => "discardUnappliedChanges",
            Request::ClearPluginMetadata { .. } => "clearPluginMetadata",
            Request::ClearAllMetadata => "clearAllMetadata",
            Request::RedatePlugins => "redatePlugins",
            Request::EditorOpened => "editorOpened",
            Request::EditorClosed { .. } => "editorClosed",
            Request::OpenReadme => "openReadme",
            Request::CloseSettings { .. } => "closeSettings",
            Request::SaveFilterState { .. } => "saveFilterState",
            Request::GetConflictingPlugins { .. } => "getConflictingPlugins",
        }
    }

    fn args(&self) -> Value {
        match self {
            Request::ChangeGame { folder } => json!([folder]),
            Request::ApplySort { load_order } => json!([load_order]),
            Request::ClearPluginMetadata { plugin } => json!([plugin]),
            Request::EditorClosed { edits: Some(edits) } => json!([edits]),
            Request::CloseSettings { settings } => json!([settings]),
            Request::SaveFilterState { filter, enabled } => json!([filter, enabled]),
            Request::GetConflictingPlugins { plugin } => json!([plugin]),
            _ => json!([]),
        }
    }

    pub fn to_wire(&self) -> String {
        json!({ "name": self.name(), "args": self.args() }).to_string()
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("backend rejected {command}: {message}")]
    Backend {
        command: &'static str,
        message: String,
    },
    #[error("malformed {command} reply: {detail}")]
    Protocol {
        command: &'static str,
        detail: String,
    },
    #[error("backend closed its end of the channel")]
    Disconnected,
    #[error("backend channel i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The sole boundary to the backend: one request in, one optional
/// JSON-encoded payload out. No ordering is assumed between independent
/// requests; handlers that must sequence effects chain their own calls.
pub trait QueryBridge {
    fn query(&mut self, request: Request) -> Result<Option<String>, BridgeError>;
}

/// Parse a payload that must be present.
pub fn parse_payload<T: DeserializeOwned>(
    command: &'static str,
    payload: Option<String>,
) -> Result<T, BridgeError> {
    let raw = payload.ok_or(BridgeError::Protocol {
        command,
        detail: "expected a payload, got none".to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|err| BridgeError::Protocol {
        command,
        detail: err.to_string(),
    })
}

/// Parse a payload where the backend may legitimately answer with nothing.
pub fn parse_optional_payload<T: DeserializeOwned>(
    command: &'static str,
    payload: Option<String>,
) -> Result<Option<T>, BridgeError> {
    match payload {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| BridgeError::Protocol {
                command,
                detail: err.to_string(),
            }),
    }
}

/// Backend reached over a child process, one JSON line per request on its
/// stdin and one reply line on its stdout:
/// `{"result": <payload|null>}` or `{"error": <message>}`.
pub struct ProcessBridge {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessBridge {
    pub fn spawn(command: &str, args: &[String]) -> Result<Self, BridgeError> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take().ok_or(BridgeError::Disconnected)?;
        let stdout = child.stdout.take().ok_or(BridgeError::Disconnected)?;
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl QueryBridge for ProcessBridge {
    fn query(&mut self, request: Request) -> Result<Option<String>, BridgeError> {
        let command = request.name();
        tracing::debug!(command, "sending backend request");
        self.stdin.write_all(request.to_wire().as_bytes())?;
        self.stdin.write_all(b"\n")?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(BridgeError::Disconnected);
        }
        let reply: Value =
            serde_json::from_str(line.trim()).map_err(|err| BridgeError::Protocol {
                command,
                detail: err.to_string(),
            })?;
        if let Some(message) = reply.get("error").and_then(Value::as_str) {
            return Err(BridgeError::Backend {
                command,
                message: message.to_string(),
            });
        }
        match reply.get("result") {
            None => Err(BridgeError::Protocol {
                command,
                detail: "reply carries neither result nor error".to_string(),
            }),
            Some(Value::Null) => Ok(None),
            Some(result) => Ok(Some(result.to_string())),
        }
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_envelope_carries_name_and_positional_args() {
        let wire = Request::ChangeGame {
            folder: "skyrimse".to_string(),
        }
        .to_wire();
        let value: Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["name"], "changeGame");
        assert_eq!(value["args"], json!(["skyrimse"]));

        let wire = Request::ApplySort {
            load_order: vec!["A.esp".to_string(), "B.esp".to_string()],
        }
        .to_wire();
        let value: Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["args"], json!([["A.esp", "B.esp"]]));

        let wire = Request::SortPlugins.to_wire();
        let value: Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["name"], "sortPlugins");
        assert_eq!(value["args"], json!([]));
    }

    #[test]
    fn editor_closed_omits_args_when_cancelling() {
        let wire = Request::EditorClosed { edits: None }.to_wire();
        let value: Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["args"], json!([]));

        let wire = Request::EditorClosed {
            edits: Some(PluginEdits {
                name: "A.esp".to_string(),
                ..PluginEdits::default()
            }),
        }
        .to_wire();
        let value: Value = serde_json::from_str(&wire).unwrap();
        assert_eq!(value["args"][0]["name"], "A.esp");
    }

    #[test]
    fn parse_payload_maps_failures_to_protocol_errors() {
        let parsed: Result<Vec<String>, _> =
            parse_payload("cancelSort", Some("[\"A.esp\"]".to_string()));
        assert_eq!(parsed.unwrap(), vec!["A.esp".to_string()]);

        let missing: Result<Vec<String>, _> = parse_payload("cancelSort", None);
        assert!(matches!(missing, Err(BridgeError::Protocol { .. })));

        let garbled: Result<Vec<String>, _> =
            parse_payload("cancelSort", Some("not json".to_string()));
        assert!(matches!(garbled, Err(BridgeError::Protocol { .. })));

        let absent: Option<Vec<String>> = parse_optional_payload("updateMasterlist", None).unwrap();
        assert_eq!(absent, None);
    }

    #[cfg(unix)]
    #[test]
    fn process_bridge_round_trips_one_line_per_request() {
        // A stub backend that acknowledges every request.
        let mut bridge = ProcessBridge::spawn(
            "sh",
            &[
                "-c".to_string(),
                r#"while read line; do echo '{"result":null}'; done"#.to_string(),
            ],
        )
        .unwrap();
        assert_eq!(bridge.query(Request::EditorOpened).unwrap(), None);
        assert_eq!(
            bridge.query(Request::DiscardUnappliedChanges).unwrap(),
            None
        );
    }

    #[cfg(unix)]
    #[test]
    fn process_bridge_surfaces_backend_errors() {
        let mut bridge = ProcessBridge::spawn(
            "sh",
            &[
                "-c".to_string(),
                r#"while read line; do echo '{"error":"no game loaded"}'; done"#.to_string(),
            ],
        )
        .unwrap();
        let err = bridge.query(Request::SortPlugins).unwrap_err();
        match err {
            BridgeError::Backend { command, message } => {
                assert_eq!(command, "sortPlugins");
                assert_eq!(message, "no game loaded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
