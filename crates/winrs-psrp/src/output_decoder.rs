//! Turns decoded PSRP messages (or raw cmd stream bytes) into terminal text.

use tracing::{debug, warn};

use crate::messages::{HostCall, MessageData, PsInvocationState};
use crate::text::{repair_utf8, strip_bom};
use crate::PsrpMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    /// Maps a WS-Man `Stream@Name` attribute. Anything but `stderr` is stdout.
    pub fn from_stream_name(name: &str) -> Self {
        if name.eq_ignore_ascii_case("stderr") {
            Self::Stderr
        } else {
            Self::Stdout
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedOutput {
    pub stream: StreamKind,
    pub text: String,
}

impl DecodedOutput {
    /// `text` must already have its `_xHHHH_` escapes decoded.
    fn new(stream: StreamKind, text: &str) -> Self {
        Self {
            stream,
            text: strip_bom(text).to_owned(),
        }
    }
}

/// Classifies PSRP messages into stdout or stderr text and tracks how the
/// pipeline finished.
#[derive(Debug, Default, Clone)]
pub struct PowerShellOutputDecoder {
    should_exit: Option<i32>,
    final_state: Option<PsInvocationState>,
}

impl PowerShellOutputDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Undecodable content is logged and produces no output.
    pub fn decode(&mut self, message: &PsrpMessage) -> Option<DecodedOutput> {
        match MessageData::parse(message) {
            Ok(Some(data)) => self.decode_data(&data),
            Ok(None) => None,
            Err(error) => {
                warn!(
                    target: "receive",
                    kind = ?message.message_type,
                    %error,
                    "dropping undecodable message"
                );
                None
            }
        }
    }

    pub fn decode_data(&mut self, data: &MessageData) -> Option<DecodedOutput> {
        match data {
            MessageData::PipelineOutput(output) => {
                Some(DecodedOutput::new(StreamKind::Stdout, &output.output()))
            }
            MessageData::ErrorRecord(record) => {
                Some(DecodedOutput::new(StreamKind::Stderr, &record.render()))
            }
            MessageData::PipelineState(state) => {
                debug!(target: "receive", state = state.pipeline_state.as_str(), "pipeline state");
                if state.pipeline_state.is_terminal() {
                    self.final_state = Some(state.pipeline_state);
                }
                let record = state.exception_as_error_record()?;
                Some(DecodedOutput::new(StreamKind::Stderr, &record.render()))
            }
            MessageData::PipelineHostCall(call) | MessageData::RunspacePoolHostCall(call) => {
                if let Some(code) = call.should_exit_code() {
                    debug!(target: "receive", code, "remote host requested exit");
                    self.should_exit = Some(code);
                }
                decode_host_call(call)
            }
            MessageData::SessionCapability(_)
            | MessageData::RunspacePoolState(_)
            | MessageData::ApplicationPrivateData(_) => None,
        }
    }

    /// Terminal pipeline state seen so far, if any.
    pub fn final_state(&self) -> Option<PsInvocationState> {
        self.final_state
    }

    /// `SetShouldExit` wins; otherwise Completed maps to 0 and Failed or
    /// Stopped to 1. `None` until the pipeline has finished.
    pub fn exit_code(&self) -> Option<i32> {
        let state = self.final_state?;
        Some(self.should_exit.unwrap_or(match state {
            PsInvocationState::Completed => 0,
            _ => 1,
        }))
    }

    /// Exit code requested through `SetShouldExit`, independent of pipeline state.
    pub fn should_exit(&self) -> Option<i32> {
        self.should_exit
    }
}

fn decode_host_call(call: &HostCall) -> Option<DecodedOutput> {
    let method = call.method_identifier.as_str();
    let text = call.text().unwrap_or_default();

    let rendered = if method.starts_with("WriteLine") || method == "WriteErrorLine" {
        format!("{text}\r\n")
    } else if method == "WriteDebugLine" {
        format!("Debug: {text}\r\n")
    } else if method == "WriteWarningLine" {
        format!("Warning: {text}\r\n")
    } else if method == "WriteVerboseLine" {
        format!("Verbose: {text}\r\n")
    } else if method == "Write1" || method == "Write2" {
        text
    } else {
        debug!(target: "receive", method, "host call produces no output");
        return None;
    };

    let stream = if call.is_error() {
        StreamKind::Stderr
    } else {
        StreamKind::Stdout
    };
    Some(DecodedOutput::new(stream, &rendered))
}

/// Decodes one cmd shell Stream element, whose name is authoritative.
pub fn decode_command_output(stream_name: &str, bytes: &[u8]) -> Option<DecodedOutput> {
    if bytes.is_empty() {
        return None;
    }

    Some(DecodedOutput {
        stream: StreamKind::from_stream_name(stream_name),
        text: strip_bom(&repair_utf8(bytes)).to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::PsValue;

    fn call(method: &str, text: &str) -> HostCall {
        HostCall {
            call_id: -100,
            method_identifier: method.to_owned(),
            method_parameters: BTreeMap::from([("s".to_owned(), PsValue::from(text))]),
        }
    }

    #[test]
    fn write_line_goes_to_stdout_with_crlf() {
        let out = decode_host_call(&call("WriteLine2", "hello")).unwrap();
        assert_eq!(out, DecodedOutput::new(StreamKind::Stdout, "hello\r\n"));
    }

    #[test]
    fn stream_prefixes() {
        assert_eq!(decode_host_call(&call("WriteDebugLine", "d")).unwrap().text, "Debug: d\r\n");
        assert_eq!(decode_host_call(&call("WriteWarningLine", "w")).unwrap().text, "Warning: w\r\n");
        assert_eq!(decode_host_call(&call("WriteVerboseLine", "v")).unwrap().text, "Verbose: v\r\n");
    }

    #[test]
    fn raw_write_keeps_text_verbatim() {
        assert_eq!(decode_host_call(&call("Write2", "no newline")).unwrap().text, "no newline");
    }

    #[test]
    fn non_output_host_calls_are_skipped() {
        assert!(decode_host_call(&call("SetShouldExit", "")).is_none());
        assert!(decode_host_call(&call("ReadLine", "")).is_none());
    }

    #[test]
    fn exit_code_follows_should_exit_then_state() {
        use crate::messages::PipelineState;

        let mut decoder = PowerShellOutputDecoder::new();
        assert_eq!(decoder.exit_code(), None);

        let mut exit = call("SetShouldExit", "");
        exit.method_parameters = BTreeMap::from([("exit_code".to_owned(), PsValue::from(3))]);
        assert!(decoder.decode_data(&MessageData::PipelineHostCall(exit)).is_none());
        assert_eq!(decoder.exit_code(), None);

        let failed = PipelineState {
            pipeline_state: PsInvocationState::Failed,
            exception_as_error_record: None,
        };
        assert!(decoder.decode_data(&MessageData::PipelineState(failed)).is_none());
        assert_eq!(decoder.exit_code(), Some(3));

        let mut decoder = PowerShellOutputDecoder::new();
        let completed = PipelineState {
            pipeline_state: PsInvocationState::Completed,
            exception_as_error_record: None,
        };
        decoder.decode_data(&MessageData::PipelineState(completed));
        assert_eq!(decoder.exit_code(), Some(0));
    }

    #[test]
    fn escaped_escape_prefix_is_decoded_once() {
        let out = decode_host_call(&call("WriteLine1", "_x005F_x0041_")).unwrap();
        assert_eq!(out.text, "_x0041_\r\n");
    }

    #[test]
    fn cmd_output_is_repaired() {
        let out = decode_command_output("stderr", b"\xEF\xBB\xBFbad \xFF byte").unwrap();

        assert_eq!(out.stream, StreamKind::Stderr);
        assert_eq!(out.text, "bad \u{FFFD} byte");
        assert!(decode_command_output("stdout", b"").is_none());
    }
}
