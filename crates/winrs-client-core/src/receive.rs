//! Output polling: repeat one Receive until the command is done.

use std::time::Instant;

use tracing::{debug, instrument, trace, warn};
use winrs_psrp::{
    DecodedOutput, DefragmentResult, Defragmenter, PowerShellOutputDecoder, StreamKind,
    decode_command_output,
};
use winrs_wsman::rsp::{ReceiveResponse, ReceivedStream};

use crate::config::ReceiveRetryPolicy;
use crate::connection::Connection;
use crate::output::Output;
use crate::transport::Transport;
use crate::WinRsError;

/// Turns received stream chunks into output text.
pub trait StreamDecoder {
    fn decode(&mut self, stream: &ReceivedStream) -> Vec<DecodedOutput>;

    /// Whether the content itself has signalled completion.
    fn is_finished(&self) -> bool;

    /// Exit code carried by the content, preferred over the WS-Man one.
    fn exit_code(&self) -> Option<i32>;
}

/// cmd shell streams: raw bytes, classified by the stream name.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandStreamDecoder;

impl StreamDecoder for CommandStreamDecoder {
    fn decode(&mut self, stream: &ReceivedStream) -> Vec<DecodedOutput> {
        decode_command_output(&stream.name, &stream.data)
            .into_iter()
            .collect()
    }

    fn is_finished(&self) -> bool {
        false
    }

    fn exit_code(&self) -> Option<i32> {
        None
    }
}

/// PowerShell streams: PSRP fragments. The stream name is ignored; the
/// decoded message decides between stdout and stderr.
#[derive(Debug, Default)]
pub struct PsrpStreamDecoder {
    defragmenter: Defragmenter,
    decoder: PowerShellOutputDecoder,
}

impl PsrpStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamDecoder for PsrpStreamDecoder {
    fn decode(&mut self, stream: &ReceivedStream) -> Vec<DecodedOutput> {
        if stream.data.is_empty() {
            return Vec::new();
        }

        match self.defragmenter.defragment(&stream.data) {
            DefragmentResult::Complete(messages) => messages
                .iter()
                .filter_map(|message| self.decoder.decode(message))
                .collect(),
            DefragmentResult::Incomplete => Vec::new(),
        }
    }

    fn is_finished(&self) -> bool {
        self.decoder.final_state().is_some()
    }

    fn exit_code(&self) -> Option<i32> {
        self.decoder.exit_code().or_else(|| self.decoder.should_exit())
    }
}

/// Re-sends one Receive envelope until the service answers with something
/// other than a receive timeout.
pub(crate) struct Poller<'a> {
    envelope: &'a str,
    policy: &'a ReceiveRetryPolicy,
    started: Instant,
    timeouts: u32,
}

impl<'a> Poller<'a> {
    pub(crate) fn new(envelope: &'a str, policy: &'a ReceiveRetryPolicy) -> Self {
        Self {
            envelope,
            policy,
            started: Instant::now(),
            timeouts: 0,
        }
    }

    pub(crate) fn poll<T: Transport>(
        &mut self,
        connection: &mut Connection<T>,
    ) -> Result<ReceiveResponse, WinRsError> {
        loop {
            match connection.send_envelope(self.envelope) {
                Ok(body) => return Ok(ReceiveResponse::parse(&body)?),
                Err(WinRsError::Fault(fault)) if fault.is_receive_timeout() => {
                    self.timeouts += 1;
                    let elapsed = self.started.elapsed();
                    if !self.policy.allows(self.timeouts, elapsed) {
                        warn!(target: "receive", timeouts = self.timeouts, ?elapsed, "receive retry ceiling reached");
                        return Err(WinRsError::ReceiveTimeoutExceeded {
                            timeouts: self.timeouts,
                            elapsed,
                        });
                    }
                    trace!(target: "receive", timeouts = self.timeouts, "no output yet, polling again");
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// Polls with `receive_envelope` until the command is done.
///
/// Receive timeouts are retried immediately, within `policy`. Each decoded
/// chunk is pushed to the result and handed to `on_output` as
/// `(stdout, stderr)` before the next poll.
#[instrument(level = "debug", skip_all)]
pub fn read_output<T: Transport, D: StreamDecoder + ?Sized>(
    connection: &mut Connection<T>,
    receive_envelope: &str,
    decoder: &mut D,
    policy: &ReceiveRetryPolicy,
    on_output: &mut dyn FnMut(Option<&str>, Option<&str>),
) -> Result<Output, WinRsError> {
    let mut poller = Poller::new(receive_envelope, policy);
    let mut output = Output::new();

    loop {
        let response = poller.poll(connection)?;
        for stream in &response.streams {
            for chunk in decoder.decode(stream) {
                match chunk.stream {
                    StreamKind::Stdout => on_output(Some(&chunk.text), None),
                    StreamKind::Stderr => on_output(None, Some(&chunk.text)),
                }
                output.push(chunk);
            }
        }

        if response.is_done() || decoder.is_finished() {
            let exitcode = decoder.exit_code().or_else(|| response.exit_code());
            debug!(target: "receive", ?exitcode, chunks = output.data().len(), "command done");
            output.set_exitcode(exitcode);
            return Ok(output);
        }
    }
}
