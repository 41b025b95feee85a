use std::collections::HashMap;

use base64::Engine;
use tracing::{trace, warn};

use super::{DefragmentResult, fragment::Fragment};
use crate::{PsrpError, PsrpMessage};

/// Reassembles incoming fragments into messages, one buffer per object id.
#[derive(Debug, Default)]
pub struct Defragmenter {
    buffers: HashMap<u64, Vec<u8>>,
}

impl Defragmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a base64 stream body, as found in a WS-Man `Stream` element.
    pub fn defragment_base64(&mut self, encoded: &str) -> Result<DefragmentResult, PsrpError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
        Ok(self.defragment(&bytes))
    }

    /// Feeds raw bytes holding one or more packed fragments.
    ///
    /// A message that fails to parse is logged and skipped; the other messages
    /// in the chunk are still returned. Truncated framing ends the chunk.
    pub fn defragment(&mut self, packet_data: &[u8]) -> DefragmentResult {
        let mut remaining = packet_data;
        let mut completed = Vec::new();

        while !remaining.is_empty() {
            let (fragment, rest) = match Fragment::unpack(remaining) {
                Ok(unpacked) => unpacked,
                Err(error) => {
                    warn!(
                        target: "defragment",
                        %error,
                        len = remaining.len(),
                        "dropping unreadable fragment data"
                    );
                    break;
                }
            };
            remaining = rest;

            let object_id = fragment.object_id;
            match self.accept(fragment) {
                Ok(Some(message)) => completed.push(message),
                Ok(None) => {}
                Err(error) => {
                    warn!(target: "defragment", object_id, %error, "dropping unparseable message");
                }
            }
        }

        if completed.is_empty() {
            DefragmentResult::Incomplete
        } else {
            DefragmentResult::Complete(completed)
        }
    }

    fn accept(&mut self, fragment: Fragment) -> Result<Option<PsrpMessage>, PsrpError> {
        let object_id = fragment.object_id;

        if fragment.start && fragment.end {
            self.buffers.remove(&object_id);
            return PsrpMessage::parse(&fragment.data).map(Some);
        }

        if fragment.start {
            if self.buffers.contains_key(&object_id) {
                trace!(target: "defragment", object_id, "discarding stale partial message");
            }
            self.buffers.insert(object_id, fragment.data);
            return Ok(None);
        }

        let Some(buffer) = self.buffers.get_mut(&object_id) else {
            warn!(
                target: "defragment",
                object_id,
                fragment_id = fragment.fragment_id,
                "dropping fragment without a start fragment"
            );
            return Ok(None);
        };
        buffer.extend_from_slice(&fragment.data);

        if !fragment.end {
            return Ok(None);
        }

        match self.buffers.remove(&object_id) {
            Some(bytes) => PsrpMessage::parse(&bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Number of messages still waiting for their end fragment.
    pub fn pending_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn clear_buffers(&mut self) {
        self.buffers.clear();
    }
}
