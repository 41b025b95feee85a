use tracing::debug;

use super::fragment::{FRAGMENT_HEADER_LEN, Fragment};
use crate::{PsrpError, PsrpMessage, ps_value::PsObjectWithType};

/// Default size of one fragment on the wire, header included.
pub const DEFAULT_MAX_BLOB_LENGTH: usize = 32768;

/// Splits outgoing messages into fragments no larger than the negotiated blob length.
///
/// The object id counter is per instance and starts at 1, so one fragmenter
/// models one client-to-server stream.
#[derive(Debug)]
pub struct Fragmenter {
    max_blob_length: usize,
    outgoing_counter: u64,
}

impl Default for Fragmenter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BLOB_LENGTH)
    }
}

impl Fragmenter {
    pub fn new(max_blob_length: usize) -> Self {
        Self {
            max_blob_length,
            outgoing_counter: 1,
        }
    }

    pub fn max_blob_length(&self) -> usize {
        self.max_blob_length
    }

    /// Applies a renegotiated limit; later messages use it.
    pub fn set_max_blob_length(&mut self, max_blob_length: usize) {
        debug!(
            target: "fragmentation",
            old = self.max_blob_length,
            new = max_blob_length,
            "max blob length renegotiated"
        );
        self.max_blob_length = max_blob_length;
    }

    /// Largest slice of the packed message carried by one fragment.
    pub fn chunk_len(&self) -> usize {
        self.max_blob_length
            .saturating_sub(FRAGMENT_HEADER_LEN)
            .max(1)
    }

    pub fn fragment(&mut self, message: &PsrpMessage) -> Vec<Fragment> {
        let object_id = self.outgoing_counter;
        self.outgoing_counter += 1;

        let packed = message.pack();
        let chunks: Vec<&[u8]> = packed.chunks(self.chunk_len()).collect();
        let last = chunks.len().saturating_sub(1);

        let fragments: Vec<Fragment> = chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                Fragment::new(object_id, index as u64, chunk.to_vec(), index == 0, index == last)
            })
            .collect();

        debug!(
            target: "fragmentation",
            object_id,
            message_type = ?message.message_type,
            message_len = packed.len(),
            fragments = fragments.len(),
            "fragmented message"
        );

        fragments
    }

    /// Serializes a typed client message and fragments it.
    pub fn fragment_ps_message(
        &mut self,
        message: &dyn PsObjectWithType,
        rpid: uuid::Uuid,
        pid: Option<uuid::Uuid>,
    ) -> Result<Vec<Fragment>, PsrpError> {
        let message = PsrpMessage::from_ps_message(message, rpid, pid)?;
        Ok(self.fragment(&message))
    }
}

/// Concatenates packed fragments into one byte stream, as carried by a single WS-Man body.
pub fn pack_fragments(fragments: &[Fragment]) -> Result<Vec<u8>, PsrpError> {
    let mut out = Vec::new();
    for fragment in fragments {
        out.extend(fragment.pack()?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Destination, MessageType};
    use uuid::Uuid;

    fn message(len: usize) -> PsrpMessage {
        PsrpMessage::new(
            Destination::Server,
            MessageType::CreatePipeline,
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            vec![b'x'; len],
        )
    }

    #[test]
    fn single_fragment_is_start_and_end() {
        let mut fragmenter = Fragmenter::default();
        let fragments = fragmenter.fragment(&message(10));

        assert_eq!(fragments.len(), 1);
        assert!(fragments[0].start && fragments[0].end);
        assert_eq!(fragments[0].object_id, 1);
        assert_eq!(fragments[0].fragment_id, 0);
    }

    #[test]
    fn object_id_advances_per_message() {
        let mut fragmenter = Fragmenter::default();
        let first = fragmenter.fragment(&message(1));
        let second = fragmenter.fragment(&message(1));

        assert_eq!(first[0].object_id, 1);
        assert_eq!(second[0].object_id, 2);
    }

    #[test]
    fn exact_multiple_marks_last_chunk_as_end() {
        let mut fragmenter = Fragmenter::new(21 + 43);
        let fragments = fragmenter.fragment(&message(43));

        assert_eq!(fragments.len(), 2);
        assert!(fragments[0].start && !fragments[0].end);
        assert!(!fragments[1].start && fragments[1].end);
        assert_eq!(fragments[1].fragment_id, 1);
    }

    #[test]
    fn renegotiated_length_applies_to_later_messages() {
        let mut fragmenter = Fragmenter::new(100);
        assert_eq!(fragmenter.fragment(&message(500)).len(), 543_usize.div_ceil(79));

        fragmenter.set_max_blob_length(1000);
        assert_eq!(fragmenter.max_blob_length(), 1000);
        assert_eq!(fragmenter.fragment(&message(500)).len(), 1);
    }
}
