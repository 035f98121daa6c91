//! Reassembly of a final transcript from incremental, possibly superseded
//! segment updates.

use tracing::warn;

use super::messages::Segment;

/// Upper bound on accepted sequence numbers. A real utterance never comes
/// close; anything past this is a corrupt payload and is discarded rather
/// than allocated for.
const MAX_SEGMENTS: usize = 1 << 16;

/// Sparse ordered segment store indexed by sequence number.
///
/// The service streams segments out of order and may instruct the client to
/// replace a closed interval of earlier segments (`pgs == "rpl"` with an
/// inclusive `rg` range). Storage grows on demand to the highest sequence
/// number seen; replaced slots are nulled before the incoming segment is
/// stored at its own index. The transcript is the concatenation of all
/// non-null segments in ascending index order.
///
/// Content-free segments (no word groups, no progressive-result mode) are
/// ignored: the service sends such envelopes as acknowledgements and they
/// must not displace stored text.
#[derive(Debug, Default)]
pub struct SegmentDecoder {
    segments: Vec<Option<Segment>>,
}

impl SegmentDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one segment, applying its replace instruction first.
    pub fn push(&mut self, segment: Segment) {
        if segment.pgs.is_empty() && segment.ws.is_empty() {
            return;
        }

        let Some(slots) = segment.sn.checked_add(1).filter(|&n| n <= MAX_SEGMENTS) else {
            warn!("discarding segment with absurd sequence number {}", segment.sn);
            return;
        };
        if self.segments.len() < slots {
            self.segments.resize(slots, None);
        }

        if segment.pgs == "rpl" {
            if let [lo, hi] = segment.rg[..] {
                if lo <= hi {
                    let end = hi.saturating_add(1).min(self.segments.len());
                    for slot in &mut self.segments[lo.min(end)..end] {
                        *slot = None;
                    }
                }
            }
        }

        let sn = segment.sn;
        self.segments[sn] = Some(segment);
    }

    /// Concatenation of all stored segments in ascending index order.
    pub fn transcript(&self) -> String {
        self.segments
            .iter()
            .flatten()
            .map(Segment::text)
            .collect()
    }
}
