use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};
use crate::chain::Chain;
use crate::context::FrameRef;
use crate::detection::Detection;

/// A clustered, filtered detection chain: one reviewable smoke/fire event.
///
/// `members` are sorted by `frame_index` with no duplicate frame;
/// `context_frames` is filled by the context-window stage before the
/// candidate is handed out.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Candidate {
    pub representative_bbox: BBox<Ltrb>,
    pub score: f32,
    pub members: Vec<Detection>,
    pub context_frames: Vec<FrameRef>,
}

/// Index of the chain member with the highest confidence, ties broken by
/// earliest `frame_index` (members are frame-ordered, so first wins).
pub(crate) fn representative(members: &[Detection]) -> Option<usize> {
    let mut best: Option<usize> = None;

    for (i, det) in members.iter().enumerate() {
        best = match best {
            Some(b) if members[b].confidence >= det.confidence => Some(b),
            _ => Some(i),
        };
    }

    best
}

/// Keeps the chains worth reviewing: long enough, and confident enough at
/// their peak. Everything else is dropped silently; an empty result is a
/// normal outcome for a quiet sequence.
pub fn filter_chains(
    chains: Vec<Chain>,
    confidence_threshold: f32,
    min_cluster_size: usize,
) -> Vec<Candidate> {
    chains
        .into_iter()
        .filter_map(|chain| {
            if chain.len() < min_cluster_size {
                return None;
            }

            let rep = representative(&chain.members)?;
            let rep = &chain.members[rep];
            if rep.confidence < confidence_threshold {
                return None;
            }

            Some(Candidate {
                representative_bbox: rep.bbox.clone(),
                score: rep.confidence,
                members: chain.members.clone(),
                context_frames: Vec::new(),
            })
        })
        .collect()
}
