use std::ops::RangeInclusive;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;

/// Reference to one frame of a sequence. This is all the context stage
/// hands to renderers; pixel data stays behind a [`FrameResolver`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FrameRef {
    pub index: usize,
    #[serde(default)]
    pub source_ref: Option<String>,
}

/// Frame indices in `[center - radius, center + radius]` clamped to
/// `[0, last_frame_index]`. At sequence boundaries the window is asymmetric,
/// never padded.
pub fn window(center: usize, radius: usize, last_frame_index: usize) -> RangeInclusive<usize> {
    let lo = center.saturating_sub(radius);
    let hi = (center + radius).min(last_frame_index);

    lo..=hi
}

/// Capability interface for turning a frame reference into image bytes.
/// Collaborators supply the storage (filesystem, bucket); the core never
/// imports a storage client.
pub trait FrameResolver {
    fn resolve(&self, frame: &FrameRef) -> Result<Vec<u8>, Error>;
}

/// Resolves a candidate's context window through `resolver`. An unresolvable
/// frame is logged and skipped, truncating this one window; it never fails
/// the batch.
pub fn resolve_context<R: FrameResolver>(
    resolver: &R,
    context_frames: &[FrameRef],
) -> Vec<(FrameRef, Vec<u8>)> {
    let mut resolved = Vec::with_capacity(context_frames.len());

    for frame in context_frames {
        match resolver.resolve(frame) {
            Ok(bytes) => resolved.push((frame.clone(), bytes)),
            Err(err) => log::warn!("context frame {} skipped: {}", frame.index, err),
        }
    }

    resolved
}
