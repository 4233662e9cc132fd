use crate::candidate::{self, Candidate};
use crate::chain;
use crate::context::{self, FrameRef};
use crate::detection::Detection;
use crate::error::Error;
use crate::frame::Frame;
use crate::nms::{self, NmsMode};
use crate::validate;

/// Thresholds and knobs of the candidate-extraction pipeline. Defaults match
/// the annotation workflow's auto-generation parameters.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Minimum tail IoU for a detection to extend a chain.
    pub iou_threshold: f32,
    /// Minimum peak confidence for a chain to become a candidate.
    pub confidence_threshold: f32,
    /// Minimum chain length for a chain to become a candidate.
    pub min_cluster_size: usize,
    /// Context window radius, in frames, around the representative.
    pub context_radius: usize,
    /// Intra-frame IoU above which the less confident duplicate is dropped.
    pub overlap_threshold: f32,
    pub nms_mode: NmsMode,
    /// Frames a chain may go unmatched before it closes; defaults to the
    /// context radius when unset.
    pub max_frame_gap: Option<usize>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.3,
            confidence_threshold: 0.5,
            min_cluster_size: 1,
            context_radius: 2,
            overlap_threshold: 0.0,
            nms_mode: NmsMode::PairwiseForward,
            max_frame_gap: None,
        }
    }
}

impl ExtractorConfig {
    pub fn new(
        iou_threshold: f32,
        confidence_threshold: f32,
        min_cluster_size: usize,
        context_radius: usize,
    ) -> Self {
        Self {
            iou_threshold,
            confidence_threshold,
            min_cluster_size,
            context_radius,
            ..Default::default()
        }
    }

    #[inline]
    fn frame_gap(&self) -> usize {
        self.max_frame_gap.unwrap_or(self.context_radius)
    }
}

/// Runs the five pipeline stages over one sequence: validation, intra-frame
/// NMS, temporal chaining, candidate filtering, context-window selection.
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    pub fn extract(&self, frames: &[Frame]) -> Result<Vec<Candidate>, Error> {
        if frames.is_empty() {
            return Ok(Vec::new());
        }

        let frames = validate::normalized(frames)?;

        let deduped: Vec<Vec<Detection>> = frames
            .iter()
            .map(|frame| {
                nms::suppress(
                    &frame.detections,
                    self.config.overlap_threshold,
                    self.config.nms_mode,
                )
            })
            .collect();

        let chains = chain::link(&deduped, self.config.iou_threshold, self.config.frame_gap());

        let mut candidates = candidate::filter_chains(
            chains,
            self.config.confidence_threshold,
            self.config.min_cluster_size,
        );

        let last_frame_index = frames.len() - 1;
        for cand in &mut candidates {
            if let Some(rep) = candidate::representative(&cand.members) {
                let center = cand.members[rep].frame_index;
                cand.context_frames =
                    context::window(center, self.config.context_radius, last_frame_index)
                        .map(|index| FrameRef {
                            index,
                            source_ref: frames[index].source_ref.clone(),
                        })
                        .collect();
            }
        }

        log::debug!(
            "extracted {} candidate(s) from {} frame(s)",
            candidates.len(),
            frames.len()
        );

        Ok(candidates)
    }
}

/// One-call form of the pipeline, matching the shape collaborators use:
/// validated per-frame detections in, candidate list out.
pub fn extract_candidates(
    detections_by_frame: &[Frame],
    iou_threshold: f32,
    confidence_threshold: f32,
    min_cluster_size: usize,
    context_radius: usize,
) -> Result<Vec<Candidate>, Error> {
    Extractor::new(ExtractorConfig::new(
        iou_threshold,
        confidence_threshold,
        min_cluster_size,
        context_radius,
    ))
    .extract(detections_by_frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;

    fn det(x1: f32, y1: f32, x2: f32, y2: f32, conf: f32) -> Detection {
        Detection::new(0, BBox::ltrb(x1, y1, x2, y2), conf, "smoke")
    }

    #[test]
    fn empty_input_is_a_normal_empty_result() {
        let extractor = Extractor::new(ExtractorConfig::default());
        assert!(extractor.extract(&[]).unwrap().is_empty());
    }

    #[test]
    fn single_confident_detection_yields_one_candidate() {
        let frames = vec![Frame::new(vec![det(0.1, 0.1, 0.3, 0.3, 0.9)])];
        let cands = extract_candidates(&frames, 0.3, 0.5, 1, 2).unwrap();

        assert_eq!(cands.len(), 1);
        assert_eq!(cands[0].score, 0.9);
        assert_eq!(cands[0].context_frames.len(), 1);
        assert_eq!(cands[0].context_frames[0].index, 0);
    }

    #[test]
    fn validation_failure_rejects_the_whole_sequence() {
        let frames = vec![
            Frame::new(vec![det(0.1, 0.1, 0.3, 0.3, 0.9)]),
            Frame::new(vec![det(0.2, 0.2, 0.4, 0.4, 1.5)]),
        ];
        assert!(matches!(
            extract_candidates(&frames, 0.3, 0.5, 1, 2),
            Err(Error::Validation {
                field: "confidence",
                ..
            })
        ));
    }

    #[test]
    fn context_window_carries_frame_source_refs() {
        let mut frames: Vec<Frame> = (0..6)
            .map(|i| {
                let mut frame = Frame::new(vec![]);
                frame.source_ref = Some(format!("frames/{i:04}.jpg"));
                frame
            })
            .collect();
        frames[3].detections.push(det(0.1, 0.1, 0.3, 0.3, 0.9));

        let cands = extract_candidates(&frames, 0.3, 0.5, 1, 2).unwrap();
        assert_eq!(cands.len(), 1);

        let refs: Vec<_> = cands[0].context_frames.iter().map(|r| r.index).collect();
        assert_eq!(refs, vec![1, 2, 3, 4, 5]);
        assert_eq!(
            cands[0].context_frames[0].source_ref.as_deref(),
            Some("frames/0001.jpg")
        );
    }
}
