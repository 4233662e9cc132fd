use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb};

/// One predicted bounding box in one frame.
///
/// `class_label` is carried through unchanged and never drives clustering;
/// `source_ref` is an opaque handle (label-file path, detection id) used by
/// collaborators to resolve the frame image later.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Detection {
    #[serde(default)]
    pub frame_index: usize,
    pub bbox: BBox<Ltrb>,
    #[serde(rename = "p")]
    pub confidence: f32,
    #[serde(rename = "c")]
    pub class_label: String,
    #[serde(default)]
    pub source_ref: Option<String>,
}

impl Detection {
    pub fn new(frame_index: usize, bbox: BBox<Ltrb>, confidence: f32, class_label: &str) -> Self {
        Self {
            frame_index,
            bbox,
            confidence,
            class_label: class_label.to_string(),
            source_ref: None,
        }
    }

    #[inline]
    pub fn iou(&self, other: &Detection) -> f32 {
        self.bbox.iou(&other.bbox)
    }
}
