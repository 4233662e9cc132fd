use serde_derive::{Deserialize, Serialize};

use crate::detection::Detection;

/// One frame of a sequence: zero or more detections plus an opaque handle
/// for the frame image.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Frame {
    #[serde(default)]
    pub source_ref: Option<String>,
    pub detections: Vec<Detection>,
}

impl Frame {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            source_ref: None,
            detections,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
