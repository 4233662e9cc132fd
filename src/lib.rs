pub mod bbox;
pub mod candidate;
pub mod chain;
pub mod context;
pub mod detection;
pub mod error;
pub mod extractor;
pub mod frame;
pub mod nms;
pub mod pool;
pub mod validate;
pub mod yolo;

pub use candidate::Candidate;
pub use context::{FrameRef, FrameResolver};
pub use detection::Detection;
pub use error::Error;
pub use extractor::{extract_candidates, Extractor, ExtractorConfig};
pub use frame::Frame;
pub use nms::NmsMode;
