use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A detection failed ingestion checks; the whole sequence batch is rejected.
    #[error("invalid {field}: {value}")]
    Validation { field: &'static str, value: f32 },

    /// A prediction label file could not be parsed.
    #[error("{path}:{line}: {reason}")]
    Label {
        path: String,
        line: usize,
        reason: String,
    },

    /// A context frame could not be resolved to image bytes.
    #[error("frame {index} unavailable")]
    FrameUnavailable { index: usize },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
