//! Error Types
//!
//! Failure taxonomy shared by the encoder, builder and resolver.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A character outside the 64-symbol alphabet.
    #[error("invalid base64 symbol {0:?}")]
    InvalidSymbol(char),

    /// A VLQ sequence or mapping segment that is structurally broken.
    #[error("malformed VLQ data: {0}")]
    MalformedVlq(&'static str),

    /// A record references a source or name outside the document lists.
    #[error("{kind} index {index} is out of range for {len} entries")]
    IndexOutOfRange {
        kind: &'static str,
        index: u32,
        len: usize,
    },

    /// A lookup position that cannot exist.
    #[error("invalid lookup position")]
    InvalidQuery,

    /// The document is not valid JSON.
    #[error("source map syntax error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document or URL is not a usable source map.
    #[error("unsupported source map format")]
    UnsupportedFormat,
}
