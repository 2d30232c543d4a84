use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommediaError>;

#[derive(Debug, Error)]
pub enum CommediaError {
    /// A cantica name that maps to none of the three short codes.
    #[error("unrecognized cantica: {0:?}")]
    UnknownPart(String),

    #[error("invalid noise pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid page range: document has pages 1..{pages}, requested {start}..{end}")]
    PageRange { pages: usize, start: usize, end: usize },
}
