use thiserror::Error;

/// Rejected input chunk. The ring buffer is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("chunk of {len} values is not a whole number of {channels}-channel samples")]
    UnpairedChunk { len: usize, channels: usize },
}

/// A parameter outside its declared domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} = {value} is outside {min}..={max}")]
    OutOfRange {
        name: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f32 },
    #[error("history depth {0} is not one of the supported sizes")]
    UnsupportedHistory(usize),
}
