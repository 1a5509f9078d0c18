//! Sampling failure reasons
//!
//! Every sampler returns `Result<T, SampleError>`. The store decides, per
//! metric, whether a failure keeps the previous value or resets the field.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("failed to read {what}: {source}")]
    Io {
        what: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    #[error("interface {0} has no IPv4 address")]
    NoAddress(String),

    #[error("ping exited with {0}")]
    PingFailed(String),

    #[error("ping output contained no round-trip times")]
    NoReplies,

    #[error("{0} unavailable")]
    Unavailable(&'static str),
}

impl SampleError {
    pub fn io(what: &'static str, source: std::io::Error) -> Self {
        SampleError::Io { what, source }
    }
}
