//! Control-path errors.
//!
//! The render path never returns these: anything that goes wrong while a
//! block is being produced degrades to silence and is reported through the
//! realtime logger instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("no track at index {0}")]
    NoSuchTrack(usize),

    #[error("track limit of {max} reached")]
    TrackLimit { max: usize },

    #[error("{queue} queue is full")]
    QueueFull { queue: &'static str },

    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("track {0} has no adjustable synthesizer")]
    NoParameters(usize),
}

pub type Result<T> = std::result::Result<T, EngineError>;
