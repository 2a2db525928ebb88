use std::time::Duration;

use thiserror::Error;

type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// A failed join attempt. The variant names the step that failed.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to load conferencing backend for {domain}")]
    Load {
        domain: String,
        #[source]
        source: BackendError,
    },

    #[error("connection to {domain} failed")]
    Connection {
        domain: String,
        #[source]
        source: BackendError,
    },

    #[error("local media capture failed")]
    Capture(#[source] BackendError),

    #[error("joining room {room} failed")]
    Join {
        room: String,
        #[source]
        source: BackendError,
    },

    #[error("publishing local {kind} track {track_id} failed")]
    Publish {
        kind: String,
        track_id: String,
        #[source]
        source: BackendError,
    },

    #[error("joining room {room} timed out after {timeout:?}")]
    Timeout { room: String, timeout: Duration },
}

/// Capture finished but produced no camera track.
#[derive(Debug, Error)]
#[error("captured local tracks contain no video track")]
pub struct NoLocalVideo;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number of seconds, got {value:?}")]
    InvalidSeconds { var: &'static str, value: String },

    #[error("{var} must be true or false, got {value:?}")]
    InvalidFlag { var: &'static str, value: String },
}
