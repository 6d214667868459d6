use thiserror::Error;

/// Errors that can occur while capturing or playing back PCM audio.
///
/// Ring-level overrun is not an error: `poll` reports it as a flag next to
/// successfully delivered data. `Overrun` here is the hardware xrun reported
/// by a blocking read, or the overrun surfaced by `CaptureDevice::read`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("buffer size must match period: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("sample width mismatch: format uses {expected} bytes, buffer elements are {actual}")]
    SampleWidthMismatch { expected: usize, actual: usize },

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("reader thread already running")]
    AlreadyRunning,

    #[error("reader thread not started")]
    NotStarted,

    #[error("capture session stopped")]
    Stopped,

    #[error("overrun")]
    Overrun,

    #[error("underrun")]
    Underrun,

    #[error("device error: {0}")]
    Device(String),

    #[error("unknown error: {0}")]
    Unknown(String),
}
