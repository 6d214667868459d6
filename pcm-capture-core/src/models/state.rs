use super::error::CaptureError;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// capturing → stopped
///     ↓
///   failed
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState {
    Capturing,
    Stopped,
    Failed(CaptureError),
}

impl CaptureState {
    pub fn is_capturing(&self) -> bool {
        matches!(self, Self::Capturing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed(_))
    }

    /// The error a consumer receives once the session has ended.
    pub fn terminal_error(&self) -> Option<CaptureError> {
        match self {
            Self::Capturing => None,
            Self::Stopped => Some(CaptureError::Stopped),
            Self::Failed(err) => Some(err.clone()),
        }
    }
}
