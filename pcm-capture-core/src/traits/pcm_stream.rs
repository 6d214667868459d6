use crate::models::config::StreamConfig;
use crate::models::error::CaptureError;

/// An opened, parameter-negotiated capture handle.
///
/// Implemented by:
/// - `AlsaPcm` (Linux)
/// - `MockCaptureStream` (tests)
///
/// Once background capture starts, the handle is moved into the reader
/// thread and nothing else touches it until the session is stopped.
pub trait PcmStream: Send + 'static {
    /// The negotiated stream parameters.
    fn config(&self) -> StreamConfig;

    /// Blocking read of `frames` interleaved frames into `buf`.
    ///
    /// Returns the number of frames read. A hardware overrun is reported
    /// as `Err(CaptureError::Overrun)`; the stream then needs `prepare`.
    fn read_frames(&mut self, buf: &mut [u8], frames: usize) -> Result<usize, CaptureError>;

    /// Reset the stream after an xrun so reads can continue.
    fn prepare(&mut self) -> Result<(), CaptureError>;
}

/// An opened, parameter-negotiated playback handle.
pub trait PcmSink: Send {
    /// The negotiated stream parameters.
    fn config(&self) -> StreamConfig;

    /// Blocking write of `frames` interleaved frames from `buf`.
    ///
    /// Returns the number of frames written. A hardware underrun is
    /// reported as `Err(CaptureError::Underrun)`.
    fn write_frames(&mut self, buf: &[u8], frames: usize) -> Result<usize, CaptureError>;

    /// Reset the stream after an xrun so writes can continue.
    fn prepare(&mut self) -> Result<(), CaptureError>;
}
