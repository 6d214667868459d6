use crate::models::config::StreamConfig;
use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::CaptureError;
use crate::models::format::{bytes_to_samples, check_sample_width, Sample};
use crate::models::state::CaptureState;
use crate::session::capture_session::{CaptureSession, StopHandle};
use crate::traits::pcm_stream::PcmStream;

/// A capture handle plus its optional background reader.
///
/// Without a reader thread, reads go straight to the hardware. After
/// [`start_read_thread`](Self::start_read_thread) the handle belongs to the
/// session and reads are served from its ring, one period at a time.
pub struct CaptureDevice<S: PcmStream> {
    config: StreamConfig,
    stream: Option<S>,
    session: Option<CaptureSession<S>>,
    byte_scratch: Vec<u8>,
}

impl<S: PcmStream> CaptureDevice<S> {
    /// Wrap an opened stream. Fails if the stream reports an unusable config.
    pub fn new(stream: S) -> Result<Self, CaptureError> {
        let config = stream.config();
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        Ok(Self {
            config,
            stream: Some(stream),
            session: None,
            byte_scratch: Vec::new(),
        })
    }

    pub fn config(&self) -> StreamConfig {
        self.config
    }

    pub fn is_reading_in_background(&self) -> bool {
        self.session.is_some()
    }

    /// Hand the stream to a new background capture session.
    pub fn start_read_thread(&mut self) -> Result<(), CaptureError> {
        if self.session.is_some() {
            return Err(CaptureError::AlreadyRunning);
        }

        let stream = self.stream.take().ok_or_else(handle_lost)?;
        self.session = Some(CaptureSession::start(stream)?);
        Ok(())
    }

    /// Stop the background reader, if any, and take the stream back.
    pub fn stop_read_thread(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Some(stream) = session.stop() {
                self.stream = Some(stream);
            }
        }
    }

    /// Stop handle for the running session, usable from another thread.
    pub fn stop_handle(&self) -> Option<StopHandle> {
        self.session.as_ref().map(CaptureSession::stop_handle)
    }

    /// Copy the next buffered period into `dest`; see [`CaptureSession::poll`].
    pub fn poll(&self, dest: &mut [u8]) -> Result<bool, CaptureError> {
        self.session
            .as_ref()
            .ok_or(CaptureError::NotStarted)?
            .poll(dest)
    }

    /// Read interleaved bytes, returning the number of samples read.
    ///
    /// With a reader thread running, `buf` must hold exactly one period and
    /// a ring overrun is reported as `Err(Overrun)`; `buf` still holds the
    /// next period in that case. Otherwise this is a blocking hardware read
    /// of `buf.len() / frame_bytes` frames, and a hardware overrun prepares
    /// the stream and returns `Err(Overrun)`.
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        if let Some(session) = &self.session {
            if session.poll(buf)? {
                return Err(CaptureError::Overrun);
            }
            return Ok(self.config.period_samples());
        }

        let frame_bytes = self.config.frame_bytes();
        let frames = buf.len() / frame_bytes;
        let stream = self.stream.as_mut().ok_or_else(handle_lost)?;

        match stream.read_frames(&mut buf[..frames * frame_bytes], frames) {
            Ok(n) => Ok(n * self.config.channels),
            Err(CaptureError::Overrun) => {
                stream.prepare()?;
                Err(CaptureError::Overrun)
            }
            Err(e) => Err(e),
        }
    }

    /// Typed read; `T` must have the same width as the stream's sample format.
    pub fn read<T: Sample>(&mut self, buf: &mut [T]) -> Result<usize, CaptureError> {
        check_sample_width::<T>(self.config.format)?;

        let mut scratch = std::mem::take(&mut self.byte_scratch);
        scratch.resize(buf.len() * T::WIDTH, 0);
        let result = self.read_bytes(&mut scratch);

        match &result {
            Ok(samples) => bytes_to_samples(&scratch[..samples * T::WIDTH], buf),
            Err(CaptureError::Overrun) if self.session.is_some() => bytes_to_samples(&scratch, buf),
            Err(_) => {}
        }
        self.byte_scratch = scratch;
        result
    }

    pub fn state(&self) -> Option<CaptureState> {
        self.session.as_ref().map(CaptureSession::state)
    }

    pub fn diagnostics(&self) -> Option<CaptureDiagnostics> {
        self.session.as_ref().map(CaptureSession::diagnostics)
    }

    /// Stop any reader thread and give the stream back to the caller.
    pub fn into_stream(mut self) -> Option<S> {
        self.stop_read_thread();
        self.stream.take()
    }
}

impl<S: PcmStream> Drop for CaptureDevice<S> {
    fn drop(&mut self) {
        self.stop_read_thread();
    }
}

fn handle_lost() -> CaptureError {
    CaptureError::Unknown("capture handle is no longer available".into())
}
