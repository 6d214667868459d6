use crate::models::config::StreamConfig;
use crate::models::error::CaptureError;
use crate::models::format::{check_sample_width, samples_to_bytes, Sample};
use crate::traits::pcm_stream::PcmSink;

/// Direct synchronous playback on an opened sink.
pub struct PlaybackDevice<S: PcmSink> {
    config: StreamConfig,
    sink: S,
    byte_scratch: Vec<u8>,
}

impl<S: PcmSink> PlaybackDevice<S> {
    /// Wrap an opened sink. Fails if the sink reports an unusable config.
    pub fn new(sink: S) -> Result<Self, CaptureError> {
        let config = sink.config();
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        Ok(Self {
            config,
            sink,
            byte_scratch: Vec::new(),
        })
    }

    pub fn config(&self) -> StreamConfig {
        self.config
    }

    /// Write interleaved bytes, returning the number of samples written.
    ///
    /// Trailing bytes that do not fill a whole frame are ignored. On a
    /// hardware underrun the sink is prepared and `Err(Underrun)` returned.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, CaptureError> {
        let frame_bytes = self.config.frame_bytes();
        let frames = buf.len() / frame_bytes;

        match self.sink.write_frames(&buf[..frames * frame_bytes], frames) {
            Ok(n) => Ok(n * self.config.channels),
            Err(CaptureError::Underrun) => {
                self.sink.prepare()?;
                Err(CaptureError::Underrun)
            }
            Err(e) => Err(e),
        }
    }

    /// Typed write; `T` must have the same width as the sink's sample format.
    pub fn write<T: Sample>(&mut self, buf: &[T]) -> Result<usize, CaptureError> {
        check_sample_width::<T>(self.config.format)?;

        let mut scratch = std::mem::take(&mut self.byte_scratch);
        scratch.resize(buf.len() * T::WIDTH, 0);
        samples_to_bytes(buf, &mut scratch);
        let result = self.write_bytes(&scratch);
        self.byte_scratch = scratch;
        result
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}
