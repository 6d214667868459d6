//! Scripted PCM handles for testing without hardware.
//!
//! A [`MockCaptureStream`] blocks in `read_frames` until its [`MockFeeder`]
//! supplies the next step, the same way a real capture handle blocks until
//! the hardware delivers a period. Dropping the feeder makes the next read
//! fail, which ends any reader thread still waiting on it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use crate::models::config::StreamConfig;
use crate::models::error::CaptureError;
use crate::traits::pcm_stream::{PcmSink, PcmStream};

/// One scripted outcome of a hardware read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockStep {
    /// Raw interleaved bytes, handed out across as many reads as needed.
    Data(Vec<u8>),
    /// The next read reports a hardware overrun.
    Overrun,
    /// The next read fails with this error.
    Fail(CaptureError),
}

/// Test-side handle that scripts a [`MockCaptureStream`].
#[derive(Clone)]
pub struct MockFeeder {
    tx: Sender<MockStep>,
    prepares: Arc<AtomicUsize>,
}

impl MockFeeder {
    pub fn push(&self, step: MockStep) {
        // The stream may already be gone; the step is simply never read.
        let _ = self.tx.send(step);
    }

    pub fn period(&self, bytes: Vec<u8>) {
        self.push(MockStep::Data(bytes));
    }

    pub fn overrun(&self) {
        self.push(MockStep::Overrun);
    }

    pub fn fail(&self, err: CaptureError) {
        self.push(MockStep::Fail(err));
    }

    /// How many times the stream has been prepared.
    pub fn prepare_count(&self) -> usize {
        self.prepares.load(Ordering::SeqCst)
    }
}

/// Capture handle driven by a [`MockFeeder`].
pub struct MockCaptureStream {
    config: StreamConfig,
    rx: Receiver<MockStep>,
    pending: Vec<u8>,
    cursor: usize,
    max_frames_per_read: Option<usize>,
    prepare_error: Option<CaptureError>,
    prepares: Arc<AtomicUsize>,
}

impl MockCaptureStream {
    pub fn new(config: StreamConfig) -> (Self, MockFeeder) {
        let (tx, rx) = unbounded();
        let prepares = Arc::new(AtomicUsize::new(0));
        let stream = Self {
            config,
            rx,
            pending: Vec::new(),
            cursor: 0,
            max_frames_per_read: None,
            prepare_error: None,
            prepares: Arc::clone(&prepares),
        };
        (stream, MockFeeder { tx, prepares })
    }

    /// Deliver at most `frames` frames per read, forcing short reads.
    pub fn with_max_frames_per_read(mut self, frames: usize) -> Self {
        self.max_frames_per_read = Some(frames.max(1));
        self
    }

    /// Make every `prepare` fail with `err` (still counted).
    pub fn with_failing_prepare(mut self, err: CaptureError) -> Self {
        self.prepare_error = Some(err);
        self
    }
}

impl PcmStream for MockCaptureStream {
    fn config(&self) -> StreamConfig {
        self.config
    }

    fn read_frames(&mut self, buf: &mut [u8], frames: usize) -> Result<usize, CaptureError> {
        if self.cursor >= self.pending.len() {
            match self.rx.recv() {
                Ok(MockStep::Data(bytes)) => {
                    self.pending = bytes;
                    self.cursor = 0;
                }
                Ok(MockStep::Overrun) => return Err(CaptureError::Overrun),
                Ok(MockStep::Fail(err)) => return Err(err),
                Err(_) => return Err(CaptureError::Device("mock stream closed".into())),
            }
        }

        let frame_bytes = self.config.frame_bytes();
        let available = (self.pending.len() - self.cursor) / frame_bytes;
        let n = frames
            .min(available)
            .min(self.max_frames_per_read.unwrap_or(usize::MAX));
        let len = n * frame_bytes;

        buf[..len].copy_from_slice(&self.pending[self.cursor..self.cursor + len]);
        self.cursor += len;
        Ok(n)
    }

    fn prepare(&mut self) -> Result<(), CaptureError> {
        self.prepares.fetch_add(1, Ordering::SeqCst);
        match &self.prepare_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// Playback handle that records every write.
pub struct MockPlaybackStream {
    config: StreamConfig,
    written: Arc<Mutex<Vec<u8>>>,
    underruns_left: usize,
    prepares: usize,
}

impl MockPlaybackStream {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            written: Arc::new(Mutex::new(Vec::new())),
            underruns_left: 0,
            prepares: 0,
        }
    }

    /// Make the next `count` writes report an underrun.
    pub fn with_underruns(mut self, count: usize) -> Self {
        self.underruns_left = count;
        self
    }

    /// Shared view of all bytes accepted so far.
    pub fn written(&self) -> Arc<Mutex<Vec<u8>>> {
        Arc::clone(&self.written)
    }

    pub fn prepare_count(&self) -> usize {
        self.prepares
    }
}

impl PcmSink for MockPlaybackStream {
    fn config(&self) -> StreamConfig {
        self.config
    }

    fn write_frames(&mut self, buf: &[u8], frames: usize) -> Result<usize, CaptureError> {
        if self.underruns_left > 0 {
            self.underruns_left -= 1;
            return Err(CaptureError::Underrun);
        }
        let len = frames * self.config.frame_bytes();
        self.written.lock().extend_from_slice(&buf[..len]);
        Ok(frames)
    }

    fn prepare(&mut self) -> Result<(), CaptureError> {
        self.prepares += 1;
        Ok(())
    }
}
