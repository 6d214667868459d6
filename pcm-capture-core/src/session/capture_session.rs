use std::sync::Arc;
use std::thread;

use uuid::Uuid;

use crate::models::config::StreamConfig;
use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::CaptureError;
use crate::models::state::CaptureState;
use crate::traits::pcm_stream::PcmStream;

use super::capture_loop;
use super::shared::SharedRing;

/// Background capture session.
///
/// Owns the capture handle for its whole lifetime: the stream is moved
/// into a dedicated reader thread that fills a ring of one-period slots,
/// and the application drains that ring with [`poll`](Self::poll).
///
/// ```text
/// [PcmStream] → reader thread → [RingStore] → poll() → caller buffer
/// ```
///
/// The ring holds about one second of audio. When the consumer falls a
/// full ring behind, the reader overwrites the oldest unread period and the
/// next `poll` reports the gap.
pub struct CaptureSession<S: PcmStream> {
    config: StreamConfig,
    shared: Arc<SharedRing>,
    reader_handle: Option<thread::JoinHandle<S>>,
}

impl<S: PcmStream> CaptureSession<S> {
    /// Take ownership of `stream` and start the reader thread.
    pub fn start(stream: S) -> Result<Self, CaptureError> {
        let config = stream.config();
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let shared = Arc::new(SharedRing::new(&config));
        let reader_shared = Arc::clone(&shared);
        let period_frames = config.period_frames;

        let handle = thread::Builder::new()
            .name("pcm-capture-reader".into())
            .spawn(move || capture_loop::run(stream, reader_shared, period_frames))
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn reader thread: {}", e)))?;

        let session = Self {
            config,
            shared,
            reader_handle: Some(handle),
        };
        log::info!(
            "Capture session {} started: {} bytes/period, {} periods buffered",
            session.id(),
            config.period_bytes(),
            config.ring_depth()
        );
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.shared.diagnostics().session_id
    }

    pub fn config(&self) -> StreamConfig {
        self.config
    }

    /// Copy the next captured period into `dest`, blocking until one is ready.
    ///
    /// `dest` must be exactly one period long; any other size fails with
    /// `SizeMismatch` before the ring is touched. On success, returns whether
    /// periods were lost since the previous poll. The data in `dest` is valid
    /// either way. Once the session has stopped or failed, returns
    /// `Stopped` or the recorded hardware error without blocking.
    pub fn poll(&self, dest: &mut [u8]) -> Result<bool, CaptureError> {
        let expected = self.config.period_bytes();
        if dest.len() != expected {
            return Err(CaptureError::SizeMismatch {
                expected,
                actual: dest.len(),
            });
        }
        self.shared.wait_and_consume(dest)
    }

    /// A handle that can stop this session from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Stop the session and wait for the reader thread to hand the stream back.
    ///
    /// The reader exits after its in-flight read returns. Returns `None` if
    /// the stream was already taken back.
    pub fn stop(&mut self) -> Option<S> {
        self.shared.request_stop();
        let handle = self.reader_handle.take()?;
        match handle.join() {
            Ok(stream) => {
                log::info!("Capture session {} stopped", self.id());
                Some(stream)
            }
            Err(_) => {
                log::error!("Reader thread panicked; capture handle lost");
                None
            }
        }
    }

    pub fn state(&self) -> CaptureState {
        self.shared.state()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_capturing()
    }

    /// Periods waiting to be polled.
    pub fn pending_periods(&self) -> usize {
        self.shared.filled_count()
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        self.shared.diagnostics()
    }
}

impl<S: PcmStream> Drop for CaptureSession<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start background capture on `stream`.
pub fn start_capture<S: PcmStream>(stream: S) -> Result<CaptureSession<S>, CaptureError> {
    CaptureSession::start(stream)
}

/// Cloneable stop request for a [`CaptureSession`].
///
/// Stopping releases any consumer blocked in `poll` right away; the reader
/// thread exits after its current read. Idempotent.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<SharedRing>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.shared.request_stop();
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.state().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::mock::{MockCaptureStream, MockFeeder};
    use crate::models::format::SampleFormat;

    /// 2 channels × S16 × 2 frames = 8-byte periods; rate 8 gives a 4-slot ring.
    fn small_config() -> StreamConfig {
        StreamConfig::new(2, SampleFormat::S16LE, 8, 2)
    }

    fn period(tag: u8) -> Vec<u8> {
        vec![tag; 8]
    }

    fn wait_for_pending(session: &CaptureSession<MockCaptureStream>, count: usize) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while session.pending_periods() < count || session.diagnostics().periods_captured < count as u64 {
            assert!(Instant::now() < deadline, "reader never buffered {} periods", count);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn wait_for_captured(session: &CaptureSession<MockCaptureStream>, count: u64) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while session.diagnostics().periods_captured < count {
            assert!(Instant::now() < deadline, "reader never captured {} periods", count);
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    fn started() -> (CaptureSession<MockCaptureStream>, MockFeeder) {
        let (stream, feeder) = MockCaptureStream::new(small_config());
        let session = CaptureSession::start(stream).unwrap();
        (session, feeder)
    }

    #[test]
    fn ring_depth_is_one_second() {
        let (session, _feeder) = started();
        assert_eq!(session.diagnostics().ring_depth, 4);
        assert_eq!(session.diagnostics().period_bytes, 8);
    }

    #[test]
    fn keeping_pace_delivers_every_period_in_order() {
        let (session, feeder) = started();
        let mut dest = [0u8; 8];

        for tag in 0..32u8 {
            feeder.period(period(tag));
            assert_eq!(session.poll(&mut dest), Ok(false));
            assert_eq!(dest, [tag; 8]);
        }

        let diagnostics = session.diagnostics();
        assert_eq!(diagnostics.periods_delivered, 32);
        assert_eq!(diagnostics.ring_overruns, 0);
    }

    #[test]
    fn poll_blocks_until_a_period_arrives() {
        let (session, feeder) = started();

        let producer = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            feeder.period(period(7));
            feeder
        });

        let mut dest = [0u8; 8];
        assert_eq!(session.poll(&mut dest), Ok(false));
        assert_eq!(dest, [7; 8]);
        drop(producer.join().unwrap());
    }

    #[test]
    fn one_period_past_full_loses_the_oldest() {
        let (session, feeder) = started();
        for tag in 0..5 {
            feeder.period(period(tag));
        }
        wait_for_pending(&session, 4);
        wait_for_captured(&session, 5);

        let mut dest = [0u8; 8];
        assert_eq!(session.poll(&mut dest), Ok(true));
        assert_eq!(dest, [1; 8]);
        for tag in 2..5 {
            assert_eq!(session.poll(&mut dest), Ok(false));
            assert_eq!(dest, [tag; 8]);
        }
        assert_eq!(session.diagnostics().periods_evicted, 1);
    }

    #[test]
    fn starved_consumer_gets_overrun_once() {
        let (session, feeder) = started();
        // depth + 2 periods before the first poll
        for tag in 0..6 {
            feeder.period(period(tag));
        }
        wait_for_captured(&session, 6);

        let mut dest = [0u8; 8];
        assert_eq!(session.poll(&mut dest), Ok(true));
        assert_eq!(dest, [2; 8]);
        assert_eq!(session.poll(&mut dest), Ok(false));
        assert_eq!(dest, [3; 8]);

        let diagnostics = session.diagnostics();
        assert_eq!(diagnostics.periods_evicted, 2);
        assert_eq!(diagnostics.ring_overruns, 1);
    }

    #[test]
    fn wrong_size_buffer_is_rejected_without_consuming() {
        let (session, feeder) = started();
        feeder.period(period(3));
        wait_for_pending(&session, 1);

        let mut short = [0u8; 4];
        let mut long = [0u8; 16];
        assert_eq!(
            session.poll(&mut short),
            Err(CaptureError::SizeMismatch { expected: 8, actual: 4 })
        );
        assert_eq!(
            session.poll(&mut long),
            Err(CaptureError::SizeMismatch { expected: 8, actual: 16 })
        );
        assert_eq!(session.pending_periods(), 1);

        let mut dest = [0u8; 8];
        assert_eq!(session.poll(&mut dest), Ok(false));
        assert_eq!(dest, [3; 8]);
    }

    #[test]
    fn hardware_overrun_is_recovered_transparently() {
        let (session, feeder) = started();
        feeder.period(period(1));
        feeder.overrun();
        feeder.period(period(2));

        let mut dest = [0u8; 8];
        assert_eq!(session.poll(&mut dest), Ok(false));
        assert_eq!(dest, [1; 8]);
        assert_eq!(session.poll(&mut dest), Ok(false));
        assert_eq!(dest, [2; 8]);
        assert!(session.is_running());
        assert_eq!(session.diagnostics().hardware_overruns, 1);
        assert_eq!(feeder.prepare_count(), 1);
    }

    #[test]
    fn failed_overrun_recovery_ends_the_session() {
        let (stream, feeder) = MockCaptureStream::new(small_config());
        let stream = stream.with_failing_prepare(CaptureError::Device("prepare failed".into()));
        let session = CaptureSession::start(stream).unwrap();
        feeder.overrun();

        let mut dest = [0u8; 8];
        let expected = Err(CaptureError::Device("prepare failed".into()));
        assert_eq!(session.poll(&mut dest), expected);
        assert_eq!(session.poll(&mut dest), expected);
        assert_eq!(
            session.state(),
            CaptureState::Failed(CaptureError::Device("prepare failed".into()))
        );
        assert_eq!(feeder.prepare_count(), 1);
        assert_eq!(session.diagnostics().hardware_overruns, 1);
    }

    struct PanickingStream;

    impl PcmStream for PanickingStream {
        fn config(&self) -> StreamConfig {
            small_config()
        }

        fn read_frames(&mut self, _buf: &mut [u8], _frames: usize) -> Result<usize, CaptureError> {
            panic!("driver bug");
        }

        fn prepare(&mut self) -> Result<(), CaptureError> {
            Ok(())
        }
    }

    #[test]
    fn reader_panic_releases_a_blocked_consumer() {
        let mut session = CaptureSession::start(PanickingStream).unwrap();
        let stop = session.stop_handle();
        let (tx, rx) = crossbeam_channel::bounded(1);

        std::thread::scope(|scope| {
            scope.spawn(|| {
                let mut dest = [0u8; 8];
                let _ = tx.send(session.poll(&mut dest));
            });
            let result = rx.recv_timeout(Duration::from_secs(2));
            // Unblock the consumer so a regression fails instead of hanging.
            stop.stop();
            assert_eq!(result, Ok(Err(CaptureError::Unknown("reader thread panicked".into()))));
        });

        assert!(matches!(session.state(), CaptureState::Failed(CaptureError::Unknown(_))));
        assert!(session.stop().is_none());
    }

    #[test]
    fn fatal_error_is_returned_by_every_poll() {
        let (session, feeder) = started();
        feeder.fail(CaptureError::Device("input/output error".into()));

        let mut dest = [0u8; 8];
        let expected = Err(CaptureError::Device("input/output error".into()));
        assert_eq!(session.poll(&mut dest), expected);
        assert_eq!(session.poll(&mut dest), expected);
        assert_eq!(
            session.state(),
            CaptureState::Failed(CaptureError::Device("input/output error".into()))
        );
    }

    #[test]
    fn stop_releases_a_blocked_consumer() {
        let (session, _feeder) = started();
        let stop = session.stop_handle();

        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            stop.stop();
        });

        let mut dest = [0u8; 8];
        assert_eq!(session.poll(&mut dest), Err(CaptureError::Stopped));
        stopper.join().unwrap();
    }

    #[test]
    fn poll_after_stop_returns_promptly() {
        let (mut session, feeder) = started();
        feeder.period(period(1));
        wait_for_pending(&session, 1);

        session.stop_handle().stop();
        feeder.period(period(2));
        assert!(session.stop().is_some());

        let started_at = Instant::now();
        let mut dest = [0u8; 8];
        assert_eq!(session.poll(&mut dest), Err(CaptureError::Stopped));
        assert!(started_at.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn stop_is_idempotent_and_returns_the_stream_once() {
        let (mut session, feeder) = started();
        let stop = session.stop_handle();
        stop.stop();
        stop.stop();
        assert!(stop.is_stopped());

        // Unblock the in-flight read so the reader can exit.
        feeder.period(period(0));
        let stream = session.stop();
        assert!(stream.is_some());
        assert!(session.stop().is_none());
        assert_eq!(session.state(), CaptureState::Stopped);
    }

    #[test]
    fn stop_after_failure_keeps_the_error() {
        let (mut session, feeder) = started();
        feeder.fail(CaptureError::Device("gone".into()));

        let mut dest = [0u8; 8];
        assert!(session.poll(&mut dest).is_err());
        assert!(session.stop().is_some());
        assert_eq!(session.poll(&mut dest), Err(CaptureError::Device("gone".into())));
    }

    #[test]
    fn short_reads_are_assembled_into_one_period() {
        let (stream, feeder) = MockCaptureStream::new(small_config());
        let session = CaptureSession::start(stream.with_max_frames_per_read(1)).unwrap();
        feeder.period(vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let mut dest = [0u8; 8];
        assert_eq!(session.poll(&mut dest), Ok(false));
        assert_eq!(dest, [1, 2, 3, 4, 5, 6, 7, 8]);

        // Closing the feeder ends the reader's next blocking read.
        drop(feeder);
        drop(session);
    }

    #[test]
    fn invalid_config_is_rejected_before_spawning() {
        let (stream, _feeder) = MockCaptureStream::new(StreamConfig::new(2, SampleFormat::S16LE, 8, 0));
        assert!(matches!(
            CaptureSession::start(stream),
            Err(CaptureError::ConfigurationFailed(_))
        ));
    }

    #[test]
    fn diagnostics_export_as_json() {
        let (session, _feeder) = started();
        let json = session.diagnostics().to_json().unwrap();
        assert!(json.contains("\"session_id\""));
        assert!(json.contains("\"ring_depth\": 4"));
    }
}
