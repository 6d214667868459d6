use std::sync::Arc;

use crate::models::error::CaptureError;
use crate::processing::period_buffer::PeriodBuffer;
use crate::traits::pcm_stream::PcmStream;

use super::shared::SharedRing;

/// Reader thread body.
///
/// Sequence per period:
/// 1. Blocking read of one period into the private scratch buffer
/// 2. Hardware overrun: prepare the stream and read again
/// 3. Any other error: record it, end the session, exit
/// 4. Reserve + commit the period into the ring, wake the consumer
///
/// Returns the stream so the owner can take the handle back; the loop
/// never closes it. If the stream panics, the session is failed on unwind
/// so a waiting consumer is released.
pub(crate) fn run<S: PcmStream>(mut stream: S, shared: Arc<SharedRing>, period_frames: usize) -> S {
    let _guard = FailOnPanic { shared: &shared };
    let period_bytes = stream.config().period_bytes();
    let mut scratch = PeriodBuffer::new(period_bytes);

    while !shared.stop_requested() {
        match read_period(&mut stream, scratch.as_bytes_mut(), period_frames) {
            Ok(()) => {
                if !shared.publish(&mut scratch) {
                    break;
                }
            }
            Err(CaptureError::Overrun) => {
                shared.record_hardware_overrun();
                log::warn!("Hardware overrun, preparing stream and retrying read");
                if let Err(e) = stream.prepare() {
                    log::error!("Failed to recover from overrun: {}", e);
                    shared.fail(e);
                    break;
                }
            }
            Err(e) => {
                if !shared.stop_requested() {
                    log::error!("Capture read error: {}", e);
                    shared.fail(e);
                }
                break;
            }
        }
    }

    log::debug!("Reader thread exiting");
    stream
}

struct FailOnPanic<'a> {
    shared: &'a SharedRing,
}

impl Drop for FailOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            log::error!("Reader thread panicked");
            self.shared.fail(CaptureError::Unknown("reader thread panicked".into()));
        }
    }
}

/// Read exactly `frames` frames, continuing after short reads.
fn read_period<S: PcmStream>(stream: &mut S, buf: &mut [u8], frames: usize) -> Result<(), CaptureError> {
    let frame_bytes = buf.len() / frames.max(1);
    let mut done = 0;
    while done < frames {
        let n = stream.read_frames(&mut buf[done * frame_bytes..], frames - done)?;
        if n == 0 {
            return Err(CaptureError::Device("read returned no frames".into()));
        }
        done += n;
    }
    Ok(())
}
