use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Condvar, Mutex};

use crate::models::config::StreamConfig;
use crate::models::diagnostics::CaptureDiagnostics;
use crate::models::error::CaptureError;
use crate::models::state::CaptureState;
use crate::processing::period_buffer::PeriodBuffer;
use crate::processing::ring_store::RingStore;

/// Ring state guarded by the session mutex.
struct RingState {
    store: RingStore,
    state: CaptureState,
    diagnostics: CaptureDiagnostics,
}

/// The one piece of state shared by the reader thread and the consumer.
///
/// The mutex is held only for index/flag bookkeeping and a single-slot
/// copy, never across a hardware read.
pub(crate) struct SharedRing {
    inner: Mutex<RingState>,
    ready: Condvar,
    stop_requested: AtomicBool,
}

impl SharedRing {
    pub(crate) fn new(config: &StreamConfig) -> Self {
        let period_bytes = config.period_bytes();
        let depth = config.ring_depth();
        Self {
            inner: Mutex::new(RingState {
                store: RingStore::new(depth, period_bytes),
                state: CaptureState::Capturing,
                diagnostics: CaptureDiagnostics::new(period_bytes, depth),
            }),
            ready: Condvar::new(),
            stop_requested: AtomicBool::new(false),
        }
    }

    /// Producer side: reserve the next slot and publish a freshly read period.
    ///
    /// `period` comes back holding the displaced slot buffer. Returns `false`
    /// once the session has ended and the reader should exit.
    pub(crate) fn publish(&self, period: &mut PeriodBuffer) -> bool {
        let mut guard = self.inner.lock();
        if !guard.state.is_capturing() {
            return false;
        }

        let overrun_was_pending = guard.store.overrun_pending();
        let reservation = guard.store.try_reserve_write_slot();
        if reservation.evicted && !overrun_was_pending {
            log::debug!(
                "Ring overrun: consumer fell {} periods behind, overwriting slot {}",
                guard.store.depth(),
                reservation.index
            );
        }

        guard.store.commit_write(period);
        guard.diagnostics.periods_captured += 1;
        drop(guard);

        self.ready.notify_one();
        true
    }

    /// Consumer side: block until a period is ready or the session ends,
    /// then copy it into `dest`.
    ///
    /// Returns the overrun flag that was read and cleared with this period.
    pub(crate) fn wait_and_consume(&self, dest: &mut [u8]) -> Result<bool, CaptureError> {
        let mut guard = self.inner.lock();
        loop {
            if let Some(err) = guard.state.terminal_error() {
                return Err(err);
            }
            if let Some(overrun) = guard.store.consume_slot(dest) {
                guard.diagnostics.periods_delivered += 1;
                if overrun {
                    guard.diagnostics.ring_overruns += 1;
                }
                return Ok(overrun);
            }
            self.ready.wait(&mut guard);
        }
    }

    pub(crate) fn record_hardware_overrun(&self) {
        self.inner.lock().diagnostics.hardware_overruns += 1;
    }

    /// Ask the reader to exit and release any blocked consumer.
    pub(crate) fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.finish(CaptureState::Stopped);
    }

    /// End the session with a fatal hardware error.
    pub(crate) fn fail(&self, err: CaptureError) {
        self.finish(CaptureState::Failed(err));
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub(crate) fn state(&self) -> CaptureState {
        self.inner.lock().state.clone()
    }

    pub(crate) fn diagnostics(&self) -> CaptureDiagnostics {
        let guard = self.inner.lock();
        let mut diagnostics = guard.diagnostics.clone();
        diagnostics.periods_evicted = guard.store.evicted();
        diagnostics
    }

    pub(crate) fn filled_count(&self) -> usize {
        self.inner.lock().store.filled_count()
    }

    /// First terminal state wins; a stop after a failure keeps the error.
    fn finish(&self, terminal: CaptureState) {
        {
            let mut guard = self.inner.lock();
            if guard.state.is_capturing() {
                guard.state = terminal;
            }
        }
        self.ready.notify_all();
    }
}
