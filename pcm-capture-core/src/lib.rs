//! # pcm-capture-core
//!
//! Platform-agnostic PCM capture core library.
//!
//! Provides the background capture pipeline: a dedicated reader thread
//! performing blocking period reads into a fixed ring of period slots, and
//! a poll interface draining that ring with explicit overrun reporting.
//! Platform backends (Linux ALSA) implement the `PcmStream` / `PcmSink`
//! traits and plug into the generic `CaptureDevice` / `PlaybackDevice`.
//!
//! ## Architecture
//!
//! ```text
//! pcm-capture-core (this crate)
//! ├── traits/       ← PcmStream, PcmSink
//! ├── models/       ← CaptureError, SampleFormat, StreamConfig, CaptureState, diagnostics
//! ├── processing/   ← PeriodBuffer, RingStore
//! ├── session/      ← CaptureSession (reader thread + poll), StopHandle
//! ├── device/       ← CaptureDevice, PlaybackDevice
//! └── mock          ← scripted handles for hardware-free tests
//! ```

pub mod device;
pub mod mock;
pub mod models;
pub mod processing;
pub mod session;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use device::capture_device::CaptureDevice;
pub use device::playback_device::PlaybackDevice;
pub use models::config::{BufferParams, StreamConfig};
pub use models::diagnostics::CaptureDiagnostics;
pub use models::error::CaptureError;
pub use models::format::{Sample, SampleFormat};
pub use models::state::CaptureState;
pub use processing::period_buffer::PeriodBuffer;
pub use processing::ring_store::{RingStore, WriteReservation};
pub use session::capture_session::{start_capture, CaptureSession, StopHandle};
pub use traits::pcm_stream::{PcmSink, PcmStream};
