//! # pcm-capture-alsa
//!
//! Linux ALSA backend for pcm-capture.
//!
//! Provides:
//! - `AlsaPcm` — blocking interleaved PCM handle implementing `PcmStream` and `PcmSink`
//! - `open_capture_device` / `open_playback_device` — open and wrap in the core device types
//! - `device_enumerator` — PCM device listing via ALSA name hints
//! - `format` — `SampleFormat` ↔ ALSA format mapping
//!
//! ## Usage
//! ```ignore
//! use pcm_capture_alsa::open_capture_device;
//! use pcm_capture_core::{BufferParams, CaptureError, SampleFormat};
//!
//! let params = BufferParams { buffer_frames: 0, period_frames: 480, periods: 4 };
//! let mut device = open_capture_device("default", 2, SampleFormat::S16LE, 48000, params)?;
//! device.start_read_thread()?;
//!
//! let mut period = vec![0i16; device.config().period_samples()];
//! loop {
//!     match device.read(&mut period) {
//!         Ok(_) => { /* contiguous */ }
//!         Err(CaptureError::Overrun) => { /* period valid, earlier ones lost */ }
//!         Err(e) => return Err(e),
//!     }
//! }
//! ```

#[cfg(target_os = "linux")]
pub mod device_enumerator;
#[cfg(target_os = "linux")]
pub mod format;
#[cfg(target_os = "linux")]
pub mod pcm;

#[cfg(target_os = "linux")]
pub use device_enumerator::{list_capture_devices, list_pcm_devices, list_playback_devices, PcmDeviceInfo};
#[cfg(target_os = "linux")]
pub use pcm::AlsaPcm;

#[cfg(target_os = "linux")]
use pcm_capture_core::{BufferParams, CaptureDevice, CaptureError, PlaybackDevice, SampleFormat};

/// Open an ALSA PCM for capture, ready for direct reads or a reader thread.
#[cfg(target_os = "linux")]
pub fn open_capture_device(
    device_name: &str,
    channels: usize,
    format: SampleFormat,
    rate: u32,
    buffer_params: BufferParams,
) -> Result<CaptureDevice<AlsaPcm>, CaptureError> {
    let pcm = AlsaPcm::open_capture(device_name, channels, format, rate, buffer_params)?;
    CaptureDevice::new(pcm)
}

/// Open an ALSA PCM for playback.
#[cfg(target_os = "linux")]
pub fn open_playback_device(
    device_name: &str,
    channels: usize,
    format: SampleFormat,
    rate: u32,
    buffer_params: BufferParams,
) -> Result<PlaybackDevice<AlsaPcm>, CaptureError> {
    let pcm = AlsaPcm::open_playback(device_name, channels, format, rate, buffer_params)?;
    PlaybackDevice::new(pcm)
}
