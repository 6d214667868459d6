//! ALSA PCM handle opened in blocking, interleaved read/write mode.
//!
//! Opening negotiates hardware parameters once; the handle then implements
//! `PcmStream` (capture) or `PcmSink` (playback) over ALSA's byte IO.

use alsa::pcm::{Access, Frames, HwParams, PCM};
use alsa::{Direction, ValueOr};

use pcm_capture_core::models::config::{BufferParams, StreamConfig};
use pcm_capture_core::models::error::CaptureError;
use pcm_capture_core::models::format::SampleFormat;
use pcm_capture_core::traits::pcm_stream::{PcmSink, PcmStream};

use crate::format::to_alsa;

/// An opened and configured ALSA PCM.
pub struct AlsaPcm {
    pcm: PCM,
    name: String,
    direction: Direction,
    config: StreamConfig,
    buffer_params: BufferParams,
}

impl AlsaPcm {
    /// Open `device_name` for capture with the requested parameters.
    pub fn open_capture(
        device_name: &str,
        channels: usize,
        format: SampleFormat,
        rate: u32,
        buffer_params: BufferParams,
    ) -> Result<Self, CaptureError> {
        Self::open(device_name, Direction::Capture, channels, format, rate, buffer_params)
    }

    /// Open `device_name` for playback with the requested parameters.
    pub fn open_playback(
        device_name: &str,
        channels: usize,
        format: SampleFormat,
        rate: u32,
        buffer_params: BufferParams,
    ) -> Result<Self, CaptureError> {
        Self::open(device_name, Direction::Playback, channels, format, rate, buffer_params)
    }

    /// Open and negotiate.
    ///
    /// Sequence:
    /// 1. Open the PCM in blocking mode
    /// 2. Interleaved RW access, exact format, channels and rate
    /// 3. Buffer size near `buffer_frames` (hardware maximum when 0)
    /// 4. Period size near `period_frames`, period count `periods` when set
    /// 5. Apply, then read back what the hardware granted
    fn open(
        device_name: &str,
        direction: Direction,
        channels: usize,
        format: SampleFormat,
        rate: u32,
        requested: BufferParams,
    ) -> Result<Self, CaptureError> {
        let pcm = PCM::new(device_name, direction, false)
            .map_err(|e| device_error("could not open ALSA device", e))?;

        let granted = {
            let hwp = HwParams::any(&pcm).map_err(|e| device_error("could not set default hw params", e))?;

            hwp.set_access(Access::RWInterleaved)
                .map_err(|e| device_error("could not set access params", e))?;
            hwp.set_format(to_alsa(format))
                .map_err(|e| device_error("could not set format params", e))?;
            hwp.set_channels(channels as u32)
                .map_err(|e| device_error("could not set channels params", e))?;
            hwp.set_rate(rate, ValueOr::Nearest)
                .map_err(|e| device_error("could not set rate params", e))?;

            let buffer_frames = if requested.buffer_frames == 0 {
                hwp.get_buffer_size_max()
                    .map_err(|e| device_error("could not get buffer size", e))?
            } else {
                requested.buffer_frames as Frames
            };
            hwp.set_buffer_size_near(buffer_frames)
                .map_err(|e| device_error("could not set buffer size", e))?;

            if requested.period_frames > 0 {
                hwp.set_period_size_near(requested.period_frames as Frames, ValueOr::Nearest)
                    .map_err(|e| device_error("could not set period size", e))?;
            }
            if requested.periods > 0 {
                if let Err(e) = hwp.set_periods(requested.periods as u32, ValueOr::Nearest) {
                    log::warn!(
                        "{}: {} periods not supported ({}), keeping hardware choice",
                        device_name,
                        requested.periods,
                        e
                    );
                }
            }

            pcm.hw_params(&hwp)
                .map_err(|e| device_error("could not set hw params", e))?;

            BufferParams {
                buffer_frames: hwp
                    .get_buffer_size()
                    .map_err(|e| device_error("could not get buffer size", e))? as usize,
                period_frames: hwp
                    .get_period_size()
                    .map_err(|e| device_error("could not get period size", e))? as usize,
                periods: hwp
                    .get_periods()
                    .map_err(|e| device_error("could not get periods", e))? as usize,
            }
        };

        let config = StreamConfig::new(channels, format, rate, granted.period_frames);
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        log::info!(
            "Opened {} for {:?}: {} ch {} @ {} Hz, {} frames/period, {} periods, {} frames buffered",
            device_name,
            direction,
            channels,
            format,
            rate,
            granted.period_frames,
            granted.periods,
            granted.buffer_frames
        );

        Ok(Self {
            pcm,
            name: device_name.to_string(),
            direction,
            config,
            buffer_params: granted,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Buffer layout granted by the hardware.
    pub fn buffer_params(&self) -> BufferParams {
        self.buffer_params
    }
}

impl PcmStream for AlsaPcm {
    fn config(&self) -> StreamConfig {
        self.config
    }

    fn read_frames(&mut self, buf: &mut [u8], frames: usize) -> Result<usize, CaptureError> {
        let len = frames * self.config.frame_bytes();
        let io = self.pcm.io_bytes();
        io.readi(&mut buf[..len]).map_err(|e| {
            if e.errno() == libc::EPIPE {
                CaptureError::Overrun
            } else {
                device_error("read error", e)
            }
        })
    }

    fn prepare(&mut self) -> Result<(), CaptureError> {
        self.pcm
            .prepare()
            .map_err(|e| device_error("could not prepare stream", e))
    }
}

impl PcmSink for AlsaPcm {
    fn config(&self) -> StreamConfig {
        self.config
    }

    fn write_frames(&mut self, buf: &[u8], frames: usize) -> Result<usize, CaptureError> {
        let len = frames * self.config.frame_bytes();
        let io = self.pcm.io_bytes();
        io.writei(&buf[..len]).map_err(|e| {
            if e.errno() == libc::EPIPE {
                CaptureError::Underrun
            } else {
                device_error("write error", e)
            }
        })
    }

    fn prepare(&mut self) -> Result<(), CaptureError> {
        self.pcm
            .prepare()
            .map_err(|e| device_error("could not prepare stream", e))
    }
}

impl Drop for AlsaPcm {
    fn drop(&mut self) {
        // Discard pending frames; the PCM itself closes when dropped.
        if let Err(e) = self.pcm.drop() {
            log::debug!("{}: drop failed on close: {}", self.name, e);
        }
    }
}

fn device_error(what: &str, err: alsa::Error) -> CaptureError {
    CaptureError::Device(format!("{}: {}", what, err))
}
