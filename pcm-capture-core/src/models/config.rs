use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::format::SampleFormat;

/// Requested hardware buffer layout.
///
/// Any field left at 0 lets the backend choose: the maximum buffer size for
/// `buffer_frames`, and the nearest supported value for the other two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferParams {
    pub buffer_frames: usize,
    pub period_frames: usize,
    pub periods: usize,
}

/// The negotiated stream parameters of an opened PCM handle.
///
/// Fixed once the handle is configured; the capture ring is sized from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub channels: usize,
    pub format: SampleFormat,
    /// Sample rate in Hz.
    pub rate: u32,
    /// Frames delivered per hardware period.
    pub period_frames: usize,
}

impl StreamConfig {
    pub fn new(channels: usize, format: SampleFormat, rate: u32, period_frames: usize) -> Self {
        Self {
            channels,
            format,
            rate,
            period_frames,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.channels == 0 {
            return Err("channel count must be positive".into());
        }
        if self.rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.period_frames == 0 {
            return Err("period size must be positive".into());
        }
        Ok(())
    }

    /// Bytes in one interleaved frame.
    pub fn frame_bytes(&self) -> usize {
        self.format.byte_width() * self.channels
    }

    /// Bytes in one period; the size of every ring slot.
    pub fn period_bytes(&self) -> usize {
        self.frame_bytes() * self.period_frames
    }

    /// Interleaved samples in one period.
    pub fn period_samples(&self) -> usize {
        self.period_frames * self.channels
    }

    /// Ring depth holding roughly one second of audio, never less than one slot.
    pub fn ring_depth(&self) -> usize {
        (self.rate as usize / self.period_frames.max(1)).max(1)
    }

    /// Wall-clock length of one period.
    pub fn period_duration(&self) -> Duration {
        Duration::from_secs_f64(self.period_frames as f64 / f64::from(self.rate.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sizes_for_stereo_s16() {
        let config = StreamConfig::new(2, SampleFormat::S16LE, 48000, 480);
        assert!(config.validate().is_ok());
        assert_eq!(config.frame_bytes(), 4);
        assert_eq!(config.period_bytes(), 1920);
        assert_eq!(config.period_samples(), 960);
        assert_eq!(config.ring_depth(), 100);
    }

    #[test]
    fn ring_depth_clamps_to_one() {
        let config = StreamConfig::new(1, SampleFormat::U8, 8000, 16000);
        assert_eq!(config.ring_depth(), 1);
    }

    #[test]
    fn period_duration() {
        let config = StreamConfig::new(1, SampleFormat::FloatLE, 44100, 441);
        assert_relative_eq!(config.period_duration().as_secs_f64(), 0.01, epsilon = 1e-9);
    }

    #[test]
    fn validate_rejects_zeroes() {
        assert!(StreamConfig::new(0, SampleFormat::S16LE, 48000, 480).validate().is_err());
        assert!(StreamConfig::new(2, SampleFormat::S16LE, 0, 480).validate().is_err());
        assert!(StreamConfig::new(2, SampleFormat::S16LE, 48000, 0).validate().is_err());
    }
}
