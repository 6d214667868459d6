use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// PCM sample formats supported by the capture and playback paths.
///
/// 24-bit formats are stored in 4-byte containers, as the hardware
/// delivers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    S8,
    U8,
    S16LE,
    S16BE,
    U16LE,
    U16BE,
    S24LE,
    S24BE,
    U24LE,
    U24BE,
    S32LE,
    S32BE,
    U32LE,
    U32BE,
    FloatLE,
    FloatBE,
    Float64LE,
    Float64BE,
}

impl SampleFormat {
    pub const ALL: [SampleFormat; 18] = [
        Self::S8,
        Self::U8,
        Self::S16LE,
        Self::S16BE,
        Self::U16LE,
        Self::U16BE,
        Self::S24LE,
        Self::S24BE,
        Self::U24LE,
        Self::U24BE,
        Self::S32LE,
        Self::S32BE,
        Self::U32LE,
        Self::U32BE,
        Self::FloatLE,
        Self::FloatBE,
        Self::Float64LE,
        Self::Float64BE,
    ];

    /// Number of bytes one sample occupies in an interleaved buffer.
    pub fn byte_width(self) -> usize {
        match self {
            Self::S8 | Self::U8 => 1,
            Self::S16LE | Self::S16BE | Self::U16LE | Self::U16BE => 2,
            Self::S24LE
            | Self::S24BE
            | Self::U24LE
            | Self::U24BE
            | Self::S32LE
            | Self::S32BE
            | Self::U32LE
            | Self::U32BE
            | Self::FloatLE
            | Self::FloatBE => 4,
            Self::Float64LE | Self::Float64BE => 8,
        }
    }

    /// Canonical name, e.g. `"S16LE"` or `"Float64BE"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::S8 => "S8",
            Self::U8 => "U8",
            Self::S16LE => "S16LE",
            Self::S16BE => "S16BE",
            Self::U16LE => "U16LE",
            Self::U16BE => "U16BE",
            Self::S24LE => "S24LE",
            Self::S24BE => "S24BE",
            Self::U24LE => "U24LE",
            Self::U24BE => "U24BE",
            Self::S32LE => "S32LE",
            Self::S32BE => "S32BE",
            Self::U32LE => "U32LE",
            Self::U32BE => "U32BE",
            Self::FloatLE => "FloatLE",
            Self::FloatBE => "FloatBE",
            Self::Float64LE => "Float64LE",
            Self::Float64BE => "Float64BE",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SampleFormat {
    type Err = CaptureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|format| format.name() == s)
            .ok_or_else(|| CaptureError::ConfigurationFailed(format!("unknown sample format: {}", s)))
    }
}

/// Element types accepted by the typed read/write paths.
///
/// A buffer of `T` is only accepted when `T::WIDTH` equals the stream
/// format's byte width. Bytes are never reinterpreted across widths.
pub trait Sample: Copy + Send + 'static {
    const WIDTH: usize;

    /// Writes this sample's native-endian bytes into `out` (`out.len() == WIDTH`).
    fn write_ne(self, out: &mut [u8]);

    /// Reads a sample from native-endian bytes (`bytes.len() == WIDTH`).
    fn read_ne(bytes: &[u8]) -> Self;
}

macro_rules! impl_sample {
    ($($ty:ty),*) => {
        $(
            impl Sample for $ty {
                const WIDTH: usize = std::mem::size_of::<$ty>();

                fn write_ne(self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_ne_bytes());
                }

                fn read_ne(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_ne_bytes(raw)
                }
            }
        )*
    };
}

impl_sample!(i8, u8, i16, u16, i32, u32, f32, f64);

/// Reject `T` if its width differs from `format`'s sample width.
pub fn check_sample_width<T: Sample>(format: SampleFormat) -> Result<(), CaptureError> {
    if T::WIDTH != format.byte_width() {
        return Err(CaptureError::SampleWidthMismatch {
            expected: format.byte_width(),
            actual: T::WIDTH,
        });
    }
    Ok(())
}

/// Encode samples into a byte buffer of exactly `samples.len() * T::WIDTH` bytes.
pub fn samples_to_bytes<T: Sample>(samples: &[T], out: &mut [u8]) {
    for (sample, chunk) in samples.iter().zip(out.chunks_exact_mut(T::WIDTH)) {
        sample.write_ne(chunk);
    }
}

/// Decode a byte buffer into samples.
pub fn bytes_to_samples<T: Sample>(bytes: &[u8], out: &mut [T]) {
    for (chunk, sample) in bytes.chunks_exact(T::WIDTH).zip(out.iter_mut()) {
        *sample = T::read_ne(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_widths() {
        assert_eq!(SampleFormat::S8.byte_width(), 1);
        assert_eq!(SampleFormat::U16BE.byte_width(), 2);
        assert_eq!(SampleFormat::S24LE.byte_width(), 4);
        assert_eq!(SampleFormat::FloatLE.byte_width(), 4);
        assert_eq!(SampleFormat::Float64BE.byte_width(), 8);
    }

    #[test]
    fn names_parse_back() {
        for format in SampleFormat::ALL {
            assert_eq!(format.to_string().parse::<SampleFormat>(), Ok(format));
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = "S16".parse::<SampleFormat>().unwrap_err();
        assert!(matches!(err, CaptureError::ConfigurationFailed(_)));
    }

    #[test]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&SampleFormat::Float64LE).unwrap();
        assert_eq!(json, "\"Float64LE\"");
    }

    #[test]
    fn width_check() {
        assert!(check_sample_width::<i16>(SampleFormat::S16LE).is_ok());
        assert!(check_sample_width::<f32>(SampleFormat::S24LE).is_ok());
        assert_eq!(
            check_sample_width::<i16>(SampleFormat::FloatLE),
            Err(CaptureError::SampleWidthMismatch { expected: 4, actual: 2 })
        );
    }

    #[test]
    fn sample_bytes_conversion() {
        let samples = [1i16, -2, 300];
        let mut bytes = [0u8; 6];
        samples_to_bytes(&samples, &mut bytes);
        assert_eq!(&bytes[0..2], &1i16.to_ne_bytes());

        let mut decoded = [0i16; 3];
        bytes_to_samples(&bytes, &mut decoded);
        assert_eq!(decoded, samples);
    }
}
