//! Mapping between `SampleFormat` and ALSA's PCM formats.

use alsa::pcm::Format;

use pcm_capture_core::models::format::SampleFormat;

pub fn to_alsa(format: SampleFormat) -> Format {
    match format {
        SampleFormat::S8 => Format::S8,
        SampleFormat::U8 => Format::U8,
        SampleFormat::S16LE => Format::S16LE,
        SampleFormat::S16BE => Format::S16BE,
        SampleFormat::U16LE => Format::U16LE,
        SampleFormat::U16BE => Format::U16BE,
        SampleFormat::S24LE => Format::S24LE,
        SampleFormat::S24BE => Format::S24BE,
        SampleFormat::U24LE => Format::U24LE,
        SampleFormat::U24BE => Format::U24BE,
        SampleFormat::S32LE => Format::S32LE,
        SampleFormat::S32BE => Format::S32BE,
        SampleFormat::U32LE => Format::U32LE,
        SampleFormat::U32BE => Format::U32BE,
        SampleFormat::FloatLE => Format::FloatLE,
        SampleFormat::FloatBE => Format::FloatBE,
        SampleFormat::Float64LE => Format::Float64LE,
        SampleFormat::Float64BE => Format::Float64BE,
    }
}

/// `None` for ALSA formats the capture path does not carry.
pub fn from_alsa(format: Format) -> Option<SampleFormat> {
    SampleFormat::ALL.into_iter().find(|f| to_alsa(*f) == format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_format_maps_back() {
        for format in SampleFormat::ALL {
            assert_eq!(from_alsa(to_alsa(format)), Some(format));
        }
    }

    #[test]
    fn unsupported_alsa_format() {
        assert_eq!(from_alsa(Format::MuLaw), None);
    }
}
