//! ALSA PCM device enumeration via name hints.

use alsa::device_name::HintIter;
use alsa::Direction;

use pcm_capture_core::models::error::CaptureError;

/// A PCM device name usable with `AlsaPcm::open_capture` / `open_playback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmDeviceInfo {
    pub name: String,
    /// First line of the hint description, or the name when there is none.
    pub description: String,
    pub capture: bool,
    pub playback: bool,
    pub is_default: bool,
}

/// List PCM devices advertised by ALSA's configuration.
pub fn list_pcm_devices() -> Result<Vec<PcmDeviceInfo>, CaptureError> {
    let hints = HintIter::new_str(None, "pcm")
        .map_err(|e| CaptureError::Device(format!("failed to enumerate devices: {}", e)))?;

    let mut devices = Vec::new();
    for hint in hints {
        let Some(name) = hint.name else {
            continue;
        };
        if name == "null" {
            continue;
        }

        // No direction hint means the device supports both.
        let (capture, playback) = match hint.direction {
            Some(Direction::Capture) => (true, false),
            Some(Direction::Playback) => (false, true),
            None => (true, true),
        };
        let description = hint
            .desc
            .as_deref()
            .and_then(|d| d.lines().next())
            .unwrap_or(&name)
            .to_string();

        devices.push(PcmDeviceInfo {
            is_default: name == "default",
            name,
            description,
            capture,
            playback,
        });
    }
    Ok(devices)
}

/// Capture-capable devices only.
pub fn list_capture_devices() -> Result<Vec<PcmDeviceInfo>, CaptureError> {
    Ok(list_pcm_devices()?.into_iter().filter(|d| d.capture).collect())
}

/// Playback-capable devices only.
pub fn list_playback_devices() -> Result<Vec<PcmDeviceInfo>, CaptureError> {
    Ok(list_pcm_devices()?.into_iter().filter(|d| d.playback).collect())
}
