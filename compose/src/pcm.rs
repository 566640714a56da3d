//! PCM audio math for composition.
//!
//! The composer never transcodes: it only concatenates segment audio and
//! pads with silence, so the only format knowledge it needs is how many
//! bytes a span of time occupies.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Format of a raw PCM byte stream: 16-bit little-endian samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    /// Samples per second per channel.
    pub sample_rate: u32,
    /// Number of interleaved channels.
    pub channels: u16,
}

impl PcmFormat {
    /// 16 kHz mono, the provider's default output.
    pub const L16_MONO_16K: PcmFormat = PcmFormat {
        sample_rate: 16_000,
        channels: 1,
    };

    /// Bytes per audio frame (one sample per channel).
    pub fn frame_size(&self) -> usize {
        self.channels as usize * 2
    }

    /// Bytes per second of audio.
    pub fn bytes_rate(&self) -> usize {
        self.sample_rate as usize * self.frame_size()
    }

    /// Number of bytes covering the given duration, rounded down to a
    /// whole frame.
    pub fn bytes_in_duration(&self, duration: Duration) -> usize {
        let bytes = self.bytes_rate() as u128 * duration.as_millis() / 1000;
        let frame = self.frame_size() as u128;
        (bytes / frame * frame) as usize
    }

    /// Duration of a byte span in this format.
    pub fn duration(&self, byte_len: usize) -> Duration {
        Duration::from_millis((byte_len as u64 * 1000) / self.bytes_rate() as u64)
    }

    /// Returns a silence span of the given duration.
    pub fn silence(&self, duration: Duration) -> Vec<u8> {
        vec![0u8; self.bytes_in_duration(duration)]
    }
}

#[cfg(test)]
mod pcm_tests {
    use super::*;

    #[test]
    fn test_bytes_in_duration() {
        let format = PcmFormat::L16_MONO_16K;
        // 1 second at 16kHz mono 16-bit = 16000 samples * 2 bytes
        assert_eq!(format.bytes_in_duration(Duration::from_secs(1)), 32_000);
        assert_eq!(format.bytes_in_duration(Duration::from_millis(200)), 6_400);
    }

    #[test]
    fn test_duration_roundtrip() {
        let format = PcmFormat::L16_MONO_16K;
        assert_eq!(format.duration(32_000), Duration::from_secs(1));
        assert_eq!(format.duration(6_400), Duration::from_millis(200));
    }

    #[test]
    fn test_frame_alignment_stereo() {
        let format = PcmFormat {
            sample_rate: 44_100,
            channels: 2,
        };
        // 1ms at 44.1kHz stereo is 176.4 bytes; must round down to a frame
        let bytes = format.bytes_in_duration(Duration::from_millis(1));
        assert_eq!(bytes % format.frame_size(), 0);
    }

    #[test]
    fn test_silence_is_zeroed() {
        let silence = PcmFormat::L16_MONO_16K.silence(Duration::from_millis(10));
        assert_eq!(silence.len(), 320);
        assert!(silence.iter().all(|b| *b == 0));
    }
}
