//! Interleaved f32 sample buffer plus format sync for splicing.

use rodio::Source;
use rodio::buffer::SamplesBuffer;
use rodio::source::UniformSourceIterator;

/// The MP3 encoder takes mono or stereo only.
pub const MAX_CHANNELS: u16 = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    channels: u16,
    sample_rate: u32,
    samples: Vec<f32>,
}

impl PcmBuffer {
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
            samples,
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Hard splice `next` onto the end of `self`.
    ///
    /// Both sides are brought to the higher sample rate and the higher channel count
    /// (capped at [`MAX_CHANNELS`]) first. No gain change, no crossfade.
    pub fn append(&mut self, next: PcmBuffer) {
        let rate = self.sample_rate.max(next.sample_rate);
        let channels = self.channels.max(next.channels).min(MAX_CHANNELS);

        if (self.channels, self.sample_rate) != (channels, rate) {
            let current = std::mem::replace(self, PcmBuffer::new(channels, rate, Vec::new()));
            *self = current.converted(channels, rate);
        }

        let next = next.converted(channels, rate);
        self.samples.extend_from_slice(&next.samples);
    }

    /// Clamp to what a 192 kbit/s MPEG-1 Layer III stream can carry:
    /// at most two channels, and a 32/44.1/48 kHz sample rate.
    pub fn into_encodable(self) -> PcmBuffer {
        let channels = self.channels.min(MAX_CHANNELS);
        let rate = mpeg1_rate(self.sample_rate);
        self.converted(channels, rate)
    }

    fn converted(self, channels: u16, sample_rate: u32) -> PcmBuffer {
        if self.channels == channels && self.sample_rate == sample_rate {
            return self;
        }
        if self.samples.is_empty() {
            return PcmBuffer::new(channels, sample_rate, Vec::new());
        }

        let source = SamplesBuffer::new(self.channels, self.sample_rate, self.samples);
        let uniform = UniformSourceIterator::new(source, channels, sample_rate);
        debug_assert_eq!(uniform.channels(), channels);

        PcmBuffer::new(channels, sample_rate, uniform.collect())
    }
}

fn mpeg1_rate(rate: u32) -> u32 {
    match rate {
        32_000 | 44_100 | 48_000 => rate,
        r if r > 48_000 => 48_000,
        _ => 44_100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_format_is_a_plain_splice() {
        let mut a = PcmBuffer::new(1, 8_000, vec![0.1, 0.2]);
        a.append(PcmBuffer::new(1, 8_000, vec![0.3]));
        assert_eq!(a.samples(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn mono_is_widened_when_stereo_follows() {
        let mut a = PcmBuffer::new(1, 8_000, vec![0.5; 100]);
        a.append(PcmBuffer::new(2, 8_000, vec![-0.5; 200]));

        assert_eq!(a.channels(), 2);
        assert_eq!(a.frames(), 200);
        // First half is the old mono content on both channels.
        assert!(a.samples()[..200].iter().all(|s| (*s - 0.5).abs() < 1e-6));
        assert!(a.samples()[200..].iter().all(|s| (*s + 0.5).abs() < 1e-6));
    }

    #[test]
    fn lower_rate_is_upsampled() {
        let mut a = PcmBuffer::new(1, 8_000, vec![0.0; 8_000]);
        a.append(PcmBuffer::new(1, 16_000, vec![0.0; 16_000]));

        assert_eq!(a.sample_rate(), 16_000);
        let secs = a.duration_secs();
        assert!((secs - 2.0).abs() < 0.01, "duration {secs}");
    }

    #[test]
    fn surround_is_capped_to_stereo() {
        let pcm = PcmBuffer::new(6, 44_100, vec![0.0; 6 * 10]).into_encodable();
        assert_eq!(pcm.channels(), 2);
        assert_eq!(pcm.frames(), 10);
    }

    #[test]
    fn encodable_rate_is_mpeg1() {
        assert_eq!(PcmBuffer::new(1, 22_050, vec![]).into_encodable().sample_rate(), 44_100);
        assert_eq!(PcmBuffer::new(1, 96_000, vec![]).into_encodable().sample_rate(), 48_000);
        assert_eq!(PcmBuffer::new(1, 32_000, vec![]).into_encodable().sample_rate(), 32_000);
    }
}
