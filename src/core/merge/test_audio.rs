//! Test-only WAV fixtures.

use std::path::Path;

/// Write a 16-bit PCM WAV where every channel carries `mono`.
pub(crate) fn write_wav(path: &Path, sample_rate: u32, channels: u16, mono: &[f32]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for s in mono {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        for _ in 0..channels {
            writer.write_sample(v).unwrap();
        }
    }
    writer.finalize().unwrap();
}

/// `secs` of a sine at `amp`.
pub(crate) fn tone(sample_rate: u32, secs: f32, amp: f32) -> Vec<f32> {
    let n = (sample_rate as f32 * secs) as usize;
    (0..n)
        .map(|i| (i as f32 * 440.0 * std::f32::consts::TAU / sample_rate as f32).sin() * amp)
        .collect()
}

/// RMS of interleaved samples in `[from, to)` seconds.
pub(crate) fn rms_between(pcm: &super::pcm::PcmBuffer, from: f64, to: f64) -> f32 {
    let ch = pcm.channels() as usize;
    let rate = pcm.sample_rate() as f64;
    let a = ((from * rate) as usize * ch).min(pcm.samples().len());
    let b = ((to * rate) as usize * ch).min(pcm.samples().len());
    let window = &pcm.samples()[a..b];
    if window.is_empty() {
        return 0.0;
    }
    (window.iter().map(|s| s * s).sum::<f32>() / window.len() as f32).sqrt()
}
