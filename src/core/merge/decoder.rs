//! core/merge/decoder.rs
//! Whole-file decoding (Symphonia) into an interleaved f32 [`PcmBuffer`].

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use super::pcm::PcmBuffer;
use crate::core::error::{Error, Result};

/// Decode every sample of the default track in `path`.
///
/// Isolated corrupt packets are skipped. Anything else (open, probe, decoder init,
/// read errors, or a file that produced no audio at all after packet errors) is a
/// [`Error::SourceDecode`] naming the file.
pub fn decode_file(path: &Path) -> Result<PcmBuffer> {
    let file =
        File::open(path).map_err(|e| Error::source_decode(path, format!("Open failed: {e}")))?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::source_decode(path, format!("Format probe failed: {e}")))?;

    let format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| Error::source_decode(path, "No supported audio track found."))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::source_decode(path, format!("Decoder init failed: {e}")))?;

    let mut reader = PacketReader {
        format,
        decoder,
        track_id,
        out: Collected::new(
            codec_params.channels.map(|c| c.count() as u16).unwrap_or(2),
            codec_params.sample_rate.unwrap_or(44_100),
        ),
        skipped_packets: 0,
    };

    reader
        .read_all()
        .map_err(|reason| Error::source_decode(path, reason))?;

    let skipped_packets = reader.skipped_packets;
    if reader.out.is_empty() && skipped_packets > 0 {
        return Err(Error::source_decode(
            path,
            format!("{skipped_packets} packets failed to decode and no audio was recovered"),
        ));
    }

    let pcm = reader.out.finish();
    debug!(
        path = %path.display(),
        sample_rate = pcm.sample_rate(),
        channels = pcm.channels(),
        frames = pcm.frames(),
        skipped_packets,
        "decoded source"
    );

    Ok(pcm)
}

struct PacketReader {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    out: Collected,
    skipped_packets: usize,
}

impl PacketReader {
    fn read_all(&mut self) -> std::result::Result<(), String> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(p) => p,
                // Symphonia signals end-of-stream as UnexpectedEof.
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(());
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(format!("Decode read error: {e}")),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(_)) => {
                    // Corrupt packet; skip.
                    self.skipped_packets += 1;
                    continue;
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(format!("Decode error: {e}")),
            };

            let frames = decoded.frames();
            if frames == 0 {
                continue;
            }

            let spec = SignalSpec::new(decoded.spec().rate, decoded.spec().channels);
            let mut sbuf = SampleBuffer::<f32>::new(frames as u64, spec);
            sbuf.copy_interleaved_ref(decoded);

            self.out.push(spec.channels.count() as u16, spec.rate, sbuf.samples());
        }
    }
}

/// Decoded audio so far. A stream may change layout mid-file (chained MP3s switching
/// between mono and stereo); each run keeps its own format and runs are spliced with
/// [`PcmBuffer::append`].
struct Collected {
    done: Option<PcmBuffer>,
    channels: u16,
    sample_rate: u32,
    // Interleaved f32 for the current run
    samples: Vec<f32>,
}

impl Collected {
    fn new(channels: u16, sample_rate: u32) -> Self {
        Self {
            done: None,
            channels,
            sample_rate,
            samples: Vec::new(),
        }
    }

    fn push(&mut self, channels: u16, sample_rate: u32, interleaved: &[f32]) {
        if interleaved.is_empty() {
            return;
        }
        if (channels, sample_rate) != (self.channels, self.sample_rate) {
            if !self.samples.is_empty() {
                debug!(
                    from_channels = self.channels,
                    from_rate = self.sample_rate,
                    channels,
                    sample_rate,
                    "stream format changed"
                );
                self.flush();
            }
            self.channels = channels;
            self.sample_rate = sample_rate;
        }
        self.samples.extend_from_slice(interleaved);
    }

    fn flush(&mut self) {
        let run = PcmBuffer::new(
            self.channels,
            self.sample_rate,
            std::mem::take(&mut self.samples),
        );
        match &mut self.done {
            Some(done) => done.append(run),
            None => self.done = Some(run),
        }
    }

    fn is_empty(&self) -> bool {
        self.samples.is_empty() && self.done.as_ref().is_none_or(|d| d.samples().is_empty())
    }

    fn finish(mut self) -> PcmBuffer {
        if self.done.is_none() {
            return PcmBuffer::new(self.channels, self.sample_rate, self.samples);
        }
        if !self.samples.is_empty() {
            self.flush();
        }
        self.done
            .unwrap_or_else(|| PcmBuffer::new(self.channels, self.sample_rate, Vec::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::merge::test_audio::write_wav;

    #[test]
    fn decodes_wav_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        write_wav(&path, 8_000, 2, &vec![0.25; 8_000]);

        let pcm = decode_file(&path).unwrap();
        assert_eq!(pcm.sample_rate(), 8_000);
        assert_eq!(pcm.channels(), 2);
        assert_eq!(pcm.frames(), 8_000);
        assert!((pcm.samples()[0] - 0.25).abs() < 1e-3);
    }

    #[test]
    fn garbage_file_fails_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.mp3");
        std::fs::write(&path, b"definitely not audio, just some bytes").unwrap();

        match decode_file(&path) {
            Err(Error::SourceDecode { file, .. }) => assert_eq!(file, "broken.mp3"),
            other => panic!("expected SourceDecode, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_fails_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.flac");

        let err = decode_file(&path).unwrap_err();
        assert!(err.to_string().contains("gone.flac"));
    }

    #[test]
    fn layout_change_mid_stream_keeps_earlier_frames_intact() {
        let mut out = Collected::new(1, 8_000);
        out.push(1, 8_000, &[0.5; 100]);
        out.push(2, 8_000, &[-0.5; 200]);

        let pcm = out.finish();
        assert_eq!(pcm.channels(), 2);
        assert_eq!(pcm.frames(), 200);
        // The mono run is widened, not reinterpreted as 50 stereo frames.
        assert!(pcm.samples()[..200].iter().all(|s| (*s - 0.5).abs() < 1e-6));
        assert!(pcm.samples()[200..].iter().all(|s| (*s + 0.5).abs() < 1e-6));
    }

    #[test]
    fn steady_stream_is_one_run() {
        let mut out = Collected::new(2, 44_100);
        out.push(2, 44_100, &[0.1, 0.2]);
        out.push(2, 44_100, &[0.3, 0.4]);

        let pcm = out.finish();
        assert_eq!(pcm.samples(), &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(pcm.sample_rate(), 44_100);
    }
}
