//! core/merge/encoder.rs
//! PCM -> MP3 (LAME), constant bitrate.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mp3lame_encoder::{
    Bitrate, BuildError, Builder, Encoder, FlushNoGap, InterleavedPcm, MonoPcm, Quality,
};
use tracing::debug;

use super::pcm::PcmBuffer;
use crate::core::error::{Error, Result};
use crate::core::types::EncodeSettings;

/// Frames handed to LAME per call. Keeps the scratch buffer small.
const CHUNK_FRAMES: usize = 1152 * 64;

/// Encode `pcm` into a fresh MP3 file at `out` (truncating any existing file).
pub fn encode_mp3(pcm: PcmBuffer, out: &Path, settings: EncodeSettings) -> Result<()> {
    let pcm = pcm.into_encodable();
    let mut encoder = build_encoder(&pcm, settings)?;

    let io_err = |source: std::io::Error| Error::Io {
        path: out.to_path_buf(),
        source,
    };

    let file = File::create(out).map_err(io_err)?;
    let mut writer = BufWriter::new(file);

    let channels = pcm.channels() as usize;
    let pcm16: Vec<i16> = pcm.samples().iter().map(|s| to_i16(*s)).collect();

    let mut mp3: Vec<u8> = Vec::new();
    for chunk in pcm16.chunks(CHUNK_FRAMES * channels) {
        mp3.clear();
        mp3.reserve(mp3lame_encoder::max_required_buffer_size(chunk.len()));

        let encoded = if channels == 1 {
            encoder.encode_to_vec(MonoPcm(chunk), &mut mp3)
        } else {
            encoder.encode_to_vec(InterleavedPcm(chunk), &mut mp3)
        };
        encoded.map_err(|e| Error::Encode(format!("{e:?}")))?;

        writer.write_all(&mp3).map_err(io_err)?;
    }

    mp3.clear();
    mp3.reserve(mp3lame_encoder::max_required_buffer_size(0));
    encoder
        .flush_to_vec::<FlushNoGap>(&mut mp3)
        .map_err(|e| Error::Encode(format!("{e:?}")))?;
    writer.write_all(&mp3).map_err(io_err)?;

    // Close before anyone reports the output as done.
    let file = writer.into_inner().map_err(|e| io_err(e.into_error()))?;
    file.sync_all().map_err(io_err)?;

    debug!(
        path = %out.display(),
        frames = pcm.frames(),
        sample_rate = pcm.sample_rate(),
        channels,
        "mp3 written"
    );
    Ok(())
}

fn build_encoder(pcm: &PcmBuffer, settings: EncodeSettings) -> Result<Encoder> {
    let mut builder = Builder::new().ok_or_else(|| Error::Encode("LAME init failed".into()))?;

    let setup = |e: BuildError| Error::Encode(format!("encoder setup: {e:?}"));

    builder.set_num_channels(pcm.channels() as u8).map_err(setup)?;
    builder.set_sample_rate(pcm.sample_rate()).map_err(setup)?;
    builder.set_brate(bitrate(settings.bitrate_kbps)?).map_err(setup)?;
    builder.set_quality(Quality::Best).map_err(setup)?;

    builder.build().map_err(setup)
}

fn bitrate(kbps: u32) -> Result<Bitrate> {
    Ok(match kbps {
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        other => return Err(Error::Encode(format!("unsupported bitrate {other} kbit/s"))),
    })
}

fn to_i16(s: f32) -> i16 {
    (s.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16
}
