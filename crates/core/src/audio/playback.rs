//! Audio playback via rodio for previewing finished stories.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, Sink};

/// Play an audio file through the default output device.
///
/// Blocks until playback completes.
pub fn play_wav(path: &Path) -> Result<()> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .with_context(|| format!("Failed to decode audio file: {}", path.display()))?;

    let (_stream, stream_handle) =
        OutputStream::try_default().context("Failed to open audio output device")?;
    let sink = Sink::try_new(&stream_handle).context("Failed to create audio sink")?;

    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
