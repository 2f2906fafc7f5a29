//! Audio primitives: WAV and compressed-format I/O, gain, silence, fades.

pub mod effects;
pub mod io;
#[cfg(feature = "playback")]
pub mod playback;

/// Sample rate everything is mixed at. Provider output and effect assets
/// are resampled to this before combination.
pub const SAMPLE_RATE: u32 = 24_000;
