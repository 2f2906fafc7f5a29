//! Effect asset registry and procedural placeholder synthesis.
//!
//! The registry is an immutable cue -> file path map built at startup.
//! Looking up a cue that has no mapping is a normal outcome, never an
//! error; the mixer simply skips such items.
//!
//! Because the upstream effect library is not shipped with the crate,
//! `ensure_assets` can synthesize serviceable stand-ins for the default
//! cues (and the always-available placeholder chime) from sine waves and
//! deterministic noise.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::audio::SAMPLE_RATE;
use crate::cache::{assets_dir, atomic_write, is_cached, StorageUnavailable};

/// Default cue set.
pub const DEFAULT_CUES: &[&str] =
    &["forest", "rain", "magic", "door", "animal", "river", "wind"];

lazy_static::lazy_static! {
    static ref SYNTHS: HashMap<&'static str, fn(u32) -> Vec<f64>> = {
        let mut m: HashMap<&'static str, fn(u32) -> Vec<f64>> = HashMap::new();
        m.insert("forest", synth_forest as fn(u32) -> Vec<f64>);
        m.insert("rain", synth_rain);
        m.insert("magic", synth_magic);
        m.insert("door", synth_door);
        m.insert("animal", synth_animal);
        m.insert("river", synth_river);
        m.insert("wind", synth_wind);
        m
    };
}

/// Immutable cue -> asset path registry.
#[derive(Debug, Clone)]
pub struct EffectRegistry {
    effects: HashMap<String, PathBuf>,
}

impl EffectRegistry {
    /// Registry of the default cues under the standard assets directory.
    pub fn builtin() -> Self {
        Self::with_assets_dir(&assets_dir())
    }

    /// Registry of the default cues under an explicit assets directory.
    pub fn with_assets_dir(dir: &Path) -> Self {
        let effects = DEFAULT_CUES
            .iter()
            .map(|cue| (cue.to_string(), dir.join("effects").join(format!("{}.wav", cue))))
            .collect();
        EffectRegistry { effects }
    }

    /// Load a registry from a JSON object of cue -> path.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read effect registry: {}", path.display()))?;
        let effects: HashMap<String, PathBuf> = serde_json::from_str(&data)
            .with_context(|| format!("Invalid effect registry: {}", path.display()))?;
        if effects.is_empty() {
            bail!("Effect registry {} contains no cues", path.display());
        }
        log::info!("Loaded {} effect cues from {}", effects.len(), path.display());
        Ok(EffectRegistry { effects })
    }

    /// Look up the asset path for a cue. Absence is normal, not an error.
    pub fn resolve(&self, cue: &str) -> Option<&Path> {
        self.effects.get(cue).map(PathBuf::as_path)
    }

    /// All known cue names, sorted.
    pub fn cues(&self) -> Vec<&str> {
        let mut cues: Vec<&str> = self.effects.keys().map(String::as_str).collect();
        cues.sort_unstable();
        cues
    }
}

/// Path of the placeholder artifact under an assets directory.
pub fn placeholder_path(dir: &Path) -> PathBuf {
    dir.join("placeholder.wav")
}

/// Make sure the placeholder artifact exists, synthesizing it if needed.
///
/// This is the pipeline's last line of defense: if even this write fails,
/// the storage medium is unusable and the error propagates as fatal.
pub fn ensure_placeholder(dir: &Path) -> Result<PathBuf, StorageUnavailable> {
    let path = placeholder_path(dir);
    if is_cached(&path) {
        return Ok(path);
    }
    let samples = synth_placeholder(SAMPLE_RATE);
    atomic_write(&path, &encode_wav(&samples, SAMPLE_RATE))?;
    log::info!("Synthesized placeholder asset at {}", path.display());
    Ok(path)
}

/// Synthesize any missing default effect assets (and the placeholder)
/// under `dir`. With `force`, existing files are regenerated.
pub fn ensure_assets(dir: &Path, force: bool) -> Result<()> {
    for cue in DEFAULT_CUES {
        let path = dir.join("effects").join(format!("{}.wav", cue));
        if !force && is_cached(&path) {
            continue;
        }
        let synth = SYNTHS[cue];
        atomic_write(&path, &encode_wav(&synth(SAMPLE_RATE), SAMPLE_RATE))?;
        log::info!("Synthesized effect asset: {}", path.display());
    }

    if force {
        std::fs::remove_file(placeholder_path(dir)).ok();
    }
    ensure_placeholder(dir)?;
    Ok(())
}

/// Encode mono f64 samples as an in-memory 16-bit PCM WAV.
fn encode_wav(samples: &[f64], sr: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: sr,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        // Writing to an in-memory cursor cannot fail
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample((s.clamp(-1.0, 1.0) * 32767.0) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

// --- Procedural synthesis -------------------------------------------------
//
// All of these are deterministic: noise comes from a fixed-seed LCG, so
// regenerated assets are byte-identical.

fn lcg(seed: u64) -> impl FnMut() -> f64 {
    let mut state = seed;
    move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    }
}

fn sine(freq: f64, t: f64) -> f64 {
    (2.0 * std::f64::consts::PI * freq * t).sin()
}

/// Placeholder: a soft two-partial chime with a long decay.
fn synth_placeholder(sr: u32) -> Vec<f64> {
    let len = (2.0 * sr as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sr as f64;
            (sine(523.25, t) * 0.5 + sine(659.25, t) * 0.3) * (-t * 1.8).exp() * 0.4
        })
        .collect()
}

/// Rising shimmer of three detuned sines with tremolo.
fn synth_magic(sr: u32) -> Vec<f64> {
    let len = (1.6 * sr as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sr as f64;
            let sweep = 440.0 * (1.0 + t * 1.5);
            let tremolo = 0.7 + 0.3 * sine(6.0, t);
            (sine(sweep, t) * 0.4 + sine(sweep * 1.5, t) * 0.25 + sine(sweep * 2.0, t) * 0.15)
                * tremolo
                * (-t * 1.2).exp()
        })
        .collect()
}

/// Steady broadband noise with a soft attack.
fn synth_rain(sr: u32) -> Vec<f64> {
    let mut noise = lcg(0x5261_494e);
    let len = (2.5 * sr as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sr as f64;
            let attack = (t * 4.0).min(1.0);
            noise() * 0.18 * attack
        })
        .collect()
}

/// Quiet noise bed with periodic bird chirps.
fn synth_forest(sr: u32) -> Vec<f64> {
    let mut noise = lcg(0x464f_5245);
    let len = (2.5 * sr as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sr as f64;
            let bed = noise() * 0.05;
            // A chirp every ~0.8s: short upward sine sweep
            let phase = t % 0.8;
            let chirp = if phase < 0.12 {
                sine(1800.0 + phase * 6000.0, t) * (-phase * 30.0).exp() * 0.25
            } else {
                0.0
            };
            bed + chirp
        })
        .collect()
}

/// Low thump, pitch dropping fast.
fn synth_door(sr: u32) -> Vec<f64> {
    let len = (0.5 * sr as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sr as f64;
            (2.0 * std::f64::consts::PI * 70.0 * t * (-t * 8.0).exp()).sin()
                * (-t * 10.0).exp()
                * 0.8
        })
        .collect()
}

/// Two quick chirps.
fn synth_animal(sr: u32) -> Vec<f64> {
    let len = (1.0 * sr as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sr as f64;
            let phase = t % 0.35;
            if t < 0.7 && phase < 0.15 {
                sine(900.0 + phase * 2500.0, t) * (-phase * 20.0).exp() * 0.4
            } else {
                0.0
            }
        })
        .collect()
}

/// Low-passed noise (three-sample moving average).
fn synth_river(sr: u32) -> Vec<f64> {
    let mut noise = lcg(0x5249_5645);
    let len = (2.5 * sr as f64) as usize;
    let raw: Vec<f64> = (0..len).map(|_| noise() * 0.25).collect();
    raw.iter()
        .enumerate()
        .map(|(i, _)| {
            let a = raw[i.saturating_sub(2)];
            let b = raw[i.saturating_sub(1)];
            (a + b + raw[i]) / 3.0
        })
        .collect()
}

/// Noise with slow amplitude swells.
fn synth_wind(sr: u32) -> Vec<f64> {
    let mut noise = lcg(0x5749_4e44);
    let len = (2.5 * sr as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sr as f64;
            noise() * 0.15 * (0.5 + 0.5 * sine(0.4, t)).powi(2)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::io::read_wav;

    #[test]
    fn test_builtin_registry_knows_default_cues() {
        let dir = tempfile::tempdir().unwrap();
        let reg = EffectRegistry::with_assets_dir(dir.path());
        for cue in DEFAULT_CUES {
            assert!(reg.resolve(cue).is_some(), "missing cue {}", cue);
        }
        assert!(reg.resolve("spaceship").is_none());
    }

    #[test]
    fn test_registry_paths_point_into_effects_dir() {
        let dir = tempfile::tempdir().unwrap();
        let reg = EffectRegistry::with_assets_dir(dir.path());
        let path = reg.resolve("rain").unwrap();
        assert!(path.ends_with("effects/rain.wav"));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("effects.json");
        std::fs::write(&path, r#"{"ocean": "/sounds/ocean.mp3"}"#).unwrap();

        let reg = EffectRegistry::from_json_file(&path).unwrap();
        assert_eq!(reg.resolve("ocean").unwrap(), Path::new("/sounds/ocean.mp3"));
        assert!(reg.resolve("rain").is_none());
    }

    #[test]
    fn test_from_json_file_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("effects.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(EffectRegistry::from_json_file(&path).is_err());
    }

    #[test]
    fn test_ensure_placeholder_creates_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = ensure_placeholder(dir.path()).unwrap();
        let (samples, sr) = read_wav(&path).unwrap();
        assert_eq!(sr, SAMPLE_RATE);
        assert!(!samples.is_empty());
        // Not silent
        assert!(samples.iter().any(|s| s.abs() > 0.05));
    }

    #[test]
    fn test_ensure_placeholder_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let first = ensure_placeholder(dir.path()).unwrap();
        let mtime = std::fs::metadata(&first).unwrap().modified().unwrap();
        let second = ensure_placeholder(dir.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::metadata(&second).unwrap().modified().unwrap(), mtime);
    }

    #[test]
    fn test_ensure_assets_synthesizes_all_cues() {
        let dir = tempfile::tempdir().unwrap();
        ensure_assets(dir.path(), false).unwrap();

        let reg = EffectRegistry::with_assets_dir(dir.path());
        for cue in DEFAULT_CUES {
            let path = reg.resolve(cue).unwrap();
            let (samples, sr) = read_wav(path).unwrap();
            assert_eq!(sr, SAMPLE_RATE, "wrong rate for {}", cue);
            assert!(samples.iter().any(|s| s.abs() > 0.01), "{} is silent", cue);
        }
        assert!(placeholder_path(dir.path()).exists());
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        assert_eq!(synth_rain(SAMPLE_RATE), synth_rain(SAMPLE_RATE));
        assert_eq!(synth_forest(SAMPLE_RATE), synth_forest(SAMPLE_RATE));
    }
}
