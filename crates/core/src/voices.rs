//! Voice profile registry and tone-to-prosody mapping.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::types::Tone;

/// A named synthesis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub id: String,
    pub name: String,
    /// BCP-47 language tag passed to the provider.
    pub language: String,
    /// Provider-side voice identifier.
    pub provider_voice: String,
    /// Base speaking rate; tone multipliers apply on top of this.
    pub speaking_rate: f64,
}

/// Immutable set of voice profiles, loaded once at startup.
///
/// Guaranteed non-empty, so [`VoiceRegistry::resolve`] can always fall back
/// to something.
#[derive(Debug, Clone)]
pub struct VoiceRegistry {
    voices: Vec<VoiceProfile>,
}

impl VoiceRegistry {
    /// The built-in storyteller voices.
    pub fn builtin() -> Self {
        let voices = vec![
            VoiceProfile {
                id: "dadi".into(),
                name: "Dadi Maa".into(),
                language: "hi-IN".into(),
                provider_voice: "hi-IN-Neural2-A".into(),
                speaking_rate: 0.85,
            },
            VoiceProfile {
                id: "nani".into(),
                name: "Nani".into(),
                language: "hi-IN".into(),
                provider_voice: "hi-IN-Neural2-B".into(),
                speaking_rate: 0.85,
            },
            VoiceProfile {
                id: "chacha".into(),
                name: "Chacha".into(),
                language: "hi-IN".into(),
                provider_voice: "hi-IN-Neural2-C".into(),
                speaking_rate: 0.95,
            },
            VoiceProfile {
                id: "default".into(),
                name: "Storyteller".into(),
                language: "en-IN".into(),
                provider_voice: "en-IN-Neural2-A".into(),
                speaking_rate: 1.0,
            },
        ];
        log::debug!("Loaded {} built-in voice profiles", voices.len());
        VoiceRegistry { voices }
    }

    /// Load a registry from a JSON array of profiles.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read voice registry: {}", path.display()))?;
        let voices: Vec<VoiceProfile> = serde_json::from_str(&data)
            .with_context(|| format!("Invalid voice registry: {}", path.display()))?;
        if voices.is_empty() {
            bail!("Voice registry {} contains no profiles", path.display());
        }
        log::info!("Loaded {} voice profiles from {}", voices.len(), path.display());
        Ok(VoiceRegistry { voices })
    }

    /// Resolve a voice id, falling back to "default", then the first entry.
    ///
    /// Never fails: the registry is non-empty by construction.
    pub fn resolve(&self, voice_id: &str) -> &VoiceProfile {
        if let Some(v) = self.voices.iter().find(|v| v.id == voice_id) {
            return v;
        }
        log::warn!("Voice id '{}' not found, using default", voice_id);
        self.voices
            .iter()
            .find(|v| v.id == "default")
            .unwrap_or(&self.voices[0])
    }

    pub fn all(&self) -> &[VoiceProfile] {
        &self.voices
    }
}

/// Map a tone to (pitch offset in semitones, rate multiplier).
///
/// Applied on top of the voice profile's base speaking rate.
pub fn tone_parameters(tone: Tone, base_rate: f64) -> (f64, f64) {
    match tone {
        Tone::Happy => (2.0, base_rate * 1.1),
        Tone::Sad => (-2.0, base_rate * 0.9),
        Tone::Excited => (4.0, base_rate * 1.2),
        Tone::Calm => (0.0, base_rate * 0.9),
        Tone::Scared => (1.0, base_rate * 1.15),
        Tone::Mysterious => (-1.0, base_rate * 0.95),
        Tone::Neutral => (0.0, base_rate),
    }
}
