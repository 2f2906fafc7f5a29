use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Emotional coloring applied to synthesized speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Neutral,
    Happy,
    Sad,
    Excited,
    Calm,
    Scared,
    Mysterious,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Neutral => "neutral",
            Tone::Happy => "happy",
            Tone::Sad => "sad",
            Tone::Excited => "excited",
            Tone::Calm => "calm",
            Tone::Scared => "scared",
            Tone::Mysterious => "mysterious",
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a sequence item is spoken narration or an ambient effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundKind {
    Speech,
    Effect,
}

/// One unit of a narration plan.
///
/// For `Speech` items `content` is the text to synthesize; for `Effect`
/// items it is the symbolic cue name of a sound asset. Constructed via
/// [`SoundItem::speech`] / [`SoundItem::effect`], which enforce the
/// invariants: volume clamped to [0, 1], pause non-negative, and no tone
/// on effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundItem {
    pub kind: SoundKind,
    pub content: String,
    pub tone: Option<Tone>,
    /// Silence to insert after this item, in seconds.
    pub pause_after: f64,
    /// Playback gain in [0, 1].
    pub volume: f64,
}

impl SoundItem {
    fn new(
        kind: SoundKind,
        content: String,
        tone: Option<Tone>,
        pause_after: f64,
        volume: f64,
    ) -> Self {
        SoundItem {
            kind,
            content,
            // Effects carry no tone, whatever the caller passed
            tone: if kind == SoundKind::Effect { None } else { tone },
            pause_after: pause_after.max(0.0),
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn speech(content: impl Into<String>, tone: Tone, pause_after: f64) -> Self {
        Self::new(SoundKind::Speech, content.into(), Some(tone), pause_after, 1.0)
    }

    pub fn effect(cue: impl Into<String>, pause_after: f64, volume: f64) -> Self {
        Self::new(SoundKind::Effect, cue.into(), None, pause_after, volume)
    }

    /// Override the volume, keeping the clamping invariant.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume.clamp(0.0, 1.0);
        self
    }

    pub fn is_speech(&self) -> bool {
        self.kind == SoundKind::Speech
    }

    pub fn is_effect(&self) -> bool {
        self.kind == SoundKind::Effect
    }
}

/// A rendered audio file reference, tagged with how it was obtained.
///
/// `Fallback` means the renderer degraded to the placeholder asset instead
/// of failing; callers can log or surface that without treating it as an
/// error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Freshly synthesized/mixed and written to disk.
    Fresh(PathBuf),
    /// Served from the content-addressed cache without touching a provider.
    Cached(PathBuf),
    /// The designated placeholder, used when a capability failed.
    Fallback(PathBuf),
}

impl Artifact {
    pub fn path(&self) -> &Path {
        match self {
            Artifact::Fresh(p) | Artifact::Cached(p) | Artifact::Fallback(p) => p,
        }
    }

    pub fn into_path(self) -> PathBuf {
        match self {
            Artifact::Fresh(p) | Artifact::Cached(p) | Artifact::Fallback(p) => p,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Artifact::Fallback(_))
    }
}

/// Requested story length bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl StoryLength {
    /// Minute range used in the generation prompt.
    pub fn minutes_hint(&self) -> &'static str {
        match self {
            StoryLength::Short => "3-5",
            StoryLength::Medium => "5-10",
            StoryLength::Long => "10-15",
        }
    }
}

/// Parameters for one story generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryParams {
    pub theme: Option<String>,
    #[serde(default)]
    pub characters: Vec<String>,
    pub setting: Option<String>,
    #[serde(default)]
    pub length: StoryLength,
    pub age_group: String,
    pub language: String,
    pub child_name: Option<String>,
    /// Voice profile id used for narration.
    pub voice: String,
}

impl Default for StoryParams {
    fn default() -> Self {
        StoryParams {
            theme: None,
            characters: Vec::new(),
            setting: None,
            length: StoryLength::default(),
            age_group: "5-8".to_string(),
            language: "en".to_string(),
            child_name: None,
            voice: "default".to_string(),
        }
    }
}

/// What the narration entry point hands back to the caller.
#[derive(Debug, Clone)]
pub struct NarrationOutput {
    pub artifact: Artifact,
    pub estimated_duration: &'static str,
}

/// A finished story: text plus the narrated artifact.
///
/// This is the payload a persistence layer would store; producing it is
/// where this crate's contract ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRecord {
    pub id: uuid::Uuid,
    pub title: String,
    pub text: String,
    pub audio_path: PathBuf,
    pub duration: String,
    pub theme: Option<String>,
    pub age_group: String,
    pub language: String,
    pub created_for: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    /// True when any part of the narration degraded to the placeholder.
    pub degraded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamped_low() {
        let item = SoundItem::effect("magic", 0.5, -0.5);
        assert_eq!(item.volume, 0.0);
    }

    #[test]
    fn test_volume_clamped_high() {
        let item = SoundItem::effect("magic", 0.5, 1.7);
        assert_eq!(item.volume, 1.0);
    }

    #[test]
    fn test_volume_in_range_untouched() {
        let item = SoundItem::effect("rain", 0.0, 0.6);
        assert_eq!(item.volume, 0.6);
    }

    #[test]
    fn test_effect_has_no_tone() {
        let item = SoundItem::effect("forest", 0.5, 0.5);
        assert!(item.tone.is_none());
        assert!(item.is_effect());
    }

    #[test]
    fn test_speech_keeps_tone() {
        let item = SoundItem::speech("hello", Tone::Happy, 0.8);
        assert_eq!(item.tone, Some(Tone::Happy));
        assert!(item.is_speech());
        assert_eq!(item.volume, 1.0);
    }

    #[test]
    fn test_negative_pause_clamped() {
        let item = SoundItem::speech("hi", Tone::Neutral, -1.0);
        assert_eq!(item.pause_after, 0.0);
    }

    #[test]
    fn test_tone_display() {
        assert_eq!(Tone::Mysterious.to_string(), "mysterious");
        assert_eq!(Tone::Neutral.to_string(), "neutral");
    }

    #[test]
    fn test_artifact_accessors() {
        let a = Artifact::Fallback(PathBuf::from("/tmp/placeholder.wav"));
        assert!(a.is_fallback());
        assert_eq!(a.path(), Path::new("/tmp/placeholder.wav"));

        let b = Artifact::Cached(PathBuf::from("x.wav"));
        assert!(!b.is_fallback());
    }

    #[test]
    fn test_sound_item_serde_roundtrip() {
        let item = SoundItem::speech("once upon a time", Tone::Calm, 0.8);
        let json = serde_json::to_string(&item).unwrap();
        let back: SoundItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }

    #[test]
    fn test_story_params_defaults() {
        let p = StoryParams::default();
        assert_eq!(p.age_group, "5-8");
        assert_eq!(p.language, "en");
        assert_eq!(p.voice, "default");
        assert_eq!(p.length, StoryLength::Medium);
    }

    #[test]
    fn test_length_minutes_hint() {
        assert_eq!(StoryLength::Short.minutes_hint(), "3-5");
        assert_eq!(StoryLength::Long.minutes_hint(), "10-15");
    }
}
