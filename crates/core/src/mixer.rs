//! Walk a narration plan and combine every item's audio into one artifact.
//!
//! The correctness contract is "always produce a playable file": items
//! whose audio cannot be obtained are dropped (effects) or replaced by the
//! placeholder (speech), and if combination itself fails the placeholder
//! is returned outright. Only unusable storage propagates as an error.

use std::path::PathBuf;

use crate::assets::{ensure_placeholder, EffectRegistry};
use crate::audio::effects::{apply_fades, apply_gain, concat_with_gaps, limit_peak};
use crate::audio::io::{decode_audio, resample, write_wav};
use crate::audio::SAMPLE_RATE;
use crate::cache::{self, StorageUnavailable};
use crate::speech::SpeechRenderer;
use crate::types::{Artifact, SoundItem, SoundKind, Tone};

/// Overall fade-in applied to the combined artifact, seconds.
const FADE_IN: f64 = 0.3;
/// Overall fade-out applied to the combined artifact, seconds.
const FADE_OUT: f64 = 0.5;
/// Peak ceiling after summing scaled clips.
const PEAK_CEILING: f64 = 0.95;

/// Result of rendering one sequence.
#[derive(Debug)]
pub struct MixOutput {
    pub artifact: Artifact,
    /// True when any speech item fell back to the placeholder or the
    /// combination itself degraded.
    pub degraded: bool,
}

/// Renders ordered [`SoundItem`] plans into a single WAV artifact.
pub struct Mixer {
    speech: SpeechRenderer,
    effects: EffectRegistry,
    output_dir: PathBuf,
    assets_dir: PathBuf,
}

impl Mixer {
    pub fn new(speech: SpeechRenderer, effects: EffectRegistry) -> Self {
        Mixer {
            speech,
            effects,
            output_dir: cache::cache_dir().join("generated"),
            assets_dir: cache::assets_dir(),
        }
    }

    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    pub fn with_assets_dir(mut self, dir: PathBuf) -> Self {
        self.assets_dir = dir;
        self
    }

    pub fn speech(&self) -> &SpeechRenderer {
        &self.speech
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    /// Render a sequence to a fresh output file.
    ///
    /// `voice_id` selects the narration voice for all speech items.
    pub fn render(
        &self,
        sequence: &[SoundItem],
        voice_id: &str,
    ) -> Result<MixOutput, StorageUnavailable> {
        log::info!("Rendering sequence of {} sound items", sequence.len());

        let mut clips: Vec<Vec<f64>> = Vec::new();
        let mut gaps: Vec<f64> = Vec::new();
        let mut degraded = false;

        for item in sequence {
            let source = match item.kind {
                SoundKind::Speech => {
                    let artifact = self.speech.synthesize(
                        &item.content,
                        voice_id,
                        item.tone.unwrap_or(Tone::Neutral),
                    )?;
                    degraded |= artifact.is_fallback();
                    Some(artifact.into_path())
                }
                SoundKind::Effect => match self.effects.resolve(&item.content) {
                    Some(path) => Some(path.to_path_buf()),
                    None => {
                        log::debug!("No asset for effect cue '{}', skipping", item.content);
                        None
                    }
                },
            };

            let Some(path) = source else { continue };

            match decode_audio(&path).and_then(|(s, sr)| resample(&s, sr, SAMPLE_RATE)) {
                Ok(mut samples) => {
                    apply_gain(&mut samples, item.volume);
                    clips.push(samples);
                    gaps.push(item.pause_after);
                }
                Err(e) => {
                    log::warn!("Skipping unreadable audio {} ({:#})", path.display(), e);
                    degraded = true;
                }
            }
        }

        if clips.is_empty() {
            log::warn!("Nothing to combine, returning placeholder");
            return Ok(MixOutput {
                artifact: Artifact::Fallback(ensure_placeholder(&self.assets_dir)?),
                degraded: true,
            });
        }

        // Gaps sit between adjacent items; the last pause has nothing to
        // separate and is dropped by concat_with_gaps.
        let mut combined = concat_with_gaps(&clips, &gaps, SAMPLE_RATE);
        limit_peak(&mut combined, PEAK_CEILING);
        apply_fades(&mut combined, SAMPLE_RATE, FADE_IN, FADE_OUT);

        let output_path = self
            .output_dir
            .join(format!("story_{}.wav", uuid::Uuid::new_v4().simple()));

        match write_wav(&output_path, &combined, SAMPLE_RATE) {
            Ok(()) => {
                log::info!(
                    "Combined {} clips into {} ({:.1}s)",
                    clips.len(),
                    output_path.display(),
                    combined.len() as f64 / SAMPLE_RATE as f64
                );
                Ok(MixOutput { artifact: Artifact::Fresh(output_path), degraded })
            }
            Err(e) => {
                log::warn!("Failed to write combined audio ({:#}), using placeholder", e);
                Ok(MixOutput {
                    artifact: Artifact::Fallback(ensure_placeholder(&self.assets_dir)?),
                    degraded: true,
                })
            }
        }
    }
}
