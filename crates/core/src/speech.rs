//! Speech rendering: resolve a voice, check the content-addressed cache,
//! call the synthesis provider, degrade to the placeholder on failure.

use std::path::PathBuf;

use anyhow::Result;

use crate::assets::ensure_placeholder;
use crate::cache::{self, atomic_write, is_cached, StorageUnavailable};
use crate::types::{Artifact, Tone};
use crate::voices::{tone_parameters, VoiceProfile, VoiceRegistry};

/// An external text-to-speech capability.
///
/// Implementations return encoded audio bytes (WAV). `pitch` is a semitone
/// offset, `rate` the absolute speaking rate after tone adjustment.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str, voice: &VoiceProfile, pitch: f64, rate: f64)
        -> Result<Vec<u8>>;
}

/// Renders speech items to audio artifacts.
///
/// Holds the immutable voice registry and an optional provider backend.
/// With no backend every request degrades to the placeholder, which keeps
/// the pipeline usable for offline development.
pub struct SpeechRenderer {
    voices: VoiceRegistry,
    backend: Option<Box<dyn SpeechSynthesizer>>,
    cache_dir: PathBuf,
    assets_dir: PathBuf,
}

impl SpeechRenderer {
    pub fn new(voices: VoiceRegistry, backend: Option<Box<dyn SpeechSynthesizer>>) -> Self {
        SpeechRenderer {
            voices,
            backend,
            cache_dir: cache::cache_dir(),
            assets_dir: cache::assets_dir(),
        }
    }

    /// Override storage locations (used by tests and the CLI).
    pub fn with_dirs(mut self, cache_dir: PathBuf, assets_dir: PathBuf) -> Self {
        self.cache_dir = cache_dir;
        self.assets_dir = assets_dir;
        self
    }

    pub fn voices(&self) -> &VoiceRegistry {
        &self.voices
    }

    /// Synthesize one text segment.
    ///
    /// At most one provider call is ever made per distinct (text, voice,
    /// tone) triple for the lifetime of the cache directory. Provider
    /// failures return the placeholder as [`Artifact::Fallback`]; the only
    /// error is unusable storage.
    pub fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        tone: Tone,
    ) -> Result<Artifact, StorageUnavailable> {
        let voice = self.voices.resolve(voice_id);
        let path = cache::speech_cache_path(&self.cache_dir, text, &voice.id, tone);

        if is_cached(&path) {
            log::debug!("Cache hit: {}", path.display());
            return Ok(Artifact::Cached(path));
        }

        let Some(backend) = self.backend.as_deref() else {
            log::warn!("No synthesis backend configured, using placeholder");
            return self.fallback();
        };

        let (pitch, rate) = tone_parameters(tone, voice.speaking_rate);
        log::info!(
            "Synthesizing {} chars with voice '{}' ({}, pitch {:+}, rate {:.2})",
            text.len(),
            voice.id,
            tone,
            pitch,
            rate
        );

        match backend.synthesize(text, voice, pitch, rate) {
            Ok(audio) => {
                atomic_write(&path, &audio)?;
                Ok(Artifact::Fresh(path))
            }
            Err(e) => {
                log::warn!("Speech synthesis failed ({:#}), using placeholder", e);
                self.fallback()
            }
        }
    }

    fn fallback(&self) -> Result<Artifact, StorageUnavailable> {
        Ok(Artifact::Fallback(ensure_placeholder(&self.assets_dir)?))
    }
}

/// REST text-to-speech client (Google Cloud TTS wire format).
#[cfg(feature = "remote-providers")]
pub mod rest {
    use anyhow::{bail, Context, Result};
    use base64::Engine;
    use serde::Deserialize;
    use std::time::Duration;

    use super::SpeechSynthesizer;
    use crate::voices::VoiceProfile;

    const DEFAULT_ENDPOINT: &str =
        "https://texttospeech.googleapis.com/v1/text:synthesize";
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub struct RestSynthesizer {
        client: reqwest::blocking::Client,
        endpoint: String,
        api_key: String,
    }

    #[derive(Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SynthesizeResponse {
        audio_content: String,
    }

    impl RestSynthesizer {
        pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .context("Failed to build HTTP client")?;
            Ok(RestSynthesizer {
                client,
                endpoint: endpoint.into(),
                api_key: api_key.into(),
            })
        }

        /// Build from the `TTS_API_KEY` env var. `None` when unset, so the
        /// caller can fall back to placeholder-only rendering.
        pub fn from_env() -> Option<Result<Self>> {
            let key = std::env::var("TTS_API_KEY").ok()?;
            Some(Self::new(DEFAULT_ENDPOINT, key))
        }
    }

    impl SpeechSynthesizer for RestSynthesizer {
        fn synthesize(
            &self,
            text: &str,
            voice: &VoiceProfile,
            pitch: f64,
            rate: f64,
        ) -> Result<Vec<u8>> {
            let body = serde_json::json!({
                "input": { "text": text },
                "voice": {
                    "languageCode": voice.language,
                    "name": voice.provider_voice,
                },
                "audioConfig": {
                    "audioEncoding": "LINEAR16",
                    "pitch": pitch,
                    "speakingRate": rate,
                },
            });

            let response = self
                .client
                .post(&self.endpoint)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .context("TTS request failed")?;

            if !response.status().is_success() {
                bail!("TTS provider returned HTTP {}", response.status());
            }

            let parsed: SynthesizeResponse =
                response.json().context("Invalid TTS response body")?;
            let audio = base64::engine::general_purpose::STANDARD
                .decode(parsed.audio_content)
                .context("TTS audio payload is not valid base64")?;
            if audio.is_empty() {
                bail!("TTS provider returned empty audio");
            }
            Ok(audio)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets;
    use crate::voices::VoiceRegistry;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Backend that counts invocations and returns a fixed tiny WAV.
    struct CountingBackend {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl SpeechSynthesizer for CountingBackend {
        fn synthesize(
            &self,
            _text: &str,
            _voice: &VoiceProfile,
            _pitch: f64,
            _rate: f64,
        ) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("provider down");
            }
            // Minimal valid WAV payload, built in memory
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: 24000,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let mut cursor = std::io::Cursor::new(Vec::new());
            {
                let mut w = hound::WavWriter::new(&mut cursor, spec).unwrap();
                for _ in 0..2400 {
                    w.write_sample(3277i16).unwrap();
                }
                w.finalize().unwrap();
            }
            Ok(cursor.into_inner())
        }
    }

    fn renderer(fail: bool) -> (SpeechRenderer, Arc<AtomicUsize>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = CountingBackend { calls: calls.clone(), fail };
        let r = SpeechRenderer::new(VoiceRegistry::builtin(), Some(Box::new(backend)))
            .with_dirs(dir.path().join("cache"), dir.path().join("assets"));
        (r, calls, dir)
    }

    #[test]
    fn test_synthesis_cached_after_first_call() {
        let (r, calls, _dir) = renderer(false);

        let first = r.synthesize("hello there", "default", Tone::Calm).unwrap();
        assert!(matches!(first, Artifact::Fresh(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = r.synthesize("hello there", "default", Tone::Calm).unwrap();
        assert!(matches!(second, Artifact::Cached(_)));
        assert_eq!(second.path(), first.path());
        // Provider contacted at most once for identical inputs
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_distinct_tone_is_a_distinct_entry() {
        let (r, calls, _dir) = renderer(false);
        let a = r.synthesize("hello", "default", Tone::Happy).unwrap();
        let b = r.synthesize("hello", "default", Tone::Sad).unwrap();
        assert_ne!(a.path(), b.path());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_provider_failure_degrades_to_placeholder() {
        let (r, _calls, dir) = renderer(true);
        let artifact = r.synthesize("hello", "default", Tone::Neutral).unwrap();
        assert!(artifact.is_fallback());
        assert_eq!(
            artifact.path(),
            assets::placeholder_path(&dir.path().join("assets"))
        );
        assert!(artifact.path().exists());
    }

    #[test]
    fn test_no_backend_degrades_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let r = SpeechRenderer::new(VoiceRegistry::builtin(), None)
            .with_dirs(dir.path().join("cache"), dir.path().join("assets"));
        let artifact = r.synthesize("hi", "default", Tone::Neutral).unwrap();
        assert!(artifact.is_fallback());
    }

    #[test]
    fn test_unknown_voice_uses_default_profile() {
        let (r, calls, _dir) = renderer(false);
        let artifact = r.synthesize("hi", "not-a-voice", Tone::Neutral).unwrap();
        // Resolved to the default voice's cache key
        assert!(artifact
            .path()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("speech_default_"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
