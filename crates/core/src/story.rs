//! Story generation and the narration entry point.
//!
//! The text-generation provider is an opaque capability behind a trait;
//! when it fails or returns unusable text, a built-in templated story is
//! used instead so a request always produces something narratable.

use anyhow::Result;
use chrono::Utc;

use crate::duration::estimate;
use crate::mixer::Mixer;
use crate::sequence::build_sequence;
use crate::types::{NarrationOutput, StoryParams, StoryRecord};

/// An external text generation capability.
pub trait StoryTextGenerator: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String>;
}

/// Build the generation prompt for one request.
pub fn build_story_prompt(params: &StoryParams) -> String {
    let mut prompt = format!(
        "Write a children's story for ages {} that takes about {} minutes to read aloud.",
        params.age_group,
        params.length.minutes_hint()
    );
    if let Some(theme) = &params.theme {
        prompt.push_str(&format!(" The story should teach about {}.", theme));
    }
    if let Some(setting) = &params.setting {
        prompt.push_str(&format!(" It takes place in {}.", setting));
    }
    if !params.characters.is_empty() {
        prompt.push_str(&format!(" Include these characters: {}.", params.characters.join(", ")));
    }
    if let Some(name) = &params.child_name {
        prompt.push_str(&format!(" The hero of the story is a child named {}.", name));
    }
    prompt.push_str(&format!(
        " Write it in the language with code '{}'. \
         Start your reply with 'Title: ' followed by the story title on its own line, \
         then the story text in short paragraphs separated by blank lines.",
        params.language
    ));
    prompt
}

/// Split generated content into (title, story text).
///
/// Accepts a leading "Title:" line, or treats a short first line that is
/// not story prose as the title. Anything unparseable keeps the default
/// title and uses the whole content as text.
pub fn parse_story_content(content: &str, params: &StoryParams) -> (String, String) {
    let (default_title, default_text) = fallback_story(params);
    let content = content.trim();
    if content.is_empty() {
        return (default_title, default_text);
    }

    let (title, text) = if let Some(rest) = content.strip_prefix("Title:") {
        match rest.split_once('\n') {
            Some((first, body)) => (first.trim().to_string(), body.trim().to_string()),
            None => (rest.trim().to_string(), String::new()),
        }
    } else {
        let mut lines = content.splitn(2, '\n');
        let first = lines.next().unwrap_or_default().trim();
        let body = lines.next().unwrap_or_default().trim();
        if first.len() < 100 && !first.starts_with("Once upon") {
            (first.to_string(), body.to_string())
        } else {
            (String::new(), content.to_string())
        }
    };

    (
        if title.is_empty() { default_title } else { title },
        if text.is_empty() { default_text } else { text },
    )
}

/// The built-in templated story used when generation is unavailable.
pub fn fallback_story(params: &StoryParams) -> (String, String) {
    let setting = params.setting.as_deref().unwrap_or("magical land");
    let theme = params.theme.as_deref().unwrap_or("kindness");
    let hero = params.child_name.as_deref().unwrap_or("a brave little child");

    let title = format!("The Adventure in the {}", setting);
    let text = format!(
        "Once upon a time, in a {setting}, there lived {hero}.\n\n\
         Every morning the sun rose over the {setting}, and every morning \
         there was something new to discover. One day, a small voice called \
         out for help, and without a moment's thought our hero went to find it.\n\n\
         Along the way there were puzzles to solve and friends to make, and \
         each one taught a little more about {theme}.\n\n\
         And when the day was done and the stars came out over the {setting}, \
         everyone agreed: {theme} had made all the difference. The end."
    );
    (title, text)
}

/// The whole pipeline behind one door: text generation, sequencing,
/// rendering, and duration estimation.
pub struct StoryPipeline {
    generator: Option<Box<dyn StoryTextGenerator>>,
    mixer: Mixer,
}

impl StoryPipeline {
    pub fn new(generator: Option<Box<dyn StoryTextGenerator>>, mixer: Mixer) -> Self {
        StoryPipeline { generator, mixer }
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    /// Narrate existing story text: build the plan, render it, estimate
    /// its duration. Stateless beyond the shared cache and registries.
    pub fn generate_narration(
        &self,
        story_text: &str,
        title: &str,
        voice_id: &str,
    ) -> Result<NarrationOutput> {
        let sequence = build_sequence(story_text, title);
        let estimated_duration = estimate(&sequence);
        let mix = self.mixer.render(&sequence, voice_id)?;
        if mix.degraded {
            log::warn!("Narration degraded to placeholder audio for some items");
        }
        Ok(NarrationOutput { artifact: mix.artifact, estimated_duration })
    }

    /// Generate a brand-new story and narrate it.
    pub fn generate_story(&self, params: &StoryParams) -> Result<StoryRecord> {
        let (title, text) = self.generate_text(params);
        log::info!("Generated story '{}' ({} chars)", title, text.len());

        let sequence = build_sequence(&text, &title);
        let duration = estimate(&sequence);
        let mix = self.mixer.render(&sequence, &params.voice)?;

        Ok(StoryRecord {
            id: uuid::Uuid::new_v4(),
            title,
            text,
            audio_path: mix.artifact.path().to_path_buf(),
            duration: duration.to_string(),
            theme: params.theme.clone(),
            age_group: params.age_group.clone(),
            language: params.language.clone(),
            created_for: params.child_name.clone(),
            created_at: Utc::now(),
            degraded: mix.degraded,
        })
    }

    fn generate_text(&self, params: &StoryParams) -> (String, String) {
        let Some(generator) = self.generator.as_deref() else {
            log::warn!("No text generator configured, using built-in story");
            return fallback_story(params);
        };

        let prompt = build_story_prompt(params);
        match generator.generate(&prompt) {
            Ok(content) => parse_story_content(&content, params),
            Err(e) => {
                log::warn!("Story generation failed ({:#}), using built-in story", e);
                fallback_story(params)
            }
        }
    }
}

/// REST text generation client (Gemini generateContent wire format).
#[cfg(feature = "remote-providers")]
pub mod rest {
    use anyhow::{bail, Context, Result};
    use serde::Deserialize;
    use std::time::Duration;

    use super::StoryTextGenerator;

    const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

    pub struct RestGenerator {
        client: reqwest::blocking::Client,
        endpoint: String,
        api_key: String,
    }

    #[derive(Deserialize)]
    struct GenerateResponse {
        candidates: Vec<Candidate>,
    }

    #[derive(Deserialize)]
    struct Candidate {
        content: Content,
    }

    #[derive(Deserialize)]
    struct Content {
        parts: Vec<Part>,
    }

    #[derive(Deserialize)]
    struct Part {
        text: String,
    }

    impl RestGenerator {
        pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
            let client = reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .context("Failed to build HTTP client")?;
            Ok(RestGenerator {
                client,
                endpoint: endpoint.into(),
                api_key: api_key.into(),
            })
        }

        /// Build from the `GEMINI_API_KEY` env var. `None` when unset.
        pub fn from_env() -> Option<Result<Self>> {
            let key = std::env::var("GEMINI_API_KEY").ok()?;
            Some(Self::new(DEFAULT_ENDPOINT, key))
        }
    }

    impl StoryTextGenerator for RestGenerator {
        fn generate(&self, prompt: &str) -> Result<String> {
            let body = serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
            });

            let response = self
                .client
                .post(&self.endpoint)
                .query(&[("key", self.api_key.as_str())])
                .json(&body)
                .send()
                .context("Text generation request failed")?;

            if !response.status().is_success() {
                bail!("Text generation provider returned HTTP {}", response.status());
            }

            let parsed: GenerateResponse =
                response.json().context("Invalid generation response body")?;
            let text = parsed
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content.parts.into_iter().next())
                .map(|p| p.text)
                .unwrap_or_default();
            if text.trim().is_empty() {
                bail!("Text generation provider returned no text");
            }
            Ok(text)
        }
    }
}
