//! Talespin core — the narrated children's-story audio pipeline.
//!
//! Story text and a title go in; an ordered plan of speech and effect
//! segments is built, rendered item by item (with content-addressed
//! caching of synthesized speech), and combined into one playable WAV.
//! External capabilities — text generation and speech synthesis — sit
//! behind traits and degrade to built-in fallbacks when unavailable.

pub mod assets;
pub mod audio;
pub mod cache;
pub mod classify;
pub mod duration;
pub mod mixer;
pub mod names;
pub mod sequence;
pub mod speech;
pub mod story;
pub mod types;
pub mod voices;

pub use assets::EffectRegistry;
pub use cache::StorageUnavailable;
pub use mixer::Mixer;
pub use sequence::build_sequence;
pub use speech::SpeechRenderer;
pub use story::StoryPipeline;
pub use types::{Artifact, NarrationOutput, SoundItem, SoundKind, StoryParams, StoryRecord, Tone};
pub use voices::VoiceRegistry;
