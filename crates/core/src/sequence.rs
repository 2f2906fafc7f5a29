//! Turn story text into an ordered plan of speech and effect items.

use crate::classify::{classify_tone, suggest_effect};
use crate::types::{SoundItem, Tone};

/// Pause after a paragraph that has more text following it.
const PARAGRAPH_PAUSE: f64 = 0.8;
/// Pause after the final paragraph.
const FINAL_PARAGRAPH_PAUSE: f64 = 0.5;

/// Build the narration plan for a story.
///
/// The plan always opens with a "magic" effect and the title narration and
/// closes with a second "magic" effect, so it is never shorter than three
/// items even for empty story text. Paragraphs are split on blank lines;
/// whitespace-only paragraphs are dropped before indexing, so they never
/// consume a slot. In stories longer than three paragraphs, every third
/// non-terminal paragraph may be followed by a keyword-matched ambient
/// effect.
pub fn build_sequence(story_text: &str, title: &str) -> Vec<SoundItem> {
    let mut sequence = vec![SoundItem::effect("magic", 0.5, 0.7)];

    sequence.push(SoundItem::speech(
        format!("The story of {}", title),
        Tone::Excited,
        1.0,
    ));

    let paragraphs: Vec<&str> = story_text
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    let n = paragraphs.len();

    for (i, paragraph) in paragraphs.iter().enumerate() {
        let pause = if i < n - 1 {
            PARAGRAPH_PAUSE
        } else {
            FINAL_PARAGRAPH_PAUSE
        };
        sequence.push(SoundItem::speech(*paragraph, classify_tone(paragraph), pause));

        if i < n - 1 && i % 3 == 0 && n > 3 {
            if let Some(cue) = suggest_effect(paragraph) {
                sequence.push(SoundItem::effect(cue, 0.5, 0.5));
            }
        }
    }

    sequence.push(SoundItem::effect("magic", 0.0, 0.5));
    sequence
}
