//! Keyword-based tone and sound-effect classification.
//!
//! Both functions are pure and deterministic: text is lower-cased and the
//! first matching category wins. The category order is fixed and carried
//! over unchanged from earlier versions of the pipeline; it resolves ties,
//! not keyword counts.

use crate::types::Tone;

const HAPPY_WORDS: &[&str] = &["happy", "joy", "laugh", "smile", "dance", "celebrate"];
const SCARED_WORDS: &[&str] = &["scared", "fear", "afraid", "terrified", "horror"];
const SAD_WORDS: &[&str] = &["sad", "cry", "tear", "sorrow", "unhappy"];
const EXCITED_WORDS: &[&str] = &["wow", "amazing", "wonder", "incredible", "magic"];
const CALM_WORDS: &[&str] = &["calm", "peace", "quiet", "gentle", "soft"];
const MYSTERIOUS_WORDS: &[&str] = &["secret", "mystery", "hidden", "unknown"];

const FOREST_WORDS: &[&str] = &["forest", "tree", "wood", "jungle"];
const RAIN_WORDS: &[&str] = &["rain", "storm", "thunder", "water"];
const MAGIC_WORDS: &[&str] = &["magic", "spell", "wizard", "fairy"];
const DOOR_WORDS: &[&str] = &["door", "knock", "enter", "house"];
const ANIMAL_WORDS: &[&str] = &["animal", "dog", "cat", "bird"];

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

/// Pick a narration tone for a paragraph of story text.
pub fn classify_tone(text: &str) -> Tone {
    let text = text.to_lowercase();

    if contains_any(&text, HAPPY_WORDS) {
        Tone::Happy
    } else if contains_any(&text, SCARED_WORDS) {
        Tone::Scared
    } else if contains_any(&text, SAD_WORDS) {
        Tone::Sad
    } else if contains_any(&text, EXCITED_WORDS) {
        Tone::Excited
    } else if contains_any(&text, CALM_WORDS) {
        Tone::Calm
    } else if contains_any(&text, MYSTERIOUS_WORDS) {
        Tone::Mysterious
    } else {
        Tone::Neutral
    }
}

/// Suggest an ambient effect cue for a paragraph, if any keyword matches.
pub fn suggest_effect(text: &str) -> Option<&'static str> {
    let text = text.to_lowercase();

    if contains_any(&text, FOREST_WORDS) {
        Some("forest")
    } else if contains_any(&text, RAIN_WORDS) {
        Some("rain")
    } else if contains_any(&text, MAGIC_WORDS) {
        Some("magic")
    } else if contains_any(&text, DOOR_WORDS) {
        Some("door")
    } else if contains_any(&text, ANIMAL_WORDS) {
        Some("animal")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_basic_categories() {
        assert_eq!(classify_tone("They began to dance with joy"), Tone::Happy);
        assert_eq!(classify_tone("He was terrified of the dark"), Tone::Scared);
        assert_eq!(classify_tone("A single tear rolled down"), Tone::Sad);
        assert_eq!(classify_tone("What an incredible sight!"), Tone::Excited);
        assert_eq!(classify_tone("The gentle breeze blew"), Tone::Calm);
        assert_eq!(classify_tone("Behind the hidden wall"), Tone::Mysterious);
        assert_eq!(classify_tone("The fox walked along"), Tone::Neutral);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify_tone("HAPPY DAYS"), Tone::Happy);
        assert_eq!(classify_tone("The SECRET cave"), Tone::Mysterious);
    }

    #[test]
    fn test_classify_priority_order_wins() {
        // Both "happy" and "scared" match; happy is checked first.
        assert_eq!(
            classify_tone("She was happy but a little scared"),
            Tone::Happy
        );
        // "scared" beats "sad" regardless of position in the text.
        assert_eq!(classify_tone("sad and afraid"), Tone::Scared);
        // Three "sad" keywords don't outrank one "fear" keyword.
        assert_eq!(
            classify_tone("sad tears of sorrow and fear"),
            Tone::Scared
        );
    }

    #[test]
    fn test_classify_empty() {
        assert_eq!(classify_tone(""), Tone::Neutral);
    }

    #[test]
    fn test_suggest_effect_categories() {
        assert_eq!(suggest_effect("deep in the jungle"), Some("forest"));
        assert_eq!(suggest_effect("thunder rumbled overhead"), Some("rain"));
        assert_eq!(suggest_effect("the wizard raised his wand"), Some("magic"));
        assert_eq!(suggest_effect("a knock at the gate"), Some("door"));
        assert_eq!(suggest_effect("the little bird sang"), Some("animal"));
        assert_eq!(suggest_effect("nothing matches here"), None);
    }

    #[test]
    fn test_suggest_effect_priority() {
        // "tree" (forest) is checked before "rain".
        assert_eq!(suggest_effect("rain fell on the tree"), Some("forest"));
    }

    #[test]
    fn test_suggest_effect_empty() {
        assert_eq!(suggest_effect(""), None);
    }
}
