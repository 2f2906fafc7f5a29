//! Coarse duration labels for narration plans.

use crate::types::SoundItem;

/// Assumed speech rate in characters per second.
const CHARS_PER_SECOND: f64 = 15.0;
/// Assumed average length of one effect asset, in seconds.
const SECONDS_PER_EFFECT: f64 = 3.0;

/// Estimate how long a narration plan will run, as a bucketed label.
///
/// Speech time is proxied by character count, pauses are summed exactly,
/// and each effect contributes a flat constant. The bucketing is coarse
/// and deliberately non-linear; callers must not read the label as exact.
pub fn estimate(sequence: &[SoundItem]) -> &'static str {
    let total_chars: usize = sequence
        .iter()
        .filter(|i| i.is_speech())
        .map(|i| i.content.chars().count())
        .sum();
    let total_pauses: f64 = sequence.iter().map(|i| i.pause_after).sum();
    let total_effects = sequence.iter().filter(|i| i.is_effect()).count();

    let total_seconds = total_chars as f64 / CHARS_PER_SECOND
        + total_pauses
        + total_effects as f64 * SECONDS_PER_EFFECT;
    let minutes = (total_seconds / 60.0) as u64;

    if minutes < 5 {
        "3 minutes"
    } else if minutes < 10 {
        "5 minutes"
    } else if minutes < 15 {
        "10 minutes"
    } else {
        "15+ minutes"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::build_sequence;
    use crate::types::{SoundItem, Tone};

    fn speech_of_len(chars: usize) -> SoundItem {
        SoundItem::speech("x".repeat(chars), Tone::Neutral, 0.0)
    }

    #[test]
    fn test_empty_sequence_is_shortest_bucket() {
        assert_eq!(estimate(&[]), "3 minutes");
    }

    #[test]
    fn test_short_story_scenario() {
        let seq = build_sequence("Once upon a time.\n\nThe end.", "Test");
        // ~35 speech chars, a few seconds of pauses and effects: well under
        // the 5-minute threshold.
        assert_eq!(estimate(&seq), "3 minutes");
    }

    #[test]
    fn test_five_minute_bucket() {
        // 5 minutes of speech = 5 * 60 * 15 = 4500 chars
        let seq = vec![speech_of_len(4500)];
        assert_eq!(estimate(&seq), "5 minutes");
    }

    #[test]
    fn test_ten_minute_bucket() {
        let seq = vec![speech_of_len(10 * 60 * 15)];
        assert_eq!(estimate(&seq), "10 minutes");
    }

    #[test]
    fn test_longest_bucket() {
        let seq = vec![speech_of_len(20 * 60 * 15)];
        assert_eq!(estimate(&seq), "15+ minutes");
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Devanagari is 3 bytes per char in UTF-8. 4400 chars is ~293s of
        // speech, still the shortest bucket; a byte count would see 13200
        // chars and jump two buckets.
        let seq = vec![SoundItem::speech("\u{0915}".repeat(4400), Tone::Neutral, 0.0)];
        assert_eq!(estimate(&seq), "3 minutes");
    }

    #[test]
    fn test_boundary_truncates_down() {
        // 4 minutes 59 seconds of speech stays in the first bucket.
        let seq = vec![speech_of_len((299.0 * CHARS_PER_SECOND) as usize)];
        assert_eq!(estimate(&seq), "3 minutes");
    }

    #[test]
    fn test_pauses_and_effects_count() {
        // 4:30 of speech, pushed over the 5-minute line by pauses + effects.
        let mut seq = vec![speech_of_len((270.0 * CHARS_PER_SECOND) as usize)];
        for _ in 0..9 {
            seq.push(SoundItem::effect("magic", 1.0, 0.5)); // 3s each + 1s pause
        }
        assert_eq!(estimate(&seq), "5 minutes");
    }

    #[test]
    fn test_effect_content_not_counted_as_speech() {
        let seq = vec![SoundItem::effect("x".repeat(10_000), 0.0, 0.5)];
        // Huge cue name contributes only the flat 3s constant.
        assert_eq!(estimate(&seq), "3 minutes");
    }
}
