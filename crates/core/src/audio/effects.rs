//! Sample-level building blocks for the mixer: silence, gain, fades,
//! gap-aware concatenation.

/// Generate silence of the given duration.
pub fn silence(duration_s: f64, sr: u32) -> Vec<f64> {
    let n = (duration_s.max(0.0) * sr as f64).round() as usize;
    vec![0.0; n]
}

/// Scale samples by a linear gain in place.
pub fn apply_gain(samples: &mut [f64], gain: f64) {
    if (gain - 1.0).abs() < 1e-9 {
        return;
    }
    for s in samples.iter_mut() {
        *s *= gain;
    }
}

/// Apply half-sine fade-in and fade-out to the edges of a buffer.
///
/// Fades are shortened when the buffer is too small to hold them both.
pub fn apply_fades(samples: &mut [f64], sr: u32, fade_in_s: f64, fade_out_s: f64) {
    let len = samples.len();
    if len == 0 {
        return;
    }

    let mut fade_in = (fade_in_s.max(0.0) * sr as f64).round() as usize;
    let mut fade_out = (fade_out_s.max(0.0) * sr as f64).round() as usize;
    if fade_in + fade_out > len {
        let half = len / 2;
        fade_in = fade_in.min(half);
        fade_out = fade_out.min(len - fade_in);
    }

    for i in 0..fade_in {
        let t = i as f64 / fade_in as f64;
        samples[i] *= (t * std::f64::consts::FRAC_PI_2).sin();
    }

    let out_start = len - fade_out;
    for i in 0..fade_out {
        let t = i as f64 / fade_out as f64;
        samples[out_start + i] *= ((1.0 - t) * std::f64::consts::FRAC_PI_2).sin();
    }
}

/// Concatenate clips, inserting `gaps_s[i]` seconds of silence between
/// clip i and clip i+1. Gaps past the last clip are ignored.
pub fn concat_with_gaps(clips: &[Vec<f64>], gaps_s: &[f64], sr: u32) -> Vec<f64> {
    let total: usize = clips.iter().map(|c| c.len()).sum();
    let mut result = Vec::with_capacity(total);

    for (i, clip) in clips.iter().enumerate() {
        result.extend_from_slice(clip);
        if i < clips.len() - 1 {
            let gap = gaps_s.get(i).copied().unwrap_or(0.0);
            if gap > 0.0 {
                result.extend(silence(gap, sr));
            }
        }
    }

    result
}

/// Peak-normalize to the given ceiling if the signal exceeds it.
pub fn limit_peak(samples: &mut [f64], ceiling: f64) {
    let peak = samples.iter().map(|s| s.abs()).fold(0.0f64, f64::max);
    if peak > ceiling && peak > 0.0 {
        let scale = ceiling / peak;
        for s in samples.iter_mut() {
            *s *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_length() {
        assert_eq!(silence(0.5, 24000).len(), 12000);
        assert!(silence(0.5, 24000).iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_silence_negative_duration() {
        assert!(silence(-1.0, 24000).is_empty());
    }

    #[test]
    fn test_apply_gain() {
        let mut samples = vec![0.5; 10];
        apply_gain(&mut samples, 0.5);
        assert!((samples[0] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_apply_gain_unity_noop() {
        let mut samples = vec![0.3; 10];
        apply_gain(&mut samples, 1.0);
        assert_eq!(samples[0], 0.3);
    }

    #[test]
    fn test_fades_taper_edges() {
        let sr = 24000;
        let mut samples = vec![1.0; sr as usize]; // 1 second
        apply_fades(&mut samples, sr, 0.3, 0.5);

        // Start and end are fully attenuated
        assert!(samples[0].abs() < 1e-9);
        assert!(samples[1].abs() < 0.01);
        assert!(samples.last().unwrap().abs() < 0.01);
        // Middle untouched
        assert_eq!(samples[sr as usize / 2], 1.0);
    }

    #[test]
    fn test_fades_shrink_for_short_buffers() {
        let mut samples = vec![1.0; 100]; // far shorter than the fades
        apply_fades(&mut samples, 24000, 0.3, 0.5);
        // Should not panic, and edges still attenuated
        assert!(samples[0].abs() < 1e-9);
    }

    #[test]
    fn test_fades_empty() {
        let mut samples: Vec<f64> = vec![];
        apply_fades(&mut samples, 24000, 0.3, 0.5);
    }

    #[test]
    fn test_concat_with_gaps() {
        let a = vec![1.0; 100];
        let b = vec![2.0; 100];
        let out = concat_with_gaps(&[a, b], &[0.01], 24000);
        // 100 + 240 silence + 100
        assert_eq!(out.len(), 440);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[150], 0.0);
        assert_eq!(out[439], 2.0);
    }

    #[test]
    fn test_concat_ignores_trailing_gap() {
        let a = vec![1.0; 10];
        let out = concat_with_gaps(&[a], &[5.0], 24000);
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn test_concat_empty() {
        assert!(concat_with_gaps(&[], &[], 24000).is_empty());
    }

    #[test]
    fn test_limit_peak() {
        let mut samples = vec![0.0, 2.0, -4.0];
        limit_peak(&mut samples, 1.0);
        assert!((samples[2] + 1.0).abs() < 1e-12);
        assert!((samples[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_limit_peak_noop_below_ceiling() {
        let mut samples = vec![0.5, -0.5];
        limit_peak(&mut samples, 1.0);
        assert_eq!(samples, vec![0.5, -0.5]);
    }
}
