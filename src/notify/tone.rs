//! Alert tone synthesis.
//!
//! A tone is a sine wave whose frequency steps at fixed offsets and whose
//! gain decays exponentially from a start level to an end level over the
//! whole duration. Samples are mono `f32` in `[-1, 1]`.

use std::f64::consts::TAU;

use crate::data::AlertKind;

/// Shape of an alert tone.
#[derive(Debug, Clone, PartialEq)]
pub struct ToneSpec {
    /// `(offset_secs, frequency_hz)`, sorted by offset, first at 0.0.
    pub steps: &'static [(f64, f64)],
    pub start_gain: f64,
    pub end_gain: f64,
    pub duration_secs: f64,
}

const CRITICAL: ToneSpec = ToneSpec {
    steps: &[(0.0, 800.0), (0.1, 1000.0), (0.2, 800.0)],
    start_gain: 0.3,
    end_gain: 0.01,
    duration_secs: 0.5,
};

const STRESSED: ToneSpec = ToneSpec {
    steps: &[(0.0, 400.0), (0.2, 600.0)],
    start_gain: 0.2,
    end_gain: 0.01,
    duration_secs: 0.3,
};

impl ToneSpec {
    pub fn for_kind(kind: AlertKind) -> Self {
        match kind {
            AlertKind::Critical => CRITICAL,
            AlertKind::Stressed => STRESSED,
        }
    }

    /// Frequency in effect at `t` seconds.
    pub fn frequency_at(&self, t: f64) -> f64 {
        self.steps
            .iter()
            .take_while(|(offset, _)| *offset <= t)
            .last()
            .or(self.steps.first())
            .map(|(_, freq)| *freq)
            .unwrap_or(0.0)
    }

    /// Gain at `t` seconds, clamped to the tone duration.
    pub fn gain_at(&self, t: f64) -> f64 {
        let progress = (t / self.duration_secs).clamp(0.0, 1.0);
        self.start_gain * (self.end_gain / self.start_gain).powf(progress)
    }

    /// Number of samples the tone spans at `sample_rate`.
    pub fn sample_count(&self, sample_rate: u32) -> usize {
        (self.duration_secs * sample_rate as f64).round() as usize
    }

    /// Render the tone as mono samples.
    ///
    /// Phase is accumulated per sample so frequency steps do not click.
    pub fn synthesize(&self, sample_rate: u32) -> Vec<f32> {
        let rate = sample_rate as f64;
        let mut phase = 0.0_f64;
        (0..self.sample_count(sample_rate))
            .map(|i| {
                let t = i as f64 / rate;
                let sample = phase.sin() * self.gain_at(t);
                phase = (phase + TAU * self.frequency_at(t) / rate) % TAU;
                sample as f32
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_pitch_steps() {
        let tone = ToneSpec::for_kind(AlertKind::Critical);
        assert_eq!(tone.frequency_at(0.0), 800.0);
        assert_eq!(tone.frequency_at(0.05), 800.0);
        assert_eq!(tone.frequency_at(0.1), 1000.0);
        assert_eq!(tone.frequency_at(0.15), 1000.0);
        assert_eq!(tone.frequency_at(0.25), 800.0);
    }

    #[test]
    fn test_stressed_pitch_steps() {
        let tone = ToneSpec::for_kind(AlertKind::Stressed);
        assert_eq!(tone.frequency_at(0.1), 400.0);
        assert_eq!(tone.frequency_at(0.2), 600.0);
        assert_eq!(tone.duration_secs, 0.3);
    }

    #[test]
    fn test_gain_decays_exponentially() {
        let tone = ToneSpec::for_kind(AlertKind::Critical);
        assert!((tone.gain_at(0.0) - 0.3).abs() < 1e-9);
        assert!((tone.gain_at(0.5) - 0.01).abs() < 1e-9);
        assert!((tone.gain_at(5.0) - 0.01).abs() < 1e-9);
        // Geometric mean at the midpoint
        let mid = (0.3_f64 * 0.01).sqrt();
        assert!((tone.gain_at(0.25) - mid).abs() < 1e-9);
    }

    #[test]
    fn test_synthesize_length_and_bounds() {
        let samples = ToneSpec::for_kind(AlertKind::Critical).synthesize(44_100);
        assert_eq!(samples.len(), 22_050);
        assert!(samples.iter().all(|s| s.abs() <= 0.3 + 1e-6));

        let samples = ToneSpec::for_kind(AlertKind::Stressed).synthesize(48_000);
        assert_eq!(samples.len(), 14_400);
        let tail_peak = samples[14_000..].iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!(tail_peak < 0.02);
    }
}
