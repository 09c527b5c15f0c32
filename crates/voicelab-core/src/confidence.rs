//! Confidence display and banding.
//!
//! Raw model probabilities are clamped to [0.01, 0.99] before anything else,
//! so that extreme raw values (0 or 1) still map to a stable 1%/99% display
//! and a deterministic band. Classification always runs on the clamped value.

/// Lower display bound for a probability.
pub const MIN_DISPLAY_PROBABILITY: f64 = 0.01;
/// Upper display bound for a probability.
pub const MAX_DISPLAY_PROBABILITY: f64 = 0.99;

const LOW_BAND_UPPER: f64 = 0.33;
const HIGH_BAND_LOWER: f64 = 0.66;

/// Qualitative confidence band for a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub fn label(&self) -> &'static str {
        match self {
            ConfidenceBand::Low => "Low",
            ConfidenceBand::Medium => "Medium",
            ConfidenceBand::High => "High",
        }
    }
}

/// Clamps a raw probability into the displayable range.
///
/// Non-finite input is treated as 0.5, an unknown-confidence midpoint.
pub fn clamp_probability(probability: f64) -> f64 {
    let raw = if probability.is_finite() {
        probability
    } else {
        0.5
    };
    raw.clamp(MIN_DISPLAY_PROBABILITY, MAX_DISPLAY_PROBABILITY)
}

/// Classifies a raw probability into a band.
///
/// The band is computed on the *clamped* value, not the raw probability.
pub fn band(probability: f64) -> ConfidenceBand {
    let p = clamp_probability(probability);
    if p < LOW_BAND_UPPER {
        ConfidenceBand::Low
    } else if p >= HIGH_BAND_LOWER {
        ConfidenceBand::High
    } else {
        ConfidenceBand::Medium
    }
}

/// Display percentage for a raw probability, rounded to one decimal place.
pub fn display_percent(probability: f64) -> f64 {
    (clamp_probability(probability) * 1000.0).round() / 10.0
}
