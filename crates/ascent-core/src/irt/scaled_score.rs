//! Theta to reported-score mapping.

use crate::domain::Section;

/// A reported score with its confidence band, clamped to the section scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledScore {
    pub score: f64,
    pub band_low: f64,
    pub band_high: f64,
}

// Anchor tables: (theta, score). Linear interpolation between anchors,
// clamped at the ends.
const QUANT_VERBAL_TABLE: [(f64, f64); 9] = [
    (-4.0, 130.0),
    (-3.0, 135.0),
    (-2.0, 140.0),
    (-1.0, 145.0),
    (0.0, 150.0),
    (1.0, 155.0),
    (2.0, 160.0),
    (3.0, 165.0),
    (4.0, 170.0),
];

const WRITING_TABLE: [(f64, f64); 6] = [
    (-4.0, 1.0),
    (-2.0, 2.0),
    (-1.0, 3.0),
    (0.0, 4.0),
    (2.0, 5.0),
    (4.0, 6.0),
];

fn interpolate(table: &[(f64, f64)], theta: f64) -> f64 {
    let (first_t, first_s) = table[0];
    let (last_t, last_s) = table[table.len() - 1];
    if theta <= first_t {
        return first_s;
    }
    if theta >= last_t {
        return last_s;
    }
    for window in table.windows(2) {
        let (t0, s0) = window[0];
        let (t1, s1) = window[1];
        if theta <= t1 {
            let frac = (theta - t0) / (t1 - t0);
            return s0 + frac * (s1 - s0);
        }
    }
    last_s
}

/// Map an ability estimate to the section's reported scale.
///
/// Quant and verbal report on [130, 170] with a ±4-point band; writing
/// reports on [1, 6] with a ±0.5 band. The band is clamped to the scale.
pub fn scaled_score(section: Section, theta: f64) -> ScaledScore {
    let (table, lo, hi, margin): (&[(f64, f64)], f64, f64, f64) = match section {
        Section::Quant | Section::Verbal => (&QUANT_VERBAL_TABLE, 130.0, 170.0, 4.0),
        Section::Writing => (&WRITING_TABLE, 1.0, 6.0, 0.5),
    };
    let theta = if theta.is_finite() { theta } else { 0.0 };
    let score = interpolate(table, theta).clamp(lo, hi);
    ScaledScore {
        score,
        band_low: (score - margin).max(lo),
        band_high: (score + margin).min(hi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Section::Quant, 0.0, 150.0)]
    #[case(Section::Quant, -2.0, 140.0)]
    #[case(Section::Verbal, 2.0, 160.0)]
    #[case(Section::Verbal, -3.0, 135.0)]
    #[case(Section::Writing, 0.0, 4.0)]
    #[case(Section::Writing, 2.0, 5.0)]
    fn test_anchor_points(#[case] section: Section, #[case] theta: f64, #[case] expected: f64) {
        assert_eq!(scaled_score(section, theta).score, expected);
    }

    #[test]
    fn test_interpolation_between_anchors() {
        let score = scaled_score(Section::Quant, 0.5).score;
        assert!((score - 152.5).abs() < 1e-9);
    }

    #[test]
    fn test_clamped_at_scale_ends() {
        assert_eq!(scaled_score(Section::Quant, -7.0).score, 130.0);
        assert_eq!(scaled_score(Section::Verbal, 9.0).score, 170.0);
        assert_eq!(scaled_score(Section::Writing, -9.0).score, 1.0);
    }

    #[test]
    fn test_band_clamped_to_scale() {
        let top = scaled_score(Section::Quant, 4.0);
        assert_eq!(top.band_high, 170.0);
        assert_eq!(top.band_low, 166.0);

        let bottom = scaled_score(Section::Writing, -4.0);
        assert_eq!(bottom.band_low, 1.0);
        assert_eq!(bottom.band_high, 1.5);
    }

    #[test]
    fn test_non_finite_theta_maps_to_scale_middle() {
        let score = scaled_score(Section::Quant, f64::NAN);
        assert_eq!(score.score, 150.0);
    }
}
