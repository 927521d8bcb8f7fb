use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::project_with;
use crate::overrides::{MbtiDimension, ScoringOverrides};
use crate::scoring::aggregate::{DomainScores, TraitScores, NEUTRAL_SCORE, SCORE_MAX};
use crate::scoring::traits::Trait;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MbtiResult {
    /// Four-letter type, e.g. `"ISFJ"`.
    pub code: String,
    pub dimension_scores: BTreeMap<MbtiDimension, f64>,
    pub degraded: bool,
}

/// Traits whose high scores pull a dimension toward its second letter.
fn favours_second_letter(dimension: MbtiDimension, trait_: Trait) -> bool {
    use Trait::*;
    let inverted: &[Trait] = match dimension {
        MbtiDimension::EI => &[Introverted, Passive],
        MbtiDimension::SN => &[Intuitive, Synthesizing],
        MbtiDimension::TF => &[Empathetic, Altruistic],
        MbtiDimension::JP => &[Spontaneous, Flexible],
    };
    inverted.contains(&trait_)
}

/// Letter for a dimension score. A score exactly on the threshold resolves to the
/// alphabetically-first letter of the pair.
pub(crate) fn letter_for(dimension: MbtiDimension, score: f64, threshold: f64) -> char {
    let (high, low) = dimension.letters();
    if score > threshold {
        high
    } else if score < threshold {
        low
    } else {
        high.min(low)
    }
}

pub fn classify_mbti(
    traits: &TraitScores,
    _domains: &DomainScores,
    overrides: &ScoringOverrides,
) -> MbtiResult {
    let mut code = String::with_capacity(4);
    let mut dimension_scores = BTreeMap::new();
    let mut degraded = false;

    for dimension in MbtiDimension::ALL {
        let weights = overrides.mbti.get(&dimension);
        let projected = project_with(weights, traits, |trait_, score| {
            if favours_second_letter(dimension, trait_) {
                SCORE_MAX - score
            } else {
                score
            }
        });
        let threshold = weights
            .and_then(|weights| weights.threshold)
            .filter(|threshold| threshold.is_finite())
            .unwrap_or(NEUTRAL_SCORE);

        code.push(letter_for(dimension, projected.value, threshold));
        dimension_scores.insert(dimension, projected.value);
        degraded |= projected.degraded;
    }

    MbtiResult {
        code,
        dimension_scores,
        degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::DimensionWeights;
    use crate::scoring::classifiers::fixtures;

    fn classify(traits: &TraitScores, overrides: &ScoringOverrides) -> MbtiResult {
        classify_mbti(traits, &fixtures::domains(traits), overrides)
    }

    #[test]
    fn alternating_responses_yield_a_stable_type() {
        let traits = fixtures::alternating();
        let result = classify(&traits, &ScoringOverrides::default());
        assert_eq!(result.code, "ISFJ");
        for (dimension, score) in &result.dimension_scores {
            assert!(
                (score - NEUTRAL_SCORE).abs() > 1e-6,
                "{dimension} landed on the threshold"
            );
        }
        assert!(!result.degraded);
    }

    #[test]
    fn opposite_extremes_flip_every_letter() {
        use Trait::*;
        let high = fixtures::with(&[
            (Extroverted, 9.0),
            (Introverted, 1.0),
            (Assertive, 9.0),
            (Sensing, 9.0),
            (Intuitive, 1.0),
            (Practical, 9.0),
            (Analytical, 9.0),
            (Empathetic, 1.0),
            (Principled, 9.0),
            (Structured, 9.0),
            (Methodical, 9.0),
            (Spontaneous, 1.0),
            (Flexible, 1.0),
        ]);
        assert_eq!(classify(&high, &ScoringOverrides::default()).code, "ESTJ");

        let low = TraitScores(
            high.0
                .iter()
                .map(|(trait_, score)| (*trait_, SCORE_MAX - score))
                .collect(),
        );
        assert_eq!(classify(&low, &ScoringOverrides::default()).code, "INFP");
    }

    #[test]
    fn exact_threshold_ties_take_the_alphabetically_first_letter() {
        let result = classify(&fixtures::uniform(5.0), &ScoringOverrides::default());
        assert_eq!(result.code, "ENFJ");
        assert_eq!(letter_for(MbtiDimension::SN, 5.0, 5.0), 'N');
        assert_eq!(letter_for(MbtiDimension::TF, 5.0, 5.0), 'F');
    }

    #[test]
    fn custom_threshold_moves_the_boundary() {
        let mut overrides = ScoringOverrides::default();
        overrides.mbti.insert(
            MbtiDimension::EI,
            DimensionWeights {
                threshold: Some(7.0),
                ..DimensionWeights::new(&[(Trait::Extroverted, 1.0)])
            },
        );
        let traits = fixtures::with(&[(Trait::Extroverted, 6.5)]);
        assert!(classify(&traits, &overrides).code.starts_with('I'));
    }

    #[test]
    fn missing_dimension_config_degrades_to_neutral() {
        let mut overrides = ScoringOverrides::default();
        overrides.mbti.remove(&MbtiDimension::JP);
        let result = classify(&fixtures::alternating(), &overrides);
        assert!(result.degraded);
        assert_eq!(result.code.chars().last(), Some('J'));
        assert_eq!(result.dimension_scores.get(&MbtiDimension::JP), Some(&5.0));
    }
}
