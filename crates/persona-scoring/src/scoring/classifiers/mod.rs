//! Pure classifiers from trait scores to framework labels.
//!
//! Each classifier reads its weights from the overrides passed in and nothing else, so they
//! can be evaluated in any order. Missing or non-finite inputs never fail a classifier; they
//! are replaced by the neutral midpoint and the result is flagged as degraded.

mod big_five;
mod enneagram;
mod mbti;
mod projection;

use serde::{Deserialize, Serialize};

use super::aggregate::{
    finite_or, DomainScores, TraitScores, NEUTRAL_SCORE, SCORE_MAX, SCORE_MIN,
};
use super::traits::Trait;
use crate::overrides::{DimensionWeights, ScoringOverrides};

pub use big_five::{classify_big_five, BigFiveResult};
pub use enneagram::{classify_enneagram, EnneagramCenter, EnneagramResult};
pub use mbti::{classify_mbti, MbtiResult};
pub use projection::{
    classify_alignment, classify_attachment, classify_holland, classify_socionics,
    AlignmentResult, AttachmentResult, HollandResult, SocionicsResult,
};

/// Outcome of one framework, tagged by framework name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "framework", rename_all = "snake_case")]
pub enum Classification {
    Mbti(MbtiResult),
    Enneagram(EnneagramResult),
    BigFive(BigFiveResult),
    Holland(HollandResult),
    Alignment(AlignmentResult),
    Socionics(SocionicsResult),
    Attachment(AttachmentResult),
}

impl Classification {
    pub fn framework_name(&self) -> &'static str {
        match self {
            Classification::Mbti(_) => "MBTI",
            Classification::Enneagram(_) => "Enneagram",
            Classification::BigFive(_) => "Big Five",
            Classification::Holland(_) => "Holland Code",
            Classification::Alignment(_) => "Alignment",
            Classification::Socionics(_) => "Socionics",
            Classification::Attachment(_) => "Attachment",
        }
    }

    pub fn degraded(&self) -> bool {
        match self {
            Classification::Mbti(result) => result.degraded,
            Classification::Enneagram(result) => result.degraded,
            Classification::BigFive(result) => result.degraded,
            Classification::Holland(result) => result.degraded,
            Classification::Alignment(result) => result.degraded,
            Classification::Socionics(result) => result.degraded,
            Classification::Attachment(result) => result.degraded,
        }
    }
}

pub type ClassifierFn = fn(&TraitScores, &DomainScores, &ScoringOverrides) -> Classification;

fn run_mbti(t: &TraitScores, d: &DomainScores, o: &ScoringOverrides) -> Classification {
    Classification::Mbti(classify_mbti(t, d, o))
}

fn run_enneagram(t: &TraitScores, d: &DomainScores, o: &ScoringOverrides) -> Classification {
    Classification::Enneagram(classify_enneagram(t, d, o))
}

fn run_big_five(t: &TraitScores, d: &DomainScores, o: &ScoringOverrides) -> Classification {
    Classification::BigFive(classify_big_five(t, d, o))
}

fn run_holland(t: &TraitScores, d: &DomainScores, o: &ScoringOverrides) -> Classification {
    Classification::Holland(classify_holland(t, d, o))
}

fn run_alignment(t: &TraitScores, d: &DomainScores, o: &ScoringOverrides) -> Classification {
    Classification::Alignment(classify_alignment(t, d, o))
}

fn run_socionics(t: &TraitScores, d: &DomainScores, o: &ScoringOverrides) -> Classification {
    Classification::Socionics(classify_socionics(t, d, o))
}

fn run_attachment(t: &TraitScores, d: &DomainScores, o: &ScoringOverrides) -> Classification {
    Classification::Attachment(classify_attachment(t, d, o))
}

/// Every classifier, in the order their results appear in a profile.
pub const CLASSIFIERS: [ClassifierFn; 7] = [
    run_mbti,
    run_enneagram,
    run_big_five,
    run_holland,
    run_alignment,
    run_socionics,
    run_attachment,
];

pub fn classify_all(
    traits: &TraitScores,
    domains: &DomainScores,
    overrides: &ScoringOverrides,
) -> Vec<Classification> {
    CLASSIFIERS
        .iter()
        .map(|classify| classify(traits, domains, overrides))
        .collect()
}

/// A sub-dimension score on the 0-10 scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Projected {
    pub value: f64,
    pub degraded: bool,
}

/// Weighted mean of the configured traits, rescaled by `scaling`. The transform lets a
/// trait contribute inverted (`10 - score`) where a classifier needs it.
pub(crate) fn project_with(
    weights: Option<&DimensionWeights>,
    traits: &TraitScores,
    transform: impl Fn(Trait, f64) -> f64,
) -> Projected {
    let Some(weights) = weights else {
        return Projected {
            value: NEUTRAL_SCORE,
            degraded: true,
        };
    };

    let mut degraded = false;
    let mut weighted = 0.0;
    let mut total = 0.0;
    for (trait_, weight) in &weights.traits {
        if !weight.is_finite() || *weight <= 0.0 {
            continue;
        }
        let raw = traits.get(*trait_);
        if raw.map(|score| !score.is_finite()).unwrap_or(true) {
            degraded = true;
        }
        let score = finite_or(raw, NEUTRAL_SCORE).clamp(SCORE_MIN, SCORE_MAX);
        weighted += transform(*trait_, score) * weight;
        total += weight;
    }

    if total <= 0.0 {
        return Projected {
            value: NEUTRAL_SCORE,
            degraded: true,
        };
    }

    let mean = weighted / total;
    let value = match weights.scaling {
        Some(scaling) if scaling.is_finite() && scaling > 0.0 => mean * SCORE_MAX / scaling,
        _ => mean,
    };

    // Six decimals keeps float noise from splitting exact ties.
    let value = (value.clamp(SCORE_MIN, SCORE_MAX) * 1e6).round() / 1e6;
    Projected { value, degraded }
}

pub(crate) fn project(weights: Option<&DimensionWeights>, traits: &TraitScores) -> Projected {
    project_with(weights, traits, |_, score| score)
}

/// Sorts `(label, score)` pairs best first; ties resolve to the lexicographically-first label.
pub(crate) fn rank<L: Ord + Copy>(scores: &mut [(L, f64)]) {
    scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_without_weights_is_neutral_and_degraded() {
        let projected = project(None, &fixtures::uniform(9.0));
        assert_eq!(projected.value, NEUTRAL_SCORE);
        assert!(projected.degraded);
    }

    #[test]
    fn projection_substitutes_neutral_for_missing_traits() {
        let weights = DimensionWeights::new(&[(Trait::Calm, 0.5), (Trait::Reactive, 0.5)]);
        let mut traits = fixtures::uniform(9.0);
        traits.0.remove(&Trait::Reactive);
        let projected = project(Some(&weights), &traits);
        assert_eq!(projected.value, 7.0);
        assert!(projected.degraded);
    }

    #[test]
    fn scaling_treats_value_as_full_scale() {
        let weights = DimensionWeights {
            scaling: Some(8.0),
            ..DimensionWeights::new(&[(Trait::Calm, 1.0)])
        };
        let projected = project(Some(&weights), &fixtures::uniform(4.0));
        assert_eq!(projected.value, 5.0);
        let projected = project(Some(&weights), &fixtures::uniform(9.0));
        assert_eq!(projected.value, 10.0);
    }

    #[test]
    fn every_classifier_is_total_on_well_formed_scores() {
        let overrides = ScoringOverrides::default();
        for traits in [
            fixtures::uniform(0.0),
            fixtures::uniform(5.0),
            fixtures::uniform(10.0),
            fixtures::alternating(),
        ] {
            let domains = fixtures::domains(&traits);
            let results = classify_all(&traits, &domains, &overrides);
            assert_eq!(results.len(), 7);
            assert!(results.iter().all(|result| !result.degraded()));
        }
    }

    #[test]
    fn empty_scores_degrade_instead_of_failing() {
        let traits = TraitScores::default();
        let domains = DomainScores::default();
        let results = classify_all(&traits, &domains, &ScoringOverrides::default());
        assert!(results.iter().all(Classification::degraded));
    }
}
