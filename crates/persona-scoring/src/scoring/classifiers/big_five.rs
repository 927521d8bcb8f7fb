use serde::{Deserialize, Serialize};

use super::project;
use crate::overrides::ScoringOverrides;
use crate::scoring::aggregate::{DomainScores, TraitScores, SCORE_MAX};

/// Continuous OCEAN scores in [0, 1]; no thresholding is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BigFiveResult {
    pub openness: f64,
    pub conscientiousness: f64,
    pub extraversion: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
    pub degraded: bool,
}

impl BigFiveResult {
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("openness", self.openness),
            ("conscientiousness", self.conscientiousness),
            ("extraversion", self.extraversion),
            ("agreeableness", self.agreeableness),
            ("neuroticism", self.neuroticism),
        ]
    }
}

pub fn classify_big_five(
    traits: &TraitScores,
    _domains: &DomainScores,
    overrides: &ScoringOverrides,
) -> BigFiveResult {
    let mut degraded = false;
    let mut score = |key: &str| {
        let projected = project(overrides.bigfive.get(key), traits);
        degraded |= projected.degraded;
        projected.value / SCORE_MAX
    };

    let openness = score("openness");
    let conscientiousness = score("conscientiousness");
    let extraversion = score("extraversion");
    let agreeableness = score("agreeableness");
    let neuroticism = score("neuroticism");

    BigFiveResult {
        openness,
        conscientiousness,
        extraversion,
        agreeableness,
        neuroticism,
        degraded,
    }
}
