use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::responses::ValidatedResponses;
use super::traits::{Domain, Trait, TraitMapping, Triad};

pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;
pub const NEUTRAL_SCORE: f64 = 5.0;

/// Trait name to a score on the 0-10 scale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitScores(pub BTreeMap<Trait, f64>);

impl TraitScores {
    pub fn get(&self, trait_: Trait) -> Option<f64> {
        self.0.get(&trait_).copied()
    }

    /// Highest scoring trait of a triad; ties go to the alphabetically-first name.
    pub fn triad_winner(&self, triad: Triad) -> (Trait, f64) {
        let mut candidates: Vec<(Trait, f64)> = triad
            .traits()
            .into_iter()
            .map(|trait_| (trait_, finite_or(self.get(trait_), SCORE_MIN)))
            .collect();
        candidates.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| a.0.name().cmp(&b.0.name()))
        });
        candidates[0]
    }
}

/// Domain to the mean strength of its triad winners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainScores(pub BTreeMap<Domain, f64>);

impl DomainScores {
    pub fn get(&self, domain: Domain) -> Option<f64> {
        self.0.get(&domain).copied()
    }
}

/// Optional per-question weights; unlisted questions weigh 1.0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionWeights(pub BTreeMap<u16, f64>);

impl QuestionWeights {
    fn weight(&self, question: u16) -> f64 {
        self.0
            .get(&question)
            .copied()
            .filter(|weight| weight.is_finite() && *weight >= 0.0)
            .unwrap_or(1.0)
    }
}

/// Weighted mean of each trait's mapped responses. Never fails: traits without usable
/// responses score zero.
pub fn aggregate(
    responses: &ValidatedResponses,
    mapping: &TraitMapping,
    weights: Option<&QuestionWeights>,
) -> TraitScores {
    let default_weights = QuestionWeights::default();
    let weights = weights.unwrap_or(&default_weights);

    let scores = Trait::all()
        .map(|trait_| {
            let (weighted_total, weight_total) = mapping
                .questions(trait_)
                .iter()
                .filter_map(|question| {
                    responses
                        .get(*question)
                        .map(|value| (value, weights.weight(*question)))
                })
                .fold((0.0, 0.0), |(sum, total), (value, weight)| {
                    (sum + value * weight, total + weight)
                });

            let score = if weight_total > 0.0 {
                (weighted_total / weight_total).clamp(SCORE_MIN, SCORE_MAX)
            } else {
                SCORE_MIN
            };
            (trait_, score)
        })
        .collect();

    TraitScores(scores)
}

pub fn domain_scores(traits: &TraitScores) -> DomainScores {
    let scores = Domain::ALL
        .into_iter()
        .map(|domain| {
            let winners: Vec<f64> = domain
                .triads()
                .into_iter()
                .map(|triad| traits.triad_winner(triad).1)
                .collect();
            let mean = winners.iter().sum::<f64>() / winners.len() as f64;
            (domain, mean)
        })
        .collect();
    DomainScores(scores)
}

/// Triad name to the label of its winning trait.
pub fn dominant_traits(traits: &TraitScores) -> BTreeMap<String, String> {
    Triad::ALL
        .into_iter()
        .map(|triad| (triad.to_string(), traits.triad_winner(triad).0.name()))
        .collect()
}

pub(crate) fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|score| score.is_finite()).unwrap_or(fallback)
}
