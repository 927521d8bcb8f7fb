//! Integral level assessment: questionnaire-based preliminary scores, an optional Socratic
//! clarification exchange driven by an external advisor, and the final level detail.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::aggregate::TraitScores;
use super::classifiers::project;
use crate::overrides::ScoringOverrides;

pub const MAX_ADJUSTMENT: f64 = 2.0;
/// Runner-up within this many normalized points is reported as the secondary level.
pub const SECONDARY_WINDOW: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IntegralLevel {
    #[serde(alias = "red")]
    Red,
    #[serde(alias = "amber")]
    Amber,
    #[serde(alias = "orange")]
    Orange,
    #[serde(alias = "green")]
    Green,
    #[serde(alias = "teal")]
    Teal,
    #[serde(alias = "turquoise")]
    Turquoise,
}

impl IntegralLevel {
    pub const ALL: [IntegralLevel; 6] = [
        IntegralLevel::Red,
        IntegralLevel::Amber,
        IntegralLevel::Orange,
        IntegralLevel::Green,
        IntegralLevel::Teal,
        IntegralLevel::Turquoise,
    ];

    /// 1 for Red through 6 for Turquoise.
    pub fn ordinal(self) -> u8 {
        self as u8 + 1
    }

    pub fn key(self) -> &'static str {
        match self {
            IntegralLevel::Red => "red",
            IntegralLevel::Amber => "amber",
            IntegralLevel::Orange => "orange",
            IntegralLevel::Green => "green",
            IntegralLevel::Teal => "teal",
            IntegralLevel::Turquoise => "turquoise",
        }
    }

    fn developmental_edge(self) -> &'static str {
        match self {
            IntegralLevel::Red => {
                "Channeling raw drive into shared rules and lasting commitments (Amber)."
            }
            IntegralLevel::Amber => {
                "Testing inherited rules against evidence and personal achievement (Orange)."
            }
            IntegralLevel::Orange => {
                "Widening the measure of success to include relationships and shared values (Green)."
            }
            IntegralLevel::Green => {
                "Integrating many perspectives into systems that can still decide and act (Teal)."
            }
            IntegralLevel::Teal => {
                "Holding individual growth within a felt sense of the larger whole (Turquoise)."
            }
            IntegralLevel::Turquoise => {
                "Embodying a holistic, planetary perspective in ordinary daily practice."
            }
        }
    }
}

impl fmt::Display for IntegralLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One multiple-choice answer: the weight the chosen option lends to each level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegralAnswer {
    pub question_id: String,
    pub weights: BTreeMap<IntegralLevel, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelScores(pub BTreeMap<IntegralLevel, f64>);

impl LevelScores {
    pub fn get(&self, level: IntegralLevel) -> f64 {
        self.0.get(&level).copied().unwrap_or(0.0)
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Levels best first; ties keep developmental order.
    fn ranked(&self) -> Vec<(IntegralLevel, f64)> {
        let mut ranked: Vec<(IntegralLevel, f64)> = IntegralLevel::ALL
            .into_iter()
            .map(|level| (level, self.get(level)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked
    }

    pub fn top(&self) -> IntegralLevel {
        self.ranked()[0].0
    }

    /// Each level's share of the total, in points out of 100.
    pub fn normalized(&self) -> LevelScores {
        let total = self.total();
        LevelScores(
            IntegralLevel::ALL
                .into_iter()
                .map(|level| {
                    let share = if total > 0.0 {
                        self.get(level) / total * 100.0
                    } else {
                        0.0
                    };
                    (level, round2(share))
                })
                .collect(),
        )
    }
}

pub fn preliminary_from_answers(answers: &[IntegralAnswer]) -> LevelScores {
    let mut scores: BTreeMap<IntegralLevel, f64> =
        IntegralLevel::ALL.into_iter().map(|level| (level, 0.0)).collect();
    for answer in answers {
        for (level, weight) in &answer.weights {
            if weight.is_finite() && *weight > 0.0 {
                *scores.entry(*level).or_insert(0.0) += weight;
            }
        }
    }
    LevelScores(scores)
}

/// Trait-based estimate used when no questionnaire answers exist, e.g. while backfilling
/// older assessments.
pub fn preliminary_from_traits(traits: &TraitScores, overrides: &ScoringOverrides) -> LevelScores {
    LevelScores(
        IntegralLevel::ALL
            .into_iter()
            .map(|level| {
                let projected = project(overrides.integral.get(level.key()), traits);
                (level, projected.value)
            })
            .collect(),
    )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClarificationTurn {
    pub question: String,
    pub answer: String,
}

/// Bounded level deltas returned by the clarification stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationAdjustments {
    #[serde(default)]
    pub adjustments: BTreeMap<IntegralLevel, f64>,
    #[serde(default)]
    pub cognitive_complexity: Option<f64>,
    #[serde(default)]
    pub developmental_edge: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("advisor unavailable: {0}")]
    Unavailable(String),
    #[error("advisor reply did not contain a JSON object")]
    MissingJson,
    #[error("advisor reply was not valid adjustments: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Text-generation collaborator that judges a clarification transcript. Replies are free
/// text that should embed a JSON object of adjustments.
pub trait ClarificationAdvisor: Send + Sync {
    fn evaluate(
        &self,
        preliminary: &LevelScores,
        transcript: &[ClarificationTurn],
    ) -> Result<String, AdvisorError>;
}

/// Pulls the outermost JSON object out of an advisor reply.
pub fn parse_adjustments(reply: &str) -> Result<ClarificationAdjustments, AdvisorError> {
    let start = reply.find('{').ok_or(AdvisorError::MissingJson)?;
    let end = reply.rfind('}').ok_or(AdvisorError::MissingJson)?;
    if end < start {
        return Err(AdvisorError::MissingJson);
    }
    Ok(serde_json::from_str(&reply[start..=end])?)
}

/// Outcome of asking the advisor; failures fall back to the preliminary scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Clarification {
    pub adjustments: Option<ClarificationAdjustments>,
    pub fallback_used: bool,
}

/// A clarification exchange held by the assessment client: the follow-up turns shown to the
/// respondent and the advisor's closing reply, replayed through the same parse and fallback
/// path as a live advisor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClarificationExchange {
    #[serde(default)]
    pub transcript: Vec<ClarificationTurn>,
    #[serde(default)]
    pub advisor_reply: Option<String>,
}

impl ClarificationExchange {
    pub fn resolve(&self, preliminary: &LevelScores) -> Clarification {
        clarify(self, preliminary, &self.transcript)
    }
}

impl ClarificationAdvisor for ClarificationExchange {
    fn evaluate(
        &self,
        _preliminary: &LevelScores,
        _transcript: &[ClarificationTurn],
    ) -> Result<String, AdvisorError> {
        self.advisor_reply
            .clone()
            .ok_or_else(|| AdvisorError::Unavailable("no advisor reply recorded".to_string()))
    }
}

pub fn clarify<A: ClarificationAdvisor + ?Sized>(
    advisor: &A,
    preliminary: &LevelScores,
    transcript: &[ClarificationTurn],
) -> Clarification {
    match advisor
        .evaluate(preliminary, transcript)
        .and_then(|reply| parse_adjustments(&reply))
    {
        Ok(adjustments) => Clarification {
            adjustments: Some(adjustments),
            fallback_used: false,
        },
        Err(error) => {
            warn!(%error, "integral clarification failed, keeping preliminary scores");
            Clarification {
                adjustments: None,
                fallback_used: true,
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RealityTriad {
    pub physical: f64,
    pub social: f64,
    pub universal: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegralConsistency {
    pub preliminary_level: IntegralLevel,
    pub consistent: bool,
    pub fallback_used: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegralDetail {
    pub primary_level: IntegralLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_level: Option<IntegralLevel>,
    pub confidence: u8,
    pub cognitive_complexity: f64,
    pub reality_triad_mapping: RealityTriad,
    pub developmental_edge: String,
    pub normalized_scores: LevelScores,
    pub consistency: IntegralConsistency,
}

impl IntegralDetail {
    pub fn inconsistent(&self) -> bool {
        !self.consistency.consistent
    }
}

pub fn assess(
    preliminary: &LevelScores,
    clarification: Option<&Clarification>,
) -> IntegralDetail {
    let adjustments = clarification.and_then(|c| c.adjustments.as_ref());
    let fallback_used = clarification.map(|c| c.fallback_used).unwrap_or(false);

    let adjusted = match adjustments {
        Some(adjustments) => LevelScores(
            IntegralLevel::ALL
                .into_iter()
                .map(|level| {
                    let delta = adjustments
                        .adjustments
                        .get(&level)
                        .copied()
                        .filter(|delta| delta.is_finite())
                        .unwrap_or(0.0)
                        .clamp(-MAX_ADJUSTMENT, MAX_ADJUSTMENT);
                    (level, (preliminary.get(level) + delta).max(0.0))
                })
                .collect(),
        ),
        None => preliminary.clone(),
    };

    let normalized = adjusted.normalized();
    let ranked = normalized.ranked();
    let (primary_level, primary) = ranked[0];
    let (runner_up_level, runner_up) = ranked[1];

    let secondary_level =
        (runner_up > 0.0 && primary - runner_up <= SECONDARY_WINDOW).then_some(runner_up_level);
    let confidence = if primary > 0.0 {
        ((primary - runner_up) / primary * 100.0).round().clamp(0.0, 100.0) as u8
    } else {
        0
    };

    let share = |levels: [IntegralLevel; 2]| {
        round2(levels.iter().map(|level| normalized.get(*level)).sum::<f64>() / 100.0)
    };
    let reality_triad_mapping = RealityTriad {
        physical: share([IntegralLevel::Red, IntegralLevel::Amber]),
        social: share([IntegralLevel::Orange, IntegralLevel::Green]),
        universal: share([IntegralLevel::Teal, IntegralLevel::Turquoise]),
    };

    let cognitive_complexity = adjustments
        .and_then(|a| a.cognitive_complexity)
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(0.0, 10.0))
        .unwrap_or_else(|| derived_complexity(&normalized));

    let developmental_edge = adjustments
        .and_then(|a| a.developmental_edge.clone())
        .filter(|text| !text.trim().is_empty())
        .unwrap_or_else(|| primary_level.developmental_edge().to_string());

    let preliminary_level = preliminary.normalized().top();

    IntegralDetail {
        primary_level,
        secondary_level,
        confidence,
        cognitive_complexity,
        reality_triad_mapping,
        developmental_edge,
        normalized_scores: normalized,
        consistency: IntegralConsistency {
            preliminary_level,
            consistent: preliminary_level == primary_level,
            fallback_used,
        },
    }
}

/// Weighted mean ordinal mapped from 1..=6 onto 0..=10.
fn derived_complexity(normalized: &LevelScores) -> f64 {
    let total = normalized.total();
    if total <= 0.0 {
        return 0.0;
    }
    let mean_ordinal = IntegralLevel::ALL
        .into_iter()
        .map(|level| f64::from(level.ordinal()) * normalized.get(level))
        .sum::<f64>()
        / total;
    round2((mean_ordinal - 1.0) / 5.0 * 10.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
