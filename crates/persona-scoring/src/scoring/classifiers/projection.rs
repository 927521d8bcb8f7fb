//! Frameworks that rank weighted projections and keep the top entries: Holland Code,
//! alignment, socionics, and attachment style.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{project, rank};
use crate::overrides::{Framework, ScoringOverrides};
use crate::scoring::aggregate::{DomainScores, TraitScores};

fn ranked_scores(
    framework: Framework,
    traits: &TraitScores,
    overrides: &ScoringOverrides,
) -> (Vec<(&'static str, f64)>, bool) {
    let weights = overrides.framework(framework);
    let mut degraded = false;
    let mut scores: Vec<(&'static str, f64)> = framework
        .sub_dimensions()
        .iter()
        .map(|key| {
            let projected = project(weights.get(key), traits);
            degraded |= projected.degraded;
            (*key, projected.value)
        })
        .collect();
    rank(&mut scores);
    (scores, degraded)
}

fn score_map(scores: &[(&'static str, f64)]) -> BTreeMap<String, f64> {
    scores
        .iter()
        .map(|(key, value)| (key.to_string(), *value))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HollandResult {
    /// Three strongest RIASEC letters, strongest first.
    pub code: String,
    pub scores: BTreeMap<String, f64>,
    pub degraded: bool,
}

pub fn classify_holland(
    traits: &TraitScores,
    _domains: &DomainScores,
    overrides: &ScoringOverrides,
) -> HollandResult {
    let (ranked, degraded) = ranked_scores(Framework::Holland, traits, overrides);
    HollandResult {
        code: ranked.iter().take(3).map(|(letter, _)| *letter).collect(),
        scores: score_map(&ranked),
        degraded,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResult {
    /// e.g. `"Lawful Good"` or `"True Neutral"`.
    pub label: String,
    pub scores: BTreeMap<String, f64>,
    pub degraded: bool,
}

const ORDER_AXIS: [&str; 3] = ["lawful", "order_neutral", "chaotic"];
const MORAL_AXIS: [&str; 3] = ["good", "moral_neutral", "evil"];

fn alignment_word(key: &str) -> &'static str {
    match key {
        "lawful" => "Lawful",
        "chaotic" => "Chaotic",
        "good" => "Good",
        "evil" => "Evil",
        _ => "Neutral",
    }
}

fn best_of(ranked: &[(&'static str, f64)], axis: &[&'static str; 3]) -> &'static str {
    ranked
        .iter()
        .map(|(key, _)| *key)
        .find(|key| axis.contains(key))
        .unwrap_or(axis[1])
}

pub fn classify_alignment(
    traits: &TraitScores,
    _domains: &DomainScores,
    overrides: &ScoringOverrides,
) -> AlignmentResult {
    let (ranked, degraded) = ranked_scores(Framework::Alignment, traits, overrides);
    let order = alignment_word(best_of(&ranked, &ORDER_AXIS));
    let moral = alignment_word(best_of(&ranked, &MORAL_AXIS));

    let label = if order == "Neutral" && moral == "Neutral" {
        "True Neutral".to_string()
    } else {
        format!("{order} {moral}")
    };

    AlignmentResult {
        label,
        scores: score_map(&ranked),
        degraded,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocionicsResult {
    /// Sociotype code such as `"ILE"`.
    pub code: String,
    pub leading: String,
    pub creative: String,
    pub scores: BTreeMap<String, f64>,
    pub degraded: bool,
}

impl SocionicsResult {
    pub fn label(&self) -> String {
        format!("{} ({}-{})", self.code, self.leading, self.creative)
    }
}

fn is_rational(element: &str) -> bool {
    matches!(element.chars().next(), Some('T' | 'F'))
}

fn attitude(element: &str) -> Option<char> {
    element.chars().nth(1)
}

fn sociotype(leading: &str, creative: &str) -> &'static str {
    match (leading, creative) {
        ("Ne", "Ti") => "ILE",
        ("Ne", "Fi") => "IEE",
        ("Ni", "Te") => "ILI",
        ("Ni", "Fe") => "IEI",
        ("Se", "Ti") => "SLE",
        ("Se", "Fi") => "SEE",
        ("Si", "Te") => "SLI",
        ("Si", "Fe") => "SEI",
        ("Te", "Ni") => "LIE",
        ("Te", "Si") => "LSE",
        ("Ti", "Ne") => "LII",
        ("Ti", "Se") => "LSI",
        ("Fe", "Ni") => "EIE",
        ("Fe", "Si") => "ESE",
        ("Fi", "Ne") => "EII",
        ("Fi", "Se") => "ESI",
        _ => "",
    }
}

pub fn classify_socionics(
    traits: &TraitScores,
    _domains: &DomainScores,
    overrides: &ScoringOverrides,
) -> SocionicsResult {
    let (ranked, degraded) = ranked_scores(Framework::Socionics, traits, overrides);
    let leading = ranked.first().map(|(key, _)| *key).unwrap_or("Ne");
    let creative = ranked
        .iter()
        .map(|(key, _)| *key)
        .find(|key| {
            is_rational(key) != is_rational(leading) && attitude(key) != attitude(leading)
        })
        .unwrap_or("Ti");

    SocionicsResult {
        code: sociotype(leading, creative).to_string(),
        leading: leading.to_string(),
        creative: creative.to_string(),
        scores: score_map(&ranked),
        degraded,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachmentResult {
    pub style: String,
    pub scores: BTreeMap<String, f64>,
    pub degraded: bool,
}

pub fn classify_attachment(
    traits: &TraitScores,
    _domains: &DomainScores,
    overrides: &ScoringOverrides,
) -> AttachmentResult {
    let (ranked, degraded) = ranked_scores(Framework::Attachment, traits, overrides);
    let style = ranked
        .first()
        .map(|(key, _)| capitalize(key))
        .unwrap_or_default();
    AttachmentResult {
        style,
        scores: score_map(&ranked),
        degraded,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::classifiers::fixtures;
    use crate::scoring::traits::Trait::*;

    fn domains(traits: &TraitScores) -> DomainScores {
        fixtures::domains(traits)
    }

    #[test]
    fn holland_keeps_three_strongest_letters() {
        let traits = fixtures::with(&[
            (Empathetic, 9.0),
            (Altruistic, 9.0),
            (Assertive, 8.0),
            (Achievement, 8.0),
            (Curious, 7.0),
        ]);
        let result = classify_holland(&traits, &domains(&traits), &ScoringOverrides::default());
        assert_eq!(result.code, "SEI");
        assert_eq!(result.scores.len(), 6);
    }

    #[test]
    fn holland_ties_are_alphabetical() {
        let traits = fixtures::uniform(4.0);
        let result = classify_holland(&traits, &domains(&traits), &ScoringOverrides::default());
        assert_eq!(result.code, "ACE");
    }

    #[test]
    fn alignment_combines_both_axes() {
        let traits = fixtures::with(&[(Lawful, 9.0), (Altruistic, 9.0), (Empathetic, 9.0)]);
        let result = classify_alignment(&traits, &domains(&traits), &ScoringOverrides::default());
        assert_eq!(result.label, "Lawful Good");

        let traits = fixtures::with(&[(Balanced, 9.0), (Fair, 9.0)]);
        let result = classify_alignment(&traits, &domains(&traits), &ScoringOverrides::default());
        assert_eq!(result.label, "True Neutral");
    }

    #[test]
    fn socionics_pairs_leading_with_complementary_creative() {
        let traits = fixtures::with(&[
            (Intuitive, 10.0),
            (Extroverted, 9.0),
            (Curious, 9.0),
            (Analytical, 8.0),
            (Principled, 8.0),
        ]);
        let result = classify_socionics(&traits, &domains(&traits), &ScoringOverrides::default());
        assert_eq!(result.leading, "Ne");
        assert_eq!(result.creative, "Ti");
        assert_eq!(result.label(), "ILE (Ne-Ti)");
    }

    #[test]
    fn attachment_reports_top_style() {
        let traits = fixtures::with(&[(Trusting, 9.0), (Calm, 9.0), (Adaptive, 8.0)]);
        let result = classify_attachment(&traits, &domains(&traits), &ScoringOverrides::default());
        assert_eq!(result.style, "Secure");
    }
}
