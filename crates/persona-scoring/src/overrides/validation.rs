use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{DimensionWeights, Framework, FrameworkWeights, MbtiDimension, ScoringOverrides};
use crate::scoring::traits::{Trait, TraitMapping, MAX_QUESTION_INDEX, QUESTION_COUNT};

/// Absorbs binary rounding so that boundaries like 0.6 + 0.5 against a 0.1 tolerance hold.
const FLOAT_SLACK: f64 = 1e-9;

const MBTI_THRESHOLD_RANGE: (f64, f64) = (1.0, 10.0);
const FRAMEWORK_THRESHOLD_RANGE: (f64, f64) = (0.0, 10.0);
const MAX_SCALING: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationOptions {
    pub max_total_deviation: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    pub allow_zero_weights: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            max_total_deviation: 0.1,
            min_weight: 0.0,
            max_weight: 1.0,
            allow_zero_weights: false,
        }
    }
}

/// Errors block activation of an overrides document; warnings are informational.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn absorb(&mut self, prefix: &str, other: ValidationReport) {
        self.errors
            .extend(other.errors.into_iter().map(|e| format!("{prefix}: {e}")));
        self.warnings
            .extend(other.warnings.into_iter().map(|w| format!("{prefix}: {w}")));
        self.is_valid = self.errors.is_empty();
    }
}

pub fn validate_mbti_weights(
    mbti: &BTreeMap<MbtiDimension, DimensionWeights>,
    options: &ValidationOptions,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for dimension in MbtiDimension::ALL {
        if !mbti.contains_key(&dimension) {
            warnings.push(format!("{dimension}: no weights configured, scores stay neutral"));
        }
    }

    for (dimension, weights) in mbti {
        let label = dimension.to_string();
        check_weights(&label, &weights.traits, options, &mut errors, &mut warnings);
        if let Some(threshold) = weights.threshold {
            check_threshold(&label, threshold, MBTI_THRESHOLD_RANGE, &mut errors);
        }
    }

    ValidationReport::from_parts(errors, warnings)
}

pub fn validate_framework_weights(
    framework: Framework,
    weights: &FrameworkWeights,
    options: &ValidationOptions,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let known = framework.sub_dimensions();

    for (key, dimension) in &weights.0 {
        if !known.contains(&key.as_str()) {
            warnings.push(format!("{key}: not a recognised sub-dimension and will be ignored"));
        }
        check_weights(key, &dimension.traits, options, &mut errors, &mut warnings);
        if let Some(threshold) = dimension.threshold {
            check_threshold(key, threshold, FRAMEWORK_THRESHOLD_RANGE, &mut errors);
        }
        if let Some(scaling) = dimension.scaling {
            if !(scaling > 0.0 && scaling <= MAX_SCALING) {
                warnings.push(format!(
                    "{key}: scaling {scaling} outside (0, {MAX_SCALING}] will distort scores"
                ));
            }
        }
    }

    ValidationReport::from_parts(errors, warnings)
}

pub fn validate_trait_mappings(mapping: &TraitMapping) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut owners: BTreeMap<u16, Vec<Trait>> = BTreeMap::new();

    for trait_ in Trait::all() {
        let questions = mapping.questions(trait_);
        if questions.is_empty() {
            warnings.push(format!("{trait_}: no questions mapped, score will be zero"));
        }
        for &question in questions {
            if !(1..=MAX_QUESTION_INDEX).contains(&question) {
                errors.push(format!(
                    "{trait_}: question {question} outside 1..={MAX_QUESTION_INDEX}"
                ));
                continue;
            }
            let entry = owners.entry(question).or_default();
            if !entry.contains(&trait_) {
                entry.push(trait_);
            }
        }
    }

    for (question, traits) in &owners {
        if traits.len() > 1 {
            let names: Vec<String> = traits.iter().map(|owner| owner.name()).collect();
            warnings.push(format!(
                "question {question} is shared by {}",
                names.join(", ")
            ));
        }
    }

    let unused: Vec<String> = (1..=QUESTION_COUNT as u16)
        .filter(|question| !owners.contains_key(question))
        .map(|question| question.to_string())
        .collect();
    if !unused.is_empty() {
        warnings.push(format!("questions not mapped to any trait: {}", unused.join(", ")));
    }

    ValidationReport::from_parts(errors, warnings)
}

pub fn validate_complete_overrides(
    overrides: &ScoringOverrides,
    options: &ValidationOptions,
) -> ValidationReport {
    let mut report = ValidationReport::from_parts(Vec::new(), Vec::new());
    report.absorb("mbti", validate_mbti_weights(&overrides.mbti, options));
    for framework in Framework::ALL {
        report.absorb(
            framework.key(),
            validate_framework_weights(framework, overrides.framework(framework), options),
        );
    }
    report.absorb(
        "traitMappings",
        validate_trait_mappings(&overrides.trait_mappings),
    );
    report
}

/// Renormalizes weights to sum to one. An all-zero map is spread evenly; negative or
/// non-finite weights count as zero. Already-normalized input is returned untouched.
pub fn auto_fix_weights<K: Ord + Clone>(weights: &BTreeMap<K, f64>) -> BTreeMap<K, f64> {
    if weights.is_empty() {
        return BTreeMap::new();
    }

    let cleaned: BTreeMap<K, f64> = weights
        .iter()
        .map(|(key, weight)| {
            let weight = if weight.is_finite() && *weight > 0.0 {
                *weight
            } else {
                0.0
            };
            (key.clone(), weight)
        })
        .collect();

    let total: f64 = cleaned.values().sum();
    if total == 0.0 {
        let share = 1.0 / cleaned.len() as f64;
        return cleaned.into_keys().map(|key| (key, share)).collect();
    }
    if (total - 1.0).abs() <= FLOAT_SLACK {
        return cleaned;
    }

    cleaned
        .into_iter()
        .map(|(key, weight)| (key, weight / total))
        .collect()
}

/// Applies [`auto_fix_weights`] to every MBTI dimension and framework sub-dimension.
/// Thresholds, scaling and trait mappings are left as they are.
pub fn auto_fix_overrides(overrides: &ScoringOverrides) -> ScoringOverrides {
    let mut fixed = overrides.clone();
    for weights in fixed.mbti.values_mut() {
        weights.traits = auto_fix_weights(&weights.traits);
    }
    for framework in Framework::ALL {
        for weights in fixed.framework_mut(framework).0.values_mut() {
            weights.traits = auto_fix_weights(&weights.traits);
        }
    }
    fixed
}

fn check_weights(
    label: &str,
    weights: &BTreeMap<Trait, f64>,
    options: &ValidationOptions,
    errors: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let total: f64 = weights.values().sum();
    let deviation = (total - 1.0).abs();
    if !(deviation <= options.max_total_deviation + FLOAT_SLACK) {
        errors.push(format!(
            "{label}: weights sum to {total:.3}, expected 1.0 ± {}",
            options.max_total_deviation
        ));
    }

    for (trait_, weight) in weights {
        if !(options.min_weight..=options.max_weight).contains(weight) {
            errors.push(format!(
                "{label}: weight for {trait_} ({weight}) must be between {} and {}",
                options.min_weight, options.max_weight
            ));
        } else if *weight == 0.0 && !options.allow_zero_weights {
            warnings.push(format!("{label}: {trait_} has zero weight and will be ignored"));
        }
    }
}

fn check_threshold(label: &str, threshold: f64, range: (f64, f64), errors: &mut Vec<String>) {
    let (min, max) = range;
    if !(min..=max).contains(&threshold) {
        errors.push(format!(
            "{label}: threshold {threshold} must be between {min} and {max}"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ei(traits: &[(Trait, f64)]) -> BTreeMap<MbtiDimension, DimensionWeights> {
        let mut mbti = ScoringOverrides::default().mbti;
        mbti.insert(MbtiDimension::EI, DimensionWeights::new(traits));
        mbti
    }

    #[test]
    fn defaults_are_clean() {
        let report =
            validate_complete_overrides(&ScoringOverrides::default(), &ValidationOptions::default());
        assert!(report.is_valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn injected_sum_deviation_is_an_error() {
        let mbti = ei(&[(Trait::Extroverted, 0.7), (Trait::Introverted, 0.5)]);
        let report = validate_mbti_weights(&mbti, &ValidationOptions::default());
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|error| error.starts_with("EI:")));
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let mbti = ei(&[(Trait::Extroverted, 0.6), (Trait::Introverted, 0.5)]);
        let report = validate_mbti_weights(&mbti, &ValidationOptions::default());
        assert!(report.is_valid, "{:?}", report.errors);

        let strict = ValidationOptions {
            max_total_deviation: 0.05,
            ..ValidationOptions::default()
        };
        let report = validate_mbti_weights(&mbti, &strict);
        assert!(!report.is_valid);
    }

    #[test]
    fn bounds_and_threshold_are_errors_zero_weight_is_warning() {
        let mut mbti = ei(&[(Trait::Extroverted, 1.0), (Trait::Introverted, 0.0)]);
        let report = validate_mbti_weights(&mbti, &ValidationOptions::default());
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Introverted"));

        let allow = ValidationOptions {
            allow_zero_weights: true,
            ..ValidationOptions::default()
        };
        assert!(validate_mbti_weights(&mbti, &allow).warnings.is_empty());

        mbti.insert(
            MbtiDimension::TF,
            DimensionWeights {
                traits: [(Trait::Analytical, 1.2), (Trait::Empathetic, -0.2)]
                    .into_iter()
                    .collect(),
                threshold: Some(11.0),
                scaling: None,
            },
        );
        let report = validate_mbti_weights(&mbti, &ValidationOptions::default());
        assert!(!report.is_valid);
        assert_eq!(
            report
                .errors
                .iter()
                .filter(|error| error.starts_with("TF:"))
                .count(),
            3
        );
    }

    #[test]
    fn framework_scaling_and_unknown_keys_warn() {
        let mut holland = ScoringOverrides::default().holland;
        holland.0.get_mut("R").expect("R exists").scaling = Some(12.0);
        holland
            .0
            .insert("Z".to_string(), DimensionWeights::new(&[(Trait::Calm, 1.0)]));
        let report =
            validate_framework_weights(Framework::Holland, &holland, &ValidationOptions::default());
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn trait_mapping_checks() {
        let mut mapping = TraitMapping::standard();
        mapping.0.insert(Trait::Calm, vec![0, 146]);
        mapping.0.insert(Trait::Reactive, vec![1]);
        mapping.0.insert(Trait::Adaptive, Vec::new());

        let report = validate_trait_mappings(&mapping);
        assert!(!report.is_valid);
        assert_eq!(report.errors.len(), 2);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("question 1 is shared by Extroverted, Reactive")));
        assert!(report.warnings.iter().any(|w| w.starts_with("Adaptive:")));
        assert!(report
            .warnings
            .iter()
            .any(|w| w.starts_with("questions not mapped")));
    }

    #[test]
    fn complete_report_prefixes_sections() {
        let mut overrides = ScoringOverrides::default();
        overrides
            .enneagram
            .0
            .get_mut("4")
            .expect("type 4")
            .threshold = Some(20.0);
        let report = validate_complete_overrides(&overrides, &ValidationOptions::default());
        assert!(!report.is_valid);
        assert!(report.errors[0].starts_with("enneagram: 4:"));
    }

    #[test]
    fn auto_fix_normalizes_and_is_idempotent() {
        let weights: BTreeMap<Trait, f64> =
            [(Trait::Calm, 0.3), (Trait::Reactive, 0.3), (Trait::Adaptive, 0.7)]
                .into_iter()
                .collect();
        let once = auto_fix_weights(&weights);
        let total: f64 = once.values().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(auto_fix_weights(&once), once);
    }

    #[test]
    fn auto_fixed_document_passes_validation() {
        let mut overrides = ScoringOverrides::default();
        overrides.mbti = ei(&[(Trait::Extroverted, 2.0), (Trait::Introverted, 2.0)]);
        if let Some(openness) = overrides.bigfive.0.get_mut("openness") {
            openness.traits = [(Trait::Curious, 0.0), (Trait::Intuitive, 0.0)]
                .into_iter()
                .collect();
        }
        assert!(!validate_complete_overrides(&overrides, &ValidationOptions::default()).is_valid);

        let fixed = auto_fix_overrides(&overrides);
        let report = validate_complete_overrides(&fixed, &ValidationOptions::default());
        assert!(report.is_valid, "{:?}", report.errors);
        assert_eq!(
            fixed.bigfive.get("openness").map(|w| w.traits.values().sum::<f64>()),
            Some(1.0)
        );
        assert_eq!(fixed.trait_mappings, overrides.trait_mappings);
    }

    #[test]
    fn auto_fix_spreads_all_zero_weights() {
        let weights: BTreeMap<&str, f64> = [("a", 0.0), ("b", 0.0), ("c", 0.0), ("d", 0.0)]
            .into_iter()
            .collect();
        let fixed = auto_fix_weights(&weights);
        assert!(fixed.values().all(|weight| *weight == 0.25));
    }
}
