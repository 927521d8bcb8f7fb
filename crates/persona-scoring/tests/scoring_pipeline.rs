use persona_scoring::overrides::{
    auto_fix_weights, validate_complete_overrides, MbtiDimension, ValidationOptions,
};
use persona_scoring::scoring::classifiers::{classify_all, Classification};
use persona_scoring::scoring::integral::IntegralLevel;
use persona_scoring::scoring::responses::{validate, validate_json};
use persona_scoring::scoring::{
    aggregate, IntegralSource, ResponseValidationError, ScoringEngine, Trait, ValidationStatus,
};
use persona_scoring::ScoringOverrides;
use serde_json::json;

fn alternating() -> Vec<f64> {
    (0..108)
        .map(|index| if index % 2 == 0 { 3.0 } else { 8.0 })
        .collect()
}

#[test]
fn alternating_responses_score_into_a_full_profile() {
    let engine = ScoringEngine::default();
    let responses = validate(&alternating()).expect("valid responses");
    let profile = engine.score(&responses, IntegralSource::Traits);

    assert_eq!(profile.mappings.mbti, "ISFJ");
    assert_eq!(profile.trait_scores.0.len(), 36);
    assert_eq!(profile.domain_scores.0.len(), 4);
    assert!(!profile.mappings.enneagram.is_empty());
    assert_eq!(profile.mappings.holland_code.len(), 3);
    assert_eq!(profile.mappings.big_five.len(), 5);
    assert!(!profile.mappings.dnd_alignment.is_empty());
    assert!(profile.mappings.socionics.contains('('));
    assert_eq!(profile.mappings.personality_matches.len(), 3);
    assert!(profile
        .mappings
        .personality_matches
        .iter()
        .any(|archetype| archetype.mbti == "ISFJ"));
    assert!(profile.mappings.integral_detail.is_some());
    assert_eq!(profile.validation.status, ValidationStatus::Validated);
}

#[test]
fn validator_accepts_in_range_input_unchanged() {
    let raw: Vec<f64> = (0..108).map(|index| f64::from(index % 10 + 1)).collect();
    let validated = validate(&raw).expect("in range");
    assert_eq!(validated.values(), raw.as_slice());

    for length in [0usize, 107, 109] {
        let error = validate(&vec![5.0; length]).expect_err("wrong length");
        assert_eq!(
            error,
            ResponseValidationError::WrongLength {
                expected: 108,
                actual: length
            }
        );
    }

    let mut payload = vec![json!(5); 108];
    payload[17] = json!("eleven");
    assert!(matches!(
        validate_json(&json!(payload)),
        Err(ResponseValidationError::OutOfRange { question: 18, .. })
    ));
}

#[test]
fn aggregation_is_deterministic() {
    let overrides = ScoringOverrides::default();
    let responses = validate(&alternating()).expect("valid responses");
    let first = aggregate::aggregate(&responses, &overrides.trait_mappings, None);
    let second = aggregate::aggregate(&responses, &overrides.trait_mappings, None);
    assert_eq!(first, second);
}

#[test]
fn adjusted_threshold_changes_the_classification() {
    let mut overrides = ScoringOverrides::default();
    if let Some(ei) = overrides.mbti.get_mut(&MbtiDimension::EI) {
        ei.threshold = Some(3.0);
    }
    let report = validate_complete_overrides(&overrides, &ValidationOptions::default());
    assert!(report.is_valid, "{:?}", report.errors);

    let responses = validate(&alternating()).expect("valid responses");
    let profile = ScoringEngine::new(overrides).score(&responses, IntegralSource::Skip);
    assert_eq!(profile.mappings.mbti, "ESFJ");
}

#[test]
fn auto_fixed_weights_pass_validation() {
    let mut overrides = ScoringOverrides::default();
    if let Some(ei) = overrides.mbti.get_mut(&MbtiDimension::EI) {
        ei.traits = [(Trait::Extroverted, 3.0), (Trait::Introverted, 1.0)]
            .into_iter()
            .collect();
    }
    let report = validate_complete_overrides(&overrides, &ValidationOptions::default());
    assert!(!report.is_valid);
    assert!(report.errors.iter().any(|error| error.starts_with("mbti: EI")));

    if let Some(ei) = overrides.mbti.get_mut(&MbtiDimension::EI) {
        ei.traits = auto_fix_weights(&ei.traits);
        assert_eq!(ei.traits.get(&Trait::Extroverted), Some(&0.75));
    }
    let report = validate_complete_overrides(&overrides, &ValidationOptions::default());
    assert!(report.is_valid, "{:?}", report.errors);
}

#[test]
fn classifications_serialize_with_a_framework_tag() {
    let overrides = ScoringOverrides::default();
    let responses = validate(&alternating()).expect("valid responses");
    let traits = aggregate::aggregate(&responses, &overrides.trait_mappings, None);
    let domains = aggregate::domain_scores(&traits);

    let results = classify_all(&traits, &domains, &overrides);
    let tags: Vec<String> = results
        .iter()
        .map(|result| {
            serde_json::to_value(result).expect("serializes")["framework"]
                .as_str()
                .unwrap_or_default()
                .to_string()
        })
        .collect();
    assert_eq!(
        tags,
        ["mbti", "enneagram", "big_five", "holland", "alignment", "socionics", "attachment"]
    );
    assert!(matches!(results[0], Classification::Mbti(ref mbti) if mbti.code == "ISFJ"));
}

#[test]
fn integral_levels_accept_lower_case_names() {
    let level: IntegralLevel = serde_json::from_value(json!("teal")).expect("alias parses");
    assert_eq!(level, IntegralLevel::Teal);
    assert_eq!(serde_json::to_value(level).expect("serializes"), json!("Teal"));
}
