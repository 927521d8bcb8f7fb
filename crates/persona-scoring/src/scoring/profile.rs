use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::aggregate::{DomainScores, TraitScores};
use super::classifiers::{Classification, EnneagramResult};
use super::integral::IntegralDetail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Error,
    Warning,
    Inconsistent,
    Validated,
}

/// Quality flags for the presentation layer. Never blocks a profile from being stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileValidation {
    pub status: ValidationStatus,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub inconsistent: bool,
}

impl ProfileValidation {
    pub fn new(errors: Vec<String>, warnings: Vec<String>, inconsistent: bool) -> Self {
        let status = if !errors.is_empty() {
            ValidationStatus::Error
        } else if !warnings.is_empty() {
            ValidationStatus::Warning
        } else if inconsistent {
            ValidationStatus::Inconsistent
        } else {
            ValidationStatus::Validated
        };
        Self {
            status,
            errors,
            warnings,
            inconsistent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnneagramDetails {
    #[serde(rename = "type")]
    pub primary: u8,
    pub wing: u8,
    pub tritype: String,
}

impl From<&EnneagramResult> for EnneagramDetails {
    fn from(result: &EnneagramResult) -> Self {
        Self {
            primary: result.primary,
            wing: result.wing,
            tritype: result.tritype_label(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityMatch {
    pub name: String,
    pub mbti: String,
    pub enneagram: u8,
    pub similarity: u8,
}

/// One archetype per MBTI type, paired with its most common Enneagram type.
const ARCHETYPES: [(&str, &str, u8); 16] = [
    ("Strategist", "INTJ", 5),
    ("Theorist", "INTP", 5),
    ("Commander", "ENTJ", 8),
    ("Inventor", "ENTP", 7),
    ("Counselor", "INFJ", 4),
    ("Idealist", "INFP", 9),
    ("Mentor", "ENFJ", 2),
    ("Champion", "ENFP", 7),
    ("Inspector", "ISTJ", 1),
    ("Protector", "ISFJ", 6),
    ("Supervisor", "ESTJ", 8),
    ("Provider", "ESFJ", 2),
    ("Craftsman", "ISTP", 9),
    ("Composer", "ISFP", 4),
    ("Promoter", "ESTP", 3),
    ("Performer", "ESFP", 7),
];

const MATCH_COUNT: usize = 3;

/// Top archetypes by shared MBTI letters and Enneagram type, 20 points each.
pub fn personality_matches(mbti: &str, enneagram: u8) -> Vec<PersonalityMatch> {
    let mut matches: Vec<PersonalityMatch> = ARCHETYPES
        .iter()
        .map(|(name, code, archetype_enneagram)| {
            let shared = code
                .chars()
                .zip(mbti.chars())
                .filter(|(a, b)| a == b)
                .count() as u8;
            let enneagram_bonus = if *archetype_enneagram == enneagram { 1 } else { 0 };
            PersonalityMatch {
                name: (*name).to_string(),
                mbti: (*code).to_string(),
                enneagram: *archetype_enneagram,
                similarity: (shared + enneagram_bonus) * 20,
            }
        })
        .collect();
    matches.sort_by(|a, b| {
        b.similarity
            .cmp(&a.similarity)
            .then_with(|| a.name.cmp(&b.name))
    });
    matches.truncate(MATCH_COUNT);
    matches
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileMappings {
    pub mbti: String,
    pub enneagram: String,
    pub enneagram_details: EnneagramDetails,
    pub big_five: BTreeMap<String, f64>,
    pub dnd_alignment: String,
    pub socionics: String,
    pub holland_code: String,
    pub attachment_style: String,
    pub personality_matches: Vec<PersonalityMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integral_detail: Option<IntegralDetail>,
}

impl ProfileMappings {
    fn from_classifications(
        classifications: &[Classification],
        integral_detail: Option<IntegralDetail>,
    ) -> Self {
        let mut mappings = ProfileMappings {
            mbti: String::new(),
            enneagram: String::new(),
            enneagram_details: EnneagramDetails {
                primary: 0,
                wing: 0,
                tritype: String::new(),
            },
            big_five: BTreeMap::new(),
            dnd_alignment: String::new(),
            socionics: String::new(),
            holland_code: String::new(),
            attachment_style: String::new(),
            personality_matches: Vec::new(),
            integral_detail,
        };

        for classification in classifications {
            match classification {
                Classification::Mbti(result) => mappings.mbti = result.code.clone(),
                Classification::Enneagram(result) => {
                    mappings.enneagram = result.label();
                    mappings.enneagram_details = EnneagramDetails::from(result);
                }
                Classification::BigFive(result) => {
                    mappings.big_five = result
                        .entries()
                        .into_iter()
                        .map(|(key, value)| (key.to_string(), value))
                        .collect();
                }
                Classification::Holland(result) => mappings.holland_code = result.code.clone(),
                Classification::Alignment(result) => {
                    mappings.dnd_alignment = result.label.clone()
                }
                Classification::Socionics(result) => mappings.socionics = result.label(),
                Classification::Attachment(result) => {
                    mappings.attachment_style = result.style.clone()
                }
            }
        }

        mappings.personality_matches =
            personality_matches(&mappings.mbti, mappings.enneagram_details.primary);
        mappings
    }

    /// Structural checks on the assembled labels.
    fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.mbti.chars().count() != 4 {
            errors.push(format!("MBTI code {:?} is not four letters", self.mbti));
        }
        if !(1..=9).contains(&self.enneagram_details.primary) {
            errors.push(format!(
                "Enneagram type {} is outside 1-9",
                self.enneagram_details.primary
            ));
        }
        for (dimension, value) in &self.big_five {
            if !(0.0..=1.0).contains(value) {
                errors.push(format!("Big Five {dimension} score {value} is outside 0-1"));
            }
        }
        errors
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalityProfile {
    pub dominant_traits: BTreeMap<String, String>,
    pub trait_scores: TraitScores,
    pub domain_scores: DomainScores,
    pub mappings: ProfileMappings,
    pub timestamp: DateTime<Utc>,
    pub validation: ProfileValidation,
}

impl PersonalityProfile {
    pub(crate) fn assemble(
        dominant_traits: BTreeMap<String, String>,
        trait_scores: TraitScores,
        domain_scores: DomainScores,
        classifications: &[Classification],
        integral_detail: Option<IntegralDetail>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        let mut warnings: Vec<String> = classifications
            .iter()
            .filter(|classification| classification.degraded())
            .map(|classification| {
                format!(
                    "{} used neutral fallbacks for missing scores or weights",
                    classification.framework_name()
                )
            })
            .collect();

        let mut inconsistent = false;
        if let Some(detail) = &integral_detail {
            if detail.consistency.fallback_used {
                warnings.push(
                    "Integral clarification was unavailable; preliminary scores were used"
                        .to_string(),
                );
            }
            inconsistent = detail.inconsistent();
        }

        let mappings = ProfileMappings::from_classifications(classifications, integral_detail);
        let errors = mappings.errors();

        Self {
            dominant_traits,
            trait_scores,
            domain_scores,
            mappings,
            timestamp,
            validation: ProfileValidation::new(errors, warnings, inconsistent),
        }
    }
}
