//! Validator -> aggregator -> classifiers -> profile.

pub mod aggregate;
pub mod classifiers;
pub mod integral;
pub mod profile;
pub mod responses;
pub mod traits;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use crate::overrides::ScoringOverrides;

pub use aggregate::{DomainScores, QuestionWeights, TraitScores};
pub use classifiers::Classification;
pub use integral::{
    Clarification, ClarificationExchange, ClarificationTurn, IntegralAnswer, IntegralDetail,
    IntegralLevel,
};
pub use profile::{PersonalityProfile, ProfileValidation, ValidationStatus};
pub use responses::{ResponseValidationError, ValidatedResponses};
pub use traits::{Domain, Trait, TraitMapping, Triad};

/// Where a profile's integral detail comes from.
#[derive(Debug, Clone, Copy, Default)]
pub enum IntegralSource<'a> {
    /// Leave `integralDetail` out of the profile.
    #[default]
    Skip,
    /// Questionnaire answers, optionally refined by a clarification exchange.
    Answers {
        answers: &'a [IntegralAnswer],
        clarification: Option<&'a ClarificationExchange>,
    },
    /// Estimate from trait scores; used to backfill assessments taken before the
    /// integral questionnaire existed.
    Traits,
}

/// Scores assessments against one active overrides document.
#[derive(Debug, Clone, Default)]
pub struct ScoringEngine {
    overrides: ScoringOverrides,
    question_weights: Option<QuestionWeights>,
}

impl ScoringEngine {
    pub fn new(overrides: ScoringOverrides) -> Self {
        Self {
            overrides,
            question_weights: None,
        }
    }

    pub fn with_question_weights(mut self, weights: QuestionWeights) -> Self {
        self.question_weights = Some(weights);
        self
    }

    pub fn overrides(&self) -> &ScoringOverrides {
        &self.overrides
    }

    pub fn score_json(
        &self,
        raw: &Value,
        integral: IntegralSource<'_>,
    ) -> Result<PersonalityProfile, ResponseValidationError> {
        let responses = responses::validate_json(raw)?;
        Ok(self.score(&responses, integral))
    }

    pub fn score(
        &self,
        responses: &ValidatedResponses,
        integral: IntegralSource<'_>,
    ) -> PersonalityProfile {
        let trait_scores = aggregate::aggregate(
            responses,
            &self.overrides.trait_mappings,
            self.question_weights.as_ref(),
        );
        let domain_scores = aggregate::domain_scores(&trait_scores);
        let classifications =
            classifiers::classify_all(&trait_scores, &domain_scores, &self.overrides);

        let integral_detail = match integral {
            IntegralSource::Skip => None,
            IntegralSource::Answers {
                answers,
                clarification,
            } => {
                let preliminary = integral::preliminary_from_answers(answers);
                let clarification = clarification.map(|exchange| exchange.resolve(&preliminary));
                Some(integral::assess(&preliminary, clarification.as_ref()))
            }
            IntegralSource::Traits => {
                let preliminary = integral::preliminary_from_traits(&trait_scores, &self.overrides);
                Some(integral::assess(&preliminary, None))
            }
        };

        for classification in &classifications {
            debug!(
                framework = classification.framework_name(),
                degraded = classification.degraded(),
                "classified"
            );
        }

        let profile = PersonalityProfile::assemble(
            aggregate::dominant_traits(&trait_scores),
            trait_scores,
            domain_scores,
            &classifications,
            integral_detail,
            Utc::now(),
        );
        debug!(
            mbti = %profile.mappings.mbti,
            enneagram = %profile.mappings.enneagram,
            status = ?profile.validation.status,
            "profile scored"
        );
        profile
    }
}
