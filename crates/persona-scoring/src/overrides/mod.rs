//! Administrator-editable weights and thresholds that parameterize every classifier.

mod defaults;
pub mod validation;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::scoring::traits::{Trait, TraitMapping};

pub use validation::{
    auto_fix_overrides, auto_fix_weights, validate_complete_overrides, validate_framework_weights,
    validate_mbti_weights, validate_trait_mappings, ValidationOptions, ValidationReport,
};

/// The four MBTI dichotomies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MbtiDimension {
    EI,
    SN,
    TF,
    JP,
}

impl MbtiDimension {
    pub const ALL: [MbtiDimension; 4] = [
        MbtiDimension::EI,
        MbtiDimension::SN,
        MbtiDimension::TF,
        MbtiDimension::JP,
    ];

    /// Letter emitted when the dimension score is above and below the threshold.
    pub fn letters(self) -> (char, char) {
        match self {
            MbtiDimension::EI => ('E', 'I'),
            MbtiDimension::SN => ('S', 'N'),
            MbtiDimension::TF => ('T', 'F'),
            MbtiDimension::JP => ('J', 'P'),
        }
    }
}

impl fmt::Display for MbtiDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Trait weights for one sub-dimension of a framework.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub traits: BTreeMap<Trait, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<f64>,
}

impl DimensionWeights {
    pub fn new(traits: &[(Trait, f64)]) -> Self {
        Self {
            traits: traits.iter().copied().collect(),
            threshold: None,
            scaling: None,
        }
    }
}

/// Sub-dimension name (e.g. `"4"` for Enneagram or `"R"` for Holland) to its weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameworkWeights(pub BTreeMap<String, DimensionWeights>);

impl FrameworkWeights {
    pub fn get(&self, key: &str) -> Option<&DimensionWeights> {
        self.0.get(key)
    }
}

/// Weighted frameworks other than MBTI, used to label validation messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framework {
    BigFive,
    Enneagram,
    Alignment,
    Holland,
    Socionics,
    Integral,
    Attachment,
}

impl Framework {
    pub const ALL: [Framework; 7] = [
        Framework::BigFive,
        Framework::Enneagram,
        Framework::Alignment,
        Framework::Holland,
        Framework::Socionics,
        Framework::Integral,
        Framework::Attachment,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Framework::BigFive => "bigfive",
            Framework::Enneagram => "enneagram",
            Framework::Alignment => "alignment",
            Framework::Holland => "holland",
            Framework::Socionics => "socionics",
            Framework::Integral => "integral",
            Framework::Attachment => "attachment",
        }
    }

    /// Sub-dimensions the matching classifier reads.
    pub fn sub_dimensions(self) -> &'static [&'static str] {
        match self {
            Framework::BigFive => &[
                "openness",
                "conscientiousness",
                "extraversion",
                "agreeableness",
                "neuroticism",
            ],
            Framework::Enneagram => &["1", "2", "3", "4", "5", "6", "7", "8", "9"],
            Framework::Alignment => &[
                "lawful",
                "order_neutral",
                "chaotic",
                "good",
                "moral_neutral",
                "evil",
            ],
            Framework::Holland => &["R", "I", "A", "S", "E", "C"],
            Framework::Socionics => &["Ne", "Ni", "Se", "Si", "Te", "Ti", "Fe", "Fi"],
            Framework::Integral => &["red", "amber", "orange", "green", "teal", "turquoise"],
            Framework::Attachment => &["secure", "anxious", "avoidant", "disorganized"],
        }
    }
}

/// The persisted overrides document. Sections missing from a document fall back to the
/// built-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScoringOverrides {
    pub mbti: BTreeMap<MbtiDimension, DimensionWeights>,
    pub bigfive: FrameworkWeights,
    pub enneagram: FrameworkWeights,
    pub alignment: FrameworkWeights,
    pub holland: FrameworkWeights,
    pub socionics: FrameworkWeights,
    pub integral: FrameworkWeights,
    pub attachment: FrameworkWeights,
    pub trait_mappings: TraitMapping,
}

impl Default for ScoringOverrides {
    fn default() -> Self {
        Self {
            mbti: defaults::mbti(),
            bigfive: defaults::big_five(),
            enneagram: defaults::enneagram(),
            alignment: defaults::alignment(),
            holland: defaults::holland(),
            socionics: defaults::socionics(),
            integral: defaults::integral(),
            attachment: defaults::attachment(),
            trait_mappings: TraitMapping::standard(),
        }
    }
}

impl ScoringOverrides {
    pub fn framework(&self, framework: Framework) -> &FrameworkWeights {
        match framework {
            Framework::BigFive => &self.bigfive,
            Framework::Enneagram => &self.enneagram,
            Framework::Alignment => &self.alignment,
            Framework::Holland => &self.holland,
            Framework::Socionics => &self.socionics,
            Framework::Integral => &self.integral,
            Framework::Attachment => &self.attachment,
        }
    }

    pub fn framework_mut(&mut self, framework: Framework) -> &mut FrameworkWeights {
        match framework {
            Framework::BigFive => &mut self.bigfive,
            Framework::Enneagram => &mut self.enneagram,
            Framework::Alignment => &mut self.alignment,
            Framework::Holland => &mut self.holland,
            Framework::Socionics => &mut self.socionics,
            Framework::Integral => &mut self.integral,
            Framework::Attachment => &mut self.attachment,
        }
    }

    pub fn from_json(raw: &str) -> Result<Self, OverridesError> {
        serde_json::from_str(raw).map_err(OverridesError::Parse)
    }

    /// Reads a document from disk and refuses to activate it when validation reports errors.
    pub fn load_validated(path: &Path) -> Result<(Self, ValidationReport), OverridesError> {
        let raw = std::fs::read_to_string(path).map_err(|source| OverridesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let overrides = Self::from_json(&raw)?;
        let report = validate_complete_overrides(&overrides, &ValidationOptions::default());
        if !report.is_valid {
            return Err(OverridesError::Rejected(report.errors));
        }
        Ok((overrides, report))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OverridesError {
    #[error("unable to read overrides from {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("overrides document is malformed: {0}")]
    Parse(serde_json::Error),
    #[error("overrides rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),
}
