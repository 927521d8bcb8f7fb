use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of questions in the standard questionnaire variant.
pub const QUESTION_COUNT: usize = 108;

/// Highest question index any trait mapping may reference.
pub const MAX_QUESTION_INDEX: u16 = 145;

/// Top-level grouping of triads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Domain {
    External,
    Internal,
    Interpersonal,
    Processing,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::External,
        Domain::Internal,
        Domain::Interpersonal,
        Domain::Processing,
    ];

    pub fn triads(self) -> [Triad; 3] {
        match self {
            Domain::External => [Triad::Energy, Triad::Action, Triad::Structure],
            Domain::Internal => [Triad::Perception, Triad::Stability, Triad::Motivation],
            Domain::Interpersonal => [Triad::Judgment, Triad::Connection, Triad::Morality],
            Domain::Processing => [Triad::Planning, Triad::Openness, Triad::Order],
        }
    }
}

/// Three mutually contrasting traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Triad {
    Energy,
    Action,
    Structure,
    Perception,
    Stability,
    Motivation,
    Judgment,
    Connection,
    Morality,
    Planning,
    Openness,
    Order,
}

impl Triad {
    pub const ALL: [Triad; 12] = [
        Triad::Energy,
        Triad::Action,
        Triad::Structure,
        Triad::Perception,
        Triad::Stability,
        Triad::Motivation,
        Triad::Judgment,
        Triad::Connection,
        Triad::Morality,
        Triad::Planning,
        Triad::Openness,
        Triad::Order,
    ];

    pub fn traits(self) -> [Trait; 3] {
        use Trait::*;
        match self {
            Triad::Energy => [Extroverted, Introverted, Ambivert],
            Triad::Action => [Assertive, Passive, Receptive],
            Triad::Structure => [Structured, Flexible, Independent],
            Triad::Perception => [Sensing, Intuitive, Synthesizing],
            Triad::Stability => [Calm, Reactive, Adaptive],
            Triad::Motivation => [Achievement, Security, Meaning],
            Triad::Judgment => [Analytical, Empathetic, Principled],
            Triad::Connection => [Trusting, Guarded, Selective],
            Triad::Morality => [Altruistic, SelfInterested, Fair],
            Triad::Planning => [Methodical, Spontaneous, Strategic],
            Triad::Openness => [Curious, Traditional, Practical],
            Triad::Order => [Lawful, Chaotic, Balanced],
        }
    }

    pub fn domain(self) -> Domain {
        Domain::ALL
            .into_iter()
            .find(|domain| domain.triads().contains(&self))
            .unwrap_or(Domain::External)
    }
}

impl fmt::Display for Triad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// One of the 36 atomic personality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trait {
    Extroverted,
    Introverted,
    Ambivert,
    Assertive,
    Passive,
    Receptive,
    Structured,
    Flexible,
    Independent,
    Sensing,
    Intuitive,
    Synthesizing,
    Calm,
    Reactive,
    Adaptive,
    Achievement,
    Security,
    Meaning,
    Analytical,
    Empathetic,
    Principled,
    Trusting,
    Guarded,
    Selective,
    Altruistic,
    SelfInterested,
    Fair,
    Methodical,
    Spontaneous,
    Strategic,
    Curious,
    Traditional,
    Practical,
    Lawful,
    Chaotic,
    Balanced,
}

impl Trait {
    /// Every trait in canonical order (domain, then triad, then position).
    pub fn all() -> impl Iterator<Item = Trait> {
        Triad::ALL.into_iter().flat_map(Triad::traits)
    }

    pub fn triad(self) -> Triad {
        Triad::ALL
            .into_iter()
            .find(|triad| triad.traits().contains(&self))
            .unwrap_or(Triad::Energy)
    }

    pub fn domain(self) -> Domain {
        self.triad().domain()
    }

    pub fn name(self) -> String {
        format!("{self:?}")
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Trait name to the 1-based question indices that feed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraitMapping(pub BTreeMap<Trait, Vec<u16>>);

impl TraitMapping {
    /// Three questions per trait, striped so that question `t + 1`, `t + 37`, and `t + 73`
    /// belong to the trait at canonical position `t`.
    pub fn standard() -> Self {
        let stride = (QUESTION_COUNT / 3) as u16;
        let mapping = Trait::all()
            .enumerate()
            .map(|(position, trait_)| {
                let first = position as u16 + 1;
                (trait_, vec![first, first + stride, first + stride * 2])
            })
            .collect();
        Self(mapping)
    }

    pub fn questions(&self, trait_: Trait) -> &[u16] {
        self.0.get(&trait_).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for TraitMapping {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn catalog_has_thirty_six_unique_traits() {
        let traits: BTreeSet<Trait> = Trait::all().collect();
        assert_eq!(traits.len(), 36);
        for domain in Domain::ALL {
            let count = Trait::all().filter(|t| t.domain() == domain).count();
            assert_eq!(count, 9, "{domain:?} should own three triads");
        }
    }

    #[test]
    fn standard_mapping_uses_every_question_once() {
        let mapping = TraitMapping::standard();
        let mut seen: Vec<u16> = mapping.0.values().flatten().copied().collect();
        seen.sort_unstable();
        let expected: Vec<u16> = (1..=QUESTION_COUNT as u16).collect();
        assert_eq!(seen, expected);
        assert_eq!(mapping.questions(Trait::Introverted), &[2, 38, 74]);
    }

    #[test]
    fn traits_resolve_to_their_triad() {
        assert_eq!(Trait::Lawful.triad(), Triad::Order);
        assert_eq!(Trait::Lawful.domain(), Domain::Processing);
        assert_eq!(Trait::Guarded.domain(), Domain::Interpersonal);
    }
}
