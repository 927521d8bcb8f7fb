use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{project, rank};
use crate::overrides::ScoringOverrides;
use crate::scoring::aggregate::{DomainScores, TraitScores};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnneagramCenter {
    Gut,
    Heart,
    Head,
}

impl EnneagramCenter {
    pub const ALL: [EnneagramCenter; 3] = [
        EnneagramCenter::Gut,
        EnneagramCenter::Heart,
        EnneagramCenter::Head,
    ];

    pub fn types(self) -> [u8; 3] {
        match self {
            EnneagramCenter::Gut => [8, 9, 1],
            EnneagramCenter::Heart => [2, 3, 4],
            EnneagramCenter::Head => [5, 6, 7],
        }
    }

    pub fn of(enneagram_type: u8) -> Self {
        Self::ALL
            .into_iter()
            .find(|center| center.types().contains(&enneagram_type))
            .unwrap_or(EnneagramCenter::Gut)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnneagramResult {
    #[serde(rename = "type")]
    pub primary: u8,
    pub wing: u8,
    /// Primary type first, then the best type of each remaining center.
    pub tritype: [u8; 3],
    pub type_scores: BTreeMap<u8, f64>,
    pub degraded: bool,
}

impl EnneagramResult {
    /// Conventional notation, e.g. `"4w5"`.
    pub fn label(&self) -> String {
        format!("{}w{}", self.primary, self.wing)
    }

    pub fn tritype_label(&self) -> String {
        self.tritype.iter().map(u8::to_string).collect()
    }
}

fn neighbours(enneagram_type: u8) -> (u8, u8) {
    let below = if enneagram_type == 1 { 9 } else { enneagram_type - 1 };
    let above = if enneagram_type == 9 { 1 } else { enneagram_type + 1 };
    (below, above)
}

pub fn classify_enneagram(
    traits: &TraitScores,
    _domains: &DomainScores,
    overrides: &ScoringOverrides,
) -> EnneagramResult {
    let mut degraded = false;
    let type_scores: BTreeMap<u8, f64> = (1..=9u8)
        .map(|enneagram_type| {
            let projected = project(overrides.enneagram.get(&enneagram_type.to_string()), traits);
            degraded |= projected.degraded;
            (enneagram_type, projected.value)
        })
        .collect();
    let score = |enneagram_type: u8| type_scores.get(&enneagram_type).copied().unwrap_or(0.0);

    let mut ranked: Vec<(u8, f64)> = type_scores.iter().map(|(t, s)| (*t, *s)).collect();
    rank(&mut ranked);
    let primary = ranked[0].0;

    let (below, above) = neighbours(primary);
    let mut wings = [(below, score(below)), (above, score(above))];
    rank(&mut wings);
    let wing = wings[0].0;

    let primary_center = EnneagramCenter::of(primary);
    let mut others: Vec<(u8, f64)> = EnneagramCenter::ALL
        .into_iter()
        .filter(|center| *center != primary_center)
        .map(|center| {
            let mut members: Vec<(u8, f64)> =
                center.types().into_iter().map(|t| (t, score(t))).collect();
            rank(&mut members);
            members[0]
        })
        .collect();
    rank(&mut others);

    EnneagramResult {
        primary,
        wing,
        tritype: [primary, others[0].0, others[1].0],
        type_scores,
        degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::classifiers::fixtures;
    use crate::scoring::traits::Trait::*;

    fn classify(traits: &TraitScores) -> EnneagramResult {
        classify_enneagram(traits, &fixtures::domains(traits), &ScoringOverrides::default())
    }

    #[test]
    fn strongest_type_wins_with_adjacent_wing() {
        let traits = fixtures::with(&[
            (Meaning, 10.0),
            (Reactive, 9.0),
            (Introverted, 9.0),
            (Analytical, 8.0),
            (Curious, 8.0),
            (Guarded, 8.0),
            (Empathetic, 6.0),
        ]);
        let result = classify(&traits);
        assert_eq!(result.primary, 4);
        assert_eq!(result.wing, 5);
        assert_eq!(result.label(), "4w5");
        assert_eq!(result.tritype[0], 4);
        assert_eq!(result.tritype[1], 5);
    }

    #[test]
    fn wing_wraps_around_the_circle() {
        let traits = fixtures::with(&[
            (Calm, 10.0),
            (Receptive, 10.0),
            (Balanced, 10.0),
            (Principled, 8.0),
            (Lawful, 8.0),
            (Methodical, 8.0),
        ]);
        let result = classify(&traits);
        assert_eq!(result.primary, 9);
        assert_eq!(result.wing, 1);
        assert_eq!(EnneagramCenter::of(result.primary), EnneagramCenter::Gut);
    }

    #[test]
    fn uniform_scores_tie_to_lowest_numbers() {
        let result = classify(&fixtures::uniform(6.0));
        assert_eq!(result.primary, 1);
        assert_eq!(result.wing, 2);
        assert_eq!(result.tritype_label(), "125");
        assert!(!result.degraded);
    }

    #[test]
    fn serializes_primary_as_type() {
        let result = classify(&fixtures::uniform(6.0));
        let json = serde_json::to_value(&result).expect("serializes");
        assert_eq!(json["type"], 1);
    }
}
