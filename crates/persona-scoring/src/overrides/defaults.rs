use std::collections::BTreeMap;

use super::{DimensionWeights, FrameworkWeights, MbtiDimension};
use crate::scoring::traits::Trait::{self, *};

fn framework(entries: &[(&str, &[(Trait, f64)])]) -> FrameworkWeights {
    FrameworkWeights(
        entries
            .iter()
            .map(|(key, traits)| (key.to_string(), DimensionWeights::new(traits)))
            .collect(),
    )
}

pub(super) fn mbti() -> BTreeMap<MbtiDimension, DimensionWeights> {
    let with_threshold = |traits: &[(Trait, f64)]| DimensionWeights {
        threshold: Some(5.0),
        ..DimensionWeights::new(traits)
    };

    BTreeMap::from([
        (
            MbtiDimension::EI,
            with_threshold(&[(Extroverted, 0.4), (Introverted, 0.4), (Assertive, 0.2)]),
        ),
        (
            MbtiDimension::SN,
            with_threshold(&[(Sensing, 0.4), (Intuitive, 0.4), (Practical, 0.2)]),
        ),
        (
            MbtiDimension::TF,
            with_threshold(&[(Analytical, 0.4), (Empathetic, 0.4), (Principled, 0.2)]),
        ),
        (
            MbtiDimension::JP,
            with_threshold(&[
                (Structured, 0.3),
                (Methodical, 0.3),
                (Spontaneous, 0.2),
                (Flexible, 0.2),
            ]),
        ),
    ])
}

pub(super) fn big_five() -> FrameworkWeights {
    framework(&[
        ("openness", &[(Curious, 0.5), (Intuitive, 0.3), (Flexible, 0.2)]),
        (
            "conscientiousness",
            &[(Methodical, 0.4), (Structured, 0.3), (Lawful, 0.3)],
        ),
        (
            "extraversion",
            &[(Extroverted, 0.5), (Assertive, 0.3), (Ambivert, 0.2)],
        ),
        (
            "agreeableness",
            &[(Empathetic, 0.4), (Altruistic, 0.3), (Trusting, 0.3)],
        ),
        ("neuroticism", &[(Reactive, 0.5), (Guarded, 0.3), (Security, 0.2)]),
    ])
}

pub(super) fn enneagram() -> FrameworkWeights {
    framework(&[
        ("1", &[(Principled, 0.4), (Lawful, 0.3), (Methodical, 0.3)]),
        ("2", &[(Altruistic, 0.4), (Empathetic, 0.4), (Trusting, 0.2)]),
        ("3", &[(Achievement, 0.5), (Assertive, 0.3), (Strategic, 0.2)]),
        ("4", &[(Meaning, 0.4), (Reactive, 0.3), (Introverted, 0.3)]),
        ("5", &[(Analytical, 0.4), (Curious, 0.3), (Guarded, 0.3)]),
        ("6", &[(Security, 0.4), (Selective, 0.3), (Traditional, 0.3)]),
        ("7", &[(Spontaneous, 0.4), (Extroverted, 0.3), (Flexible, 0.3)]),
        ("8", &[(Assertive, 0.4), (Independent, 0.3), (SelfInterested, 0.3)]),
        ("9", &[(Calm, 0.4), (Receptive, 0.3), (Balanced, 0.3)]),
    ])
}

pub(super) fn holland() -> FrameworkWeights {
    framework(&[
        ("R", &[(Practical, 0.5), (Sensing, 0.3), (Independent, 0.2)]),
        ("I", &[(Analytical, 0.4), (Curious, 0.4), (Introverted, 0.2)]),
        ("A", &[(Intuitive, 0.4), (Meaning, 0.3), (Chaotic, 0.3)]),
        ("S", &[(Empathetic, 0.4), (Altruistic, 0.3), (Extroverted, 0.3)]),
        ("E", &[(Assertive, 0.4), (Achievement, 0.4), (Strategic, 0.2)]),
        ("C", &[(Structured, 0.4), (Methodical, 0.3), (Traditional, 0.3)]),
    ])
}

pub(super) fn alignment() -> FrameworkWeights {
    framework(&[
        ("lawful", &[(Lawful, 0.6), (Structured, 0.4)]),
        ("order_neutral", &[(Balanced, 0.6), (Adaptive, 0.4)]),
        ("chaotic", &[(Chaotic, 0.6), (Spontaneous, 0.4)]),
        ("good", &[(Altruistic, 0.5), (Empathetic, 0.5)]),
        ("moral_neutral", &[(Fair, 0.6), (Calm, 0.4)]),
        ("evil", &[(SelfInterested, 0.6), (Guarded, 0.4)]),
    ])
}

pub(super) fn socionics() -> FrameworkWeights {
    framework(&[
        ("Ne", &[(Intuitive, 0.5), (Extroverted, 0.3), (Curious, 0.2)]),
        ("Ni", &[(Intuitive, 0.5), (Introverted, 0.3), (Strategic, 0.2)]),
        ("Se", &[(Sensing, 0.4), (Assertive, 0.4), (Extroverted, 0.2)]),
        ("Si", &[(Sensing, 0.5), (Calm, 0.3), (Introverted, 0.2)]),
        ("Te", &[(Analytical, 0.4), (Achievement, 0.3), (Methodical, 0.3)]),
        ("Ti", &[(Analytical, 0.5), (Principled, 0.3), (Introverted, 0.2)]),
        ("Fe", &[(Empathetic, 0.4), (Extroverted, 0.4), (Trusting, 0.2)]),
        ("Fi", &[(Empathetic, 0.4), (Meaning, 0.4), (Selective, 0.2)]),
    ])
}

pub(super) fn attachment() -> FrameworkWeights {
    framework(&[
        ("secure", &[(Trusting, 0.4), (Calm, 0.3), (Adaptive, 0.3)]),
        ("anxious", &[(Reactive, 0.5), (Security, 0.3), (Receptive, 0.2)]),
        ("avoidant", &[(Guarded, 0.4), (Independent, 0.4), (Introverted, 0.2)]),
        ("disorganized", &[(Chaotic, 0.4), (Reactive, 0.3), (Guarded, 0.3)]),
    ])
}

pub(super) fn integral() -> FrameworkWeights {
    framework(&[
        ("red", &[(Assertive, 0.4), (SelfInterested, 0.3), (Spontaneous, 0.3)]),
        ("amber", &[(Lawful, 0.4), (Traditional, 0.4), (Security, 0.2)]),
        ("orange", &[(Achievement, 0.4), (Strategic, 0.3), (Analytical, 0.3)]),
        ("green", &[(Empathetic, 0.4), (Altruistic, 0.3), (Fair, 0.3)]),
        ("teal", &[(Adaptive, 0.4), (Synthesizing, 0.3), (Curious, 0.3)]),
        ("turquoise", &[(Meaning, 0.4), (Intuitive, 0.3), (Balanced, 0.3)]),
    ])
}
