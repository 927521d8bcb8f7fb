use clap::Args;
use persona_scoring::error::AppError;
use persona_scoring::overrides::{
    auto_fix_overrides, validate_complete_overrides, OverridesError, ValidationOptions,
};
use persona_scoring::scoring::{ClarificationExchange, IntegralAnswer, IntegralSource};
use persona_scoring::{PersonalityProfile, ScoringEngine, ScoringOverrides};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding the 108 responses as an array
    #[arg(long)]
    pub(crate) responses: PathBuf,
    /// Overrides document to score against instead of the built-in weights
    #[arg(long)]
    pub(crate) overrides: Option<PathBuf>,
    /// JSON file of integral questionnaire answers
    #[arg(long)]
    pub(crate) integral_answers: Option<PathBuf>,
    /// JSON file with the clarification transcript and the advisor's reply
    #[arg(long, requires = "integral_answers")]
    pub(crate) clarification: Option<PathBuf>,
    /// Estimate the integral level from trait scores when no answers are given
    #[arg(long)]
    pub(crate) estimate_integral: bool,
}

#[derive(Args, Debug)]
pub(crate) struct OverridesValidateArgs {
    /// Overrides document to check
    #[arg(long)]
    pub(crate) path: PathBuf,
    /// Tolerated deviation of a weight sum from 1.0
    #[arg(long)]
    pub(crate) max_deviation: Option<f64>,
    /// Print a normalized copy of the document after the report
    #[arg(long)]
    pub(crate) fix: bool,
}

fn read(path: &Path) -> Result<String, OverridesError> {
    std::fs::read_to_string(path).map_err(|source| OverridesError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json(path: &Path) -> Result<Value, OverridesError> {
    serde_json::from_str(&read(path)?).map_err(OverridesError::Parse)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(|err| AppError::Io(err.into()))?;
    println!("{rendered}");
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    print_json(&score_profile(&args)?)
}

fn score_profile(args: &ScoreArgs) -> Result<PersonalityProfile, AppError> {
    let overrides = match args.overrides.as_deref() {
        Some(path) => ScoringOverrides::load_validated(path)?.0,
        None => ScoringOverrides::default(),
    };
    let responses = read_json(&args.responses)?;
    let answers: Vec<IntegralAnswer> = match args.integral_answers.as_deref() {
        Some(path) => serde_json::from_value(read_json(path)?).map_err(OverridesError::Parse)?,
        None => Vec::new(),
    };
    let clarification: Option<ClarificationExchange> = match args.clarification.as_deref() {
        Some(path) => {
            Some(serde_json::from_value(read_json(path)?).map_err(OverridesError::Parse)?)
        }
        None => None,
    };

    let source = if !answers.is_empty() {
        IntegralSource::Answers {
            answers: &answers,
            clarification: clarification.as_ref(),
        }
    } else if args.estimate_integral {
        IntegralSource::Traits
    } else {
        IntegralSource::Skip
    };

    Ok(ScoringEngine::new(overrides).score_json(&responses, source)?)
}

/// Prints the report; exits non-zero when the document would be rejected at load time.
pub(crate) fn run_overrides_validate(args: OverridesValidateArgs) -> Result<(), AppError> {
    let overrides = ScoringOverrides::from_json(&read(&args.path)?)?;
    let mut options = ValidationOptions::default();
    if let Some(max_deviation) = args.max_deviation {
        options.max_total_deviation = max_deviation;
    }

    let report = validate_complete_overrides(&overrides, &options);
    print_json(&report)?;

    if args.fix {
        let fixed = auto_fix_overrides(&overrides);
        print_json(&fixed)?;
        return Ok(());
    }

    if report.is_valid {
        Ok(())
    } else {
        Err(OverridesError::Rejected(report.errors).into())
    }
}
