use serde::Serialize;
use serde_json::Value;

use super::traits::QUESTION_COUNT;

pub const MIN_RESPONSE: f64 = 1.0;
pub const MAX_RESPONSE: f64 = 10.0;

/// Questionnaire answers that passed shape and range checks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedResponses(Vec<f64>);

impl ValidatedResponses {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Response for a 1-based question index.
    pub fn get(&self, question: u16) -> Option<f64> {
        let index = usize::from(question).checked_sub(1)?;
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResponseValidationError {
    #[error("responses must be an array")]
    NotArray,
    #[error("expected {expected} responses, received {actual}")]
    WrongLength { expected: usize, actual: usize },
    /// `question` is 1-based, matching the questionnaire numbering.
    #[error("question {question} has value {value}, expected a number between 1 and 10")]
    OutOfRange { question: usize, value: String },
}

/// Validates a raw JSON payload, coercing numeric strings the same way a form field would.
pub fn validate_json(raw: &Value) -> Result<ValidatedResponses, ResponseValidationError> {
    let items = raw.as_array().ok_or(ResponseValidationError::NotArray)?;
    check_length(items.len())?;

    let values = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            coerce(item)
                .filter(|value| in_range(*value))
                .ok_or_else(|| ResponseValidationError::OutOfRange {
                    question: index + 1,
                    value: render(item),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ValidatedResponses(values))
}

/// Validates already-numeric responses.
pub fn validate(responses: &[f64]) -> Result<ValidatedResponses, ResponseValidationError> {
    check_length(responses.len())?;
    if let Some((index, value)) = responses
        .iter()
        .enumerate()
        .find(|(_, value)| !in_range(**value))
    {
        return Err(ResponseValidationError::OutOfRange {
            question: index + 1,
            value: value.to_string(),
        });
    }
    Ok(ValidatedResponses(responses.to_vec()))
}

fn check_length(actual: usize) -> Result<(), ResponseValidationError> {
    if actual == QUESTION_COUNT {
        Ok(())
    } else {
        Err(ResponseValidationError::WrongLength {
            expected: QUESTION_COUNT,
            actual,
        })
    }
}

fn in_range(value: f64) -> bool {
    !value.is_nan() && (MIN_RESPONSE..=MAX_RESPONSE).contains(&value)
}

fn coerce(item: &Value) -> Option<f64> {
    match item {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn render(item: &Value) -> String {
    match item {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn uniform(value: f64) -> Vec<f64> {
        vec![value; QUESTION_COUNT]
    }

    #[test]
    fn rejects_non_array_payloads() {
        let err = validate_json(&json!({"q1": 5})).expect_err("object rejected");
        assert_eq!(err, ResponseValidationError::NotArray);
    }

    #[test]
    fn rejects_every_wrong_length() {
        for length in [0, 1, 107, 109, 145] {
            let err = validate(&vec![5.0; length]).expect_err("length rejected");
            assert_eq!(
                err,
                ResponseValidationError::WrongLength {
                    expected: 108,
                    actual: length
                }
            );
        }
    }

    #[test]
    fn accepts_in_range_values_unchanged() {
        let mut responses = uniform(1.0);
        for (index, value) in responses.iter_mut().enumerate() {
            *value = (index % 10 + 1) as f64;
        }
        let validated = validate(&responses).expect("valid responses");
        assert_eq!(validated.values(), responses.as_slice());
        assert_eq!(validated.get(1), Some(1.0));
        assert_eq!(validated.get(108), Some(8.0));
        assert_eq!(validated.get(0), None);
    }

    #[test]
    fn reports_first_out_of_range_question() {
        let mut responses = uniform(5.0);
        responses[41] = 11.0;
        responses[90] = 0.0;
        let err = validate(&responses).expect_err("range rejected");
        assert_eq!(
            err,
            ResponseValidationError::OutOfRange {
                question: 42,
                value: "11".to_string()
            }
        );
        assert_eq!(
            err.to_string(),
            "question 42 has value 11, expected a number between 1 and 10"
        );
    }

    #[test]
    fn rejects_nan() {
        let mut responses = uniform(5.0);
        responses[0] = f64::NAN;
        assert!(matches!(
            validate(&responses),
            Err(ResponseValidationError::OutOfRange { question: 1, .. })
        ));
    }

    #[test]
    fn coerces_numeric_strings_but_not_garbage() {
        let mut items: Vec<Value> = (0..QUESTION_COUNT).map(|_| json!(4)).collect();
        items[3] = json!(" 7 ");
        let validated = validate_json(&Value::Array(items.clone())).expect("strings coerce");
        assert_eq!(validated.get(4), Some(7.0));

        items[5] = json!("seven");
        let err = validate_json(&Value::Array(items)).expect_err("garbage rejected");
        assert_eq!(
            err,
            ResponseValidationError::OutOfRange {
                question: 6,
                value: "seven".to_string()
            }
        );
    }
}
