//! Shapes of the `options` value per question type.
//!
//! * multiple choice: `{"A": "text", "B": "text", ...}` with at least two letters
//! * true/false: always `["True", "False"]`
//! * matching: `{"left": [...], "right": [...]}`, same non-zero length
//! * descriptive and fill-in-the-blank carry no options

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::db::types::QuestionType;

pub(crate) const TRUE_FALSE_CHOICES: [&str; 2] = ["True", "False"];
const MIN_CHOICES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QuestionOptions {
    Choices(BTreeMap<char, String>),
    TrueFalse,
    Matching { left: Vec<String>, right: Vec<String> },
}

impl QuestionOptions {
    pub(crate) fn to_json(&self) -> Value {
        match self {
            Self::Choices(choices) => {
                let map = choices
                    .iter()
                    .map(|(letter, text)| (letter.to_string(), Value::String(text.clone())))
                    .collect::<Map<_, _>>();
                Value::Object(map)
            }
            Self::TrueFalse => json!(TRUE_FALSE_CHOICES),
            Self::Matching { left, right } => json!({ "left": left, "right": right }),
        }
    }
}

/// Validates raw `options` against the question type and normalizes it.
///
/// Returns `Ok(None)` for types that take no options.
pub(crate) fn parse(
    question_type: QuestionType,
    raw: Option<&Value>,
) -> Result<Option<QuestionOptions>, String> {
    let raw = raw.filter(|value| !value.is_null());

    match question_type {
        QuestionType::MultipleChoice => parse_choices(raw).map(Some),
        QuestionType::TrueFalse => parse_true_false(raw).map(Some),
        QuestionType::Matching => parse_matching(raw).map(Some),
        QuestionType::Descriptive | QuestionType::FillInBlank => match raw {
            None => Ok(None),
            Some(Value::Array(items)) if items.is_empty() => Ok(None),
            Some(Value::Object(map)) if map.is_empty() => Ok(None),
            Some(_) => Err(format!("{} questions do not take options.", question_type.label())),
        },
    }
}

fn parse_choices(raw: Option<&Value>) -> Result<QuestionOptions, String> {
    let Some(Value::Object(map)) = raw else {
        return Err("Multiple choice options must map letters to answer text.".to_string());
    };

    let mut choices = BTreeMap::new();
    for (key, value) in map {
        let letter = choice_letter(key)
            .ok_or_else(|| format!("Option key '{key}' must be a single letter A-Z."))?;
        let text = value
            .as_str()
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| format!("Option {letter} must have non-empty text."))?;
        choices.insert(letter, text.to_string());
    }

    if choices.len() < MIN_CHOICES {
        return Err(format!("Multiple choice questions need at least {MIN_CHOICES} options."));
    }

    Ok(QuestionOptions::Choices(choices))
}

fn choice_letter(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_uppercase() => Some(letter),
        _ => None,
    }
}

fn parse_true_false(raw: Option<&Value>) -> Result<QuestionOptions, String> {
    match raw {
        None => Ok(QuestionOptions::TrueFalse),
        Some(Value::Array(items))
            if items.len() == TRUE_FALSE_CHOICES.len()
                && items.iter().zip(TRUE_FALSE_CHOICES).all(|(item, expected)| item == expected) =>
        {
            Ok(QuestionOptions::TrueFalse)
        }
        Some(_) => Err("True/False options must be [\"True\", \"False\"].".to_string()),
    }
}

fn parse_matching(raw: Option<&Value>) -> Result<QuestionOptions, String> {
    let Some(Value::Object(map)) = raw else {
        return Err("Matching options must contain 'left' and 'right' lists.".to_string());
    };

    let left = string_list(map.get("left"), "left")?;
    let right = string_list(map.get("right"), "right")?;

    if left.len() != right.len() {
        return Err("Matching 'left' and 'right' lists must have the same length.".to_string());
    }

    Ok(QuestionOptions::Matching { left, right })
}

fn string_list(value: Option<&Value>, side: &str) -> Result<Vec<String>, String> {
    let items = value
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| format!("Matching '{side}' must be a non-empty list."))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
                .ok_or_else(|| format!("Matching '{side}' entries must be non-empty text."))
        })
        .collect()
}

/// Checks a present `correct_answer` against the normalized options.
pub(crate) fn check_correct_answer(
    question_type: QuestionType,
    options: Option<&QuestionOptions>,
    answer: &str,
) -> Result<(), String> {
    match (question_type, options) {
        (QuestionType::MultipleChoice, Some(QuestionOptions::Choices(choices))) => {
            let known = choice_letter(answer).is_some_and(|letter| choices.contains_key(&letter));
            if known {
                Ok(())
            } else {
                let letters = choices.keys().map(char::to_string).collect::<Vec<_>>().join(", ");
                Err(format!("The correct answer must be one of: {letters}."))
            }
        }
        (QuestionType::TrueFalse, _) => {
            if TRUE_FALSE_CHOICES.contains(&answer) {
                Ok(())
            } else {
                Err("The correct answer must be True or False.".to_string())
            }
        }
        _ => Ok(()),
    }
}
