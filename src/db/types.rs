use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "questiontype", rename_all = "snake_case")]
pub(crate) enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Descriptive,
    Matching,
    FillInBlank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "questionsource", rename_all = "snake_case")]
pub(crate) enum QuestionSource {
    Textbook,
    SampleExam,
    PracticeSheet,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "difficultylevel", rename_all = "lowercase")]
pub(crate) enum DifficultyLevel {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UnknownVariant(pub(crate) String);

impl QuestionType {
    pub(crate) const ALL: [Self; 5] = [
        Self::MultipleChoice,
        Self::TrueFalse,
        Self::Descriptive,
        Self::Matching,
        Self::FillInBlank,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::TrueFalse => "true_false",
            Self::Descriptive => "descriptive",
            Self::Matching => "matching",
            Self::FillInBlank => "fill_in_blank",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::MultipleChoice => "Multiple Choice",
            Self::TrueFalse => "True/False",
            Self::Descriptive => "Descriptive",
            Self::Matching => "Matching",
            Self::FillInBlank => "Fill in the Blank",
        }
    }
}

impl QuestionSource {
    pub(crate) const ALL: [Self; 4] =
        [Self::Textbook, Self::SampleExam, Self::PracticeSheet, Self::Custom];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Textbook => "textbook",
            Self::SampleExam => "sample_exam",
            Self::PracticeSheet => "practice_sheet",
            Self::Custom => "custom",
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Textbook => "Textbook",
            Self::SampleExam => "Sample Exam",
            Self::PracticeSheet => "Practice Sheet",
            Self::Custom => "Custom",
        }
    }
}

impl DifficultyLevel {
    pub(crate) const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

macro_rules! impl_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromStr for $ty {
                type Err = UnknownVariant;

                fn from_str(value: &str) -> Result<Self, Self::Err> {
                    Self::ALL
                        .into_iter()
                        .find(|variant| variant.as_str() == value)
                        .ok_or_else(|| UnknownVariant(value.to_string()))
                }
            }
        )*
    };
}

impl_from_str!(QuestionType, QuestionSource, DifficultyLevel);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_from_str() {
        for kind in QuestionType::ALL {
            assert_eq!(kind.as_str().parse::<QuestionType>(), Ok(kind));
        }
        for source in QuestionSource::ALL {
            assert_eq!(source.as_str().parse::<QuestionSource>(), Ok(source));
        }
        for level in DifficultyLevel::ALL {
            assert_eq!(level.as_str().parse::<DifficultyLevel>(), Ok(level));
        }
    }

    #[test]
    fn parsing_is_exact() {
        assert!("Easy".parse::<DifficultyLevel>().is_err());
        assert!("multiple-choice".parse::<QuestionType>().is_err());
        assert_eq!(
            "quiz".parse::<QuestionSource>(),
            Err(UnknownVariant("quiz".to_string()))
        );
    }

    #[test]
    fn serde_codes_match_as_str() {
        let json = serde_json::to_value(QuestionType::FillInBlank).unwrap();
        assert_eq!(json, "fill_in_blank");
        let json = serde_json::to_value(QuestionSource::PracticeSheet).unwrap();
        assert_eq!(json, "practice_sheet");
    }
}
