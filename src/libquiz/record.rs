use crate::libquiz::content::Content;
use crate::libquiz::error::Violation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub text: Content,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizMeta {
    #[serde(rename = "correctAnswers")]
    pub correct_answers: BTreeSet<usize>,
}

/// A named quiz as authored inside a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub name: String,
    pub question: Content,
    pub variants: Vec<VariantRecord>,
    #[serde(default)]
    pub meta: QuizMeta,
}

/// Whether a renderer should offer one choice or several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKind {
    Single,
    Multiple,
}

impl VariantRecord {
    pub fn new(text: impl Into<Content>) -> Self {
        Self {
            text: text.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<Content>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl QuizRecord {
    pub fn new(
        name: impl Into<String>,
        question: impl Into<Content>,
        variants: Vec<VariantRecord>,
        correct_answers: impl IntoIterator<Item = usize>,
    ) -> Self {
        Self {
            name: name.into(),
            question: question.into(),
            variants,
            meta: QuizMeta {
                correct_answers: correct_answers.into_iter().collect(),
            },
        }
    }

    pub fn correct_answers(&self) -> &BTreeSet<usize> {
        &self.meta.correct_answers
    }

    pub fn kind(&self) -> QuizKind {
        if self.meta.correct_answers.len() == 1 {
            QuizKind::Single
        } else {
            QuizKind::Multiple
        }
    }

    /// Checks the structural invariants, reporting the first one broken.
    pub fn validate(&self) -> Result<(), Violation> {
        if self.name.trim().is_empty() {
            return Err(Violation::MissingName);
        }
        if self.variants.is_empty() {
            return Err(Violation::NoVariants);
        }
        // BTreeSet iterates ascending, so the last index is the largest
        if let Some(&index) = self.meta.correct_answers.iter().next_back() {
            if index >= self.variants.len() {
                return Err(Violation::CorrectAnswerOutOfRange {
                    index,
                    variants: self.variants.len(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> Vec<VariantRecord> {
        vec![
            VariantRecord::new("1 класс"),
            VariantRecord::new("2 класса"),
            VariantRecord::new("3 класса"),
        ]
    }

    #[test]
    fn parses_authored_json() {
        let json = r#"{
            "name": "srp-patterns-3",
            "question": "How many classes should the report be split into?",
            "variants": [
                {"text": "1 класс"},
                {"text": "2 класса"},
                {"text": "3 класса", "description": "Formatting, storage and printing."}
            ],
            "meta": {"correctAnswers": [2, 2]}
        }"#;
        let record: QuizRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.name, "srp-patterns-3");
        assert_eq!(record.variants.len(), 3);
        assert!(record.variants[0].description.is_none());
        assert!(record.variants[2].description.is_some());
        assert_eq!(record.correct_answers(), &BTreeSet::from([2]));
        assert_eq!(record.kind(), QuizKind::Single);
    }

    #[test]
    fn negative_correct_answer_is_rejected_by_the_parser() {
        let json = r#"{"name": "q", "question": "?", "variants": [{"text": "a"}],
            "meta": {"correctAnswers": [-1]}}"#;
        assert!(serde_json::from_str::<QuizRecord>(json).is_err());
    }

    #[test]
    fn validate_accepts_well_formed_record() {
        let record = QuizRecord::new("srp-patterns-3", "?", classes(), [2]);
        assert_eq!(record.validate(), Ok(()));
    }

    #[test]
    fn validate_reports_blank_name() {
        let record = QuizRecord::new("   ", "?", classes(), [2]);
        assert_eq!(record.validate(), Err(Violation::MissingName));
    }

    #[test]
    fn validate_reports_missing_variants() {
        let record = QuizRecord::new("empty", "?", vec![], Vec::<usize>::new());
        assert_eq!(record.validate(), Err(Violation::NoVariants));
    }

    #[test]
    fn validate_reports_out_of_range_answer() {
        let record = QuizRecord::new("oob", "?", classes(), [0, 3]);
        assert_eq!(
            record.validate(),
            Err(Violation::CorrectAnswerOutOfRange {
                index: 3,
                variants: 3
            })
        );
    }

    #[test]
    fn empty_correct_answers_is_structurally_valid() {
        let record = QuizRecord::new("trick", "?", classes(), Vec::<usize>::new());
        assert_eq!(record.validate(), Ok(()));
        assert_eq!(record.kind(), QuizKind::Multiple);
    }
}
