use crate::libquiz::record::QuizRecord;
use std::collections::HashMap;
use std::fmt;

/// A content smell that does not make the quiz structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lint {
    NoCorrectAnswer,
    BlankQuestion,
    BlankVariant { index: usize },
    DuplicateVariant { first: usize, second: usize },
}

impl fmt::Display for Lint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lint::NoCorrectAnswer => write!(f, "no variant is marked correct"),
            Lint::BlankQuestion => write!(f, "question has no text"),
            Lint::BlankVariant { index } => write!(f, "variant {} has no text", index + 1),
            Lint::DuplicateVariant { first, second } => write!(
                f,
                "variants {} and {} read the same",
                first + 1,
                second + 1
            ),
        }
    }
}

pub fn lint(record: &QuizRecord) -> Vec<Lint> {
    let mut lints = Vec::new();

    if record.correct_answers().is_empty() {
        lints.push(Lint::NoCorrectAnswer);
    }
    if record.question.is_blank() {
        lints.push(Lint::BlankQuestion);
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    for (index, variant) in record.variants.iter().enumerate() {
        let text = variant.text.plain_text().trim().to_string();
        if text.is_empty() {
            lints.push(Lint::BlankVariant { index });
            continue;
        }
        match seen.get(&text) {
            Some(&first) => lints.push(Lint::DuplicateVariant {
                first,
                second: index,
            }),
            None => {
                seen.insert(text, index);
            }
        }
    }

    lints
}
