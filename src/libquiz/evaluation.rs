use crate::libquiz::record::QuizRecord;
use std::collections::BTreeSet;

/// Outcome of comparing a selection against a quiz's correct answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub correct: bool,
    /// Correct variants the selection left out.
    pub missed: BTreeSet<usize>,
    /// Selected variants that are not correct, out-of-range ones included.
    pub wrong: BTreeSet<usize>,
}

impl Evaluation {
    pub fn is_correct(&self) -> bool {
        self.correct
    }
}

/// Exact set comparison: no partial credit, order and repeats are ignored.
pub fn evaluate<I>(record: &QuizRecord, selected: I) -> Evaluation
where
    I: IntoIterator<Item = usize>,
{
    let selected: BTreeSet<usize> = selected.into_iter().collect();
    let correct_answers = record.correct_answers();

    let missed: BTreeSet<usize> = correct_answers.difference(&selected).copied().collect();
    let wrong: BTreeSet<usize> = selected.difference(correct_answers).copied().collect();

    Evaluation {
        correct: missed.is_empty() && wrong.is_empty(),
        missed,
        wrong,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libquiz::record::VariantRecord;

    fn srp_patterns_3() -> QuizRecord {
        QuizRecord::new(
            "srp-patterns-3",
            "How many classes?",
            vec![
                VariantRecord::new("1 класс"),
                VariantRecord::new("2 класса"),
                VariantRecord::new("3 класса"),
            ],
            [2],
        )
    }

    fn lsp_ideal_1() -> QuizRecord {
        QuizRecord::new(
            "lsp-ideal-1",
            "Which statements hold?",
            (0..4).map(|i| VariantRecord::new(format!("statement {i}"))).collect(),
            [0, 1, 2, 3],
        )
    }

    #[test]
    fn single_answer_quiz() {
        let record = srp_patterns_3();
        assert!(evaluate(&record, [2]).is_correct());
        assert!(!evaluate(&record, [0]).is_correct());
        assert!(!evaluate(&record, [0, 2]).is_correct());
    }

    #[test]
    fn all_correct_quiz_requires_complete_selection() {
        let record = lsp_ideal_1();
        assert!(evaluate(&record, [0, 1, 2, 3]).is_correct());

        let partial = evaluate(&record, [1, 2, 3]);
        assert!(!partial.is_correct());
        assert_eq!(partial.missed, BTreeSet::from([0]));
        assert!(partial.wrong.is_empty());
    }

    #[test]
    fn order_and_duplicates_are_ignored() {
        let record = lsp_ideal_1();
        assert!(evaluate(&record, [3, 0, 2, 1, 3, 0]).is_correct());
    }

    #[test]
    fn reports_wrong_and_missed_variants() {
        let result = evaluate(&srp_patterns_3(), [0, 7]);
        assert!(!result.correct);
        assert_eq!(result.missed, BTreeSet::from([2]));
        assert_eq!(result.wrong, BTreeSet::from([0, 7]));
    }

    #[test]
    fn empty_selection_matches_only_empty_answer_set() {
        assert!(!evaluate(&srp_patterns_3(), Vec::new()).is_correct());

        let mut trick = srp_patterns_3();
        trick.meta.correct_answers.clear();
        assert!(evaluate(&trick, Vec::new()).is_correct());
    }
}
