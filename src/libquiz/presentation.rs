use crate::libquiz::record::{QuizRecord, VariantRecord};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// The order in which a renderer shows a quiz's variants.
///
/// Displayed positions are translated back to record indices before
/// evaluation, so shuffling never changes what counts as correct.
#[derive(Debug, Clone)]
pub struct Presentation<'a> {
    record: &'a QuizRecord,
    order: Vec<usize>,
}

impl<'a> Presentation<'a> {
    pub fn in_order(record: &'a QuizRecord) -> Self {
        Self {
            record,
            order: (0..record.variants.len()).collect(),
        }
    }

    pub fn shuffled<R: Rng + ?Sized>(record: &'a QuizRecord, rng: &mut R) -> Self {
        let mut presentation = Self::in_order(record);
        presentation.order.shuffle(rng);
        presentation
    }

    pub fn record(&self) -> &'a QuizRecord {
        self.record
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Variants in display order, paired with their displayed position.
    pub fn variants(&self) -> impl Iterator<Item = (usize, &'a VariantRecord)> + '_ {
        self.order
            .iter()
            .enumerate()
            .map(move |(shown, &index)| (shown, &self.record.variants[index]))
    }

    pub fn record_index(&self, displayed: usize) -> Option<usize> {
        self.order.get(displayed).copied()
    }

    pub fn displayed_position(&self, record_index: usize) -> Option<usize> {
        self.order.iter().position(|&index| index == record_index)
    }

    /// Translates a whole selection; `None` if any position is off the list.
    pub fn to_record_indices<I>(&self, displayed: I) -> Option<BTreeSet<usize>>
    where
        I: IntoIterator<Item = usize>,
    {
        displayed
            .into_iter()
            .map(|shown| self.record_index(shown))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libquiz::evaluation::evaluate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record() -> QuizRecord {
        QuizRecord::new(
            "srp-patterns-3",
            "How many classes?",
            vec![
                VariantRecord::new("1 класс"),
                VariantRecord::new("2 класса"),
                VariantRecord::new("3 класса"),
                VariantRecord::new("4 класса"),
            ],
            [2],
        )
    }

    #[test]
    fn in_order_is_identity() {
        let record = record();
        let presentation = Presentation::in_order(&record);
        for shown in 0..record.variants.len() {
            assert_eq!(presentation.record_index(shown), Some(shown));
        }
        assert_eq!(presentation.record_index(4), None);
    }

    #[test]
    fn shuffled_order_is_a_permutation() {
        let record = record();
        let mut rng = StdRng::seed_from_u64(7);
        let presentation = Presentation::shuffled(&record, &mut rng);

        let indices: BTreeSet<usize> = (0..presentation.len())
            .filter_map(|shown| presentation.record_index(shown))
            .collect();
        assert_eq!(indices, BTreeSet::from([0, 1, 2, 3]));
        for (shown, variant) in presentation.variants() {
            let index = presentation.record_index(shown).unwrap();
            assert_eq!(variant, &record.variants[index]);
            assert_eq!(presentation.displayed_position(index), Some(shown));
        }
    }

    #[test]
    fn shuffled_selection_evaluates_against_record_indices() {
        let record = record();
        let mut rng = StdRng::seed_from_u64(42);
        let presentation = Presentation::shuffled(&record, &mut rng);

        let shown = presentation.displayed_position(2).unwrap();
        let selection = presentation.to_record_indices([shown]).unwrap();
        assert!(evaluate(&record, selection).is_correct());
    }

    #[test]
    fn out_of_range_position_fails_the_whole_selection() {
        let record = record();
        let presentation = Presentation::in_order(&record);
        assert_eq!(presentation.to_record_indices([0, 9]), None);
    }
}
