use crate::libquiz::error::{Error, Result};
use crate::libquiz::lint::lint;
use crate::libquiz::record::{QuizKind, QuizRecord};
use log::{debug, warn};
use std::collections::HashMap;

/// Handle describing a quiz that was accepted by [`Registry::define`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredQuiz {
    pub name: String,
    pub variant_count: usize,
    pub kind: QuizKind,
}

/// Every quiz known to the process, indexed by name.
///
/// Filled once during startup through `&mut self`; renderers only ever get
/// a shared reference. Iteration follows registration order.
#[derive(Debug, Default)]
pub struct Registry {
    quizzes: Vec<QuizRecord>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and adds one quiz. A second quiz with a taken name is
    /// rejected and the first one stays.
    pub fn define(&mut self, record: QuizRecord) -> Result<RegisteredQuiz> {
        if let Err(violation) = record.validate() {
            warn!("[Registry] Rejected quiz '{}': {}", record.name, violation);
            return Err(Error::SchemaViolation {
                name: record.name,
                violation,
            });
        }
        if self.by_name.contains_key(&record.name) {
            warn!("[Registry] Quiz '{}' is defined twice", record.name);
            return Err(Error::DuplicateName(record.name));
        }
        for found in lint(&record) {
            warn!("[Registry] Quiz '{}': {}", record.name, found);
        }

        let registered = RegisteredQuiz {
            name: record.name.clone(),
            variant_count: record.variants.len(),
            kind: record.kind(),
        };
        debug!(
            "[Registry] Registered '{}' ({} variants, {:?})",
            registered.name, registered.variant_count, registered.kind
        );
        self.by_name.insert(record.name.clone(), self.quizzes.len());
        self.quizzes.push(record);
        Ok(registered)
    }

    /// Registers every record it can; the returned errors belong to the
    /// records that were left out.
    pub fn define_all<I>(&mut self, records: I) -> Vec<Error>
    where
        I: IntoIterator<Item = QuizRecord>,
    {
        let errors: Vec<Error> = records
            .into_iter()
            .filter_map(|record| self.define(record).err())
            .collect();
        debug!(
            "[Registry] {} quizzes registered, {} rejected",
            self.quizzes.len(),
            errors.len()
        );
        errors
    }

    pub fn lookup(&self, name: &str) -> Result<&QuizRecord> {
        self.by_name
            .get(name)
            .map(|&index| &self.quizzes[index])
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.quizzes.iter().map(|quiz| quiz.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuizRecord> {
        self.quizzes.iter()
    }
}
