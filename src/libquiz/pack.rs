use crate::libquiz::error::{Error, Result};
use crate::libquiz::record::QuizRecord;
use crate::libquiz::registry::Registry;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// An article and the quizzes embedded in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub quizzes: Vec<QuizRecord>,
}

/// The JSON authoring format: lessons, each with its quizzes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentPack {
    pub lessons: Vec<Lesson>,
}

impl ContentPack {
    pub fn from_json(json: &str) -> Result<ContentPack> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn read(path: &Path) -> Result<ContentPack> {
        let now = Instant::now();
        let json = std::fs::read_to_string(path)?;
        let pack = Self::from_json(&json)?;
        debug!(
            "[Pack] Read {} lessons from {:?} in {} ms.",
            pack.lessons.len(),
            path,
            now.elapsed().as_millis()
        );
        Ok(pack)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn quiz_count(&self) -> usize {
        self.lessons.iter().map(|lesson| lesson.quizzes.len()).sum()
    }

    pub fn lesson_of(&self, quiz_name: &str) -> Option<&Lesson> {
        self.lessons
            .iter()
            .find(|lesson| lesson.quizzes.iter().any(|quiz| quiz.name == quiz_name))
    }

    /// Registers every quiz of every lesson. Rejected quizzes are returned
    /// alongside the registry rather than aborting the load.
    pub fn into_registry(self) -> (Registry, Vec<Error>) {
        let (registry, _, errors) = self.into_catalog();
        (registry, errors)
    }

    /// Like [`ContentPack::into_registry`], also keeping which lesson listed
    /// which quiz and whether that entry made it into the registry.
    pub fn into_catalog(self) -> (Registry, Vec<LessonIndex>, Vec<Error>) {
        let mut registry = Registry::new();
        let mut errors = Vec::new();
        let mut index = Vec::with_capacity(self.lessons.len());
        for lesson in self.lessons {
            let mut quizzes = Vec::with_capacity(lesson.quizzes.len());
            for record in lesson.quizzes {
                let name = record.name.clone();
                let registered = match registry.define(record) {
                    Ok(_) => true,
                    Err(err) => {
                        errors.push(err);
                        false
                    }
                };
                quizzes.push(LessonEntry { name, registered });
            }
            index.push(LessonIndex {
                slug: lesson.slug,
                title: lesson.title,
                quizzes,
            });
        }
        info!(
            "[Pack] Loaded {} quizzes ({} rejected)",
            registry.len(),
            errors.len()
        );
        (registry, index, errors)
    }
}

/// A quiz as listed by a lesson. `registered` is false when the registry
/// turned the entry down, e.g. because another lesson already took the name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonEntry {
    pub name: String,
    pub registered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonIndex {
    pub slug: String,
    pub title: String,
    pub quizzes: Vec<LessonEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PACK: &str = r#"{
        "lessons": [
            {
                "slug": "srp",
                "title": "Single Responsibility",
                "quizzes": [
                    {
                        "name": "srp-patterns-3",
                        "question": [{"text": "How many classes does "}, {"code": {"source": "Report"}}, {"text": "need?"}],
                        "variants": [{"text": "1 класс"}, {"text": "2 класса"}, {"text": "3 класса"}],
                        "meta": {"correctAnswers": [2]}
                    },
                    {
                        "name": "srp-broken",
                        "question": "?",
                        "variants": [],
                        "meta": {"correctAnswers": []}
                    }
                ]
            },
            {
                "slug": "lsp",
                "title": "Liskov Substitution",
                "quizzes": [
                    {
                        "name": "lsp-ideal-1",
                        "question": "Which hold?",
                        "variants": [{"text": "a"}, {"text": "b"}, {"text": "c"}, {"text": "d"}],
                        "meta": {"correctAnswers": [0, 1, 2, 3]}
                    },
                    {
                        "name": "srp-patterns-3",
                        "question": "Copy-pasted",
                        "variants": [{"text": "x"}],
                        "meta": {"correctAnswers": [0]}
                    }
                ]
            }
        ]
    }"#;

    #[test]
    fn parses_lessons_and_quizzes() {
        let pack = ContentPack::from_json(PACK).unwrap();
        assert_eq!(pack.lessons.len(), 2);
        assert_eq!(pack.quiz_count(), 4);
        assert_eq!(pack.lesson_of("lsp-ideal-1").unwrap().slug, "lsp");
        assert_eq!(pack.lesson_of("srp-patterns-3").unwrap().slug, "srp");
        assert!(pack.lesson_of("nope").is_none());
    }

    #[test]
    fn into_registry_reports_rejected_quizzes() {
        let (registry, errors) = ContentPack::from_json(PACK).unwrap().into_registry();

        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["srp-patterns-3", "lsp-ideal-1"]
        );
        assert_eq!(errors.len(), 2);
        assert!(matches!(&errors[0], Error::SchemaViolation { name, .. } if name == "srp-broken"));
        assert!(matches!(&errors[1], Error::DuplicateName(name) if name == "srp-patterns-3"));
        assert_eq!(
            registry.lookup("srp-patterns-3").unwrap().question.plain_text(),
            "How many classes does \nReport\nneed?"
        );
    }

    #[test]
    fn catalog_marks_entries_the_registry_turned_down() {
        let (registry, index, errors) = ContentPack::from_json(PACK).unwrap().into_catalog();

        assert_eq!(registry.len(), 2);
        assert_eq!(errors.len(), 2);
        let entries: Vec<(&str, &str, bool)> = index
            .iter()
            .flat_map(|lesson| {
                lesson
                    .quizzes
                    .iter()
                    .map(move |entry| (lesson.slug.as_str(), entry.name.as_str(), entry.registered))
            })
            .collect();
        assert_eq!(
            entries,
            vec![
                ("srp", "srp-patterns-3", true),
                ("srp", "srp-broken", false),
                ("lsp", "lsp-ideal-1", true),
                ("lsp", "srp-patterns-3", false),
            ]
        );
        // the duplicate in `lsp` does not shadow the first definition
        assert_eq!(registry.lookup("srp-patterns-3").unwrap().variants.len(), 3);
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        assert!(matches!(
            ContentPack::from_json("{\"lessons\": 3}"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn survives_a_json_round_trip() {
        let pack = ContentPack::from_json(PACK).unwrap();
        let again = ContentPack::from_json(&pack.to_json().unwrap()).unwrap();
        assert_eq!(pack, again);
    }
}
