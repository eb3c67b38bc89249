pub mod libquiz;

pub use libquiz::content::{Content, ContentNode};
pub use libquiz::error::{Error, Violation};
pub use libquiz::evaluation::{evaluate, Evaluation};
pub use libquiz::lint::{lint, Lint};
pub use libquiz::pack::{ContentPack, Lesson, LessonEntry, LessonIndex};
pub use libquiz::presentation::Presentation;
pub use libquiz::record::{QuizKind, QuizMeta, QuizRecord, VariantRecord};
pub use libquiz::registry::{RegisteredQuiz, Registry};
