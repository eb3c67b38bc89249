pub mod content;
pub mod db;
pub mod error;
pub mod evaluation;
pub mod lint;
pub mod pack;
pub mod presentation;
pub mod record;
pub mod registry;
