//! Randomized Eurovision trivia.
//!
//! [`generate_questions`] draws question kinds at random and builds each one
//! through a shared [`QueryFacade`], which keeps every query within the
//! player's year/country selection.

pub mod facade;
pub mod generator;
pub mod question;
pub mod variants;
pub mod video;

pub use facade::QueryFacade;
pub use generator::{generate_questions, VariantKind};
pub use question::{AnswerValue, Choices, QuestionFormat, SerializedQuestion, TriviaQuestion};
