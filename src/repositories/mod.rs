pub mod edition_repository;
pub mod quiz_repository;

pub use edition_repository::{EditionRepository, MongoEditionRepository};
pub use quiz_repository::{MongoQuizRepository, QuizRepository};
