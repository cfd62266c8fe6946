pub mod trivia_service;

pub use trivia_service::TriviaService;
