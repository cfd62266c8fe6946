pub mod edition;
pub mod saved_quiz;
pub use edition::{Edition, Entry};
pub use saved_quiz::SavedQuiz;
