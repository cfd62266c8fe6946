pub mod health_handler;
pub mod quiz_handler;
pub mod trivia_handler;

use actix_web::web;

pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use quiz_handler::{get_quiz, list_quizzes, save_quiz};
pub use trivia_handler::{custom_quiz, play_quiz, quiz_options};

/// Registers every REST endpoint.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(health_check_ready)
        .service(health_check_live)
        .service(play_quiz)
        .service(custom_quiz)
        .service(quiz_options)
        .service(save_quiz)
        .service(list_quizzes)
        .service(get_quiz);
}
