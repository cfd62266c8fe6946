use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{EditionRepository, MongoEditionRepository, MongoQuizRepository, QuizRepository},
    services::TriviaService,
};

#[derive(Clone)]
pub struct AppState {
    pub trivia_service: Arc<TriviaService>,
    pub db: Option<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let edition_repository = Arc::new(MongoEditionRepository::new(
            &db,
            &config.editions_collection,
        ));
        let quiz_repository = Arc::new(MongoQuizRepository::new(&db, &config.quizzes_collection));

        let mut state = Self::from_repositories(config, edition_repository, quiz_repository);
        state.db = Some(db);
        Ok(state)
    }

    /// State without a live database, for wiring custom repositories.
    pub fn from_repositories(
        config: Config,
        editions: Arc<dyn EditionRepository>,
        quizzes: Arc<dyn QuizRepository>,
    ) -> Self {
        let trivia_service = Arc::new(TriviaService::new(
            editions,
            quizzes,
            config.default_question_count,
            config.max_question_count,
        ));

        Self {
            trivia_service,
            db: None,
            config: Arc::new(config),
        }
    }
}
