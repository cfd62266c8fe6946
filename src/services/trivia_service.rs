use std::sync::Arc;

use mongodb::bson::doc;
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::SavedQuiz,
        dto::{
            request::{CustomQuizRequest, PlayQuizRequest, SaveQuizRequest},
            response::{
                PaginatedSavedQuizzes, PaginationMetadata, PlayQuizResponse, QuizOptions,
                SaveQuizResponse, SavedQuizSummary,
            },
        },
    },
    repositories::{EditionRepository, QuizRepository},
    trivia::{self, facade::bson_to_i32, SerializedQuestion},
};

pub struct TriviaService {
    editions: Arc<dyn EditionRepository>,
    quizzes: Arc<dyn QuizRepository>,
    default_question_count: usize,
    max_question_count: usize,
}

impl TriviaService {
    pub fn new(
        editions: Arc<dyn EditionRepository>,
        quizzes: Arc<dyn QuizRepository>,
        default_question_count: usize,
        max_question_count: usize,
    ) -> Self {
        Self {
            editions,
            quizzes,
            default_question_count,
            max_question_count,
        }
    }

    /// Generates `count` questions (the configured default when `None`).
    pub async fn generate(
        &self,
        years: Vec<i32>,
        countries: Vec<String>,
        count: Option<usize>,
    ) -> AppResult<Vec<SerializedQuestion>> {
        let count = count.unwrap_or(self.default_question_count);
        if count == 0 || count > self.max_question_count {
            return Err(AppError::ValidationError(format!(
                "Question count must be between 1 and {}",
                self.max_question_count
            )));
        }

        trivia::generate_questions(count, years, countries, self.editions.clone()).await
    }

    pub async fn play(&self, request: PlayQuizRequest) -> AppResult<PlayQuizResponse> {
        request.validate()?;

        let name = request.save_name();
        let questions = self
            .generate(request.years, request.countries, None)
            .await?;

        Ok(PlayQuizResponse::generated(name, questions))
    }

    /// Custom quizzes are always savable, so the name must still be free.
    pub async fn custom(&self, request: CustomQuizRequest) -> AppResult<PlayQuizResponse> {
        request.validate()?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError("Quiz name cannot be blank".to_string()));
        }
        self.ensure_name_available(&name).await?;

        let questions = self
            .generate(request.years, request.countries, None)
            .await?;

        Ok(PlayQuizResponse::generated(Some(name), questions))
    }

    pub async fn options(&self) -> AppResult<QuizOptions> {
        let mut years: Vec<i32> = self
            .editions
            .aggregate(vec![
                doc! { "$project": { "_id": 0, "anyo": 1 } },
                doc! { "$sort": { "anyo": -1 } },
            ])
            .await?
            .iter()
            .filter_map(|edition| edition.get("anyo").and_then(bson_to_i32))
            .collect();
        years.dedup();

        let countries = self
            .editions
            .aggregate(vec![
                doc! { "$unwind": "$concursantes" },
                doc! { "$group": { "_id": "$concursantes.pais" } },
                doc! { "$sort": { "_id": 1 } },
            ])
            .await?
            .iter()
            .filter_map(|row| row.get_str("_id").ok().map(str::to_string))
            .collect();

        Ok(QuizOptions { years, countries })
    }

    pub async fn save_quiz(&self, request: SaveQuizRequest) -> AppResult<SaveQuizResponse> {
        request.validate()?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::ValidationError("Quiz name cannot be blank".to_string()));
        }

        let quiz = SavedQuiz::new(&name, request.into_questions());
        let saved = self.quizzes.create(quiz).await?;
        log::info!(
            "Saved quiz '{}' with {} questions",
            saved.name,
            saved.questions.len()
        );

        Ok(SaveQuizResponse {
            message: format!("Quiz '{}' saved", saved.name),
            name: saved.name,
        })
    }

    pub async fn get_quiz(&self, name: &str) -> AppResult<PlayQuizResponse> {
        let quiz = self
            .quizzes
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with name '{}' not found", name)))?;

        Ok(PlayQuizResponse::replay(quiz))
    }

    pub async fn list_quizzes(&self, offset: i64, limit: i64) -> AppResult<PaginatedSavedQuizzes> {
        let (quizzes, total) = self.quizzes.list_quizzes(offset, limit).await?;

        Ok(PaginatedSavedQuizzes {
            items: quizzes.into_iter().map(SavedQuizSummary::from).collect(),
            pagination: PaginationMetadata {
                offset,
                limit,
                total,
            },
        })
    }

    async fn ensure_name_available(&self, name: &str) -> AppResult<()> {
        if self.quizzes.exists(name).await? {
            return Err(AppError::AlreadyExists(format!(
                "Quiz with name '{}' already exists",
                name
            )));
        }
        Ok(())
    }
}
