use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{models::domain::SavedQuiz, trivia::SerializedQuestion};

/// A quiz ready to be played.
#[derive(Debug, Clone, Serialize)]
pub struct PlayQuizResponse {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "preguntas")]
    pub questions: Vec<SerializedQuestion>,

    /// Whether the player may save the quiz once finished.
    #[serde(rename = "guardable")]
    pub savable: bool,
}

impl PlayQuizResponse {
    pub fn generated(name: Option<String>, questions: Vec<SerializedQuestion>) -> Self {
        let savable = name.is_some();
        Self {
            name,
            questions,
            savable,
        }
    }

    /// Replaying a stored quiz never offers to save it again.
    pub fn replay(quiz: SavedQuiz) -> Self {
        Self {
            name: Some(quiz.name),
            questions: quiz.questions,
            savable: false,
        }
    }
}

/// Values a custom quiz can be restricted to.
#[derive(Debug, Clone, Default, Serialize, SimpleObject)]
pub struct QuizOptions {
    /// Newest first.
    #[serde(rename = "anyos")]
    pub years: Vec<i32>,

    /// Alphabetical.
    #[serde(rename = "paises")]
    pub countries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct SavedQuizSummary {
    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "creacion")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "num_preguntas")]
    pub question_count: usize,
}

impl From<SavedQuiz> for SavedQuizSummary {
    fn from(quiz: SavedQuiz) -> Self {
        SavedQuizSummary {
            question_count: quiz.questions.len(),
            name: quiz.name,
            created_at: quiz.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct PaginationMetadata {
    pub offset: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct PaginatedSavedQuizzes {
    pub items: Vec<SavedQuizSummary>,
    pub pagination: PaginationMetadata,
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct SaveQuizResponse {
    #[serde(rename = "nombre")]
    pub name: String,
    pub message: String,
}
