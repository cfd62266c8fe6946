use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::trivia::SerializedQuestion;

/// Quick game. Empty lists mean no restriction.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PlayQuizRequest {
    #[serde(rename = "anyos", default)]
    pub years: Vec<i32>,

    #[serde(rename = "paises", default)]
    pub countries: Vec<String>,

    #[serde(rename = "nombre", default)]
    #[validate(length(max = 100))]
    pub name: Option<String>,
}

impl PlayQuizRequest {
    /// The name the quiz could be saved under, if a usable one was given.
    pub fn save_name(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CustomQuizRequest {
    #[serde(rename = "anyos")]
    #[validate(length(min = 4, message = "Select at least 4 years"))]
    pub years: Vec<i32>,

    #[serde(rename = "paises")]
    #[validate(length(min = 4, message = "Select at least 4 countries"))]
    pub countries: Vec<String>,

    #[serde(rename = "nombre")]
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

/// A question as it comes back from the player, with the option it picked.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnsweredQuestion {
    #[serde(flatten)]
    pub question: SerializedQuestion,

    #[serde(rename = "seleccionado", default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SaveQuizRequest {
    #[serde(rename = "nombre")]
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[serde(rename = "preguntas")]
    #[validate(length(min = 1, message = "A saved quiz needs at least one question"))]
    pub questions: Vec<AnsweredQuestion>,
}

impl SaveQuizRequest {
    /// Drops the player's answers, keeping only the generated questions.
    pub fn into_questions(self) -> Vec<SerializedQuestion> {
        self.questions
            .into_iter()
            .map(|answered| answered.question)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaginationParams {
    #[validate(range(min = 0))]
    pub offset: Option<i64>,

    #[validate(range(min = 1, max = 100))]
    pub limit: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            offset: Some(0),
            limit: Some(20),
        }
    }
}

impl PaginationParams {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(20).clamp(1, 100)
    }
}
