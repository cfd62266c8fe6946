use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::trivia::SerializedQuestion;

/// A played quiz stored under a user-chosen name so it can be replayed.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SavedQuiz {
    #[serde(rename = "_id")]
    pub name: String,
    #[serde(rename = "preguntas")]
    pub questions: Vec<SerializedQuestion>,
    /// Stored as a BSON datetime so listings sort chronologically.
    #[serde(rename = "creacion", with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl SavedQuiz {
    pub fn new(name: &str, questions: Vec<SerializedQuestion>) -> Self {
        SavedQuiz {
            name: name.to_string(),
            questions,
            created_at: Utc::now(),
        }
    }
}
