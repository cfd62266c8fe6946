use std::fmt;

use rand::{seq::SliceRandom, RngCore};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

use super::{video, VariantKind};

/// Options offered to the player in the multiple-choice list.
///
/// Plain answers serialize as a string, country/song pairs as a two-element
/// array.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Pair(String, String),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        AnswerValue::Text(value.into())
    }

    pub fn pair(first: impl Into<String>, second: impl Into<String>) -> Self {
        AnswerValue::Pair(first.into(), second.into())
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Text(text) => write!(f, "{text}"),
            AnswerValue::Pair(first, second) => write!(f, "{first} / {second}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum QuestionFormat {
    #[serde(rename = "pregunta")]
    Text,
    #[serde(rename = "video")]
    Video,
}

/// Flat record handed to the quiz player and stored with saved quizzes.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct SerializedQuestion {
    #[serde(rename = "pregunta")]
    pub prompt: String,
    #[serde(rename = "correcta")]
    pub answer_index: u8,
    #[serde(rename = "respuestas")]
    pub options: Vec<AnswerValue>,
    #[serde(rename = "puntuacion")]
    pub points: u8,
    #[serde(rename = "tipo")]
    pub format: QuestionFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_id: Option<String>,
}

impl SerializedQuestion {
    pub fn correct_option(&self) -> Option<&AnswerValue> {
        self.options.get(self.answer_index as usize)
    }
}

/// The correct answer plus exactly three distractors, all pairwise distinct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Choices {
    answer: AnswerValue,
    distractors: [AnswerValue; 3],
}

impl Choices {
    /// Keeps the first three candidates that differ from the answer and from
    /// each other. Fails when fewer than three remain.
    pub fn new(
        answer: AnswerValue,
        candidates: impl IntoIterator<Item = AnswerValue>,
    ) -> AppResult<Self> {
        let mut picked: Vec<AnswerValue> = Vec::with_capacity(3);
        for candidate in candidates {
            if candidate == answer || picked.contains(&candidate) {
                continue;
            }
            picked.push(candidate);
            if picked.len() == 3 {
                break;
            }
        }

        let found = picked.len();
        let distractors: [AnswerValue; 3] = picked.try_into().map_err(|_| {
            AppError::InsufficientData(format!(
                "only {found} distinct distractors available for answer '{answer}'"
            ))
        })?;

        Ok(Choices {
            answer,
            distractors,
        })
    }

    pub fn answer(&self) -> &AnswerValue {
        &self.answer
    }

    pub fn distractors(&self) -> &[AnswerValue; 3] {
        &self.distractors
    }
}

/// Common contract of every trivia question. Implementors are fully
/// populated when built and never change afterwards.
pub trait TriviaQuestion: fmt::Debug + Send + Sync {
    fn kind(&self) -> VariantKind;

    fn prompt(&self) -> String;

    fn choices(&self) -> &Choices;

    fn answer(&self) -> &AnswerValue {
        self.choices().answer()
    }

    fn distractors(&self) -> &[AnswerValue; 3] {
        self.choices().distractors()
    }

    fn points(&self) -> u8 {
        self.kind().points()
    }

    /// Video reference shown alongside the prompt, for video questions only.
    fn media_reference(&self) -> Option<&str> {
        None
    }

    fn serialize_with(&self, rng: &mut dyn RngCore) -> SerializedQuestion {
        let answer = self.answer().clone();
        let mut options = Vec::with_capacity(4);
        options.push(answer.clone());
        options.extend(self.distractors().iter().cloned());
        options.shuffle(rng);

        let answer_index = options
            .iter()
            .position(|option| *option == answer)
            .unwrap_or_default() as u8;

        let (format, url, url_id) = match self.media_reference() {
            Some(reference) => (
                QuestionFormat::Video,
                Some(reference.to_string()),
                Some(video::video_id_or_fallback(reference)),
            ),
            None => (QuestionFormat::Text, None, None),
        };

        SerializedQuestion {
            prompt: self.prompt(),
            answer_index,
            options,
            points: self.points(),
            format,
            url,
            url_id,
        }
    }

    fn serialize(&self) -> SerializedQuestion {
        self.serialize_with(&mut rand::thread_rng())
    }
}
