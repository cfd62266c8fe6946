//! Questions played over a performance video.
//!
//! The player embeds the video by its short identifier, so every video
//! question serializes both the stored reference and that identifier. A
//! reference that cannot be parsed falls back to [`FALLBACK_VIDEO_ID`].

use mongodb::bson::{doc, Bson, Document};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::{
    errors::{AppError, AppResult},
    models::domain::Entry,
};

use super::{
    facade::QueryFacade,
    question::{AnswerValue, Choices, TriviaQuestion},
    VariantKind,
};

pub const FALLBACK_VIDEO_ID: &str = "dQw4w9WgXcQ";

static VIDEO_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+$").expect("VIDEO_ID is a valid regex pattern")
});

static WATCH_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|&)v=([^&]+)").expect("WATCH_PARAM is a valid regex pattern")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MediaReferenceError {
    #[error("empty media reference")]
    Empty,

    #[error("media reference '{0}' has no path component")]
    MissingPath(String),

    #[error("'{0}' is not a valid video identifier")]
    InvalidIdentifier(String),
}

/// Extracts the short video identifier from a stored reference such as
/// `https://youtu.be/<id>`, `https://www.youtube.com/embed/<id>` or
/// `https://www.youtube.com/watch?v=<id>`.
pub fn extract_video_id(reference: &str) -> Result<String, MediaReferenceError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(MediaReferenceError::Empty);
    }

    let without_fragment = reference.split('#').next().unwrap_or_default();
    let (location, query) = match without_fragment.split_once('?') {
        Some((location, query)) => (location, query),
        None => (without_fragment, ""),
    };

    let path = match location.split_once("://") {
        Some((_, rest)) => rest
            .split_once('/')
            .map(|(_, path)| path)
            .ok_or_else(|| MediaReferenceError::MissingPath(reference.to_string()))?,
        None => location,
    };

    let segment = path
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .ok_or_else(|| MediaReferenceError::MissingPath(reference.to_string()))?;

    let candidate = if segment == "watch" {
        WATCH_PARAM
            .captures(query)
            .and_then(|captures| captures.get(1))
            .map(|id| id.as_str())
            .ok_or_else(|| MediaReferenceError::MissingPath(reference.to_string()))?
    } else {
        segment
    };

    if !VIDEO_ID.is_match(candidate) {
        return Err(MediaReferenceError::InvalidIdentifier(candidate.to_string()));
    }
    Ok(candidate.to_string())
}

pub fn video_id_or_fallback(reference: &str) -> String {
    extract_video_id(reference).unwrap_or_else(|err| {
        log::warn!("Using fallback video id: {}", err);
        FALLBACK_VIDEO_ID.to_string()
    })
}

fn with_video() -> Document {
    doc! { "concursantes.url_youtube": { "$nin": [Bson::Null, ""] } }
}

/// Samples one restricted entry that has a video, returning it with its
/// reference.
async fn sample_video_entry(facade: &QueryFacade) -> AppResult<(Entry, String)> {
    let entry = facade
        .random_entries(1, vec![doc! { "$match": with_video() }])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            AppError::InsufficientData(
                "no performance with a video matches the current filters".to_string(),
            )
        })?;

    let video_url = entry
        .video_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| {
            AppError::InsufficientData(format!(
                "sampled performance '{}' has no video",
                entry.song
            ))
        })?;

    Ok((entry, video_url))
}

/// Which country did this performance represent?
#[derive(Clone, Debug)]
pub struct CountryFromVideo {
    video_url: String,
    choices: Choices,
}

impl CountryFromVideo {
    pub async fn build(facade: &QueryFacade) -> AppResult<Self> {
        let (entry, video_url) = sample_video_entry(facade).await?;

        let mut filter = with_video();
        filter.insert("concursantes.pais", doc! { "$ne": entry.country.as_str() });
        let others = facade
            .random_participant_countries(3, vec![doc! { "$match": filter }])
            .await?;

        let choices = Choices::new(
            AnswerValue::text(entry.country),
            others.into_iter().map(AnswerValue::Text),
        )?;

        Ok(Self { video_url, choices })
    }
}

impl TriviaQuestion for CountryFromVideo {
    fn kind(&self) -> VariantKind {
        VariantKind::CountryFromVideo
    }

    fn prompt(&self) -> String {
        "¿A qué país representó esta canción?".to_string()
    }

    fn choices(&self) -> &Choices {
        &self.choices
    }

    fn media_reference(&self) -> Option<&str> {
        Some(&self.video_url)
    }
}

/// What is the title of this song? Distractors are other songs of the same
/// country so the flag on screen gives nothing away.
#[derive(Clone, Debug)]
pub struct SongFromVideo {
    video_url: String,
    choices: Choices,
}

impl SongFromVideo {
    pub async fn build(facade: &QueryFacade) -> AppResult<Self> {
        let (entry, video_url) = sample_video_entry(facade).await?;

        let others = facade
            .random_entry_values(
                "cancion",
                3,
                vec![doc! { "$match": {
                    "concursantes.pais": entry.country.as_str(),
                    "concursantes.cancion": { "$ne": entry.song.as_str() }
                } }],
            )
            .await?;

        let choices = Choices::new(
            AnswerValue::text(entry.song),
            others.into_iter().map(AnswerValue::Text),
        )?;

        Ok(Self { video_url, choices })
    }
}

impl TriviaQuestion for SongFromVideo {
    fn kind(&self) -> VariantKind {
        VariantKind::SongFromVideo
    }

    fn prompt(&self) -> String {
        "¿Cuál es el título de esta canción?".to_string()
    }

    fn choices(&self) -> &Choices {
        &self.choices
    }

    fn media_reference(&self) -> Option<&str> {
        Some(&self.video_url)
    }
}

/// Who performed this song? Distractors are other artists of the same
/// country.
#[derive(Clone, Debug)]
pub struct PerformerFromVideo {
    video_url: String,
    choices: Choices,
}

impl PerformerFromVideo {
    pub async fn build(facade: &QueryFacade) -> AppResult<Self> {
        let (entry, video_url) = sample_video_entry(facade).await?;

        let others = facade
            .random_entry_values(
                "artista",
                3,
                vec![doc! { "$match": {
                    "concursantes.pais": entry.country.as_str(),
                    "concursantes.artista": { "$ne": entry.artist.as_str() }
                } }],
            )
            .await?;

        let choices = Choices::new(
            AnswerValue::text(entry.artist),
            others.into_iter().map(AnswerValue::Text),
        )?;

        Ok(Self { video_url, choices })
    }
}

impl TriviaQuestion for PerformerFromVideo {
    fn kind(&self) -> VariantKind {
        VariantKind::PerformerFromVideo
    }

    fn prompt(&self) -> String {
        "¿Qué artista interpretó esta canción?".to_string()
    }

    fn choices(&self) -> &Choices {
        &self.choices
    }

    fn media_reference(&self) -> Option<&str> {
        Some(&self.video_url)
    }
}
