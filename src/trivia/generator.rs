use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::{
    errors::{AppError, AppResult},
    repositories::EditionRepository,
};

use super::{
    facade::QueryFacade,
    question::{QuestionFormat, SerializedQuestion, TriviaQuestion},
    variants::{BestAverageOverRange, BestRankingInYear, FirstParticipationYear, SongToCountry},
    video::{CountryFromVideo, PerformerFromVideo, SongFromVideo},
};

/// Every kind of trivia question the generator can draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum VariantKind {
    FirstParticipationYear,
    SongToCountry,
    BestRankingInYear,
    BestAverageOverRange,
    CountryFromVideo,
    SongFromVideo,
    PerformerFromVideo,
}

impl VariantKind {
    pub const ALL: [VariantKind; 7] = [
        VariantKind::FirstParticipationYear,
        VariantKind::SongToCountry,
        VariantKind::BestRankingInYear,
        VariantKind::BestAverageOverRange,
        VariantKind::CountryFromVideo,
        VariantKind::SongFromVideo,
        VariantKind::PerformerFromVideo,
    ];

    pub fn points(self) -> u8 {
        match self {
            VariantKind::SongToCountry => 1,
            VariantKind::FirstParticipationYear | VariantKind::SongFromVideo => 2,
            VariantKind::BestRankingInYear | VariantKind::CountryFromVideo => 3,
            VariantKind::BestAverageOverRange | VariantKind::PerformerFromVideo => 4,
        }
    }

    pub fn format(self) -> QuestionFormat {
        match self {
            VariantKind::CountryFromVideo
            | VariantKind::SongFromVideo
            | VariantKind::PerformerFromVideo => QuestionFormat::Video,
            _ => QuestionFormat::Text,
        }
    }

    pub fn random() -> Self {
        *Self::ALL
            .choose(&mut rand::thread_rng())
            .unwrap_or(&VariantKind::SongToCountry)
    }

    /// Builds a question of this kind, issuing its queries through `facade`.
    pub async fn build(self, facade: &QueryFacade) -> AppResult<Box<dyn TriviaQuestion>> {
        let question: Box<dyn TriviaQuestion> = match self {
            VariantKind::FirstParticipationYear => {
                Box::new(FirstParticipationYear::build(facade).await?)
            }
            VariantKind::SongToCountry => Box::new(SongToCountry::build(facade).await?),
            VariantKind::BestRankingInYear => Box::new(BestRankingInYear::build(facade).await?),
            VariantKind::BestAverageOverRange => {
                Box::new(BestAverageOverRange::build(facade).await?)
            }
            VariantKind::CountryFromVideo => Box::new(CountryFromVideo::build(facade).await?),
            VariantKind::SongFromVideo => Box::new(SongFromVideo::build(facade).await?),
            VariantKind::PerformerFromVideo => Box::new(PerformerFromVideo::build(facade).await?),
        };
        Ok(question)
    }
}

/// Generates `count` questions, each of a uniformly drawn kind, restricted to
/// `years` and `countries` (empty means unrestricted).
///
/// Questions are built one after another against a single facade. The first
/// failure aborts the whole quiz; partial quizzes are never returned.
pub async fn generate_questions(
    count: usize,
    years: Vec<i32>,
    countries: Vec<String>,
    store: Arc<dyn EditionRepository>,
) -> AppResult<Vec<SerializedQuestion>> {
    if count == 0 {
        return Err(AppError::ValidationError(
            "a quiz needs at least one question".to_string(),
        ));
    }

    log::info!(
        "Generating {} trivia questions (years: {:?}, countries: {:?})",
        count,
        years,
        countries
    );

    let facade = QueryFacade::new(store, years, countries);
    let mut questions = Vec::with_capacity(count);

    for position in 0..count {
        let kind = VariantKind::random();
        let question = kind.build(&facade).await.map_err(|err| {
            log::warn!("Could not build {:?} question #{}: {}", kind, position + 1, err);
            err
        })?;
        log::debug!("Built {:?} question #{}", kind, position + 1);
        questions.push(question.serialize());
    }

    Ok(questions)
}
