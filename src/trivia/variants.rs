//! Text-only trivia questions.

use mongodb::bson::{doc, Bson};

use crate::errors::{AppError, AppResult};

use super::{
    facade::{bson_to_f64, bson_to_i32, QueryFacade},
    question::{AnswerValue, Choices, TriviaQuestion},
    VariantKind,
};

fn insufficient(message: impl Into<String>) -> AppError {
    AppError::InsufficientData(message.into())
}

/// In which year did a country take part for the first time?
#[derive(Clone, Debug)]
pub struct FirstParticipationYear {
    country: String,
    choices: Choices,
}

impl FirstParticipationYear {
    /// Prefers a country whose debut falls inside the year filter. When the
    /// selection has none, asks about a restricted country anyway and draws
    /// the distractor years from the whole collection, since its debut lies
    /// outside the selected years.
    pub async fn build(facade: &QueryFacade) -> AppResult<Self> {
        let mut stages = vec![doc! { "$group": {
            "_id": "$concursantes.pais",
            "debut": { "$min": "$anyo" }
        } }];
        if !facade.years().is_empty() {
            stages.push(doc! { "$match": { "debut": { "$in": facade.years().to_vec() } } });
        }
        stages.push(doc! { "$sample": { "size": 1 } });

        let debut = facade
            .aggregate(facade.entries_in_any_year(stages))
            .await?
            .into_iter()
            .next();

        let (country, first_year, year_source) = match debut {
            Some(row) => {
                let country = row.get_str("_id")?.to_string();
                let first_year = row
                    .get("debut")
                    .and_then(bson_to_i32)
                    .ok_or_else(|| insufficient(format!("no edition found for '{country}'")))?;
                (country, first_year, None)
            }
            None => {
                let country = facade
                    .random_participant_countries(1, vec![])
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        insufficient("no participant country matches the current filters")
                    })?;
                let first_year = debut_year(facade, &country).await?;
                (country, first_year, Some(facade.unrestricted()))
            }
        };

        let other_years = year_source
            .as_ref()
            .unwrap_or(facade)
            .random_years(3, vec![doc! { "$match": { "anyo": { "$ne": first_year } } }])
            .await?;

        let choices = Choices::new(
            AnswerValue::text(first_year.to_string()),
            other_years
                .into_iter()
                .map(|year| AnswerValue::text(year.to_string())),
        )?;

        Ok(Self { country, choices })
    }
}

async fn debut_year(facade: &QueryFacade, country: &str) -> AppResult<i32> {
    facade
        .aggregate(facade.entries_in_any_year(vec![
            doc! { "$match": { "concursantes.pais": country } },
            doc! { "$group": { "_id": "$concursantes.pais", "debut": { "$min": "$anyo" } } },
        ]))
        .await?
        .first()
        .and_then(|row| row.get("debut"))
        .and_then(bson_to_i32)
        .ok_or_else(|| insufficient(format!("no edition found for '{country}'")))
}

impl TriviaQuestion for FirstParticipationYear {
    fn kind(&self) -> VariantKind {
        VariantKind::FirstParticipationYear
    }

    fn prompt(&self) -> String {
        format!("¿En qué año participó por primera vez {}?", self.country)
    }

    fn choices(&self) -> &Choices {
        &self.choices
    }
}

/// Which country does the performer of a song come from?
#[derive(Clone, Debug)]
pub struct SongToCountry {
    song: String,
    choices: Choices,
}

impl SongToCountry {
    pub async fn build(facade: &QueryFacade) -> AppResult<Self> {
        let entry = facade
            .random_entries(1, vec![])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| insufficient("no performance matches the current filters"))?;

        let other_countries = facade
            .random_participant_countries(
                3,
                vec![doc! { "$match": { "concursantes.pais": { "$ne": entry.country.as_str() } } }],
            )
            .await?;

        let choices = Choices::new(
            AnswerValue::text(entry.country),
            other_countries.into_iter().map(AnswerValue::Text),
        )?;

        Ok(Self {
            song: entry.song,
            choices,
        })
    }
}

impl TriviaQuestion for SongToCountry {
    fn kind(&self) -> VariantKind {
        VariantKind::SongToCountry
    }

    fn prompt(&self) -> String {
        format!("¿De qué país es el intérprete de la canción '{}'?", self.song)
    }

    fn choices(&self) -> &Choices {
        &self.choices
    }
}

/// Which song/country finished first in a given year? Every option took part
/// in that same year.
#[derive(Clone, Debug)]
pub struct BestRankingInYear {
    year: i32,
    choices: Choices,
}

impl BestRankingInYear {
    pub async fn build(facade: &QueryFacade) -> AppResult<Self> {
        let ranked = doc! { "$match": { "concursantes.resultado": { "$ne": Bson::Null } } };
        let year = facade
            .random_entry_years(1, 4, vec![ranked])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| insufficient("no edition has four ranked entries in the selection"))?;

        let best = facade
            .aggregate(facade.restricted_entries(vec![
                doc! { "$match": { "anyo": year, "concursantes.resultado": { "$ne": Bson::Null } } },
                doc! { "$sort": { "concursantes.resultado": 1 } },
                doc! { "$limit": 1 },
                doc! { "$project": {
                    "_id": 0,
                    "pais": "$concursantes.pais",
                    "cancion": "$concursantes.cancion",
                    "resultado": "$concursantes.resultado"
                } },
            ]))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| insufficient(format!("no ranked performance in {year}")))?;

        let best_ranking = best.get("resultado").cloned().unwrap_or(Bson::Null);
        let answer = AnswerValue::pair(best.get_str("pais")?, best.get_str("cancion")?);

        let others = facade
            .random_entries(
                3,
                vec![doc! { "$match": {
                    "anyo": year,
                    "concursantes.resultado": { "$ne": best_ranking }
                } }],
            )
            .await?;

        let choices = Choices::new(
            answer,
            others
                .into_iter()
                .map(|entry| AnswerValue::pair(entry.country, entry.song)),
        )?;

        Ok(Self { year, choices })
    }
}

impl TriviaQuestion for BestRankingInYear {
    fn kind(&self) -> VariantKind {
        VariantKind::BestRankingInYear
    }

    fn prompt(&self) -> String {
        format!("¿Qué canción/país obtuvo la mejor posición en {}?", self.year)
    }

    fn choices(&self) -> &Choices {
        &self.choices
    }
}

/// Which country had the best average score over a range of years?
#[derive(Clone, Debug)]
pub struct BestAverageOverRange {
    start_year: i32,
    end_year: i32,
    choices: Choices,
}

impl BestAverageOverRange {
    pub async fn build(facade: &QueryFacade) -> AppResult<Self> {
        let with_score = doc! { "$match": { "concursantes.puntuacion": { "$ne": Bson::Null } } };
        let years = facade.random_entry_years(2, 4, vec![with_score]).await?;
        let (start_year, end_year) = match years.as_slice() {
            [a, b] => (*a.min(b), *a.max(b)),
            _ => return Err(insufficient("at least two editions are needed for a range")),
        };

        let in_range = doc! { "anyo": { "$gte": start_year, "$lte": end_year } };

        let mut scored = in_range.clone();
        scored.insert("concursantes.puntuacion", doc! { "$ne": Bson::Null });
        let averages = facade
            .aggregate(facade.restricted_entries(vec![
                doc! { "$match": scored },
                doc! { "$group": {
                    "_id": "$concursantes.pais",
                    "media": { "$avg": "$concursantes.puntuacion" }
                } },
                doc! { "$sort": { "media": -1 } },
            ]))
            .await?;

        let best_average = averages
            .first()
            .and_then(|row| row.get("media"))
            .and_then(bson_to_f64)
            .ok_or_else(|| {
                insufficient(format!("no scores between {start_year} and {end_year}"))
            })?;

        // Every country tied at the top would be a correct answer too.
        let leaders: Vec<String> = averages
            .iter()
            .filter(|row| row.get("media").and_then(bson_to_f64) == Some(best_average))
            .filter_map(|row| row.get_str("_id").ok().map(str::to_string))
            .collect();
        let answer = leaders
            .first()
            .cloned()
            .ok_or_else(|| insufficient("best average has no country"))?;

        let mut others_filter = in_range;
        others_filter.insert("concursantes.pais", doc! { "$nin": leaders.clone() });
        let others = facade
            .random_participant_countries(3, vec![doc! { "$match": others_filter }])
            .await?;

        let choices = Choices::new(
            AnswerValue::text(answer),
            others.into_iter().map(AnswerValue::Text),
        )?;

        Ok(Self {
            start_year,
            end_year,
            choices,
        })
    }

    pub fn range(&self) -> (i32, i32) {
        (self.start_year, self.end_year)
    }
}

impl TriviaQuestion for BestAverageOverRange {
    fn kind(&self) -> VariantKind {
        VariantKind::BestAverageOverRange
    }

    fn prompt(&self) -> String {
        format!(
            "¿Qué país quedó mejor posicionado de media entre los años {} y {}?",
            self.start_year, self.end_year
        )
    }

    fn choices(&self) -> &Choices {
        &self.choices
    }
}
