//! Query facade over the editions collection.
//!
//! Every question variant samples its answer and distractors through
//! [`QueryFacade`], which appends the year/country restriction chosen by the
//! player to each pipeline. Sampling helpers group by the requested field
//! before `$sample`, so a single call never yields the same value twice.
//!
//! Entry-level helpers unwind `concursantes` first; extra filters passed to
//! them run after the unwind and must address entry fields as
//! `concursantes.<field>`.

use std::sync::Arc;

use mongodb::bson::{self, doc, Bson, Document};

use crate::{
    errors::AppResult,
    models::domain::Entry,
    repositories::EditionRepository,
};

pub struct QueryFacade {
    store: Arc<dyn EditionRepository>,
    years: Vec<i32>,
    countries: Vec<String>,
}

impl QueryFacade {
    /// Empty `years` or `countries` means no restriction on that axis.
    pub fn new(store: Arc<dyn EditionRepository>, years: Vec<i32>, countries: Vec<String>) -> Self {
        let mut years = years;
        years.sort_unstable();
        years.dedup();

        let mut countries = countries;
        countries.sort();
        countries.dedup();

        Self {
            store,
            years,
            countries,
        }
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    fn year_restriction(&self) -> Vec<Document> {
        if self.years.is_empty() {
            return vec![];
        }
        vec![doc! { "$match": { "anyo": { "$in": self.years.clone() } } }]
    }

    fn host_country_restriction(&self) -> Vec<Document> {
        if self.countries.is_empty() {
            return vec![];
        }
        vec![doc! { "$match": { "pais": { "$in": self.countries.clone() } } }]
    }

    fn participant_country_restriction(&self) -> Vec<Document> {
        if self.countries.is_empty() {
            return vec![];
        }
        vec![doc! { "$match": { "concursantes.pais": { "$in": self.countries.clone() } } }]
    }

    /// Pipeline prefix yielding one document per restricted entry: year
    /// filter, unwind, participant filter, then `extra_stages`.
    pub fn restricted_entries(&self, extra_stages: Vec<Document>) -> Vec<Document> {
        let mut stages = self.year_restriction();
        stages.push(doc! { "$unwind": "$concursantes" });
        stages.extend(self.participant_country_restriction());
        stages.extend(extra_stages);
        stages
    }

    /// Same as [`restricted_entries`](Self::restricted_entries) but over
    /// every edition, for answers that depend on the whole contest history.
    pub fn entries_in_any_year(&self, extra_stages: Vec<Document>) -> Vec<Document> {
        let mut stages = vec![doc! { "$unwind": "$concursantes" }];
        stages.extend(self.participant_country_restriction());
        stages.extend(extra_stages);
        stages
    }

    /// Facade over the same store with no restriction on either axis.
    pub fn unrestricted(&self) -> Self {
        Self {
            store: self.store.clone(),
            years: vec![],
            countries: vec![],
        }
    }

    async fn project_and_sample(
        &self,
        field: &str,
        n: usize,
        mut stages: Vec<Document>,
    ) -> AppResult<Vec<Bson>> {
        if n == 0 {
            return Ok(vec![]);
        }

        let group_key = format!("${field}");
        let size = n as i64;
        stages.push(doc! { "$group": { "_id": group_key } });
        stages.push(doc! { "$match": { "_id": { "$ne": Bson::Null } } });
        stages.push(doc! { "$sample": { "size": size } });

        let documents = self.store.aggregate(stages).await?;

        let mut values: Vec<Bson> = Vec::with_capacity(documents.len());
        for mut document in documents {
            if let Some(value) = document.remove("_id") {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }
        values.truncate(n);
        Ok(values)
    }

    pub async fn random_years(&self, n: usize, extra_filters: Vec<Document>) -> AppResult<Vec<i32>> {
        let mut stages = extra_filters;
        stages.extend(self.year_restriction());

        let values = self.project_and_sample("anyo", n, stages).await?;
        Ok(values.iter().filter_map(bson_to_i32).collect())
    }

    /// Distinct years with at least `min_entries` restricted entries passing
    /// `extra_filters`, so entry-level questions about that year can fill
    /// their options.
    pub async fn random_entry_years(
        &self,
        n: usize,
        min_entries: i32,
        extra_filters: Vec<Document>,
    ) -> AppResult<Vec<i32>> {
        if n == 0 {
            return Ok(vec![]);
        }

        let size = n as i64;
        let mut stages = self.restricted_entries(extra_filters);
        stages.push(doc! { "$group": { "_id": "$anyo", "entradas": { "$sum": 1 } } });
        stages.push(doc! { "$match": { "entradas": { "$gte": min_entries } } });
        stages.push(doc! { "$sample": { "size": size } });

        let documents = self.store.aggregate(stages).await?;
        Ok(documents
            .iter()
            .filter_map(|document| document.get("_id").and_then(bson_to_i32))
            .collect())
    }

    pub async fn random_host_countries(
        &self,
        n: usize,
        extra_filters: Vec<Document>,
    ) -> AppResult<Vec<String>> {
        let mut stages = extra_filters;
        stages.extend(self.host_country_restriction());

        let values = self.project_and_sample("pais", n, stages).await?;
        Ok(strings(values))
    }

    pub async fn random_participant_countries(
        &self,
        n: usize,
        extra_filters: Vec<Document>,
    ) -> AppResult<Vec<String>> {
        self.random_entry_values("pais", n, extra_filters).await
    }

    /// Distinct values of one entry field (`pais`, `cancion`, `artista`...).
    pub async fn random_entry_values(
        &self,
        field: &str,
        n: usize,
        extra_filters: Vec<Document>,
    ) -> AppResult<Vec<String>> {
        let stages = self.restricted_entries(extra_filters);
        let values = self
            .project_and_sample(&format!("concursantes.{field}"), n, stages)
            .await?;
        Ok(strings(values))
    }

    pub async fn random_entries(
        &self,
        n: usize,
        extra_filters: Vec<Document>,
    ) -> AppResult<Vec<Entry>> {
        let stages = self.restricted_entries(extra_filters);
        let values = self.project_and_sample("concursantes", n, stages).await?;

        let mut entries = Vec::with_capacity(values.len());
        for value in values {
            if let Bson::Document(document) = value {
                entries.push(bson::from_document(document)?);
            }
        }
        Ok(entries)
    }

    pub async fn query(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> AppResult<Vec<Document>> {
        self.store.find(filter, projection).await
    }

    pub async fn aggregate(&self, stages: Vec<Document>) -> AppResult<Vec<Document>> {
        self.store.aggregate(stages).await
    }
}

/// Numeric BSON values as `i32`; years may be stored as any integer type.
pub(crate) fn bson_to_i32(value: &Bson) -> Option<i32> {
    match value {
        Bson::Int32(v) => Some(*v),
        Bson::Int64(v) => i32::try_from(*v).ok(),
        Bson::Double(v) if v.fract() == 0.0 => Some(*v as i32),
        _ => None,
    }
}

pub(crate) fn bson_to_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn strings(values: Vec<Bson>) -> Vec<String> {
    values
        .into_iter()
        .filter_map(|value| match value {
            Bson::String(text) => Some(text),
            _ => None,
        })
        .collect()
}
