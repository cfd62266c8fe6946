use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mongodb::bson::{self, doc, Bson, Document};
use rand::seq::SliceRandom;
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Edition, SavedQuiz},
    repositories::{EditionRepository, QuizRepository},
};

/// Edition store backed by a vector of documents. Evaluates the subset of
/// the aggregation language the trivia queries emit.
pub struct InMemoryEditionRepository {
    documents: Vec<Document>,
}

impl InMemoryEditionRepository {
    pub fn new(editions: Vec<Edition>) -> Self {
        let documents = editions
            .iter()
            .map(|edition| bson::to_document(edition).expect("fixture editions serialize"))
            .collect();
        Self { documents }
    }
}

#[async_trait]
impl EditionRepository for InMemoryEditionRepository {
    async fn find(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> AppResult<Vec<Document>> {
        let mut stages = vec![doc! { "$match": filter }];
        if let Some(projection) = projection {
            stages.push(doc! { "$project": projection });
        }
        run_pipeline(self.documents.clone(), &stages)
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> AppResult<Vec<Document>> {
        run_pipeline(self.documents.clone(), &pipeline)
    }
}

fn unsupported(what: impl std::fmt::Display) -> AppError {
    AppError::InternalError(format!("in-memory store does not support {what}"))
}

fn run_pipeline(mut documents: Vec<Document>, stages: &[Document]) -> AppResult<Vec<Document>> {
    for stage in stages {
        let (operator, spec) = stage
            .iter()
            .next()
            .ok_or_else(|| unsupported("empty stages"))?;
        documents = match (operator.as_str(), spec) {
            ("$match", Bson::Document(filter)) => documents
                .into_iter()
                .filter(|document| matches_filter(document, filter))
                .collect(),
            ("$unwind", Bson::String(path)) => unwind(documents, field_path(path)?),
            ("$group", Bson::Document(spec)) => group(documents, spec)?,
            ("$project", Bson::Document(spec)) => {
                documents.iter().map(|document| project(document, spec)).collect()
            }
            ("$sort", Bson::Document(spec)) => {
                documents.sort_by(|a, b| compare_by(a, b, spec));
                documents
            }
            ("$sample", Bson::Document(spec)) => {
                let size = spec.get("size").and_then(as_f64).unwrap_or(0.0) as usize;
                documents.shuffle(&mut rand::thread_rng());
                documents.truncate(size);
                documents
            }
            ("$limit", value) => {
                documents.truncate(as_f64(value).unwrap_or(0.0) as usize);
                documents
            }
            ("$skip", value) => documents
                .into_iter()
                .skip(as_f64(value).unwrap_or(0.0) as usize)
                .collect(),
            (other, _) => return Err(unsupported(other)),
        };
    }
    Ok(documents)
}

fn field_path(expression: &str) -> AppResult<&str> {
    expression
        .strip_prefix('$')
        .ok_or_else(|| unsupported(format!("field expression '{expression}'")))
}

/// Every value reachable through a dotted path, descending into arrays the
/// way MongoDB does for queries.
fn resolve(value: &Bson, path: &[&str]) -> Vec<Bson> {
    match (path.split_first(), value) {
        (None, _) => vec![value.clone()],
        (Some(_), Bson::Array(items)) => items.iter().flat_map(|item| resolve(item, path)).collect(),
        (Some((head, rest)), Bson::Document(document)) => match document.get(*head) {
            Some(inner) => resolve(inner, rest),
            None => vec![],
        },
        _ => vec![],
    }
}

fn lookup(document: &Document, path: &str) -> Vec<Bson> {
    let segments: Vec<&str> = path.split('.').collect();
    resolve(&Bson::Document(document.clone()), &segments)
}

/// Single value at `path`, without array traversal. Used for expressions.
fn get_path(document: &Document, path: &str) -> Option<Bson> {
    let mut current = Bson::Document(document.clone());
    for segment in path.split('.') {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?.clone(),
            _ => return None,
        };
    }
    Some(current)
}

fn set_path(document: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        Some((head, rest)) => {
            if !matches!(document.get(head), Some(Bson::Document(_))) {
                document.insert(head, Document::new());
            }
            if let Some(Bson::Document(inner)) = document.get_mut(head) {
                set_path(inner, rest, value);
            }
        }
        None => {
            document.insert(path, value);
        }
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare_values(a: &Bson, b: &Bson) -> Ordering {
    fn rank(value: &Bson) -> u8 {
        match value {
            Bson::Null | Bson::Undefined => 0,
            Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => 1,
            Bson::String(_) => 2,
            _ => 3,
        }
    }
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => rank(a).cmp(&rank(b)),
        },
    }
}

fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(path, condition)| {
        let found = lookup(document, path);
        match condition {
            Bson::Document(operators) if operators.keys().all(|key| key.starts_with('$')) => {
                operators
                    .iter()
                    .all(|(operator, operand)| matches_operator(&found, operator, operand))
            }
            expected => matches_operator(&found, "$eq", expected),
        }
    })
}

fn matches_operator(found: &[Bson], operator: &str, operand: &Bson) -> bool {
    let is_null = |value: &Bson| matches!(value, Bson::Null);
    let equals = |expected: &Bson| {
        if is_null(expected) {
            found.is_empty() || found.iter().any(is_null)
        } else {
            found.iter().any(|value| values_equal(value, expected))
        }
    };
    let compare = |accept: fn(Ordering) -> bool| {
        found
            .iter()
            .any(|value| !is_null(value) && accept(compare_values(value, operand)))
    };
    let operands = || match operand {
        Bson::Array(items) => items.clone(),
        other => vec![other.clone()],
    };

    match operator {
        "$eq" => equals(operand),
        "$ne" => !equals(operand),
        "$in" => operands().iter().any(|candidate| equals(candidate)),
        "$nin" => !operands().iter().any(|candidate| equals(candidate)),
        "$gt" => compare(|o| o == Ordering::Greater),
        "$gte" => compare(|o| o != Ordering::Less),
        "$lt" => compare(|o| o == Ordering::Less),
        "$lte" => compare(|o| o != Ordering::Greater),
        "$exists" => found.is_empty() != matches!(operand, Bson::Boolean(true)),
        _ => false,
    }
}

fn unwind(documents: Vec<Document>, path: &str) -> Vec<Document> {
    let mut unwound = Vec::new();
    for document in documents {
        if let Some(Bson::Array(items)) = get_path(&document, path) {
            for item in items {
                let mut copy = document.clone();
                set_path(&mut copy, path, item);
                unwound.push(copy);
            }
        }
    }
    unwound
}

fn evaluate(document: &Document, expression: &Bson) -> Bson {
    match expression {
        Bson::String(text) if text.starts_with('$') => {
            get_path(document, &text[1..]).unwrap_or(Bson::Null)
        }
        other => other.clone(),
    }
}

fn group(documents: Vec<Document>, spec: &Document) -> AppResult<Vec<Document>> {
    let key_expression = spec.get("_id").cloned().unwrap_or(Bson::Null);

    let mut groups: Vec<(Bson, Vec<Document>)> = Vec::new();
    for document in documents {
        let key = evaluate(&document, &key_expression);
        match groups.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, members)) => members.push(document),
            None => groups.push((key, vec![document])),
        }
    }

    let mut output = Vec::with_capacity(groups.len());
    for (key, members) in groups {
        let mut row = doc! { "_id": key };
        for (field, accumulator) in spec.iter().filter(|(field, _)| field.as_str() != "_id") {
            let (operator, argument) = match accumulator {
                Bson::Document(accumulator) => accumulator
                    .iter()
                    .next()
                    .ok_or_else(|| unsupported("empty accumulator"))?,
                _ => return Err(unsupported(format!("accumulator for '{field}'"))),
            };
            let values: Vec<Bson> = members
                .iter()
                .map(|member| evaluate(member, argument))
                .filter(|value| !matches!(value, Bson::Null))
                .collect();
            let result = match operator.as_str() {
                "$first" => values.first().cloned().unwrap_or(Bson::Null),
                "$min" => values
                    .iter()
                    .min_by(|a, b| compare_values(a, b))
                    .cloned()
                    .unwrap_or(Bson::Null),
                "$max" => values
                    .iter()
                    .max_by(|a, b| compare_values(a, b))
                    .cloned()
                    .unwrap_or(Bson::Null),
                "$sum" => {
                    let total: f64 = values.iter().filter_map(as_f64).sum();
                    if values.iter().all(|value| matches!(value, Bson::Int32(_))) {
                        Bson::Int32(total as i32)
                    } else {
                        Bson::Double(total)
                    }
                }
                "$avg" => {
                    let numbers: Vec<f64> = values.iter().filter_map(as_f64).collect();
                    if numbers.is_empty() {
                        Bson::Null
                    } else {
                        Bson::Double(numbers.iter().sum::<f64>() / numbers.len() as f64)
                    }
                }
                other => return Err(unsupported(other)),
            };
            row.insert(field.as_str(), result);
        }
        output.push(row);
    }
    Ok(output)
}

fn project(document: &Document, spec: &Document) -> Document {
    let mut projected = Document::new();
    let hide_id = matches!(spec.get("_id"), Some(Bson::Int32(0)) | Some(Bson::Boolean(false)));
    if !hide_id {
        if let Some(id) = document.get("_id") {
            projected.insert("_id", id.clone());
        }
    }
    for (field, expression) in spec.iter().filter(|(field, _)| field.as_str() != "_id") {
        let value = match expression {
            Bson::Int32(1) | Bson::Boolean(true) => get_path(document, field),
            Bson::String(text) if text.starts_with('$') => get_path(document, &text[1..]),
            other => Some(other.clone()),
        };
        if let Some(value) = value {
            set_path(&mut projected, field, value);
        }
    }
    projected
}

fn compare_by(a: &Document, b: &Document, spec: &Document) -> Ordering {
    for (field, direction) in spec {
        let left = get_path(a, field).unwrap_or(Bson::Null);
        let right = get_path(b, field).unwrap_or(Bson::Null);
        let ordering = compare_values(&left, &right);
        let ordering = if as_f64(direction).unwrap_or(1.0) < 0.0 {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Saved quizzes keyed by name.
pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<String, SavedQuiz>>>,
}

impl InMemoryQuizRepository {
    pub fn new() -> Self {
        Self {
            quizzes: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn create(&self, quiz: SavedQuiz) -> AppResult<SavedQuiz> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.contains_key(&quiz.name) {
            return Err(AppError::AlreadyExists(format!(
                "Quiz with name '{}' already exists",
                quiz.name
            )));
        }
        quizzes.insert(quiz.name.clone(), quiz.clone());
        Ok(quiz)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<SavedQuiz>> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.get(name).cloned())
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        let quizzes = self.quizzes.read().await;
        Ok(quizzes.contains_key(name))
    }

    async fn list_quizzes(&self, offset: i64, limit: i64) -> AppResult<(Vec<SavedQuiz>, i64)> {
        let quizzes = self.quizzes.read().await;
        let mut items: Vec<_> = quizzes.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = items.len() as i64;
        let page = items
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }
}

pub mod fixtures {
    use super::*;
    use crate::models::domain::Entry;

    fn entry(
        country: &str,
        artist: &str,
        song: &str,
        ranking: i32,
        score: f64,
        video: Option<&str>,
    ) -> Entry {
        Entry {
            country_code: None,
            country: country.to_string(),
            artist: artist.to_string(),
            song: song.to_string(),
            ranking: Some(ranking),
            score: Some(score),
            video_url: video.map(str::to_string),
        }
    }

    fn edition(year: i32, host_country: &str, host_city: &str, entries: Vec<Entry>) -> Edition {
        Edition {
            year,
            host_country: host_country.to_string(),
            host_city: host_city.to_string(),
            entries,
        }
    }

    /// Five real editions, abridged. 1988 Francia and España have no video.
    pub fn eurovision_editions() -> Vec<Edition> {
        vec![
            edition(1988, "Irlanda", "Dublín", vec![
                entry("Suiza", "Céline Dion", "Ne partez pas sans moi", 1, 137.0, Some("https://youtu.be/2ODIKHwzYRE")),
                entry("Reino Unido", "Scott Fitzgerald", "Go", 2, 136.0, Some("https://youtu.be/0AwZ2C3rCko")),
                entry("España", "La Década Prodigiosa", "La chica que yo quiero", 11, 58.0, None),
                entry("Francia", "Gérard Lenorman", "Chanteur de charme", 10, 64.0, None),
                entry("Suecia", "Tommy Körberg", "Stad i ljus", 12, 52.0, Some("https://www.youtube.com/watch?v=xRNrv4xWlD0")),
            ]),
            edition(1990, "Yugoslavia", "Zagreb", vec![
                entry("Italia", "Toto Cutugno", "Insieme: 1992", 1, 149.0, Some("https://youtu.be/Mt9p0tSmL1A")),
                entry("Francia", "Joëlle Ursull", "White and Black Blues", 2, 132.0, Some("https://youtu.be/R-DzkrN9g5w")),
                entry("Irlanda", "Liam Reilly", "Somewhere in Europe", 2, 132.0, Some("https://youtu.be/MHmMmm1zvN0")),
                entry("España", "Azúcar Moreno", "Bandido", 5, 96.0, Some("https://youtu.be/jRF3KFtsZKY")),
                entry("Suecia", "Edin-Ådahl", "Som en vind", 16, 24.0, None),
            ]),
            edition(1995, "Irlanda", "Dublín", vec![
                entry("Noruega", "Secret Garden", "Nocturne", 1, 148.0, Some("https://youtu.be/ZGmd1ZMJf3U")),
                entry("España", "Anabel Conde", "Vuelve conmigo", 2, 119.0, Some("https://youtu.be/zyL2PRfIsZY")),
                entry("Suecia", "Jan Johansen", "Se på mig", 3, 100.0, Some("https://youtu.be/nV1JctiMcI8")),
                entry("Francia", "Nathalie Santamaria", "Il me donne rendez-vous", 4, 94.0, None),
                entry("Reino Unido", "Love City Groove", "Love City Groove", 10, 76.0, Some("https://youtu.be/RlI-jpVwsvY")),
            ]),
            edition(2000, "Suecia", "Estocolmo", vec![
                entry("Dinamarca", "Olsen Brothers", "Fly on the Wings of Love", 1, 195.0, Some("https://youtu.be/NwOvu-j_WjY")),
                entry("Rusia", "Alsou", "Solo", 2, 155.0, Some("https://youtu.be/KJ2SN3yfvSw")),
                entry("Irlanda", "Eamonn Toal", "Millennium of Love", 6, 92.0, None),
                entry("Suecia", "Roger Pontare", "When Spirits Are Calling My Name", 7, 88.0, Some("https://youtu.be/6Lz6nT8aWd4")),
                entry("España", "Serafín Zubiri", "Colgado de un sueño", 18, 18.0, Some("https://youtu.be/9kAZ0C0QnB8")),
                entry("Francia", "Sofia Mestari", "On aura le ciel", 23, 5.0, Some("https://youtu.be/4kFZV0hF0U4")),
            ]),
            edition(2005, "Ucrania", "Kiev", vec![
                entry("Grecia", "Helena Paparizou", "My Number One", 1, 230.0, Some("https://youtu.be/ds8mLWnXqQc")),
                entry("Malta", "Chiara", "Angel", 2, 192.0, Some("https://youtu.be/hS0ZbZP8vAs")),
                entry("Rumanía", "Luminița Anghel & Sistem", "Let Me Try", 3, 158.0, Some("https://youtu.be/LQ-Hc4xUYhQ")),
                entry("Suecia", "Martin Stenmarck", "Las Vegas", 19, 30.0, Some("https://youtu.be/J3k2cYdJuZs")),
                entry("España", "Son de Sol", "Brujería", 21, 28.0, Some("https://youtu.be/7w7d6hUJQ4c")),
                entry("Francia", "Ortal", "Chacun pense à soi", 23, 11.0, Some("https://youtu.be/pN7u0b1QvR8")),
            ]),
        ]
    }

    pub fn editions_store() -> Arc<dyn EditionRepository> {
        Arc::new(InMemoryEditionRepository::new(eurovision_editions()))
    }

    const SYNTHETIC_COUNTRIES: [&str; 8] = [
        "Suecia",
        "Italia",
        "Irlanda",
        "Francia",
        "Reino Unido",
        "Noruega",
        "España",
        "Países Bajos",
    ];

    /// Irlanda joins later than the others, so selections from 1960 onwards
    /// still contain a debut.
    const LATE_DEBUT: (&str, i32) = ("Irlanda", 1960);

    /// `count` consecutive editions from 1956 in which the same eight
    /// countries take part (Irlanda from 1960), every entry with a video.
    pub fn synthetic_editions(count: usize) -> Vec<Edition> {
        (0..count)
            .map(|offset| {
                let year = 1956 + offset as i32;
                let entries = SYNTHETIC_COUNTRIES
                    .iter()
                    .enumerate()
                    .filter(|(_, country)| **country != LATE_DEBUT.0 || year >= LATE_DEBUT.1)
                    .map(|(index, country)| {
                        let ranking = ((index + offset) % SYNTHETIC_COUNTRIES.len()) as i32 + 1;
                        Entry {
                            country_code: None,
                            country: country.to_string(),
                            artist: format!("Artista {country} {year}"),
                            song: format!("Canción {country} {year}"),
                            ranking: Some(ranking),
                            score: Some(f64::from((9 - ranking) * 10 + index as i32)),
                            video_url: Some(format!(
                                "https://www.youtube.com/watch?v=ev{year}x{index}"
                            )),
                        }
                    })
                    .collect();
                edition(
                    year,
                    SYNTHETIC_COUNTRIES[offset % SYNTHETIC_COUNTRIES.len()],
                    &format!("Sede {year}"),
                    entries,
                )
            })
            .collect()
    }

    pub fn synthetic_store(count: usize) -> Arc<dyn EditionRepository> {
        Arc::new(InMemoryEditionRepository::new(synthetic_editions(count)))
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[tokio::test]
    async fn pipeline_subset_behaves_like_the_server() {
        let store = InMemoryEditionRepository::new(eurovision_editions());

        let rows = store
            .aggregate(vec![
                doc! { "$unwind": "$concursantes" },
                doc! { "$match": { "concursantes.pais": "España" } },
                doc! { "$group": { "_id": "$concursantes.pais", "primero": { "$min": "$anyo" } } },
            ])
            .await
            .expect("pipeline runs");

        assert_eq!(rows, vec![doc! { "_id": "España", "primero": 1988 }]);
    }

    #[tokio::test]
    async fn find_matches_inside_arrays() {
        let store = InMemoryEditionRepository::new(eurovision_editions());

        let rows = store
            .find(doc! { "concursantes.pais": "Noruega" }, Some(doc! { "_id": 0, "anyo": 1 }))
            .await
            .expect("find runs");

        assert_eq!(rows, vec![doc! { "anyo": 1995 }]);
    }

    #[test]
    fn fixtures_have_expected_shape() {
        assert_eq!(eurovision_editions().len(), 5);

        let synthetic = synthetic_editions(60);
        assert_eq!(synthetic.len(), 60);
        assert_eq!(synthetic[0].year, 1956);
        assert_eq!(synthetic[59].year, 2015);
        assert_eq!(synthetic[0].entries.len(), 7);
        assert_eq!(synthetic[4].entries.len(), 8);
        assert!(synthetic
            .iter()
            .all(|edition| edition.entries.iter().all(|entry| entry.has_video())));
    }
}
