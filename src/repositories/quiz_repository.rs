use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    Collection,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::SavedQuiz,
};

const DUPLICATE_KEY_CODE: i32 = 11000;

#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn create(&self, quiz: SavedQuiz) -> AppResult<SavedQuiz>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<SavedQuiz>>;
    async fn exists(&self, name: &str) -> AppResult<bool>;
    /// Newest first.
    async fn list_quizzes(&self, offset: i64, limit: i64) -> AppResult<(Vec<SavedQuiz>, i64)>;
}

pub struct MongoQuizRepository {
    collection: Collection<SavedQuiz>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn create(&self, quiz: SavedQuiz) -> AppResult<SavedQuiz> {
        // `_id` is the quiz name, so the primary key index rejects duplicates.
        match self.collection.insert_one(&quiz).await {
            Ok(_) => Ok(quiz),
            Err(err) if is_duplicate_key(&err) => Err(AppError::AlreadyExists(format!(
                "Quiz with name '{}' already exists",
                quiz.name
            ))),
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<SavedQuiz>> {
        let quiz = self.collection.find_one(doc! { "_id": name }).await?;
        Ok(quiz)
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "_id": name })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    async fn list_quizzes(&self, offset: i64, limit: i64) -> AppResult<(Vec<SavedQuiz>, i64)> {
        let total = self.collection.count_documents(doc! {}).await? as i64;

        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "creacion": -1 })
            .skip(offset.max(0) as u64)
            .limit(limit)
            .await?;
        let items: Vec<SavedQuiz> = cursor.try_collect().await?;

        Ok((items, total))
    }
}
