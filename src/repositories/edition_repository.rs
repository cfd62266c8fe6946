use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::Document, Collection};

use crate::{db::Database, errors::AppResult};

/// Read-only access to the contest editions. Trivia generation never writes
/// through this trait.
#[async_trait]
pub trait EditionRepository: Send + Sync {
    async fn find(&self, filter: Document, projection: Option<Document>)
        -> AppResult<Vec<Document>>;
    async fn aggregate(&self, pipeline: Vec<Document>) -> AppResult<Vec<Document>>;
}

pub struct MongoEditionRepository {
    collection: Collection<Document>,
}

impl MongoEditionRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl EditionRepository for MongoEditionRepository {
    async fn find(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> AppResult<Vec<Document>> {
        let cursor = match projection {
            Some(projection) => self.collection.find(filter).projection(projection).await?,
            None => self.collection.find(filter).await?,
        };
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn aggregate(&self, pipeline: Vec<Document>) -> AppResult<Vec<Document>> {
        log::trace!("Running aggregation: {:?}", pipeline);
        let cursor = self.collection.aggregate(pipeline).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }
}
