use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult, DUPLICATE_NAME_MESSAGE},
    models::{NewRecommendation, Recommendation, ScoreFilter},
};

use super::RecommendationRepository;

/// Process-local recommendation storage
///
/// Records are kept in insertion order, which doubles as id order. Each trait
/// method takes the lock once, so every operation is atomic with respect to
/// the others.
#[derive(Default)]
pub struct InMemoryRecommendationRepository {
    inner: RwLock<Store>,
}

#[derive(Default)]
struct Store {
    last_id: i64,
    records: Vec<Recommendation>,
}

impl InMemoryRecommendationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RecommendationRepository for InMemoryRecommendationRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Recommendation>> {
        let store = self.inner.read().await;
        Ok(store.records.iter().find(|r| r.name == name).cloned())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Recommendation>> {
        let store = self.inner.read().await;
        Ok(store.records.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, recommendation: NewRecommendation) -> AppResult<Recommendation> {
        let mut store = self.inner.write().await;

        if store.records.iter().any(|r| r.name == recommendation.name) {
            return Err(AppError::Conflict(DUPLICATE_NAME_MESSAGE.to_string()));
        }

        store.last_id += 1;
        let created = Recommendation {
            id: store.last_id,
            name: recommendation.name,
            youtube_link: recommendation.youtube_link,
            score: 0,
            created_at: Utc::now(),
        };
        store.records.push(created.clone());

        Ok(created)
    }

    async fn update_score(&self, id: i64, delta: i32) -> AppResult<Recommendation> {
        let mut store = self.inner.write().await;
        let record = store
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Recommendation {} not found", id)))?;

        record.score += delta;
        Ok(record.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let mut store = self.inner.write().await;
        store.records.retain(|r| r.id != id);
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> AppResult<Vec<Recommendation>> {
        let store = self.inner.read().await;
        Ok(store
            .records
            .iter()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_top(&self, limit: u32) -> AppResult<Vec<Recommendation>> {
        let store = self.inner.read().await;
        let mut ranked = store.records.clone();
        // Stable sort keeps insertion order among equal scores
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(limit as usize);
        Ok(ranked)
    }

    async fn find_all(&self, filter: Option<ScoreFilter>) -> AppResult<Vec<Recommendation>> {
        let store = self.inner.read().await;
        Ok(store
            .records
            .iter()
            .filter(|r| filter.map_or(true, |f| f.matches(r.score)))
            .cloned()
            .collect())
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let mut store = self.inner.write().await;
        let removed = store.records.len() as u64;
        store.records.clear();
        Ok(removed)
    }
}
