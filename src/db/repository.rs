use crate::{
    error::AppResult,
    models::{NewRecommendation, Recommendation, ScoreFilter},
};

/// Storage capability for recommendations
///
/// Every method is a single atomic operation against the backing store. Business
/// rules (uniqueness checks before insert, the downvote purge, random selection)
/// live in `RecommendationService`, not here.
///
/// # Implementations
///
/// - [`super::PgRecommendationRepository`] - PostgreSQL
/// - [`super::InMemoryRecommendationRepository`] - process-local store
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationRepository: Send + Sync {
    /// Finds a recommendation by its exact (case-sensitive) name
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Recommendation>>;

    /// Finds a recommendation by id
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Recommendation>>;

    /// Persists a new recommendation with a score of 0
    ///
    /// Returns [`crate::error::AppError::Conflict`] if the name is already taken.
    async fn create(&self, recommendation: NewRecommendation) -> AppResult<Recommendation>;

    /// Atomically adds `delta` to the score and returns the updated record
    ///
    /// Returns [`crate::error::AppError::NotFound`] if no record has this id.
    async fn update_score(&self, id: i64, delta: i32) -> AppResult<Recommendation>;

    /// Deletes a recommendation by id. Deleting a missing id is not an error.
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Most recently created recommendations, newest first
    async fn list_recent(&self, limit: u32) -> AppResult<Vec<Recommendation>>;

    /// Highest scored recommendations, ties in insertion order
    async fn list_top(&self, limit: u32) -> AppResult<Vec<Recommendation>>;

    /// All recommendations matching the score predicate, or every record when `None`
    async fn find_all(&self, filter: Option<ScoreFilter>) -> AppResult<Vec<Recommendation>>;

    /// Removes every recommendation, returning how many were deleted
    async fn delete_all(&self) -> AppResult<u64>;
}
