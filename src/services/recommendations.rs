use std::sync::Arc;

use crate::{
    db::RecommendationRepository,
    error::{AppError, AppResult, DUPLICATE_NAME_MESSAGE},
    models::{NewRecommendation, Recommendation, ScoreFilter},
    services::random::RandomSource,
};

/// Number of recommendations returned by `list` when no limit is given
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Recommendations scoring strictly above this belong to the high tier
pub const HIGH_TIER_THRESHOLD: i32 = 10;

/// Share of random draws that prefer the low tier
pub const LOW_TIER_PROBABILITY: f64 = 0.7;

/// A downvote leaving the score strictly below this removes the recommendation
pub const REMOVAL_THRESHOLD: i32 = -5;

/// Score band used by the weighted random draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Low,
    High,
}

impl Tier {
    /// Tier preferred for a draw value in `[0, 1)`
    pub fn for_draw(value: f64) -> Self {
        if value < LOW_TIER_PROBABILITY {
            Tier::Low
        } else {
            Tier::High
        }
    }

    pub fn other(self) -> Self {
        match self {
            Tier::Low => Tier::High,
            Tier::High => Tier::Low,
        }
    }

    pub fn filter(self) -> ScoreFilter {
        match self {
            Tier::Low => ScoreFilter::AtMost(HIGH_TIER_THRESHOLD),
            Tier::High => ScoreFilter::GreaterThan(HIGH_TIER_THRESHOLD),
        }
    }
}

/// Maps a value in `[0, 1)` onto an index in `[0, len)`
fn pick_index(value: f64, len: usize) -> usize {
    ((value * len as f64) as usize).min(len.saturating_sub(1))
}

/// Scoring and selection rules for recommendations
///
/// Holds no state of its own; every call reads from and writes to the
/// repository, so clones share the same view of the data.
#[derive(Clone)]
pub struct RecommendationService {
    repository: Arc<dyn RecommendationRepository>,
    random: Arc<dyn RandomSource>,
}

impl RecommendationService {
    pub fn new(repository: Arc<dyn RecommendationRepository>, random: Arc<dyn RandomSource>) -> Self {
        Self { repository, random }
    }

    /// Creates a recommendation with a score of 0
    ///
    /// Fails with `Conflict` without writing anything if the name is taken.
    pub async fn insert(&self, recommendation: NewRecommendation) -> AppResult<Recommendation> {
        if self
            .repository
            .find_by_name(&recommendation.name)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(DUPLICATE_NAME_MESSAGE.to_string()));
        }

        self.repository.create(recommendation).await
    }

    /// Adds one point to the score
    pub async fn upvote(&self, id: i64) -> AppResult<Recommendation> {
        self.get_by_id(id).await?;
        self.repository.update_score(id, 1).await
    }

    /// Removes one point from the score, deleting the recommendation once it
    /// drops below the removal threshold
    ///
    /// The update and the delete are two separate storage calls. If the process
    /// stops in between, the record remains with a score below the threshold
    /// and the next downvote removes it.
    pub async fn downvote(&self, id: i64) -> AppResult<Recommendation> {
        self.get_by_id(id).await?;
        let updated = self.repository.update_score(id, -1).await?;

        if updated.score < REMOVAL_THRESHOLD {
            self.repository.delete(id).await?;
            tracing::info!(id, score = updated.score, "Recommendation removed after downvote");
        }

        Ok(updated)
    }

    /// Most recent recommendations, newest first
    pub async fn list(&self, limit: Option<u32>) -> AppResult<Vec<Recommendation>> {
        self.repository
            .list_recent(limit.unwrap_or(DEFAULT_LIST_LIMIT))
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Recommendation> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recommendation {} not found", id)))
    }

    /// Up to `amount` recommendations, highest score first
    pub async fn get_top(&self, amount: u32) -> AppResult<Vec<Recommendation>> {
        self.repository.list_top(amount).await
    }

    /// Weighted random pick across the low and high score tiers
    ///
    /// 70% of draws prefer the low tier (`score <= 10`) and 30% the high tier
    /// (`score > 10`). When the preferred tier is empty the other one is used.
    /// Within a tier every recommendation is equally likely.
    pub async fn get_random(&self) -> AppResult<Recommendation> {
        let preferred = Tier::for_draw(self.random.uniform());

        let mut candidates = self.repository.find_all(Some(preferred.filter())).await?;
        if candidates.is_empty() {
            candidates = self
                .repository
                .find_all(Some(preferred.other().filter()))
                .await?;
        }

        if candidates.is_empty() {
            return Err(AppError::NotFound("No recommendations available".to_string()));
        }

        let index = pick_index(self.random.uniform(), candidates.len());
        tracing::debug!(
            tier = ?preferred,
            candidates = candidates.len(),
            index,
            "Random recommendation drawn"
        );

        Ok(candidates.swap_remove(index))
    }

    /// Deletes every recommendation
    pub async fn reset(&self) -> AppResult<u64> {
        let removed = self.repository.delete_all().await?;
        tracing::warn!(removed, "All recommendations deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockRecommendationRepository;
    use crate::services::random::FixedRandom;
    use chrono::Utc;
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    const LINK: &str = "https://www.youtube.com/watch?v=U0d0xpjCjWo";

    fn recommendation(id: i64, score: i32) -> Recommendation {
        Recommendation {
            id,
            name: format!("recommendation {}", id),
            youtube_link: LINK.to_string(),
            score,
            created_at: Utc::now(),
        }
    }

    fn build_service(repository: MockRecommendationRepository, draws: Vec<f64>) -> RecommendationService {
        RecommendationService::new(Arc::new(repository), Arc::new(FixedRandom::new(draws)))
    }

    #[tokio::test]
    async fn test_insert_creates_recommendation() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_by_name()
            .withf(|name| name == "Falamansa")
            .times(1)
            .returning(|_| Ok(None));
        repository
            .expect_create()
            .times(1)
            .returning(|new| {
                let mut created = recommendation(1, 0);
                created.name = new.name;
                Ok(created)
            });

        let service = build_service(repository, vec![0.0]);
        let created = assert_ok!(service.insert(NewRecommendation::new("Falamansa", LINK)).await);

        assert_eq!(created.name, "Falamansa");
        assert_eq!(created.score, 0);
    }

    #[tokio::test]
    async fn test_insert_duplicate_name_conflicts_without_writing() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_by_name()
            .times(1)
            .returning(|_| Ok(Some(recommendation(1, 0))));
        repository.expect_create().times(0);

        let service = build_service(repository, vec![0.0]);
        let error = assert_err!(service.insert(NewRecommendation::new("taken", LINK)).await);

        match error {
            AppError::Conflict(message) => assert_eq!(message, DUPLICATE_NAME_MESSAGE),
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upvote_adds_one_point() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(recommendation(1, 5))));
        repository
            .expect_update_score()
            .with(eq(1), eq(1))
            .times(1)
            .returning(|_, _| Ok(recommendation(1, 6)));
        repository.expect_delete().times(0);

        let service = build_service(repository, vec![0.0]);
        let updated = assert_ok!(service.upvote(1).await);
        assert_eq!(updated.score, 6);
    }

    #[tokio::test]
    async fn test_upvote_never_removes_high_scores() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_| Ok(Some(recommendation(3, -9))));
        repository
            .expect_update_score()
            .returning(|_, _| Ok(recommendation(3, -8)));
        repository.expect_delete().times(0);

        let service = build_service(repository, vec![0.0]);
        assert_eq!(assert_ok!(service.upvote(3).await).score, -8);
    }

    #[tokio::test]
    async fn test_votes_on_missing_id_are_not_found() {
        let mut repository = MockRecommendationRepository::new();
        repository.expect_find_by_id().returning(|_| Ok(None));
        repository.expect_update_score().times(0);
        repository.expect_delete().times(0);

        let service = build_service(repository, vec![0.0]);

        assert!(matches!(service.upvote(100).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.downvote(100).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.get_by_id(100).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_downvote_keeps_recommendation_at_threshold() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_| Ok(Some(recommendation(1, -4))));
        repository
            .expect_update_score()
            .with(eq(1), eq(-1))
            .times(1)
            .returning(|_, _| Ok(recommendation(1, -5)));
        repository.expect_delete().times(0);

        let service = build_service(repository, vec![0.0]);
        assert_eq!(assert_ok!(service.downvote(1).await).score, -5);
    }

    #[tokio::test]
    async fn test_downvote_below_threshold_removes_recommendation() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_by_id()
            .returning(|_| Ok(Some(recommendation(1, -5))));
        repository
            .expect_update_score()
            .times(1)
            .returning(|_, _| Ok(recommendation(1, -6)));
        repository
            .expect_delete()
            .with(eq(1))
            .times(1)
            .returning(|_| Ok(()));

        let service = build_service(repository, vec![0.0]);
        assert_eq!(assert_ok!(service.downvote(1).await).score, -6);
    }

    #[tokio::test]
    async fn test_list_defaults_to_ten() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_list_recent()
            .with(eq(DEFAULT_LIST_LIMIT))
            .times(1)
            .returning(|_| Ok(vec![recommendation(2, 0), recommendation(1, 0)]));
        repository
            .expect_list_recent()
            .with(eq(3))
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = build_service(repository, vec![0.0]);
        assert_eq!(assert_ok!(service.list(None).await).len(), 2);
        assert!(assert_ok!(service.list(Some(3)).await).is_empty());
    }

    #[tokio::test]
    async fn test_get_top_passes_amount_through() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_list_top()
            .with(eq(0))
            .times(1)
            .returning(|_| Ok(vec![]));

        let service = build_service(repository, vec![0.0]);
        assert!(assert_ok!(service.get_top(0).await).is_empty());
    }

    #[tokio::test]
    async fn test_get_random_prefers_low_tier_below_seventy_percent() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_all()
            .with(eq(Some(ScoreFilter::AtMost(HIGH_TIER_THRESHOLD))))
            .times(1)
            .returning(|_| Ok(vec![recommendation(1, 5)]));

        let service = build_service(repository, vec![0.5, 0.0]);
        assert_eq!(assert_ok!(service.get_random().await).score, 5);
    }

    #[tokio::test]
    async fn test_get_random_prefers_high_tier_from_seventy_percent() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_all()
            .with(eq(Some(ScoreFilter::GreaterThan(HIGH_TIER_THRESHOLD))))
            .times(1)
            .returning(|_| Ok(vec![recommendation(2, 100)]));

        let service = build_service(repository, vec![0.7, 0.0]);
        assert_eq!(assert_ok!(service.get_random().await).score, 100);

        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_all()
            .with(eq(Some(ScoreFilter::GreaterThan(HIGH_TIER_THRESHOLD))))
            .times(1)
            .returning(|_| Ok(vec![recommendation(2, 100)]));

        let service = build_service(repository, vec![0.9, 0.0]);
        assert_eq!(assert_ok!(service.get_random().await).score, 100);
    }

    #[tokio::test]
    async fn test_get_random_falls_back_to_high_tier() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_all()
            .with(eq(Some(ScoreFilter::AtMost(HIGH_TIER_THRESHOLD))))
            .times(1)
            .returning(|_| Ok(vec![]));
        repository
            .expect_find_all()
            .with(eq(Some(ScoreFilter::GreaterThan(HIGH_TIER_THRESHOLD))))
            .times(1)
            .returning(|_| Ok(vec![recommendation(1, 100), recommendation(2, 200)]));

        let service = build_service(repository, vec![0.5, 0.99]);
        assert_eq!(assert_ok!(service.get_random().await).score, 200);
    }

    #[tokio::test]
    async fn test_get_random_falls_back_to_low_tier() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_all()
            .with(eq(Some(ScoreFilter::GreaterThan(HIGH_TIER_THRESHOLD))))
            .times(1)
            .returning(|_| Ok(vec![]));
        repository
            .expect_find_all()
            .with(eq(Some(ScoreFilter::AtMost(HIGH_TIER_THRESHOLD))))
            .times(1)
            .returning(|_| Ok(vec![recommendation(1, 5), recommendation(2, 10)]));

        let service = build_service(repository, vec![0.9, 0.0]);
        assert_eq!(assert_ok!(service.get_random().await).score, 5);
    }

    #[tokio::test]
    async fn test_get_random_on_empty_store_is_not_found() {
        let mut repository = MockRecommendationRepository::new();
        repository.expect_find_all().times(2).returning(|_| Ok(vec![]));

        let service = build_service(repository, vec![0.3]);
        assert!(matches!(service.get_random().await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let mut repository = MockRecommendationRepository::new();
        repository
            .expect_find_by_name()
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let service = build_service(repository, vec![0.0]);
        let result = service.insert(NewRecommendation::new("any", LINK)).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[test]
    fn test_tier_for_draw() {
        assert_eq!(Tier::for_draw(0.0), Tier::Low);
        assert_eq!(Tier::for_draw(0.69), Tier::Low);
        assert_eq!(Tier::for_draw(0.7), Tier::High);
        assert_eq!(Tier::for_draw(0.99), Tier::High);
        assert_eq!(Tier::Low.other(), Tier::High);
    }

    #[test]
    fn test_pick_index_covers_range() {
        assert_eq!(pick_index(0.0, 4), 0);
        assert_eq!(pick_index(0.5, 4), 2);
        assert_eq!(pick_index(0.999_999, 4), 3);
        assert_eq!(pick_index(0.999_999, 1), 0);
    }
}
