use std::sync::Arc;

use crate::db::{InMemoryRecommendationRepository, RecommendationRepository};
use crate::services::{RandomSource, RecommendationService, ThreadRandom};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommendations: RecommendationService,
    /// Mounts `POST /recommendations/reset`
    pub enable_test_routes: bool,
}

impl AppState {
    pub fn new(recommendations: RecommendationService) -> Self {
        Self {
            recommendations,
            enable_test_routes: false,
        }
    }

    /// Builds state over the given storage and randomness
    pub fn from_parts(
        repository: Arc<dyn RecommendationRepository>,
        random: Arc<dyn RandomSource>,
    ) -> Self {
        Self::new(RecommendationService::new(repository, random))
    }

    /// Process-local storage with thread randomness
    pub fn in_memory() -> Self {
        Self::from_parts(
            Arc::new(InMemoryRecommendationRepository::new()),
            Arc::new(ThreadRandom),
        )
    }

    pub fn with_test_routes(mut self, enabled: bool) -> Self {
        self.enable_test_routes = enabled;
        self
    }
}
