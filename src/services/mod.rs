pub mod random;
pub mod recommendations;

pub use random::{FixedRandom, RandomSource, ThreadRandom};
pub use recommendations::RecommendationService;
