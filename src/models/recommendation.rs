use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named link to video content that users vote on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: i64,
    pub name: String,
    pub youtube_link: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

/// Data required to create a recommendation; storage assigns id, score and timestamp
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecommendation {
    pub name: String,
    pub youtube_link: String,
}

impl NewRecommendation {
    pub fn new(name: impl Into<String>, youtube_link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            youtube_link: youtube_link.into(),
        }
    }
}

/// Score predicate used to select a subset of recommendations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreFilter {
    /// `score > threshold`
    GreaterThan(i32),
    /// `score <= threshold`
    AtMost(i32),
}

impl ScoreFilter {
    /// Returns true if the given score satisfies the predicate
    pub fn matches(&self, score: i32) -> bool {
        match *self {
            ScoreFilter::GreaterThan(threshold) => score > threshold,
            ScoreFilter::AtMost(threshold) => score <= threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_serializes_camel_case() {
        let recommendation = Recommendation {
            id: 7,
            name: "Falamansa - Xote dos Milagres".to_string(),
            youtube_link: "https://www.youtube.com/watch?v=chwyjJbcs1Y".to_string(),
            score: 3,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&recommendation).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(
            json["youtubeLink"],
            "https://www.youtube.com/watch?v=chwyjJbcs1Y"
        );
        assert_eq!(json["score"], 3);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_score_filter_boundaries() {
        let high = ScoreFilter::GreaterThan(10);
        let low = ScoreFilter::AtMost(10);

        assert!(!high.matches(10));
        assert!(high.matches(11));
        assert!(low.matches(10));
        assert!(low.matches(-5));
        assert!(!low.matches(11));
    }
}
