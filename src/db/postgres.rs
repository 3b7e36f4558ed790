use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    error::{AppError, AppResult, DUPLICATE_NAME_MESSAGE},
    models::{NewRecommendation, Recommendation, ScoreFilter},
};

use super::RecommendationRepository;

const SELECT_COLUMNS: &str = "SELECT id, name, youtube_link, score, created_at FROM recommendations";

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// PostgreSQL-backed recommendation storage
#[derive(Clone)]
pub struct PgRecommendationRepository {
    pool: PgPool,
}

impl PgRecommendationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.is_unique_violation() {
            return AppError::Conflict(DUPLICATE_NAME_MESSAGE.to_string());
        }
    }
    AppError::Database(error)
}

#[async_trait::async_trait]
impl RecommendationRepository for PgRecommendationRepository {
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Recommendation>> {
        let row = sqlx::query_as::<_, Recommendation>(&format!("{SELECT_COLUMNS} WHERE name = $1"))
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Recommendation>> {
        let row = sqlx::query_as::<_, Recommendation>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, recommendation: NewRecommendation) -> AppResult<Recommendation> {
        sqlx::query_as::<_, Recommendation>(
            r#"
            INSERT INTO recommendations (name, youtube_link)
            VALUES ($1, $2)
            RETURNING id, name, youtube_link, score, created_at
            "#,
        )
        .bind(&recommendation.name)
        .bind(&recommendation.youtube_link)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn update_score(&self, id: i64, delta: i32) -> AppResult<Recommendation> {
        sqlx::query_as::<_, Recommendation>(
            r#"
            UPDATE recommendations
            SET score = score + $2
            WHERE id = $1
            RETURNING id, name, youtube_link, score, created_at
            "#,
        )
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recommendation {} not found", id)))
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM recommendations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> AppResult<Vec<Recommendation>> {
        let rows = sqlx::query_as::<_, Recommendation>(&format!(
            "{SELECT_COLUMNS} ORDER BY id DESC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_top(&self, limit: u32) -> AppResult<Vec<Recommendation>> {
        let rows = sqlx::query_as::<_, Recommendation>(&format!(
            "{SELECT_COLUMNS} ORDER BY score DESC, id ASC LIMIT $1"
        ))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_all(&self, filter: Option<ScoreFilter>) -> AppResult<Vec<Recommendation>> {
        let rows = match filter {
            Some(ScoreFilter::GreaterThan(threshold)) => {
                sqlx::query_as::<_, Recommendation>(&format!(
                    "{SELECT_COLUMNS} WHERE score > $1 ORDER BY id"
                ))
                .bind(threshold)
                .fetch_all(&self.pool)
                .await?
            }
            Some(ScoreFilter::AtMost(threshold)) => {
                sqlx::query_as::<_, Recommendation>(&format!(
                    "{SELECT_COLUMNS} WHERE score <= $1 ORDER BY id"
                ))
                .bind(threshold)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Recommendation>(&format!("{SELECT_COLUMNS} ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows)
    }

    async fn delete_all(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM recommendations")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
