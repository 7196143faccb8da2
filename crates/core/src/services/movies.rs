use chrono::Utc;

use crate::db::DbPool;
use crate::error::{Error, Result};
use crate::models::{Movie, MovieRow};

pub struct MovieService {
    pool: DbPool,
}

impl MovieService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inserts a new record and reads it back so the caller sees the
    /// storage-assigned id, timestamp and initial version.
    pub async fn create(&self, movie: &Movie) -> Result<Movie> {
        let genres = serde_json::to_string(&movie.genres).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            r#"
            INSERT INTO movies (created_at, title, year, runtime, genres, version)
            VALUES (?, ?, ?, ?, ?, 1)
            "#,
        )
        .bind(Utc::now().to_rfc3339())
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime.minutes())
        .bind(genres)
        .execute(&self.pool)
        .await?;

        self.get_by_id(result.last_insert_rowid()).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Movie> {
        // Identifiers below 1 can never exist
        if id < 1 {
            return Err(Error::NotFound);
        }

        sqlx::query_as::<_, MovieRow>("SELECT * FROM movies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Movie::from)
            .ok_or(Error::NotFound)
    }

    /// Writes back every mutable field, guarded by the record version.
    /// A stale version is reported as an edit conflict.
    pub async fn update(&self, movie: &Movie) -> Result<Movie> {
        let genres = serde_json::to_string(&movie.genres).unwrap_or_else(|_| "[]".to_string());

        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = ?, year = ?, runtime = ?, genres = ?, version = version + 1
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime.minutes())
        .bind(genres)
        .bind(movie.id)
        .bind(movie.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Either the row is gone or someone else updated it first
            return match self.get_by_id(movie.id).await {
                Ok(_) => Err(Error::EditConflict),
                Err(e) => Err(e),
            };
        }

        self.get_by_id(movie.id).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if id < 1 {
            return Err(Error::NotFound);
        }

        let result = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }

        Ok(())
    }
}
