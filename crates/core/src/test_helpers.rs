//! Test helpers for creating in-memory test databases and fixtures

use crate::db::DbPool;
use sqlx::sqlite::SqlitePoolOptions;

/// Creates an in-memory SQLite database with all migrations applied
pub async fn create_test_db() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    sqlx::migrate!("./src/db/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Test fixtures for common test data
pub mod fixtures {
    use crate::models::{CreateMovie, Runtime};

    /// A create input that satisfies every validation rule.
    pub fn dark_knight() -> CreateMovie {
        CreateMovie {
            title: "The Dark Knight".to_string(),
            year: 2008,
            runtime: Runtime(152),
            genres: vec![
                "action".to_string(),
                "crime".to_string(),
                "drama".to_string(),
            ],
        }
    }
}
