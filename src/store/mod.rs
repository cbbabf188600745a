//! Recipe storage.
//!
//! Handlers talk to the datastore through the [`RecipeStore`] trait. The production
//! implementation, [`MySqlStore`], opens a fresh connection for every operation and
//! releases it before returning, so no connection outlives the request that used it.
//!
//! Rows are decoded by column name into [`Recipe`]; nothing is cached between requests.

mod config;
#[cfg(test)]
pub(crate) mod memory;
mod mysql;
pub mod schema;

pub use config::{DatabaseConfig, ReadinessConfig};
pub use mysql::MySqlStore;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// A persisted recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i32,
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable recipe fields, as submitted by the add and edit forms.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeForm {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
}

/// Current time at the precision of a MySQL `TIMESTAMP` column.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database configuration error: {0}")]
    Config(#[from] envy::Error),

    #[error("Database connection failed: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("Database connection timed out after {0} seconds")]
    ConnectTimeout(u64),

    #[error("Database query failed: {0}")]
    Query(#[from] sqlx::Error),
}

impl StoreError {
    /// Whether the datastore could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, StoreError::Connect(_) | StoreError::ConnectTimeout(_))
    }
}

/// Access to the `recipes` table.
///
/// Every operation runs exactly one statement with auto-commit. Concurrent writes to
/// the same recipe are not coordinated; the last writer wins.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Creates the `recipes` table if it does not exist. Safe to call on every start.
    async fn init_schema(&self) -> Result<(), StoreError>;

    /// All recipes, in the datastore's default order.
    async fn list(&self) -> Result<Vec<Recipe>, StoreError>;

    async fn get(&self, id: i32) -> Result<Option<Recipe>, StoreError>;

    /// Inserts a recipe with `created_at` and `updated_at` both set to `now`.
    /// Returns the generated id.
    async fn create(&self, recipe: &RecipeForm, now: DateTime<Utc>) -> Result<i32, StoreError>;

    /// Replaces the editable fields and sets `updated_at` to `now`.
    /// Returns the number of rows changed, which is zero for an unknown id.
    async fn update(
        &self,
        id: i32,
        recipe: &RecipeForm,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError>;

    /// Hard-deletes a recipe. Deleting an unknown id is not an error.
    async fn delete(&self, id: i32) -> Result<u64, StoreError>;

    /// Readiness check: opens and immediately closes a throwaway connection.
    async fn ping(&self) -> Result<(), StoreError>;
}
