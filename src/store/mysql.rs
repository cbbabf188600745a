//! MySQL-backed [`RecipeStore`] with one connection per operation.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Connection, MySqlConnection};
use tracing::instrument;

use super::{
    schema, DatabaseConfig, ReadinessConfig, Recipe, RecipeForm, RecipeStore, StoreError,
};
use crate::config::READINESS_CONNECT_TIMEOUT_SECS;

const SELECT_ALL: &str =
    "SELECT id, title, ingredients, instructions, created_at, updated_at FROM recipes";

const SELECT_BY_ID: &str = "SELECT id, title, ingredients, instructions, created_at, updated_at \
     FROM recipes WHERE id = ?";

const INSERT: &str = "INSERT INTO recipes (title, ingredients, instructions, created_at, updated_at) \
     VALUES (?, ?, ?, ?, ?)";

const UPDATE: &str = "UPDATE recipes SET title = ?, ingredients = ?, instructions = ?, updated_at = ? \
     WHERE id = ?";

const DELETE: &str = "DELETE FROM recipes WHERE id = ?";

/// Recipe store backed by MySQL.
///
/// Holds connection settings only. Each operation connects, runs a single
/// statement and closes the connection again, whether or not the statement succeeded.
#[derive(Debug, Clone)]
pub struct MySqlStore {
    database: DatabaseConfig,
    readiness: ReadinessConfig,
}

impl MySqlStore {
    pub fn new(database: DatabaseConfig, readiness: ReadinessConfig) -> Self {
        Self { database, readiness }
    }

    /// Reads both the handler and the readiness settings from `DB_*` variables.
    pub fn from_env() -> Result<Self, StoreError> {
        Ok(Self::new(DatabaseConfig::from_env()?, ReadinessConfig::from_env()))
    }

    pub fn database_config(&self) -> &DatabaseConfig {
        &self.database
    }

    /// Opens a connection scoped to the calling operation.
    /// Callers must hand it back through [`release`] on every path.
    #[instrument(level = "trace", skip_all, err)]
    async fn acquire_connection(&self) -> Result<MySqlConnection, StoreError> {
        MySqlConnection::connect_with(&self.database.connect_options())
            .await
            .map_err(StoreError::Connect)
    }
}

/// Closes a connection, logging instead of failing if the server is already gone.
async fn release(conn: MySqlConnection) {
    if let Err(e) = conn.close().await {
        tracing::debug!(error = %e, "Database connection did not close cleanly");
    }
}

#[async_trait]
impl RecipeStore for MySqlStore {
    #[instrument(name = "store::init_schema", skip(self), err)]
    async fn init_schema(&self) -> Result<(), StoreError> {
        let mut conn = self.acquire_connection().await?;
        let result = schema::ensure_recipes_table(&mut conn).await;
        release(conn).await;
        Ok(result?)
    }

    #[instrument(name = "store::list", skip(self), err)]
    async fn list(&self) -> Result<Vec<Recipe>, StoreError> {
        let mut conn = self.acquire_connection().await?;
        let result = sqlx::query_as::<_, Recipe>(SELECT_ALL)
            .fetch_all(&mut conn)
            .await;
        release(conn).await;

        let recipes = result?;
        tracing::debug!(count = recipes.len(), "Fetched recipes");
        Ok(recipes)
    }

    #[instrument(name = "store::get", skip(self), err)]
    async fn get(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
        let mut conn = self.acquire_connection().await?;
        let result = sqlx::query_as::<_, Recipe>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&mut conn)
            .await;
        release(conn).await;
        Ok(result?)
    }

    #[instrument(name = "store::create", skip(self, recipe), err)]
    async fn create(&self, recipe: &RecipeForm, now: DateTime<Utc>) -> Result<i32, StoreError> {
        let mut conn = self.acquire_connection().await?;
        let result = sqlx::query(INSERT)
            .bind(&recipe.title)
            .bind(&recipe.ingredients)
            .bind(&recipe.instructions)
            .bind(now)
            .bind(now)
            .execute(&mut conn)
            .await;
        release(conn).await;

        let id = i32::try_from(result?.last_insert_id())
            .map_err(|e| StoreError::Query(sqlx::Error::Decode(Box::new(e))))?;
        tracing::debug!(id, "Inserted recipe");
        Ok(id)
    }

    #[instrument(name = "store::update", skip(self, recipe), err)]
    async fn update(
        &self,
        id: i32,
        recipe: &RecipeForm,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut conn = self.acquire_connection().await?;
        let result = sqlx::query(UPDATE)
            .bind(&recipe.title)
            .bind(&recipe.ingredients)
            .bind(&recipe.instructions)
            .bind(now)
            .bind(id)
            .execute(&mut conn)
            .await;
        release(conn).await;
        Ok(result?.rows_affected())
    }

    #[instrument(name = "store::delete", skip(self), err)]
    async fn delete(&self, id: i32) -> Result<u64, StoreError> {
        let mut conn = self.acquire_connection().await?;
        let result = sqlx::query(DELETE).bind(id).execute(&mut conn).await;
        release(conn).await;
        Ok(result?.rows_affected())
    }

    #[instrument(
        name = "store::ping",
        skip(self),
        fields(host = %self.readiness.host, port = self.readiness.port)
    )]
    async fn ping(&self) -> Result<(), StoreError> {
        let options = self.readiness.connect_options();
        let conn = tokio::time::timeout(
            Duration::from_secs(READINESS_CONNECT_TIMEOUT_SECS),
            MySqlConnection::connect_with(&options),
        )
        .await
        .map_err(|_| StoreError::ConnectTimeout(READINESS_CONNECT_TIMEOUT_SECS))?
        .map_err(StoreError::Connect)?;

        release(conn).await;
        Ok(())
    }
}
