//! In-memory [`RecipeStore`] used by the router tests.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Recipe, RecipeForm, RecipeStore, StoreError};

struct Table {
    rows: Vec<Recipe>,
    next_id: i32,
}

/// Mimics the `recipes` table: auto-increment ids, insertion order, hard deletes.
pub(crate) struct MemoryStore {
    table: Mutex<Table>,
    /// When set, every operation fails to connect, like an unreachable server.
    unavailable: AtomicBool,
    /// When set, the server is reachable but every statement fails.
    failing: AtomicBool,
}

/// Text of the errors returned by [`MemoryStore`], so tests can check it is not shown to clients.
pub(crate) const CONNECT_ERROR_TEXT: &str = "connection refused by recipes test store";
pub(crate) const QUERY_ERROR_TEXT: &str = "malformed packet from recipes test store";

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                rows: Vec::new(),
                next_id: 1,
            }),
            unavailable: AtomicBool::new(false),
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn rows(&self) -> Vec<Recipe> {
        self.table.lock().unwrap().rows.clone()
    }

    fn connect(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Connect(sqlx::Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                CONNECT_ERROR_TEXT,
            ))))
        } else {
            Ok(())
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        self.connect()?;
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Query(sqlx::Error::Protocol(
                QUERY_ERROR_TEXT.to_string(),
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn init_schema(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn list(&self) -> Result<Vec<Recipe>, StoreError> {
        self.check()?;
        Ok(self.rows())
    }

    async fn get(&self, id: i32) -> Result<Option<Recipe>, StoreError> {
        self.check()?;
        Ok(self.rows().into_iter().find(|r| r.id == id))
    }

    async fn create(&self, recipe: &RecipeForm, now: DateTime<Utc>) -> Result<i32, StoreError> {
        self.check()?;
        let mut table = self.table.lock().unwrap();
        let id = table.next_id;
        table.next_id += 1;
        table.rows.push(Recipe {
            id,
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn update(
        &self,
        id: i32,
        recipe: &RecipeForm,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        self.check()?;
        let mut table = self.table.lock().unwrap();
        match table.rows.iter_mut().find(|r| r.id == id) {
            Some(row) => {
                row.title = recipe.title.clone();
                row.ingredients = recipe.ingredients.clone();
                row.instructions = recipe.instructions.clone();
                row.updated_at = now;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: i32) -> Result<u64, StoreError> {
        self.check()?;
        let mut table = self.table.lock().unwrap();
        let before = table.rows.len();
        table.rows.retain(|r| r.id != id);
        Ok((before - table.rows.len()) as u64)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        self.connect()
    }
}
