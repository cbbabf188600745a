//! The `recipes` table definition.

use sqlx::MySqlConnection;

/// Idempotent DDL for the only table the application uses.
pub const CREATE_RECIPES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS recipes (
    id INT AUTO_INCREMENT PRIMARY KEY,
    title VARCHAR(255) NOT NULL,
    ingredients TEXT NOT NULL,
    instructions TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP
)
"#;

/// Ensures the `recipes` table exists. Existing tables are left untouched.
pub async fn ensure_recipes_table(conn: &mut MySqlConnection) -> Result<(), sqlx::Error> {
    sqlx::query(CREATE_RECIPES_TABLE).execute(conn).await?;
    Ok(())
}
