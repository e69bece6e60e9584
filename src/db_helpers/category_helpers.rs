use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Category};

const CATEGORY_COLUMNS: &str = "id, name, slug, description, icon, color, created_at";

// The category list every page payload carries, supplied explicitly by each
// handler rather than hanging off ambient state.
pub async fn list_categories_in_db(pool: &SqlitePool) -> Result<Vec<Category>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {} FROM categories ORDER BY name", CATEGORY_COLUMNS);
    let result = sqlx::query_as::<Sqlite, Category>(&query)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_category_by_slug_in_db(
    pool: &SqlitePool,
    slug: &str,
) -> Result<Category, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "SELECT {} FROM categories WHERE slug = $1",
        CATEGORY_COLUMNS
    );
    let result = sqlx::query_as::<Sqlite, Category>(&query)
        .bind(slug)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    match result {
        Some(category) => Ok(category),
        None => Err(RequestError::NotFound("Category not found")),
    }
}
