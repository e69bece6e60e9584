use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Tag};

pub async fn get_tag_by_slug_in_db(pool: &SqlitePool, slug: &str) -> Result<Tag, RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<Sqlite, Tag>("SELECT id, name, slug FROM tags WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    match result {
        Some(tag) => Ok(tag),
        None => Err(RequestError::NotFound("Tag not found")),
    }
}
