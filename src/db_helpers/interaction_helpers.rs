use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;

// Membership flip against the uniqueness-constrained join table: the insert
// is ignored when the row exists, and a no-op insert means "toggle off".
pub async fn toggle_like_in_db(
    pool: &SqlitePool,
    user_id: i64,
    post_id: i64,
) -> Result<(bool, i64), RequestError> {
    let mut tx = pool.begin().await?;
    let inserted = sqlx::query("INSERT OR IGNORE INTO post_likes (user_id, post_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(post_id)
        .execute(&mut tx)
        .await?
        .rows_affected();
    let liked = if inserted == 0 {
        sqlx::query("DELETE FROM post_likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut tx)
            .await?;
        false
    } else {
        true
    };
    let likes_count =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&mut tx)
            .await?;
    tx.commit().await?;
    Ok((liked, likes_count))
}

pub async fn toggle_bookmark_in_db(
    pool: &SqlitePool,
    user_id: i64,
    post_id: i64,
) -> Result<bool, RequestError> {
    let mut tx = pool.begin().await?;
    let inserted = sqlx::query("INSERT OR IGNORE INTO bookmarks (user_id, post_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(post_id)
        .execute(&mut tx)
        .await?
        .rows_affected();
    let bookmarked = if inserted == 0 {
        sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut tx)
            .await?;
        false
    } else {
        true
    };
    tx.commit().await?;
    Ok(bookmarked)
}
