use sqlx::{Sqlite, SqlitePool};

use crate::{errors::RequestError, models::Comment};

const COMMENT_COLUMNS: &str = "id, post_id, author_name, email, body, approved, created_at";

// New comments land unapproved and stay out of the public listing until a
// moderator flips the flag.
pub async fn add_comment_to_post_in_db(
    pool: &SqlitePool,
    post_id: i64,
    author_name: &str,
    email: Option<String>,
    body: &str,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "INSERT INTO comments (post_id, author_name, email, body) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {}",
        COMMENT_COLUMNS
    );
    let comment = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(post_id)
        .bind(author_name)
        .bind(email)
        .bind(body)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(comment)
}

pub async fn list_approved_comments_in_db(
    pool: &SqlitePool,
    post_id: i64,
) -> Result<Vec<Comment>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "SELECT {} FROM comments WHERE post_id = $1 AND approved = TRUE \
         ORDER BY created_at DESC",
        COMMENT_COLUMNS
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(post_id)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_comment_by_id_in_db(
    pool: &SqlitePool,
    comment_id: i64,
) -> Result<Comment, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {} FROM comments WHERE id = $1", COMMENT_COLUMNS);
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .bind(comment_id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    match result {
        Some(comment) => Ok(comment),
        None => Err(RequestError::NotFound("Comment not found")),
    }
}

// Idempotent: approving an already-approved comment is a no-op.
pub async fn approve_comment_in_db(pool: &SqlitePool, comment_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("UPDATE comments SET approved = TRUE WHERE id = $1")
        .bind(comment_id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    tx.commit().await?;
    Ok(())
}

pub async fn delete_comment_in_db(pool: &SqlitePool, comment_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(comment_id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Comment not found"));
    }
    tx.commit().await?;
    Ok(())
}

pub async fn list_recent_comments_in_db(
    pool: &SqlitePool,
    limit: u32,
) -> Result<Vec<Comment>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "SELECT {} FROM comments ORDER BY created_at DESC LIMIT {}",
        COMMENT_COLUMNS, limit
    );
    let result = sqlx::query_as::<Sqlite, Comment>(&query)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}
