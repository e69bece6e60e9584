use sqlx::{Sqlite, SqlitePool};

use crate::errors::RequestError;

pub struct AuthorDashboardCounts {
    pub published_posts: i64,
    pub draft_posts: i64,
    pub total_views: i64,
}

pub struct AdminDashboardCounts {
    pub total_posts: i64,
    pub total_comments: i64,
    pub pending_comments: i64,
    pub total_users: i64,
}

pub async fn get_author_dashboard_counts_in_db(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<AuthorDashboardCounts, RequestError> {
    let mut tx = pool.begin().await?;
    let published_posts = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM posts WHERE author_id = $1 AND status = 'published'",
    )
    .bind(author_id)
    .fetch_one(&mut tx)
    .await?;
    let draft_posts = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COUNT(*) FROM posts WHERE author_id = $1 AND status = 'draft'",
    )
    .bind(author_id)
    .fetch_one(&mut tx)
    .await?;
    let total_views = sqlx::query_scalar::<Sqlite, i64>(
        "SELECT COALESCE(SUM(views_count), 0) FROM posts WHERE author_id = $1",
    )
    .bind(author_id)
    .fetch_one(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(AuthorDashboardCounts {
        published_posts,
        draft_posts,
        total_views,
    })
}

pub async fn get_admin_dashboard_counts_in_db(
    pool: &SqlitePool,
) -> Result<AdminDashboardCounts, RequestError> {
    let mut tx = pool.begin().await?;
    let total_posts = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM posts")
        .fetch_one(&mut tx)
        .await?;
    let total_comments = sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM comments")
        .fetch_one(&mut tx)
        .await?;
    let pending_comments =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM comments WHERE approved = FALSE")
            .fetch_one(&mut tx)
            .await?;
    let total_users =
        sqlx::query_scalar::<Sqlite, i64>("SELECT COUNT(*) FROM users WHERE is_active = TRUE")
            .fetch_one(&mut tx)
            .await?;
    tx.commit().await?;
    Ok(AdminDashboardCounts {
        total_posts,
        total_comments,
        pending_comments,
        total_users,
    })
}
