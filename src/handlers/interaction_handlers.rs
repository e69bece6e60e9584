use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::MaybeUser;
use crate::data_formats::{BookmarkResponse, LikeResponse};
use crate::db_helpers::{get_post_id_by_slug_in_db, toggle_bookmark_in_db, toggle_like_in_db};

use super::JsonResult;

// ----------------- Interaction Handlers -----------------

pub async fn toggle_like(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
) -> JsonResult<LikeResponse> {
    let user = maybe_user.require()?;
    let post_id = get_post_id_by_slug_in_db(&pool, &slug).await?;
    let (liked, likes_count) = toggle_like_in_db(&pool, user.id, post_id).await?;
    Ok(Json(LikeResponse { liked, likes_count }))
}

pub async fn toggle_bookmark(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
) -> JsonResult<BookmarkResponse> {
    let user = maybe_user.require()?;
    let post_id = get_post_id_by_slug_in_db(&pool, &slug).await?;
    let bookmarked = toggle_bookmark_in_db(&pool, user.id, post_id).await?;
    Ok(Json(BookmarkResponse { bookmarked }))
}
