use std::sync::Arc;

use axum::{
    response::{IntoResponse, Response},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::authentication::MaybeUser;
use crate::data_formats::{AdminDashboardResponse, UserDashboardResponse};
use crate::db_helpers::{
    get_admin_dashboard_counts_in_db, get_author_dashboard_counts_in_db,
    list_author_recent_posts_in_db, list_recent_comments_in_db, list_recent_posts_any_status_in_db,
};
use crate::errors::RequestError;

use super::user_handlers::current_user_record;
use super::JsonResult;

const RECENT_COMMENTS_LIMIT: u32 = 5;

// ----------------- Dashboard Handlers -----------------

// Routes to the admin or author payload by role.
pub async fn dashboard(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> Result<Response, RequestError> {
    let auth = maybe_user.require()?;
    let user = current_user_record(&pool, auth.id).await?;
    if user.is_superuser {
        let payload = admin_dashboard_payload(&pool).await?;
        Ok(Json(payload).into_response())
    } else {
        let payload = user_dashboard_payload(&pool, user.id).await?;
        Ok(Json(payload).into_response())
    }
}

pub async fn user_dashboard(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> JsonResult<UserDashboardResponse> {
    let user = maybe_user.require()?;
    Ok(Json(user_dashboard_payload(&pool, user.id).await?))
}

pub async fn admin_dashboard(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> JsonResult<AdminDashboardResponse> {
    let auth = maybe_user.require()?;
    let user = current_user_record(&pool, auth.id).await?;
    if !user.is_superuser {
        return Err(RequestError::Forbidden);
    }
    Ok(Json(admin_dashboard_payload(&pool).await?))
}

// ----------------- Helper Functions -----------------

async fn user_dashboard_payload(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<UserDashboardResponse, RequestError> {
    let counts = get_author_dashboard_counts_in_db(pool, author_id).await?;
    let recent_posts = list_author_recent_posts_in_db(pool, author_id).await?;
    Ok(UserDashboardResponse {
        recent_posts: recent_posts.into_iter().map(Into::into).collect(),
        published_posts: counts.published_posts,
        draft_posts: counts.draft_posts,
        total_views: counts.total_views,
    })
}

async fn admin_dashboard_payload(
    pool: &SqlitePool,
) -> Result<AdminDashboardResponse, RequestError> {
    let counts = get_admin_dashboard_counts_in_db(pool).await?;
    let recent_posts = list_recent_posts_any_status_in_db(pool).await?;
    let recent_comments = list_recent_comments_in_db(pool, RECENT_COMMENTS_LIMIT).await?;
    Ok(AdminDashboardResponse {
        total_posts: counts.total_posts,
        total_comments: counts.total_comments,
        pending_comments: counts.pending_comments,
        total_users: counts.total_users,
        recent_posts: recent_posts.into_iter().map(Into::into).collect(),
        recent_comments: recent_comments.into_iter().map(Into::into).collect(),
    })
}
