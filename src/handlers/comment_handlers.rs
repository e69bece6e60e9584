use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use sqlx::SqlitePool;

use crate::data_formats::{CommentRequest, CommentWrapper, FormResponse, MessageResponse};
use crate::db_helpers::{
    add_comment_to_post_in_db, approve_comment_in_db, delete_comment_in_db,
    get_comment_by_id_in_db, get_post_id_by_slug_in_db,
};
use crate::errors::RequestError;
use crate::forms::COMMENT_FORM;
use crate::models::User;
use crate::{authentication::MaybeUser, JsonResponse};

use super::user_handlers::current_user_record;
use super::JsonResult;

// ----------------- Comment Handlers -----------------

pub async fn comment_form(maybe_user: MaybeUser) -> JsonResult<FormResponse> {
    maybe_user.require()?;
    Ok(Json(FormResponse {
        form: &COMMENT_FORM,
    }))
}

pub async fn add_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
    Json(request): Json<CommentRequest>,
) -> Result<JsonResponse<CommentWrapper>, RequestError> {
    let auth = maybe_user.require()?;
    let user = current_user_record(&pool, auth.id).await?;
    let post_id = get_post_id_by_slug_in_db(&pool, &slug).await?;

    let errors = COMMENT_FORM.validate(|field| match field {
        "body" => request.body.clone(),
        "email" => request.email.clone(),
        _ => None,
    });
    if !errors.is_empty() {
        return Err(RequestError::Validation(errors));
    }

    let email = request.email.filter(|value| !value.trim().is_empty());
    let comment = add_comment_to_post_in_db(
        &pool,
        post_id,
        &user.username,
        email,
        request.body.unwrap_or_default().trim(),
    )
    .await?;
    Ok((
        axum::http::StatusCode::CREATED,
        Json(CommentWrapper {
            comment: comment.into(),
        }),
    ))
}

pub async fn approve_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(comment_id): Path<i64>,
) -> JsonResult<CommentWrapper> {
    let auth = maybe_user.require()?;
    let user = current_user_record(&pool, auth.id).await?;
    if !can_moderate(&user) {
        return Err(RequestError::Forbidden);
    }
    approve_comment_in_db(&pool, comment_id).await?;
    let comment = get_comment_by_id_in_db(&pool, comment_id).await?;
    Ok(Json(CommentWrapper {
        comment: comment.into(),
    }))
}

pub async fn remove_comment(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(comment_id): Path<i64>,
) -> JsonResult<MessageResponse> {
    let auth = maybe_user.require()?;
    let user = current_user_record(&pool, auth.id).await?;
    if !can_moderate(&user) {
        return Err(RequestError::Forbidden);
    }
    get_comment_by_id_in_db(&pool, comment_id).await?;
    delete_comment_in_db(&pool, comment_id).await?;
    Ok(Json(MessageResponse::new("Comment removed")))
}

// Moderation policy: any signed-in account may approve or remove comments.
// TODO: restrict to superusers or the post's author once roles grow beyond
// the is_superuser flag.
fn can_moderate(user: &User) -> bool {
    user.is_active
}
