use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use sqlx::SqlitePool;

use crate::authentication::{
    get_jwt_token, hash_password_argon2, verify_password_argon2, AuthUser, MaybeUser,
};
use crate::data_formats::{
    LoginRequest, ProfileResponse, ProfileWrapper, RegisterRequest, UpdateUserRequest,
    UserResponse, UserWrapper,
};
use crate::db_helpers::{
    get_profile_by_username_in_db, get_user_by_email, get_user_by_id, get_user_by_username,
    insert_user, update_user_in_db, upsert_author_profile_in_db,
};
use crate::errors::{FieldError, RequestError};
use crate::forms::REGISTRATION_FORM;

use super::JsonResult;

type UserJson = UserWrapper<UserResponse>;

// ----------------- User Handlers -----------------

pub async fn register_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<RegisterRequest>,
) -> JsonResult<UserJson> {
    let mut errors = REGISTRATION_FORM.validate(|field| match field {
        "username" => request.username.clone(),
        "email" => request.email.clone(),
        "password" => request.password.clone(),
        "password_confirm" => request.password_confirm.clone(),
        "first_name" => request.first_name.clone(),
        "last_name" => request.last_name.clone(),
        _ => None,
    });
    if let (Some(password), Some(confirm)) = (&request.password, &request.password_confirm) {
        if password != confirm {
            errors.push(FieldError::new("password_confirm", "Passwords do not match!"));
        }
    }
    if let Some(username) = &request.username {
        if get_user_by_username(&pool, username).await?.is_some() {
            errors.push(FieldError::new("username", "Username already taken!"));
        }
    }
    if let Some(email) = &request.email {
        if get_user_by_email(&pool, email).await?.is_some() {
            errors.push(FieldError::new("email", "Email already registered!"));
        }
    }
    if !errors.is_empty() {
        return Err(RequestError::Validation(errors));
    }

    let password = hash_password_argon2(request.password.unwrap_or_default())
        .await
        .map_err(|_| RequestError::RunTimeError("Could not register user\nPlease try again"))?;

    let user = insert_user(
        &pool,
        &request.username.unwrap_or_default(),
        &request.email.unwrap_or_default(),
        &password,
        request.first_name,
        request.last_name,
    )
    .await
    .map_err(|e| {
        if let RequestError::DatabaseError(sqlx::Error::Database(db_error)) = &e {
            if db_error.message().contains("UNIQUE constraint failed") {
                return RequestError::Validation(vec![FieldError::new(
                    "username",
                    "Username or email already registered!",
                )]);
            }
        }
        e
    })?;

    let token = get_jwt_token(user.id)
        .map_err(|_| RequestError::RunTimeError("Could not generate token\nTry again later"))?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn login_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<LoginRequest>,
) -> JsonResult<UserJson> {
    let user = match get_user_by_email(&pool, &request.email).await? {
        Some(user) => user,
        None => return Err(RequestError::RunTimeError("Email not found")),
    };
    if !user.is_active {
        return Err(RequestError::RunTimeError("Account is disabled"));
    }
    let is_password_correct = verify_password_argon2(request.password, &user.password)
        .await
        .map_err(|_| RequestError::RunTimeError("Could not log in\nPlease try again"))?;
    if !is_password_correct {
        return Err(RequestError::RunTimeError("Incorrect password"));
    }
    let token = get_jwt_token(user.id)
        .map_err(|_| RequestError::RunTimeError("Could not generate token\nTry again later"))?;
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn get_current_user(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> JsonResult<UserJson> {
    let AuthUser { id, token } = maybe_user.require()?;
    let user = match get_user_by_id(&pool, id).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("User not found")),
    };
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

pub async fn update_user(
    maybe_user: MaybeUser,
    Extension(pool): Extension<Arc<SqlitePool>>,
    Json(request): Json<UpdateUserRequest>,
) -> JsonResult<UserJson> {
    let AuthUser { id, token } = maybe_user.require()?;
    let user = update_user_in_db(&pool, id, &request).await?;
    let touches_profile = request.bio.is_some()
        || request.avatar.is_some()
        || request.twitter.is_some()
        || request.facebook.is_some()
        || request.youtube.is_some()
        || request.tiktok.is_some()
        || request.telegram.is_some();
    if touches_profile {
        upsert_author_profile_in_db(&pool, id, &request).await?;
    }
    Ok(Json(UserWrapper::wrap_with_user_data(UserResponse::new(
        user, token,
    ))))
}

// ----------------- Profile Handlers -----------------

pub async fn get_profile(
    Extension(pool): Extension<Arc<SqlitePool>>,
    Path(username): Path<String>,
) -> JsonResult<ProfileWrapper> {
    let (user, profile) = get_profile_by_username_in_db(&pool, &username).await?;
    Ok(Json(ProfileWrapper {
        profile: ProfileResponse::new(user, profile),
    }))
}

// Resolves the token id to the full account record.
pub(crate) async fn current_user_record(
    pool: &SqlitePool,
    id: i64,
) -> Result<crate::models::User, RequestError> {
    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotAuthorized("Need to be logged in")),
    }
}
