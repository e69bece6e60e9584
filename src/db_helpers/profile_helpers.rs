use sqlx::{Sqlite, SqlitePool};

use crate::{
    data_formats::UpdateUserRequest,
    errors::RequestError,
    models::{AuthorProfile, User},
};

use super::get_user_by_username;

const PROFILE_COLUMNS: &str =
    "user_id, bio, avatar, twitter, facebook, youtube, tiktok, telegram";

pub async fn get_profile_by_username_in_db(
    pool: &SqlitePool,
    username: &str,
) -> Result<(User, Option<AuthorProfile>), RequestError> {
    let user = match get_user_by_username(pool, username).await? {
        Some(user) => user,
        None => return Err(RequestError::NotFound("Profile not found")),
    };
    let mut tx = pool.begin().await?;
    let query = format!(
        "SELECT {} FROM author_profiles WHERE user_id = $1",
        PROFILE_COLUMNS
    );
    let profile = sqlx::query_as::<Sqlite, AuthorProfile>(&query)
        .bind(user.id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok((user, profile))
}

// Profiles are created lazily on first update. Fields the request did not
// carry keep their stored value through the COALESCE on conflict.
pub async fn upsert_author_profile_in_db(
    pool: &SqlitePool,
    user_id: i64,
    request: &UpdateUserRequest,
) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query(
        r#"
        INSERT INTO author_profiles (user_id, bio, avatar, twitter, facebook,
                                     youtube, tiktok, telegram)
        VALUES ($1, COALESCE($2, ''), $3, $4, $5, $6, $7, $8)
        ON CONFLICT (user_id) DO UPDATE SET
            bio = COALESCE($2, author_profiles.bio),
            avatar = COALESCE($3, author_profiles.avatar),
            twitter = COALESCE($4, author_profiles.twitter),
            facebook = COALESCE($5, author_profiles.facebook),
            youtube = COALESCE($6, author_profiles.youtube),
            tiktok = COALESCE($7, author_profiles.tiktok),
            telegram = COALESCE($8, author_profiles.telegram)
        "#,
    )
    .bind(user_id)
    .bind(&request.bio)
    .bind(&request.avatar)
    .bind(&request.twitter)
    .bind(&request.facebook)
    .bind(&request.youtube)
    .bind(&request.tiktok)
    .bind(&request.telegram)
    .execute(&mut tx)
    .await?;
    tx.commit().await?;
    Ok(())
}
