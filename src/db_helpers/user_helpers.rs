use sqlx::{Sqlite, SqlitePool};

use crate::{
    authentication::hash_password_argon2, data_formats::UpdateUserRequest, errors::RequestError,
    models::User,
};

use super::QueryBuilder;

const USER_COLUMNS: &str =
    "id, username, email, password, first_name, last_name, is_superuser, is_active, created_at";

// ----------------- Lookups -----------------

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(id)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(email)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_user_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
    let result = sqlx::query_as::<Sqlite, User>(&query)
        .bind(username)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

// ----------------- User Queries -----------------

pub async fn insert_user(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    first_name: Option<String>,
    last_name: Option<String>,
) -> Result<User, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "INSERT INTO users (username, email, password, first_name, last_name) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {}",
        USER_COLUMNS
    );
    let user = sqlx::query_as::<Sqlite, User>(&query)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(user)
}

pub async fn update_user_in_db(
    pool: &SqlitePool,
    id: i64,
    request: &UpdateUserRequest,
) -> Result<User, RequestError> {
    let password = match &request.password {
        Some(password) => {
            let hashed = hash_password_argon2(password.clone())
                .await
                .map_err(|_| RequestError::ServerError)?;
            Some(hashed)
        }
        None => None,
    };

    let (set_clause, params) = QueryBuilder::new(", ")
        .add_param("email", request.email.clone())
        .add_param("username", request.username.clone())
        .add_param("password", password)
        .build();

    if !set_clause.is_empty() {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE users SET {} WHERE id = ${}",
            set_clause,
            params.len() + 1
        );
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.bind(id).execute(&mut tx).await?;
        tx.commit().await?;
    }

    match get_user_by_id(pool, id).await? {
        Some(user) => Ok(user),
        None => Err(RequestError::NotFound("User not found")),
    }
}
