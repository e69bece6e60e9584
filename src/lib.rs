mod authentication;
mod config;
mod data_formats;
mod db_helpers;
mod errors;
mod forms;
mod handlers;
mod models;

use anyhow::Context;
pub use anyhow::Result;
use axum::http::StatusCode;
use axum::{routing::*, Extension, Json, Router};
pub use config::Config;
pub use data_formats::*;
use handlers::*;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::{
    net::{SocketAddr, TcpListener},
    sync::Arc,
};

pub type JsonResponse<T> = (StatusCode, Json<T>);

pub async fn run_app(app: Router, address: SocketAddr, pool: SqlitePool) -> Result<()> {
    let app = app.layer(Extension(Arc::new(pool)));
    axum::Server::bind(&address)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}

pub async fn init_db(db_url: &str) -> Result<SqlitePool> {
    if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
        tracing::info!("Creating database {}", db_url);
        Sqlite::create_database(db_url)
            .await
            .context("Failed to create database")?;
    }
    let pool = SqlitePool::connect(db_url).await?;
    tracing::info!("Running migrations");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations completed");
    Ok(pool)
}

pub fn get_random_free_port() -> (u16, SocketAddr) {
    let listener = TcpListener::bind("localhost:0").unwrap();
    match listener.local_addr() {
        Ok(addr) => (addr.port(), addr),
        Err(_) => panic!("Could not get a free port"),
    }
}

pub fn make_router() -> Router {
    Router::new()
        .route("/check_health", get(alive))
        .route("/", get(home))
        .route("/posts", get(list_posts))
        .route("/post/new", get(new_post_form).post(create_post))
        .route("/post/:slug", get(post_detail))
        .route("/post/:slug/edit", get(edit_post_form).post(update_post))
        .route("/post/:slug/delete", get(delete_post).post(delete_post))
        .route("/post/:slug/publish", get(publish_post))
        .route("/drafts", get(draft_list))
        .route("/post/:slug/comment", get(comment_form).post(add_comment))
        .route("/comment/:id/approve", get(approve_comment))
        .route("/comment/:id/remove", get(remove_comment))
        .route("/category/:slug", get(category_posts))
        .route("/tag/:slug", get(tag_posts))
        .route("/search", get(search_posts))
        .route("/dashboard", get(dashboard))
        .route("/user-dashboard", get(user_dashboard))
        .route("/admin-dashboard", get(admin_dashboard))
        .route("/post/:slug/like", post(toggle_like))
        .route("/post/:slug/bookmark", post(toggle_bookmark))
        .route("/accounts/register", post(register_user))
        .route("/accounts/login", post(login_user))
        .route("/user", get(get_current_user).put(update_user))
        .route("/profiles/:username", get(get_profile))
        .fallback(not_found)
}

pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;
    for ch in value.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.extend(ch.to_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_lowercases_and_dashes() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Leading & trailing!  "), "leading-trailing");
        assert_eq!(slugify("Camp Nou 2024"), "camp-nou-2024");
    }

    #[test]
    fn slugify_collapses_runs_of_separators() {
        assert_eq!(slugify("a --- b"), "a-b");
        assert_eq!(slugify("one/two\\three"), "one-two-three");
    }

    #[test]
    fn slugify_drops_non_alphanumerics_entirely() {
        assert_eq!(slugify("!!!"), "");
    }
}
