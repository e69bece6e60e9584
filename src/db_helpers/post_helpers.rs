use sqlx::{Row, Sqlite, SqlitePool, Transaction};

use crate::data_formats::{CreatePostRequest, PostAction, UpdatePostRequest};
use crate::errors::{FieldError, RequestError};
use crate::models::{Post, PostStatus};
use crate::slugify;

use super::QueryBuilder;

const HOME_RECENT_LIMIT: u32 = 9;
const TRENDING_LIMIT: u32 = 5;
const TRENDING_WINDOW_DAYS: u32 = 14;
const RELATED_LIMIT: u32 = 4;
const DASHBOARD_RECENT_LIMIT: u32 = 5;

// Shared hydrated select. $1 is the viewer id (or NULL) and feeds the
// liked/bookmarked subqueries; variants append their own WHERE/ORDER/LIMIT
// with parameters numbered from $2.
const POST_QUERY: &str = r#"
            SELECT posts.id                                      AS "id",
                   posts.author_id                               AS "author_id",
                   posts.title                                   AS "title",
                   posts.slug                                    AS "slug",
                   posts.excerpt                                 AS "excerpt",
                   posts.body                                    AS "body",
                   posts.status                                  AS "status",
                   posts.featured_image                          AS "featured_image",
                   posts.is_featured                             AS "is_featured",
                   posts.views_count                             AS "views_count",
                   posts.created_at                              AS "created_at",
                   posts.published_at                            AS "published_at",
                   posts.updated_at                              AS "updated_at",
                   users.username                                AS "author_username",
                   categories.name                               AS "category_name",
                   categories.slug                               AS "category_slug",
                   (SELECT Group_concat(tags.name, ',')
                    FROM   tags
                           JOIN post_tags
                             ON post_tags.tag_id = tags.id
                    WHERE  post_tags.post_id = posts.id)         AS "tag_list",
                   (SELECT Count(*)
                    FROM   post_likes
                    WHERE  post_likes.post_id = posts.id)        AS "likes_count",
                   EXISTS (SELECT 1
                           FROM   post_likes
                           WHERE  post_likes.post_id = posts.id
                                  AND post_likes.user_id = $1)   AS "liked",
                   EXISTS (SELECT 1
                           FROM   bookmarks
                           WHERE  bookmarks.post_id = posts.id
                                  AND bookmarks.user_id = $1)    AS "bookmarked"
            FROM   posts
                   JOIN users
                     ON posts.author_id = users.id
                   LEFT JOIN categories
                          ON posts.category_id = categories.id
"#;

// ----------------- Read Queries -----------------

pub async fn get_post_by_slug_in_db(
    pool: &SqlitePool,
    slug: &str,
    viewer: Option<i64>,
) -> Result<Option<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!("{} WHERE posts.slug = $2", POST_QUERY);
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(viewer)
        .bind(slug)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn get_post_id_by_slug_in_db(pool: &SqlitePool, slug: &str) -> Result<i64, RequestError> {
    let mut tx = pool.begin().await?;
    let post = sqlx::query("SELECT id FROM posts WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&mut tx)
        .await?;
    tx.commit().await?;
    match post {
        Some(row) => Ok(row.try_get("id")?),
        None => Err(RequestError::NotFound("Post not found")),
    }
}

pub async fn list_published_posts_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} WHERE posts.status = 'published' ORDER BY posts.published_at DESC",
        POST_QUERY
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(viewer)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn list_recent_posts_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} WHERE posts.status = 'published' ORDER BY posts.published_at DESC LIMIT {}",
        POST_QUERY, HOME_RECENT_LIMIT
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(viewer)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

// Most viewed published posts inside the trending window, newest first on
// ties.
pub async fn list_trending_posts_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} WHERE posts.status = 'published' \
         AND posts.published_at >= datetime('now', '-{} days') \
         ORDER BY posts.views_count DESC, posts.published_at DESC LIMIT {}",
        POST_QUERY, TRENDING_WINDOW_DAYS, TRENDING_LIMIT
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(viewer)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn list_posts_by_category_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
    category_slug: &str,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} WHERE posts.status = 'published' AND categories.slug = $2 \
         ORDER BY posts.published_at DESC",
        POST_QUERY
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(viewer)
        .bind(category_slug)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn list_posts_by_tag_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
    tag_slug: &str,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} WHERE posts.status = 'published' \
         AND posts.id IN (SELECT post_tags.post_id
                          FROM post_tags
                               JOIN tags ON tags.id = post_tags.tag_id
                          WHERE tags.slug = $2) \
         ORDER BY posts.published_at DESC",
        POST_QUERY
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(viewer)
        .bind(tag_slug)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

// Case-insensitive substring match on title or body, published posts only.
// The caller is responsible for short-circuiting an empty query.
pub async fn search_posts_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
    term: &str,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} WHERE posts.status = 'published' \
         AND (posts.title LIKE '%' || $2 || '%' OR posts.body LIKE '%' || $2 || '%') \
         ORDER BY posts.published_at DESC",
        POST_QUERY
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(viewer)
        .bind(term)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

// Published posts sharing at least one tag with the given post, the post
// itself excluded.
pub async fn list_related_posts_in_db(
    pool: &SqlitePool,
    viewer: Option<i64>,
    post_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} WHERE posts.status = 'published' AND posts.id != $2 \
         AND posts.id IN (SELECT post_tags.post_id
                          FROM post_tags
                          WHERE post_tags.tag_id IN (SELECT tag_id
                                                     FROM post_tags
                                                     WHERE post_id = $2)) \
         LIMIT {}",
        POST_QUERY, RELATED_LIMIT
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(viewer)
        .bind(post_id)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn list_drafts_in_db(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} WHERE posts.author_id = $2 AND posts.status = 'draft' \
         ORDER BY posts.created_at DESC",
        POST_QUERY
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(author_id)
        .bind(author_id)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn list_author_recent_posts_in_db(
    pool: &SqlitePool,
    author_id: i64,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} WHERE posts.author_id = $2 ORDER BY posts.created_at DESC LIMIT {}",
        POST_QUERY, DASHBOARD_RECENT_LIMIT
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(author_id)
        .bind(author_id)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

pub async fn list_recent_posts_any_status_in_db(
    pool: &SqlitePool,
) -> Result<Vec<Post>, RequestError> {
    let mut tx = pool.begin().await?;
    let query = format!(
        "{} ORDER BY posts.created_at DESC LIMIT {}",
        POST_QUERY, DASHBOARD_RECENT_LIMIT
    );
    let result = sqlx::query_as::<Sqlite, Post>(&query)
        .bind(Option::<i64>::None)
        .fetch_all(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(result)
}

// ----------------- Write Queries -----------------

pub async fn create_post_in_db(
    pool: &SqlitePool,
    author_id: i64,
    CreatePostRequest {
        title,
        excerpt,
        body,
        category,
        tags,
        featured_image,
        action,
    }: CreatePostRequest,
) -> Result<Post, RequestError> {
    let title = title.unwrap_or_default();
    let body = body.unwrap_or_default();
    let excerpt = excerpt.filter(|value| !value.trim().is_empty());
    let status = match action {
        PostAction::SaveDraft => PostStatus::Draft,
        PostAction::SavePublish => PostStatus::Published,
    };

    let mut tx = pool.begin().await?;
    let category_id = resolve_category_id(&mut tx, category.as_deref()).await?;
    let slug = unique_slug(&mut tx, &title, None).await?;

    let row = sqlx::query(
        r#"
        INSERT INTO posts (author_id, title, slug, excerpt, body, category_id,
                           featured_image, status, published_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                CASE WHEN $8 = 'published' THEN datetime('now') ELSE NULL END)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(&title)
    .bind(&slug)
    .bind(&excerpt)
    .bind(&body)
    .bind(category_id)
    .bind(&featured_image)
    .bind(status)
    .fetch_one(&mut tx)
    .await?;
    let post_id: i64 = row.try_get("id")?;

    if let Some(tags) = tags {
        link_tags(&mut tx, post_id, &tags).await?;
    }
    tx.commit().await?;

    let post = get_post_by_slug_in_db(pool, &slug, Some(author_id))
        .await?
        .ok_or(RequestError::ServerError)?;
    Ok(post)
}

// Applies the provided fields in place and returns the (possibly unchanged)
// slug. The slug is only re-derived when the request carries one explicitly:
// blank means "derive from the title again", anything else is slugified and
// made unique.
pub async fn update_post_in_db(
    pool: &SqlitePool,
    post: &Post,
    UpdatePostRequest {
        title,
        excerpt,
        body,
        category,
        tags,
        featured_image,
        slug,
    }: UpdatePostRequest,
) -> Result<String, RequestError> {
    let mut tx = pool.begin().await?;

    let category_id = resolve_category_id(&mut tx, category.as_deref()).await?;
    let new_slug = match slug {
        Some(submitted) => {
            let source = if submitted.trim().is_empty() {
                title.clone().unwrap_or_else(|| post.title.clone())
            } else {
                submitted
            };
            Some(unique_slug(&mut tx, &source, Some(post.id)).await?)
        }
        None => None,
    };

    let (set_clause, params) = QueryBuilder::new(", ")
        .add_param("title", title)
        .add_param("excerpt", excerpt)
        .add_param("body", body)
        .add_param("featured_image", featured_image)
        .add_param("slug", new_slug.clone())
        .add_param("category_id", category_id.map(|id| id.to_string()))
        .build();

    if !set_clause.is_empty() {
        let query = format!(
            "UPDATE posts SET {}, updated_at = datetime('now') WHERE id = ${}",
            set_clause,
            params.len() + 1
        );
        let mut query = sqlx::query(&query);
        for param in params {
            query = query.bind(param);
        }
        query.bind(post.id).execute(&mut tx).await?;
    }

    if let Some(tags) = tags {
        sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post.id)
            .execute(&mut tx)
            .await?;
        link_tags(&mut tx, post.id, &tags).await?;
    }
    tx.commit().await?;

    Ok(new_slug.unwrap_or_else(|| post.slug.clone()))
}

// Forces published status and stamps the timestamp at this instant,
// whatever the prior state was.
pub async fn publish_post_in_db(pool: &SqlitePool, post_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "UPDATE posts \
         SET status = 'published', published_at = datetime('now'), updated_at = datetime('now') \
         WHERE id = $1",
    )
    .bind(post_id)
    .execute(&mut tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Post not found"));
    }
    tx.commit().await?;
    Ok(())
}

pub async fn delete_post_in_db(pool: &SqlitePool, post_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM comments WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    sqlx::query("DELETE FROM post_likes WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    sqlx::query("DELETE FROM bookmarks WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    if result.rows_affected() == 0 {
        return Err(RequestError::NotFound("Post not found"));
    }
    tx.commit().await?;
    Ok(())
}

pub async fn increment_post_views_in_db(pool: &SqlitePool, post_id: i64) -> Result<(), RequestError> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE posts SET views_count = views_count + 1 WHERE id = $1")
        .bind(post_id)
        .execute(&mut tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

// ----------------- Helper Functions -----------------

async fn resolve_category_id(
    tx: &mut Transaction<'_, Sqlite>,
    category: Option<&str>,
) -> Result<Option<i64>, RequestError> {
    let slug = match category {
        Some(slug) if !slug.trim().is_empty() => slug,
        _ => return Ok(None),
    };
    let id = sqlx::query_scalar::<Sqlite, i64>("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&mut *tx)
        .await?;
    match id {
        Some(id) => Ok(Some(id)),
        None => Err(RequestError::Validation(vec![FieldError::new(
            "category",
            "Select a valid category.",
        )])),
    }
}

// Derives a slug from the source text and appends an incrementing numeric
// suffix until it is unique among posts.
async fn unique_slug(
    tx: &mut Transaction<'_, Sqlite>,
    source: &str,
    exclude_id: Option<i64>,
) -> Result<String, RequestError> {
    let mut base = slugify(source);
    if base.is_empty() {
        base = "post".to_string();
    }
    let mut slug = base.clone();
    let mut counter = 1;
    loop {
        let taken = sqlx::query_scalar::<Sqlite, i64>(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE slug = $1 AND ($2 IS NULL OR id != $2))",
        )
        .bind(&slug)
        .bind(exclude_id)
        .fetch_one(&mut *tx)
        .await?;
        if taken == 0 {
            return Ok(slug);
        }
        slug = format!("{}-{}", base, counter);
        counter += 1;
    }
}

// Tags are created on demand; the conflict clause makes RETURNING work for
// rows that already exist.
async fn link_tags(
    tx: &mut Transaction<'_, Sqlite>,
    post_id: i64,
    tags: &[String],
) -> Result<(), RequestError> {
    for name in tags {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        let tag_slug = slugify(name);
        let tag_id = sqlx::query_scalar::<Sqlite, i64>(
            r#"
            INSERT INTO tags (name, slug)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET name = excluded.name
            RETURNING id
            "#,
        )
        .bind(name)
        .bind(&tag_slug)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT OR IGNORE INTO post_tags (post_id, tag_id) VALUES ($1, $2)")
            .bind(post_id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
    }
    Ok(())
}
