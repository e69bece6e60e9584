use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use sqlx::SqlitePool;

use crate::authentication::{AuthUser, MaybeUser};
use crate::data_formats::{
    CategoryPostsResponse, CreatePostRequest, EditPostFormResponse, FormResponse, HomeResponse,
    MessageResponse, PostDetailResponse, PostListResponse, PostWrapper, SearchResponse,
    TagPostsResponse, UpdatePostRequest,
};
use crate::db_helpers::{
    create_post_in_db, delete_post_in_db, get_category_by_slug_in_db, get_post_by_slug_in_db,
    get_tag_by_slug_in_db, increment_post_views_in_db, list_approved_comments_in_db,
    list_categories_in_db, list_drafts_in_db, list_posts_by_category_in_db,
    list_posts_by_tag_in_db, list_published_posts_in_db, list_recent_posts_in_db,
    list_related_posts_in_db, list_trending_posts_in_db, publish_post_in_db, search_posts_in_db,
    update_post_in_db,
};
use crate::errors::RequestError;
use crate::forms::POST_FORM;
use crate::models::{Post, PostStatus};

use super::user_handlers::current_user_record;
use super::JsonResult;

// ----------------- Page Handlers -----------------

pub async fn home(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> JsonResult<HomeResponse> {
    let viewer = maybe_user.get_id();
    let categories = list_categories_in_db(&pool).await?;
    let recent_posts = list_recent_posts_in_db(&pool, viewer).await?;
    let trending_posts = list_trending_posts_in_db(&pool, viewer).await?;
    Ok(Json(HomeResponse {
        categories: categories.into_iter().map(Into::into).collect(),
        recent_posts: recent_posts.into_iter().map(Into::into).collect(),
        trending_posts: trending_posts.into_iter().map(Into::into).collect(),
    }))
}

pub async fn list_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> JsonResult<PostListResponse> {
    let posts = list_published_posts_in_db(&pool, maybe_user.get_id()).await?;
    let posts: Vec<_> = posts.into_iter().map(Into::into).collect();
    let posts_count = posts.len();
    Ok(Json(PostListResponse { posts, posts_count }))
}

pub async fn post_detail(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
) -> JsonResult<PostDetailResponse> {
    let viewer = maybe_user.get_id();
    let mut post = require_post(&pool, &slug, viewer).await?;
    if post.status != PostStatus::Published && !can_view_unpublished(&pool, viewer, &post).await? {
        // Drafts and archived posts read as absent to everyone but their
        // author and superusers.
        return Err(RequestError::NotFound("Post not found"));
    }

    increment_post_views_in_db(&pool, post.id).await?;
    post.views_count += 1;

    let comments = list_approved_comments_in_db(&pool, post.id).await?;
    let related_posts = list_related_posts_in_db(&pool, viewer, post.id).await?;
    let is_liked = post.liked;
    let is_bookmarked = post.bookmarked;
    Ok(Json(PostDetailResponse {
        post: post.into(),
        comments: comments.into_iter().map(Into::into).collect(),
        related_posts: related_posts.into_iter().map(Into::into).collect(),
        is_liked,
        is_bookmarked,
    }))
}

pub async fn category_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
) -> JsonResult<CategoryPostsResponse> {
    let category = get_category_by_slug_in_db(&pool, &slug).await?;
    let posts = list_posts_by_category_in_db(&pool, maybe_user.get_id(), &slug).await?;
    let posts: Vec<_> = posts.into_iter().map(Into::into).collect();
    let posts_count = posts.len();
    Ok(Json(CategoryPostsResponse {
        category: category.into(),
        posts,
        posts_count,
    }))
}

pub async fn tag_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
) -> JsonResult<TagPostsResponse> {
    let tag = get_tag_by_slug_in_db(&pool, &slug).await?;
    let posts = list_posts_by_tag_in_db(&pool, maybe_user.get_id(), &slug).await?;
    let posts: Vec<_> = posts.into_iter().map(Into::into).collect();
    let posts_count = posts.len();
    Ok(Json(TagPostsResponse {
        tag: tag.into(),
        posts,
        posts_count,
    }))
}

pub async fn search_posts(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Query(params): Query<HashMap<String, String>>,
) -> JsonResult<SearchResponse> {
    let query = params.get("q").map(|q| q.trim()).unwrap_or_default();
    // An empty query is zero results, not "all posts".
    let posts = if query.is_empty() {
        Vec::new()
    } else {
        search_posts_in_db(&pool, maybe_user.get_id(), query).await?
    };
    let posts: Vec<_> = posts.into_iter().map(Into::into).collect();
    let posts_count = posts.len();
    Ok(Json(SearchResponse {
        query: query.to_string(),
        posts,
        posts_count,
    }))
}

// ----------------- Authoring Handlers -----------------

pub async fn new_post_form(maybe_user: MaybeUser) -> JsonResult<FormResponse> {
    maybe_user.require()?;
    Ok(Json(FormResponse { form: &POST_FORM }))
}

pub async fn create_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Json(request): Json<CreatePostRequest>,
) -> JsonResult<PostWrapper> {
    let user = maybe_user.require()?;
    let errors = POST_FORM.validate(|field| match field {
        "title" => request.title.clone(),
        "excerpt" => request.excerpt.clone(),
        "body" => request.body.clone(),
        "category" => request.category.clone(),
        "tags" => request.tags.as_ref().map(|tags| tags.join(",")),
        "featured_image" => request.featured_image.clone(),
        _ => None,
    });
    if !errors.is_empty() {
        return Err(RequestError::Validation(errors));
    }
    let post = create_post_in_db(&pool, user.id, request).await?;
    Ok(Json(PostWrapper { post: post.into() }))
}

pub async fn edit_post_form(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
) -> JsonResult<EditPostFormResponse> {
    let user = maybe_user.require()?;
    let post = require_post(&pool, &slug, Some(user.id)).await?;
    require_author_or_admin(&pool, &user, &post).await?;
    Ok(Json(EditPostFormResponse {
        form: &POST_FORM,
        post: post.into(),
    }))
}

pub async fn update_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> JsonResult<PostWrapper> {
    let user = maybe_user.require()?;
    let post = require_post(&pool, &slug, Some(user.id)).await?;
    require_author_or_admin(&pool, &user, &post).await?;

    // Validate the effective values: fields the request left out keep their
    // stored value and still have to pass.
    let errors = POST_FORM.validate(|field| match field {
        "title" => request.title.clone().or_else(|| Some(post.title.clone())),
        "excerpt" => request.excerpt.clone().or_else(|| post.excerpt.clone()),
        "body" => request.body.clone().or_else(|| Some(post.body.clone())),
        "category" => request.category.clone(),
        "tags" => request.tags.as_ref().map(|tags| tags.join(",")),
        "featured_image" => request.featured_image.clone(),
        _ => None,
    });
    if !errors.is_empty() {
        return Err(RequestError::Validation(errors));
    }

    let new_slug = update_post_in_db(&pool, &post, request).await?;
    let post = require_post(&pool, &new_slug, Some(user.id)).await?;
    Ok(Json(PostWrapper { post: post.into() }))
}

pub async fn delete_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
) -> JsonResult<MessageResponse> {
    let user = maybe_user.require()?;
    let post = require_post(&pool, &slug, Some(user.id)).await?;
    require_author_or_admin(&pool, &user, &post).await?;
    delete_post_in_db(&pool, post.id).await?;
    Ok(Json(MessageResponse::new("Post deleted successfully!")))
}

pub async fn publish_post(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
    Path(slug): Path<String>,
) -> JsonResult<PostWrapper> {
    let user = maybe_user.require()?;
    let post = require_post(&pool, &slug, Some(user.id)).await?;
    require_author_or_admin(&pool, &user, &post).await?;
    publish_post_in_db(&pool, post.id).await?;
    let post = require_post(&pool, &slug, Some(user.id)).await?;
    Ok(Json(PostWrapper { post: post.into() }))
}

pub async fn draft_list(
    Extension(pool): Extension<Arc<SqlitePool>>,
    maybe_user: MaybeUser,
) -> JsonResult<PostListResponse> {
    let user = maybe_user.require()?;
    let posts = list_drafts_in_db(&pool, user.id).await?;
    let posts: Vec<_> = posts.into_iter().map(Into::into).collect();
    let posts_count = posts.len();
    Ok(Json(PostListResponse { posts, posts_count }))
}

// ----------------- Helper Functions -----------------

pub(crate) async fn require_post(
    pool: &SqlitePool,
    slug: &str,
    viewer: Option<i64>,
) -> Result<Post, RequestError> {
    match get_post_by_slug_in_db(pool, slug, viewer).await? {
        Some(post) => Ok(post),
        None => Err(RequestError::NotFound("Post not found")),
    }
}

async fn can_view_unpublished(
    pool: &SqlitePool,
    viewer: Option<i64>,
    post: &Post,
) -> Result<bool, RequestError> {
    let viewer_id = match viewer {
        Some(id) => id,
        None => return Ok(false),
    };
    if viewer_id == post.author_id {
        return Ok(true);
    }
    let user = current_user_record(pool, viewer_id).await?;
    Ok(user.is_superuser)
}

pub(crate) async fn require_author_or_admin(
    pool: &SqlitePool,
    user: &AuthUser,
    post: &Post,
) -> Result<(), RequestError> {
    if user.id == post.author_id {
        return Ok(());
    }
    let record = current_user_record(pool, user.id).await?;
    if record.is_superuser {
        Ok(())
    } else {
        Err(RequestError::Forbidden)
    }
}
