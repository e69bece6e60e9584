use serde::{Deserialize, Serialize};

use crate::forms::FormSpec;

use super::response::{
    CategoryResponse, CommentResponse, PostResponse, ProfileResponse, TagResponse,
};

#[derive(Debug, Deserialize, Serialize)]
pub struct UserWrapper<T> {
    pub user: T,
}

impl<T> UserWrapper<T> {
    pub fn wrap_with_user_data(request: T) -> UserWrapper<T> {
        UserWrapper { user: request }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ProfileWrapper {
    pub profile: ProfileResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostWrapper {
    pub post: PostResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CommentWrapper {
    pub comment: CommentResponse,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageResponse {
    pub detail: String,
}

impl MessageResponse {
    pub fn new(detail: impl Into<String>) -> MessageResponse {
        MessageResponse {
            detail: detail.into(),
        }
    }
}

// ----------------- Page Payloads -----------------

#[derive(Debug, Deserialize, Serialize)]
pub struct HomeResponse {
    pub categories: Vec<CategoryResponse>,
    pub recent_posts: Vec<PostResponse>,
    pub trending_posts: Vec<PostResponse>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub posts_count: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
    pub related_posts: Vec<PostResponse>,
    pub is_liked: bool,
    pub is_bookmarked: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CategoryPostsResponse {
    pub category: CategoryResponse,
    pub posts: Vec<PostResponse>,
    pub posts_count: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TagPostsResponse {
    pub tag: TagResponse,
    pub posts: Vec<PostResponse>,
    pub posts_count: usize,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub posts: Vec<PostResponse>,
    pub posts_count: usize,
}

// ----------------- Form Payloads -----------------

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub form: &'static FormSpec,
}

#[derive(Debug, Serialize)]
pub struct EditPostFormResponse {
    pub form: &'static FormSpec,
    pub post: PostResponse,
}

// ----------------- Interaction Payloads -----------------

#[derive(Debug, Deserialize, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes_count: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BookmarkResponse {
    pub bookmarked: bool,
}

// ----------------- Dashboard Payloads -----------------

#[derive(Debug, Deserialize, Serialize)]
pub struct UserDashboardResponse {
    pub recent_posts: Vec<PostResponse>,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub total_views: i64,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AdminDashboardResponse {
    pub total_posts: i64,
    pub total_comments: i64,
    pub pending_comments: i64,
    pub total_users: i64,
    pub recent_posts: Vec<PostResponse>,
    pub recent_comments: Vec<CommentResponse>,
}
