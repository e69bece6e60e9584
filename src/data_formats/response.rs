use serde::{Deserialize, Serialize};

use crate::models::{AuthorProfile, Category, Comment, Post, Tag, User};

#[derive(Deserialize, Serialize, Debug)]
pub struct UserResponse {
    pub username: String,
    pub email: String,
    pub token: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserResponse {
    pub fn new(
        User {
            username,
            email,
            first_name,
            last_name,
            ..
        }: User,
        token: String,
    ) -> Self {
        UserResponse {
            username,
            email,
            token,
            first_name,
            last_name,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct ProfileResponse {
    pub username: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub youtube: Option<String>,
    pub tiktok: Option<String>,
    pub telegram: Option<String>,
}

impl ProfileResponse {
    pub fn new(user: User, profile: Option<AuthorProfile>) -> Self {
        let profile = profile.unwrap_or(AuthorProfile {
            user_id: user.id,
            bio: String::new(),
            avatar: None,
            twitter: None,
            facebook: None,
            youtube: None,
            tiktok: None,
            telegram: None,
        });
        ProfileResponse {
            username: user.username,
            bio: profile.bio,
            avatar: profile.avatar,
            twitter: profile.twitter,
            facebook: profile.facebook,
            youtube: profile.youtube,
            tiktok: profile.tiktok,
            telegram: profile.telegram,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub icon: String,
    pub color: String,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        CategoryResponse {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            icon: category.icon,
            color: category.color,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TagResponse {
    pub name: String,
    pub slug: String,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        TagResponse {
            name: tag.name,
            slug: tag.slug,
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PostCategoryResponse {
    pub name: String,
    pub slug: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub status: String,
    pub author: String,
    pub category: Option<PostCategoryResponse>,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub is_featured: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub created_at: String,
    pub published_at: Option<String>,
    pub updated_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        let category = match (post.category_name, post.category_slug) {
            (Some(name), Some(slug)) => Some(PostCategoryResponse { name, slug }),
            _ => None,
        };
        let tags = post
            .tag_list
            .map(|list| list.split(',').map(|tag| tag.to_string()).collect())
            .unwrap_or_default();
        PostResponse {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            body: post.body,
            status: post.status.as_str().to_string(),
            author: post.author_username,
            category,
            tags,
            featured_image: post.featured_image,
            is_featured: post.is_featured,
            views_count: post.views_count,
            likes_count: post.likes_count,
            created_at: post.created_at.to_string(),
            published_at: post.published_at.map(|date| date.to_string()),
            updated_at: post.updated_at.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CommentResponse {
    pub id: i64,
    pub author_name: String,
    pub email: Option<String>,
    pub body: String,
    pub approved: bool,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        CommentResponse {
            id: comment.id,
            author_name: comment.author_name,
            email: comment.email,
            body: comment.body,
            approved: comment.approved,
            created_at: comment.created_at.to_string(),
        }
    }
}
