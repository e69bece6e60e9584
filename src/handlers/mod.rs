use axum::http::{StatusCode, Uri};
use axum::Json;

use crate::errors::RequestError;

mod comment_handlers;
mod dashboard_handlers;
mod interaction_handlers;
mod post_handlers;
mod user_handlers;

pub use comment_handlers::*;
pub use dashboard_handlers::*;
pub use interaction_handlers::*;
pub use post_handlers::*;
pub use user_handlers::*;

pub(crate) type JsonResult<T> = Result<Json<T>, RequestError>;

// ----------------- Helper Handlers -----------------

pub async fn alive() -> &'static str {
    "alive"
}

pub async fn not_found(uri: Uri) -> Result<(), (StatusCode, String)> {
    Err((
        StatusCode::NOT_FOUND,
        format!("URL {} provided was not found", uri),
    ))
}
