use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::JsonResponse;

#[derive(Debug, Clone)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> FieldError {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug)]
pub enum RequestError {
    NotFound(&'static str),
    NotAuthorized(&'static str),
    Forbidden,
    Validation(Vec<FieldError>),
    RunTimeError(&'static str),
    ServerError,
    DatabaseError(sqlx::Error),
}

#[derive(serde::Serialize)]
pub struct RequestErrorJsonWrapper {
    errors: serde_json::Value,
}

impl RequestErrorJsonWrapper {
    pub fn new(error: &str) -> RequestErrorJsonWrapper {
        RequestErrorJsonWrapper {
            errors: serde_json::json!({ "body": [error] }),
        }
    }

    pub fn from_fields(fields: &[FieldError]) -> RequestErrorJsonWrapper {
        let mut map = serde_json::Map::new();
        for FieldError { field, message } in fields {
            let entry = map
                .entry(field.to_string())
                .or_insert_with(|| serde_json::Value::Array(vec![]));
            if let serde_json::Value::Array(messages) = entry {
                messages.push(serde_json::Value::String(message.clone()));
            }
        }
        RequestErrorJsonWrapper {
            errors: serde_json::Value::Object(map),
        }
    }
}

impl From<sqlx::Error> for RequestError {
    fn from(value: sqlx::Error) -> Self {
        Self::DatabaseError(value)
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> axum::response::Response {
        self.to_json_response().into_response()
    }
}

impl RequestError {
    pub fn to_json_response(&self) -> JsonResponse<RequestErrorJsonWrapper> {
        let (status_code, json) = match self {
            RequestError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::NotAuthorized(message) => (
                StatusCode::UNAUTHORIZED,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::Forbidden => (
                StatusCode::FORBIDDEN,
                RequestErrorJsonWrapper::new("Forbidden"),
            ),
            RequestError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                RequestErrorJsonWrapper::from_fields(fields),
            ),
            RequestError::RunTimeError(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                RequestErrorJsonWrapper::new(message),
            ),
            RequestError::ServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                RequestErrorJsonWrapper::new("Internal Server Error"),
            ),
            RequestError::DatabaseError(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    RequestErrorJsonWrapper::new("Internal Server Error"),
                )
            }
        };
        (status_code, Json(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_group_by_field() {
        let wrapper = RequestErrorJsonWrapper::from_fields(&[
            FieldError::new("title", "This field is required."),
            FieldError::new("title", "Too long."),
            FieldError::new("body", "This field is required."),
        ]);
        let value = serde_json::to_value(&wrapper).unwrap();
        assert_eq!(value["errors"]["title"].as_array().unwrap().len(), 2);
        assert_eq!(value["errors"]["body"].as_array().unwrap().len(), 1);
    }
}
