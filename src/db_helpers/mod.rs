mod category_helpers;
mod comment_helpers;
mod dashboard_helpers;
mod interaction_helpers;
mod post_helpers;
mod profile_helpers;
mod tag_helpers;
mod user_helpers;

pub use category_helpers::*;
pub use comment_helpers::*;
pub use dashboard_helpers::*;
pub use interaction_helpers::*;
pub use post_helpers::*;
pub use profile_helpers::*;
pub use tag_helpers::*;
pub use user_helpers::*;

// Assembles a dynamic SET clause from the fields a request actually carried.
// Placeholders are numbered from the current parameter count so the caller
// can append its own (e.g. the WHERE id) after build().
struct QueryBuilder {
    query: String,
    params: Vec<String>,
    separator: &'static str,
}

impl QueryBuilder {
    fn new(separator: &'static str) -> Self {
        Self {
            query: String::new(),
            params: Vec::new(),
            separator,
        }
    }

    fn add_param(mut self, column: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            if !self.query.is_empty() {
                self.query.push_str(self.separator);
            }
            self.query
                .push_str(&format!("{} = ${}", column, self.params.len() + 1));
            self.params.push(value);
        }
        self
    }

    pub fn build(self) -> (String, Vec<String>) {
        (self.query, self.params)
    }
}

#[cfg(test)]
mod tests {
    use super::QueryBuilder;

    #[test]
    fn builds_only_provided_columns() {
        let (query, params) = QueryBuilder::new(", ")
            .add_param("title", Some("A title".to_string()))
            .add_param("excerpt", None)
            .add_param("body", Some("text".to_string()))
            .build();
        assert_eq!(query, "title = $1, body = $2");
        assert_eq!(params, vec!["A title".to_string(), "text".to_string()]);
    }

    #[test]
    fn empty_when_nothing_provided() {
        let (query, params) = QueryBuilder::new(", ").add_param("title", None).build();
        assert!(query.is_empty());
        assert!(params.is_empty());
    }
}
