//! Explicit form configuration: each form enumerates its fields (name, input
//! kind, required flag, length bound) and validation walks that list, so the
//! data contract lives in one place and carries no presentation hints.

use serde::Serialize;

use crate::errors::FieldError;

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Password,
    Select,
    MultiSelect,
    File,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_length: Option<usize>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FormSpec {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

pub static POST_FORM: FormSpec = FormSpec {
    name: "post",
    fields: &[
        FieldSpec {
            name: "title",
            kind: FieldKind::Text,
            required: true,
            max_length: Some(200),
        },
        FieldSpec {
            name: "excerpt",
            kind: FieldKind::TextArea,
            required: false,
            max_length: Some(300),
        },
        FieldSpec {
            name: "body",
            kind: FieldKind::TextArea,
            required: true,
            max_length: None,
        },
        FieldSpec {
            name: "category",
            kind: FieldKind::Select,
            required: false,
            max_length: None,
        },
        FieldSpec {
            name: "tags",
            kind: FieldKind::MultiSelect,
            required: false,
            max_length: None,
        },
        FieldSpec {
            name: "featured_image",
            kind: FieldKind::File,
            required: false,
            max_length: None,
        },
    ],
};

pub static COMMENT_FORM: FormSpec = FormSpec {
    name: "comment",
    fields: &[
        FieldSpec {
            name: "email",
            kind: FieldKind::Email,
            required: false,
            max_length: Some(254),
        },
        FieldSpec {
            name: "body",
            kind: FieldKind::TextArea,
            required: true,
            max_length: None,
        },
    ],
};

pub static REGISTRATION_FORM: FormSpec = FormSpec {
    name: "registration",
    fields: &[
        FieldSpec {
            name: "username",
            kind: FieldKind::Text,
            required: true,
            max_length: Some(150),
        },
        FieldSpec {
            name: "email",
            kind: FieldKind::Email,
            required: true,
            max_length: Some(254),
        },
        FieldSpec {
            name: "password",
            kind: FieldKind::Password,
            required: true,
            max_length: None,
        },
        FieldSpec {
            name: "password_confirm",
            kind: FieldKind::Password,
            required: true,
            max_length: None,
        },
        FieldSpec {
            name: "first_name",
            kind: FieldKind::Text,
            required: false,
            max_length: Some(150),
        },
        FieldSpec {
            name: "last_name",
            kind: FieldKind::Text,
            required: false,
            max_length: Some(150),
        },
    ],
};

impl FormSpec {
    /// Walks the field list against the submitted values and collects the
    /// per-field messages. Cross-field checks (password confirmation,
    /// uniqueness against the store) are appended by the caller.
    pub fn validate<F>(&self, value_of: F) -> Vec<FieldError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut errors = Vec::new();
        for field in self.fields {
            let value = value_of(field.name).unwrap_or_default();
            let value = value.trim();
            if field.required && value.is_empty() {
                errors.push(FieldError::new(field.name, "This field is required."));
                continue;
            }
            if let Some(max) = field.max_length {
                if value.chars().count() > max {
                    errors.push(FieldError::new(
                        field.name,
                        format!("Ensure this value has at most {} characters.", max),
                    ));
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn missing_required_fields_are_reported() {
        let submitted = values(&[("excerpt", "short")]);
        let errors = POST_FORM.validate(|name| submitted.get(name).cloned());
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"title"));
        assert!(fields.contains(&"body"));
        assert!(!fields.contains(&"excerpt"));
    }

    #[test]
    fn overlong_values_are_reported() {
        let submitted = values(&[
            ("title", &"x".repeat(201)),
            ("body", "fine"),
            ("excerpt", &"y".repeat(301)),
        ]);
        let errors = POST_FORM.validate(|name| submitted.get(name).cloned());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.message.contains("at most")));
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let submitted = values(&[("body", "   ")]);
        let errors = COMMENT_FORM.validate(|name| submitted.get(name).cloned());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "body");
    }
}
