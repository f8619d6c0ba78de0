//! Form schemas: explicit field tables with per-field validation.
//!
//! Each form is a static [`FormSchema`] listing its fields. Submitted data
//! (a flat name → value map, as decoded from `application/x-www-form-urlencoded`)
//! is cleaned against the schema, producing either the trimmed values or a set
//! of field-level errors that the page re-renders next to the inputs.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::slug::{self, SLUG_MAX_LENGTH};

/// Key under which errors not tied to one field are reported.
pub const NON_FIELD_ERRORS: &str = "__all__";

pub const REQUIRED_MESSAGE: &str = "Обязательное поле.";

pub const INVALID_SLUG_MESSAGE: &str =
    "Введите правильный \"slug\", состоящий из латинских букв, цифр, знаков подчеркивания или дефисов.";

pub const INVALID_USERNAME_MESSAGE: &str =
    "Введите правильное имя пользователя. Оно может содержать только буквы, цифры и знаки @/./+/-/_.";

/// Extra check run on a non-empty field value.
pub type Validator = fn(&str) -> Result<(), String>;

/// Input widget kind, passed through to the template layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    TextArea,
    Slug,
    Password,
}

/// One field of a form.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub max_length: Option<usize>,
    #[serde(skip)]
    pub validator: Option<Validator>,
    /// Extra guidance shown under the input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_text: Option<&'static str>,
}

/// A named list of fields.
#[derive(Debug, Clone, Copy)]
pub struct FormSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

fn validate_slug(value: &str) -> Result<(), String> {
    if slug::is_valid_slug(value) {
        Ok(())
    } else {
        Err(INVALID_SLUG_MESSAGE.to_string())
    }
}

fn validate_username(value: &str) -> Result<(), String> {
    let ok = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if ok {
        Ok(())
    } else {
        Err(INVALID_USERNAME_MESSAGE.to_string())
    }
}

/// Maximum title length, in characters.
pub const TITLE_MAX_LENGTH: usize = 100;

/// Maximum username length, in characters.
pub const USERNAME_MAX_LENGTH: usize = 150;

/// The note add/edit form.
pub const NOTE_FORM: FormSchema = FormSchema {
    name: "note",
    fields: &[
        FieldSpec {
            name: "title",
            label: "Заголовок",
            kind: FieldKind::Text,
            required: true,
            max_length: Some(TITLE_MAX_LENGTH),
            validator: None,
            help_text: Some("Дайте короткое название заметке"),
        },
        FieldSpec {
            name: "text",
            label: "Текст",
            kind: FieldKind::TextArea,
            required: true,
            max_length: None,
            validator: None,
            help_text: Some("Добавьте подробностей"),
        },
        FieldSpec {
            name: "slug",
            label: "Адрес для страницы с заметкой",
            kind: FieldKind::Slug,
            required: false,
            max_length: Some(SLUG_MAX_LENGTH),
            validator: Some(validate_slug),
            help_text: Some(
                "Укажите адрес для страницы заметки. Используйте только латиницу, цифры, дефисы и знаки подчёркивания",
            ),
        },
    ],
};

pub const LOGIN_FORM: FormSchema = FormSchema {
    name: "login",
    fields: &[
        FieldSpec {
            name: "username",
            label: "Имя пользователя",
            kind: FieldKind::Text,
            required: true,
            max_length: Some(USERNAME_MAX_LENGTH),
            validator: None,
            help_text: None,
        },
        FieldSpec {
            name: "password",
            label: "Пароль",
            kind: FieldKind::Password,
            required: true,
            max_length: None,
            validator: None,
            help_text: None,
        },
    ],
};

pub const SIGNUP_FORM: FormSchema = FormSchema {
    name: "signup",
    fields: &[
        FieldSpec {
            name: "username",
            label: "Имя пользователя",
            kind: FieldKind::Text,
            required: true,
            max_length: Some(USERNAME_MAX_LENGTH),
            validator: Some(validate_username),
            help_text: None,
        },
        FieldSpec {
            name: "password1",
            label: "Пароль",
            kind: FieldKind::Password,
            required: true,
            max_length: None,
            validator: None,
            help_text: None,
        },
        FieldSpec {
            name: "password2",
            label: "Подтверждение пароля",
            kind: FieldKind::Password,
            required: true,
            max_length: None,
            validator: None,
            help_text: None,
        },
    ],
};

// ============================================================================
// Errors
// ============================================================================

/// Validation errors keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("form has errors in {} field(s)", .0.len())]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// A form with a single error on `field`.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Errors reported for `field`, empty if none.
    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        self.field(NON_FIELD_ERRORS)
    }
}

// ============================================================================
// Cleaning
// ============================================================================

/// Trimmed values of a form that passed validation.
///
/// Optional fields left blank are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedData(BTreeMap<&'static str, String>);

impl CleanedData {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Take a value out, leaving the field absent.
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.0.remove(name)
    }
}

/// A field prepared for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct BoundField {
    #[serde(flatten)]
    pub spec: FieldSpec,
    pub value: String,
}

/// Everything a template needs to draw a form.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub name: &'static str,
    pub fields: Vec<BoundField>,
    pub errors: FormErrors,
}

impl FormSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate submitted data against the schema.
    ///
    /// Values other than passwords are trimmed. Unknown keys are ignored.
    pub fn clean(&self, data: &BTreeMap<String, String>) -> Result<CleanedData, FormErrors> {
        let mut cleaned = BTreeMap::new();
        let mut errors = FormErrors::new();

        for spec in self.fields {
            let raw = data.get(spec.name).map(String::as_str).unwrap_or("");
            let value = match spec.kind {
                FieldKind::Password => raw,
                _ => raw.trim(),
            };

            if value.is_empty() {
                if spec.required {
                    errors.add(spec.name, REQUIRED_MESSAGE);
                }
                continue;
            }

            if let Some(max) = spec.max_length {
                let len = value.chars().count();
                if len > max {
                    errors.add(
                        spec.name,
                        format!(
                            "Убедитесь, что это значение содержит не более {max} символов (сейчас {len})."
                        ),
                    );
                    continue;
                }
            }

            if let Some(validator) = spec.validator {
                if let Err(message) = validator(value) {
                    errors.add(spec.name, message);
                    continue;
                }
            }

            cleaned.insert(spec.name, value.to_string());
        }

        if errors.is_empty() {
            Ok(CleanedData(cleaned))
        } else {
            Err(errors)
        }
    }

    /// An empty, unbound form.
    pub fn blank(&self) -> FormView {
        self.bind(&BTreeMap::new(), FormErrors::new())
    }

    /// Bind submitted or initial values, with any errors, for rendering.
    ///
    /// Password values are never echoed back.
    pub fn bind(&self, data: &BTreeMap<String, String>, errors: FormErrors) -> FormView {
        let fields = self
            .fields
            .iter()
            .map(|spec| BoundField {
                spec: *spec,
                value: match spec.kind {
                    FieldKind::Password => String::new(),
                    _ => data.get(spec.name).cloned().unwrap_or_default(),
                },
            })
            .collect();

        FormView {
            name: self.name,
            fields,
            errors,
        }
    }
}

// ============================================================================
// Note form
// ============================================================================

/// Cleaned contents of the note form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteForm {
    pub title: String,
    pub text: String,
    /// Absent when the author left it blank.
    pub slug: Option<String>,
}

impl NoteForm {
    /// Clean submitted data with [`NOTE_FORM`].
    pub fn from_data(data: &BTreeMap<String, String>) -> Result<Self, FormErrors> {
        let mut cleaned = NOTE_FORM.clean(data)?;
        Ok(Self {
            title: cleaned.take("title").unwrap_or_default(),
            text: cleaned.take("text").unwrap_or_default(),
            slug: cleaned.take("slug"),
        })
    }

    /// Form data reproducing this form, for prefilling a page.
    pub fn to_data(&self) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        data.insert("title".to_string(), self.title.clone());
        data.insert("text".to_string(), self.text.clone());
        if let Some(slug) = &self.slug {
            data.insert("slug".to_string(), slug.clone());
        }
        data
    }
}
