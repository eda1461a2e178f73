//! Booking request schema and spam screening.
//!
//! The request body is an arbitrary JSON value; [`validate`] checks it field
//! by field and either produces a typed [`ContactForm`] or a map from field
//! name to a user-facing message (one message per failing field).
//!
//! | Field | Rule |
//! |-------|------|
//! | `name` | 2–100 characters |
//! | `email` | valid address |
//! | `phone` | 9–20 characters |
//! | `bodyArea`, `size` | 2–100 characters |
//! | `message` | 10–2000 characters |
//! | `reference` | optional; absent, empty, or an absolute URL |
//!
//! Lengths count characters, not bytes.

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Field name → message for every field that failed validation.
pub type FieldErrors = BTreeMap<String, String>;

const REQUIRED: &str = "Campo obligatorio";
const EXPECTED_TEXT: &str = "Debe ser texto";
const INVALID_EMAIL: &str = "Email inválido";
const INVALID_URL: &str = "URL inválida";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern must compile")
});

/// A validated booking request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub body_area: String,
    pub size: String,
    pub message: String,
    /// Reference image URL; `None` when absent or empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

struct Length {
    field: &'static str,
    min: usize,
    max: usize,
    too_short: &'static str,
    too_long: &'static str,
}

const NAME: Length = Length {
    field: "name",
    min: 2,
    max: 100,
    too_short: "El nombre debe tener al menos 2 caracteres",
    too_long: "El nombre no puede superar 100 caracteres",
};

const PHONE: Length = Length {
    field: "phone",
    min: 9,
    max: 20,
    too_short: "Teléfono inválido",
    too_long: "Teléfono inválido",
};

const BODY_AREA: Length = Length {
    field: "bodyArea",
    min: 2,
    max: 100,
    too_short: "Indica la zona del cuerpo",
    too_long: "La zona no puede superar 100 caracteres",
};

const SIZE: Length = Length {
    field: "size",
    min: 2,
    max: 100,
    too_short: "Indica el tamaño aproximado",
    too_long: "El tamaño no puede superar 100 caracteres",
};

const MESSAGE: Length = Length {
    field: "message",
    min: 10,
    max: 2000,
    too_short: "El mensaje debe tener al menos 10 caracteres",
    too_long: "El mensaje no puede superar 2000 caracteres",
};

/// Check a request body against the booking schema.
pub fn validate(body: &Value) -> Result<ContactForm, FieldErrors> {
    let fields = body.as_object();
    let field = |name: &str| fields.and_then(|f| f.get(name));
    let mut errors = FieldErrors::new();

    let name = check_length(&NAME, field("name"), &mut errors);
    let email = check_email(field("email"), &mut errors);
    let phone = check_length(&PHONE, field("phone"), &mut errors);
    let body_area = check_length(&BODY_AREA, field("bodyArea"), &mut errors);
    let size = check_length(&SIZE, field("size"), &mut errors);
    let message = check_length(&MESSAGE, field("message"), &mut errors);
    let reference = check_reference(field("reference"), &mut errors);

    match (name, email, phone, body_area, size, message, reference) {
        (
            Some(name),
            Some(email),
            Some(phone),
            Some(body_area),
            Some(size),
            Some(message),
            Some(reference),
        ) if errors.is_empty() => Ok(ContactForm {
            name,
            email,
            phone,
            body_area,
            size,
            message,
            reference,
        }),
        _ => Err(errors),
    }
}

fn text<'a>(field: &str, value: Option<&'a Value>, errors: &mut FieldErrors) -> Option<&'a str> {
    match value {
        None => {
            errors.insert(field.to_string(), REQUIRED.to_string());
            None
        }
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            errors.insert(field.to_string(), EXPECTED_TEXT.to_string());
            None
        }
    }
}

fn check_length(rule: &Length, value: Option<&Value>, errors: &mut FieldErrors) -> Option<String> {
    let s = text(rule.field, value, errors)?;
    let len = s.chars().count();
    let message = if len < rule.min {
        rule.too_short
    } else if len > rule.max {
        rule.too_long
    } else {
        return Some(s.to_string());
    };
    errors.insert(rule.field.to_string(), message.to_string());
    None
}

fn check_email(value: Option<&Value>, errors: &mut FieldErrors) -> Option<String> {
    let s = text("email", value, errors)?;
    if is_valid_email(s) {
        Some(s.to_string())
    } else {
        errors.insert("email".to_string(), INVALID_EMAIL.to_string());
        None
    }
}

/// Outer `None` means the field failed; inner `None` means no reference.
fn check_reference(value: Option<&Value>, errors: &mut FieldErrors) -> Option<Option<String>> {
    if value.is_none() {
        return Some(None);
    }
    let s = text("reference", value, errors)?;
    if s.is_empty() {
        Some(None)
    } else if url::Url::parse(s).is_ok() {
        Some(Some(s.to_string()))
    } else {
        errors.insert("reference".to_string(), INVALID_URL.to_string());
        None
    }
}

/// Local part and domain in the usual shape, no leading dot, no `..`.
pub fn is_valid_email(s: &str) -> bool {
    !s.starts_with('.') && !s.contains("..") && EMAIL_RE.is_match(s)
}

/// Case-insensitive substring denylist over a submission's name and message.
#[derive(Debug, Clone)]
pub struct SpamFilter {
    keywords: Vec<String>,
}

impl SpamFilter {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn is_spam(&self, form: &ContactForm) -> bool {
        let message = form.message.to_lowercase();
        let name = form.name.to_lowercase();
        self.keywords
            .iter()
            .any(|k| message.contains(k.as_str()) || name.contains(k.as_str()))
    }
}
