//! Request validation. One validator per endpoint; each checks every field
//! and reports all violations together in a single 400, so a client sees
//! the full list instead of fixing fields one at a time.
//!
//! Validators run inside the handlers, after authentication and before any
//! store call.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::store::models::Weather;
use crate::types::ObjectId;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MAX_NAME_LENGTH: usize = 30;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// JSON extractor that reports malformed payloads as a classified
/// BadRequest instead of the framework's default rejection.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(ApiError::bad_request(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        }
    }
}

// Request bodies. Every field is optional at the deserialization layer so
// that missing fields surface as field errors, not as parse failures.

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SigninBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileBody {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemBody {
    pub name: Option<String>,
    pub weather: Option<String>,
    pub image_url: Option<String>,
}

// Validated inputs handed to the domain operations.

#[derive(Debug)]
pub struct SignupInput {
    pub name: String,
    pub avatar: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct ProfileInput {
    pub name: String,
    pub avatar: Option<String>,
}

#[derive(Debug)]
pub struct NewItemInput {
    pub name: String,
    pub weather: Weather,
    pub image_url: String,
}

pub fn validate_signup(body: SignupBody) -> Result<SignupInput, ApiError> {
    let mut errors = FieldErrors::default();

    let name = require_name(&mut errors, "name", body.name);
    let avatar = match body.avatar {
        Some(url) if !url.is_empty() => {
            check_url(&mut errors, "avatar", &url);
            url
        }
        // optional, defaults to empty
        _ => String::new(),
    };
    let email = require_email(&mut errors, "email", body.email);
    let password = require_password(&mut errors, "password", body.password);

    errors.into_result()?;
    Ok(SignupInput {
        name,
        avatar,
        email,
        password,
    })
}

pub fn validate_signin(body: SigninBody) -> Result<Credentials, ApiError> {
    let mut errors = FieldErrors::default();

    let email = require_email(&mut errors, "email", body.email);
    let password = require_password(&mut errors, "password", body.password);

    errors.into_result()?;
    Ok(Credentials { email, password })
}

pub fn validate_profile_update(body: UpdateProfileBody) -> Result<ProfileInput, ApiError> {
    let mut errors = FieldErrors::default();

    let name = require_name(&mut errors, "name", body.name);
    let avatar = match body.avatar {
        Some(url) if !url.is_empty() => {
            check_url(&mut errors, "avatar", &url);
            Some(url)
        }
        Some(_) => Some(String::new()),
        None => None,
    };

    errors.into_result()?;
    Ok(ProfileInput { name, avatar })
}

pub fn validate_new_item(body: CreateItemBody) -> Result<NewItemInput, ApiError> {
    let mut errors = FieldErrors::default();

    let name = require_name(&mut errors, "name", body.name);
    let weather = match body.weather {
        None => {
            errors.push("weather", "The \"weather\" field must be filled in");
            None
        }
        Some(raw) => match raw.parse::<Weather>() {
            Ok(weather) => Some(weather),
            Err(_) => {
                errors.push(
                    "weather",
                    "The \"weather\" field must be one of: hot, warm, cold",
                );
                None
            }
        },
    };
    let image_url = require_url(&mut errors, "imageUrl", body.image_url);

    errors.into_result()?;
    let weather = weather.ok_or_else(|| ApiError::bad_request("Invalid data"))?;
    Ok(NewItemInput {
        name,
        weather,
        image_url,
    })
}

/// Path-parameter ids must be 24 hexadecimal characters.
pub fn validate_item_id(raw: &str) -> Result<ObjectId, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::bad_request("The \"id\" must be a valid 24-character hexadecimal string")
    })
}

/// Structural email check: one `@`, non-empty local part, dotted domain,
/// no whitespace.
pub fn is_valid_email(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// http(s) URLs only.
pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Collects one message per offending field; first violation per field
/// wins.
#[derive(Debug, Default)]
struct FieldErrors(HashMap<String, String>);

impl FieldErrors {
    fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error("Invalid data", self.0))
        }
    }
}

fn require_name(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    let Some(value) = value else {
        errors.push(field, format!("The \"{}\" field must be filled in", field));
        return String::new();
    };

    let length = value.chars().count();
    if length < MIN_NAME_LENGTH {
        errors.push(
            field,
            format!(
                "The minimum length of the \"{}\" field is {}",
                field, MIN_NAME_LENGTH
            ),
        );
    } else if length > MAX_NAME_LENGTH {
        errors.push(
            field,
            format!(
                "The maximum length of the \"{}\" field is {}",
                field, MAX_NAME_LENGTH
            ),
        );
    }
    value
}

fn require_email(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    let Some(value) = value else {
        errors.push(field, format!("The \"{}\" field must be filled in", field));
        return String::new();
    };

    if !is_valid_email(&value) {
        errors.push(
            field,
            format!("The \"{}\" field must be a valid email", field),
        );
    }
    value
}

fn require_password(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    let Some(value) = value else {
        errors.push(field, format!("The \"{}\" field must be filled in", field));
        return String::new();
    };

    if value.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(
            field,
            format!(
                "The minimum length of the \"{}\" field is {}",
                field, MIN_PASSWORD_LENGTH
            ),
        );
    }
    value
}

fn require_url(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    let Some(value) = value else {
        errors.push(field, format!("The \"{}\" field must be filled in", field));
        return String::new();
    };

    check_url(errors, field, &value);
    value
}

fn check_url(errors: &mut FieldErrors, field: &str, value: &str) {
    if !is_valid_url(value) {
        errors.push(field, format!("The \"{}\" field must be a valid url", field));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn field_errors(err: ApiError) -> HashMap<String, String> {
        match err {
            ApiError::BadRequest {
                field_errors: Some(fields),
                ..
            } => fields,
            other => panic!("expected a validation error, got: {:?}", other),
        }
    }

    #[test]
    fn signup_accepts_a_valid_body() {
        let input = validate_signup(SignupBody {
            name: Some("Al".to_string()),
            avatar: Some("https://example.com/a.png".to_string()),
            email: Some("a@a.com".to_string()),
            password: Some("password-123".to_string()),
        })
        .unwrap();

        assert_eq!(input.name, "Al");
        assert_eq!(input.avatar, "https://example.com/a.png");
    }

    #[test]
    fn signup_avatar_defaults_to_empty() {
        let input = validate_signup(SignupBody {
            name: Some("Al".to_string()),
            avatar: None,
            email: Some("a@a.com".to_string()),
            password: Some("password-123".to_string()),
        })
        .unwrap();

        assert_eq!(input.avatar, "");
    }

    #[test]
    fn signup_reports_every_violation_at_once() {
        let err = validate_signup(SignupBody {
            name: Some("A".to_string()),
            avatar: Some("not a url".to_string()),
            email: Some("not-an-email".to_string()),
            password: Some("short".to_string()),
        })
        .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let fields = field_errors(err);
        assert_eq!(fields.len(), 4);
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("avatar"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn signup_requires_all_mandatory_fields() {
        let err = validate_signup(SignupBody {
            name: None,
            avatar: None,
            email: None,
            password: None,
        })
        .unwrap_err();

        let fields = field_errors(err);
        assert!(fields["name"].contains("must be filled in"));
        assert!(fields["email"].contains("must be filled in"));
        assert!(fields["password"].contains("must be filled in"));
        // avatar is optional
        assert!(!fields.contains_key("avatar"));
    }

    #[test]
    fn name_length_bounds_count_characters_not_bytes() {
        let err = validate_new_item(CreateItemBody {
            name: Some("é".to_string()),
            weather: Some("hot".to_string()),
            image_url: Some("https://example.com/x.png".to_string()),
        })
        .unwrap_err();
        assert!(field_errors(err)["name"].contains("minimum length"));

        let ok = validate_new_item(CreateItemBody {
            name: Some("éé".to_string()),
            weather: Some("hot".to_string()),
            image_url: Some("https://example.com/x.png".to_string()),
        });
        assert!(ok.is_ok());

        let err = validate_new_item(CreateItemBody {
            name: Some("x".repeat(31)),
            weather: Some("hot".to_string()),
            image_url: Some("https://example.com/x.png".to_string()),
        })
        .unwrap_err();
        assert!(field_errors(err)["name"].contains("maximum length"));
    }

    #[test]
    fn weather_must_be_in_the_enum() {
        let err = validate_new_item(CreateItemBody {
            name: Some("Cap".to_string()),
            weather: Some("sunny".to_string()),
            image_url: Some("https://example.com/cap.png".to_string()),
        })
        .unwrap_err();

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(field_errors(err)["weather"].contains("hot, warm, cold"));
    }

    #[test]
    fn signin_requires_both_fields() {
        let err = validate_signin(SigninBody {
            email: None,
            password: None,
        })
        .unwrap_err();

        let fields = field_errors(err);
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn profile_update_requires_a_name_but_not_an_avatar() {
        let input = validate_profile_update(UpdateProfileBody {
            name: Some("New Name".to_string()),
            avatar: None,
        })
        .unwrap();
        assert_eq!(input.avatar, None);

        let err = validate_profile_update(UpdateProfileBody {
            name: None,
            avatar: Some("https://example.com/new.png".to_string()),
        })
        .unwrap_err();
        assert!(field_errors(err).contains_key("name"));
    }

    #[test]
    fn item_ids_must_be_24_hex_chars() {
        assert!(validate_item_id("5d8b8592978f8bd833ca8133").is_ok());
        assert!(validate_item_id("000000000000000000000000").is_ok());

        for bad in ["", "abc", "5d8b8592978f8bd833ca813", "zzzzzzzzzzzzzzzzzzzzzzzz"] {
            let err = validate_item_id(bad).unwrap_err();
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn email_validity_table() {
        for good in ["a@a.com", "first.last@sub.example.org", "x+tag@example.io"] {
            assert!(is_valid_email(good), "{} should be valid", good);
        }
        for bad in [
            "",
            "plain",
            "@example.com",
            "a@b@c.com",
            "a@nodot",
            "a@.com",
            "a@com.",
            "has space@example.com",
        ] {
            assert!(!is_valid_email(bad), "{} should be invalid", bad);
        }
    }

    #[test]
    fn url_validity_table() {
        for good in ["http://x.com/a.png", "https://example.com"] {
            assert!(is_valid_url(good), "{} should be valid", good);
        }
        for bad in ["", "not a url", "ftp://example.com/file", "javascript:alert(1)"] {
            assert!(!is_valid_url(bad), "{} should be invalid", bad);
        }
    }
}
