//! Input validation for account payloads

use common::validation::{ValidationErrors, char_len};
use regex::Regex;
use std::sync::OnceLock;

use crate::models::{RegisterRequest, UpdateProfileRequest};

pub const MAX_USERNAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 100;
pub const MAX_DISPLAY_NAME_LEN: usize = 100;
pub const MAX_AVATAR_URL_LEN: usize = 255;

/// Registration fields after trimming and normalization
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

/// Profile fields after validation; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileChanges {
    pub display_name: Option<Option<String>>,
    pub avatar_url: Option<Option<String>>,
}

pub fn validate_registration(request: RegisterRequest) -> Result<Registration, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let username = request.username.trim().to_string();
    errors.check("username", validate_username(&username));

    let email = normalize_email(&request.email);
    errors.check("email", validate_email(&email));

    errors.check("password", validate_password(&request.password));

    let display_name = non_blank(request.display_name);
    errors.check(
        "display_name",
        max_len(display_name.as_deref(), MAX_DISPLAY_NAME_LEN, "Display name"),
    );

    errors.into_result()?;
    Ok(Registration {
        username,
        email,
        password: request.password,
        display_name,
    })
}

pub fn validate_profile(request: UpdateProfileRequest) -> Result<ProfileChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let display_name = request.display_name.map(|v| non_blank(Some(v)));
    if let Some(value) = &display_name {
        errors.check(
            "display_name",
            max_len(value.as_deref(), MAX_DISPLAY_NAME_LEN, "Display name"),
        );
    }

    let avatar_url = request.avatar_url.map(|v| non_blank(Some(v)));
    if let Some(value) = &avatar_url {
        errors.check(
            "avatar_url",
            max_len(value.as_deref(), MAX_AVATAR_URL_LEN, "Avatar URL"),
        );
    }

    errors.into_result()?;
    Ok(ProfileChanges {
        display_name,
        avatar_url,
    })
}

/// Trimmed, lowercased email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern compiles"))
}

/// ASCII letters, digits and `_`, between 3 and 50 long
pub fn validate_username(username: &str) -> Result<(), String> {
    static USERNAME: OnceLock<Regex> = OnceLock::new();

    match username.len() {
        0 => Err("Username is required".to_string()),
        n if n < MIN_USERNAME_LEN => Err(format!(
            "Username needs at least {} characters",
            MIN_USERNAME_LEN
        )),
        n if n > MAX_USERNAME_LEN => Err(format!(
            "Username allows at most {} characters",
            MAX_USERNAME_LEN
        )),
        _ if !pattern(&USERNAME, r"^[A-Za-z0-9_]+$").is_match(username) => {
            Err("Username may use only letters, digits and underscores".to_string())
        }
        _ => Ok(()),
    }
}

/// Expects an already normalized address
pub fn validate_email(email: &str) -> Result<(), String> {
    static EMAIL: OnceLock<Regex> = OnceLock::new();

    if email.is_empty() {
        Err("Email is required".to_string())
    } else if email.len() > MAX_EMAIL_LEN {
        Err(format!("Email allows at most {} characters", MAX_EMAIL_LEN))
    } else if !pattern(&EMAIL, r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").is_match(email) {
        Err("Email address is malformed".to_string())
    } else {
        Ok(())
    }
}

/// 8 to 128 characters mixing upper case, lower case, a digit and a symbol
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    let length = char_len(password);
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&length) {
        return Err(format!(
            "Password must be {} to {} characters",
            MIN_PASSWORD_LEN, MAX_PASSWORD_LEN
        ));
    }

    let classes: [(fn(&char) -> bool, &str); 4] = [
        (|c| c.is_uppercase(), "an upper-case letter"),
        (|c| c.is_lowercase(), "a lower-case letter"),
        (|c| c.is_ascii_digit(), "a digit"),
        (|c| !c.is_alphanumeric(), "a symbol"),
    ];

    match classes
        .iter()
        .find(|(matches, _)| !password.chars().any(|c| matches(&c)))
    {
        Some((_, missing)) => Err(format!("Password needs {}", missing)),
        None => Ok(()),
    }
}

fn max_len(value: Option<&str>, max: usize, label: &str) -> Result<(), String> {
    match value {
        Some(v) if char_len(v) > max => {
            Err(format!("{} must be at most {} characters long", label, max))
        }
        _ => Ok(()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
