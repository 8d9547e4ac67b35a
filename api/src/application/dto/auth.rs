use once_cell::sync::Lazy;
use regex::Regex;

use crate::application::dto::{optional_text, required_text};
use crate::application::error::{AppError, AppResult};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Where a session request came from; stored alongside the session.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

pub fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    if email.len() > 254 || !EMAIL_RE.is_match(&email) {
        return Err(AppError::validation("invalid email address"));
    }
    Ok(email)
}

pub fn check_password(password: &str) -> AppResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at most {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl SignUpRequest {
    /// Returns the normalized (email, name, image) triple.
    pub fn validate(&self) -> AppResult<(String, String, Option<String>)> {
        let email = normalize_email(&self.email)?;
        check_password(&self.password)?;
        let name = required_text("name", &self.name, 100)?;
        let image = optional_text("image", self.image.as_deref(), 2048)?;
        Ok((email, name, image))
    }
}

impl SignInRequest {
    pub fn validate(&self) -> AppResult<String> {
        let email = normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err(AppError::validation("password is required"));
        }
        Ok(email)
    }
}
