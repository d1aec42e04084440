//! Client-side input checks run before hitting the backend.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{Error, Result};

/// Minimum accepted password length on the login form
pub const MIN_PASSWORD_LEN: usize = 6;

/// Path fragment every QR login URL must contain
pub const QR_LOGIN_PATH: &str = "/auth/qr-login/";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex"))
}

fn hex_color_regex() -> &'static Regex {
    static HEX_COLOR: OnceLock<Regex> = OnceLock::new();
    HEX_COLOR.get_or_init(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn is_hex_color(value: &str) -> bool {
    hex_color_regex().is_match(value)
}

/// Check the email/password pair before submitting the login form.
pub fn validate_login(email: &str, password: &str) -> Result<()> {
    if email.is_empty() || password.is_empty() {
        return Err(Error::Validation(
            "email and password are required".to_string(),
        ));
    }
    if !is_valid_email(email) {
        return Err(Error::Validation("invalid email".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::Validation("password is too short".to_string()));
    }
    Ok(())
}

/// Reject scanned payloads that are not QR login links.
pub fn validate_qr_login_url(url: &str) -> Result<()> {
    let url = url.trim();
    if !url.contains(QR_LOGIN_PATH) {
        return Err(Error::Validation(
            "QR code is not a valid login code".to_string(),
        ));
    }
    if !crate::util::is_http_url(url) {
        return Err(Error::Validation(
            "QR login URL must include http:// or https://".to_string(),
        ));
    }
    Ok(())
}
