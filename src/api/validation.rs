//! Client-side checks mirroring the dashboard forms.
//!
//! The backend stays the authority on every rule here; these checks fail
//! closed so obviously invalid input never reaches the network. Collect
//! multiple failures with `ValidationErrorBuilder` from the `error` module.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Loose email shape check, same strictness as the form's `type: email`
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$"
    ).unwrap();

    /// Phone numbers: optional leading +, 8-15 digits
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9]{8,15}$").unwrap();

    /// Accepted upload extensions
    static ref IMAGE_EXTENSION_REGEX: Regex = Regex::new(
        r"(?i)\.(jpe?g|png|gif|bmp|webp)$"
    ).unwrap();
}

/// MIME types accepted for avatar, main and additional images
pub const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/jpg",
    "image/gif",
    "image/bmp",
    "image/webp",
];

pub const MIN_PASSWORD_LEN: usize = 6;

/// Bounding box used by the location pickers
pub const LATITUDE_RANGE: (f64, f64) = (8.0, 23.0);
pub const LONGITUDE_RANGE: (f64, f64) = (102.0, 114.0);

pub fn validate_required(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > 254 || !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), String> {
    if phone.is_empty() {
        return Err("Phone number is required".to_string());
    }
    if !PHONE_REGEX.is_match(phone) {
        return Err("Invalid phone number format".to_string());
    }
    Ok(())
}

/// Discount percentage, inclusive on both ends
pub fn validate_percent(percent: f64) -> Result<(), String> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err("Discount must be between 0 and 100".to_string());
    }
    Ok(())
}

pub fn validate_quantity(quantity: i64) -> Result<(), String> {
    if quantity < 0 {
        return Err("Quantity must be non-negative".to_string());
    }
    Ok(())
}

/// `end` must be strictly after `start`; equal instants are rejected
pub fn validate_date_range(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    start_label: &str,
    end_label: &str,
) -> Result<(), String> {
    if end <= start {
        return Err(format!("{} must be after {}", end_label, start_label));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    Ok(())
}

pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<(), String> {
    if password != confirmation {
        return Err("Passwords do not match".to_string());
    }
    Ok(())
}

pub fn within_bounds(latitude: f64, longitude: f64) -> bool {
    (LATITUDE_RANGE.0..=LATITUDE_RANGE.1).contains(&latitude)
        && (LONGITUDE_RANGE.0..=LONGITUDE_RANGE.1).contains(&longitude)
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), String> {
    if !within_bounds(latitude, longitude) {
        return Err("Location is outside Vietnam".to_string());
    }
    Ok(())
}

pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
}

pub fn validate_image_file_name(file_name: &str) -> Result<(), String> {
    if !IMAGE_EXTENSION_REGEX.is_match(file_name) {
        return Err(format!(
            "Unsupported image format for {}. Accepted: .jpeg, .png, .jpg, .gif, .bmp, .webp",
            file_name
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_validate_required() {
        assert!(validate_required("Name", "Rooftop Bar").is_ok());
        assert_eq!(
            validate_required("Name", "   ").unwrap_err(),
            "Name is required"
        );
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("owner@hangout.vn").is_ok());
        assert!(validate_email("first.last+tag@mail.example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("owner@localhost").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("0901234567").is_ok());
        assert!(validate_phone("+84901234567").is_ok());
        assert!(validate_phone("090-123").is_err());
        assert!(validate_phone("").is_err());
    }

    #[test]
    fn test_validate_percent_bounds() {
        assert!(validate_percent(0.0).is_ok());
        assert!(validate_percent(50.0).is_ok());
        assert!(validate_percent(100.0).is_ok());
        assert!(validate_percent(-0.5).is_err());
        assert!(validate_percent(100.1).is_err());
        assert!(validate_percent(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(0).is_ok());
        assert!(validate_quantity(10).is_ok());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_date_range_rejects_equal_and_reversed() {
        let t1 = Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2026, 5, 31, 0, 0, 0).unwrap();

        assert!(validate_date_range(t1, t2, "validFrom", "validTo").is_ok());
        assert_eq!(
            validate_date_range(t1, t1, "validFrom", "validTo").unwrap_err(),
            "validTo must be after validFrom"
        );
        assert!(validate_date_range(t2, t1, "validFrom", "validTo").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("").is_err());
        assert!(validate_password_confirmation("secret1", "secret1").is_ok());
        assert!(validate_password_confirmation("secret1", "secret2").is_err());
    }

    #[test]
    fn test_coordinates_bounds() {
        // Can Tho
        assert!(validate_coordinates(10.045240, 105.724084).is_ok());
        // Ho Chi Minh City
        assert!(within_bounds(10.7769, 106.7009));
        // Bangkok
        assert!(!within_bounds(13.7563, 100.5018));
        assert!(validate_coordinates(35.0, 105.0).is_err());
    }

    #[test]
    fn test_image_allow_list() {
        assert!(is_allowed_image_type("image/webp"));
        assert!(is_allowed_image_type("IMAGE/PNG"));
        assert!(!is_allowed_image_type("image/svg+xml"));
        assert!(!is_allowed_image_type("application/pdf"));

        assert!(validate_image_file_name("cover.JPG").is_ok());
        assert!(validate_image_file_name("logo.jpeg").is_ok());
        assert!(validate_image_file_name("menu.bmp").is_ok());
        assert!(validate_image_file_name("menu.tiff").is_err());
        assert!(validate_image_file_name("noextension").is_err());
    }
}
