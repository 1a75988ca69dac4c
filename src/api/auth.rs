//! Login, logout, OTP, self-registration and password change.

use reqwest::Method;

use super::error::{ClientError, ClientResult, ValidationErrorBuilder};
use super::forms::RegistrationForm;
use super::models::{Ack, ChangePasswordRequest, LoginData, LoginRequest, OtpRequest, OtpType};
use super::validation::{validate_email, validate_password, validate_phone, validate_required};
use super::{ApiClient, AuthPolicy};
use crate::session::Role;

impl ApiClient {
    /// Exchange credentials for a token and role without touching the session
    pub async fn authenticate(&self, identifier: &str, password: &str) -> ClientResult<LoginData> {
        let mut errors = ValidationErrorBuilder::new();
        errors
            .check("emailOrPhoneNumber", validate_required("Email or phone number", identifier))
            .check("password", validate_required("Password", password));
        errors.finish()?;

        let body = LoginRequest {
            email_or_phone_number: identifier.trim().to_string(),
            password: password.to_string(),
        };
        let request = self
            .request(Method::POST, "auth/login", AuthPolicy::Public)?
            .json(&body);
        self.send_data(request).await
    }

    /// Log in and persist the session. Roles other than Admin and
    /// BusinessOwner are refused and leave the session untouched.
    pub async fn login(&self, identifier: &str, password: &str) -> ClientResult<Role> {
        let data = self.authenticate(identifier, password).await?;

        let Some(role) = Role::parse(&data.role) else {
            tracing::warn!(role = %data.role, "Login returned an unsupported role");
            return Err(ClientError::UnsupportedRole(data.role));
        };

        self.session.set_session(&data.access_token, role.as_str());
        Ok(role)
    }

    pub fn logout(&self) {
        self.session.clear_session();
    }

    pub async fn request_otp(&self, email: &str, phone: &str, otp_type: OtpType) -> ClientResult<Ack> {
        let mut errors = ValidationErrorBuilder::new();
        errors
            .check("email", validate_email(email))
            .check("phone", validate_phone(phone));
        errors.finish()?;

        let body = OtpRequest {
            email: email.to_string(),
            phone: phone.to_string(),
            otp_type,
        };
        let request = self
            .request(Method::POST, "auth/otp", AuthPolicy::Public)?
            .json(&body);
        self.send_ack(request).await
    }

    pub async fn register_business(&self, form: &RegistrationForm) -> ClientResult<Ack> {
        form.validate()?;
        let request = self
            .request(Method::POST, "business/register-business-account", AuthPolicy::Public)?
            .multipart(form.to_multipart()?);
        self.send_ack(request).await
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> ClientResult<Ack> {
        let mut errors = ValidationErrorBuilder::new();
        errors
            .check("oldPassword", validate_required("Current password", old_password))
            .check("newPassword", validate_password(new_password));
        if !old_password.is_empty() && old_password == new_password {
            errors.add("newPassword", "New password must differ from the current one");
        }
        errors.finish()?;

        let body = ChangePasswordRequest {
            old_password: old_password.to_string(),
            new_password: new_password.to_string(),
        };
        let request = self
            .request(Method::PATCH, "auth/change-password", AuthPolicy::Required)?
            .json(&body);
        self.send_ack(request).await
    }
}
