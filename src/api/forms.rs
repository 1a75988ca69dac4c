//! Multipart forms for businesses and events.
//!
//! Field keys are the ones the backend binds, spelling included
//! (`OpenningHours` on create, `OpeningHours` on edit, `Latidue` and
//! `Lontitude` on self-registration).

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::multipart::Form;

use super::error::{ClientResult, ValidationErrorBuilder, ValidationErrors};
use super::validation::{
    validate_coordinates, validate_date_range, validate_email, validate_password,
    validate_password_confirmation, validate_phone, validate_required,
};
use crate::geocoding::format_coordinate;
use crate::media::ImageUpload;

/// What to do with an existing single image on edit
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ImageChange {
    /// Leave the current image as is
    #[default]
    Keep,
    Replace(ImageUpload),
    /// Remove the current image
    Clear,
}

impl ImageChange {
    fn apply(&self, form: Form, key: &'static str) -> ClientResult<Form> {
        Ok(match self {
            ImageChange::Keep => form,
            ImageChange::Replace(image) => form.part(key, image.to_part()?),
            ImageChange::Clear => form.text(key, ""),
        })
    }
}

fn iso(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn attach_gallery(mut form: Form, key: &'static str, images: &[ImageUpload]) -> ClientResult<Form> {
    for image in images {
        form = form.part(key, image.to_part()?);
    }
    Ok(form)
}

/// Location, hours and category of a business
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessProfile {
    pub business_name: String,
    pub vibe: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub province: String,
    pub description: String,
    pub opening_hours: String,
    pub start_day: String,
    pub end_day: String,
    pub category_id: String,
}

impl BusinessProfile {
    fn check(&self, errors: &mut ValidationErrorBuilder) {
        errors
            .check("businessName", validate_required("Business name", &self.business_name))
            .check("location", validate_coordinates(self.latitude, self.longitude))
            .check("address", validate_required("Address", &self.address))
            .check("province", validate_required("Province", &self.province))
            .check("openingHours", validate_required("Opening hours", &self.opening_hours));
    }
}

/// A new business together with its owner account
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessOwnerForm {
    pub phone: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    /// Owner's personal name
    pub name: String,
    pub profile: BusinessProfile,
    pub avatar_image: Option<ImageUpload>,
    pub main_image: Option<ImageUpload>,
    pub images: Vec<ImageUpload>,
}

impl BusinessOwnerForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrorBuilder::new();
        errors
            .check("phone", validate_phone(&self.phone))
            .check("email", validate_email(&self.email))
            .check("password", validate_password(&self.password))
            .check(
                "confirmPassword",
                validate_password_confirmation(&self.password, &self.confirm_password),
            )
            .check("name", validate_required("Name", &self.name));
        self.profile.check(&mut errors);
        errors.finish()
    }

    fn build(&self, latitude_key: &'static str, longitude_key: &'static str) -> ClientResult<Form> {
        let p = &self.profile;
        let mut form = Form::new()
            .text("Phone", self.phone.clone())
            .text("Email", self.email.clone())
            .text("Password", self.password.clone())
            .text("ConfirmPassword", self.confirm_password.clone())
            .text("Name", self.name.clone())
            .text("BusinessName", p.business_name.clone())
            .text("Vibe", p.vibe.clone())
            .text(latitude_key, format_coordinate(p.latitude))
            .text(longitude_key, format_coordinate(p.longitude))
            .text("Address", p.address.clone())
            .text("Province", p.province.clone())
            .text("Description", p.description.clone())
            .text("OpenningHours", p.opening_hours.clone())
            .text("StartDay", p.start_day.clone())
            .text("EndDay", p.end_day.clone())
            .text("CategoryId", p.category_id.clone());

        if let Some(avatar) = &self.avatar_image {
            form = form.part("AvatarImage", avatar.to_part()?);
        }
        if let Some(main) = &self.main_image {
            form = form.part("MainImage", main.to_part()?);
        }
        attach_gallery(form, "Image", &self.images)
    }

    pub(crate) fn to_multipart(&self) -> ClientResult<Form> {
        self.build("Latitude", "Longitude")
    }
}

/// Self-registration: an owner form plus the emailed one-time code
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegistrationForm {
    pub owner: BusinessOwnerForm,
    pub otp: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrorBuilder::new();
        errors.check("otp", validate_required("OTP", &self.otp));
        match self.owner.validate() {
            Ok(()) => errors.finish(),
            Err(owner) => {
                for (field, messages) in owner.fields() {
                    for message in messages {
                        errors.add(field.clone(), message.clone());
                    }
                }
                errors.finish()
            }
        }
    }

    pub(crate) fn to_multipart(&self) -> ClientResult<Form> {
        Ok(self
            .owner
            .build("Latidue", "Lontitude")?
            .text("Otp", self.otp.clone()))
    }
}

/// Business edit; owner account fields are not editable here.
///
/// Nothing is checked locally: blank fields are sent as empty strings and
/// the backend decides what to keep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BusinessEditForm {
    pub profile: BusinessProfile,
    pub main_image: ImageChange,
}

impl BusinessEditForm {
    pub(crate) fn to_multipart(&self) -> ClientResult<Form> {
        let p = &self.profile;
        let form = Form::new()
            .text("Name", p.business_name.clone())
            .text("Vibe", p.vibe.clone())
            .text("Latitude", format_coordinate(p.latitude))
            .text("Longitude", format_coordinate(p.longitude))
            .text("Address", p.address.clone())
            .text("Province", p.province.clone())
            .text("Description", p.description.clone())
            .text("OpeningHours", p.opening_hours.clone())
            .text("StartDay", p.start_day.clone())
            .text("EndDay", p.end_day.clone())
            .text("CategoryId", p.category_id.clone());
        self.main_image.apply(form, "MainImage")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventForm {
    pub name: String,
    pub location: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub main_image: ImageChange,
    pub images: Vec<ImageUpload>,
    /// Set when an admin creates the event on behalf of a business
    pub business_id: Option<String>,
}

impl EventForm {
    fn check(&self) -> ValidationErrorBuilder {
        let mut errors = ValidationErrorBuilder::new();
        errors
            .check("name", validate_required("Event name", &self.name))
            .check("location", validate_required("Location", &self.location))
            .check(
                "dueDate",
                validate_date_range(self.start_date, self.due_date, "Start date", "Due date"),
            );
        errors
    }

    /// A new event needs a description and a main image
    pub fn validate_for_create(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.check();
        errors.check("description", validate_required("Description", &self.description));
        if !matches!(self.main_image, ImageChange::Replace(_)) {
            errors.add("mainImage", "Main image is required");
        }
        errors.finish()
    }

    pub fn validate_for_edit(&self) -> Result<(), ValidationErrors> {
        self.check().finish()
    }

    pub(crate) fn to_multipart(&self) -> ClientResult<Form> {
        let mut form = Form::new()
            .text("Name", self.name.clone())
            .text("StartDate", iso(&self.start_date))
            .text("DueDate", iso(&self.due_date))
            .text("Location", self.location.clone())
            .text("Description", self.description.clone())
            .text("Latitude", format_coordinate(self.latitude))
            .text("Longitude", format_coordinate(self.longitude));

        if let Some(business_id) = self.business_id.as_deref().filter(|id| !id.is_empty()) {
            form = form.text("BusinessId", business_id.to_string());
        }

        let form = self.main_image.apply(form, "MainImageUrl")?;
        attach_gallery(form, "Images", &self.images)
    }
}
