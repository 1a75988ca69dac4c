//! Request and response types for the `/api/v1/` backend.
//!
//! Pagination envelopes are deliberately not unified: each endpoint family
//! has its own shape (`page`/`size`, `pageNumber`/`pageSize`, `totalPages`
//! only, or the nested business feed) and gets its own type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `{ data: ..., message? }` wrapper around every successful payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of a mutation whose payload the dashboard does not inspect
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
}

// ----------------------------------------------------------------------------
// Pagination envelopes
// ----------------------------------------------------------------------------

/// Page keyed by `page` / `size` (categories, users, events, vouchers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizedPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Page keyed by `pageNumber` / `pageSize` (businesses by owner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberedPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// Review listing. `items`, `totalPages` and `total` are mandatory; a body
/// missing any of them is rejected as malformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPage {
    pub items: Vec<Review>,
    pub total_pages: u32,
    pub total: u64,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
}

/// Public business listing: one item holding the regular and "hot" lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessFeed {
    #[serde(default = "Vec::new")]
    pub items: Vec<BusinessFeedItem>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessFeedItem {
    #[serde(default)]
    pub businesses: Vec<BusinessSummary>,
    #[serde(default)]
    pub hot_businesses: Vec<BusinessSummary>,
}

impl BusinessFeed {
    pub fn businesses(&self) -> &[BusinessSummary] {
        self.items
            .first()
            .map(|item| item.businesses.as_slice())
            .unwrap_or_default()
    }

    /// Hot businesses with at least one like
    pub fn hot_businesses(&self) -> Vec<&BusinessSummary> {
        self.items
            .first()
            .map(|item| {
                item.hot_businesses
                    .iter()
                    .filter(|b| b.total_like > 0)
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ----------------------------------------------------------------------------
// Auth
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email_or_phone_number: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: String,
    pub role: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtpType {
    Register,
    ForgotPassword,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequest {
    pub email: String,
    pub phone: String,
    pub otp_type: OtpType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

// ----------------------------------------------------------------------------
// Businesses
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessSummary {
    pub id: String,
    pub business_name: Option<String>,
    pub name: Option<String>,
    pub main_image: Option<String>,
    pub main_image_url: Option<String>,
    pub opening_hours: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub category_name: Option<String>,
    pub start_day: Option<String>,
    pub end_day: Option<String>,
    pub total_like: u64,
    pub active: Option<bool>,
}

impl BusinessSummary {
    pub fn display_name(&self) -> &str {
        self.business_name
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("-")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessDetail {
    pub id: String,
    pub name: Option<String>,
    pub vibe: Option<String>,
    #[serde(deserialize_with = "de::lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "de::lenient_f64")]
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub description: Option<String>,
    pub main_image_url: Option<String>,
    pub opening_hours: Option<String>,
    pub start_day: Option<String>,
    pub end_day: Option<String>,
    pub category: Option<String>,
    pub total_like: u64,
    pub active: Option<bool>,
    pub images: Vec<MediaRef>,
    pub events: Vec<Event>,
}

/// Image attached to a business or event; the backend sends either a bare
/// URL or an object carrying one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MediaRef {
    Url(String),
    Object {
        #[serde(default)]
        id: Option<String>,
        #[serde(default, alias = "imageUrl")]
        url: Option<String>,
    },
}

impl MediaRef {
    pub fn url(&self) -> Option<&str> {
        match self {
            MediaRef::Url(url) => Some(url),
            MediaRef::Object { url, .. } => url.as_deref(),
        }
    }
}

// ----------------------------------------------------------------------------
// Categories and users
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub user_id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<String>,
    pub created_date: Option<String>,
}

// ----------------------------------------------------------------------------
// Events
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    pub event_id: Option<String>,
    pub id: Option<String>,
    pub name: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub main_image: Option<String>,
    pub main_image_url: Option<String>,
    #[serde(deserialize_with = "de::lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(deserialize_with = "de::lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(deserialize_with = "de::lenient_datetime")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "de::lenient_datetime")]
    pub due_date: Option<DateTime<Utc>>,
    pub coming_day: Option<i64>,
    pub active: Option<bool>,
    pub images: Vec<MediaRef>,
}

impl Event {
    /// Listings send `eventId`, detail views send `id`
    pub fn identifier(&self) -> Option<&str> {
        self.event_id.as_deref().or(self.id.as_deref())
    }
}

// ----------------------------------------------------------------------------
// Vouchers
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voucher {
    pub id: String,
    pub name: String,
    pub percent: f64,
    #[serde(deserialize_with = "de::datetime")]
    pub valid_from: DateTime<Utc>,
    #[serde(deserialize_with = "de::datetime")]
    pub valid_to: DateTime<Utc>,
    pub quantity: i64,
    #[serde(default)]
    pub active: bool,
}

/// Voucher fields shared by create and edit
#[derive(Debug, Clone, PartialEq)]
pub struct VoucherInput {
    pub name: String,
    pub percent: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub quantity: i64,
}

/// Create body; the endpoint names the field `voucherName`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateVoucherBody<'a> {
    pub voucher_name: &'a str,
    pub percent: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub quantity: i64,
}

/// Edit body; the endpoint names the field `name`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EditVoucherBody<'a> {
    pub name: &'a str,
    pub percent: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub quantity: i64,
}

/// A voucher claimed by a customer of the owner's business
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVoucher {
    #[serde(default)]
    pub voucher_id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub percent: Option<f64>,
    #[serde(default, deserialize_with = "de::lenient_datetime")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de::lenient_datetime")]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_used: bool,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UseVoucherBody<'a> {
    pub voucher_id: &'a str,
    pub account_id: &'a str,
}

// ----------------------------------------------------------------------------
// Reviews
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Review {
    pub id: String,
    pub rating: Option<f64>,
    pub content: Option<String>,
    pub created_date: Option<String>,
    pub user: Option<ReviewAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewAuthor {
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Deserializers tolerating the backend's loose typing
pub(crate) mod de {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    /// Accept `10.5`, `"10.5"`, `""` or `null`
    pub fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => Ok(Some(n)),
            Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(NumberOrString::Text(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
        }
    }

    /// RFC 3339, or a naive timestamp taken as UTC
    pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_datetime(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {}", raw)))
    }

    pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?
            .as_deref()
            .and_then(parse_datetime))
    }
}
