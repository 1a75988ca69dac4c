//! Business listing, detail and management.

use reqwest::Method;

use super::error::ClientResult;
use super::forms::{BusinessEditForm, BusinessOwnerForm};
use super::models::{Ack, BusinessDetail, BusinessFeed, BusinessSummary, NumberedPage};
use super::{require_id, ApiClient, AuthPolicy, PageNumberQuery, QueryParams};

/// Filters for the public business listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessQuery {
    pub page_number: u32,
    pub page_size: u32,
    pub category: Option<String>,
    pub province: Option<String>,
    pub business_name: Option<String>,
}

impl Default for BusinessQuery {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 10,
            category: None,
            province: None,
            business_name: None,
        }
    }
}

impl BusinessQuery {
    fn params(&self) -> QueryParams {
        PageNumberQuery::new(self.page_number, self.page_size)
            .params()
            .push_opt("category", self.category.as_deref())
            .push_opt("province", self.province.as_deref())
            .push_opt("businessName", self.business_name.as_deref())
    }
}

impl ApiClient {
    pub async fn list_businesses(&self, query: &BusinessQuery) -> ClientResult<BusinessFeed> {
        let request = self
            .request(Method::GET, "business/get-business", AuthPolicy::Optional)?
            .query(query.params().pairs());
        self.send_data(request).await
    }

    /// Businesses owned by the signed-in owner
    pub async fn list_owner_businesses(
        &self,
        query: PageNumberQuery,
    ) -> ClientResult<NumberedPage<BusinessSummary>> {
        let request = self
            .request(Method::GET, "business/get-business-by-owner", AuthPolicy::Required)?
            .query(query.params().pairs());
        self.send_data(request).await
    }

    pub async fn business_detail(&self, business_id: &str) -> ClientResult<BusinessDetail> {
        let business_id = require_id("businessId", business_id)?;
        let request = self
            .request(Method::GET, "business/get-business-detail", AuthPolicy::Optional)?
            .query(&[("businessId", business_id)]);
        self.send_data(request).await
    }

    pub async fn delete_business(&self, business_id: &str) -> ClientResult<Ack> {
        let business_id = require_id("businessId", business_id)?;
        let request = self.request(
            Method::DELETE,
            &format!("business/delete-business/{}", business_id),
            AuthPolicy::Required,
        )?;
        self.send_ack(request).await
    }

    /// Create a business and its owner account (admin only)
    pub async fn create_business_owner(&self, form: &BusinessOwnerForm) -> ClientResult<Ack> {
        let request = self.request(Method::POST, "business/create-business-owner", AuthPolicy::Required)?;
        form.validate()?;
        self.send_ack(request.multipart(form.to_multipart()?)).await
    }

    pub async fn edit_business(&self, business_id: &str, form: &BusinessEditForm) -> ClientResult<Ack> {
        let business_id = require_id("businessId", business_id)?;
        let request = self.request(
            Method::PATCH,
            &format!("business/edit-business/{}", business_id),
            AuthPolicy::Required,
        )?;
        self.send_ack(request.multipart(form.to_multipart()?)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::forms::fixtures::{owner_form, profile};
    use crate::api::forms::{BusinessProfile, ImageChange};
    use crate::api::testing::{session_as, FakeBackend};
    use crate::api::ClientError;
    use crate::session::{Role, SessionStore};
    use axum::{
        extract::{Multipart, Path, Query},
        routing::{delete, get, patch},
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_list_omits_unset_filters() {
        let backend = FakeBackend::start(Router::new().route(
            "/api/v1/business/get-business",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("pageNumber").map(String::as_str), Some("2"));
                assert_eq!(params.get("pageSize").map(String::as_str), Some("20"));
                assert_eq!(params.get("province").map(String::as_str), Some("Can Tho"));
                assert!(!params.contains_key("category"));
                assert!(!params.contains_key("businessName"));
                Json(json!({ "data": {
                    "items": [{ "businesses": [{ "id": "b1", "businessName": "Cafe Mây" }], "hotBusinesses": [] }],
                    "pageNumber": 2,
                    "pageSize": 20
                }}))
            }),
        ))
        .await;
        let client = backend.client(SessionStore::in_memory());

        let feed = client
            .list_businesses(&BusinessQuery {
                page_number: 2,
                page_size: 20,
                province: Some("Can Tho".to_string()),
                category: Some(String::new()),
                ..BusinessQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(feed.businesses()[0].id, "b1");
    }

    #[tokio::test]
    async fn test_detail_is_repeatable() {
        let backend = FakeBackend::start(Router::new().route(
            "/api/v1/business/get-business-detail",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({ "data": {
                    "id": params["businessId"],
                    "name": "Cafe Mây",
                    "latitude": "10.0452396",
                    "longitude": "105.724084",
                    "images": ["https://cdn.hangout.vn/1.jpg"],
                    "events": []
                }}))
            }),
        ))
        .await;
        let client = backend.client(SessionStore::in_memory());

        let first = client.business_detail("b1").await.unwrap();
        let second = client.business_detail("b1").await.unwrap();

        assert_eq!(first.id, "b1");
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(backend.hits(), 2);
    }

    #[tokio::test]
    async fn test_missing_id_and_token_fail_without_network() {
        let backend = FakeBackend::start(Router::new()).await;
        let anonymous = backend.client(SessionStore::in_memory());

        assert!(matches!(
            anonymous.delete_business("  ").await,
            Err(ClientError::MissingCredential("businessId"))
        ));
        assert!(matches!(
            anonymous.delete_business("b1").await,
            Err(ClientError::Unauthenticated)
        ));
        assert!(matches!(
            anonymous.list_owner_businesses(PageNumberQuery::default()).await,
            Err(ClientError::Unauthenticated)
        ));
        assert!(matches!(
            anonymous.create_business_owner(&owner_form()).await,
            Err(ClientError::Unauthenticated)
        ));
        assert!(matches!(
            anonymous.business_detail("").await,
            Err(ClientError::MissingCredential(_))
        ));
        assert_eq!(backend.hits(), 0);
    }

    #[tokio::test]
    async fn test_owner_listing_second_page() {
        let backend = FakeBackend::start(Router::new().route(
            "/api/v1/business/get-business-by-owner",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                let page: usize = params["pageNumber"].parse().unwrap();
                let size: usize = params["pageSize"].parse().unwrap();
                let all: Vec<Value> = (0..2 * size)
                    .map(|i| json!({ "id": format!("b{i}"), "name": format!("Business {i}") }))
                    .collect();
                let items: Vec<Value> = all.into_iter().skip((page - 1) * size).take(size).collect();
                Json(json!({ "data": {
                    "items": items,
                    "pageNumber": page,
                    "pageSize": size,
                    "total": 2 * size
                }}))
            }),
        ))
        .await;
        let client = backend.client(session_as(Role::BusinessOwner));

        let page = client
            .list_owner_businesses(PageNumberQuery::new(2, 5))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id, "b5");
        assert_eq!(page.items[4].id, "b9");
        assert_eq!(page.total, Some(10));
    }

    #[tokio::test]
    async fn test_delete_business_path() {
        let backend = FakeBackend::start(Router::new().route(
            "/api/v1/business/delete-business/:id",
            delete(|Path(id): Path<String>| async move {
                Json(json!({ "data": id, "message": "Deleted" }))
            }),
        ))
        .await;
        let client = backend.client(session_as(Role::Admin));

        let ack = client.delete_business("b42").await.unwrap();
        assert_eq!(ack.data, Some(json!("b42")));
    }

    fn edit_backend() -> Router {
        Router::new().route(
            "/api/v1/business/edit-business/:id",
            patch(|Path(id): Path<String>, mut multipart: Multipart| async move {
                assert_eq!(id, "b1");
                let mut fields = HashMap::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    fields.insert(name, field.text().await.unwrap());
                }
                Json(json!({ "data": fields }))
            }),
        )
    }

    #[tokio::test]
    async fn test_edit_business_clears_main_image() {
        let backend = FakeBackend::start(edit_backend()).await;
        let client = backend.client(session_as(Role::BusinessOwner));

        let form = BusinessEditForm {
            profile: profile(),
            main_image: ImageChange::Clear,
        };
        let ack = client.edit_business("b1", &form).await.unwrap();
        let fields: HashMap<String, String> = serde_json::from_value(ack.data.unwrap()).unwrap();

        assert_eq!(fields["MainImage"], "");
        assert_eq!(fields["Name"], "Cafe Mây");
        assert_eq!(fields["OpeningHours"], "07:00 - 22:00");
        assert_eq!(fields["Longitude"], "105.724084");
    }

    #[tokio::test]
    async fn test_partial_edit_is_sent_as_is() {
        let backend = FakeBackend::start(edit_backend()).await;
        let client = backend.client(session_as(Role::BusinessOwner));

        let form = BusinessEditForm {
            profile: BusinessProfile {
                description: "New terrace".to_string(),
                ..BusinessProfile::default()
            },
            main_image: ImageChange::Keep,
        };
        let ack = client.edit_business("b1", &form).await.unwrap();
        let fields: HashMap<String, String> = serde_json::from_value(ack.data.unwrap()).unwrap();

        assert_eq!(backend.hits(), 1);
        assert_eq!(fields["Description"], "New terrace");
        assert_eq!(fields["Name"], "");
        assert_eq!(fields["Address"], "");
        assert!(!fields.contains_key("MainImage"));
    }

    #[tokio::test]
    async fn test_invalid_owner_form_is_not_sent() {
        let backend = FakeBackend::start(Router::new()).await;
        let client = backend.client(session_as(Role::Admin));

        let mut form = owner_form();
        form.profile.business_name.clear();

        let err = client.create_business_owner(&form).await.unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref v) if v.has_field("businessName")));
        assert_eq!(backend.hits(), 0);
    }
}
