use reqwest::Method;
use serde_json::Value;

use super::error::{ClientError, ClientResult};
use super::models::ReviewPage;
use super::{ApiClient, AuthPolicy, PageQuery};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewQuery {
    pub page: PageQuery,
    pub business_id: Option<String>,
}

/// The review payload must carry `items`, a numeric `totalPages` and a
/// numeric `total`; anything else is refused.
fn check_review_payload(data: &Value) -> ClientResult<()> {
    let missing = if !data.get("items").is_some_and(Value::is_array) {
        Some("items")
    } else if !data.get("totalPages").is_some_and(Value::is_number) {
        Some("totalPages")
    } else if !data.get("total").is_some_and(Value::is_number) {
        Some("total")
    } else {
        None
    };

    match missing {
        Some(field) => Err(ClientError::MalformedResponse(format!(
            "review payload is missing {}",
            field
        ))),
        None => Ok(()),
    }
}

impl ApiClient {
    pub async fn list_reviews(&self, query: &ReviewQuery) -> ClientResult<ReviewPage> {
        let params = query
            .page
            .params()
            .push_opt("businessId", query.business_id.as_deref());
        let request = self
            .request(Method::GET, "reviews", AuthPolicy::Optional)?
            .query(params.pairs());

        let data: Value = self.send_data(request).await?;
        check_review_payload(&data)?;
        serde_json::from_value(data).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeBackend;
    use crate::session::SessionStore;
    use axum::{extract::Query, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_payload_check_names_missing_field() {
        let err = check_review_payload(&json!({ "items": [], "total": 3 })).unwrap_err();
        assert_eq!(err.to_string(), "Malformed response: review payload is missing totalPages");

        let err = check_review_payload(&json!({ "items": {}, "totalPages": 1, "total": 3 })).unwrap_err();
        assert!(err.to_string().ends_with("missing items"));

        let err = check_review_payload(&json!({ "items": [], "totalPages": 1, "total": "3" })).unwrap_err();
        assert!(err.to_string().ends_with("missing total"));

        assert!(check_review_payload(&json!({ "items": [], "totalPages": 1, "total": 0 })).is_ok());
    }

    #[tokio::test]
    async fn test_reviews_for_business() {
        let backend = FakeBackend::start(Router::new().route(
            "/api/v1/reviews",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                match params.get("businessId").map(String::as_str) {
                    Some("b1") => Json(json!({ "data": {
                        "items": [{ "id": "r1", "rating": 5, "content": "Great view", "user": { "name": "Lan" } }],
                        "totalPages": 1,
                        "total": 1
                    }})),
                    _ => Json(json!({ "data": { "items": [] } })),
                }
            }),
        ))
        .await;
        let client = backend.client(SessionStore::in_memory());

        let page = client
            .list_reviews(&ReviewQuery {
                business_id: Some("b1".to_string()),
                ..ReviewQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].rating, Some(5.0));
        assert_eq!(
            page.items[0].user.as_ref().and_then(|u| u.name.as_deref()),
            Some("Lan")
        );

        let err = client.list_reviews(&ReviewQuery::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }
}
