use reqwest::Method;

use super::error::ClientResult;
use super::models::{Ack, SizedPage, User};
use super::{require_id, ApiClient, AuthPolicy, PageQuery};

impl ApiClient {
    pub async fn list_users(&self, query: &PageQuery) -> ClientResult<SizedPage<User>> {
        let request = self
            .request(Method::GET, "users", AuthPolicy::Required)?
            .query(query.params().pairs());
        self.send_data(request).await
    }

    pub async fn delete_user(&self, user_id: &str) -> ClientResult<Ack> {
        let user_id = require_id("userId", user_id)?;
        let request = self.request(
            Method::DELETE,
            &format!("users/{}/remove", user_id),
            AuthPolicy::Required,
        )?;
        self.send_ack(request).await
    }
}
