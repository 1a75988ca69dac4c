use reqwest::Method;

use super::error::{ClientResult, ValidationErrorBuilder};
use super::models::{Ack, Category, CategoryInput, SizedPage};
use super::validation::validate_required;
use super::{require_id, ApiClient, AuthPolicy, PageQuery};

impl CategoryInput {
    pub fn validate(&self) -> Result<(), super::ValidationErrors> {
        let mut errors = ValidationErrorBuilder::new();
        errors.check("name", validate_required("Category name", &self.name));
        errors.finish()
    }
}

impl ApiClient {
    /// See [`PageQuery::categories`] for the usual page size
    pub async fn list_categories(&self, query: &PageQuery) -> ClientResult<SizedPage<Category>> {
        let request = self
            .request(Method::GET, "categories", AuthPolicy::Optional)?
            .query(query.params().pairs());
        self.send_data(request).await
    }

    pub async fn create_category(&self, input: &CategoryInput) -> ClientResult<Ack> {
        let request = self.request(Method::POST, "categories", AuthPolicy::Required)?;
        input.validate()?;
        self.send_ack(request.json(input)).await
    }

    pub async fn update_category(&self, category_id: &str, input: &CategoryInput) -> ClientResult<Ack> {
        let category_id = require_id("categoryId", category_id)?;
        let request = self.request(
            Method::PATCH,
            &format!("categories/{}", category_id),
            AuthPolicy::Required,
        )?;
        input.validate()?;
        self.send_ack(request.json(input)).await
    }

    pub async fn delete_category(&self, category_id: &str) -> ClientResult<Ack> {
        let category_id = require_id("categoryId", category_id)?;
        let request = self.request(
            Method::DELETE,
            &format!("categories/{}", category_id),
            AuthPolicy::Required,
        )?;
        self.send_ack(request).await
    }
}
