use reqwest::Method;

use super::error::ClientResult;
use super::forms::EventForm;
use super::models::{Ack, Event, SizedPage};
use super::{require_id, ApiClient, AuthPolicy, PageQuery};

impl ApiClient {
    /// Events of the signed-in owner's businesses. Sorting is not supported
    /// by this endpoint and is ignored.
    pub async fn list_my_events(&self, query: &PageQuery) -> ClientResult<SizedPage<Event>> {
        let request = self
            .request(Method::GET, "events/my-events", AuthPolicy::Required)?
            .query(query.plain_params().pairs());
        self.send_data(request).await
    }

    pub async fn event(&self, event_id: &str) -> ClientResult<Event> {
        let event_id = require_id("eventId", event_id)?;
        let request = self.request(Method::GET, &format!("events/{}", event_id), AuthPolicy::Optional)?;
        self.send_data(request).await
    }

    pub async fn create_event(&self, form: &EventForm) -> ClientResult<Ack> {
        let request = self.request(Method::POST, "events", AuthPolicy::Required)?;
        form.validate_for_create()?;
        self.send_ack(request.multipart(form.to_multipart()?)).await
    }

    pub async fn edit_event(&self, event_id: &str, form: &EventForm) -> ClientResult<Ack> {
        let event_id = require_id("eventId", event_id)?;
        let request = self.request(Method::PATCH, &format!("events/{}", event_id), AuthPolicy::Required)?;
        form.validate_for_edit()?;
        self.send_ack(request.multipart(form.to_multipart()?)).await
    }

    pub async fn delete_event(&self, event_id: &str) -> ClientResult<Ack> {
        let event_id = require_id("eventId", event_id)?;
        let request = self.request(Method::DELETE, &format!("events/{}", event_id), AuthPolicy::Required)?;
        self.send_ack(request).await
    }
}
