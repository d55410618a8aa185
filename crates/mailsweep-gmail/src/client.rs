//! HTTP implementation of [`MailSource`] over the Gmail REST API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{
    BatchModifyRequest, Label, LabelListResponse, Message, MessageFormat, MessageListPage,
    PartBody,
};
use crate::source::MailSource;
use crate::token::TokenProvider;

/// Base URL for the `users/me` API surface.
const DEFAULT_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me";

/// Authenticated REST client for a single mailbox.
pub struct GmailClient {
    http: Client,
    tokens: Arc<dyn TokenProvider>,
    base_url: String,
}

impl GmailClient {
    /// Creates a client that asks `tokens` for a bearer token per request.
    #[must_use]
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: Client::new(),
            tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Overrides the API base URL (local test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.tokens.access_token().await?;
        Ok(request.bearer_auth(token))
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status.as_u16() == 401 {
            return Err(Error::Auth(format!("token rejected: {body}")));
        }
        Err(Error::Api {
            status: status.as_u16(),
            body,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "GET");
        let request = self.authorize(self.http.get(&url).query(query)).await?;
        let response = Self::check(request.send().await?).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl MailSource for GmailClient {
    async fn list_message_ids(
        &self,
        max_results: u32,
        label_ids: &[String],
        query: Option<&str>,
    ) -> Result<MessageListPage> {
        let mut params = vec![("maxResults", max_results.to_string())];
        for label_id in label_ids {
            params.push(("labelIds", label_id.clone()));
        }
        if let Some(q) = query {
            params.push(("q", q.to_string()));
        }
        self.get_json("messages", &params).await
    }

    async fn get_message(&self, id: &str, format: MessageFormat) -> Result<Message> {
        self.get_json(
            &format!("messages/{id}"),
            &[("format", format.as_str().to_string())],
        )
        .await
    }

    async fn get_attachment(&self, message_id: &str, attachment_id: &str) -> Result<PartBody> {
        self.get_json(
            &format!("messages/{message_id}/attachments/{attachment_id}"),
            &[],
        )
        .await
    }

    async fn list_labels(&self) -> Result<Vec<Label>> {
        let response: LabelListResponse = self.get_json("labels", &[]).await?;
        Ok(response.labels.unwrap_or_default())
    }

    async fn trash_message(&self, id: &str) -> Result<()> {
        let url = format!("{}/messages/{id}/trash", self.base_url);
        debug!(%url, "POST");
        let request = self.authorize(self.http.post(&url)).await?;
        Self::check(request.send().await?).await?;
        Ok(())
    }

    async fn batch_add_labels(&self, ids: &[String], labels_to_add: &[String]) -> Result<()> {
        let url = format!("{}/messages/batchModify", self.base_url);
        debug!(%url, count = ids.len(), "POST");
        let body = BatchModifyRequest {
            ids: ids.to_vec(),
            add_label_ids: labels_to_add.to_vec(),
            remove_label_ids: Vec::new(),
        };
        let request = self.authorize(self.http.post(&url).json(&body)).await?;
        Self::check(request.send().await?).await?;
        Ok(())
    }
}
