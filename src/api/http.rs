use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, StatusCode,
    multipart::{Form, Part},
};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::BulletinApi;
use crate::{
    calendar::CalendarMonth,
    config::Config,
    error::AppError,
    models::{
        comment::CreateCommentRequest,
        post::{FeedPage, FeedQuery, ItemResponse, ItemsResponse, PinRequest, Post, PostDraft},
    },
};

/// `reqwest` implementation of [`BulletinApi`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OkResponse {
    #[serde(default = "default_ok")]
    ok: bool,
}

fn default_ok() -> bool {
    true
}

impl HttpApi {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?;

        Ok(Self::with_client(
            client,
            config.api_url.clone(),
            config.api_token.clone(),
        ))
    }

    pub fn with_client(client: Client, base_url: Url, token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            token,
        }
    }

    /// Appends path segments to the base URL; ids are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("{} cannot be used as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Network(e.to_string()))?;

        decode_body(status, &text)
    }
}

/// Turns a raw response into a typed payload.
///
/// * Non-2xx: `Server` error, text from `message` (or `error`) when present.
/// * 2xx with invalid JSON: `Parse` error.
/// * 2xx with `ok: false`: `Server` error.
pub(crate) fn decode_body<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, AppError> {
    if !status.is_success() {
        let message = serde_json::from_str::<Value>(text)
            .ok()
            .as_ref()
            .and_then(message_of)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        return Err(AppError::Server {
            status: Some(status.as_u16()),
            message,
        });
    }

    let body: Value = serde_json::from_str(text)?;
    if body.get("ok").and_then(Value::as_bool) == Some(false) {
        return Err(AppError::Server {
            status: Some(status.as_u16()),
            message: message_of(&body).unwrap_or_else(|| "Request failed".to_string()),
        });
    }

    Ok(serde_json::from_value(body)?)
}

fn message_of(body: &Value) -> Option<String> {
    body.get("message")
        .or_else(|| body.get("error"))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl BulletinApi for HttpApi {
    async fn list_posts(&self, query: &FeedQuery, limit: u32) -> Result<FeedPage, AppError> {
        let url = self.endpoint(&["posts"])?;
        debug!(%url, cursor = %query.cursor, "fetching feed page");
        self.send(self.client.get(url).query(&query.to_pairs(limit)))
            .await
    }

    async fn calendar(&self, month: CalendarMonth) -> Result<Vec<Post>, AppError> {
        let url = self.endpoint(&["calendar"])?;
        debug!(%url, year = month.year(), month = month.wire_month(), "fetching calendar");
        let response: ItemsResponse = self
            .send(self.client.get(url).query(&[
                ("year", month.year().to_string()),
                ("month", month.wire_month().to_string()),
            ]))
            .await?;
        Ok(response.items)
    }

    async fn upcoming_events(&self, limit: u32) -> Result<Vec<Post>, AppError> {
        let url = self.endpoint(&["events"])?;
        let response: ItemsResponse = self
            .send(self.client.get(url).query(&[("limit", limit.to_string())]))
            .await?;
        Ok(response.items)
    }

    async fn publish(&self, draft: &PostDraft) -> Result<Post, AppError> {
        let url = self.endpoint(&["posts"])?;

        let mut form = Form::new();
        for (name, value) in draft.text_fields() {
            form = form.text(name, value);
        }
        if let Some(file) = &draft.file {
            let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(content_type) = &file.content_type {
                part = part
                    .mime_str(content_type)
                    .map_err(|e| AppError::Validation(format!("Invalid file type: {}", e)))?;
            }
            form = form.part("file", part);
        }

        debug!(%url, kind = draft.kind.as_str(), "publishing post");
        let response: ItemResponse = self.send(self.client.post(url).multipart(form)).await?;
        Ok(response.item)
    }

    async fn like(&self, post_id: &str) -> Result<Post, AppError> {
        let url = self.endpoint(&["like", post_id])?;
        let response: ItemResponse = self.send(self.client.post(url)).await?;
        Ok(response.item)
    }

    async fn comment(&self, post_id: &str, text: &str) -> Result<Post, AppError> {
        let url = self.endpoint(&["comment", post_id])?;
        let body = CreateCommentRequest::new(text);
        let response: ItemResponse = self.send(self.client.post(url).json(&body)).await?;
        Ok(response.item)
    }

    async fn pin(&self, post_id: &str, pinned: bool) -> Result<Post, AppError> {
        let url = self.endpoint(&["pin", post_id])?;
        let response: ItemResponse = self
            .send(self.client.post(url).json(&PinRequest { pinned }))
            .await?;
        Ok(response.item)
    }

    async fn delete(&self, post_id: &str) -> Result<(), AppError> {
        let url = self.endpoint(&["posts", post_id])?;
        let response: OkResponse = self.send(self.client.delete(url)).await?;
        if response.ok {
            Ok(())
        } else {
            Err(AppError::Server {
                status: None,
                message: "Delete failed".to_string(),
            })
        }
    }
}
