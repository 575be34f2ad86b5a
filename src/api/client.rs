use std::{sync::Arc, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, COOKIE},
    Response, Url,
};
use tokio::runtime::Runtime;

use crate::{
    api::{
        dto::{self, SendMessageRequest},
        error::ApiError,
    },
    domain::{conversation::ConversationFilters, message::Message, stream_state::StreamScope},
    infra::{config::ApiConfig, error::AppError},
    usecases::{
        list_conversations::{ConversationPage, ConversationsSource, ListConversationsSourceError},
        load_messages::{MessagesSource, MessagesSourceError, ThreadPage},
    },
};

const LIST_CONVERSATIONS_FAILED: &str = "API_LIST_CONVERSATIONS_FAILED";
const LOAD_THREAD_FAILED: &str = "API_LOAD_THREAD_FAILED";
const EVENT_STREAM_MIME: &str = "text/event-stream";

/// Async HTTP half of the client. Cheap to clone into background tasks.
#[derive(Debug, Clone)]
pub struct HttpSession {
    http: reqwest::Client,
    base_url: Url,
    request_timeout: Duration,
    session_user_id: Option<String>,
}

impl HttpSession {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let base_url = Url::parse(&config.base_url).map_err(|error| AppError::ConfigInvalid {
            field: "api.base_url",
            details: error.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::ConfigInvalid {
                field: "api.base_url",
                details: format!("{} cannot be used as a base URL", config.base_url),
            });
        }

        let request_timeout = Duration::from_millis(config.request_timeout_ms.max(1));
        // The stream request must outlive any per-request timeout, so only
        // REST calls set one.
        let http = reqwest::Client::builder()
            .connect_timeout(request_timeout)
            .default_headers(session_headers(config)?)
            .build()
            .map_err(AppError::HttpClientBuild)?;

        Ok(Self {
            http,
            base_url,
            request_timeout,
            session_user_id: config.user_id.clone(),
        })
    }

    pub fn session_user_id(&self) -> Option<&str> {
        self.session_user_id.as_deref()
    }

    pub async fn list_conversations(
        &self,
        filters: &ConversationFilters,
        page: u32,
        limit: u32,
    ) -> Result<ConversationPage, ApiError> {
        let mut url = self.endpoint(&["conversations"])?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("page", &page.to_string())
                .append_pair("limit", &limit.to_string());
            if let Some(search) = filters.search_term() {
                query.append_pair("search", search);
            }
            if filters.unread_only {
                query.append_pair("unread", "true");
            }
        }

        let response = self.get(url).await?;
        let body = read_body(response).await?;
        dto::decode_conversation_page(&body)
    }

    pub async fn get_conversation(
        &self,
        partner_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<ThreadPage, ApiError> {
        let mut url = self.endpoint(&["conversations", partner_id])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &limit.to_string());

        let response = self.get(url).await?;
        let body = read_body(response).await?;
        dto::decode_thread_page(&body, self.session_user_id())
    }

    pub async fn send_message(&self, receiver_id: &str, content: &str) -> Result<Message, ApiError> {
        let url = self.endpoint(&["messages"])?;
        let response = self
            .http
            .post(url)
            .timeout(self.request_timeout)
            .json(&SendMessageRequest {
                receiver_id,
                content,
            })
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let body = read_body(response).await?;
        dto::decode_message(&body, self.session_user_id())
    }

    /// Opens the event stream. The response body is read incrementally by the caller.
    pub async fn open_events(&self, scope: &StreamScope) -> Result<Response, ApiError> {
        let mut url = self.endpoint(&["events"])?;
        if let Some(partner_id) = scope.partner_id.as_deref() {
            url.query_pairs_mut().append_pair("partnerId", partner_id);
        }

        let response = self
            .http
            .get(url)
            .header(ACCEPT, EVENT_STREAM_MIME)
            .send()
            .await
            .map_err(ApiError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn get(&self, url: Url) -> Result<Response, ApiError> {
        self.http
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(ApiError::Transport)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn session_headers(config: &ApiConfig) -> Result<HeaderMap, AppError> {
    let mut headers = HeaderMap::new();
    if config.session_token.trim().is_empty() {
        return Ok(headers);
    }

    let mut cookie = HeaderValue::from_str(&format!(
        "{}={}",
        config.session_cookie, config.session_token
    ))
    .map_err(|_| AppError::ConfigInvalid {
        field: "api.session_token",
        details: "contains characters not allowed in a cookie".to_owned(),
    })?;
    cookie.set_sensitive(true);
    headers.insert(COOKIE, cookie);

    Ok(headers)
}

async fn read_body(response: Response) -> Result<Vec<u8>, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(ApiError::Transport)?;
    Ok(body.to_vec())
}

/// Blocking facade used by the UI thread. Owns the runtime that runs every
/// request, send and stream task.
#[derive(Debug, Clone)]
pub struct ApiClient {
    runtime: Arc<Runtime>,
    session: HttpSession,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("carechat-io")
            .enable_all()
            .build()
            .map_err(AppError::RuntimeStart)?;

        Ok(Self {
            runtime: Arc::new(runtime),
            session: HttpSession::new(config)?,
        })
    }

    pub fn runtime(&self) -> &Arc<Runtime> {
        &self.runtime
    }

    pub fn session(&self) -> &HttpSession {
        &self.session
    }
}

impl ConversationsSource for ApiClient {
    fn list_conversations(
        &self,
        filters: &ConversationFilters,
        page: u32,
        limit: u32,
    ) -> Result<ConversationPage, ListConversationsSourceError> {
        self.runtime
            .block_on(self.session.list_conversations(filters, page, limit))
            .map_err(|error| {
                tracing::warn!(
                    code = LIST_CONVERSATIONS_FAILED,
                    page,
                    status = error.status(),
                    error = %error,
                    "conversation list request failed"
                );
                error.into()
            })
    }
}

impl MessagesSource for ApiClient {
    fn load_thread(
        &self,
        partner_id: &str,
        page: u32,
        limit: u32,
    ) -> Result<ThreadPage, MessagesSourceError> {
        self.runtime
            .block_on(self.session.get_conversation(partner_id, page, limit))
            .map_err(|error| {
                tracing::warn!(
                    code = LOAD_THREAD_FAILED,
                    partner_id,
                    page,
                    status = error.status(),
                    error = %error,
                    "message page request failed"
                );
                error.into()
            })
    }
}
