use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use wasm_bindgen_futures::JsFuture;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{
    ErrorBody, HistoryResponse, ModelPreference, ReplyResponse, SearchRequest, SearchResponse,
    SendMessageRequest, UploadResponse,
};

pub const SEND_MESSAGE: &str = "/api/send_message";
pub const SEARCH: &str = "/api/search";
pub const UPLOAD_FILE: &str = "/api/upload_file";
pub const CHAT_HISTORY: &str = "/api/get_chat_history";
pub const CLEAR_CHAT: &str = "/api/clear_chat";
pub const GET_MODEL_PREFERENCE: &str = "/api/get_model_preference";
pub const SAVE_MODEL_PREFERENCE: &str = "/api/save_model_preference";

/// The backend surface the controllers talk to.
#[async_trait(?Send)]
pub trait ChatApi {
    /// Whatever the upload path transmits (a browser `File` in the page).
    type File;

    async fn send_message(&self, request: &SendMessageRequest) -> Result<ReplyResponse, ApiError>;
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError>;
    async fn upload_file(&self, file: &Self::File) -> Result<UploadResponse, ApiError>;
    async fn chat_history(&self) -> Result<HistoryResponse, ApiError>;
    async fn clear_chat(&self) -> Result<(), ApiError>;
    async fn model_preference(&self) -> Result<ModelPreference, ApiError>;
    async fn save_model_preference(&self, preference: &ModelPreference) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct HttpChatApi {
    client: Client,
    base_url: String,
}

impl HttpChatApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_file(file: &web_sys::File) -> Result<Vec<u8>, ApiError> {
        let buffer = JsFuture::from(file.array_buffer())
            .await
            .map_err(|e| ApiError::Transport(format!("could not read {}: {:?}", file.name(), e)))?;
        Ok(js_sys::Uint8Array::new(&buffer).to_vec())
    }
}

#[async_trait(?Send)]
impl ChatApi for HttpChatApi {
    type File = web_sys::File;

    async fn send_message(&self, request: &SendMessageRequest) -> Result<ReplyResponse, ApiError> {
        log::debug!("POST {}", SEND_MESSAGE);
        let resp = self.client.post(self.url(SEND_MESSAGE)).json(request).send().await?;
        decode(resp).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        log::debug!("POST {}", SEARCH);
        let resp = self.client.post(self.url(SEARCH)).json(request).send().await?;
        decode(resp).await
    }

    async fn upload_file(&self, file: &web_sys::File) -> Result<UploadResponse, ApiError> {
        log::debug!("POST {} ({})", UPLOAD_FILE, file.name());
        let bytes = Self::read_file(file).await?;
        let part = multipart::Part::bytes(bytes)
            .file_name(file.name())
            .mime_str(&file.type_())?;
        let form = multipart::Form::new().part("file", part);

        let resp = self.client.post(self.url(UPLOAD_FILE)).multipart(form).send().await?;
        decode(resp).await
    }

    async fn chat_history(&self) -> Result<HistoryResponse, ApiError> {
        log::debug!("GET {}", CHAT_HISTORY);
        let resp = self.client.get(self.url(CHAT_HISTORY)).send().await?;
        decode(resp).await
    }

    async fn clear_chat(&self) -> Result<(), ApiError> {
        log::debug!("POST {}", CLEAR_CHAT);
        let resp = self.client.post(self.url(CLEAR_CHAT)).send().await?;
        expect_success(resp).await
    }

    async fn model_preference(&self) -> Result<ModelPreference, ApiError> {
        log::debug!("GET {}", GET_MODEL_PREFERENCE);
        let resp = self.client.get(self.url(GET_MODEL_PREFERENCE)).send().await?;
        decode(resp).await
    }

    async fn save_model_preference(&self, preference: &ModelPreference) -> Result<(), ApiError> {
        log::debug!("POST {}", SAVE_MODEL_PREFERENCE);
        let resp = self
            .client
            .post(self.url(SAVE_MODEL_PREFERENCE))
            .json(preference)
            .send()
            .await?;
        expect_success(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        parse_success(&body)
    } else {
        Err(application_error(status.as_u16(), &body, status.canonical_reason()))
    }
}

async fn expect_success(resp: Response) -> Result<(), ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(());
    }
    let body = resp.text().await.unwrap_or_default();
    Err(application_error(status.as_u16(), &body, status.canonical_reason()))
}

fn parse_success<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Builds the error for a non-success status, preferring the body's
/// `error` field over the reason phrase.
fn application_error(status: u16, body: &str, reason: Option<&str>) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| reason.unwrap_or("Request failed").to_string());
    ApiError::Application { status, message }
}
