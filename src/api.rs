//! REST client for the news server.
//!
//! One method per endpoint. Reads go through the retry helper; writes are
//! sent exactly once. Every request except login carries the bearer token
//! when one is set.

use crate::analytics::AnalyticsSummary;
use crate::config::Config;
use crate::content::{ArticleRecord, ArticleUpdate, LocalizedMap};
use crate::error::{AdminError, Result};
use crate::i18n::Language;
use crate::retry::{with_retry_if, RetryConfig};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// One page of `GET /news?page={n}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPage {
    #[serde(default)]
    pub data: Vec<ArticleRecord>,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Serialize)]
struct TranslationRequest<'a> {
    title: &'a str,
    content: &'a str,
}

/// A cover image selected from disk. Shared by every language of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl CoverImage {
    /// Load an image file, guessing its MIME type from the extension.
    ///
    /// # Errors
    /// `AdminError::Validation` for extensions that are not images,
    /// `AdminError::Io` when the file cannot be read.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AdminError::Validation(format!("Invalid image path: {}", path.display())))?
            .to_string();
        let mime_type = image_mime_type(&file_name).ok_or_else(|| {
            AdminError::Validation(format!("{} is not a supported image file", file_name))
        })?;
        let bytes = std::fs::read(path)?;

        Ok(Self {
            file_name,
            mime_type,
            bytes,
        })
    }

    fn into_part(self) -> Result<Part> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(self.mime_type)?)
    }
}

fn image_mime_type(file_name: &str) -> Option<&'static str> {
    let extension = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "avif" => Some("image/avif"),
        _ => None,
    }
}

/// Multipart body for `POST /news` and `PUT /news/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleUpload {
    pub title: LocalizedMap,
    pub content: LocalizedMap,
    pub original_lang: String,
    pub cover_image: Option<CoverImage>,
}

impl ArticleUpload {
    /// Text fields as sent on the wire: mappings JSON-encoded.
    pub fn text_fields(&self) -> Result<Vec<(&'static str, String)>> {
        let encode = |map: &LocalizedMap| {
            serde_json::to_string(map).map_err(|e| AdminError::Decode(e.to_string()))
        };
        Ok(vec![
            ("title", encode(&self.title)?),
            ("content", encode(&self.content)?),
            ("originalLang", self.original_lang.clone()),
        ])
    }

    fn into_form(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.text_fields()? {
            form = form.text(name, value);
        }
        if let Some(cover) = self.cover_image {
            form = form.part("coverImage", cover.into_part()?);
        }
        Ok(form)
    }
}

/// Body of `PUT /news/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateBody {
    /// Content and/or metadata only, no file
    Json(ArticleUpdate),
    /// Used when a new cover image goes along
    Multipart(ArticleUpload),
}

#[derive(Debug, Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: String,
    api_root: Url,
    token: Option<String>,
    read_retry: RetryConfig,
}

impl NewsClient {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let api_root = Url::parse(&config.api_base_url).map_err(|e| {
            AdminError::Validation(format!("Invalid API URL {}: {}", config.api_base_url, e))
        })?;
        if api_root.cannot_be_a_base() {
            return Err(AdminError::Validation(format!(
                "Invalid API URL {}: cannot hold a path",
                config.api_base_url
            )));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.api_base_url.clone(),
            api_root,
            token: None,
            read_retry: RetryConfig::read_request(),
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_read_retry(mut self, retry: RetryConfig) -> Self {
        self.read_retry = retry;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Endpoint URL under the API root; each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read<T: DeserializeOwned>(&self, operation_name: &str, url: Url) -> Result<T> {
        let url = &url;
        with_retry_if(
            &self.read_retry,
            operation_name,
            || async move {
                let response = self.authorize(self.http.get(url.clone())).send().await?;
                parse_json(check_status(response).await?).await
            },
            AdminError::is_retryable,
        )
        .await
    }

    /// Fetch one page of articles. Never parameterized by language.
    pub async fn list_news(&self, page: u32) -> Result<NewsPage> {
        debug!("Fetching news page {}", page);
        let mut url = self.endpoint(&["news"]);
        url.query_pairs_mut().append_pair("page", &page.to_string());
        self.read("List news", url).await
    }

    pub async fn get_news(&self, id: &str) -> Result<ArticleRecord> {
        self.read("Get news", self.endpoint(&["news", id])).await
    }

    pub async fn analytics(&self) -> Result<AnalyticsSummary> {
        self.read("Analytics", self.endpoint(&["news", "admin", "analytics"]))
            .await
    }

    pub async fn create_news(&self, upload: ArticleUpload) -> Result<ArticleRecord> {
        let request = self
            .authorize(self.http.post(self.endpoint(&["news"])))
            .multipart(upload.into_form()?);

        let record: ArticleRecord = parse_json(check_status(request.send().await?).await?).await?;
        info!("Created article {}", record.id);
        Ok(record)
    }

    pub async fn update_news(&self, id: &str, body: UpdateBody) -> Result<ArticleRecord> {
        let request = self.authorize(self.http.put(self.endpoint(&["news", id])));
        let request = match body {
            UpdateBody::Json(update) => request.json(&update),
            UpdateBody::Multipart(upload) => request.multipart(upload.into_form()?),
        };

        let record: ArticleRecord = parse_json(check_status(request.send().await?).await?).await?;
        info!("Updated article {}", record.id);
        Ok(record)
    }

    pub async fn update_translation(
        &self,
        id: &str,
        lang: Language,
        title: &str,
        content: &str,
    ) -> Result<ArticleRecord> {
        let url = self.endpoint(&["news", id, "translation", lang.code()]);
        let request = self
            .authorize(self.http.put(url))
            .json(&TranslationRequest { title, content });

        let record = parse_json(check_status(request.send().await?).await?).await?;
        info!("Updated {} translation of article {}", lang.name(), id);
        Ok(record)
    }

    pub async fn delete_news(&self, id: &str) -> Result<()> {
        let request = self.authorize(self.http.delete(self.endpoint(&["news", id])));
        check_status(request.send().await?).await?;
        info!("Deleted article {}", id);
        Ok(())
    }

    /// Exchange credentials for a session token.
    ///
    /// Rejected credentials come back as an `Http` error rather than
    /// `Unauthenticated`, which is reserved for a missing session.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let response = self
            .http
            .post(self.endpoint(&["auth", "login"]))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        let response = match check_status(response).await {
            Err(AdminError::Unauthenticated) => {
                return Err(AdminError::Http {
                    status: StatusCode::UNAUTHORIZED,
                    body: "Invalid username or password".to_string(),
                })
            }
            other => other?,
        };

        let login: LoginResponse = parse_json(response).await?;
        Ok(login.token)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(AdminError::Unauthenticated);
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AdminError::Http { status, body });
    }
    Ok(response)
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| AdminError::Decode(e.to_string()))
}
