use crate::error::{ApiError, SetupError};
use crate::gallery::state::PhotoRecord;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

/// Readiness view over whatever supplies auth tokens. While the credential is
/// pending, the pipeline holds every request back.
pub trait CredentialProvider {
    fn is_ready(&self) -> bool;
    fn token(&self) -> Option<String>;
}

/// Provider for feeds that need no authentication: always ready, no token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

impl CredentialProvider for NoAuth {
    fn is_ready(&self) -> bool {
        true
    }

    fn token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRef {
    pub href: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(default)]
    pub next: Option<LinkRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub photos: Vec<PhotoRecord>,
    #[serde(rename = "_links", default)]
    pub links: PageLinks,
}

impl PageResponse {
    pub fn next_href(&self) -> Option<String> {
        self.links.next.as_ref().map(|link| link.href.clone())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LikedPhotosResponse {
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Remote endpoints the pipeline talks to. `HttpGalleryApi` is the real
/// transport; tests script their own.
#[async_trait(?Send)]
pub trait GalleryApi {
    /// False when no likes service is configured; liked state then stays
    /// device-local.
    fn likes_configured(&self) -> bool;

    async fn fetch_page(&self, link: &str) -> Result<PageResponse, ApiError>;

    async fn fetch_liked_ids(&self, identity: &str) -> Result<LikedPhotosResponse, ApiError>;

    async fn push_like(
        &self,
        identity: &str,
        photo_suffix: &str,
        has_liked: bool,
    ) -> Result<(), ApiError>;
}

pub struct HttpGalleryApi {
    client: reqwest::Client,
    likes_url: Option<String>,
    credentials: Rc<dyn CredentialProvider>,
}

impl HttpGalleryApi {
    pub fn new(
        likes_url: Option<String>,
        credentials: Rc<dyn CredentialProvider>,
    ) -> Result<HttpGalleryApi, SetupError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SetupError::Client(e.to_string()))?;
        Ok(Self {
            client,
            likes_url: likes_url.map(|url| url.trim_end_matches('/').to_string()),
            credentials,
        })
    }

    fn likes_base(&self) -> Result<&str, ApiError> {
        self.likes_url
            .as_deref()
            .ok_or_else(|| ApiError::Http("likes endpoint is not configured".to_string()))
    }

    fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        if !self.credentials.is_ready() {
            return Err(ApiError::CredentialPending);
        }
        let mut headers = HeaderMap::new();
        if let Some(token) = self.credentials.token() {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Http(format!("build auth header failed: {e}")))?;
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }

    fn check_status(response: &reqwest::Response) -> Result<(), ApiError> {
        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl GalleryApi for HttpGalleryApi {
    fn likes_configured(&self) -> bool {
        self.likes_url.is_some()
    }

    async fn fetch_page(&self, link: &str) -> Result<PageResponse, ApiError> {
        let headers = self.auth_headers()?;
        let response = self.client.get(link).headers(headers).send().await?;
        Self::check_status(&response)?;
        response
            .json::<PageResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn fetch_liked_ids(&self, identity: &str) -> Result<LikedPhotosResponse, ApiError> {
        let headers = self.auth_headers()?;
        let url = format!("{}/{identity}", self.likes_base()?);
        let response = self.client.get(url).headers(headers).send().await?;
        Self::check_status(&response)?;
        response
            .json::<LikedPhotosResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn push_like(
        &self,
        identity: &str,
        photo_suffix: &str,
        has_liked: bool,
    ) -> Result<(), ApiError> {
        let headers = self.auth_headers()?;
        let url = format!(
            "{}/{identity}/{photo_suffix}?hasLiked={has_liked}",
            self.likes_base()?
        );
        let response = self.client.post(url).headers(headers).send().await?;
        Self::check_status(&response)?;
        Ok(())
    }
}
