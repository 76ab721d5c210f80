use crate::api::endpoints::BASE_URL;
use crate::api::pagination::{Page, PageCursor, PageRequest, PaginationInfo, walk_pages};
use crate::api::rate_limiter::RateLimiter;
use crate::error::ApiError;
use futures::Stream;
use reqwest::header::{ACCEPT, CONTENT_TYPE, LOCATION};
use reqwest::{Client, Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT: &str = concat!("fiken-cli/", env!("CARGO_PKG_VERSION"));
const EXCERPT_CHARS: usize = 200;

/// Method, path, query and optional JSON body of one call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post<B: Serialize>(path: &str, body: &B) -> Result<Self, ApiError> {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put<B: Serialize>(path: &str, body: &B) -> Result<Self, ApiError> {
        Self::new(Method::PUT, path).with_body(body)
    }

    fn with_body<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|source| ApiError::Encode {
            endpoint: self.path.clone(),
            source,
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn with_params(mut self, params: &[(&str, String)]) -> Self {
        self.query.extend(
            params
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone())),
        );
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn is_mutating(&self) -> bool {
        self.method == Method::POST || self.method == Method::PUT
    }
}

/// A successful (status < 400) response whose body has been read in full.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub pagination: PaginationInfo,
    /// `Location` header, set by Fiken on resource creation
    pub location: Option<String>,
    endpoint: String,
    body: String,
}

impl ApiResponse {
    /// Deserialize the body into the caller's shape.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|source| ApiError::Decode {
            endpoint: self.endpoint.clone(),
            source,
            excerpt: excerpt(&self.body, EXCERPT_CHARS),
        })
    }

    /// Drop the body, keeping only the pagination metadata.
    pub fn discard(self) -> PaginationInfo {
        self.pagination
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// First `max_chars` characters of `body`, with `...` appended when cut.
pub fn excerpt(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

fn http_client(timeout: Duration) -> Result<Client, ApiError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ApiError::ClientInit(e.to_string()))
}

/// Authenticated, rate-limited client for the Fiken v2 API.
///
/// Clones share one rate limiter, so every request made through any clone
/// counts against the same four-per-second budget.
#[derive(Clone)]
pub struct FikenClient {
    client: Client,
    base_url: String,
    token: String,
    limiter: Arc<RateLimiter>,
}

impl fmt::Debug for FikenClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FikenClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("min_delay", &self.limiter.min_delay())
            .finish()
    }
}

impl FikenClient {
    pub fn new(token: String) -> Result<Self, ApiError> {
        Ok(FikenClient {
            client: http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            base_url: BASE_URL.to_string(),
            token,
            limiter: Arc::new(RateLimiter::default()),
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Replace the rate limiter. Clones made earlier keep the old one.
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.limiter = Arc::new(RateLimiter::new(min_delay));
        self
    }

    /// Replace the per-request timeout. A request that runs past it fails
    /// as `ApiError::Transport`.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ApiError> {
        self.client = http_client(timeout)?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn min_delay(&self) -> Duration {
        self.limiter.min_delay()
    }

    pub fn build_request(&self, request: &ApiRequest) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if request.is_mutating() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        builder
    }

    /// Dispatch one request through the rate limiter and classify the outcome.
    ///
    /// Every call consumes a rate-limiter slot, including calls that fail at
    /// the transport level.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let endpoint = request.path.clone();
        let builder = self.build_request(&request);

        let waited = self.limiter.acquire().await;
        log::debug!(
            "{} {} (rate limiter wait {:?})",
            request.method,
            endpoint,
            waited
        );

        let response = builder
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        let status = response.status();
        log::debug!("{} {} -> {}", request.method, endpoint, status);

        if status.as_u16() >= 400 {
            let body = response
                .text()
                .await
                .map_err(|source| ApiError::Transport {
                    endpoint: endpoint.clone(),
                    source,
                })?;
            return Err(ApiError::Api {
                endpoint,
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let pagination = PaginationInfo::from_headers(response.headers());
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;

        Ok(ApiResponse {
            status: status.as_u16(),
            pagination,
            location,
            endpoint,
            body,
        })
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<(T, PaginationInfo), ApiError> {
        self.get_with_params(path, &[]).await
    }

    pub async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<(T, PaginationInfo), ApiError> {
        let response = self
            .execute(ApiRequest::get(path).with_params(params))
            .await?;
        let result = response.decode()?;
        Ok((result, response.pagination))
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::post(path, body)?).await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::put(path, body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(ApiRequest::delete(path)).await?.discard();
        Ok(())
    }

    /// Fetch a single page of a list endpoint.
    pub async fn fetch_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        page: PageRequest,
    ) -> Result<Page<T>, ApiError> {
        let mut request = ApiRequest::get(path).with_params(params);
        for (key, value) in page.query_pairs() {
            request = request.query(key, value);
        }

        let response = self.execute(request).await?;
        let items = response.decode()?;
        Ok(Page {
            items,
            pagination: response.pagination,
        })
    }

    /// Append every page of a list endpoint to `sink`.
    ///
    /// On failure the pages already fetched stay in `sink` and the error of
    /// the failing page is returned. Returns the number of pages fetched.
    pub async fn collect_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        page_size: i64,
        sink: &mut Vec<T>,
    ) -> Result<u32, ApiError> {
        let sink = Mutex::new(sink);
        walk_pages(page_size, |request| {
            let sink = &sink;
            async move {
                let page = self.fetch_page::<T>(path, params, request).await?;
                sink.lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .extend(page.items);
                Ok(page.pagination.page_count)
            }
        })
        .await
    }

    pub async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        page_size: i64,
    ) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        self.collect_pages(path, params, page_size, &mut items)
            .await?;
        Ok(items)
    }

    /// Lazily stream the pages of a list endpoint.
    ///
    /// Nothing is requested until the stream is polled. The stream ends after
    /// the last reported page, or right after yielding the first error.
    pub fn pages<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        page_size: i64,
    ) -> impl Stream<Item = Result<Page<T>, ApiError>> + '_ {
        let path = path.to_string();
        let params: Vec<(String, String)> = params
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();

        futures::stream::try_unfold(PageCursor::new(page_size), move |mut cursor| {
            let path = path.clone();
            let params = params.clone();
            async move {
                let Some(request) = cursor.next_request() else {
                    return Ok(None);
                };
                let params: Vec<(&str, String)> = params
                    .iter()
                    .map(|(key, value)| (key.as_str(), value.clone()))
                    .collect();
                let page = self.fetch_page::<T>(&path, &params, request).await?;
                cursor.advance(page.pagination.page_count);
                Ok(Some((page, cursor)))
            }
        })
    }
}
