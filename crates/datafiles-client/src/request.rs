//! Request layer: the transport seam and its reqwest implementation

use crate::{
    upload::{ProgressCallback, UploadForm},
    CancellableRequest, ClientError, Config, Result,
};
use reqwest::{
    header::{self, HeaderMap, HeaderName, HeaderValue},
    Client, Method, RequestBuilder,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, Instrument};

const CSRF_HEADER: HeaderName = HeaderName::from_static("x-csrftoken");

/// Untyped JSON transport used by the API clients.
///
/// Every call returns immediately with a [`CancellableRequest`]; nothing is
/// sent until it is awaited.
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// GET `path` with query parameters
    fn get(&self, path: &str, query: &[(String, String)]) -> CancellableRequest<Value>;

    /// POST a JSON body to `path`
    fn post(&self, path: &str, body: Value) -> CancellableRequest<Value>;

    /// PATCH a JSON body to `path`
    fn patch(&self, path: &str, body: Value) -> CancellableRequest<Value>;

    /// POST a multipart form to `path`, reporting progress as the body is sent
    fn upload(
        &self,
        path: &str,
        form: UploadForm,
        progress: Option<ProgressCallback>,
    ) -> CancellableRequest<Value>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn get(&self, path: &str, query: &[(String, String)]) -> CancellableRequest<Value> {
        (**self).get(path, query)
    }

    fn post(&self, path: &str, body: Value) -> CancellableRequest<Value> {
        (**self).post(path, body)
    }

    fn patch(&self, path: &str, body: Value) -> CancellableRequest<Value> {
        (**self).patch(path, body)
    }

    fn upload(
        &self,
        path: &str,
        form: UploadForm,
        progress: Option<ProgressCallback>,
    ) -> CancellableRequest<Value> {
        (**self).upload(path, form, progress)
    }
}

// ==================== Typed Helpers ====================

/// GET and decode the response
pub fn get_api<T, R>(transport: &T, path: &str) -> CancellableRequest<R>
where
    T: Transport + ?Sized,
    R: DeserializeOwned + Send + 'static,
{
    get_api_with_query(transport, path, &[])
}

/// GET with query parameters and decode the response
pub fn get_api_with_query<T, R>(
    transport: &T,
    path: &str,
    query: &[(String, String)],
) -> CancellableRequest<R>
where
    T: Transport + ?Sized,
    R: DeserializeOwned + Send + 'static,
{
    transport.get(path, query).and_then(decode)
}

/// POST a serializable body and decode the response
pub fn post_api<T, B, R>(transport: &T, path: &str, body: &B) -> CancellableRequest<R>
where
    T: Transport + ?Sized,
    B: Serialize + ?Sized,
    R: DeserializeOwned + Send + 'static,
{
    match serde_json::to_value(body) {
        Ok(body) => transport.post(path, body).and_then(decode),
        Err(e) => CancellableRequest::ready(Err(e.into())),
    }
}

/// PATCH a serializable body and decode the response
pub fn patch_api<T, B, R>(transport: &T, path: &str, body: &B) -> CancellableRequest<R>
where
    T: Transport + ?Sized,
    B: Serialize + ?Sized,
    R: DeserializeOwned + Send + 'static,
{
    match serde_json::to_value(body) {
        Ok(body) => transport.patch(path, body).and_then(decode),
        Err(e) => CancellableRequest::ready(Err(e.into())),
    }
}

/// Upload a multipart form and decode the response
pub fn upload_file<T, R>(
    transport: &T,
    path: &str,
    form: UploadForm,
    progress: Option<ProgressCallback>,
) -> CancellableRequest<R>
where
    T: Transport + ?Sized,
    R: DeserializeOwned + Send + 'static,
{
    transport.upload(path, form, progress).and_then(decode)
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R> {
    Ok(serde_json::from_value(value)?)
}

// ==================== HTTP Transport ====================

/// reqwest-backed transport
#[derive(Clone, Debug)]
pub struct HttpTransport {
    config: Config,
    http: Client,
}

impl HttpTransport {
    /// Create a new transport with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        url::Url::parse(config.base_url()).map_err(|e| {
            ClientError::Config(format!("Invalid base URL {:?}: {}", config.base_url, e))
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, header_value(&config.user_agent)?);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(cookie) = config.cookie_header() {
            headers.insert(header::COOKIE, header_value(&cookie)?);
        }
        if let Some(token) = &config.csrf_token {
            headers.insert(CSRF_HEADER, header_value(token)?);
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Http)?;

        Ok(Self { config, http })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> CancellableRequest<Value> {
        let url = self.url(path);
        let req = build(self.http.request(method.clone(), &url));
        let span = tracing::debug_span!("api_request", %method, %url);
        CancellableRequest::new(execute(req).instrument(span))
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, query: &[(String, String)]) -> CancellableRequest<Value> {
        self.send(Method::GET, path, |req| {
            if query.is_empty() {
                req
            } else {
                req.query(query)
            }
        })
    }

    fn post(&self, path: &str, body: Value) -> CancellableRequest<Value> {
        self.send(Method::POST, path, |req| req.json(&body))
    }

    fn patch(&self, path: &str, body: Value) -> CancellableRequest<Value> {
        self.send(Method::PATCH, path, |req| req.json(&body))
    }

    fn upload(
        &self,
        path: &str,
        form: UploadForm,
        progress: Option<ProgressCallback>,
    ) -> CancellableRequest<Value> {
        let url = self.url(path);
        let http = self.http.clone();
        let span = tracing::debug_span!("api_upload", %url, bytes = form.total_bytes());

        CancellableRequest::new(
            async move {
                let form = form.into_multipart(progress)?;
                execute(http.post(&url).multipart(form)).await
            }
            .instrument(span),
        )
    }
}

async fn execute(req: RequestBuilder) -> Result<Value> {
    debug!("Sending request");
    let response = req.send().await?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "Request failed");
        return Err(ClientError::from_api_response(&text, status.as_u16()));
    }

    let bytes = response.bytes().await?;
    if bytes.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ClientError::Config(format!("Invalid header value: {}", e)))
}
