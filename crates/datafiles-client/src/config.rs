//! Client configuration

use std::time::Duration;

/// Client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Server base URL (scheme, host and port; API paths are appended)
    pub base_url: String,
    /// Session cookie value (`sessionid`)
    pub session_id: Option<String>,
    /// CSRF token, sent as the `csrftoken` cookie and the `X-CSRFToken` header
    pub csrf_token: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            session_id: None,
            csrf_token: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("datafiles-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Create a new config with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the session cookie
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Set the CSRF token
    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Base URL without a trailing slash, ready to have an absolute path appended
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Value for the `Cookie` header, if any credentials are configured
    pub(crate) fn cookie_header(&self) -> Option<String> {
        let mut cookies = Vec::new();
        if let Some(session) = &self.session_id {
            cookies.push(format!("sessionid={}", session));
        }
        if let Some(csrf) = &self.csrf_token {
            cookies.push(format!("csrftoken={}", csrf));
        }
        if cookies.is_empty() {
            None
        } else {
            Some(cookies.join("; "))
        }
    }
}
