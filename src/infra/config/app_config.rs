use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub api: ApiConfig,
    pub web: WebConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Log file location. Defaults to `carechat.log` in the data directory.
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub session_cookie: String,
    pub session_token: String,
    /// Id of the signed-in user, used when the server omits the own-message hint.
    pub user_id: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_owned(),
            session_cookie: "next-auth.session-token".to_owned(),
            session_token: String::new(),
            user_id: None,
            request_timeout_ms: 10_000,
        }
    }
}

impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.session_token.is_empty() {
            "<unset>"
        } else {
            "[REDACTED]"
        };

        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("session_cookie", &self.session_cookie)
            .field("session_token", &token)
            .field("user_id", &self.user_id)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebConfig {
    pub base_url: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    pub search_debounce_ms: u64,
    pub page_size: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: 300,
            page_size: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_session_token() {
        let config = ApiConfig {
            session_token: "eyJhbGciOiJIUzI1NiJ9.secret".to_owned(),
            ..ApiConfig::default()
        };

        let rendered = format!("{config:?}");

        assert!(!rendered.contains("eyJhbGci"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn debug_output_marks_missing_token() {
        let rendered = format!("{:?}", ApiConfig::default());

        assert!(rendered.contains("<unset>"));
    }
}
