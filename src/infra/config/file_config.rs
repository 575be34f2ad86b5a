use serde::Deserialize;

use crate::infra::config::{ApiConfig, AppConfig, LogConfig, UiConfig, WebConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub api: Option<FileApiConfig>,
    pub web: Option<FileWebConfig>,
    pub ui: Option<FileUiConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(api) = self.api {
            api.merge_into(&mut config.api);
        }

        if let Some(web) = self.web {
            web.merge_into(&mut config.web);
        }

        if let Some(ui) = self.ui {
            ui.merge_into(&mut config.ui);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if self.file.is_some() {
            config.file = self.file;
        }
    }
}

#[derive(Deserialize, Default)]
pub struct FileApiConfig {
    pub base_url: Option<String>,
    pub session_cookie: Option<String>,
    pub session_token: Option<String>,
    pub user_id: Option<String>,
    pub request_timeout_ms: Option<u64>,
}

impl std::fmt::Debug for FileApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileApiConfig")
            .field("base_url", &self.base_url)
            .field("session_cookie", &self.session_cookie)
            .field("session_token", &self.session_token.as_ref().map(|_| "[REDACTED]"))
            .field("user_id", &self.user_id)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .finish()
    }
}

impl FileApiConfig {
    fn merge_into(self, config: &mut ApiConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(session_cookie) = self.session_cookie {
            config.session_cookie = session_cookie;
        }

        if let Some(session_token) = self.session_token {
            config.session_token = session_token;
        }

        if self.user_id.is_some() {
            config.user_id = self.user_id;
        }

        if let Some(timeout_ms) = self.request_timeout_ms {
            config.request_timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileWebConfig {
    pub base_url: Option<String>,
}

impl FileWebConfig {
    fn merge_into(self, config: &mut WebConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileUiConfig {
    pub search_debounce_ms: Option<u64>,
    pub page_size: Option<u32>,
}

impl FileUiConfig {
    fn merge_into(self, config: &mut UiConfig) {
        if let Some(debounce_ms) = self.search_debounce_ms {
            config.search_debounce_ms = debounce_ms;
        }

        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
    }
}
