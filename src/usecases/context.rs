use crate::{api::ApiClient, infra::config::AppConfig, infra::logging::LogGuard};

pub struct AppContext {
    pub config: AppConfig,
    pub api: ApiClient,
    _log_guard: Option<LogGuard>,
}

impl AppContext {
    pub fn new(config: AppConfig, api: ApiClient) -> Self {
        Self {
            config,
            api,
            _log_guard: None,
        }
    }

    pub fn with_log_guard(mut self, guard: LogGuard) -> Self {
        self._log_guard = Some(guard);
        self
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("api", &self.api)
            .finish_non_exhaustive()
    }
}
