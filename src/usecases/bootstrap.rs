use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc},
};

use crate::{
    api::{ApiClient, ApiMessageDispatcher, ApiStreamConnector},
    infra::{
        self,
        config::{AppConfig, FileConfigAdapter},
        contracts::ConfigAdapter,
        error::AppError,
        opener::DesktopOpener,
        storage_layout::StorageLayout,
    },
    ui::ChannelEventSource,
    usecases::{
        context::AppContext,
        contracts::{AppEventSource, ShellOrchestrator},
        shell::{DefaultShellOrchestrator, ShellSettings},
    },
};

const LOCAL_CONFIG_PATH: &str = "config.toml";

pub struct ShellComposition {
    pub event_source: Box<dyn AppEventSource>,
    pub orchestrator: Box<dyn ShellOrchestrator>,
}

/// Loads config, starts file logging and builds the API client.
pub fn bootstrap(config_path: Option<&Path>) -> anyhow::Result<AppContext> {
    let layout = StorageLayout::resolve()?;
    let config = load_config(config_path, &layout)?;

    let log_file = config
        .logging
        .file
        .as_deref()
        .map(PathBuf::from)
        .unwrap_or_else(|| layout.log_file());
    let guard = infra::logging::init(&config.logging, &log_file)?;

    tracing::info!(
        config = ?config,
        log_file = %log_file.display(),
        "configuration loaded"
    );

    let context = build_context(config)?;
    Ok(context.with_log_guard(guard))
}

/// Bootstrap for one-shot commands that print to stdout: no log file.
pub fn bootstrap_quiet(config_path: Option<&Path>) -> anyhow::Result<AppContext> {
    let layout = StorageLayout::resolve()?;
    let config = load_config(config_path, &layout)?;
    Ok(build_context(config)?)
}

fn load_config(config_path: Option<&Path>, layout: &StorageLayout) -> anyhow::Result<AppConfig> {
    let path = resolve_config_path(config_path, Path::new(LOCAL_CONFIG_PATH), layout);
    FileConfigAdapter::new(path.as_deref()).load()
}

fn resolve_config_path(
    explicit: Option<&Path>,
    local: &Path,
    layout: &StorageLayout,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if local.exists() {
        return Some(local.to_path_buf());
    }

    let fallback = layout.config_file();
    fallback.exists().then_some(fallback)
}

fn build_context(config: AppConfig) -> Result<AppContext, AppError> {
    let api = ApiClient::new(&config.api)?;
    Ok(AppContext::new(config, api))
}

/// Wires the controller to the API runtime and terminal input. Background
/// sends and stream events share one channel with the event source.
pub fn compose_shell(context: &AppContext) -> ShellComposition {
    let (events_tx, events_rx) = mpsc::channel();
    let runtime = Arc::downgrade(context.api.runtime());
    let session = context.api.session().clone();

    let dispatcher = ApiMessageDispatcher::new(runtime.clone(), session.clone(), events_tx.clone());
    let connector = ApiStreamConnector::new(runtime, session, events_tx);
    let orchestrator = DefaultShellOrchestrator::new(
        context.api.clone(),
        dispatcher,
        connector,
        DesktopOpener,
        ShellSettings::from_config(&context.config),
    );

    ShellComposition {
        event_source: Box::new(ChannelEventSource::new(events_rx)),
        orchestrator: Box::new(orchestrator),
    }
}
