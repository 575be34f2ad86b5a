use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::infra::error::AppError;

const APP_DIR_NAME: &str = "carechat";
const LOG_FILE_NAME: &str = "carechat.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl StorageLayout {
    pub fn resolve() -> Result<Self, AppError> {
        let config_base = dirs::config_dir().ok_or_else(|| AppError::StoragePathResolution {
            details: "unable to resolve config base directory".into(),
        })?;
        let data_base = dirs::data_local_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
            .ok_or_else(|| AppError::StoragePathResolution {
                details: "unable to resolve data base directory".into(),
            })?;

        Ok(Self {
            config_dir: config_base.join(APP_DIR_NAME),
            log_dir: data_base.join(APP_DIR_NAME).join("logs"),
        })
    }

    /// Layout rooted at one directory, for portable installs and tests.
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            log_dir: root.join("logs"),
        }
    }

    pub fn ensure_dirs(&self) -> Result<(), AppError> {
        for dir in [&self.config_dir, &self.log_dir] {
            fs::create_dir_all(dir).map_err(|source| AppError::StorageDirCreate {
                path: dir.clone(),
                source,
            })?;
        }

        Ok(())
    }

    /// Config file looked up when neither `--config` nor `./config.toml` exists.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_dirs_are_app_scoped() {
        let layout = StorageLayout::resolve().expect("layout should resolve");

        assert!(layout.config_dir.ends_with(APP_DIR_NAME));
        assert!(layout.log_dir.ends_with(Path::new(APP_DIR_NAME).join("logs")));
    }

    #[test]
    fn ensure_dirs_creates_missing_directories() {
        let root = tempfile::tempdir().expect("temp dir");
        let layout = StorageLayout::rooted_at(root.path());

        layout.ensure_dirs().expect("dirs should be created");

        assert!(layout.config_dir.is_dir());
        assert!(layout.log_dir.is_dir());
        assert_eq!(layout.log_file(), root.path().join("logs").join(LOG_FILE_NAME));
    }
}
