use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::io::file_service::FileService;
use crate::io::http_service::HttpService;
use crate::io::service::ChecklistService;
use crate::model::config::{Backend, Config};

pub const CONFIG_FILE: &str = "muster.toml";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("the http backend needs service.base_url in {0}")]
    MissingBaseUrl(String),
    #[error("could not set up the http client: {0}")]
    HttpClient(#[from] crate::io::service::ServiceError),
}

/// A parsed config plus where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Directory that relative paths in the config resolve against
    pub root: PathBuf,
    /// The file that was read, if any
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Resolve a config-relative path
    pub fn resolve(&self, rel: &str) -> PathBuf {
        let p = Path::new(rel);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Data directory of the file backend
    pub fn data_dir(&self) -> PathBuf {
        self.resolve(&self.config.service.data_dir)
    }

    /// Log file path, if configured
    pub fn log_file(&self) -> Option<PathBuf> {
        self.config.log.file.as_deref().map(|f| self.resolve(f))
    }
}

/// Walk up from `start` looking for muster.toml
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Read and parse a config file
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the config that applies to `start`. Without a config file the
/// defaults are used, rooted at `start`.
pub fn load_config(start: &Path) -> Result<LoadedConfig, ConfigError> {
    match discover_config(start) {
        Some(path) => {
            let config = read_config(&path)?;
            let root = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start.to_path_buf());
            Ok(LoadedConfig {
                config,
                root,
                path: Some(path),
            })
        }
        None => Ok(LoadedConfig {
            config: Config::default(),
            root: start.to_path_buf(),
            path: None,
        }),
    }
}

/// Build the backend the config asks for
pub fn open_service(loaded: &LoadedConfig) -> Result<Arc<dyn ChecklistService>, ConfigError> {
    let svc = &loaded.config.service;
    match svc.backend {
        Backend::File => Ok(Arc::new(FileService::new(loaded.data_dir()))),
        Backend::Http => {
            let base = svc.base_url.as_deref().ok_or_else(|| {
                ConfigError::MissingBaseUrl(
                    loaded
                        .path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| CONFIG_FILE.to_string()),
                )
            })?;
            Ok(Arc::new(HttpService::new(
                base,
                svc.token.clone(),
                svc.timeout_secs,
            )?))
        }
    }
}
