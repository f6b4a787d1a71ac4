use contract_callsite::{CallSiteReconstruction, Disabled, SourceReconstructor};
use contract_dump::{RenderLimits, Renderer};
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Segments cached by a [`crate::PathCache`] before it is cleared
pub const DEFAULT_PATH_CACHE_CAPACITY: usize = 10_000;

static INSTALLED: OnceCell<DiagnosticsConfig> = OnceCell::new();
static DEFAULTS: Lazy<DiagnosticsConfig> = Lazy::new(DiagnosticsConfig::default);

/// Errors raised while loading or installing a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("A diagnostics config is already installed")]
    AlreadyInstalled,
}

/// How failure messages are produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Re-read the calling source to describe failures that carry no message
    pub reconstruct_call_sites: bool,

    /// Extra directories relative call-site paths are resolved against
    pub source_roots: Vec<PathBuf>,

    /// Bounds for values interpolated into messages
    pub render: RenderLimits,

    /// Default capacity of dot-notation path caches
    pub path_cache_capacity: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            reconstruct_call_sites: true,
            source_roots: Vec::new(),
            render: RenderLimits::default(),
            path_cache_capacity: DEFAULT_PATH_CACHE_CAPACITY,
        }
    }
}

impl DiagnosticsConfig {
    /// Never touch source files; failures without a message stay generic
    pub fn without_reconstruction() -> Self {
        Self {
            reconstruct_call_sites: false,
            ..Default::default()
        }
    }

    /// Shorter renderings for one-line logs
    pub fn compact() -> Self {
        Self {
            render: RenderLimits::compact(),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        self.render.validate()?;

        if self.path_cache_capacity == 0 {
            return Err("path_cache_capacity must be > 0".to_string());
        }

        if let Some(root) = self.source_roots.iter().find(|r| r.as_os_str().is_empty()) {
            return Err(format!("source_roots contains an empty path: {root:?}"));
        }

        Ok(())
    }

    /// Parse and validate a TOML document; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Make this the process-wide configuration; only the first call wins
    pub fn install(self) -> Result<(), ConfigError> {
        self.validate().map_err(ConfigError::Invalid)?;
        INSTALLED
            .set(self)
            .map_err(|_| ConfigError::AlreadyInstalled)?;
        log::debug!("Diagnostics config installed");
        Ok(())
    }

    /// The installed configuration, or the defaults
    pub fn current() -> &'static Self {
        INSTALLED.get().unwrap_or_else(|| Lazy::force(&DEFAULTS))
    }

    pub const fn renderer(&self) -> Renderer {
        Renderer::new(self.render)
    }

    pub fn reconstructor(&self) -> Arc<dyn CallSiteReconstruction> {
        if self.reconstruct_call_sites {
            Arc::new(SourceReconstructor::with_roots(self.source_roots.iter().cloned()))
        } else {
            Arc::new(Disabled)
        }
    }
}
