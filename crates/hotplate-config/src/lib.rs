//! Configuration management for hotplate.
//!
//! Parses `hotplate.toml` configuration files with serde and provides
//! auto-discovery of config files in current and parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override the served root directory.
    pub root_dir: Option<PathBuf>,
    /// Override the markdown fallback flag.
    pub markdown_fallback: Option<bool>,
    /// Override the live reload flag.
    pub live_reload: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "hotplate.toml";

/// Default debounce window in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerSection,
    /// Serve configuration (paths are relative strings from TOML).
    serve: ServeSectionRaw,

    /// Resolved serve configuration (set after loading).
    #[serde(skip)]
    pub serve_resolved: ServeSection,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8000,
        }
    }
}

/// Raw serve configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ServeSectionRaw {
    root_dir: Option<String>,
    markdown_fallback: Option<bool>,
    live_reload: Option<bool>,
    debounce_ms: Option<u64>,
}

/// Resolved serve configuration with absolute paths.
#[derive(Debug)]
pub struct ServeSection {
    /// Directory served over HTTP and watched for changes.
    pub root_dir: PathBuf,
    /// Whether missing `.html` pages fall back to rendered `.md` siblings.
    pub markdown_fallback: bool,
    /// Whether the filesystem is watched and browsers are reloaded.
    pub live_reload: bool,
    /// Debounce window for change notifications, in milliseconds.
    pub debounce_ms: u64,
}

impl Default for ServeSection {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            markdown_fallback: true,
            live_reload: true,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `hotplate.toml` in the current directory and
    /// parents, falling back to defaults when none is found.
    ///
    /// CLI settings are applied after loading and path resolution, allowing
    /// CLI arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` doesn't exist, parsing
    /// fails, or the resolved configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load and resolve configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.resolve(base);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Resolve raw TOML values into absolute paths and concrete defaults.
    ///
    /// Relative paths in the config file are interpreted relative to the
    /// directory containing the file.
    fn resolve(&mut self, base: &Path) {
        let defaults = ServeSection::default();
        self.serve_resolved = ServeSection {
            root_dir: self
                .serve
                .root_dir
                .as_ref()
                .map_or_else(|| base.to_path_buf(), |dir| base.join(dir)),
            markdown_fallback: self
                .serve
                .markdown_fallback
                .unwrap_or(defaults.markdown_fallback),
            live_reload: self.serve.live_reload.unwrap_or(defaults.live_reload),
            debounce_ms: self.serve.debounce_ms.unwrap_or(defaults.debounce_ms),
        };
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(root_dir) = &settings.root_dir {
            self.serve_resolved.root_dir.clone_from(root_dir);
        }
        if let Some(markdown_fallback) = settings.markdown_fallback {
            self.serve_resolved.markdown_fallback = markdown_fallback;
        }
        if let Some(live_reload) = settings.live_reload {
            self.serve_resolved.live_reload = live_reload;
        }
    }

    /// Validate the resolved configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.serve_resolved.debounce_ms == 0 {
            return Err(ConfigError::Validation(
                "serve.debounce_ms must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerSection::default(),
            serve: ServeSectionRaw::default(),
            serve_resolved: ServeSection {
                root_dir: base.to_path_buf(),
                ..ServeSection::default()
            },
            config_path: None,
        }
    }
}
