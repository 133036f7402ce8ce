// File: src/config.rs
// Purpose: Configuration parsing from rhtmx.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub routing: RoutingConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub dev: DevConfig,

    #[serde(default)]
    pub app: AppConfig,
}

/// Project metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub author: Option<String>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// Pre-rendered output served ahead of route matching
    #[serde(default)]
    pub static_dir: Option<String>,

    /// Route manifest to load instead of walking the app directory
    #[serde(default)]
    pub manifest: Option<String>,
}

/// Routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Directory containing page, layout and route files (default: "app")
    #[serde(default = "default_app_dir")]
    pub app_dir: String,

    /// File extensions considered route files
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Query flag marking a data request (default: "_data")
    #[serde(default = "default_data_query")]
    pub data_query: String,

    /// Header marking a data request (default: "x-rhtmx-data")
    #[serde(default = "default_data_header")]
    pub data_header: String,

    /// Sort routes static < dynamic < catch-all instead of discovery order
    #[serde(default = "default_false")]
    pub sort_by_specificity: bool,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Manifest file name, written inside `output_dir`
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,

    /// Logical name → hashed file name map produced by the bundler
    #[serde(default)]
    pub asset_manifest: Option<String>,

    /// Directory of client assets served under `asset_prefix`
    #[serde(default = "default_public_dir")]
    pub public_dir: String,

    #[serde(default = "default_asset_prefix")]
    pub asset_prefix: String,
}

/// Development configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevConfig {
    #[serde(default = "default_true")]
    pub hot_reload: bool,

    #[serde(default = "default_watch_paths")]
    pub watch_paths: Vec<String>,
}

/// Document-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Theme name echoed in data payloads and the bootstrap payload
    #[serde(default)]
    pub theme: Option<String>,

    #[serde(default = "default_lang")]
    pub lang: String,

    /// Client entry scripts, by logical asset name
    #[serde(default = "default_entry_scripts")]
    pub entry_scripts: Vec<String>,
}

// Default values
fn default_name() -> String {
    "rhtmx-app".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_app_dir() -> String {
    "app".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["rs".to_string(), "rhtmx".to_string()]
}

fn default_data_query() -> String {
    rhtmx_protocol::DEFAULT_DATA_QUERY.to_string()
}

fn default_data_header() -> String {
    rhtmx_protocol::DEFAULT_DATA_HEADER.to_string()
}

fn default_output_dir() -> String {
    "dist".to_string()
}

fn default_manifest_file() -> String {
    "rhtmx-manifest.json".to_string()
}

fn default_public_dir() -> String {
    "public".to_string()
}

fn default_asset_prefix() -> String {
    "/_rhtmx".to_string()
}

fn default_watch_paths() -> Vec<String> {
    vec!["app".to_string()]
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_entry_scripts() -> Vec<String> {
    vec!["client.js".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

// Default implementations
impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            version: default_version(),
            author: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            static_dir: None,
            manifest: None,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
            extensions: default_extensions(),
            data_query: default_data_query(),
            data_header: default_data_header(),
            sort_by_specificity: false,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            manifest_file: default_manifest_file(),
            asset_manifest: None,
            public_dir: default_public_dir(),
            asset_prefix: default_asset_prefix(),
        }
    }
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            hot_reload: true,
            watch_paths: default_watch_paths(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: None,
            lang: default_lang(),
            entry_scripts: default_entry_scripts(),
        }
    }
}

impl Config {
    /// Load configuration from rhtmx.toml
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist or is empty, return default config
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from default path (./rhtmx.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("rhtmx.toml")
    }

    /// Applies environment overrides (`HOT_RELOAD`)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var("HOT_RELOAD") {
            self.dev.hot_reload = matches!(value.as_str(), "1" | "true" | "yes");
        }
        self
    }

    /// Resolves `app_dir` against a project root
    pub fn app_dir(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(&self.routing.app_dir)
    }

    /// Full path of the manifest written by `build`
    pub fn manifest_output(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref()
            .join(&self.build.output_dir)
            .join(&self.build.manifest_file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.routing.app_dir, "app");
        assert_eq!(config.routing.extensions, vec!["rs", "rhtmx"]);
        assert_eq!(config.routing.data_query, "_data");
        assert!(!config.routing.sort_by_specificity);
        assert_eq!(config.build.asset_prefix, "/_rhtmx");
    }

    #[test]
    fn test_empty_config() {
        let config = toml::from_str::<Config>("").unwrap_or_default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.app.lang, "en");
        assert_eq!(config.app.theme, None);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("rhtmx.toml")).unwrap();
        assert_eq!(config.routing.app_dir, "app");
    }

    #[test]
    fn test_custom_sections() {
        let toml = r#"
            [server]
            static_dir = "dist"

            [routing]
            app_dir = "src/app"
            data_query = "__data"
            sort_by_specificity = true

            [app]
            theme = "dark"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.static_dir.as_deref(), Some("dist"));
        assert_eq!(config.routing.app_dir, "src/app");
        assert_eq!(config.routing.data_query, "__data");
        assert_eq!(config.routing.data_header, "x-rhtmx-data");
        assert!(config.routing.sort_by_specificity);
        assert_eq!(config.app.theme.as_deref(), Some("dark"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rhtmx.toml");
        fs::write(&path, "[server\nport = ").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
