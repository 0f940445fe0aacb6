mod init;
mod query;
mod render;
mod serve;

pub use init::{cmd_init, cmd_init_with_fs};
pub use query::cmd_query;
pub use render::cmd_render;
pub use serve::cmd_serve;

use crate::cli::{DisplayArgs, SourceArgs};
use crate::config::Config;
use crate::fs::{FileSystem, RealFs};
use crate::model::DisplayOptions;
use crate::provider::{FileProvider, HttpProvider, IntrospectionProvider};
use crate::style;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared context for command execution: config merged with CLI flags and the
/// provider the introspection comes from.
pub struct CommandContext {
    pub config: Config,
    pub options: DisplayOptions,
    pub provider: Arc<dyn IntrospectionProvider>,
    /// Endpoint URL or file path, for messages and the page title.
    pub source: String,
    pub endpoint_url: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl CommandContext {
    /// Returns Err(exit_code) if setup fails.
    pub fn new(source: &SourceArgs, display: &DisplayArgs) -> Result<Self, i32> {
        let config = Config::load(&source.config_dir).unwrap_or_else(|e| {
            style::warning(&format!("Failed to load config: {}. Using defaults.", e));
            Config::default()
        });
        Self::with_config(source, display, config, Arc::new(RealFs::new()))
    }

    pub fn with_config(
        source: &SourceArgs,
        display: &DisplayArgs,
        config: Config,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self, i32> {
        let options = config.display.apply(&display.patch());

        let mut headers = config.endpoint.headers.clone();
        for raw in &source.headers {
            match parse_header(raw) {
                Some((name, value)) => {
                    headers.insert(name, value);
                }
                None => {
                    style::error(&format!("Invalid header {:?}, expected \"Name: value\"", raw));
                    return Err(1);
                }
            }
        }

        let endpoint = source.endpoint.clone().or_else(|| config.endpoint.url.clone());
        let (provider, label, endpoint_url) = match (&source.input, endpoint) {
            (Some(path), _) => {
                let provider: Arc<dyn IntrospectionProvider> =
                    Arc::new(FileProvider::new(path, fs));
                (provider, path.display().to_string(), None)
            }
            (None, Some(url)) => {
                let provider: Arc<dyn IntrospectionProvider> =
                    Arc::new(HttpProvider::with_headers(&url, headers.clone()));
                (provider, url.clone(), Some(url))
            }
            (None, None) => {
                style::error("No introspection source: pass a JSON file or --endpoint");
                style::hint("Set [endpoint] url in .schemamap.toml to skip the flag");
                return Err(1);
            }
        };

        Ok(Self {
            config,
            options,
            provider,
            source: label,
            endpoint_url,
            headers,
        })
    }
}

fn parse_header(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

/// Runtime for the async parts of a command.
fn runtime() -> Result<tokio::runtime::Runtime, i32> {
    tokio::runtime::Runtime::new().map_err(|e| {
        style::error(&format!("Failed to start async runtime: {}", e));
        1
    })
}
