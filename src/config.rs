use crate::fs::{FileSystem, RealFs};
use crate::layout::{GraphvizBackend, LayoutSettings};
use crate::model::DisplayOptions;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = ".schemamap.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub display: DisplayOptions,
    pub layout: LayoutConfig,
    pub endpoint: EndpointConfig,
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Graphviz executable, looked up on `PATH` when relative.
    pub program: PathBuf,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default)]
pub struct EndpointConfig {
    pub url: Option<String>,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    display: Option<RawDisplay>,
    layout: Option<RawLayout>,
    endpoint: Option<RawEndpoint>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    root_type: Option<String>,
    skip_relay: Option<bool>,
    skip_deprecated: Option<bool>,
    show_leaf_fields: Option<bool>,
    sort_by_alphabet: Option<bool>,
    hide_root: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawLayout {
    program: Option<PathBuf>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    url: Option<String>,
    headers: Option<BTreeMap<String, String>>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("dot"),
            timeout_secs: 30,
        }
    }
}

impl LayoutConfig {
    pub fn settings(&self) -> LayoutSettings {
        LayoutSettings {
            timeout: Duration::from_secs(self.timeout_secs.max(1)),
        }
    }

    pub fn backend(&self) -> GraphvizBackend {
        GraphvizBackend::new(&self.program)
    }
}

impl Config {
    pub fn load(project_path: &Path) -> Result<Self, ConfigError> {
        Self::load_with_fs(project_path, &RealFs)
    }

    pub fn load_with_fs(project_path: &Path, fs: &dyn FileSystem) -> Result<Self, ConfigError> {
        let config_path = project_path.join(CONFIG_FILE_NAME);

        if !fs.exists(&config_path) {
            return Ok(Self::default());
        }

        let content = fs.read_to_string(&config_path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;

        let display = match raw.display {
            Some(d) => {
                let defaults = DisplayOptions::default();
                DisplayOptions {
                    root_type: d.root_type.filter(|r| !r.is_empty()),
                    skip_relay: d.skip_relay.unwrap_or(defaults.skip_relay),
                    skip_deprecated: d.skip_deprecated.unwrap_or(defaults.skip_deprecated),
                    show_leaf_fields: d.show_leaf_fields.unwrap_or(defaults.show_leaf_fields),
                    sort_by_alphabet: d.sort_by_alphabet.unwrap_or(defaults.sort_by_alphabet),
                    hide_root: d.hide_root.unwrap_or(defaults.hide_root),
                }
            }
            None => DisplayOptions::default(),
        };

        let layout = match raw.layout {
            Some(l) => {
                let defaults = LayoutConfig::default();
                LayoutConfig {
                    program: l.program.unwrap_or(defaults.program),
                    timeout_secs: l.timeout_secs.unwrap_or(defaults.timeout_secs),
                }
            }
            None => LayoutConfig::default(),
        };

        let endpoint = match raw.endpoint {
            Some(e) => EndpointConfig {
                url: e.url,
                headers: e.headers.unwrap_or_default(),
            },
            None => EndpointConfig::default(),
        };

        Ok(Self {
            display,
            layout,
            endpoint,
        })
    }
}

/// Starter `.schemamap.toml`, every setting at its default.
pub fn generate_config_template() -> String {
    r#"# schemamap configuration

[display]
# Type the diagram starts from (defaults to the schema's query type)
# root_type = "Query"

# Collapse Relay connections and edges into plain lists
skip_relay = true

# Leave deprecated fields out of the diagram
skip_deprecated = true

# Show fields whose type is a scalar or enum
show_leaf_fields = true

# Sort types and fields by name instead of declaration order
sort_by_alphabet = false

# Draw the graph without its root type
hide_root = false

[layout]
# Graphviz executable
program = "dot"

# Give up on a layout after this many seconds
timeout_secs = 30

[endpoint]
# GraphQL endpoint used when no input file is given
# url = "https://example.com/graphql"

# Extra request headers
# [endpoint.headers]
# Authorization = "Bearer <token>"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let fs = MockFs::new();
        let config = Config::load_with_fs(Path::new("/project"), &fs).unwrap();

        assert_eq!(config.display, DisplayOptions::default());
        assert_eq!(config.layout.program, PathBuf::from("dot"));
        assert_eq!(config.layout.settings().timeout, Duration::from_secs(30));
        assert!(config.endpoint.url.is_none());
    }

    #[test]
    fn test_partial_config() {
        let fs = MockFs::with_files([(
            "/project/.schemamap.toml",
            r#"
[display]
root_type = "Viewer"
hide_root = true

[layout]
timeout_secs = 5

[endpoint]
url = "https://api.example.com/graphql"

[endpoint.headers]
Authorization = "Bearer abc"
"#,
        )]);
        let config = Config::load_with_fs(Path::new("/project"), &fs).unwrap();

        assert_eq!(config.display.root_type.as_deref(), Some("Viewer"));
        assert!(config.display.hide_root);
        assert!(config.display.skip_relay);
        assert_eq!(config.layout.timeout_secs, 5);
        assert_eq!(config.layout.program, PathBuf::from("dot"));
        assert_eq!(
            config.endpoint.url.as_deref(),
            Some("https://api.example.com/graphql")
        );
        assert_eq!(config.endpoint.headers["Authorization"], "Bearer abc");
    }

    #[test]
    fn test_invalid_toml() {
        let fs = MockFs::with_files([("/project/.schemamap.toml", "[display\nskip_relay = ")]);
        let err = Config::load_with_fs(Path::new("/project"), &fs).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let config = Config::parse(&generate_config_template()).unwrap();
        assert_eq!(config.display, DisplayOptions::default());
        assert_eq!(config.layout.timeout_secs, 30);
        assert!(config.endpoint.headers.is_empty());
    }
}
