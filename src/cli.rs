use crate::model::DisplayOptionsPatch;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "schemamap")]
#[command(about = "Interactive type-graph diagrams of GraphQL schemas")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Render a schema diagram once and write it out
    Render(RenderArgs),

    /// Serve the interactive diagram over HTTP
    Serve(ServeArgs),

    /// Print the introspection query to run against an endpoint
    Query(QueryArgs),

    /// Generate a starter .schemamap.toml configuration file
    Init(InitArgs),
}

/// Where the introspection result comes from.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Saved introspection result (JSON)
    pub input: Option<PathBuf>,

    /// GraphQL endpoint to introspect instead of reading a file
    #[arg(long, conflicts_with = "input")]
    pub endpoint: Option<String>,

    /// Extra request header, as "Name: value" (repeatable)
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Directory containing .schemamap.toml (defaults to current directory)
    #[arg(long, default_value = ".")]
    pub config_dir: PathBuf,
}

/// Overrides for the configured display options. Each option has a flag for
/// either direction; when both are given the last one wins.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Type to start the diagram from
    #[arg(long)]
    pub root: Option<String>,

    /// Keep Relay connection and edge types as they are
    #[arg(long, overrides_with = "collapse_relay")]
    pub keep_relay: bool,

    /// Collapse Relay connections into plain lists
    #[arg(long, overrides_with = "keep_relay")]
    pub collapse_relay: bool,

    /// Include deprecated fields
    #[arg(long, overrides_with = "hide_deprecated")]
    pub show_deprecated: bool,

    /// Leave deprecated fields out
    #[arg(long, overrides_with = "show_deprecated")]
    pub hide_deprecated: bool,

    /// Hide fields whose type is a scalar or enum
    #[arg(long, overrides_with = "show_leaf_fields")]
    pub hide_leaf_fields: bool,

    /// List scalar and enum fields
    #[arg(long, overrides_with = "hide_leaf_fields")]
    pub show_leaf_fields: bool,

    /// Sort types and fields by name
    #[arg(long, overrides_with = "no_sort")]
    pub sort: bool,

    /// Keep schema declaration order
    #[arg(long, overrides_with = "sort")]
    pub no_sort: bool,

    /// Draw the graph without its root type
    #[arg(long, overrides_with = "show_root")]
    pub hide_root: bool,

    /// Draw the root type
    #[arg(long, overrides_with = "hide_root")]
    pub show_root: bool,
}

impl DisplayArgs {
    /// Only flags that were given end up in the patch.
    pub fn patch(&self) -> DisplayOptionsPatch {
        DisplayOptionsPatch {
            root_type: self.root.clone().map(Some),
            skip_relay: toggle(self.collapse_relay, self.keep_relay),
            skip_deprecated: toggle(self.hide_deprecated, self.show_deprecated),
            show_leaf_fields: toggle(self.show_leaf_fields, self.hide_leaf_fields),
            sort_by_alphabet: toggle(self.sort, self.no_sort),
            hide_root: toggle(self.hide_root, self.show_root),
        }
    }
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub display: DisplayArgs,

    /// Output format
    #[arg(short, long, default_value = "svg")]
    pub format: RenderFormat,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub display: DisplayArgs,

    /// Port for HTTP server
    #[arg(long, default_value = "4000")]
    pub port: u16,

    /// Open browser automatically
    #[arg(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct QueryArgs {
    /// Wrap the query in a JSON request body
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Path where to create .schemamap.toml (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderFormat {
    /// Graphviz layout as SVG
    #[default]
    Svg,
    /// Graphviz source, not laid out
    Dot,
    /// Nodes and links as JSON
    Json,
    /// Standalone HTML page around the SVG
    Html,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DisplayOptions;

    #[test]
    fn test_parse_render() {
        let cli = Cli::parse_from([
            "schemamap",
            "render",
            "schema.json",
            "--format",
            "dot",
            "--root",
            "User",
            "--show-deprecated",
        ]);

        let Command::Render(args) = cli.command else {
            panic!("Expected render command");
        };
        assert_eq!(args.source.input, Some(PathBuf::from("schema.json")));
        assert_eq!(args.format, RenderFormat::Dot);

        let patch = args.display.patch();
        assert_eq!(patch.root_type, Some(Some("User".to_string())));
        assert_eq!(patch.skip_deprecated, Some(false));
        assert_eq!(patch.skip_relay, None);
        assert_eq!(patch.hide_root, None);
    }

    #[test]
    fn test_parse_serve_with_headers() {
        let cli = Cli::parse_from([
            "schemamap",
            "serve",
            "--endpoint",
            "https://api.example.com/graphql",
            "-H",
            "Authorization: Bearer abc",
            "--port",
            "8080",
        ]);

        let Command::Serve(args) = cli.command else {
            panic!("Expected serve command");
        };
        assert_eq!(args.port, 8080);
        assert_eq!(args.source.headers, vec!["Authorization: Bearer abc"]);
        assert!(args.source.input.is_none());
    }

    #[test]
    fn test_display_flags_override_config_either_way() {
        let cli = Cli::parse_from([
            "schemamap",
            "render",
            "schema.json",
            "--collapse-relay",
            "--sort",
            "--no-sort",
            "--show-root",
        ]);
        let Command::Render(args) = cli.command else {
            panic!("Expected render command");
        };

        let config = DisplayOptions {
            skip_relay: false,
            sort_by_alphabet: true,
            hide_root: true,
            ..Default::default()
        };
        let options = config.apply(&args.display.patch());

        assert!(options.skip_relay);
        assert!(!options.sort_by_alphabet);
        assert!(!options.hide_root);
        assert_eq!(options.skip_deprecated, config.skip_deprecated);
    }

    #[test]
    fn test_input_conflicts_with_endpoint() {
        let result = Cli::try_parse_from([
            "schemamap",
            "render",
            "schema.json",
            "--endpoint",
            "https://api.example.com/graphql",
        ]);
        assert!(result.is_err());
    }
}
