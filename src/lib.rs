pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod fs;
pub mod graph;
pub mod introspection;
pub mod layout;
pub mod model;
pub mod provider;
pub mod runtime;
pub mod server;
pub mod session;
pub mod style;
pub mod viewport;

pub use api::{build_graph, fetch_graph, load_schema, render_graph};
pub use cli::Cli;
pub use commands::{cmd_init, cmd_query, cmd_render, cmd_serve};
pub use config::Config;
pub use error::{
    RootNotFoundError, SchemaConsistencyError, SchemaError, SchemaParseError, SchemamapError,
};
pub use graph::{TypeGraph, extract_type_id};
pub use introspection::{INTROSPECTION_QUERY, normalize, normalize_with};
pub use layout::{
    GraphvizBackend, LayoutBackend, LayoutEngine, LayoutError, LayoutSettings, RenderResult,
};
pub use model::{DisplayOptions, DisplayOptionsPatch, Generation, Schema, Selection};
pub use provider::{
    FileProvider, HttpProvider, IntrospectionProvider, ProviderError, StaticProvider,
};
pub use runtime::{Voyager, VoyagerHandle};
pub use server::{PageOptions, render_page};
pub use session::{Session, SessionEvent, SessionSnapshot, SessionState};
pub use viewport::{Viewport, ViewportEvent};
