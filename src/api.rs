//! Library API for schemamap.
//!
//! These functions run the pipeline one stage at a time and return proper `Result`
//! types, for callers that want a diagram without the interactive runtime.
//!
//! # Example
//!
//! ```no_run
//! use schemamap::{DisplayOptions, build_graph, load_schema};
//!
//! let json = std::fs::read_to_string("schema.json")?;
//! let payload: serde_json::Value = serde_json::from_str(&json)?;
//! let options = DisplayOptions::default();
//! let schema = load_schema(&payload, &options)?;
//! let graph = build_graph(&schema, &options)?;
//! println!("{} types reachable from {}", graph.node_count(), graph.root_id());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::error::SchemamapError;
use crate::graph::TypeGraph;
use crate::introspection::{INTROSPECTION_QUERY, normalize_with};
use crate::layout::{LayoutBackend, LayoutEngine, LayoutSettings, RenderResult};
use crate::model::{DisplayOptions, Schema};
use crate::provider::IntrospectionProvider;
use std::sync::Arc;

/// Normalize an introspection payload under `options`.
pub fn load_schema(
    payload: &serde_json::Value,
    options: &DisplayOptions,
) -> Result<Schema, SchemamapError> {
    Ok(normalize_with(payload, options)?)
}

/// Build the type graph for `options.root_type` (or the query type).
pub fn build_graph(schema: &Schema, options: &DisplayOptions) -> Result<TypeGraph, SchemamapError> {
    Ok(TypeGraph::build_with(schema, options)?)
}

/// Run the introspection query through `provider` and build its graph.
pub async fn fetch_graph(
    provider: &dyn IntrospectionProvider,
    options: &DisplayOptions,
) -> Result<TypeGraph, SchemamapError> {
    let payload = provider.fetch(INTROSPECTION_QUERY).await?;
    let schema = load_schema(&payload, options)?;
    build_graph(&schema, options)
}

/// Lay out a graph once. Must be called inside a Tokio runtime.
pub async fn render_graph(
    graph: Arc<TypeGraph>,
    backend: Arc<dyn LayoutBackend>,
    settings: LayoutSettings,
) -> Result<RenderResult, SchemamapError> {
    let mut engine = LayoutEngine::spawn(backend, settings);
    Ok(engine.render(graph).await?)
}
