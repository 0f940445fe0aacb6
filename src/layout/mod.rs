//! DOT serialization, external layout and SVG geometry.

mod backend;
mod dot;
mod engine;
mod svg;

pub use backend::{GraphvizBackend, LayoutBackend, LayoutFuture};
pub use dot::to_dot;
pub use engine::{LayoutEngine, LayoutRequest, LayoutResponse};
pub use svg::{BoundingBox, EdgePath, Point, SvgGeometry};

use crate::graph::TypeGraph;
use crate::model::Generation;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[cfg(test)]
pub(crate) use engine::tests::ScriptedBackend;
#[cfg(test)]
pub(crate) use svg::tests::SAMPLE_SVG;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("failed to start `{program}`: {message}")]
    Spawn { program: String, message: String },

    #[error("layout engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("layout timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed layout output: {0}")]
    MalformedOutput(String),

    #[error("layout IO error: {0}")]
    Io(String),

    #[error("layout worker stopped")]
    WorkerStopped,
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutSettings {
    pub timeout: Duration,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// A laid out diagram together with the graph it was produced from.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub generation: Generation,
    pub markup: String,
    pub width: f64,
    pub height: f64,
    pub node_boxes: HashMap<String, BoundingBox>,
    pub edge_paths: HashMap<String, EdgePath>,
    #[serde(skip)]
    graph: Arc<TypeGraph>,
}

impl RenderResult {
    pub(crate) fn new(
        generation: Generation,
        markup: String,
        geometry: SvgGeometry,
        graph: Arc<TypeGraph>,
    ) -> Self {
        Self {
            generation,
            markup,
            width: geometry.width,
            height: geometry.height,
            node_boxes: geometry.nodes,
            edge_paths: geometry.edges,
            graph,
        }
    }

    pub fn graph(&self) -> &Arc<TypeGraph> {
        &self.graph
    }

    pub fn node_box(&self, id: &str) -> Option<&BoundingBox> {
        self.node_boxes.get(id)
    }

    pub fn edge_path(&self, id: &str) -> Option<&EdgePath> {
        self.edge_paths.get(id)
    }
}
