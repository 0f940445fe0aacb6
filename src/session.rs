//! The committed state of one diagram and the transitions that change it.
//!
//! [`Session::handle`] is synchronous and never does IO. Anything slow is returned
//! as an [`Effect`] for the runtime to execute; its completion comes back later as
//! an event tagged with the generation it was issued under. Completions for any
//! other generation are ignored.

use crate::error::{RootNotFoundError, SchemaError};
use crate::graph::{GraphData, TypeGraph};
use crate::introspection::normalize_with;
use crate::layout::{LayoutError, RenderResult};
use crate::model::{DisplayOptions, DisplayOptionsPatch, Generation, Schema, Selection};
use crate::provider::ProviderError;
use crate::viewport::{Viewport, ViewportEvent, ViewportState};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Provider,
    Parse,
    Consistency,
    RootNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SessionError {
    fn new(kind: ErrorKind, err: impl std::fmt::Display) -> Self {
        Self {
            kind,
            message: err.to_string(),
        }
    }
}

impl From<&SchemaError> for SessionError {
    fn from(err: &SchemaError) -> Self {
        match err {
            SchemaError::Parse(_) => SessionError::new(ErrorKind::Parse, err),
            SchemaError::Consistency(_) => SessionError::new(ErrorKind::Consistency, err),
        }
    }
}

impl From<&RootNotFoundError> for SessionError {
    fn from(err: &RootNotFoundError) -> Self {
        SessionError::new(ErrorKind::RootNotFound, err)
    }
}

impl From<&ProviderError> for SessionError {
    fn from(err: &ProviderError) -> Self {
        SessionError::new(ErrorKind::Provider, err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum SessionState {
    Idle,
    Fetching(Generation),
    Ready,
    Error(SessionError),
}

#[derive(Debug)]
pub enum SessionEvent {
    FetchRequested,
    FetchResolved(Generation, Result<Value, ProviderError>),
    OptionsChanged(DisplayOptionsPatch),
    LayoutResolved(Generation, Result<RenderResult, LayoutError>),
    SelectNode(Option<String>),
    SelectEdge(Option<String>),
    Click(String),
    FocusNode(String),
    Resize { width: f64, height: f64 },
    Pan { dx: f64, dy: f64 },
    Zoom { factor: f64, x: f64, y: f64 },
}

/// Work requested by a transition.
#[derive(Debug, Clone)]
pub enum Effect {
    Fetch(Generation),
    Layout(Generation, Arc<TypeGraph>),
}

/// Everything a client needs to draw the current diagram.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub version: u64,
    pub state: SessionState,
    pub options: DisplayOptions,
    pub selection: Selection,
    pub graph: Option<GraphData>,
    pub render: Option<Arc<RenderResult>>,
    pub viewport: ViewportState,
    pub rendering: bool,
    pub layout_error: Option<String>,
}

pub struct Session {
    state: SessionState,
    options: DisplayOptions,
    raw: Option<Arc<Value>>,
    schema: Option<Arc<Schema>>,
    /// Options `schema` was normalized under.
    schema_options: Option<DisplayOptions>,
    graph: Option<Arc<TypeGraph>>,
    /// Options `graph` was built under.
    graph_options: Option<DisplayOptions>,
    render: Option<Arc<RenderResult>>,
    selection: Selection,
    viewport: Viewport,
    fetch_generation: Generation,
    layout_generation: Generation,
    rendering: bool,
    layout_error: Option<String>,
    version: u64,
}

impl Session {
    pub fn new(options: DisplayOptions) -> Self {
        Self {
            state: SessionState::Idle,
            options,
            raw: None,
            schema: None,
            schema_options: None,
            graph: None,
            graph_options: None,
            render: None,
            selection: Selection::default(),
            viewport: Viewport::new(1024.0, 768.0),
            fetch_generation: Generation::default(),
            layout_generation: Generation::default(),
            rendering: false,
            layout_error: None,
            version: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn options(&self) -> &DisplayOptions {
        &self.options
    }

    pub fn schema(&self) -> Option<&Arc<Schema>> {
        self.schema.as_ref()
    }

    pub fn graph(&self) -> Option<&Arc<TypeGraph>> {
        self.graph.as_ref()
    }

    pub fn render(&self) -> Option<&Arc<RenderResult>> {
        self.render.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Bumped on every transition that changes anything visible.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: self.version,
            state: self.state.clone(),
            options: self.options.clone(),
            selection: self.selection.clone(),
            graph: self
                .graph
                .as_ref()
                .map(|g| GraphData::from_type_graph(g, &self.selection)),
            render: self.render.clone(),
            viewport: self.viewport.state(),
            rendering: self.rendering,
            layout_error: self.layout_error.clone(),
        }
    }

    /// Apply one event. Returns the effects to execute, in order.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        let (changed, effects) = match event {
            SessionEvent::FetchRequested => {
                self.fetch_generation = self.fetch_generation.next();
                self.state = SessionState::Fetching(self.fetch_generation);
                (true, vec![Effect::Fetch(self.fetch_generation)])
            }
            SessionEvent::FetchResolved(generation, result) => {
                self.fetch_resolved(generation, result)
            }
            SessionEvent::OptionsChanged(patch) => self.options_changed(&patch),
            SessionEvent::LayoutResolved(generation, result) => {
                (self.layout_resolved(generation, result), Vec::new())
            }
            SessionEvent::SelectNode(id) => (self.select_node(id.as_deref()), Vec::new()),
            SessionEvent::SelectEdge(id) => (self.select_edge(id.as_deref()), Vec::new()),
            SessionEvent::Click(id) => {
                let changed = match self.viewport.click(&id) {
                    Some(ViewportEvent::SelectNode(id)) => self.select_node(Some(&id)),
                    Some(ViewportEvent::SelectEdge(id)) => self.select_edge(Some(&id)),
                    None => false,
                };
                (changed, Vec::new())
            }
            SessionEvent::FocusNode(id) => (self.viewport.focus_node(&id), Vec::new()),
            SessionEvent::Resize { width, height } => {
                self.viewport.resize(width, height);
                (true, Vec::new())
            }
            SessionEvent::Pan { dx, dy } => {
                self.viewport.pan(dx, dy);
                (true, Vec::new())
            }
            SessionEvent::Zoom { factor, x, y } => {
                self.viewport.zoom_at(factor, x, y);
                (true, Vec::new())
            }
        };

        if changed {
            self.version += 1;
        }
        effects
    }

    fn fetch_resolved(
        &mut self,
        generation: Generation,
        result: Result<Value, ProviderError>,
    ) -> (bool, Vec<Effect>) {
        if self.state != SessionState::Fetching(generation) {
            debug!(%generation, latest = %self.fetch_generation, "discarding superseded fetch");
            return (false, Vec::new());
        }

        let raw = match result {
            Ok(raw) => Arc::new(raw),
            Err(err) => {
                warn!(error = %err, "introspection fetch failed");
                return (true, self.fail_fetch((&err).into()));
            }
        };

        match normalize_with(&raw, &self.options) {
            Ok(schema) => {
                info!(types = schema.len(), "schema loaded");
                self.raw = Some(raw);
                self.schema = Some(Arc::new(schema));
                self.schema_options = Some(self.options.clone());
                (true, self.rebuild())
            }
            Err(err) => {
                warn!(error = %err, "introspection payload rejected");
                (true, self.fail_fetch((&err).into()))
            }
        }
    }

    /// A failed fetch keeps the cached payload, so options deferred while it was in
    /// flight still apply to the previous schema.
    fn fail_fetch(&mut self, error: SessionError) -> Vec<Effect> {
        let effects = self.apply_options();
        self.state = SessionState::Error(error);
        effects
    }

    fn options_changed(&mut self, patch: &DisplayOptionsPatch) -> (bool, Vec<Effect>) {
        let options = self.options.apply(patch);
        if options == self.options {
            return (false, Vec::new());
        }
        self.options = options;

        // Mid-fetch, the new options are picked up when the fetch resolves.
        if matches!(self.state, SessionState::Fetching(_)) {
            return (true, Vec::new());
        }
        (true, self.apply_options())
    }

    /// Bring the schema and graph in line with `options`, reusing the cached payload.
    fn apply_options(&mut self) -> Vec<Effect> {
        if self.graph_options.as_ref() == Some(&self.options) {
            return Vec::new();
        }

        if let (Some(raw), Some(previous)) = (&self.raw, &self.schema_options)
            && previous.needs_renormalize(&self.options)
        {
            match normalize_with(raw, &self.options) {
                Ok(schema) => {
                    self.schema = Some(Arc::new(schema));
                    self.schema_options = Some(self.options.clone());
                }
                Err(err) => {
                    warn!(error = %err, "introspection payload rejected");
                    self.state = SessionState::Error((&err).into());
                    return Vec::new();
                }
            }
        }
        self.rebuild()
    }

    /// Build a graph from the current schema and options and request its layout.
    fn rebuild(&mut self) -> Vec<Effect> {
        let Some(schema) = &self.schema else {
            return Vec::new();
        };

        let graph = match TypeGraph::build_with(schema, &self.options) {
            Ok(graph) => Arc::new(graph),
            Err(err) => {
                warn!(error = %err, "keeping previous graph");
                self.state = SessionState::Error((&err).into());
                return Vec::new();
            }
        };

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            root = graph.root_id(),
            "type graph rebuilt"
        );
        self.selection.revalidate(&graph);
        self.graph = Some(Arc::clone(&graph));
        self.graph_options = Some(self.options.clone());
        self.state = SessionState::Ready;
        self.layout_generation = self.layout_generation.next();
        self.rendering = true;
        vec![Effect::Layout(self.layout_generation, graph)]
    }

    fn layout_resolved(
        &mut self,
        generation: Generation,
        result: Result<RenderResult, LayoutError>,
    ) -> bool {
        if generation != self.layout_generation {
            debug!(%generation, latest = %self.layout_generation, "discarding superseded layout");
            return false;
        }
        self.rendering = false;

        match result {
            Ok(render) => {
                info!(
                    %generation,
                    width = render.width,
                    height = render.height,
                    "render committed"
                );
                self.selection.revalidate(render.graph());
                let render = Arc::new(render);
                self.viewport.set_render(Arc::clone(&render));
                self.render = Some(render);
                self.layout_error = None;
            }
            Err(err) => {
                warn!(%generation, error = %err, "layout failed, keeping previous diagram");
                self.layout_error = Some(err.to_string());
            }
        }
        true
    }

    /// Graph that selections are checked against: the one behind the committed
    /// render, or the current graph while nothing has been rendered yet.
    fn selection_graph(&self) -> Option<&TypeGraph> {
        self.render
            .as_ref()
            .map(|r| r.graph().as_ref())
            .or(self.graph.as_deref())
    }

    fn select_node(&mut self, id: Option<&str>) -> bool {
        if let Some(id) = id
            && !self.selection_graph().is_some_and(|g| g.contains_node(id))
        {
            debug!(id, "ignoring selection of unknown type");
            return false;
        }
        self.selection.select_node(id)
    }

    fn select_edge(&mut self, id: Option<&str>) -> bool {
        if let Some(id) = id
            && !self.selection_graph().is_some_and(|g| g.contains_edge(id))
        {
            debug!(id, "ignoring selection of unknown edge");
            return false;
        }
        self.selection.select_edge(id)
    }
}
