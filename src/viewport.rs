//! Pan, zoom and hit-testing over a committed render.
//!
//! Screen coordinates are `graph * zoom + pan`. The viewport never owns selection;
//! clicks are translated into [`ViewportEvent`]s that the session applies.

use crate::layout::{Point, RenderResult};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Transform {
    fn to_graph(self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.pan_x) / self.zoom,
            y: (screen.y - self.pan_y) / self.zoom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Node(String),
    Edge(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id")]
pub enum ViewportEvent {
    SelectNode(String),
    SelectEdge(String),
}

#[derive(Debug, Clone, Copy)]
pub struct ViewportSettings {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Margin kept around the diagram when fitting, in screen units.
    pub padding: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 10.0,
            padding: 20.0,
        }
    }
}

/// Serializable view of the viewport for clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportState {
    pub width: f64,
    pub height: f64,
    pub transform: Transform,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    render: Option<Arc<RenderResult>>,
    width: f64,
    height: f64,
    transform: Transform,
    settings: ViewportSettings,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_settings(width, height, ViewportSettings::default())
    }

    pub fn with_settings(width: f64, height: f64, settings: ViewportSettings) -> Self {
        Self {
            render: None,
            width: width.max(1.0),
            height: height.max(1.0),
            transform: Transform::default(),
            settings,
        }
    }

    pub fn render(&self) -> Option<&Arc<RenderResult>> {
        self.render.as_ref()
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    pub fn state(&self) -> ViewportState {
        ViewportState {
            width: self.width,
            height: self.height,
            transform: self.transform,
        }
    }

    /// Swap in a new render. The first one is fitted to the container, later ones
    /// keep whatever graph point was at the center.
    pub fn set_render(&mut self, render: Arc<RenderResult>) {
        let first = self.render.is_none();
        let center = self.visible_center();
        self.render = Some(render);
        if first {
            self.fit();
        } else {
            self.center_on(center);
        }
    }

    /// Scale and center the whole diagram into the container.
    pub fn fit(&mut self) {
        let Some(render) = &self.render else {
            return;
        };
        let usable_w = (self.width - 2.0 * self.settings.padding).max(1.0);
        let usable_h = (self.height - 2.0 * self.settings.padding).max(1.0);
        let zoom = if render.width > 0.0 && render.height > 0.0 {
            (usable_w / render.width).min(usable_h / render.height)
        } else {
            1.0
        };
        self.transform.zoom = self.clamp_zoom(zoom);
        let center = Point {
            x: render.width / 2.0,
            y: render.height / 2.0,
        };
        self.center_on(center);
    }

    /// Graph point currently shown at the container center.
    pub fn visible_center(&self) -> Point {
        self.transform.to_graph(Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        })
    }

    pub fn target(&self, id: &str) -> Option<Target> {
        let graph = self.render.as_ref()?.graph();
        if graph.contains_node(id) {
            Some(Target::Node(id.to_string()))
        } else if graph.contains_edge(id) {
            Some(Target::Edge(id.to_string()))
        } else {
            None
        }
    }

    pub fn click(&self, id: &str) -> Option<ViewportEvent> {
        match self.target(id)? {
            Target::Node(id) => Some(ViewportEvent::SelectNode(id)),
            Target::Edge(id) => Some(ViewportEvent::SelectEdge(id)),
        }
    }

    /// Center on a node, keeping the zoom. Returns false when the node is not drawn.
    pub fn focus_node(&mut self, id: &str) -> bool {
        let Some(center) = self
            .render
            .as_ref()
            .and_then(|r| r.node_box(id))
            .map(|b| b.center())
        else {
            return false;
        };
        self.center_on(center);
        true
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        let center = self.visible_center();
        self.width = width.max(1.0);
        self.height = height.max(1.0);
        self.center_on(center);
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform.pan_x += dx;
        self.transform.pan_y += dy;
    }

    /// Multiply the zoom by `factor`, keeping the screen point `(x, y)` fixed.
    pub fn zoom_at(&mut self, factor: f64, x: f64, y: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let anchor = self.transform.to_graph(Point { x, y });
        self.transform.zoom = self.clamp_zoom(self.transform.zoom * factor);
        self.transform.pan_x = x - anchor.x * self.transform.zoom;
        self.transform.pan_y = y - anchor.y * self.transform.zoom;
    }

    fn center_on(&mut self, point: Point) {
        self.transform.pan_x = self.width / 2.0 - point.x * self.transform.zoom;
        self.transform.pan_y = self.height / 2.0 - point.y * self.transform.zoom;
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.settings.min_zoom, self.settings.max_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::TypeGraph;
    use crate::introspection::{fixtures, normalize};
    use crate::layout::{BoundingBox, SAMPLE_SVG, SvgGeometry};
    use crate::model::Generation;
    use std::collections::HashMap;

    fn render() -> Arc<RenderResult> {
        let schema = normalize(&fixtures::blog(), false, true, false).unwrap();
        let graph = Arc::new(TypeGraph::build(&schema, None, false, true).unwrap());
        let geometry = SvgGeometry {
            width: 260.0,
            height: 120.0,
            nodes: HashMap::from([(
                "User".to_string(),
                BoundingBox {
                    x: 184.0,
                    y: 12.0,
                    width: 64.0,
                    height: 92.0,
                },
            )]),
            edges: HashMap::new(),
        };
        Arc::new(RenderResult::new(
            Generation(1),
            SAMPLE_SVG.to_string(),
            geometry,
            graph,
        ))
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_first_render_is_fitted() {
        let mut viewport = Viewport::new(560.0, 280.0);
        viewport.set_render(render());

        // usable area 520x240, diagram 260x120
        assert!(approx(viewport.transform().zoom, 2.0));
        let center = viewport.visible_center();
        assert!(approx(center.x, 130.0));
        assert!(approx(center.y, 60.0));
    }

    #[test]
    fn test_later_render_keeps_center() {
        let mut viewport = Viewport::new(560.0, 280.0);
        viewport.set_render(render());
        viewport.pan(-40.0, 10.0);
        let before = viewport.visible_center();
        let zoom = viewport.transform().zoom;

        viewport.set_render(render());
        let after = viewport.visible_center();
        assert!(approx(before.x, after.x));
        assert!(approx(before.y, after.y));
        assert!(approx(zoom, viewport.transform().zoom));
    }

    #[test]
    fn test_click_maps_ids() {
        let mut viewport = Viewport::new(400.0, 300.0);
        assert_eq!(viewport.click("User"), None);

        viewport.set_render(render());
        assert_eq!(
            viewport.click("User"),
            Some(ViewportEvent::SelectNode("User".to_string()))
        );
        assert_eq!(
            viewport.click("FIELD_EDGE::Query::user::User"),
            Some(ViewportEvent::SelectEdge(
                "FIELD_EDGE::Query::user::User".to_string()
            ))
        );
        assert_eq!(viewport.click("graph0"), None);
        assert_eq!(viewport.target("Missing"), None);
    }

    #[test]
    fn test_focus_node() {
        let mut viewport = Viewport::new(400.0, 300.0);
        viewport.set_render(render());

        assert!(viewport.focus_node("User"));
        let center = viewport.visible_center();
        assert!(approx(center.x, 216.0));
        assert!(approx(center.y, 58.0));

        let transform = viewport.transform();
        assert!(!viewport.focus_node("Nope"));
        assert_eq!(viewport.transform(), transform);
    }

    #[test]
    fn test_resize_preserves_center() {
        let mut viewport = Viewport::new(400.0, 300.0);
        viewport.set_render(render());
        viewport.focus_node("User");
        let before = viewport.visible_center();

        viewport.resize(1000.0, 700.0);
        let after = viewport.visible_center();
        assert!(approx(before.x, after.x));
        assert!(approx(before.y, after.y));
    }

    #[test]
    fn test_zoom_at_anchor_and_clamp() {
        let mut viewport = Viewport::new(400.0, 300.0);
        viewport.set_render(render());

        let anchor = viewport.transform.to_graph(Point { x: 100.0, y: 50.0 });
        viewport.zoom_at(1.5, 100.0, 50.0);
        let after = viewport.transform.to_graph(Point { x: 100.0, y: 50.0 });
        assert!(approx(anchor.x, after.x));
        assert!(approx(anchor.y, after.y));

        viewport.zoom_at(1000.0, 0.0, 0.0);
        assert_eq!(viewport.transform().zoom, 10.0);
        viewport.zoom_at(0.0, 0.0, 0.0);
        assert_eq!(viewport.transform().zoom, 10.0);
        viewport.zoom_at(1e-9, 0.0, 0.0);
        assert_eq!(viewport.transform().zoom, 0.1);
    }

    #[test]
    fn test_empty_geometry_fit() {
        let schema = normalize(&fixtures::blog(), false, true, false).unwrap();
        let graph = Arc::new(TypeGraph::build(&schema, None, false, true).unwrap());
        let render = RenderResult::new(Generation(1), String::new(), SvgGeometry::default(), graph);

        let mut viewport = Viewport::new(400.0, 300.0);
        viewport.set_render(Arc::new(render));
        assert_eq!(viewport.transform().zoom, 1.0);
    }
}
