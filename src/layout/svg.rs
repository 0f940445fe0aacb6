//! Geometry extraction from Graphviz SVG output.

use super::LayoutError;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

static VIEW_BOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"viewBox="(-?[\d.]+)[ ,]+(-?[\d.]+)[ ,]+(-?[\d.]+)[ ,]+(-?[\d.]+)""#).unwrap()
});
static GRAPH_TRANSFORM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class="graph"[^>]*transform="([^"]*)""#).unwrap());
static TRANSLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"translate\((-?[\d.]+)[ ,]+(-?[\d.]+)\)").unwrap());
static GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<g id="([^"]+)" class="(node|edge)">"#).unwrap());
static POINTS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"points="([^"]+)""#).unwrap());
static PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"<path[^>]* d="([^"]+)""#).unwrap());
static PAIR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(-?[\d.]+),(-?[\d.]+)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(BoundingBox {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgePath {
    /// Control points of the spline, arrowhead excluded.
    pub points: Vec<Point>,
    pub bounds: BoundingBox,
}

/// Positions in the coordinate space of the SVG viewBox.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SvgGeometry {
    pub width: f64,
    pub height: f64,
    pub nodes: HashMap<String, BoundingBox>,
    pub edges: HashMap<String, EdgePath>,
}

pub(crate) fn parse_svg(svg: &str) -> Result<SvgGeometry, LayoutError> {
    let view_box = VIEW_BOX
        .captures(svg)
        .ok_or_else(|| LayoutError::MalformedOutput("missing svg viewBox".to_string()))?;
    let width = number(&view_box[3])?;
    let height = number(&view_box[4])?;

    let (dx, dy) = match GRAPH_TRANSFORM
        .captures(svg)
        .and_then(|t| TRANSLATE.captures(t.get(1)?.as_str()))
    {
        Some(t) => (number(&t[1])?, number(&t[2])?),
        None => (0.0, 0.0),
    };

    let groups: Vec<_> = GROUP.captures_iter(svg).collect();
    let mut geometry = SvgGeometry {
        width,
        height,
        ..Default::default()
    };

    for (i, group) in groups.iter().enumerate() {
        let whole = group.get(0).map_or(0..0, |m| m.range());
        let body_end = groups
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(svg.len(), |m| m.start());
        let body = &svg[whole.end..body_end];
        let id = unescape_xml(&group[1]);

        match &group[2] {
            "node" => {
                let sources = POINTS.captures_iter(body).map(|c| c[1].to_string());
                let points = collect_points(sources, dx, dy)?;
                if let Some(bounds) = BoundingBox::enclosing(&points) {
                    geometry.nodes.insert(id, bounds);
                }
            }
            _ => {
                let Some(d) = PATH.captures(body).map(|c| c[1].to_string()) else {
                    continue;
                };
                let points = collect_points(std::iter::once(d), dx, dy)?;
                if let Some(bounds) = BoundingBox::enclosing(&points) {
                    geometry.edges.insert(id, EdgePath { points, bounds });
                }
            }
        }
    }

    Ok(geometry)
}

fn collect_points(
    sources: impl Iterator<Item = String>,
    dx: f64,
    dy: f64,
) -> Result<Vec<Point>, LayoutError> {
    let mut points = Vec::new();
    for source in sources {
        for pair in PAIR.captures_iter(&source) {
            points.push(Point {
                x: number(&pair[1])? + dx,
                y: number(&pair[2])? + dy,
            });
        }
    }
    Ok(points)
}

fn number(s: &str) -> Result<f64, LayoutError> {
    s.parse()
        .map_err(|_| LayoutError::MalformedOutput(format!("not a number: {}", s)))
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#45;", "-")
        .replace("&amp;", "&")
}
