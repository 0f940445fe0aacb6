use super::builder::{FieldRow, TypeGraph};
use super::ids::EdgeKind;
use crate::model::{KindTag, Selection};
use serde::Serialize;

/// Serializable view of a [`TypeGraph`] for the JSON output and the HTTP API.
#[derive(Debug, Clone, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub metadata: GraphMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub kind: KindTag,
    pub description: Option<String>,
    pub fields: Vec<FieldRow>,
    pub fan_in: usize,
    pub fan_out: usize,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphLink {
    pub id: String,
    pub kind: EdgeKind,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphMetadata {
    pub root: String,
    pub root_hidden: bool,
    pub total_types: usize,
    pub total_edges: usize,
}

impl GraphData {
    pub fn from_type_graph(graph: &TypeGraph, selection: &Selection) -> Self {
        let selected_type = selection.selected_type_id.as_deref();
        let selected_edge = selection.selected_edge_id.as_deref();

        let nodes = graph
            .nodes()
            .map(|node| GraphNode {
                id: node.id.clone(),
                kind: node.kind,
                description: node.description.clone(),
                fields: node.rows.clone(),
                fan_in: graph.incoming(&node.id).len(),
                fan_out: graph.outgoing(&node.id).len(),
                selected: selected_type == Some(node.id.as_str()),
            })
            .collect();

        let links = graph
            .edges()
            .map(|edge| GraphLink {
                id: edge.id.clone(),
                kind: edge.kind,
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: edge.label.clone(),
                selected: selected_edge == Some(edge.id.as_str()),
            })
            .collect();

        let metadata = GraphMetadata {
            root: graph.root_id().to_string(),
            root_hidden: graph.is_root_hidden(),
            total_types: graph.node_count(),
            total_edges: graph.edge_count(),
        };

        GraphData {
            nodes,
            links,
            metadata,
        }
    }
}
