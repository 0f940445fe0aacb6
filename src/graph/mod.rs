mod builder;
mod data;
mod ids;

pub use builder::{FieldRow, RowKind, TypeEdge, TypeGraph, TypeNode};
pub use data::{GraphData, GraphLink, GraphMetadata, GraphNode};
pub use ids::{
    EdgeKind, derived_type_edge_id, edge_kind, extract_type_id, field_edge_id,
    possible_type_edge_id,
};
