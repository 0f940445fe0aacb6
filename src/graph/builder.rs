use super::ids::{self, EdgeKind};
use crate::error::RootNotFoundError;
use crate::model::{DisplayOptions, KindTag, Schema, SchemaType, TypeKind};
use petgraph::Direction;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// One diagram box.
#[derive(Debug, Clone, Serialize)]
pub struct TypeNode {
    pub id: String,
    pub kind: KindTag,
    pub description: Option<String>,
    pub rows: Vec<FieldRow>,
}

impl TypeNode {
    pub fn name(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Field,
    PossibleType,
}

/// One line in a node's table: a field, or a member of a union.
#[derive(Debug, Clone, Serialize)]
pub struct FieldRow {
    pub kind: RowKind,
    pub name: String,
    /// SDL type string, e.g. `[Post!]!`.
    pub type_label: String,
    pub target: String,
    pub is_leaf: bool,
    pub deprecated: bool,
    pub relay_type: Option<String>,
    pub arg_count: usize,
    /// Edge drawn from this row, when its target is a node of the graph.
    pub edge_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeEdge {
    pub id: String,
    pub kind: EdgeKind,
    pub source: String,
    pub target: String,
    /// Field name for field edges, member name for possible-type edges.
    pub label: Option<String>,
}

/// Reachable types of a schema from one root, under one set of display options.
///
/// Immutable once built; option changes produce a new graph.
#[derive(Debug, Clone)]
pub struct TypeGraph {
    root_id: String,
    root_hidden: bool,
    graph: DiGraph<TypeNode, TypeEdge>,
    node_indices: HashMap<String, NodeIndex>,
    edge_indices: HashMap<String, EdgeIndex>,
}

impl TypeGraph {
    /// Breadth-first reachability from `root_type` (or the query type).
    pub fn build(
        schema: &Schema,
        root_type: Option<&str>,
        hide_root: bool,
        show_leaf_fields: bool,
    ) -> Result<Self, RootNotFoundError> {
        let root = resolve_root(schema, root_type)?;

        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&SchemaType> = VecDeque::new();
        let mut order: Vec<&SchemaType> = Vec::new();

        visited.insert(root.name.as_str());
        queue.push_back(root);

        while let Some(ty) = queue.pop_front() {
            order.push(ty);
            for target in traversal_targets(schema, ty) {
                if visited.insert(target.name.as_str()) {
                    queue.push_back(target);
                }
            }
        }

        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        for ty in &order {
            if hide_root && ty.name == root.name {
                continue;
            }
            let node = TypeNode {
                id: ty.name.clone(),
                kind: ty.kind.tag(),
                description: ty.description.clone(),
                rows: build_rows(schema, ty, show_leaf_fields),
            };
            let idx = graph.add_node(node);
            node_indices.insert(ty.name.clone(), idx);
        }

        let mut edge_indices = HashMap::new();
        for ty in &order {
            let Some(&source_idx) = node_indices.get(&ty.name) else {
                continue;
            };
            for (kind, label, target) in relations(schema, ty) {
                let Some(&target_idx) = node_indices.get(target) else {
                    continue;
                };
                let id = ids::edge_id(kind, &ty.name, label, target);
                if edge_indices.contains_key(&id) {
                    continue;
                }
                let edge = TypeEdge {
                    id: id.clone(),
                    kind,
                    source: ty.name.clone(),
                    target: target.to_string(),
                    label: label.map(str::to_string),
                };
                let edge_idx = graph.add_edge(source_idx, target_idx, edge);
                edge_indices.insert(id, edge_idx);
            }
        }

        // Rows learn their edge ids once edges exist.
        for idx in graph.node_indices().collect::<Vec<_>>() {
            let source = graph[idx].id.clone();
            for row in graph[idx].rows.iter_mut() {
                let id = match row.kind {
                    RowKind::Field => ids::field_edge_id(&source, &row.name, &row.target),
                    RowKind::PossibleType => ids::possible_type_edge_id(&source, &row.target),
                };
                if edge_indices.contains_key(&id) {
                    row.edge_id = Some(id);
                }
            }
        }

        Ok(Self {
            root_id: root.name.clone(),
            root_hidden: hide_root,
            graph,
            node_indices,
            edge_indices,
        })
    }

    /// [`TypeGraph::build`] driven by [`DisplayOptions`].
    pub fn build_with(
        schema: &Schema,
        options: &DisplayOptions,
    ) -> Result<Self, RootNotFoundError> {
        Self::build(
            schema,
            options.root_type.as_deref(),
            options.hide_root,
            options.show_leaf_fields,
        )
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn is_root_hidden(&self) -> bool {
        self.root_hidden
    }

    pub fn graph(&self) -> &DiGraph<TypeNode, TypeEdge> {
        &self.graph
    }

    /// Nodes in breadth-first discovery order.
    pub fn nodes(&self) -> impl Iterator<Item = &TypeNode> {
        self.graph.node_weights()
    }

    pub fn edges(&self) -> impl Iterator<Item = &TypeEdge> {
        self.graph.edge_weights()
    }

    pub fn node(&self, id: &str) -> Option<&TypeNode> {
        self.node_indices.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn edge(&self, id: &str) -> Option<&TypeEdge> {
        self.edge_indices.get(id).map(|&idx| &self.graph[idx])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_indices.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_ids(&self) -> HashSet<String> {
        self.node_indices.keys().cloned().collect()
    }

    pub fn edge_ids(&self) -> HashSet<String> {
        self.edge_indices.keys().cloned().collect()
    }

    pub fn outgoing(&self, id: &str) -> Vec<&TypeEdge> {
        self.edges_directed(id, Direction::Outgoing)
    }

    pub fn incoming(&self, id: &str) -> Vec<&TypeEdge> {
        self.edges_directed(id, Direction::Incoming)
    }

    fn edges_directed(&self, id: &str, direction: Direction) -> Vec<&TypeEdge> {
        match self.node_indices.get(id) {
            Some(&idx) => self
                .graph
                .edges_directed(idx, direction)
                .map(|e| e.weight())
                .collect(),
            None => Vec::new(),
        }
    }
}

fn resolve_root<'a>(
    schema: &'a Schema,
    root_type: Option<&str>,
) -> Result<&'a SchemaType, RootNotFoundError> {
    if let Some(name) = root_type {
        if let Some(ty) = schema.get(name) {
            return Ok(ty);
        }
    }
    match schema.query_type.as_deref() {
        Some(query) => schema
            .get(query)
            .ok_or_else(|| RootNotFoundError::Unknown(query.to_string())),
        None => Err(match root_type {
            Some(name) => RootNotFoundError::Unknown(name.to_string()),
            None => RootNotFoundError::NoQueryType,
        }),
    }
}

/// Object, interface and union types that are neither built in nor Relay wrappers.
fn is_node(ty: &SchemaType) -> bool {
    let drawable = match ty.kind {
        TypeKind::Object { .. } | TypeKind::Interface { .. } | TypeKind::Union { .. } => true,
        TypeKind::Enum { .. } | TypeKind::Scalar | TypeKind::InputObject { .. } => false,
    };
    drawable && !ty.built_in && !ty.relay_wrapper
}

/// Outgoing relations of a type as `(kind, label, target)`, restricted to node targets.
fn relations<'a>(
    schema: &'a Schema,
    ty: &'a SchemaType,
) -> Vec<(EdgeKind, Option<&'a str>, &'a str)> {
    let fields = ty
        .fields()
        .iter()
        .filter(|f| !f.excluded)
        .map(|f| (EdgeKind::Field, Some(f.name.as_str()), f.type_ref.name.as_str()));

    let mut out: Vec<_> = match &ty.kind {
        TypeKind::Object { .. } => fields.collect(),
        TypeKind::Interface {
            implementations, ..
        } => fields
            .chain(
                implementations
                    .iter()
                    .map(|name| (EdgeKind::DerivedType, None, name.as_str())),
            )
            .collect(),
        TypeKind::Union { members } => members
            .iter()
            .map(|name| (EdgeKind::PossibleType, None, name.as_str()))
            .collect(),
        TypeKind::Enum { .. } | TypeKind::Scalar | TypeKind::InputObject { .. } => Vec::new(),
    };

    out.retain(|(_, _, target)| schema.get(target).is_some_and(is_node));
    out
}

fn traversal_targets<'a>(schema: &'a Schema, ty: &'a SchemaType) -> Vec<&'a SchemaType> {
    relations(schema, ty)
        .into_iter()
        .filter_map(|(_, _, target)| schema.get(target))
        .collect()
}

fn build_rows(schema: &Schema, ty: &SchemaType, show_leaf_fields: bool) -> Vec<FieldRow> {
    if let TypeKind::Union { members } = &ty.kind {
        return members
            .iter()
            .map(|member| FieldRow {
                kind: RowKind::PossibleType,
                name: member.clone(),
                type_label: member.clone(),
                target: member.clone(),
                is_leaf: false,
                deprecated: false,
                relay_type: None,
                arg_count: 0,
                edge_id: None,
            })
            .collect();
    }

    ty.fields()
        .iter()
        .filter(|f| !f.excluded)
        .filter_map(|f| {
            let is_leaf = schema.get(&f.type_ref.name).is_some_and(SchemaType::is_leaf);
            if is_leaf && !show_leaf_fields {
                return None;
            }
            Some(FieldRow {
                kind: RowKind::Field,
                name: f.name.clone(),
                type_label: f.type_ref.to_string(),
                target: f.type_ref.name.clone(),
                is_leaf,
                deprecated: f.is_deprecated(),
                relay_type: f.relay_type.clone(),
                arg_count: f.args.len(),
                edge_id: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::{fixtures, normalize};
    use petgraph::visit::Bfs;

    fn blog_graph(skip_deprecated: bool) -> TypeGraph {
        let schema = normalize(&fixtures::blog(), false, true, skip_deprecated).unwrap();
        TypeGraph::build(&schema, None, false, true).unwrap()
    }

    #[test]
    fn test_scenario_skip_deprecated() {
        let graph = blog_graph(true);

        let ids = graph.node_ids();
        assert_eq!(ids, HashSet::from(["Query".to_string(), "User".to_string()]));
        assert!(!graph.contains_edge("FIELD_EDGE::User::posts::Post"));
        assert!(graph.node("User").unwrap().rows.iter().all(|r| r.name != "posts"));
    }

    #[test]
    fn test_scenario_keep_deprecated() {
        let graph = blog_graph(false);

        assert_eq!(graph.node_count(), 3);
        assert!(graph.contains_node("Post"));

        let from_user = graph.outgoing("User");
        assert_eq!(from_user.len(), 1);
        assert_eq!(from_user[0].target, "Post");
        assert_eq!(from_user[0].label.as_deref(), Some("posts"));

        let row = graph.node("User").unwrap().rows.iter().find(|r| r.name == "posts").unwrap();
        assert!(row.deprecated);
        assert_eq!(row.edge_id.as_deref(), Some("FIELD_EDGE::User::posts::Post"));
    }

    #[test]
    fn test_leaf_types_are_rows_not_nodes() {
        let graph = blog_graph(true);
        assert!(!graph.contains_node("ID"));
        assert!(!graph.contains_node("String"));

        let user = graph.node("User").unwrap();
        let rows: Vec<_> = user.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(rows, vec!["name", "id"]);
    }

    #[test]
    fn test_hide_leaf_fields() {
        let schema = normalize(&fixtures::blog(), false, true, false).unwrap();
        let graph = TypeGraph::build(&schema, None, false, false).unwrap();

        // Post only has leaf fields but is still reachable
        assert!(graph.contains_node("Post"));
        assert!(graph.node("Post").unwrap().rows.is_empty());
        let user = graph.node("User").unwrap();
        let rows: Vec<_> = user.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(rows, vec!["posts"]);
    }

    #[test]
    fn test_root_resolution() {
        let schema = normalize(&fixtures::blog(), false, true, false).unwrap();

        let graph = TypeGraph::build(&schema, Some("User"), false, true).unwrap();
        assert_eq!(graph.root_id(), "User");
        assert!(!graph.contains_node("Query"));

        // unknown explicit root falls back to the query type
        let graph = TypeGraph::build(&schema, Some("Nope"), false, true).unwrap();
        assert_eq!(graph.root_id(), "Query");
    }

    #[test]
    fn test_root_not_found() {
        let raw = serde_json::json!({"__schema": {
            "types": [fixtures::object("Thing", vec![])]
        }});
        let schema = normalize(&raw, false, true, true).unwrap();

        assert_eq!(
            TypeGraph::build(&schema, None, false, true).unwrap_err(),
            RootNotFoundError::NoQueryType
        );
        assert_eq!(
            TypeGraph::build(&schema, Some("Missing"), false, true).unwrap_err(),
            RootNotFoundError::Unknown("Missing".to_string())
        );
        assert!(TypeGraph::build(&schema, Some("Thing"), false, true).is_ok());
    }

    #[test]
    fn test_hide_root_traverses_through() {
        let schema = normalize(&fixtures::blog(), false, true, false).unwrap();
        let graph = TypeGraph::build(&schema, None, true, true).unwrap();

        assert!(!graph.contains_node("Query"));
        assert!(graph.contains_node("User"));
        assert!(graph.contains_node("Post"));
        assert!(graph.edges().all(|e| e.source != "Query" && e.target != "Query"));
        assert!(graph.is_root_hidden());
    }

    #[test]
    fn test_cycles_visit_once() {
        let schema = normalize(&fixtures::search(), false, true, true).unwrap();
        let graph = TypeGraph::build(&schema, None, false, true).unwrap();

        // User.team -> Team.members -> User
        assert!(graph.contains_edge("FIELD_EDGE::User::team::Team"));
        assert!(graph.contains_edge("FIELD_EDGE::Team::members::User"));
        assert_eq!(graph.nodes().filter(|n| n.id == "User").count(), 1);
    }

    #[test]
    fn test_union_and_interface_edges() {
        let schema = normalize(&fixtures::search(), false, true, true).unwrap();
        let graph = TypeGraph::build(&schema, None, false, true).unwrap();

        assert!(graph.contains_edge("POSSIBLE_TYPE_EDGE::SearchResult::User"));
        assert!(graph.contains_edge("POSSIBLE_TYPE_EDGE::SearchResult::Team"));
        assert!(graph.contains_edge("DERIVED_TYPE_EDGE::Entity::User"));
        assert!(graph.contains_edge("DERIVED_TYPE_EDGE::Entity::Team"));

        let union = graph.node("SearchResult").unwrap();
        let union_rows: Vec<_> = union.rows.iter().map(|r| r.kind).collect();
        assert_eq!(union_rows, vec![RowKind::PossibleType, RowKind::PossibleType]);

        // input objects and enums are never nodes
        assert!(!graph.contains_node("SearchFilter"));
        assert!(!graph.contains_node("Status"));
        // Mutation is not reachable from Query
        assert!(!graph.contains_node("Mutation"));
    }

    #[test]
    fn test_every_node_reachable_from_root() {
        let schema = normalize(&fixtures::relay(), false, false, false).unwrap();
        let graph = TypeGraph::build(&schema, None, false, true).unwrap();
        let root = graph.node_indices[graph.root_id()];

        let mut reached = HashSet::new();
        let mut bfs = Bfs::new(graph.graph(), root);
        while let Some(idx) = bfs.next(graph.graph()) {
            reached.insert(graph.graph()[idx].id.clone());
        }
        assert_eq!(reached, graph.node_ids());
    }

    #[test]
    fn test_relay_collapse_edges() {
        let schema = normalize(&fixtures::relay(), false, true, true).unwrap();
        let graph = TypeGraph::build(&schema, None, false, true).unwrap();

        assert!(graph.contains_edge("FIELD_EDGE::User::repositories::Repository"));
        for wrapper in ["RepositoryConnection", "RepositoryEdge", "PageInfo", "Node"] {
            assert!(!graph.contains_node(wrapper), "{} should be collapsed", wrapper);
        }
        assert!(graph.contains_node("FollowerConnection"));

        let raw = normalize(&fixtures::relay(), false, false, true).unwrap();
        let graph = TypeGraph::build(&raw, None, false, true).unwrap();
        assert!(graph.contains_node("RepositoryConnection"));
        assert!(graph.contains_node("RepositoryEdge"));
        assert!(graph.contains_node("Node"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let schema = normalize(&fixtures::search(), true, true, true).unwrap();
        let a = TypeGraph::build(&schema, None, false, true).unwrap();
        let b = TypeGraph::build(&schema, None, false, true).unwrap();

        assert_eq!(a.node_ids(), b.node_ids());
        assert_eq!(a.edge_ids(), b.edge_ids());
    }
}
