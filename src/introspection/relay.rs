//! Relay connection collapsing.
//!
//! A field `repos: RepositoryConnection` where the connection has
//! `edges: [RepositoryEdge]` and the edge has `node: Repository` is rewritten to
//! `repos: [Repository]`. The connection, edge, `Node` and `PageInfo` types are
//! marked as wrappers so the graph builder never turns them into nodes.

use crate::model::{Argument, SchemaType, TypeKind, TypeRef, Wrapper};
use std::collections::{HashMap, HashSet};

const CONNECTION_SUFFIX: &str = "Connection";
const PAGINATION_ARGS: [&str; 4] = ["first", "last", "before", "after"];

struct Rewrite {
    type_index: usize,
    field_index: usize,
    node_type: String,
}

pub(crate) fn collapse(types: &mut [SchemaType], query_type: Option<&str>) {
    let index: HashMap<String, usize> = types
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.clone(), i))
        .collect();

    let mut wrappers: HashSet<String> = HashSet::new();
    let mut edge_nodes: HashMap<String, String> = HashMap::new();
    let mut rewrites = Vec::new();

    for (type_index, ty) in types.iter().enumerate() {
        for (field_index, field) in output_fields(ty).iter().enumerate() {
            if field.excluded {
                continue;
            }
            let connection = &field.type_ref.name;
            let Some((edge_type, node_type)) = match_connection(types, &index, connection) else {
                continue;
            };
            wrappers.insert(connection.clone());
            wrappers.insert(edge_type.clone());
            edge_nodes.insert(edge_type, node_type.clone());
            rewrites.push(Rewrite {
                type_index,
                field_index,
                node_type,
            });
        }
    }

    for rewrite in rewrites {
        let Some(field) = output_fields_mut(&mut types[rewrite.type_index])
            .and_then(|fields| fields.get_mut(rewrite.field_index))
        else {
            continue;
        };
        let connection = std::mem::replace(
            &mut field.type_ref,
            TypeRef {
                name: rewrite.node_type,
                wrappers: vec![Wrapper::List],
            },
        );
        field.relay_type = Some(connection.name);

        let (relay_args, args): (Vec<Argument>, Vec<Argument>) = std::mem::take(&mut field.args)
            .into_iter()
            .partition(|arg| PAGINATION_ARGS.contains(&arg.name.as_str()));
        field.args = args;
        field.relay_args = relay_args;
    }

    // Fields pointing straight at an edge type skip to its node.
    for ty in types.iter_mut() {
        let Some(fields) = output_fields_mut(ty) else {
            continue;
        };
        for field in fields.iter_mut() {
            if let Some(node_type) = edge_nodes.get(&field.type_ref.name) {
                let edge_type = std::mem::replace(&mut field.type_ref.name, node_type.clone());
                field.relay_type = Some(edge_type);
            }
        }
    }

    wrappers.insert("Node".to_string());
    wrappers.insert("PageInfo".to_string());
    for ty in types.iter_mut() {
        if wrappers.contains(&ty.name) {
            ty.relay_wrapper = true;
        }
        if let TypeKind::Object { interfaces, .. } | TypeKind::Interface { interfaces, .. } =
            &mut ty.kind
        {
            interfaces.retain(|name| name != "Node");
        }
    }

    if let Some(query) = query_type {
        hide_query_helpers(types, &index, query);
    }
}

/// `node`/`nodes` lookups and the `relay` self-reference on the query root.
fn hide_query_helpers(types: &mut [SchemaType], index: &HashMap<String, usize>, query: &str) {
    let Some(&query_index) = index.get(query) else {
        return;
    };

    let hidden: Vec<usize> = output_fields(&types[query_index])
        .iter()
        .enumerate()
        .filter(|(_, field)| match field.name.as_str() {
            "node" | "nodes" => index
                .get(&field.type_ref.name)
                .is_some_and(|&i| types[i].relay_wrapper),
            "relay" => field.type_ref.name == query,
            _ => false,
        })
        .map(|(i, _)| i)
        .collect();

    if let Some(fields) = output_fields_mut(&mut types[query_index]) {
        for i in hidden {
            fields[i].excluded = true;
        }
    }
}

/// Returns `(edge type, node type)` when `name` is a connection type.
fn match_connection(
    types: &[SchemaType],
    index: &HashMap<String, usize>,
    name: &str,
) -> Option<(String, String)> {
    if name.len() <= CONNECTION_SUFFIX.len() || !name.ends_with(CONNECTION_SUFFIX) {
        return None;
    }

    let connection = &types[*index.get(name)?];
    if !matches!(connection.kind, TypeKind::Object { .. }) {
        return None;
    }

    let edges = connection.visible_field("edges")?;
    let edge_type = &types[*index.get(&edges.type_ref.name)?];
    if !matches!(edge_type.kind, TypeKind::Object { .. }) {
        return None;
    }

    let node = edge_type.visible_field("node")?;
    Some((edge_type.name.clone(), node.type_ref.name.clone()))
}

fn output_fields(ty: &SchemaType) -> &[crate::model::Field] {
    match &ty.kind {
        TypeKind::Object { fields, .. } | TypeKind::Interface { fields, .. } => fields,
        _ => &[],
    }
}

fn output_fields_mut(ty: &mut SchemaType) -> Option<&mut Vec<crate::model::Field>> {
    match &mut ty.kind {
        TypeKind::Object { fields, .. } | TypeKind::Interface { fields, .. } => Some(fields),
        _ => None,
    }
}
