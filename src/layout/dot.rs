//! Graphviz DOT serialization of a [`TypeGraph`].
//!
//! Every type becomes an HTML-table node whose rows carry a `PORT` named after
//! the field, so field edges leave from the row that declares them. Node and edge
//! `id` attributes are the graph ids, which Graphviz copies onto the SVG groups.

use crate::graph::{EdgeKind, FieldRow, RowKind, TypeEdge, TypeGraph, TypeNode};
use crate::model::KindTag;
const HEADER_COLOR: &str = "#e0e7ef";
const MUTED_COLOR: &str = "#6b7280";

pub fn to_dot(graph: &TypeGraph) -> String {
    let mut out = String::new();
    out.push_str("digraph {\n");
    out.push_str("  graph [rankdir=LR, ranksep=2.0, nodesep=0.4, bgcolor=\"transparent\"];\n");
    out.push_str("  node [fontsize=14, fontname=\"Helvetica\", shape=plaintext];\n");
    out.push_str("  edge [fontname=\"Helvetica\", arrowsize=0.7];\n");

    for node in graph.nodes() {
        out.push_str(&node_line(node));
    }

    for edge in graph.edges() {
        out.push_str(&edge_line(edge));
    }

    out.push_str("}\n");
    out
}

fn node_line(node: &TypeNode) -> String {
    let id = quote(&node.id);
    format!("  {} [id={}, label=<{}>];\n", id, id, node_table(node))
}

fn node_table(node: &TypeNode) -> String {
    let mut table = String::from(
        "<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\" CELLPADDING=\"5\">",
    );

    let kind = match node.kind {
        KindTag::Object => String::new(),
        other => format!("<FONT POINT-SIZE=\"10\">{}</FONT> ", other),
    };
    table.push_str(&format!(
        "<TR><TD BGCOLOR=\"{}\">{}<B>{}</B></TD></TR>",
        HEADER_COLOR,
        kind,
        escape_html(&node.id)
    ));

    for row in &node.rows {
        table.push_str(&row_cell(row));
    }

    table.push_str("</TABLE>");
    table
}

fn row_cell(row: &FieldRow) -> String {
    let name = escape_html(&row.name);
    let name = if row.deprecated {
        format!("<S>{}</S>", name)
    } else {
        name
    };

    let detail = match row.kind {
        RowKind::Field => {
            let args = if row.arg_count > 0 { "(…)" } else { "" };
            format!(
                "{} <FONT COLOR=\"{}\">{}</FONT>",
                args,
                MUTED_COLOR,
                escape_html(&row.type_label)
            )
        }
        RowKind::PossibleType => String::new(),
    };

    format!(
        "<TR><TD ALIGN=\"LEFT\" PORT={}>{}{}</TD></TR>",
        quote(&row.name),
        name,
        detail
    )
}

fn edge_line(edge: &TypeEdge) -> String {
    let source = quote(&edge.source);
    let target = quote(&edge.target);
    let id = quote(&edge.id);

    match (edge.kind, edge.label.as_deref()) {
        (EdgeKind::Field, Some(field)) => {
            format!("  {}:{} -> {} [id={}];\n", source, quote(field), target, id)
        }
        (EdgeKind::PossibleType, _) => format!(
            "  {}:{} -> {} [id={}, style=dashed];\n",
            source, target, target, id
        ),
        _ => format!(
            "  {} -> {} [id={}, style=dotted, arrowhead=empty];\n",
            source, target, id
        ),
    }
}

/// DOT double-quoted string.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspection::{fixtures, normalize};

    #[test]
    fn test_field_edges_use_ports() {
        let schema = normalize(&fixtures::blog(), false, true, false).unwrap();
        let graph = TypeGraph::build(&schema, None, false, true).unwrap();
        let dot = to_dot(&graph);

        assert!(dot.starts_with("digraph {"));
        assert!(dot.contains("rankdir=LR"));
        assert!(dot.contains(
            "\"User\":\"posts\" -> \"Post\" [id=\"FIELD_EDGE::User::posts::Post\"];"
        ));
        assert!(dot.contains("\"User\" [id=\"User\", label=<"));
        assert!(dot.contains("PORT=\"posts\"><S>posts</S>"));
        assert!(dot.contains("[Post!]!"));
    }

    #[test]
    fn test_union_and_interface_edges() {
        let schema = normalize(&fixtures::search(), false, true, true).unwrap();
        let graph = TypeGraph::build(&schema, None, false, true).unwrap();
        let dot = to_dot(&graph);

        assert!(dot.contains(concat!(
            "\"SearchResult\":\"User\" -> \"User\" ",
            "[id=\"POSSIBLE_TYPE_EDGE::SearchResult::User\", style=dashed];"
        )));
        assert!(dot.contains("\"Entity\" -> \"Team\" [id=\"DERIVED_TYPE_EDGE::Entity::Team\""));
        assert!(dot.contains("<FONT POINT-SIZE=\"10\">union</FONT> <B>SearchResult</B>"));
    }

    #[test]
    fn test_one_statement_per_line() {
        let schema = normalize(&fixtures::search(), false, true, true).unwrap();
        let graph = TypeGraph::build(&schema, None, false, true).unwrap();
        let dot = to_dot(&graph);

        let statements: Vec<_> = dot.lines().filter(|l| l.contains(" [id=")).collect();
        assert_eq!(statements.len(), graph.node_count() + graph.edge_count());
        assert!(statements.iter().all(|l| l.ends_with("];")));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_escaping() {
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
        assert_eq!(escape_html("[A<B>]&"), "[A&lt;B&gt;]&amp;");
    }
}
