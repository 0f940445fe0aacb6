//! Stable node and edge identities.
//!
//! Node ids are type names. Edge ids are built from the edge kind, source, field
//! (for field edges) and target, so rebuilding the graph under different display
//! options yields the same id for the same relation.

use serde::Serialize;

const FIELD_EDGE: &str = "FIELD_EDGE";
const POSSIBLE_TYPE_EDGE: &str = "POSSIBLE_TYPE_EDGE";
const DERIVED_TYPE_EDGE: &str = "DERIVED_TYPE_EDGE";
const SEPARATOR: &str = "::";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Object/interface field pointing at another node.
    Field,
    /// Union to one of its members.
    PossibleType,
    /// Interface to a type implementing it.
    DerivedType,
}

impl EdgeKind {
    fn prefix(self) -> &'static str {
        match self {
            EdgeKind::Field => FIELD_EDGE,
            EdgeKind::PossibleType => POSSIBLE_TYPE_EDGE,
            EdgeKind::DerivedType => DERIVED_TYPE_EDGE,
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            FIELD_EDGE => Some(EdgeKind::Field),
            POSSIBLE_TYPE_EDGE => Some(EdgeKind::PossibleType),
            DERIVED_TYPE_EDGE => Some(EdgeKind::DerivedType),
            _ => None,
        }
    }
}

pub fn field_edge_id(source: &str, field: &str, target: &str) -> String {
    [FIELD_EDGE, source, field, target].join(SEPARATOR)
}

pub fn possible_type_edge_id(union: &str, member: &str) -> String {
    [POSSIBLE_TYPE_EDGE, union, member].join(SEPARATOR)
}

pub fn derived_type_edge_id(interface: &str, implementation: &str) -> String {
    [DERIVED_TYPE_EDGE, interface, implementation].join(SEPARATOR)
}

/// Kind of an edge id, if it is one.
pub fn edge_kind(edge_id: &str) -> Option<EdgeKind> {
    edge_id
        .split(SEPARATOR)
        .next()
        .and_then(EdgeKind::from_prefix)
}

/// Source type id of an edge id.
pub fn extract_type_id(edge_id: &str) -> Option<&str> {
    let mut parts = edge_id.split(SEPARATOR);
    let kind = parts.next().and_then(EdgeKind::from_prefix)?;
    let source = parts.next().filter(|s| !s.is_empty())?;
    let expected_rest = match kind {
        EdgeKind::Field => 2,
        EdgeKind::PossibleType | EdgeKind::DerivedType => 1,
    };
    (parts.count() == expected_rest).then_some(source)
}

pub(crate) fn edge_id(kind: EdgeKind, source: &str, field: Option<&str>, target: &str) -> String {
    match (kind, field) {
        (EdgeKind::Field, Some(field)) => field_edge_id(source, field, target),
        _ => [kind.prefix(), source, target].join(SEPARATOR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_ids() {
        assert_eq!(
            field_edge_id("User", "posts", "Post"),
            "FIELD_EDGE::User::posts::Post"
        );
        assert_eq!(
            possible_type_edge_id("SearchResult", "Team"),
            "POSSIBLE_TYPE_EDGE::SearchResult::Team"
        );
        assert_eq!(
            edge_id(EdgeKind::DerivedType, "Entity", None, "User"),
            derived_type_edge_id("Entity", "User")
        );
    }

    #[test]
    fn test_extract_type_id() {
        assert_eq!(extract_type_id("FIELD_EDGE::User::posts::Post"), Some("User"));
        assert_eq!(extract_type_id("DERIVED_TYPE_EDGE::Entity::Team"), Some("Entity"));
        assert_eq!(extract_type_id("User"), None);
        assert_eq!(extract_type_id("FIELD_EDGE::User::posts"), None);
        assert_eq!(extract_type_id("EDGE::User::posts::Post"), None);
    }

    #[test]
    fn test_edge_kind() {
        assert_eq!(edge_kind("POSSIBLE_TYPE_EDGE::A::B"), Some(EdgeKind::PossibleType));
        assert_eq!(edge_kind("Query"), None);
    }
}
