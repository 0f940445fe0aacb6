use crate::graph::{TypeGraph, extract_type_id};
use serde::Serialize;

/// Currently selected type and edge. Ids are strings from the stable id scheme, so a
/// selection outlives the graph it was made on until revalidated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub selected_type_id: Option<String>,
    pub selected_edge_id: Option<String>,
}

impl Selection {
    /// Select a type (or clear with `None`). Any edge selection is dropped.
    /// Returns whether anything changed.
    pub fn select_node(&mut self, type_id: Option<&str>) -> bool {
        if self.selected_type_id.as_deref() == type_id {
            return false;
        }
        self.selected_type_id = type_id.map(str::to_string);
        self.selected_edge_id = None;
        true
    }

    /// Clicking the selected edge again deselects it; clicking another edge selects it
    /// together with its source type.
    pub fn select_edge(&mut self, edge_id: Option<&str>) -> bool {
        match edge_id {
            None => {
                let changed = self.selected_edge_id.is_some();
                self.selected_edge_id = None;
                changed
            }
            Some(id) if self.selected_edge_id.as_deref() == Some(id) => {
                self.selected_edge_id = None;
                true
            }
            Some(id) => {
                self.selected_type_id = extract_type_id(id).map(str::to_string);
                self.selected_edge_id = Some(id.to_string());
                true
            }
        }
    }

    /// Drop ids that no longer exist in `graph`. Returns whether anything was cleared.
    pub fn revalidate(&mut self, graph: &TypeGraph) -> bool {
        let mut changed = false;
        if let Some(id) = &self.selected_type_id {
            if !graph.contains_node(id) {
                self.selected_type_id = None;
                changed = true;
            }
        }
        if let Some(id) = &self.selected_edge_id {
            if !graph.contains_edge(id) {
                self.selected_edge_id = None;
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_node_clears_edge() {
        let mut selection = Selection {
            selected_type_id: Some("User".to_string()),
            selected_edge_id: Some("FIELD_EDGE::User::posts::Post".to_string()),
        };

        assert!(selection.select_node(Some("Post")));
        assert_eq!(selection.selected_type_id.as_deref(), Some("Post"));
        assert!(selection.selected_edge_id.is_none());

        assert!(!selection.select_node(Some("Post")));
    }

    #[test]
    fn test_select_edge_toggles() {
        let mut selection = Selection::default();
        let edge = "FIELD_EDGE::User::posts::Post";

        assert!(selection.select_edge(Some(edge)));
        assert_eq!(selection.selected_type_id.as_deref(), Some("User"));
        assert_eq!(selection.selected_edge_id.as_deref(), Some(edge));

        // second click on the same edge deselects only the edge
        assert!(selection.select_edge(Some(edge)));
        assert!(selection.selected_edge_id.is_none());
        assert_eq!(selection.selected_type_id.as_deref(), Some("User"));
    }

    #[test]
    fn test_select_other_edge_moves_type() {
        let mut selection = Selection::default();
        selection.select_edge(Some("FIELD_EDGE::User::posts::Post"));
        selection.select_edge(Some("POSSIBLE_TYPE_EDGE::SearchResult::User"));

        assert_eq!(selection.selected_type_id.as_deref(), Some("SearchResult"));
        assert_eq!(
            selection.selected_edge_id.as_deref(),
            Some("POSSIBLE_TYPE_EDGE::SearchResult::User")
        );
    }
}
