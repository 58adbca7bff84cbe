use std::collections::HashSet;

use crate::graph::model::GraphEdge;

/// Highlight state derived from the hovered node. Recomputed on every
/// hover change in one pass over the edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Spotlight {
    hovered: Option<String>,
    pub connected_nodes: HashSet<String>,
    pub connected_edges: HashSet<String>,
}

impl Spotlight {
    pub fn compute(hovered: Option<&str>, edges: &[GraphEdge]) -> Self {
        let Some(h) = hovered else {
            return Self::default();
        };
        let mut connected_nodes = HashSet::from([h.to_string()]);
        let mut connected_edges = HashSet::new();
        for e in edges {
            if e.source == h {
                connected_nodes.insert(e.target.clone());
            }
            if e.target == h {
                connected_nodes.insert(e.source.clone());
            }
            if e.source == h || e.target == h {
                connected_edges.insert(e.id.clone());
            }
        }
        Self {
            hovered: Some(h.to_string()),
            connected_nodes,
            connected_edges,
        }
    }

    pub fn is_active(&self) -> bool {
        self.hovered.is_some()
    }

    /// `(is_highlighted, is_dimmed)`; both false when nothing is hovered.
    pub fn node_flags(&self, id: &str) -> (bool, bool) {
        if !self.is_active() {
            return (false, false);
        }
        let hit = self.connected_nodes.contains(id);
        (hit, !hit)
    }

    pub fn edge_flags(&self, id: &str) -> (bool, bool) {
        if !self.is_active() {
            return (false, false);
        }
        let hit = self.connected_edges.contains(id);
        (hit, !hit)
    }
}
