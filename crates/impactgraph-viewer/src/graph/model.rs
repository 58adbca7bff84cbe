use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NodeKind {
    Field,
    Apex,
    #[default]
    Flow,
}

impl NodeKind {
    /// Exact match on the backend's spelling; anything else is a `Flow`.
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw {
            Some("Field") => Self::Field,
            Some("Apex") => Self::Apex,
            _ => Self::Flow,
        }
    }

    pub fn minimap_color(self) -> &'static str {
        match self {
            Self::Field => "#3b82f6",
            Self::Apex => "#10b981",
            Self::Flow => "#a855f7",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum RiskLevel {
    Critical,
    #[default]
    Safe,
}

impl RiskLevel {
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw {
            Some("Critical") => Self::Critical,
            _ => Self::Safe,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineStatus {
    New,
    #[default]
    Unchanged,
    // needs server-side soft deletes; nothing produces it yet
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub risk: RiskLevel,
    pub api_name: String,
    pub created_at: Option<String>,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation_type: Option<String>,
}

/// The `(nodes, edges)` pair currently held by the viewer. Replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphModel {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    /// "12 nodes · 30 connections", or empty when there is nothing loaded.
    pub fn summary(&self) -> String {
        if self.nodes.is_empty() {
            return String::new();
        }
        format!(
            "{} nodes · {} connections",
            self.nodes.len(),
            self.edges.len()
        )
    }
}

/// A node as the renderer should draw it this frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    #[serde(flatten)]
    pub node: GraphNode,
    pub is_highlighted: bool,
    pub is_dimmed: bool,
    pub timeline_status: TimelineStatus,
    pub minimap_color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeView {
    #[serde(flatten)]
    pub edge: GraphEdge,
    pub is_highlighted: bool,
    pub is_dimmed: bool,
}

impl EdgeView {
    /// Relation labels are hidden on dimmed edges.
    pub fn visible_label(&self) -> Option<&str> {
        if self.is_dimmed {
            None
        } else {
            self.edge.relation_type.as_deref()
        }
    }
}
