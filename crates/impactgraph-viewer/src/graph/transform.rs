use impactgraph_core::{ApiEdge, ApiNode};

use crate::graph::model::{GraphEdge, GraphNode, NodeKind, Position, RiskLevel};

// Structural mapping only: edge endpoints are not checked against the node set.
pub fn node_from_api(n: ApiNode) -> GraphNode {
    GraphNode {
        kind: NodeKind::coerce(n.kind.as_deref()),
        risk: RiskLevel::coerce(n.risk.as_deref()),
        api_name: n.id.clone(),
        id: n.id,
        label: n.label,
        created_at: n.created_at,
        position: Position::default(),
    }
}

/// Edge ids are positional (`e-{index}`), so they are not stable across refetches.
/// A decoded edge keeps the slot it had in the response, even when earlier
/// records were dropped.
pub fn edge_from_api(index: usize, e: ApiEdge) -> GraphEdge {
    let index = e.index.unwrap_or(index);
    GraphEdge {
        id: format!("e-{index}"),
        source: e.source,
        target: e.target,
        relation_type: e.relation_type,
    }
}

pub fn transform(nodes: Vec<ApiNode>, edges: Vec<ApiEdge>) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let nodes = nodes.into_iter().map(node_from_api).collect();
    let edges = edges
        .into_iter()
        .enumerate()
        .map(|(i, e)| edge_from_api(i, e))
        .collect();
    (nodes, edges)
}
