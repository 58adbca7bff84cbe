use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::graph::layout::{Direction, LayoutEngine};
use crate::graph::model::{EdgeView, GraphEdge, GraphModel, GraphNode, NodeView};
use crate::graph::spotlight::Spotlight;
use crate::graph::timeline::{TimelineWindow, MIN_RANGE_DAYS, SLIDER_MAX};

#[derive(Debug, Clone)]
pub struct TimelineState {
    pub slider: u8,
    pub min_range_days: i64,
}

impl Default for TimelineState {
    fn default() -> Self {
        Self {
            slider: SLIDER_MAX,
            min_range_days: MIN_RANGE_DAYS,
        }
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct Decorated {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub timeline_label: String,
    pub summary: String,
}

/// Snapshot plus the hover/slider state that decorates it. Nodes and edges
/// are never mutated by hover or slider changes; those only feed `decorate`.
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    pub model: GraphModel,
    pub timeline: TimelineState,
    pub direction: Direction,
    hovered: Option<String>,
    spotlight: Spotlight,
}

impl GraphState {
    pub fn clear(&mut self) {
        self.model.clear();
        self.hovered = None;
        self.spotlight = Spotlight::default();
    }

    /// Replace the snapshot and run the one-shot layout.
    pub fn load(
        &mut self,
        nodes: Vec<GraphNode>,
        edges: Vec<GraphEdge>,
        engine: &dyn LayoutEngine,
    ) {
        let nodes = engine.layout(nodes, &edges, self.direction);
        self.model = GraphModel { nodes, edges };
        self.hovered = None;
        self.spotlight = Spotlight::default();
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn hover_enter(&mut self, id: &str) {
        if self.hovered.as_deref() == Some(id) {
            return;
        }
        self.hovered = Some(id.to_string());
        self.spotlight = Spotlight::compute(Some(id), &self.model.edges);
    }

    pub fn hover_leave(&mut self) {
        self.hovered = None;
        self.spotlight = Spotlight::default();
    }

    pub fn spotlight(&self) -> &Spotlight {
        &self.spotlight
    }

    pub fn set_slider(&mut self, value: u8) {
        self.timeline.slider = value.min(SLIDER_MAX);
    }

    pub fn timeline_window(&self, now: DateTime<Utc>) -> TimelineWindow {
        TimelineWindow::compute(
            self.model.nodes.iter().map(|n| n.created_at.as_deref()),
            self.timeline.slider,
            now,
            self.timeline.min_range_days,
        )
    }

    pub fn decorate(&self, now: DateTime<Utc>) -> Decorated {
        let window = self.timeline_window(now);
        let nodes = self
            .model
            .nodes
            .iter()
            .map(|n| {
                let (is_highlighted, is_dimmed) = self.spotlight.node_flags(&n.id);
                NodeView {
                    timeline_status: window.status(n.created_at.as_deref()),
                    minimap_color: n.kind.minimap_color(),
                    node: n.clone(),
                    is_highlighted,
                    is_dimmed,
                }
            })
            .collect();
        let edges = self
            .model
            .edges
            .iter()
            .map(|e| {
                let (is_highlighted, is_dimmed) = self.spotlight.edge_flags(&e.id);
                EdgeView {
                    edge: e.clone(),
                    is_highlighted,
                    is_dimmed,
                }
            })
            .collect();
        Decorated {
            nodes,
            edges,
            timeline_label: window.label(),
            summary: self.model.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::layout::LayeredLayout;
    use crate::graph::model::TimelineStatus;
    use crate::graph::transform::transform;
    use chrono::{Duration, TimeZone};
    use impactgraph_core::{ApiEdge, ApiNode};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn loaded() -> GraphState {
        let api_nodes = vec![
            ApiNode {
                id: "Account.Status".into(),
                label: "Status".into(),
                kind: Some("Field".into()),
                risk: Some("Critical".into()),
                created_at: Some((now() - Duration::days(30)).to_rfc3339()),
            },
            ApiNode {
                id: "StatusTrigger".into(),
                label: "StatusTrigger".into(),
                kind: Some("Apex".into()),
                risk: None,
                created_at: Some((now() - Duration::days(1)).to_rfc3339()),
            },
            ApiNode {
                id: "Onboarding".into(),
                label: "Onboarding".into(),
                kind: None,
                risk: None,
                created_at: None,
            },
        ];
        let api_edges = vec![
            ApiEdge {
                source: "StatusTrigger".into(),
                target: "Account.Status".into(),
                relation_type: Some("REFERENCES".into()),
                index: None,
            },
            ApiEdge {
                source: "Onboarding".into(),
                target: "StatusTrigger".into(),
                relation_type: Some("CALLS".into()),
                index: None,
            },
        ];
        let (nodes, edges) = transform(api_nodes, api_edges);
        let mut st = GraphState::default();
        st.load(nodes, edges, &LayeredLayout::default());
        st
    }

    fn view<'a>(d: &'a Decorated, id: &str) -> &'a NodeView {
        d.nodes.iter().find(|n| n.node.id == id).unwrap()
    }

    #[test]
    fn default_view_is_neutral_and_today() {
        let st = loaded();
        let d = st.decorate(now());
        assert_eq!(d.timeline_label, "Today");
        assert_eq!(d.summary, "3 nodes · 2 connections");
        for n in &d.nodes {
            assert!(!n.is_highlighted && !n.is_dimmed);
            assert_eq!(n.timeline_status, TimelineStatus::Unchanged);
        }
        assert_eq!(view(&d, "Account.Status").minimap_color, "#3b82f6");
        assert_eq!(view(&d, "Onboarding").minimap_color, "#a855f7");
    }

    #[test]
    fn hover_enter_and_leave_toggle_spotlight() {
        let mut st = loaded();
        st.hover_enter("Account.Status");
        let d = st.decorate(now());
        assert!(view(&d, "Account.Status").is_highlighted);
        assert!(view(&d, "StatusTrigger").is_highlighted);
        assert!(view(&d, "Onboarding").is_dimmed);
        assert!(d.edges[0].is_highlighted);
        assert!(d.edges[1].is_dimmed);
        assert_eq!(d.edges[1].visible_label(), None);

        st.hover_leave();
        let d = st.decorate(now());
        assert!(d.nodes.iter().all(|n| !n.is_highlighted && !n.is_dimmed));
        assert!(d.edges.iter().all(|e| !e.is_highlighted && !e.is_dimmed));
    }

    #[test]
    fn hover_and_slider_leave_positions_alone() {
        let mut st = loaded();
        let before: Vec<_> = st.model.nodes.iter().map(|n| n.position).collect();
        st.hover_enter("StatusTrigger");
        st.set_slider(0);
        let d = st.decorate(now());
        let after: Vec<_> = d.nodes.iter().map(|n| n.node.position).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn slider_marks_recent_nodes_new() {
        let mut st = loaded();
        st.set_slider(50);
        let d = st.decorate(now());
        assert_eq!(d.timeline_label, "2 Weeks Ago");
        assert_eq!(view(&d, "StatusTrigger").timeline_status, TimelineStatus::New);
        assert_eq!(view(&d, "Account.Status").timeline_status, TimelineStatus::Unchanged);
        assert_eq!(view(&d, "Onboarding").timeline_status, TimelineStatus::Unchanged);
    }

    #[test]
    fn clear_drops_snapshot_and_hover() {
        let mut st = loaded();
        st.hover_enter("Onboarding");
        st.clear();
        assert!(st.model.is_empty());
        assert!(st.hovered().is_none());
        assert!(!st.spotlight().is_active());
        assert_eq!(st.decorate(now()).summary, "");
    }
}
