use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{depth_first_search, DfsEvent};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};

use crate::graph::model::{GraphEdge, GraphNode, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    LeftRight,
    TopBottom,
}

/// One-shot positioning of a snapshot. Implementations must accept empty
/// input, self loops, cycles, and edges whose endpoints are not in `nodes`.
pub trait LayoutEngine {
    fn layout(&self, nodes: Vec<GraphNode>, edges: &[GraphEdge], direction: Direction)
        -> Vec<GraphNode>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between neighbours in the same rank.
    pub node_sep: f32,
    /// Gap between consecutive ranks.
    pub rank_sep: f32,
    /// Subtracted from the centre anchor to get the renderer's top-left corner.
    pub anchor_offset_x: f32,
    pub anchor_offset_y: f32,
    pub ordering_sweeps: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 220.0,
            node_height: 100.0,
            node_sep: 20.0,
            rank_sep: 200.0,
            anchor_offset_x: 100.0,
            anchor_offset_y: 40.0,
            ordering_sweeps: 4,
        }
    }
}

/// Ranked layout: cycle breaking, longest-path ranks, barycentre ordering.
#[derive(Debug, Clone, Default)]
pub struct LayeredLayout {
    pub cfg: LayoutConfig,
}

impl LayeredLayout {
    pub fn new(cfg: LayoutConfig) -> Self {
        Self { cfg }
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(
        &self,
        mut nodes: Vec<GraphNode>,
        edges: &[GraphEdge],
        direction: Direction,
    ) -> Vec<GraphNode> {
        if nodes.is_empty() {
            return nodes;
        }

        let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let links = resolve_links(&ids, edges);
        let dag = acyclic_links(ids.len(), &links);
        let ranks = longest_path_ranks(ids.len(), &dag);
        let mut layers = group_by_rank(&ranks);
        order_layers(&mut layers, &ranks, &dag, self.cfg.ordering_sweeps);

        let placed = self.place(&layers, direction);
        for (i, node) in nodes.iter_mut().enumerate() {
            node.position = placed[i];
        }

        tracing::debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            ranks = layers.len(),
            "layout computed"
        );
        nodes
    }
}

impl LayeredLayout {
    fn place(&self, layers: &[Vec<usize>], direction: Direction) -> Vec<Position> {
        let c = &self.cfg;
        let (rank_extent, cross_extent) = match direction {
            Direction::LeftRight => (c.node_width, c.node_height),
            Direction::TopBottom => (c.node_height, c.node_width),
        };
        let rank_step = rank_extent + c.rank_sep;
        let cross_step = cross_extent + c.node_sep;
        let widest = layers.iter().map(Vec::len).max().unwrap_or(0);

        let total: usize = layers.iter().map(Vec::len).sum();
        let mut out = vec![Position::default(); total];
        for (rank, layer) in layers.iter().enumerate() {
            // centre shorter ranks against the widest one
            let shift = (widest - layer.len()) as f32 * cross_step / 2.0;
            for (order, &idx) in layer.iter().enumerate() {
                let along = rank as f32 * rank_step + rank_extent / 2.0;
                let across = shift + order as f32 * cross_step + cross_extent / 2.0;
                let (cx, cy) = match direction {
                    Direction::LeftRight => (along, across),
                    Direction::TopBottom => (across, along),
                };
                out[idx] = Position {
                    x: cx - c.anchor_offset_x,
                    y: cy - c.anchor_offset_y,
                };
            }
        }
        out
    }
}

// Index pairs for edges whose ends are both known; self loops don't affect ranking.
fn resolve_links(ids: &[&str], edges: &[GraphEdge]) -> Vec<(usize, usize)> {
    let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
    edges
        .iter()
        .filter_map(|e| {
            let s = *index.get(e.source.as_str())?;
            let t = *index.get(e.target.as_str())?;
            (s != t).then_some((s, t))
        })
        .collect()
}

/// Reverses DFS back edges, which leaves a DAG over the same node set.
fn acyclic_links(n: usize, links: &[(usize, usize)]) -> DiGraph<(), ()> {
    let mut g = DiGraph::<(), ()>::with_capacity(n, links.len());
    for _ in 0..n {
        g.add_node(());
    }
    for &(s, t) in links {
        g.add_edge(NodeIndex::new(s), NodeIndex::new(t), ());
    }

    let mut back: HashSet<(usize, usize)> = HashSet::new();
    depth_first_search(&g, g.node_indices(), |event| {
        if let DfsEvent::BackEdge(u, v) = event {
            back.insert((u.index(), v.index()));
        }
    });

    let mut dag = DiGraph::<(), ()>::with_capacity(n, links.len());
    for _ in 0..n {
        dag.add_node(());
    }
    for &(s, t) in links {
        let (a, b) = if back.contains(&(s, t)) { (t, s) } else { (s, t) };
        dag.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
    }
    dag
}

fn longest_path_ranks(n: usize, dag: &DiGraph<(), ()>) -> Vec<usize> {
    let mut ranks = vec![0usize; n];
    let order = match toposort(dag, None) {
        Ok(order) => order,
        Err(cycle) => {
            tracing::warn!(node = cycle.node_id().index(), "cycle survived breaking; flat ranks");
            return ranks;
        }
    };
    for v in order {
        let next = ranks[v.index()] + 1;
        for w in dag.neighbors(v) {
            if ranks[w.index()] < next {
                ranks[w.index()] = next;
            }
        }
    }
    ranks
}

fn group_by_rank(ranks: &[usize]) -> Vec<Vec<usize>> {
    let depth = ranks.iter().copied().max().map_or(0, |m| m + 1);
    let mut layers = vec![Vec::new(); depth];
    for (idx, &r) in ranks.iter().enumerate() {
        layers[r].push(idx);
    }
    layers
}

/// Barycentre sweeps, alternating down and up, against adjacent ranks only.
fn order_layers(
    layers: &mut [Vec<usize>],
    ranks: &[usize],
    dag: &DiGraph<(), ()>,
    sweeps: usize,
) {
    if layers.len() < 2 {
        return;
    }
    let mut neighbours: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); ranks.len()];
    for e in dag.raw_edges() {
        let (a, b) = (e.source().index(), e.target().index());
        neighbours[a].push(b);
        neighbours[b].push(a);
    }

    let mut slot = vec![0usize; ranks.len()];
    let reindex = |layers: &[Vec<usize>], slot: &mut [usize]| {
        for layer in layers {
            for (i, &idx) in layer.iter().enumerate() {
                slot[idx] = i;
            }
        }
    };
    reindex(layers, &mut slot);

    for sweep in 0..sweeps {
        let downward = sweep % 2 == 0;
        let rank_order: Vec<usize> = if downward {
            (1..layers.len()).collect()
        } else {
            (0..layers.len() - 1).rev().collect()
        };
        for r in rank_order {
            let fixed = if downward { r - 1 } else { r + 1 };
            let mut keyed: Vec<(f32, usize)> = layers[r]
                .iter()
                .map(|&idx| {
                    let adj: SmallVec<[usize; 4]> = neighbours[idx]
                        .iter()
                        .copied()
                        .filter(|&nb| ranks[nb] == fixed)
                        .collect();
                    let key = if adj.is_empty() {
                        slot[idx] as f32
                    } else {
                        adj.iter().map(|&nb| slot[nb] as f32).sum::<f32>() / adj.len() as f32
                    };
                    (key, idx)
                })
                .collect();
            keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
            layers[r] = keyed.into_iter().map(|(_, idx)| idx).collect();
            for (i, &idx) in layers[r].iter().enumerate() {
                slot[idx] = i;
            }
        }
    }
}
