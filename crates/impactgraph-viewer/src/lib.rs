//! Client side of the field-impact graph explorer: turns backend graph
//! payloads into a laid-out, hover-aware, timeline-tagged snapshot.

pub mod graph;
pub mod net;
pub mod query;
pub mod util;
