pub mod layout;
pub mod model;
pub mod spotlight;
pub mod state;
pub mod timeline;
pub mod transform;

pub use layout::{Direction, LayeredLayout, LayoutConfig, LayoutEngine};
pub use model::{EdgeView, GraphEdge, GraphModel, GraphNode, NodeKind, NodeView, RiskLevel};
pub use state::{Decorated, GraphState};
pub use timeline::TimelineWindow;
