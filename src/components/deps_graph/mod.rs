mod component;
mod fetch;
mod layout;
mod overlay;
mod render;
mod state;
mod types;
mod view;

pub use component::DepsGraphCanvas;
pub use types::{DepEdge, DepsGraphData, GraphElement, TaskNode, TaskStatus};
pub use view::{GraphView, Navigation, RefreshOutcome, ViewPhase};
