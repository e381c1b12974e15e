mod graph;
mod node;

pub use graph::ViewpointGraph;
pub use node::PanoramaNode;
pub use panotrail_base::{Error, NodeId, Result};
