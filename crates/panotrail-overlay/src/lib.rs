mod color;
mod marker;
mod meter;
mod painter;
mod path;

pub use color::{Rgb, Stroke};
pub use marker::{Decoration, Marker, MarkerOverlay, PulseConfig};
pub use meter::{Histogram, RmsMeter, Visualizer};
pub use painter::{OverlayCollector, OverlayPainter, OverlayShape, Point2, Rect};
pub use panotrail_base::{Error, NodeId, Result};
pub use path::{OverlayConfig, PathOverlay, PathPoint};
