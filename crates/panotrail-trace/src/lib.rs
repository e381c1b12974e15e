mod error;
mod number;
mod sink;
mod snapshot;
mod trace;

pub use error::{Error, Result};
pub use number::format_number;
pub use sink::{JsonLinesSink, TraceSink};
pub use snapshot::{Snapshot, TraceRecord};
pub use trace::PoseTrace;
