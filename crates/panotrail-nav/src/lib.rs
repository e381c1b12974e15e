mod config;
mod environment;
mod navigator;
mod pose;
mod recording;
mod tick;

pub use config::NavigatorConfig;
pub use environment::{CursorTarget, Environment, FrameState, HasEnvironment};
pub use navigator::{NavState, Navigator, TickOutcome};
pub use panotrail_base::{Error, NodeId, Result};
pub use pose::CameraPose;
pub use recording::{Recorder, ReplayStep, Replayer};
pub use tick::{Clock, ManualClock, SystemClock, Tick, TickScheduler};
