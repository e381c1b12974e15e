use panotrail_base::{Result, SessionId};
use panotrail_trace::PoseTrace;
use tracing::{debug, info, trace};

use crate::HasEnvironment;

#[derive(Debug, Default)]
pub struct Recorder {
    session: SessionId,
    trace: PoseTrace,
    audio_origin_ms: Option<f64>,
    active: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> SessionId {
        self.session = SessionId::new();
        self.trace.clear();
        self.audio_origin_ms = None;
        self.active = true;
        info!(session = %self.session, "recording started");
        self.session
    }

    pub fn sync_audio(&mut self, audio_started_ms: f64) {
        self.audio_origin_ms = Some(audio_started_ms);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn trace(&self) -> &PoseTrace {
        &self.trace
    }

    pub fn capture<S>(&mut self, scene: &S, elapsed_ms: f64) -> Result<bool>
    where
        S: HasEnvironment + ?Sized,
    {
        if !self.active {
            return Ok(false);
        }
        let Some(mut snapshot) = scene.environment().capture(elapsed_ms) else {
            trace!("no current node to capture");
            return Ok(false);
        };
        if let Some(origin) = self.audio_origin_ms {
            snapshot = snapshot.with_audio(elapsed_ms - origin);
        }
        self.trace.push(snapshot)?;
        Ok(true)
    }

    pub fn finish(&mut self) -> PoseTrace {
        self.active = false;
        info!(session = %self.session, snapshots = self.trace.len(), "recording finished");
        std::mem::take(&mut self.trace)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReplayStep {
    Empty,
    Applied { index: usize, timestamp_ms: f64 },
    /// `t` lies past the last snapshot, which is now showing.
    Finished { index: usize, timestamp_ms: f64 },
}

#[derive(Clone, Debug, Default)]
pub struct Replayer {
    trace: PoseTrace,
    last_index: Option<usize>,
}

impl Replayer {
    pub fn new(trace: PoseTrace) -> Self {
        Self {
            trace,
            last_index: None,
        }
    }

    pub fn trace(&self) -> &PoseTrace {
        &self.trace
    }

    pub fn duration_ms(&self) -> f64 {
        self.trace.last_timestamp().unwrap_or(0.0)
    }

    pub fn step<S>(&mut self, scene: &mut S, t: f64) -> Result<ReplayStep>
    where
        S: HasEnvironment + ?Sized,
    {
        let Some(index) = self.trace.nearest_index(t) else {
            return Ok(ReplayStep::Empty);
        };
        let Some(snapshot) = self.trace.get(index) else {
            return Ok(ReplayStep::Empty);
        };
        scene.restore_snapshot(snapshot)?;
        if self.last_index != Some(index) {
            debug!(index, node = %snapshot.node_id, t, "replaying snapshot");
            self.last_index = Some(index);
        }
        let timestamp_ms = snapshot.timestamp_ms;
        if self.trace.is_finished(t) {
            Ok(ReplayStep::Finished {
                index,
                timestamp_ms,
            })
        } else {
            Ok(ReplayStep::Applied {
                index,
                timestamp_ms,
            })
        }
    }
}
