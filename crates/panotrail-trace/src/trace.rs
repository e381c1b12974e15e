use std::io::{BufRead, Write};

use tracing::debug;

use crate::{Error, JsonLinesSink, Result, Snapshot, TraceRecord, TraceSink};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoseTrace {
    snapshots: Vec<Snapshot>,
}

impl PoseTrace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, snapshot: Snapshot) -> panotrail_base::Result<()> {
        if let Some(last) = self.last_timestamp() {
            if snapshot.timestamp_ms < last {
                return Err(panotrail_base::Error::invariant(format!(
                    "snapshot at {} ms precedes {} ms",
                    snapshot.timestamp_ms, last
                )));
            }
        }
        self.snapshots.push(snapshot);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Snapshot> {
        self.snapshots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.snapshots.last().map(|s| s.timestamp_ms)
    }

    pub fn is_finished(&self, t: f64) -> bool {
        self.last_timestamp().is_none_or(|last| t > last)
    }

    pub fn nearest_index(&self, t: f64) -> Option<usize> {
        let len = self.snapshots.len();
        if len == 0 {
            return None;
        }
        let upper = self.snapshots.partition_point(|s| s.timestamp_ms < t);
        let candidate = if upper == 0 {
            0
        } else if upper == len {
            len - 1
        } else {
            let before = upper - 1;
            let before_gap = (t - self.snapshots[before].timestamp_ms).abs();
            let after_gap = (self.snapshots[upper].timestamp_ms - t).abs();
            if before_gap <= after_gap { before } else { upper }
        };
        let timestamp = self.snapshots[candidate].timestamp_ms;
        Some(self.snapshots[..candidate].partition_point(|s| s.timestamp_ms < timestamp))
    }

    pub fn nearest(&self, t: f64) -> Option<&Snapshot> {
        self.nearest_index(t).map(|index| &self.snapshots[index])
    }

    pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Self> {
        let mut trace = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: TraceRecord = serde_json::from_str(&line).map_err(|source| Error::Parse {
                line: index + 1,
                source,
            })?;
            trace.push(Snapshot::from(record))?;
        }
        debug!(snapshots = trace.len(), "read pose trace");
        Ok(trace)
    }

    pub fn write_jsonl<W: Write>(&self, writer: W) -> Result<()> {
        let mut sink = JsonLinesSink::new(writer);
        self.write_to(&mut sink)
    }

    pub fn write_to<S: TraceSink + ?Sized>(&self, sink: &mut S) -> Result<()> {
        for snapshot in &self.snapshots {
            sink.write_snapshot(snapshot)?;
        }
        sink.flush()
    }
}

impl<'a> IntoIterator for &'a PoseTrace {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}
