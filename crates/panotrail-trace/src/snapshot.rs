use panotrail_base::NodeId;
use panotrail_geometry::{Mat4, from_row_major, to_row_major};
use serde::Deserialize;

use crate::{Result, format_number};

#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub node_id: NodeId,
    pub extrinsic: Mat4,
    pub intrinsic: Mat4,
    pub timestamp_ms: f64,
    pub audio_ms: Option<f64>,
}

impl Snapshot {
    pub fn new(node_id: impl Into<NodeId>, extrinsic: Mat4, intrinsic: Mat4, timestamp_ms: f64) -> Self {
        Self {
            node_id: node_id.into(),
            extrinsic,
            intrinsic,
            timestamp_ms,
            audio_ms: None,
        }
    }

    pub fn with_audio(mut self, audio_ms: f64) -> Self {
        self.audio_ms = Some(audio_ms);
        self
    }

    pub fn to_record(&self) -> TraceRecord {
        TraceRecord {
            id: self.node_id.clone(),
            exmat: to_row_major(&self.extrinsic),
            inmat: to_row_major(&self.intrinsic),
            time: self.timestamp_ms,
            audio: self.audio_ms,
        }
    }
}

impl From<TraceRecord> for Snapshot {
    fn from(record: TraceRecord) -> Self {
        Self {
            node_id: record.id,
            extrinsic: from_row_major(&record.exmat),
            intrinsic: from_row_major(&record.inmat),
            timestamp_ms: record.time,
            audio_ms: record.audio,
        }
    }
}

/// Wire shape of one pose-trace line. Matrices are row-major.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TraceRecord {
    pub id: String,
    pub exmat: [f64; 16],
    pub inmat: [f64; 16],
    pub time: f64,
    #[serde(default)]
    pub audio: Option<f64>,
}

impl TraceRecord {
    /// Encodes the record as one JSON line (without the newline). Key order
    /// and number formatting are fixed so that the same pose always yields
    /// the same bytes.
    pub fn encode_line(&self) -> Result<String> {
        let mut line = String::with_capacity(384);
        line.push_str("{\"id\":");
        line.push_str(&serde_json::to_string(&self.id)?);
        push_matrix(&mut line, "exmat", &self.exmat);
        push_matrix(&mut line, "inmat", &self.inmat);
        line.push_str(",\"time\":");
        line.push_str(&format_number(self.time));
        if let Some(audio) = self.audio {
            line.push_str(",\"audio\":");
            line.push_str(&format_number(audio));
        }
        line.push('}');
        Ok(line)
    }
}

fn push_matrix(line: &mut String, key: &str, values: &[f64; 16]) {
    line.push_str(",\"");
    line.push_str(key);
    line.push_str("\":[");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&format_number(*value));
    }
    line.push(']');
}
