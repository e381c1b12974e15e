use std::collections::HashSet;

use panotrail_base::NodeId;
use panotrail_geometry::cgmath::{EuclideanSpace, Matrix4};
use panotrail_geometry::{Mat4, Point3, from_row_major, to_row_major};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeRecord", into = "NodeRecord")]
pub struct PanoramaNode {
    id: NodeId,
    extrinsic: Mat4,
    cursor_position: Option<Point3>,
    navigable: Vec<NodeId>,
    visible: Option<Vec<NodeId>>,
    image_sources: Vec<String>,
}

impl PanoramaNode {
    pub fn new(id: impl Into<NodeId>, extrinsic: Mat4) -> Self {
        Self {
            id: id.into(),
            extrinsic,
            cursor_position: None,
            navigable: Vec::new(),
            visible: None,
            image_sources: Vec::new(),
        }
    }

    pub fn at(id: impl Into<NodeId>, position: Point3) -> Self {
        Self::new(id, Matrix4::from_translation(position.to_vec()))
    }

    pub fn with_navigable<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.navigable = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_visible<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<NodeId>,
    {
        self.visible = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_cursor_position(mut self, position: Point3) -> Self {
        self.cursor_position = Some(position);
        self
    }

    pub fn with_image_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn extrinsic(&self) -> &Mat4 {
        &self.extrinsic
    }

    pub fn position(&self) -> Point3 {
        Point3::from_vec(self.extrinsic.w.truncate())
    }

    pub fn cursor_position(&self) -> Point3 {
        self.cursor_position.unwrap_or_else(|| self.position())
    }

    pub fn navigable(&self) -> &[NodeId] {
        &self.navigable
    }

    pub fn visible(&self) -> &[NodeId] {
        self.visible.as_deref().unwrap_or(&self.navigable)
    }

    pub fn image_sources(&self) -> &[String] {
        &self.image_sources
    }

    pub(crate) fn retain_neighbors<F>(&mut self, keep: F) -> usize
    where
        F: Fn(&str) -> bool,
    {
        let own = self.id.clone();
        let filter = |ids: &mut Vec<NodeId>| {
            let before = ids.len();
            let mut seen = HashSet::new();
            ids.retain(|id| *id != own && keep(id) && seen.insert(id.clone()));
            before - ids.len()
        };
        let mut removed = filter(&mut self.navigable);
        if let Some(visible) = self.visible.as_mut() {
            removed += filter(visible);
        }
        removed
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: String,
    extrinsic: [f64; 16],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cursor_position: Option<[f64; 3]>,
    #[serde(default)]
    navigable: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    visible: Option<Vec<String>>,
    #[serde(default)]
    image_sources: Vec<String>,
}

impl From<NodeRecord> for PanoramaNode {
    fn from(record: NodeRecord) -> Self {
        Self {
            id: record.id,
            extrinsic: from_row_major(&record.extrinsic),
            cursor_position: record.cursor_position.map(Point3::from),
            navigable: record.navigable,
            visible: record.visible,
            image_sources: record.image_sources,
        }
    }
}

impl From<PanoramaNode> for NodeRecord {
    fn from(node: PanoramaNode) -> Self {
        Self {
            extrinsic: to_row_major(&node.extrinsic),
            cursor_position: node.cursor_position.map(Into::into),
            id: node.id,
            navigable: node.navigable,
            visible: node.visible,
            image_sources: node.image_sources,
        }
    }
}
