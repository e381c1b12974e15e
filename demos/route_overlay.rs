use anyhow::Result;
use panotrail_geometry::Point3;
use panotrail_graph::{PanoramaNode, ViewpointGraph};
use panotrail_overlay::{OverlayCollector, OverlayConfig, PathOverlay, Rgb};

fn main() -> Result<()> {
    let mut graph = ViewpointGraph::new(vec![
        PanoramaNode::at("a", Point3::new(0.0, 0.0, 0.0)).with_visible(["b"]),
        PanoramaNode::at("b", Point3::new(2.0, 0.0, 0.0)).with_visible(["a", "c"]),
        PanoramaNode::at("c", Point3::new(4.0, 0.0, 0.0)).with_visible(["b"]),
    ])?;
    let waypoints: Vec<Point3> = graph.nodes().map(|n| n.position()).collect();
    let colors = [Rgb::from_hex("#00ff00")?, Rgb::from_hex("#ff0000")?];
    let mut overlay = PathOverlay::build(&graph, &waypoints, &colors, &OverlayConfig::default())?;

    for id in ["a", "b", "c"] {
        graph.set_current(id)?;
        let visible = overlay.update_visibility(&graph)?;
        let mut collector = OverlayCollector::default();
        overlay.paint(&mut collector);
        println!("at {id}: {visible} points, {} segments", collector.shapes.len());
    }
    Ok(())
}
