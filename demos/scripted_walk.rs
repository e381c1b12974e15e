use anyhow::Result;
use panotrail_geometry::Point3;
use panotrail_graph::{PanoramaNode, ViewpointGraph};
use panotrail_nav::{Navigator, NavigatorConfig, Recorder, TickOutcome};

fn main() -> Result<()> {
    let graph = ViewpointGraph::new(vec![
        PanoramaNode::at("hall", Point3::new(0.0, 1.5, 0.0)).with_navigable(["door"]),
        PanoramaNode::at("door", Point3::new(0.0, 1.5, -3.0)).with_navigable(["hall"]),
    ])?;
    let mut nav = Navigator::new(graph, NavigatorConfig::default())?;
    nav.set_current_node("hall")?;
    let mut recorder = Recorder::new();
    recorder.begin();

    nav.on_tick(0.0)?;
    nav.click()?;
    let mut elapsed = 0.0;
    loop {
        recorder.capture(&nav, elapsed)?;
        elapsed += 1000.0 / 30.0;
        if let TickOutcome::Arrived { .. } = nav.on_tick(1000.0 / 30.0)? {
            recorder.capture(&nav, elapsed)?;
            break;
        }
    }

    std::fs::create_dir_all("out")?;
    let trace = recorder.finish();
    trace.write_jsonl(std::fs::File::create("out/walk.jsonl")?)?;
    println!("{} snapshots over {elapsed:.0} ms", trace.len());
    Ok(())
}
