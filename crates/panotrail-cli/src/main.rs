use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use panotrail_graph::{NodeId, PanoramaNode, ViewpointGraph};
use panotrail_nav::{
    Environment, HasEnvironment, ManualClock, Navigator, NavigatorConfig, Recorder, ReplayStep,
    Replayer, Tick, TickOutcome, TickScheduler,
};
use panotrail_overlay::{MarkerOverlay, OverlayCollector, OverlayConfig, PathOverlay, PulseConfig, Rgb};
use panotrail_trace::{JsonLinesSink, PoseTrace, TraceSink};
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "panotrail")]
#[command(about = "Record and replay walks through a panorama viewpoint graph")]
struct Cli {
    /// JSON settings with optional `navigator`, `overlay` and `pulse` sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Inspect(InspectArgs),
    Prune(PruneArgs),
    Record(RecordArgs),
    Replay(ReplayArgs),
    Overlay(OverlayArgs),
}

#[derive(Args)]
struct InspectArgs {
    #[arg(long)]
    graph: PathBuf,
}

#[derive(Args)]
struct PruneArgs {
    #[arg(long)]
    graph: PathBuf,
    #[arg(long)]
    keep: String,
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args)]
struct RecordArgs {
    #[arg(long)]
    graph: PathBuf,
    /// Comma-separated node ids; the walk starts at the first one.
    #[arg(long)]
    route: String,
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
    #[arg(long)]
    audio_start: Option<f64>,
}

#[derive(Args)]
struct ReplayArgs {
    #[arg(long)]
    graph: PathBuf,
    #[arg(long)]
    trace: PathBuf,
    #[arg(long, default_value_t = 30.0)]
    fps: f64,
    #[arg(long)]
    frames: Option<PathBuf>,
}

#[derive(Args)]
struct OverlayArgs {
    #[arg(long)]
    graph: PathBuf,
    #[arg(long)]
    path: String,
    #[arg(long)]
    at: String,
    #[arg(long, default_value = "#00ff00,#ff0000")]
    colors: String,
    /// Use discrete waypoint markers instead of the dense line.
    #[arg(long)]
    markers: bool,
    #[arg(long, default_value_t = 0.0)]
    clock_ms: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Settings {
    navigator: NavigatorConfig,
    overlay: OverlayConfig,
    pulse: PulseConfig,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Command::Inspect(args) => inspect(args),
        Command::Prune(args) => prune(args),
        Command::Record(args) => record(args, settings),
        Command::Replay(args) => replay(args, settings),
        Command::Overlay(args) => overlay(args, settings),
    }
}

fn inspect(args: InspectArgs) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    println!("nodes: {}", graph.len());
    println!("navigable edges: {}", graph.edge_count());
    let one_way = graph.one_way_edges();
    println!("one-way edges: {}", one_way.len());
    for (from, to) in &one_way {
        println!("  {from} -> {to}");
    }
    for node in graph.nodes().filter(|n| n.navigable().is_empty()) {
        warn!(node = node.id(), "node has no navigable neighbors");
    }
    Ok(())
}

fn prune(args: PruneArgs) -> Result<()> {
    let mut graph = load_graph(&args.graph)?;
    let keep = parse_ids(&args.keep)?;
    let removed = graph.keep_only(&keep).context("prune failed")?;

    let file = File::create(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    let nodes: Vec<&PanoramaNode> = graph.nodes().collect();
    serde_json::to_writer_pretty(BufWriter::new(file), &nodes).context("failed to write graph")?;
    info!(removed, kept = graph.len(), path = %args.out.display(), "graph pruned");
    Ok(())
}

struct ScriptedWalk {
    nav: Navigator,
    recorder: Recorder,
    route: VecDeque<NodeId>,
}

impl ScriptedWalk {
    fn frame(&mut self, tick: &mut Tick) -> Result<()> {
        if let TickOutcome::Arrived { node } = self.nav.on_tick(tick.delta_ms)? {
            info!(node = %node, elapsed_ms = tick.elapsed_ms, "arrived");
        }
        if self.nav.input_enabled() {
            self.aim_next(tick)?;
        }
        self.recorder.capture(&self.nav, tick.elapsed_ms)?;
        Ok(())
    }

    fn aim_next(&mut self, tick: &mut Tick) -> Result<()> {
        let Some(next) = self.route.pop_front() else {
            tick.stop();
            return Ok(());
        };
        let cursor = self
            .nav
            .environment()
            .graph()
            .get_node(&next)?
            .cursor_position();
        self.nav.look_at(cursor);
        self.nav.on_tick(0.0)?;
        let selected = self.nav.target().map(|t| t.node_id.clone());
        if selected.as_deref() != Some(next.as_str()) {
            let current = self.nav.environment().current_node_id().unwrap_or("?");
            bail!(
                "route step {current} -> {next} is not navigable (selected {})",
                selected.as_deref().unwrap_or("nothing")
            );
        }
        self.nav.click()?;
        Ok(())
    }
}

fn record(args: RecordArgs, settings: Settings) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    let mut route: VecDeque<NodeId> = parse_ids(&args.route)?.into();
    let Some(start) = route.pop_front() else {
        bail!("--route needs at least one node id");
    };

    let mut nav = Navigator::new(graph, settings.navigator).context("invalid navigator config")?;
    nav.set_current_node(&start)?;
    let mut recorder = Recorder::new();
    let session = recorder.begin();
    if let Some(audio_start) = args.audio_start {
        recorder.sync_audio(audio_start);
    }
    let mut walk = ScriptedWalk {
        nav,
        recorder,
        route,
    };

    let frames = drive(args.fps, |tick| walk.frame(tick))?;
    let trace = walk.recorder.finish();

    let file = File::create(&args.out)
        .with_context(|| format!("failed to create {}", args.out.display()))?;
    trace
        .write_jsonl(BufWriter::new(file))
        .context("failed to write pose trace")?;
    info!(
        %session,
        frames,
        snapshots = trace.len(),
        path = %args.out.display(),
        "recording written"
    );
    Ok(())
}

fn replay(args: ReplayArgs, settings: Settings) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    let file = File::open(&args.trace)
        .with_context(|| format!("failed to open {}", args.trace.display()))?;
    let trace = PoseTrace::read_jsonl(BufReader::new(file))
        .with_context(|| format!("failed to read {}", args.trace.display()))?;
    let duration_ms = trace.last_timestamp().unwrap_or(0.0);

    let mut env = Environment::new(graph, settings.navigator.camera_pose());
    let mut replayer = Replayer::new(trace);
    let mut sink = match &args.frames {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Some(JsonLinesSink::new(BufWriter::new(file)))
        }
        None => None,
    };

    let (frames, applied) = replay_frames(
        &mut env,
        &mut replayer,
        args.fps,
        sink.as_mut().map(|sink| sink as &mut dyn TraceSink),
    )?;
    if let Some(mut sink) = sink {
        sink.flush()?;
    }
    info!(frames, applied, duration_ms, "replay finished");
    Ok(())
}

fn overlay(args: OverlayArgs, settings: Settings) -> Result<()> {
    let mut graph = load_graph(&args.graph)?;
    let waypoints = parse_ids(&args.path)?
        .iter()
        .map(|id| graph.get_node(id).map(|node| node.position()))
        .collect::<Result<Vec<_>, _>>()?;
    let colors = args
        .colors
        .split(',')
        .map(Rgb::from_hex)
        .collect::<Result<Vec<_>, _>>()?;
    graph.set_current(&args.at)?;

    if args.markers {
        let mut markers = MarkerOverlay::build(&graph, &waypoints, &colors, settings.pulse)?;
        let visible = markers.update_visibility(&graph)?;
        let mut collector = OverlayCollector::default();
        markers.paint(&mut collector, args.clock_ms);
        println!(
            "{visible} of {} markers visible from {} (pulse {:.3}, {} shapes)",
            markers.markers().len(),
            args.at,
            markers.pulse_scale(args.clock_ms),
            collector.shapes.len()
        );
        return Ok(());
    }

    let mut path = PathOverlay::build(&graph, &waypoints, &colors, &settings.overlay)?;
    let visible = path.update_visibility(&graph)?;
    println!(
        "{visible} of {} subpoints visible from {}",
        path.points().len(),
        args.at
    );
    let mut by_anchor: BTreeMap<&str, usize> = BTreeMap::new();
    for point in path.visible_points() {
        *by_anchor.entry(point.anchor.as_str()).or_default() += 1;
    }
    for (anchor, count) in by_anchor {
        println!("  {anchor}: {count}");
    }
    Ok(())
}

fn replay_frames(
    env: &mut Environment,
    replayer: &mut Replayer,
    fps: f64,
    mut sink: Option<&mut dyn TraceSink>,
) -> Result<(u64, usize)> {
    let mut applied = 0usize;
    let frames = drive(fps, |tick| {
        match replayer.step(env, tick.elapsed_ms)? {
            ReplayStep::Empty => {
                warn!("pose trace is empty; nothing to replay");
                tick.stop();
            }
            step @ (ReplayStep::Applied { .. } | ReplayStep::Finished { .. }) => {
                applied += 1;
                if let (Some(sink), Some(snapshot)) =
                    (sink.as_deref_mut(), env.capture(tick.elapsed_ms))
                {
                    sink.write_snapshot(&snapshot)?;
                }
                if matches!(step, ReplayStep::Finished { .. }) {
                    tick.stop();
                }
            }
        }
        Ok(())
    })?;
    Ok((frames, applied))
}

fn drive<F>(fps: f64, mut frame: F) -> Result<u64>
where
    F: FnMut(&mut Tick) -> Result<()>,
{
    if !(fps > 0.0 && fps.is_finite()) {
        bail!("--fps must be a positive number, got {fps}");
    }
    let clock = ManualClock::new();
    let mut failure = None;
    let frames = {
        let mut scheduler = TickScheduler::new(clock.clone(), |tick: &mut Tick| {
            if let Err(err) = frame(tick) {
                failure = Some(err);
                tick.stop();
            }
        });
        scheduler.start();
        while scheduler.frame() && scheduler.is_running() {
            clock.advance(1000.0 / fps);
        }
        scheduler.ticks()
    };
    match failure {
        Some(err) => Err(err),
        None => Ok(frames),
    }
}

fn load_graph(path: &Path) -> Result<ViewpointGraph> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let nodes: Vec<PanoramaNode> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse nodes from {}", path.display()))?;
    let graph = ViewpointGraph::new(nodes).context("invalid viewpoint graph")?;
    info!(nodes = graph.len(), path = %path.display(), "graph loaded");
    Ok(graph)
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse settings from {}", path.display()))
}

fn parse_ids(text: &str) -> Result<Vec<NodeId>> {
    let ids: Vec<NodeId> = text
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        bail!("expected comma-separated node ids, e.g. n1,n2,n3");
    }
    Ok(ids)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
