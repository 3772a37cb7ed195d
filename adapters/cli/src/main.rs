#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays recorded rescue simulations.
//!
//! Frames come from a JSON file (either a bare frame array or the simulation
//! server's response envelope), from a single-line transfer string, or from
//! the built-in deterministic demo generator. The replay runs synchronously:
//! every loop iteration feeds one fixed delta into the engine, prints the
//! resulting events and ends with the rasterized final board plus the
//! telemetry summary.

mod demo;
mod transfer;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;

use rescue_replay_core::{BoardConfig, Command, Event, Frame, WELCOME_BANNER};
use rescue_replay_rendering::{rasterize, RecordingSink};
use rescue_replay_scene::{apply, query, PlaybackStatus, Scene};
use rescue_replay_system_telemetry::Telemetry;

use transfer::ReplayTransfer;

/// Command-line arguments accepted by the replay binary.
#[derive(Debug, Parser)]
#[command(name = "rescue-replay", about = "Replays recorded rescue simulations")]
struct Args {
    /// Path to a frames JSON file, either a bare array or the server envelope.
    #[arg(long, value_name = "PATH", conflicts_with_all = ["transfer", "demo"])]
    frames: Option<PathBuf>,

    /// Single-line transfer string produced by --export.
    #[arg(long, value_name = "STRING", conflicts_with = "demo")]
    transfer: Option<String>,

    /// Generate a deterministic demo sequence instead of loading one.
    #[arg(long)]
    demo: bool,

    /// Seed for the demo generator (only meaningful with --demo).
    #[arg(long, default_value_t = 0x5eed_cafe)]
    seed: u64,

    /// Number of frames in the demo sequence (only meaningful with --demo).
    #[arg(long, default_value_t = 12)]
    steps: u32,

    /// Simulated milliseconds fed to the engine per tick.
    #[arg(long, default_value_t = 250)]
    tick_ms: u64,

    /// Print the transfer string for the loaded sequence and exit.
    #[arg(long)]
    export: bool,

    /// Suppress the per-event log lines.
    #[arg(long)]
    quiet: bool,
}

/// Accepted shapes of a frames JSON document.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FramesDocument {
    /// The simulation server's full response envelope.
    Envelope {
        /// The `data` object wrapping the frame list.
        data: EnvelopeData,
    },
    /// A bare array of frames.
    Plain(Vec<Frame>),
}

/// The `data` object of the server envelope.
#[derive(Debug, Deserialize)]
struct EnvelopeData {
    /// Recorded frames, in step order.
    frames: Vec<Frame>,
}

/// Entry point for the Rescue Replay command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let config = BoardConfig::default();
    let frames = load_frames(&args, &config)?;

    if args.export {
        let transfer = ReplayTransfer {
            columns: config.columns(),
            rows: config.rows(),
            frames,
        };
        println!("{}", transfer.encode());
        return Ok(());
    }

    run(&args, config, frames)
}

fn load_frames(args: &Args, config: &BoardConfig) -> Result<Vec<Frame>> {
    if args.demo {
        return Ok(demo::generate(config, args.seed, args.steps));
    }

    if let Some(code) = &args.transfer {
        let transfer =
            ReplayTransfer::decode(code).context("could not decode the transfer string")?;
        return Ok(transfer.frames);
    }

    if let Some(path) = &args.frames {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        let document: FramesDocument =
            serde_json::from_str(&text).context("could not parse the frames document")?;
        return Ok(match document {
            FramesDocument::Envelope { data } => data.frames,
            FramesDocument::Plain(frames) => frames,
        });
    }

    bail!("provide a frame source: --frames, --transfer or --demo");
}

fn run(args: &Args, config: BoardConfig, frames: Vec<Frame>) -> Result<()> {
    println!("{WELCOME_BANNER}");

    let mut scene = Scene::new(config.clone());
    let mut sink = RecordingSink::new();
    let mut telemetry = Telemetry::new();
    let mut events = Vec::new();

    apply(&mut scene, Command::Start { frames }, &mut sink, &mut events);
    report(&events, args.quiet);
    telemetry.handle(&events);

    let dt = Duration::from_millis(args.tick_ms.max(1));
    while matches!(query::playback(&scene), PlaybackStatus::Animating { .. }) {
        events.clear();
        apply(&mut scene, Command::Tick { dt }, &mut sink, &mut events);
        report(&events, args.quiet);
        telemetry.handle(&events);
    }

    if let PlaybackStatus::Failed(error) = query::playback(&scene) {
        bail!("replay rejected: {error}");
    }

    println!("{}", rasterize(&sink, &config)?);
    summarize(&telemetry, &scene);
    Ok(())
}

fn report(events: &[Event], quiet: bool) {
    if quiet {
        return;
    }
    for event in events {
        if let Some(line) = describe(event) {
            println!("{line}");
        }
    }
}

fn describe(event: &Event) -> Option<String> {
    match event {
        Event::FrameAdvanced { index } => Some(format!("frame {index} on display")),
        Event::AgentMoved { id, from, to } => {
            Some(format!("agent {id} stepped from {from} to {to}"))
        }
        Event::AgentAbsent { id, index } => {
            Some(format!("agent {id} is missing from frame {index}"))
        }
        Event::DoorOpened { key } => Some(format!(
            "door opened on the {:?} edge of {}",
            key.side(),
            key.cell()
        )),
        Event::PoiRevealed { cell } => Some(format!("point of interest revealed at {cell}")),
        Event::SequenceDone => Some("sequence complete".to_owned()),
        Event::Fault { index: Some(at), error } => Some(format!("fault in frame {at}: {error}")),
        Event::Fault { index: None, error } => Some(format!("fault: {error}")),
        Event::EntityCreated { .. } | Event::EntityRemoved { .. } => None,
    }
}

fn summarize(telemetry: &Telemetry, scene: &Scene) {
    let metrics = telemetry.metrics();
    let score = query::score(scene);

    println!(
        "frames {} | moves {} | doors opened {} | tokens revealed {}",
        metrics.frames_advanced, metrics.agent_moves, metrics.doors_opened, metrics.pois_revealed
    );
    println!(
        "saved {} | lost {} | damage {}",
        score.saved, score.lost, score.damage
    );
    if metrics.faults > 0 {
        println!("{} fault(s) were skipped during playback", metrics.faults);
        if let Some(fault) = telemetry.last_fault() {
            match fault.index {
                Some(index) => println!("last fault, frame {index}: {}", fault.error),
                None => println!("last fault: {}", fault.error),
            }
        }
    }
}
