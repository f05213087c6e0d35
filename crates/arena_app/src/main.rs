//! # arena_app
//!
//! Plays one stage of the arena game without a window: input comes from a
//! JSON script, drawing goes to a canvas that only counts calls, and the
//! result is logged.
//!
//! ## Startup Sequence
//!
//! 1. Parse flags and initialise structured logging.
//! 2. Load the config file (if any) and layer flags over it.
//! 3. Load the stage catalogue and the input script.
//! 4. Push the play scene and run the fixed-step frame loop.

mod canvas;

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use arena_sim::{
    FrameConfig, FrameLoop, MemoryProgress, MonsterRegistry, Outcome, PlayScene, PlayerProgress, ProgressStore,
    ScriptedInput, SimConfig, SpriteAtlas, StageCatalog,
};
use canvas::LogCanvas;

#[derive(Parser, Debug)]
#[command(name = "arena_app", about = "Run an arena stage headless")]
struct Args {
    /// Stage id to play
    #[arg(short, long, default_value_t = 1)]
    stage: u32,

    /// JSON file with stage definitions (defaults to the built-in stages)
    #[arg(long)]
    stages: Option<PathBuf>,

    /// Stop after this many frames (0 = until the stage ends)
    #[arg(short, long)]
    frames: Option<u64>,

    /// Seed for spawn positions and AI rolls
    #[arg(long)]
    seed: Option<u64>,

    /// JSON input script of `{ frame, key, pressed }` events
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON simulation config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hold the tick rate in wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Log at debug level by default
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn sim_config(&self) -> Result<SimConfig> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path).with_context(|| format!("loading config {}", path.display()))?,
            None => SimConfig::default(),
        };
        if let Some(frames) = self.frames {
            config.max_frames = frames;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        config.realtime |= self.realtime;
        config.validate()?;
        Ok(config)
    }

    fn catalog(&self) -> Result<StageCatalog> {
        match &self.stages {
            Some(path) => StageCatalog::load(path).with_context(|| format!("loading stages {}", path.display())),
            None => Ok(StageCatalog::builtin()),
        }
    }

    fn script(&self) -> Result<ScriptedInput> {
        match &self.input {
            Some(path) => ScriptedInput::load(path).with_context(|| format!("loading input {}", path.display())),
            None => Ok(ScriptedInput::default()),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(format!("arena_app={level}").parse()?)
                .add_directive(format!("arena_sim={level}").parse()?),
        )
        .init();

    let config = args.sim_config()?;
    let catalog = args.catalog()?;
    let stage = catalog.get(args.stage)?.clone();
    let input = args.script()?;
    info!(
        stage = stage.id,
        monsters = stage.monster_count(),
        seed = config.seed,
        max_frames = config.max_frames,
        scripted_events = input.remaining(),
        "arena runner starting"
    );

    let progress = Rc::new(RefCell::new(MemoryProgress::new(PlayerProgress::default())));
    let outcome = Rc::new(Cell::new(None));
    let seen = outcome.clone();
    let scene = PlayScene::new(
        stage,
        config.clone(),
        Rc::new(SpriteAtlas::builtin()),
        Rc::new(MonsterRegistry::with_builtin()),
        progress.clone(),
    )
    .with_outcome_hook(move |result: Outcome| seen.set(Some(result)));

    let mut frame_loop = FrameLoop::new(FrameConfig::from(&config), input);
    frame_loop.scenes_mut().push(Box::new(scene))?;

    let mut canvas = LogCanvas::new();
    let frames = frame_loop.run(&mut canvas)?;

    let saved = progress.borrow();
    info!(
        frames,
        drawn_frames = canvas.frames(),
        draw_calls = canvas.total_draws(),
        outcome = ?outcome.get(),
        gold = saved.load().gold,
        saves = saved.saves(),
        "arena runner finished"
    );
    Ok(())
}
