//! Frame driver and scene stack.
//!
//! Each frame runs, strictly in order:
//!
//! 1. Poll the [`InputSource`] and hand every event to the top scene.
//! 2. Update the top scene (world update, then collision pass).
//! 3. Draw the top scene onto the [`Canvas`].
//! 4. Advance the frame counter.
//!
//! Scenes answer events and updates with a [`Transition`]; the stack applies
//! it before the next step. The loop ends when the stack empties, a scene
//! quits, or the frame limit is reached.

use std::fmt;
use std::time::{Duration, Instant};

use arena_component::Canvas;
use tracing::{debug, info, warn};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::input::{InputSource, KeyEvent};

/// What the active scene wants the stack to do.
pub enum Transition {
    None,
    /// Replace the top scene.
    Change(Box<dyn Scene>),
    Push(Box<dyn Scene>),
    Pop,
    Quit,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Change(scene) => write!(f, "Change({})", scene.name()),
            Self::Push(scene) => write!(f, "Push({})", scene.name()),
            Self::Pop => write!(f, "Pop"),
            Self::Quit => write!(f, "Quit"),
        }
    }
}

/// One game mode.
pub trait Scene {
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// A scene that cannot be built aborts the loop.
    fn enter(&mut self) -> Result<(), SimError> {
        Ok(())
    }

    fn exit(&mut self) {}

    /// Another scene was pushed on top.
    fn pause(&mut self) {}

    /// The scene above was popped.
    fn resume(&mut self) {}

    /// # Errors
    ///
    /// Propagates failures from the simulation.
    fn handle_event(&mut self, _event: &KeyEvent) -> Result<Transition, SimError> {
        Ok(Transition::None)
    }

    /// # Errors
    ///
    /// Propagates failures from the simulation.
    fn update(&mut self, dt: f32) -> Result<Transition, SimError>;

    fn draw(&self, canvas: &mut dyn Canvas);
}

#[derive(Default)]
pub struct SceneStack {
    scenes: Vec<Box<dyn Scene>>,
    quit: bool,
}

impl SceneStack {
    /// Empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// The scene's `enter` failure.
    pub fn push(&mut self, mut scene: Box<dyn Scene>) -> Result<(), SimError> {
        if let Some(top) = self.scenes.last_mut() {
            top.pause();
        }
        debug!(scene = scene.name(), "scene pushed");
        scene.enter()?;
        self.scenes.push(scene);
        Ok(())
    }

    /// Exits the top scene and resumes the one below.
    pub fn pop(&mut self) {
        if let Some(mut scene) = self.scenes.pop() {
            scene.exit();
            debug!(scene = scene.name(), "scene popped");
        }
        if let Some(top) = self.scenes.last_mut() {
            top.resume();
        }
    }

    /// # Errors
    ///
    /// The new scene's `enter` failure.
    pub fn apply(&mut self, transition: Transition) -> Result<(), SimError> {
        match transition {
            Transition::None => {}
            Transition::Change(scene) => {
                if let Some(mut old) = self.scenes.pop() {
                    old.exit();
                }
                self.push(scene)?;
            }
            Transition::Push(scene) => self.push(scene)?,
            Transition::Pop => self.pop(),
            Transition::Quit => {
                while !self.scenes.is_empty() {
                    self.pop();
                }
                self.quit = true;
            }
        }
        Ok(())
    }

    /// The active scene.
    #[must_use]
    pub fn top(&self) -> Option<&dyn Scene> {
        self.scenes.last().map(Box::as_ref)
    }

    /// Mutable access to the active scene.
    pub fn top_mut(&mut self) -> Option<&mut (dyn Scene + 'static)> {
        self.scenes.last_mut().map(Box::as_mut)
    }

    /// `true` when no scene is left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    /// Number of stacked scenes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    /// `true` after a scene asked to quit.
    #[must_use]
    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

impl fmt::Debug for SceneStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneStack")
            .field("scenes", &self.scenes.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("quit", &self.quit)
            .finish()
    }
}

/// Fixed-step settings for the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameConfig {
    /// Frames per second; every frame advances `1 / tick_rate` seconds.
    pub tick_rate: f64,
    /// Stop after this many frames (0 = unlimited).
    pub max_frames: u64,
    /// Sleep to hold `tick_rate` in wall-clock time.
    pub realtime: bool,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            max_frames: 0,
            realtime: false,
        }
    }
}

impl FrameConfig {
    /// # Errors
    ///
    /// [`SimError::Config`] unless `tick_rate` is finite and positive.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.tick_rate.is_finite() && self.tick_rate > 0.0 {
            Ok(())
        } else {
            Err(SimError::Config(format!("tick_rate must be positive, got {}", self.tick_rate)))
        }
    }

    /// Seconds one frame advances the simulation.
    #[must_use]
    pub fn frame_time(&self) -> f64 {
        1.0 / self.tick_rate
    }
}

impl From<&SimConfig> for FrameConfig {
    fn from(config: &SimConfig) -> Self {
        Self {
            tick_rate: config.tick_rate,
            max_frames: config.max_frames,
            realtime: config.realtime,
        }
    }
}

pub struct FrameLoop<I> {
    frame: u64,
    config: FrameConfig,
    scenes: SceneStack,
    input: I,
}

impl<I: InputSource> FrameLoop<I> {
    /// Loop at frame zero with an empty scene stack.
    #[must_use]
    pub fn new(config: FrameConfig, input: I) -> Self {
        Self {
            frame: 0,
            config,
            scenes: SceneStack::new(),
            input,
        }
    }

    /// Frames completed so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The scene stack.
    #[must_use]
    pub fn scenes(&self) -> &SceneStack {
        &self.scenes
    }

    /// Mutable scene stack, for pushing the first scene.
    pub fn scenes_mut(&mut self) -> &mut SceneStack {
        &mut self.scenes
    }

    /// `true` once the stack is empty or a scene quit.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.scenes.is_empty() || self.scenes.quit_requested()
    }

    /// Runs one frame. Returns `false` once there is nothing left to run.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] for an unusable tick rate, otherwise any scene
    /// failure; the frame is abandoned.
    pub fn step(&mut self, canvas: &mut dyn Canvas) -> Result<bool, SimError> {
        self.config.validate()?;
        if self.is_finished() {
            return Ok(false);
        }
        let dt = self.config.frame_time() as f32;

        for event in self.input.poll(self.frame) {
            let Some(scene) = self.scenes.top_mut() else {
                break;
            };
            let transition = scene.handle_event(&event)?;
            self.scenes.apply(transition)?;
        }

        if let Some(scene) = self.scenes.top_mut() {
            let transition = scene.update(dt)?;
            self.scenes.apply(transition)?;
        }

        if let Some(scene) = self.scenes.top() {
            scene.draw(canvas);
        }

        self.frame += 1;
        Ok(!self.is_finished())
    }

    /// Runs frames until the stack is done or the frame limit is hit.
    /// Returns the number of frames run.
    ///
    /// # Errors
    ///
    /// [`SimError::Config`] for an unusable tick rate before any frame
    /// runs, otherwise the first failing frame.
    pub fn run(&mut self, canvas: &mut dyn Canvas) -> Result<u64, SimError> {
        self.config.validate()?;
        let budget = Duration::try_from_secs_f64(self.config.frame_time())
            .map_err(|e| SimError::Config(format!("tick_rate {} gives no usable frame time: {e}", self.config.tick_rate)))?;
        info!(
            tick_rate = self.config.tick_rate,
            max_frames = self.config.max_frames,
            realtime = self.config.realtime,
            "starting frame loop"
        );

        loop {
            let start = Instant::now();
            let more = self.step(canvas)?;
            if !more {
                info!(frames = self.frame, "scene stack finished");
                break;
            }
            if self.config.max_frames > 0 && self.frame >= self.config.max_frames {
                info!(frames = self.frame, "frame limit reached");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed > budget {
                warn!(
                    frame = self.frame,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = budget.as_millis() as u64,
                    "frame exceeded time budget"
                );
            } else if self.config.realtime {
                std::thread::sleep(budget - elapsed);
            }
        }
        Ok(self.frame)
    }
}

impl<I> fmt::Debug for FrameLoop<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameLoop")
            .field("frame", &self.frame)
            .field("config", &self.config)
            .field("scenes", &self.scenes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use arena_component::{Flip, SpriteHandle};
    use arena_math::Vec2;

    use super::*;
    use crate::input::{Key, ScriptedEvent, ScriptedInput};

    type Log = Rc<RefCell<Vec<String>>>;

    #[derive(Default)]
    struct NullCanvas {
        draws: usize,
    }

    impl Canvas for NullCanvas {
        fn set_camera(&mut self, _offset: Vec2) {}

        fn draw_sprite(&mut self, _: &SpriteHandle, _: u32, _: Vec2, _: Vec2, _: Flip) {
            self.draws += 1;
        }

        fn draw_rect(&mut self, _: Vec2, _: Vec2, _: [u8; 4]) {}
    }

    /// Logs its lifecycle; pops itself after `frames` updates and quits on
    /// Escape.
    struct Probe {
        name: &'static str,
        frames: u32,
        log: Log,
    }

    impl Scene for Probe {
        fn name(&self) -> &'static str {
            self.name
        }

        fn enter(&mut self) -> Result<(), SimError> {
            self.log.borrow_mut().push(format!("{} enter", self.name));
            Ok(())
        }

        fn exit(&mut self) {
            self.log.borrow_mut().push(format!("{} exit", self.name));
        }

        fn pause(&mut self) {
            self.log.borrow_mut().push(format!("{} pause", self.name));
        }

        fn resume(&mut self) {
            self.log.borrow_mut().push(format!("{} resume", self.name));
        }

        fn handle_event(&mut self, event: &KeyEvent) -> Result<Transition, SimError> {
            if event.key == Key::Escape {
                return Ok(Transition::Quit);
            }
            Ok(Transition::None)
        }

        fn update(&mut self, _dt: f32) -> Result<Transition, SimError> {
            self.frames = self.frames.saturating_sub(1);
            Ok(if self.frames == 0 { Transition::Pop } else { Transition::None })
        }

        fn draw(&self, canvas: &mut dyn Canvas) {
            canvas.draw_sprite(&SpriteHandle::new(self.name, 1.0, 1.0, 1), 0, Vec2::ZERO, Vec2::ONE, Flip::None);
        }
    }

    fn probe(name: &'static str, frames: u32, log: &Log) -> Box<dyn Scene> {
        Box::new(Probe {
            name,
            frames,
            log: log.clone(),
        })
    }

    #[test]
    fn test_push_pauses_and_pop_resumes() {
        let log = Log::default();
        let mut stack = SceneStack::new();
        stack.push(probe("play", 10, &log)).expect("enter");
        stack.apply(Transition::Push(probe("pause", 10, &log))).expect("enter");
        assert_eq!(stack.len(), 2);
        stack.apply(Transition::Pop).expect("pop");
        assert_eq!(stack.top().map(|s| s.name()), Some("play"));
        assert_eq!(*log.borrow(), vec!["play enter", "play pause", "pause enter", "pause exit", "play resume"]);
    }

    #[test]
    fn test_change_replaces_top() {
        let log = Log::default();
        let mut stack = SceneStack::new();
        stack.push(probe("title", 10, &log)).expect("enter");
        stack.apply(Transition::Change(probe("play", 10, &log))).expect("enter");
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.top().map(|s| s.name()), Some("play"));
        assert_eq!(*log.borrow(), vec!["title enter", "title exit", "play enter"]);
    }

    #[test]
    fn test_loop_runs_until_scene_pops() {
        let log = Log::default();
        let mut frame_loop = FrameLoop::new(FrameConfig::default(), ScriptedInput::default());
        frame_loop.scenes_mut().push(probe("play", 3, &log)).expect("enter");
        let mut canvas = NullCanvas::default();
        assert_eq!(frame_loop.run(&mut canvas).expect("run"), 3);
        // The popping frame draws nothing.
        assert_eq!(canvas.draws, 2);
        assert!(frame_loop.is_finished());
    }

    #[test]
    fn test_loop_honours_frame_limit() {
        let log = Log::default();
        let config = FrameConfig {
            max_frames: 5,
            ..FrameConfig::default()
        };
        let mut frame_loop = FrameLoop::new(config, ScriptedInput::default());
        frame_loop.scenes_mut().push(probe("play", 100, &log)).expect("enter");
        let mut canvas = NullCanvas::default();
        assert_eq!(frame_loop.run(&mut canvas).expect("run"), 5);
        assert!(!frame_loop.is_finished());
    }

    #[test]
    fn test_escape_quits_before_update() {
        let log = Log::default();
        let input = ScriptedInput::new(vec![ScriptedEvent {
            frame: 1,
            key: Key::Escape,
            pressed: true,
        }]);
        let mut frame_loop = FrameLoop::new(FrameConfig::default(), input);
        frame_loop.scenes_mut().push(probe("play", 100, &log)).expect("enter");
        let mut canvas = NullCanvas::default();
        assert_eq!(frame_loop.run(&mut canvas).expect("run"), 2);
        assert_eq!(canvas.draws, 1);
        assert!(frame_loop.scenes().quit_requested());
    }

    #[test]
    fn test_unusable_tick_rate_is_rejected() {
        for tick_rate in [0.0, -30.0, f64::NAN, f64::INFINITY] {
            let log = Log::default();
            let config = FrameConfig {
                tick_rate,
                max_frames: 1,
                realtime: false,
            };
            let mut frame_loop = FrameLoop::new(config, ScriptedInput::default());
            frame_loop.scenes_mut().push(probe("play", 10, &log)).expect("enter");
            let mut canvas = NullCanvas::default();
            assert!(matches!(frame_loop.run(&mut canvas), Err(SimError::Config(_))));
            assert!(matches!(frame_loop.step(&mut canvas), Err(SimError::Config(_))));
            assert_eq!(frame_loop.frame(), 0);
            assert_eq!(canvas.draws, 0);
        }
    }

    #[test]
    fn test_frame_config_from_sim_config() {
        let sim = SimConfig {
            tick_rate: 30.0,
            max_frames: 90,
            ..SimConfig::default()
        };
        let config = FrameConfig::from(&sim);
        assert_eq!(config.tick_rate, 30.0);
        assert_eq!(config.max_frames, 90);
        assert!(!config.realtime);
    }
}
