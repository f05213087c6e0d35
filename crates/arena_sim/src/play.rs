//! The play scene: one stage from spawn to victory or defeat.
//!
//! While the stage runs, every frame is a world update, a camera follow and
//! a collision pass, followed by the outcome check. Once decided, the
//! outcome is reported once, progress is saved, and after the result delay
//! the world is cleared and the scene pops itself.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use arena_component::{Canvas, Entity, SpriteProvider};
use arena_math::{Transform2D, Vec2};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::actors::{background, player};
use crate::camera::Camera;
use crate::components::{PlayerStats, dispatch_key, is_alive};
use crate::config::SimConfig;
use crate::error::SimError;
use crate::input::{Key, KeyEvent};
use crate::progress::ProgressStore;
use crate::registry::{MonsterRegistry, SpawnContext};
use crate::stage::StageDefinition;
use crate::tick::{Scene, Transition};
use crate::world::{ACTOR_DEPTH, BACKGROUND_DEPTH, World};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

pub type OutcomeHook = Box<dyn FnMut(Outcome)>;

pub struct PlayScene {
    stage: StageDefinition,
    config: SimConfig,
    sprites: Rc<dyn SpriteProvider>,
    monsters: Rc<MonsterRegistry>,
    progress: Rc<RefCell<dyn ProgressStore>>,
    world: World,
    camera: Camera,
    rng: SmallRng,
    player: Option<Entity>,
    outcome: Option<Outcome>,
    result_timer: f32,
    on_outcome: Option<OutcomeHook>,
}

impl PlayScene {
    /// Scene for `stage`; nothing is spawned until it is entered.
    #[must_use]
    pub fn new(
        stage: StageDefinition,
        config: SimConfig,
        sprites: Rc<dyn SpriteProvider>,
        monsters: Rc<MonsterRegistry>,
        progress: Rc<RefCell<dyn ProgressStore>>,
    ) -> Self {
        let arena = config.arena_size();
        Self {
            world: World::new(arena),
            camera: Camera::new(config.viewport_size(), arena),
            rng: SmallRng::seed_from_u64(config.seed),
            stage,
            config,
            sprites,
            monsters,
            progress,
            player: None,
            outcome: None,
            result_timer: 0.0,
            on_outcome: None,
        }
    }

    /// Called once when the stage is won or lost.
    #[must_use]
    pub fn with_outcome_hook(mut self, hook: impl FnMut(Outcome) + 'static) -> Self {
        self.on_outcome = Some(Box::new(hook));
        self
    }

    /// The stage's object registry.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the stage's registry.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The player's id once the stage is built.
    #[must_use]
    pub fn player(&self) -> Option<Entity> {
        self.player
    }

    /// Victory or defeat, once decided.
    #[must_use]
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Camera following the player.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    fn spawn_monsters(&mut self) -> Result<u32, SimError> {
        let arena = self.world.arena();
        let mut spawned = 0;
        for entry in &self.stage.monsters {
            for _ in 0..entry.count {
                let mut ctx = SpawnContext {
                    sprites: self.sprites.as_ref(),
                    rng: SmallRng::seed_from_u64(self.rng.r#gen()),
                    arena,
                };
                let monster = self.monsters.spawn(&entry.kind, &mut ctx)?;
                self.world.add_object(monster, ACTOR_DEPTH)?;
                spawned += 1;
            }
        }
        Ok(spawned)
    }

    fn player_position(&self) -> Option<Vec2> {
        let player = self.world.get(self.player?)?;
        player.get::<Transform2D>().map(|t| t.position)
    }

    fn player_alive(&self) -> bool {
        self.player.and_then(|id| self.world.get(id)).is_some_and(is_alive)
    }

    fn save_progress(&self) {
        let stats = self
            .player
            .and_then(|id| self.world.get(id))
            .and_then(|p| p.get::<PlayerStats>())
            .map(PlayerStats::progress);
        if let Some(progress) = stats {
            self.progress.borrow_mut().save(progress);
        }
    }

    fn decide(&mut self, outcome: Outcome) {
        info!(stage = self.stage.id, ?outcome, "stage decided");
        self.outcome = Some(outcome);
        self.result_timer = self.config.result_delay;
        self.save_progress();
        if let Some(hook) = self.on_outcome.as_mut() {
            hook(outcome);
        }
    }
}

impl fmt::Debug for PlayScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlayScene")
            .field("stage", &self.stage.id)
            .field("objects", &self.world.len())
            .field("player", &self.player)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

impl Scene for PlayScene {
    fn name(&self) -> &'static str {
        "play"
    }

    fn enter(&mut self) -> Result<(), SimError> {
        self.world.clear();
        self.outcome = None;
        let arena = self.world.arena();

        let backdrop = self.sprites.sprite(&self.stage.background)?;
        self.world.add_object(background(backdrop, arena)?, BACKGROUND_DEPTH)?;

        let progress = self.progress.borrow().load();
        let hero = player::spawn(self.sprites.as_ref(), &self.config, progress)?;
        let id = self.world.add_object(hero, ACTOR_DEPTH)?;
        self.world.set_target(id);
        self.player = Some(id);

        let monsters = self.spawn_monsters()?;
        info!(stage = self.stage.id, monsters, "stage started");
        Ok(())
    }

    fn exit(&mut self) {
        self.world.clear();
        self.player = None;
    }

    fn handle_event(&mut self, event: &KeyEvent) -> Result<Transition, SimError> {
        if event.key == Key::Escape && event.pressed {
            return Ok(Transition::Quit);
        }
        if self.outcome.is_some() {
            return Ok(Transition::None);
        }
        if let Some(player) = self.player.and_then(|id| self.world.get_mut(id)) {
            dispatch_key(player, event)?;
        }
        Ok(Transition::None)
    }

    fn update(&mut self, dt: f32) -> Result<Transition, SimError> {
        if self.outcome.is_some() {
            self.result_timer -= dt;
            if self.result_timer <= 0.0 {
                self.world.clear();
                return Ok(Transition::Pop);
            }
            return Ok(Transition::None);
        }

        self.world.update(dt)?;
        if let Some(focus) = self.player_position() {
            self.camera.follow(focus);
        }
        self.world.handle_collisions()?;

        if !self.player_alive() {
            self.decide(Outcome::Defeat);
        } else if !self.world.has_monsters() {
            self.decide(Outcome::Victory);
        }
        Ok(Transition::None)
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.set_camera(self.camera.offset());
        self.world.draw(canvas);
    }
}
