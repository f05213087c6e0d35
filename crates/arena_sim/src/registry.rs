//! Monster registry: maps stage monster types to constructors.
//!
//! Stage data names monsters by string. The registry resolves each name to
//! a factory that builds a fully wired [`GameObject`]. Registering a name
//! twice replaces the earlier factory.

use std::collections::BTreeMap;
use std::fmt;

use arena_component::{GameObject, SpriteProvider};
use arena_math::Vec2;
use rand::rngs::SmallRng;

use crate::actors::{goblin, goblin_archer, goblin_king, slime, slime_king};
use crate::error::SimError;

/// What a factory gets to build one monster.
pub struct SpawnContext<'a> {
    pub sprites: &'a dyn SpriteProvider,
    /// Private to this monster; seeded from the stage RNG.
    pub rng: SmallRng,
    pub arena: Vec2,
}

impl fmt::Debug for SpawnContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnContext").field("arena", &self.arena).finish_non_exhaustive()
    }
}

pub type MonsterFactory = Box<dyn for<'a> Fn(&mut SpawnContext<'a>) -> Result<GameObject, SimError>>;

#[derive(Default)]
pub struct MonsterRegistry {
    factories: BTreeMap<String, MonsterFactory>,
}

impl MonsterRegistry {
    /// Registry with no monster kinds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every monster of the base game.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(slime::KIND, slime::spawn);
        registry.register(slime_king::KIND, slime_king::spawn);
        registry.register(goblin::KIND, goblin::spawn);
        registry.register(goblin_archer::KIND, goblin_archer::spawn);
        registry.register(goblin_king::KIND, goblin_king::spawn);
        registry
    }

    /// Adds or replaces the factory for `kind`.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: for<'a> Fn(&mut SpawnContext<'a>) -> Result<GameObject, SimError> + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    /// `true` if `kind` can be spawned.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Registered type names in sorted order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> + '_ {
        self.factories.keys().map(String::as_str)
    }

    /// # Errors
    ///
    /// [`SimError::UnknownMonster`] for an unregistered type, otherwise the
    /// factory's own failure.
    pub fn spawn(&self, kind: &str, ctx: &mut SpawnContext<'_>) -> Result<GameObject, SimError> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| SimError::UnknownMonster(kind.to_string()))?;
        factory(ctx)
    }
}

impl fmt::Debug for MonsterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonsterRegistry")
            .field("kinds", &self.kinds().collect::<Vec<_>>())
            .finish()
    }
}
