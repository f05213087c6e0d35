//! Built-in sprite atlas.
//!
//! Sheet sizes match the base game art; the headless build never loads the
//! images themselves.

use std::collections::HashMap;

use arena_component::{ResourceError, SpriteHandle, SpriteProvider};

#[derive(Debug, Clone, Default)]
pub struct SpriteAtlas {
    sprites: HashMap<String, SpriteHandle>,
}

impl SpriteAtlas {
    /// An empty atlas; every lookup fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every sheet the game ships with.
    #[must_use]
    pub fn builtin() -> Self {
        let mut atlas = Self::new();
        for (key, width, height, frames) in [
            ("zag", 32.0, 64.0, 2),
            ("slash", 64.0, 64.0, 1),
            ("fireball", 30.0, 30.0, 1),
            ("arrow", 40.0, 10.0, 1),
            ("bomb", 48.0, 48.0, 1),
            ("missile", 64.0, 64.0, 6),
            ("explosion", 48.0, 48.0, 48),
            ("blue_slime", 21.0, 21.0, 6),
            ("goblin", 30.0, 35.0, 7),
            ("goblin_archer", 26.0, 33.0, 7),
            ("slime_king_idle", 32.0, 41.0, 6),
            ("slime_king_attack", 32.0, 41.0, 6),
            ("slime_king_back", 32.0, 41.0, 6),
            ("goblin_king_idle", 47.0, 71.0, 4),
            ("goblin_king_hit", 47.0, 71.0, 1),
            ("goblin_king_backrun", 47.0, 71.0, 5),
            ("goblin_king_attack", 64.0, 64.0, 6),
            ("bg1", 1600.0, 1800.0, 1),
            ("bg2", 1600.0, 1800.0, 1),
        ] {
            atlas.insert(SpriteHandle::new(key, width, height, frames));
        }
        atlas
    }

    /// Adds or replaces a sprite under its own key.
    pub fn insert(&mut self, sprite: SpriteHandle) {
        self.sprites.insert(sprite.key.clone(), sprite);
    }

    /// Number of known sheets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    /// `true` for an atlas with no sheets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl SpriteProvider for SpriteAtlas {
    fn sprite(&self, key: &str) -> Result<SpriteHandle, ResourceError> {
        self.sprites
            .get(key)
            .cloned()
            .ok_or_else(|| ResourceError::NotFound(key.to_string()))
    }
}
