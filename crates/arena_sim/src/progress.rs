//! Player progress that outlives a stage.
//!
//! Gold and potion counts are loaded into the player when a stage starts and
//! written back when it ends. Where they are kept between stages is up to
//! the [`ProgressStore`]; the simulation ships an in-memory store only.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerProgress {
    pub gold: u32,
    pub hp_potions: u32,
    pub mp_potions: u32,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            gold: 0,
            hp_potions: 3,
            mp_potions: 3,
        }
    }
}

pub trait ProgressStore {
    fn load(&self) -> PlayerProgress;

    fn save(&mut self, progress: PlayerProgress);
}

#[derive(Debug, Clone, Default)]
pub struct MemoryProgress {
    progress: PlayerProgress,
    saves: u32,
}

impl MemoryProgress {
    /// Store holding `progress`, with no saves yet.
    #[must_use]
    pub fn new(progress: PlayerProgress) -> Self {
        Self { progress, saves: 0 }
    }

    /// How many times progress was written.
    #[must_use]
    pub fn saves(&self) -> u32 {
        self.saves
    }
}

impl ProgressStore for MemoryProgress {
    fn load(&self) -> PlayerProgress {
        self.progress
    }

    fn save(&mut self, progress: PlayerProgress) {
        self.progress = progress;
        self.saves += 1;
    }
}
