//! Stage definitions.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SimError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonsterSpawn {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    pub id: u32,
    /// Sprite key of the backdrop.
    pub background: String,
    pub monsters: Vec<MonsterSpawn>,
}

impl StageDefinition {
    /// Monsters the stage spawns in total.
    #[must_use]
    pub fn monster_count(&self) -> u32 {
        self.monsters.iter().map(|m| m.count).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StageCatalog {
    stages: BTreeMap<u32, StageDefinition>,
}

impl StageCatalog {
    /// The two stages of the base game.
    #[must_use]
    pub fn builtin() -> Self {
        let spawn = |kind: &str, count| MonsterSpawn {
            kind: kind.to_string(),
            count,
        };
        Self::from_stages(vec![
            StageDefinition {
                id: 1,
                background: "bg1".into(),
                monsters: vec![spawn("SlimeKing", 1), spawn("Slime", 5)],
            },
            StageDefinition {
                id: 2,
                background: "bg2".into(),
                monsters: vec![spawn("Goblin", 3), spawn("GoblinArcher", 2), spawn("GoblinKing", 1)],
            },
        ])
    }

    /// Later definitions with the same id win.
    #[must_use]
    pub fn from_stages(stages: Vec<StageDefinition>) -> Self {
        Self {
            stages: stages.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    /// # Errors
    ///
    /// [`SimError::Json`] for anything but an array of stage objects.
    pub fn from_json(text: &str) -> Result<Self, SimError> {
        Ok(Self::from_stages(serde_json::from_str(text)?))
    }

    /// # Errors
    ///
    /// I/O failures and everything [`StageCatalog::from_json`] reports.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// # Errors
    ///
    /// [`SimError::UnknownStage`] if no stage has this id.
    pub fn get(&self, id: u32) -> Result<&StageDefinition, SimError> {
        self.stages.get(&id).ok_or(SimError::UnknownStage(id))
    }

    /// Stage ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.stages.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_stages() {
        let catalog = StageCatalog::builtin();
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec![1, 2]);
        let first = catalog.get(1).expect("stage 1");
        assert_eq!(first.background, "bg1");
        assert_eq!(first.monster_count(), 6);
        assert_eq!(catalog.get(2).map(StageDefinition::monster_count).ok(), Some(6));
    }

    #[test]
    fn test_from_json_uses_type_key() {
        let catalog = StageCatalog::from_json(
            r#"[{ "id": 3, "background": "bg1", "monsters": [{ "type": "Slime", "count": 2 }] }]"#,
        )
        .expect("valid stages");
        let stage = catalog.get(3).expect("stage 3");
        assert_eq!(stage.monsters[0].kind, "Slime");
        assert_eq!(stage.monster_count(), 2);
    }

    #[test]
    fn test_unknown_stage() {
        let catalog = StageCatalog::builtin();
        assert!(matches!(catalog.get(9), Err(SimError::UnknownStage(9))));
    }
}
