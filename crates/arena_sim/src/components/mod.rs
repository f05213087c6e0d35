//! Concrete components.
//!
//! Each file holds one concern. Cross-object interactions go through free
//! functions ([`combat::deal_damage`], [`state::send_event`]) so the rules
//! about invincibility and death transitions live in one place.

pub mod attack;
pub mod brain;
pub mod collision;
pub mod combat;
pub mod control;
pub mod hud;
pub mod movement;
pub mod perception;
pub mod projectile;
pub mod skill;
pub mod sprite;
pub mod state;
pub mod stats;

pub use attack::{ContactDamage, MeleeAttack};
pub use brain::{BehaviorComponent, MonsterTag};
pub use collision::{CollisionComponent, CollisionGroup, group_of, hit_box};
pub use combat::{CombatComponent, DamageOutcome, deal_damage, is_alive};
pub use control::{InputComponent, dispatch_key};
pub use hud::HudComponent;
pub use movement::{MotionMode, MovementComponent};
pub use perception::{PerceptionComponent, living_target, target_distance};
pub use projectile::ProjectileComponent;
pub use skill::FireballSkill;
pub use sprite::{AnimationComponent, SpriteComponent};
pub use state::{ActorMachine, ActorStateMachine, StateEvent, current_state, send_event};
pub use stats::PlayerStats;
