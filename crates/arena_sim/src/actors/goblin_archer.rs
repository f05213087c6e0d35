//! Goblin archer: patrols like a goblin but keeps its distance and looses
//! an arrow at the player instead of charging.

use arena_behavior::{BehaviorTree, Node, Status};
use arena_component::{Component, ComponentError, GameObject, SpriteHandle};
use arena_math::{Transform2D, Vec2};
use tracing::trace;

use super::goblin::{Patrol, Stance, attack_frame};
use super::{check, position, projectiles, random_point, random_side, set_frame, think};
use crate::components::perception::living_target;
use crate::components::{
    BehaviorComponent, CollisionComponent, CollisionGroup, CombatComponent, HudComponent, MonsterTag,
    MovementComponent, PerceptionComponent, SpriteComponent,
};
use crate::error::SimError;
use crate::registry::SpawnContext;
use crate::world::ACTOR_DEPTH;

pub const KIND: &str = "GoblinArcher";

const SCALE: f32 = 2.0;
const HP: f32 = 24.0;
const SPEED: f32 = 80.0;
const BODY_INSET: f32 = 8.0;

const PATROL_RADIUS: f32 = 160.0;
const DETECTION_RANGE: f32 = 320.0;

const PREPARE_FRAME: u32 = 3;
const PREPARE_TIME: f32 = 1.0;
const ATTACK_ANIM: f32 = 0.45;
const FIRE_AT: f32 = 0.2;
const ATTACK_COOLDOWN: f32 = 2.2;
const MUZZLE: f32 = 0.4;

#[derive(Debug, Clone, PartialEq)]
pub struct ArcherBrain {
    patrol: Patrol,
    stance: Stance,
    timer: f32,
    cooldown: f32,
    fired: bool,
    arrow: SpriteHandle,
}

impl ArcherBrain {
    /// Brain that starts patrolling with an arrow sheet to shoot.
    #[must_use]
    pub fn new(patrol: Patrol, arrow: SpriteHandle) -> Self {
        Self {
            patrol,
            stance: Stance::Patrol,
            timer: 0.0,
            cooldown: ATTACK_COOLDOWN,
            fired: false,
            arrow,
        }
    }

    /// Current attack phase.
    #[must_use]
    pub fn stance(&self) -> Stance {
        self.stance
    }

    fn is_attacking(&self, _owner: &GameObject) -> bool {
        self.stance != Stance::Patrol
    }

    fn can_start_attack(&self, owner: &GameObject) -> bool {
        self.stance == Stance::Patrol
            && self.cooldown >= ATTACK_COOLDOWN
            && owner
                .get::<PerceptionComponent>()
                .and_then(|p| p.sense(owner))
                .is_some()
    }

    fn begin_prepare(&mut self, owner: &mut GameObject) -> Status {
        let dx = living_target(owner).map_or(0.0, |t| t.position.x - position(owner).x);
        self.patrol.halt(owner, dx);
        self.stance = Stance::Prepare;
        self.timer = 0.0;
        set_frame(owner, PREPARE_FRAME);
        Status::Running
    }

    /// Queues an arrow aimed at the target, or straight ahead without one.
    fn fire(&mut self, owner: &mut GameObject) {
        let from = position(owner);
        let aim = living_target(owner).map_or(Vec2::new(self.patrol.dir, 0.0), |t| t.position - from);
        let width = owner.get::<Transform2D>().map_or(0.0, |t| t.size.x);
        let at = from + Vec2::new(self.patrol.dir * width * MUZZLE, 0.0);
        let sprite = self.arrow.clone();
        trace!(archer = %owner.id(), ?aim, "arrow loosed");
        owner.defer(Box::new(move |owner| {
            let shot = projectiles::arrow(sprite, at, aim)?;
            owner.spawn(ACTOR_DEPTH, shot);
            Ok(())
        }));
        self.fired = true;
    }

    fn run_attack(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        match self.stance {
            Stance::Prepare => {
                self.timer += dt;
                if self.timer >= PREPARE_TIME {
                    self.stance = Stance::Attack;
                    self.timer = 0.0;
                    self.cooldown = 0.0;
                    self.fired = false;
                }
                Status::Running
            }
            Stance::Attack => {
                self.timer += dt;
                set_frame(owner, attack_frame(self.timer, ATTACK_ANIM));
                if !self.fired && self.timer >= FIRE_AT {
                    self.fire(owner);
                }
                if self.timer >= ATTACK_ANIM {
                    self.stance = Stance::Cooldown;
                    set_frame(owner, 0);
                }
                Status::Running
            }
            Stance::Cooldown => {
                self.cooldown += dt;
                if self.cooldown < ATTACK_COOLDOWN {
                    return Status::Running;
                }
                self.stance = Stance::Patrol;
                set_frame(owner, 0);
                Status::Success
            }
            Stance::Patrol => Status::Fail,
        }
    }

    fn patrol(&mut self, owner: &mut GameObject) -> Status {
        let dt = owner.frame().dt;
        self.cooldown = (self.cooldown + dt).min(ATTACK_COOLDOWN);
        self.patrol.tick(owner, dt);
        Status::Success
    }
}

impl Component for ArcherBrain {
    fn type_name() -> &'static str {
        "ArcherBrain"
    }
}

fn tree() -> BehaviorTree<GameObject> {
    BehaviorTree::new(
        KIND,
        Node::selector(
            "GoblinArcherSelector",
            vec![
                Node::sequence(
                    "HandleAttack",
                    vec![
                        Node::condition("IsAttacking", check::<ArcherBrain>(ArcherBrain::is_attacking)),
                        Node::action("RunAttack", think::<ArcherBrain>(ArcherBrain::run_attack)),
                    ],
                ),
                Node::sequence(
                    "StartAttack",
                    vec![
                        Node::condition("CanStartAttack", check::<ArcherBrain>(ArcherBrain::can_start_attack)),
                        Node::action("BeginPrepare", think::<ArcherBrain>(ArcherBrain::begin_prepare)),
                    ],
                ),
                Node::action("Patrol", think::<ArcherBrain>(ArcherBrain::patrol)),
            ],
        ),
    )
}

fn assemble(sheet: SpriteHandle, arrow: SpriteHandle, at: Vec2, dir: f32) -> Result<GameObject, ComponentError> {
    let size = sheet.frame_size() * SCALE;
    let mut movement = MovementComponent::new(SPEED);
    movement.face_toward(dir);
    GameObject::new(KIND)
        .attach(MonsterTag::new(KIND))?
        .attach(Transform2D::new(at, size))?
        .attach(SpriteComponent::new(sheet))?
        .attach(
            CollisionComponent::new(CollisionGroup::MONSTER, CollisionGroup::PLAYER | CollisionGroup::PROJECTILE)
                .with_size(size - Vec2::splat(BODY_INSET)),
        )?
        .attach(CombatComponent::new(HP))?
        .attach(movement)?
        .attach(PerceptionComponent::new(DETECTION_RANGE))?
        .attach(HudComponent::default())?
        .attach(ArcherBrain::new(Patrol::around(at.x, PATROL_RADIUS, dir), arrow))?
        .attach(BehaviorComponent::new(tree()))
}

/// # Errors
///
/// [`SimError::Resource`] when the archer or arrow sheet is missing.
pub fn spawn(ctx: &mut SpawnContext<'_>) -> Result<GameObject, SimError> {
    let sheet = ctx.sprites.sprite("goblin_archer")?;
    let arrow = ctx.sprites.sprite("arrow")?;
    let at = random_point(&mut ctx.rng, 140.0..=ctx.arena.x - 140.0, 140.0..=420.0);
    let dir = random_side(&mut ctx.rng);
    Ok(assemble(sheet, arrow, at, dir)?)
}

#[cfg(test)]
mod tests {
    use arena_component::{Entity, WorldRequest};

    use super::*;
    use crate::actors::testing::{step, target_at};

    fn archer(at: Vec2) -> GameObject {
        let mut obj = assemble(
            SpriteHandle::new("goblin_archer", 26.0, 33.0, 7),
            SpriteHandle::new("arrow", 40.0, 10.0, 1),
            at,
            -1.0,
        )
        .expect("archer");
        obj.bind(Entity::from_raw(12));
        obj
    }

    fn stance(obj: &GameObject) -> Option<Stance> {
        obj.get::<ArcherBrain>().map(ArcherBrain::stance)
    }

    fn spawned(obj: &mut GameObject) -> Vec<(usize, GameObject)> {
        obj.drain_requests()
            .into_iter()
            .filter_map(|r| match r {
                WorldRequest::Spawn { depth, object } => Some((depth, *object)),
                WorldRequest::Sweep(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_looses_one_arrow_per_attack() {
        let target = Some(target_at(Vec2::new(700.0, 300.0)));
        let mut obj = archer(Vec2::new(500.0, 300.0));
        step(&mut obj, 0.125, target, 1);
        assert_eq!(stance(&obj), Some(Stance::Prepare));
        assert_eq!(position(&obj), Vec2::new(500.0, 300.0));

        step(&mut obj, 0.125, target, 9);
        assert_eq!(stance(&obj), Some(Stance::Attack));
        assert!(spawned(&mut obj).is_empty());

        step(&mut obj, 0.125, target, 1);
        let shots = spawned(&mut obj);
        assert_eq!(shots.len(), 1);
        let (depth, arrow) = &shots[0];
        assert_eq!(*depth, ACTOR_DEPTH);
        assert_eq!(arrow.label(), "Arrow");
        assert!((position(arrow) - Vec2::new(520.8, 300.0)).length() < 1e-3);
        assert_eq!(arrow.get::<MovementComponent>().map(|m| m.dir), Some(Vec2::X));

        step(&mut obj, 0.125, target, 2);
        assert_eq!(stance(&obj), Some(Stance::Cooldown));
        assert!(spawned(&mut obj).is_empty());
        assert_eq!(obj.get::<SpriteComponent>().map(|s| s.frame), Some(0));
    }

    #[test]
    fn test_ignores_target_out_of_range() {
        let target = Some(target_at(Vec2::new(900.0, 300.0)));
        let mut obj = archer(Vec2::new(500.0, 300.0));
        step(&mut obj, 0.125, target, 12);
        assert_eq!(stance(&obj), Some(Stance::Patrol));
        assert!(spawned(&mut obj).is_empty());
        assert!(position(&obj).x < 500.0);
    }

    #[test]
    fn test_spawn_within_band() {
        let atlas = crate::assets::SpriteAtlas::builtin();
        let mut ctx = crate::actors::testing::context(&atlas, 4);
        for _ in 0..20 {
            let obj = spawn(&mut ctx).expect("spawn");
            let at = position(&obj);
            assert!((140.0..=1460.0).contains(&at.x));
            assert!((140.0..=420.0).contains(&at.y));
        }
    }
}
