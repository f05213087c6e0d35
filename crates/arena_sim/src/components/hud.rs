//! Health and mana bars drawn above an actor.

use arena_component::{Canvas, Component, GameObject};
use arena_math::{Transform2D, Vec2};

use super::combat::CombatComponent;
use super::stats::PlayerStats;

const BAR_BACK: [u8; 4] = [40, 40, 40, 200];
const HP_FILL: [u8; 4] = [200, 30, 30, 255];
const MP_FILL: [u8; 4] = [40, 90, 220, 255];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudComponent {
    pub bar_size: Vec2,
    /// Gap between the top of the owner and the first bar.
    pub gap: f32,
}

impl Default for HudComponent {
    fn default() -> Self {
        Self {
            bar_size: Vec2::new(50.0, 6.0),
            gap: 8.0,
        }
    }
}

impl HudComponent {
    fn bar(&self, canvas: &mut dyn Canvas, left: Vec2, ratio: f32, fill: [u8; 4]) {
        canvas.draw_rect(left, left + self.bar_size, BAR_BACK);
        let width = self.bar_size.x * ratio.clamp(0.0, 1.0);
        if width > 0.0 {
            canvas.draw_rect(left, left + Vec2::new(width, self.bar_size.y), fill);
        }
    }
}

impl Component for HudComponent {
    fn type_name() -> &'static str {
        "Hud"
    }

    fn draw(&self, owner: &GameObject, canvas: &mut dyn Canvas) {
        let Some(transform) = owner.get::<Transform2D>() else {
            return;
        };
        let top = transform.position.y + transform.size.y / 2.0 + self.gap;
        let left = Vec2::new(transform.position.x - self.bar_size.x / 2.0, top);
        if let Some(combat) = owner.get::<CombatComponent>() {
            self.bar(canvas, left + Vec2::new(0.0, self.bar_size.y + 2.0), combat.ratio(), HP_FILL);
        }
        if let Some(stats) = owner.get::<PlayerStats>() {
            self.bar(canvas, left, stats.mp_ratio(), MP_FILL);
        }
    }
}

#[cfg(test)]
mod tests {
    use arena_component::{Flip, SpriteHandle};

    use super::*;

    #[derive(Default)]
    struct Rects(Vec<(Vec2, Vec2, [u8; 4])>);

    impl Canvas for Rects {
        fn set_camera(&mut self, _offset: Vec2) {}

        fn draw_sprite(&mut self, _: &SpriteHandle, _: u32, _: Vec2, _: Vec2, _: Flip) {}

        fn draw_rect(&mut self, min: Vec2, max: Vec2, color: [u8; 4]) {
            self.0.push((min, max, color));
        }
    }

    #[test]
    fn test_hp_bar_scales_with_health() {
        let mut player = GameObject::new("player")
            .attach(Transform2D::new(Vec2::new(100.0, 100.0), Vec2::new(32.0, 64.0)))
            .and_then(|o| o.attach(CombatComponent::new(100.0)))
            .and_then(|o| o.attach(HudComponent::default()))
            .expect("distinct components");
        if let Some(combat) = player.get_mut::<CombatComponent>() {
            combat.take_damage(50.0);
        }
        let mut canvas = Rects::default();
        player.draw(&mut canvas);
        assert_eq!(canvas.0.len(), 2);
        let (min, max, color) = canvas.0[1];
        assert_eq!(color, HP_FILL);
        assert_eq!(max.x - min.x, 25.0);
    }
}
