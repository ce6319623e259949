//! Pointer interactions turned into per-frame force fields

use crate::physics::ForceField;
use serde::{Deserialize, Serialize};

/// Supplies transient forces, polled once per frame
pub trait InputSource {
    /// Forces active this frame. `delta_ms` is the frame delta, used to
    /// expire timed interactions.
    fn forces(&mut self, delta_ms: f32) -> Vec<ForceField>;
}

/// A source that never produces forces
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn forces(&mut self, _delta_ms: f32) -> Vec<ForceField> {
        Vec::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Radii and strengths (px/s²) for pointer interactions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    pub attraction_radius: f32,
    pub attraction_strength: f32,
    pub repulsion_radius: f32,
    pub repulsion_strength: f32,
    /// Vortex strength per wheel notch; sign follows scroll direction
    pub wheel_strength: f32,
    pub wheel_lifetime_ms: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            attraction_radius: 100.0,
            attraction_strength: 500.0,
            repulsion_radius: 80.0,
            repulsion_strength: 800.0,
            wheel_strength: 2000.0,
            wheel_lifetime_ms: 100.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Interaction {
    id: String,
    field: ForceField,
    /// Remaining lifetime for timed interactions
    ttl_ms: Option<f32>,
}

/// Mouse, touch and wheel interactions keyed by id (`mouse`, `touch_<n>`, `wheel`)
#[derive(Debug, Clone, Default)]
pub struct PointerInput {
    pub config: PointerConfig,
    interactions: Vec<Interaction>,
    pointer: (f32, f32),
    pressed: bool,
}

impl PointerInput {
    pub fn new(config: PointerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Primary attracts, secondary repels
    pub fn press(&mut self, x: f32, y: f32, button: PointerButton) {
        self.pointer = (x, y);
        self.pressed = true;
        let field = match button {
            PointerButton::Primary => ForceField::attraction(
                x,
                y,
                self.config.attraction_strength,
                self.config.attraction_radius,
            ),
            PointerButton::Secondary => ForceField::repulsion(
                x,
                y,
                self.config.repulsion_strength,
                self.config.repulsion_radius,
            ),
        };
        self.insert("mouse".to_string(), field, None);
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.pointer = (x, y);
        if self.pressed {
            self.reposition("mouse", x, y);
        }
    }

    pub fn release(&mut self) {
        self.pressed = false;
        self.remove("mouse");
    }

    pub fn touch_start(&mut self, touch: u64, x: f32, y: f32) {
        let field = ForceField::attraction(
            x,
            y,
            self.config.attraction_strength,
            self.config.attraction_radius,
        );
        self.insert(format!("touch_{touch}"), field, None);
    }

    pub fn touch_move(&mut self, touch: u64, x: f32, y: f32) {
        self.reposition(&format!("touch_{touch}"), x, y);
    }

    pub fn touch_end(&mut self, touch: u64) {
        self.remove(&format!("touch_{touch}"));
    }

    /// Short-lived vortex at the pointer. Positive `delta_y` (scroll down)
    /// spins clockwise.
    pub fn wheel(&mut self, delta_y: f32) {
        let sign = if delta_y > 0.0 { -1.0 } else { 1.0 };
        let field = ForceField::vortex(
            self.pointer.0,
            self.pointer.1,
            self.config.wheel_strength * sign,
            self.config.attraction_radius * 2.0,
        );
        let ttl = self.config.wheel_lifetime_ms;
        self.insert("wheel".to_string(), field, Some(ttl));
    }

    pub fn clear(&mut self) {
        self.interactions.clear();
        self.pressed = false;
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    fn insert(&mut self, id: String, field: ForceField, ttl_ms: Option<f32>) {
        self.remove(&id);
        self.interactions.push(Interaction { id, field, ttl_ms });
    }

    fn reposition(&mut self, id: &str, x: f32, y: f32) {
        if let Some(i) = self.interactions.iter_mut().find(|i| i.id == id) {
            i.field.x = x;
            i.field.y = y;
        }
    }

    fn remove(&mut self, id: &str) {
        self.interactions.retain(|i| i.id != id);
    }
}

impl InputSource for PointerInput {
    fn forces(&mut self, delta_ms: f32) -> Vec<ForceField> {
        for interaction in &mut self.interactions {
            if let Some(ttl) = interaction.ttl_ms.as_mut() {
                *ttl -= delta_ms;
            }
        }
        self.interactions
            .retain(|i| i.ttl_ms.map_or(true, |ttl| ttl > 0.0));
        self.interactions.iter().map(|i| i.field).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ForceKind;

    #[test]
    fn press_buttons_map_to_kinds() {
        let mut input = PointerInput::default();
        input.press(10.0, 20.0, PointerButton::Primary);
        let forces = input.forces(16.0);
        assert_eq!(forces.len(), 1);
        assert_eq!(forces[0].kind, ForceKind::Attraction);
        assert_eq!((forces[0].x, forces[0].y), (10.0, 20.0));

        input.press(10.0, 20.0, PointerButton::Secondary);
        let forces = input.forces(16.0);
        assert_eq!(forces.len(), 1, "same id replaces the previous press");
        assert_eq!(forces[0].kind, ForceKind::Repulsion);
        assert_eq!(forces[0].radius, 80.0);
    }

    #[test]
    fn drag_moves_field_and_release_removes() {
        let mut input = PointerInput::default();
        input.move_to(1.0, 1.0);
        assert!(input.forces(16.0).is_empty());
        input.press(0.0, 0.0, PointerButton::Primary);
        input.move_to(30.0, 40.0);
        assert_eq!(input.forces(16.0)[0].center().x, 30.0);
        input.release();
        assert!(input.forces(16.0).is_empty());
    }

    #[test]
    fn touches_are_independent() {
        let mut input = PointerInput::default();
        input.touch_start(1, 0.0, 0.0);
        input.touch_start(2, 50.0, 50.0);
        input.touch_move(2, 60.0, 60.0);
        assert_eq!(input.interaction_count(), 2);
        input.touch_end(1);
        let forces = input.forces(16.0);
        assert_eq!(forces.len(), 1);
        assert_eq!(forces[0].x, 60.0);
    }

    #[test]
    fn wheel_vortex_expires() {
        let mut input = PointerInput::default();
        input.move_to(5.0, 5.0);
        input.wheel(1.0);
        let forces = input.forces(50.0);
        assert_eq!(forces[0].kind, ForceKind::Vortex);
        assert!(forces[0].strength < 0.0);
        assert_eq!(forces[0].radius, 200.0);
        assert_eq!(input.forces(40.0).len(), 1);
        assert!(input.forces(20.0).is_empty());
    }

    #[test]
    fn wheel_up_spins_counter_clockwise() {
        let mut input = PointerInput::default();
        input.wheel(-3.0);
        assert!(input.forces(0.0)[0].strength > 0.0);
    }
}
