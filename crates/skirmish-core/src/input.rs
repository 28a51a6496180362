//! Player input: discrete actions and the per-player controller state.
//!
//! Input arrives as [`InputAction`]s queued on the simulation between ticks.
//! Axis and trigger actions update held state that persists until changed;
//! button actions set an edge flag that lives for exactly one tick.

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A single input action addressed to the player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum InputAction {
    /// Movement axes: x strafes right, y walks forward. Held until changed.
    Move(Vec2),
    /// Look delta per second: x turns right, y looks up. Held until changed.
    Look(Vec2),
    /// Jump button
    Jump,
    /// Trigger pressed
    ShootPressed,
    /// Trigger released
    ShootReleased,
    /// Reload button
    Reload,
    /// Interact (pick up) button
    Interact,
    /// Drop weapon button
    Drop,
}

bitflags! {
    /// Buttons pressed during the current tick.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct InputEdges: u8 {
        /// Jump was pressed
        const JUMP = 1 << 0;
        /// Reload was pressed
        const RELOAD = 1 << 1;
        /// Interact was pressed
        const INTERACT = 1 << 2;
        /// Drop was pressed
        const DROP = 1 << 3;
    }
}

/// Controller state of one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    /// Movement axes, each clamped to `[-1, 1]`
    pub move_input: Vec2,
    /// Look axes
    pub look_input: Vec2,
    /// Whether the trigger is held
    pub trigger_held: bool,
    /// Buttons pressed this tick
    pub edges: InputEdges,
}

impl ControllerState {
    /// Folds one action into the controller.
    pub fn apply(&mut self, action: InputAction) {
        match action {
            InputAction::Move(axes) => {
                self.move_input = axes.clamp(Vec2::NEG_ONE, Vec2::ONE);
            }
            InputAction::Look(delta) => self.look_input = delta,
            InputAction::ShootPressed => self.trigger_held = true,
            InputAction::ShootReleased => self.trigger_held = false,
            InputAction::Jump => self.edges.insert(InputEdges::JUMP),
            InputAction::Reload => self.edges.insert(InputEdges::RELOAD),
            InputAction::Interact => self.edges.insert(InputEdges::INTERACT),
            InputAction::Drop => self.edges.insert(InputEdges::DROP),
        }
    }

    /// True if `edge` was pressed this tick.
    #[must_use]
    pub const fn pressed(&self, edge: InputEdges) -> bool {
        self.edges.contains(edge)
    }

    /// Clears the one-tick button edges.
    pub fn clear_edges(&mut self) {
        self.edges = InputEdges::empty();
    }
}
