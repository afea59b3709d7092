use std::collections::HashMap;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use super::level::PowerLevel;
use crate::config::PowerConfig;
use crate::engine::Event;

/// Serializable view of the power state at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerSnapshot {
    pub power: f64,
    pub has_power: bool,
    pub lights: HashMap<String, bool>,
}

/// Sole authority over the house power level and every light's on/off flag.
///
/// Turning a light on debits a fixed cost; turning it off never credits it
/// back. Only [`reset`](Self::reset) restores power.
#[derive(Debug)]
pub struct PowerState {
    level: PowerLevel,
    cost_per_toggle: f64,
    /// Absence means the light has never been toggled, which is distinct from `false`.
    lights: HashMap<String, bool>,
    events: broadcast::Sender<Event>,
}

impl PowerState {
    pub fn new(config: &PowerConfig, events: broadcast::Sender<Event>) -> Self {
        Self {
            level: PowerLevel::from_config(config),
            cost_per_toggle: config.cost_per_toggle,
            lights: HashMap::new(),
            events,
        }
    }

    pub fn power(&self) -> f64 {
        self.level.power()
    }

    pub fn cost_per_toggle(&self) -> f64 {
        self.cost_per_toggle
    }

    /// Force the power level, clamped into `[floor, start]`. Not broadcast.
    pub fn set_power(&mut self, value: f64) {
        self.level.set(value);
    }

    pub fn has_power(&self) -> bool {
        self.level.has_power()
    }

    /// Soft drain; see [`PowerLevel::consume`]. Not broadcast.
    pub fn consume_power(&mut self, amount: f64) -> bool {
        self.level.consume(amount)
    }

    /// Hard drain; see [`PowerLevel::deduct`]. Broadcasts the new level on success.
    pub fn deduct_power(&mut self, amount: f64) -> bool {
        if !self.level.deduct(amount) {
            return false;
        }
        self.broadcast(Event::PowerChanged {
            power: self.level.power(),
        });
        true
    }

    pub fn light_state(&self, light_id: &str) -> Option<bool> {
        self.lights.get(light_id).copied()
    }

    /// Unconditional write with no power interaction.
    pub fn set_light_state(&mut self, light_id: &str, on: bool) {
        self.lights.insert(light_id.to_string(), on);
    }

    /// Flip a light. Turning on costs `cost_per_toggle` and fails without
    /// enough power; turning off is free and always succeeds.
    pub fn toggle_light(&mut self, light_id: &str) -> bool {
        let is_on = self.light_state(light_id).unwrap_or(false);

        if is_on {
            self.set_light_state(light_id, false);
            self.broadcast(Event::LightToggled {
                light_id: light_id.to_string(),
                on: false,
            });
            return true;
        }

        if !self.has_power() {
            debug!("Cannot turn on {}: no power left", light_id);
            return false;
        }

        if !self.deduct_power(self.cost_per_toggle) {
            debug!(
                "Cannot turn on {}: {} power left, {} needed",
                light_id,
                self.power(),
                self.cost_per_toggle
            );
            return false;
        }

        self.set_light_state(light_id, true);
        self.broadcast(Event::LightToggled {
            light_id: light_id.to_string(),
            on: true,
        });
        true
    }

    /// Copy of the light registry. Changes to it never reach the state.
    pub fn all_light_states(&self) -> HashMap<String, bool> {
        self.lights.clone()
    }

    pub fn snapshot(&self) -> PowerSnapshot {
        PowerSnapshot {
            power: self.power(),
            has_power: self.has_power(),
            lights: self.all_light_states(),
        }
    }

    /// Back to full power with every light forgotten.
    pub fn reset(&mut self) {
        self.level.reset();
        self.lights.clear();
    }

    pub(crate) fn broadcast(&self, event: Event) {
        // Sending with no subscribers is not an error.
        let _ = self.events.send(event);
    }
}
