use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde::Deserialize;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::actuator::Actuator;
use super::event::Event;
use crate::config::PowerConfig;
use crate::power::PowerSnapshot;
use crate::power::PowerState;

/// Capacity of the event broadcast channel
/// Slow subscribers past this many events start lagging rather than blocking the engine
const EVENT_CHANNEL_SIZE: usize = 1024;

/// Inbound light toggle request, as received from a client.
///
/// `light_id` is left untyped; the engine rejects anything that is not a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToggleRequest {
    /// Who asked. Only used for logging.
    #[serde(default)]
    pub requester: String,

    #[serde(default)]
    pub light_id: serde_json::Value,
}

impl ToggleRequest {
    pub fn new(requester: impl Into<String>, light_id: impl Into<serde_json::Value>) -> Self {
        Self {
            requester: requester.into(),
            light_id: light_id.into(),
        }
    }
}

/// What happened to a toggle request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The light was flipped and now has state `on`
    Toggled { light_id: String, on: bool },

    /// A turn-on request arrived with no power left
    Denied { light_id: String },

    /// The toggle did not go through (not enough power to pay the full cost)
    Failed { light_id: String },

    /// The request was malformed and dropped
    Rejected { reason: String },
}

/// fusebox engine
///
/// Owns one session's power state and routes toggle requests through it to
/// the actuator. Every request is handled to completion under the state lock,
/// so the has-power check, the deduction and the actuator call are atomic
/// with respect to other requests.
pub struct Engine {
    state: Mutex<PowerState>,

    /// Applies committed toggles to physical fixtures
    actuator: Arc<dyn Actuator>,

    /// Broadcast side of the event channel, shared with the power state
    events: broadcast::Sender<Event>,
}

impl Engine {
    /// Create a new Engine instance
    pub fn new(config: &PowerConfig, actuator: Arc<dyn Actuator>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        info!(
            "Engine starting: power={}, floor={}, cost_per_toggle={}, actuator={}",
            config.start,
            config.floor,
            config.cost_per_toggle,
            actuator.name()
        );
        Self {
            state: Mutex::new(PowerState::new(config, events.clone())),
            actuator,
            events,
        }
    }

    /// Subscribe to power and light broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, PowerState> {
        // PowerState is never left mid-update, so a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate a toggle request, apply it to the power state and drive the
    /// actuator.
    pub fn handle_toggle_request(&self, request: ToggleRequest) -> ToggleOutcome {
        let Some(light_id) = request.light_id.as_str() else {
            warn!(
                "Rejected toggle from {}: light id must be a string, got {}",
                request.requester, request.light_id
            );
            return ToggleOutcome::Rejected {
                reason: "light_id must be a string".to_string(),
            };
        };
        let light_id = light_id.to_string();

        let mut state = self.lock();
        let was_on = state.light_state(&light_id).unwrap_or(false);

        if !was_on && !state.has_power() {
            info!(
                "Denied toggle of {} from {}: no power left",
                light_id, request.requester
            );
            state.broadcast(Event::LightToggled {
                light_id: light_id.clone(),
                on: false,
            });
            return ToggleOutcome::Denied { light_id };
        }

        if !state.toggle_light(&light_id) {
            info!(
                "Toggle of {} from {} failed: power={}",
                light_id,
                request.requester,
                state.power()
            );
            return ToggleOutcome::Failed { light_id };
        }

        let on = !was_on;
        info!(
            "Light {} -> on={} (requested by {}, power={})",
            light_id,
            on,
            request.requester,
            state.power()
        );

        // The toggle is committed; a missing fixture only means the scene
        // and the logical state disagree.
        match self.actuator.set_enabled(&light_id, on) {
            Ok(count) => debug!("Actuator switched {} emitters for {}", count, light_id),
            Err(e) => warn!("Light {} toggled but not actuated: {}", light_id, e),
        }

        ToggleOutcome::Toggled { light_id, on }
    }

    /// Get a snapshot of the current power state
    pub fn snapshot(&self) -> PowerSnapshot {
        self.lock().snapshot()
    }

    pub fn power(&self) -> f64 {
        self.lock().power()
    }

    pub fn has_power(&self) -> bool {
        self.lock().has_power()
    }

    pub fn light_state(&self, light_id: &str) -> Option<bool> {
        self.lock().light_state(light_id)
    }

    pub fn all_light_states(&self) -> HashMap<String, bool> {
        self.lock().all_light_states()
    }

    /// Administrative override of the power level
    pub fn set_power(&self, value: f64) {
        let mut state = self.lock();
        state.set_power(value);
        info!("Power set to {}", state.power());
    }

    /// Ambient drain. Returns false once the power has run out.
    pub fn consume_power(&self, amount: f64) -> bool {
        let mut state = self.lock();
        let consumed = state.consume_power(amount);
        debug!("Consumed {}: power={}", amount, state.power());
        consumed
    }

    /// Start a new session: full power, no lights tracked.
    ///
    /// Fixtures keep whatever state the actuator last gave them.
    pub fn reset(&self) {
        self.lock().reset();
        info!("Power state reset");
    }
}
