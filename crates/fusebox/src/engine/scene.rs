use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use serde::Serialize;
use tracing::debug;

use super::actuator::Actuator;
use super::actuator::ActuatorError;
use crate::config::FixtureConfig;

/// A single light-emitting element inside a fixture (one bulb of a chandelier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Emitter {
    pub name: String,
    pub enabled: bool,
}

/// Actuator backed by an in-memory scene of fixtures.
///
/// The fixture table is built once at startup; lookups never re-probe the
/// scene. Every emitter starts disabled.
#[derive(Debug, Default)]
pub struct SceneActuator {
    fixtures: Mutex<HashMap<String, Vec<Emitter>>>,
}

impl SceneActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(fixtures: &HashMap<String, FixtureConfig>) -> Self {
        let scene = Self::new();
        for (light_id, fixture) in fixtures {
            scene.add_fixture(light_id, &fixture.emitters);
        }
        scene
    }

    /// Register (or replace) the fixture for `light_id`
    pub fn add_fixture(&self, light_id: &str, emitters: &[String]) {
        let emitters = emitters
            .iter()
            .map(|name| Emitter {
                name: name.clone(),
                enabled: false,
            })
            .collect();

        self.fixtures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(light_id.to_string(), emitters);
    }

    /// Current emitters of a fixture, or `None` if `light_id` has no fixture
    pub fn emitters(&self, light_id: &str) -> Option<Vec<Emitter>> {
        self.fixtures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(light_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.fixtures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Actuator for SceneActuator {
    fn name(&self) -> &str {
        "scene"
    }

    fn set_enabled(&self, light_id: &str, enabled: bool) -> Result<usize, ActuatorError> {
        let mut fixtures = self
            .fixtures
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let emitters = fixtures
            .get_mut(light_id)
            .ok_or_else(|| ActuatorError::FixtureNotFound(light_id.to_string()))?;

        for emitter in emitters.iter_mut() {
            emitter.enabled = enabled;
        }

        debug!(
            "Fixture {} -> enabled={} ({} emitters)",
            light_id,
            enabled,
            emitters.len()
        );
        Ok(emitters.len())
    }
}
