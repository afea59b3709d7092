/// Errors an actuator can report back to the engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActuatorError {
    #[error("No fixture found for light: {0}")]
    FixtureNotFound(String),
}

/// Applies logical on/off decisions to physical light fixtures.
///
/// The engine calls this after a toggle has already been committed. A failure
/// here is logged by the engine and never rolls the toggle back.
pub trait Actuator: Send + Sync {
    /// Get the name/identifier of this actuator
    fn name(&self) -> &str;

    /// Resolve the fixture for `light_id` and set every light-emitting element
    /// in it to `enabled`.
    ///
    /// Returns how many elements were switched.
    fn set_enabled(&self, light_id: &str, enabled: bool) -> Result<usize, ActuatorError>;
}

/// Mock actuator for testing
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockActuator {
    pub known: Vec<String>,
    pub calls: std::sync::Mutex<Vec<(String, bool)>>,
}

#[cfg(test)]
impl MockActuator {
    /// Create a mock that knows the given light ids
    pub fn with_lights(ids: &[&str]) -> Self {
        Self {
            known: ids.iter().map(|id| id.to_string()).collect(),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Actuator for MockActuator {
    fn name(&self) -> &str {
        "mock"
    }

    fn set_enabled(&self, light_id: &str, enabled: bool) -> Result<usize, ActuatorError> {
        self.calls
            .lock()
            .unwrap()
            .push((light_id.to_string(), enabled));

        if self.known.iter().any(|id| id == light_id) {
            Ok(1)
        } else {
            Err(ActuatorError::FixtureNotFound(light_id.to_string()))
        }
    }
}
