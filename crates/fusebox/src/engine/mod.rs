mod actuator;
mod engine;
mod event;
mod scene;

pub use actuator::Actuator;
pub use actuator::ActuatorError;
pub use engine::Engine;
pub use engine::ToggleOutcome;
pub use engine::ToggleRequest;
pub use event::Event;
pub use scene::Emitter;
pub use scene::SceneActuator;
