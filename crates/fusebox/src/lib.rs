pub mod api;
pub mod config;
mod engine;
pub mod power;

pub use config::Config;
pub use config::ConfigError;
pub use config::LogLevel;
pub use config::PowerConfig;
pub use engine::Actuator;
pub use engine::ActuatorError;
pub use engine::Emitter;
pub use engine::Engine;
pub use engine::Event;
pub use engine::SceneActuator;
pub use engine::ToggleOutcome;
pub use engine::ToggleRequest;
pub use power::PowerLevel;
pub use power::PowerSnapshot;
pub use power::PowerState;
