use serde::Serialize;

/// Broadcast events fanned out to every presentation client.
///
/// Serialized with a `channel` tag so clients can route on it directly.
#[derive(Debug, Clone, PartialEq, Serialize, strum::Display)]
#[serde(tag = "channel", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Event {
    /// Power level after a successful paid deduction
    PowerChanged { power: f64 },

    /// A light was toggled, or a turn-on request was denied (`on: false`)
    LightToggled { light_id: String, on: bool },
}
