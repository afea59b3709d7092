//! House power bookkeeping.
//!
//! [`PowerLevel`] tracks the bounded power quantity on its own.
//! [`PowerState`] layers the light registry and event broadcasts on top of it.

mod level;
mod state;

pub use level::PowerLevel;
pub use state::PowerSnapshot;
pub use state::PowerState;
