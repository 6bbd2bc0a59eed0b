//! Selection ranges and the host capability that applies them.

pub mod host;
pub mod range;

pub use host::{HostSelection, SimulatedHost};
pub use range::SelectionRange;
