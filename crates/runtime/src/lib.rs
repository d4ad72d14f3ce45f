pub mod event_bus;
pub mod metrics;
pub mod revision;

pub use event_bus::*;
pub use metrics::*;
pub use revision::*;
