pub mod config;
pub mod error;
pub mod load;
pub mod queue;
pub mod status;
pub mod synchronizer;

pub use config::{MapConfig, ViewerConfig};
pub use error::ViewerError;
pub use load::{LoadGuard, LoadTicket, LoadedData};
pub use queue::FileQueue;
pub use status::Status;
pub use synchronizer::{ClickOutcome, ExportedCsv, FieldOptions, Synchronizer};
