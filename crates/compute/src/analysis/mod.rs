pub mod statistics;

pub use statistics::Statistics;
