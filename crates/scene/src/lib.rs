pub mod picking;
pub mod region;

pub use picking::*;
pub use region::*;
