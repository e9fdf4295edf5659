pub mod attacks;
pub mod cozy;
pub mod san;

pub use attacks::Layout;
pub use cozy::{Position, Termination};
